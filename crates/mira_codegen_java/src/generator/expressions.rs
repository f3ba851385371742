use super::*;
use mira_ast::{
    Argument, BinaryOp, Expression, IncDecOp, MapEntry, PropertyBinding, PropertyRef, ResolvedCall,
};

impl JavaCodeGenerator {
    pub fn generate_expression(
        &mut self,
        ctx: &mut GenContext,
        expr: &Expression,
    ) -> Result<String, CodeGenError> {
        match expr {
            Expression::Literal(literal, _) => Ok(self.literal_to_string(literal)),
            Expression::LocalRef { id, name, .. } => {
                if self.is_boxed(*id) {
                    Ok(format!("{}.get()", name))
                } else {
                    Ok(name.clone())
                }
            }
            Expression::This { .. } => Ok(self.render_this(ctx)),
            Expression::Super { .. } => Ok("super".to_string()),
            Expression::PropertyAccess {
                receiver, binding, ..
            } => self.generate_property_access(ctx, receiver.as_deref(), binding),
            Expression::IndexAccess {
                receiver, index, ..
            } => self.generate_index_access(ctx, receiver, index),
            Expression::Call {
                receiver,
                receiver_ty,
                name,
                args,
                trailing_closures,
                resolved,
                ..
            } => self.generate_call(
                ctx,
                receiver.as_deref(),
                receiver_ty.as_ref(),
                name,
                args,
                trailing_closures,
                resolved.as_ref(),
            ),
            Expression::New {
                class,
                args,
                resolved,
                ..
            } => {
                let bound = self.bind_arguments(ctx, resolved.as_ref(), args, &[])?;
                Ok(format!("new {}({})", self.render_type(class), bound))
            }
            Expression::Binary {
                op,
                left,
                right,
                resolved_method,
                ..
            } => self.generate_binary(ctx, *op, left, right, resolved_method.as_ref()),
            Expression::Unary { op, operand, .. } => {
                let inner = self.operand(ctx, operand)?;
                Ok(format!("{}{}", op.symbol(), inner))
            }
            Expression::Assignment {
                target,
                op,
                value,
                value_used,
                ..
            } => self.generate_assignment(ctx, target, *op, value, *value_used),
            Expression::IncDec {
                target,
                op,
                prefix,
                value_used,
                ..
            } => self.generate_inc_dec(ctx, target, *op, *prefix, *value_used),
            Expression::NullSafe {
                receiver,
                name,
                property,
                ..
            } => self.generate_null_safe(ctx, receiver, name, property.as_ref()),
            Expression::Elvis {
                value, fallback, ..
            } => self.generate_elvis(ctx, value, fallback),
            Expression::Conditional {
                condition,
                then_expr,
                else_expr,
                ..
            } => {
                let cond = self.condition_text(ctx, condition)?;
                let then_code = self.generate_expression(ctx, then_expr)?;
                let else_code = self.generate_expression(ctx, else_expr)?;
                Ok(format!("({} ? {} : {})", cond, then_code, else_code))
            }
            Expression::ListLiteral {
                elements, expected, ..
            } => self.generate_list_literal(ctx, elements, expected.as_ref()),
            Expression::MapLiteral { entries, .. } => self.generate_map_literal(ctx, entries),
            Expression::RangeLiteral {
                from,
                to,
                inclusive,
                ty,
                ..
            } => self.generate_range_literal(ctx, from, to, *inclusive, ty),
            Expression::InterfaceFromMap {
                target, methods, ..
            } => self.generate_interface_from_map(ctx, target, methods),
            Expression::Closure {
                params,
                body,
                shape,
                span,
            } => self.generate_closure(ctx, params, body, shape.as_ref(), *span),
            Expression::Cast {
                operand,
                target,
                conversion_method,
                ..
            } => {
                if let Some(method) = conversion_method {
                    let receiver = self.operand(ctx, operand)?;
                    Ok(format!("{}.{}()", receiver, method))
                } else {
                    let inner = self.operand(ctx, operand)?;
                    Ok(format!("({}) {}", self.render_type(target), inner))
                }
            }
            Expression::TypeTest {
                operand, target, ..
            } => {
                let inner = self.operand(ctx, operand)?;
                Ok(format!("{} instanceof {}", inner, self.render_type(target)))
            }
        }
    }

    /// Renders an expression for use as a subexpression, adding parentheses
    /// where Java precedence demands them.
    pub(super) fn operand(
        &mut self,
        ctx: &mut GenContext,
        expr: &Expression,
    ) -> Result<String, CodeGenError> {
        let code = self.generate_expression(ctx, expr)?;
        if Self::needs_operand_parens(expr) {
            Ok(format!("({})", code))
        } else {
            Ok(code)
        }
    }

    fn needs_operand_parens(expr: &Expression) -> bool {
        matches!(
            expr,
            Expression::Binary { .. }
                | Expression::Unary { .. }
                | Expression::Assignment { .. }
                | Expression::Cast {
                    conversion_method: None,
                    ..
                }
                | Expression::TypeTest { .. }
        )
    }

    /// Truthiness coercion for condition slots: boolean expressions pass
    /// through, anything else is routed through the runtime helper.
    pub(super) fn condition_text(
        &mut self,
        ctx: &mut GenContext,
        expr: &Expression,
    ) -> Result<String, CodeGenError> {
        let code = self.generate_expression(ctx, expr)?;
        if Self::is_boolean(expr.static_type().as_ref()) {
            Ok(code)
        } else {
            Ok(format!("{}.truthy({})", DYN_CLASS, code))
        }
    }

    fn is_boolean(ty: Option<&TypeRef>) -> bool {
        match ty {
            Some(TypeRef::Primitive(name)) => name == "boolean",
            Some(TypeRef::Named(named)) => named.name == "java.lang.Boolean",
            _ => false,
        }
    }

    fn render_this(&self, ctx: &GenContext) -> String {
        if ctx.in_anonymous_body {
            match self.current_class() {
                Some(class) => format!("{}.this", class),
                None => "this".to_string(),
            }
        } else {
            "this".to_string()
        }
    }

    fn generate_property_access(
        &mut self,
        ctx: &mut GenContext,
        receiver: Option<&Expression>,
        binding: &PropertyBinding,
    ) -> Result<String, CodeGenError> {
        let receiver_code = match receiver {
            Some(expr) => Some(self.operand(ctx, expr)?),
            None => None,
        };
        match binding {
            PropertyBinding::Resolved(property) => match (&property.getter, receiver_code) {
                (Some(getter), Some(recv)) => Ok(format!("{}.{}()", recv, getter)),
                (Some(getter), None) => Ok(format!("{}()", getter)),
                (None, Some(recv)) => Ok(format!("{}.{}", recv, property.name)),
                (None, None) => Ok(property.name.clone()),
            },
            PropertyBinding::Unresolved {
                name,
                dynamic_scope,
            } => match receiver_code {
                Some(recv) => Ok(format!(
                    "{}.getProperty({}, \"{}\")",
                    DYN_CLASS,
                    recv,
                    Self::escape_string(name)
                )),
                None if *dynamic_scope => Ok(format!(
                    "{}.current().getValue(\"{}\")",
                    BINDING_CLASS,
                    Self::escape_string(name)
                )),
                None => Ok(format!(
                    "{}.getProperty({}, \"{}\")",
                    DYN_CLASS,
                    self.render_this(ctx),
                    Self::escape_string(name)
                )),
            },
        }
    }

    fn generate_index_access(
        &mut self,
        ctx: &mut GenContext,
        receiver: &Expression,
        index: &Expression,
    ) -> Result<String, CodeGenError> {
        let recv = self.operand(ctx, receiver)?;
        let idx = self.generate_expression(ctx, index)?;
        if matches!(receiver.static_type(), Some(TypeRef::Array { .. })) {
            Ok(format!("{}[{}]", recv, idx))
        } else {
            Ok(format!(
                "{}.invoke({}, \"getAt\", new java.lang.Object[]{{{}}})",
                DYN_CLASS, recv, idx
            ))
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn generate_call(
        &mut self,
        ctx: &mut GenContext,
        receiver: Option<&Expression>,
        receiver_ty: Option<&TypeRef>,
        name: &str,
        args: &[Argument],
        trailing_closures: &[Expression],
        resolved: Option<&ResolvedCall>,
    ) -> Result<String, CodeGenError> {
        match resolved {
            Some(resolved) => {
                let bound = self.bind_arguments(ctx, Some(resolved), args, trailing_closures)?;
                match receiver {
                    Some(receiver) => {
                        let recv =
                            self.receiver_text(ctx, receiver, receiver_ty, resolved)?;
                        Ok(format!("{}.{}({})", recv, name, bound))
                    }
                    None => Ok(format!("{}({})", name, bound)),
                }
            }
            None => {
                let recv = match receiver {
                    Some(receiver) => self.operand(ctx, receiver)?,
                    None => self.render_this(ctx),
                };
                let packed = self.pack_dynamic_arguments(ctx, args, trailing_closures)?;
                Ok(format!(
                    "{}.invoke({}, \"{}\", {})",
                    DYN_CLASS,
                    recv,
                    Self::escape_string(name),
                    packed
                ))
            }
        }
    }

    /// Receiver text for a resolved call. A receiver whose static type is an
    /// intersection is upcast to the conjunct declaring the bound method, so
    /// the generated call compiles against a denotable type.
    fn receiver_text(
        &mut self,
        ctx: &mut GenContext,
        receiver: &Expression,
        receiver_ty: Option<&TypeRef>,
        resolved: &ResolvedCall,
    ) -> Result<String, CodeGenError> {
        let code = self.operand(ctx, receiver)?;
        let Some(TypeRef::Intersection(bounds)) = receiver_ty else {
            return Ok(code);
        };
        let Some(owner) = resolved.signature.owner.as_deref() else {
            return Ok(code);
        };
        let declaring = bounds.iter().find(
            |bound| matches!(bound, TypeRef::Named(named) if named.name == owner),
        );
        match declaring {
            // The first bound is the denoted type; only other conjuncts
            // need an explicit upcast.
            Some(bound) if bounds.first() != Some(bound) => {
                Ok(format!("(({}) {})", self.render_type(bound), code))
            }
            _ => Ok(code),
        }
    }

    fn generate_binary(
        &mut self,
        ctx: &mut GenContext,
        op: BinaryOp,
        left: &Expression,
        right: &Expression,
        resolved_method: Option<&mira_ast::OperatorMethod>,
    ) -> Result<String, CodeGenError> {
        let left_ty = left.static_type();
        let right_ty = right.static_type();
        let left_code = self.operand(ctx, left)?;
        let right_code = self.operand(ctx, right)?;

        let raw = |l: &str, r: &str| format!("{} {} {}", l, op.symbol(), r);

        // Logical, bitwise and shift operators always stay native.
        if op.is_logical()
            || matches!(
                op,
                BinaryOp::BitAnd
                    | BinaryOp::BitOr
                    | BinaryOp::BitXor
                    | BinaryOp::ShiftLeft
                    | BinaryOp::ShiftRight
            )
        {
            return Ok(raw(&left_code, &right_code));
        }

        let both_numeric = left_ty.as_ref().map(TypeRef::is_numeric).unwrap_or(false)
            && right_ty.as_ref().map(TypeRef::is_numeric).unwrap_or(false);
        let string_append = op == BinaryOp::Add
            && left_ty.as_ref().map(TypeRef::is_string).unwrap_or(false);

        let Some(method) = resolved_method else {
            return Ok(raw(&left_code, &right_code));
        };
        if string_append
            || (both_numeric && !self.config.replace_numeric_operators_with_methods)
        {
            return Ok(raw(&left_code, &right_code));
        }

        if op.is_comparison() && method.name == "compareTo" {
            return Ok(format!(
                "{}.compareTo({}) {} 0",
                left_code,
                right_code,
                op.symbol()
            ));
        }
        match op {
            BinaryOp::Equal if method.name == "equals" => {
                Ok(format!("{}.equals({})", left_code, right_code))
            }
            BinaryOp::NotEqual if method.name == "equals" => {
                Ok(format!("!{}.equals({})", left_code, right_code))
            }
            _ => Ok(format!("{}.{}({})", left_code, method.name, right_code)),
        }
    }

    fn generate_assignment(
        &mut self,
        ctx: &mut GenContext,
        target: &Expression,
        op: Option<BinaryOp>,
        value: &Expression,
        value_used: bool,
    ) -> Result<String, CodeGenError> {
        match target {
            Expression::LocalRef { id, name, .. } => {
                let value_code = self.generate_expression(ctx, value)?;
                if self.is_boxed(*id) {
                    let rhs = match op {
                        Some(op) => {
                            format!("{}.get() {} {}", name, op.symbol(), value_code)
                        }
                        None => value_code,
                    };
                    if value_used {
                        ctx.hoist(format!("{}.set({});", name, rhs));
                        Ok(format!("{}.get()", name))
                    } else {
                        Ok(format!("{}.set({})", name, rhs))
                    }
                } else {
                    match op {
                        Some(op) => Ok(format!("{} {}= {}", name, op.symbol(), value_code)),
                        None => Ok(format!("{} = {}", name, value_code)),
                    }
                }
            }
            Expression::PropertyAccess {
                receiver, binding, ..
            } => self.generate_property_assignment(
                ctx,
                receiver.as_deref(),
                binding,
                op,
                value,
                value_used,
            ),
            Expression::IndexAccess {
                receiver, index, ..
            } => {
                let recv = self.operand(ctx, receiver)?;
                let idx = self.generate_expression(ctx, index)?;
                let value_code = self.generate_expression(ctx, value)?;
                if matches!(receiver.static_type(), Some(TypeRef::Array { .. })) {
                    match op {
                        Some(op) => Ok(format!(
                            "{}[{}] {}= {}",
                            recv,
                            idx,
                            op.symbol(),
                            value_code
                        )),
                        None => Ok(format!("{}[{}] = {}", recv, idx, value_code)),
                    }
                } else {
                    Ok(format!(
                        "{}.invoke({}, \"putAt\", new java.lang.Object[]{{{}, {}}})",
                        DYN_CLASS, recv, idx, value_code
                    ))
                }
            }
            other => Err(CodeGenError::MalformedTree {
                message: "assignment target is not a variable, property, or index".to_string(),
                span: Some(other.span()),
            }),
        }
    }

    fn generate_property_assignment(
        &mut self,
        ctx: &mut GenContext,
        receiver: Option<&Expression>,
        binding: &PropertyBinding,
        op: Option<BinaryOp>,
        value: &Expression,
        value_used: bool,
    ) -> Result<String, CodeGenError> {
        let receiver_code = self.stable_receiver(ctx, receiver, op.is_some() || value_used)?;
        let value_code = self.generate_expression(ctx, value)?;

        match binding {
            PropertyBinding::Resolved(property) => {
                let read = |recv: &Option<String>| match (&property.getter, recv) {
                    (Some(getter), Some(recv)) => format!("{}.{}()", recv, getter),
                    (Some(getter), None) => format!("{}()", getter),
                    (None, Some(recv)) => format!("{}.{}", recv, property.name),
                    (None, None) => property.name.clone(),
                };
                let rhs = match op {
                    Some(op) => format!(
                        "{} {} {}",
                        read(&receiver_code),
                        op.symbol(),
                        value_code
                    ),
                    None => value_code,
                };
                match &property.setter {
                    Some(setter) => {
                        if value_used {
                            let helper = self.setter_trampoline(property);
                            let recv = receiver_code
                                .unwrap_or_else(|| self.render_this(ctx));
                            Ok(format!("{}({}, {})", helper, recv, rhs))
                        } else {
                            match receiver_code {
                                Some(recv) => Ok(format!("{}.{}({})", recv, setter, rhs)),
                                None => Ok(format!("{}({})", setter, rhs)),
                            }
                        }
                    }
                    None => match receiver_code {
                        Some(recv) => Ok(format!("{}.{} = {}", recv, property.name, rhs)),
                        None => Ok(format!("{} = {}", property.name, rhs)),
                    },
                }
            }
            PropertyBinding::Unresolved {
                name,
                dynamic_scope,
            } => {
                let escaped = Self::escape_string(name);
                let read = match &receiver_code {
                    Some(recv) => format!("{}.getProperty({}, \"{}\")", DYN_CLASS, recv, escaped),
                    None if *dynamic_scope => {
                        format!("{}.current().getValue(\"{}\")", BINDING_CLASS, escaped)
                    }
                    None => format!(
                        "{}.getProperty({}, \"{}\")",
                        DYN_CLASS,
                        self.render_this(ctx),
                        escaped
                    ),
                };
                let rhs = match op {
                    // Dynamic reads are untyped; operate through the runtime.
                    Some(op) => format!(
                        "{}.invoke({}, \"{}\", new java.lang.Object[]{{{}}})",
                        DYN_CLASS,
                        read,
                        Self::operator_method_name(op),
                        value_code
                    ),
                    None => value_code,
                };
                let write = match &receiver_code {
                    Some(recv) => format!(
                        "{}.setProperty({}, \"{}\", {})",
                        DYN_CLASS, recv, escaped, rhs
                    ),
                    None if *dynamic_scope => format!(
                        "{}.current().setValue(\"{}\", {})",
                        BINDING_CLASS, escaped, rhs
                    ),
                    None => format!(
                        "{}.setProperty({}, \"{}\", {})",
                        DYN_CLASS,
                        self.render_this(ctx),
                        escaped,
                        rhs
                    ),
                };
                if value_used {
                    let tmp = ctx.fresh_name("value");
                    ctx.hoist(format!("final java.lang.Object {} = {};", tmp, rhs));
                    let write = match &receiver_code {
                        Some(recv) => format!(
                            "{}.setProperty({}, \"{}\", {});",
                            DYN_CLASS, recv, escaped, tmp
                        ),
                        None if *dynamic_scope => format!(
                            "{}.current().setValue(\"{}\", {});",
                            BINDING_CLASS, escaped, tmp
                        ),
                        None => format!(
                            "{}.setProperty({}, \"{}\", {});",
                            DYN_CLASS,
                            self.render_this(ctx),
                            escaped,
                            tmp
                        ),
                    };
                    ctx.hoist(write);
                    Ok(tmp)
                } else {
                    Ok(write)
                }
            }
        }
    }

    /// Renders a receiver that is about to be evaluated more than once,
    /// hoisting it into a temporary unless it is already a simple name.
    fn stable_receiver(
        &mut self,
        ctx: &mut GenContext,
        receiver: Option<&Expression>,
        reused: bool,
    ) -> Result<Option<String>, CodeGenError> {
        let Some(receiver) = receiver else {
            return Ok(None);
        };
        let code = self.operand(ctx, receiver)?;
        if !reused
            || matches!(
                receiver,
                Expression::LocalRef { .. } | Expression::This { .. }
            )
        {
            return Ok(Some(code));
        }
        let ty = self.render_optional_type(receiver.static_type().as_ref());
        let tmp = ctx.fresh_name("receiver");
        ctx.hoist(format!("final {} {} = {};", ty, tmp, code));
        Ok(Some(tmp))
    }

    fn operator_method_name(op: BinaryOp) -> &'static str {
        match op {
            BinaryOp::Add => "plus",
            BinaryOp::Subtract => "minus",
            BinaryOp::Multiply => "multiply",
            BinaryOp::Divide => "div",
            BinaryOp::Modulo => "mod",
            BinaryOp::BitAnd => "and",
            BinaryOp::BitOr => "or",
            BinaryOp::BitXor => "xor",
            BinaryOp::ShiftLeft => "leftShift",
            BinaryOp::ShiftRight => "rightShift",
            _ => "plus",
        }
    }

    /// Registers (once) and names the static helper that makes a setter call
    /// usable in value position.
    fn setter_trampoline(&mut self, property: &PropertyRef) -> String {
        let setter = property
            .setter
            .clone()
            .unwrap_or_else(|| format!("set{}", property.name));
        let key = format!("{}#{}", property.owner, setter);
        if let Some(existing) = self.trampolines.get(&key) {
            return existing.method_name.clone();
        }
        let method_name = format!("mira${}", setter);
        let value_type = self.render_type(&property.ty);
        let owner = property.owner.clone();
        let rendered = format!(
            "private static {value} {name}({owner} receiver, {value} value) {{\n    receiver.{setter}(value);\n    return value;\n}}",
            value = value_type,
            name = method_name,
            owner = owner,
            setter = setter,
        );
        self.trampolines.insert(
            key,
            SetterTrampoline {
                method_name: method_name.clone(),
                rendered,
            },
        );
        method_name
    }

    fn generate_inc_dec(
        &mut self,
        ctx: &mut GenContext,
        target: &Expression,
        op: IncDecOp,
        prefix: bool,
        value_used: bool,
    ) -> Result<String, CodeGenError> {
        match target {
            Expression::LocalRef { id, name, ty, .. } => {
                if !self.is_boxed(*id) {
                    return Ok(if prefix {
                        format!("{}{}", op.symbol(), name)
                    } else {
                        format!("{}{}", name, op.symbol())
                    });
                }
                let step = format!("{}.get() {} 1", name, op.binary().symbol());
                if !value_used {
                    return Ok(format!("{}.set({})", name, step));
                }
                if prefix {
                    ctx.hoist(format!("{}.set({});", name, step));
                    Ok(format!("{}.get()", name))
                } else {
                    let value_ty = self.render_type(ty);
                    let tmp = ctx.fresh_name("previous");
                    ctx.hoist(format!("final {} {} = {}.get();", value_ty, tmp, name));
                    ctx.hoist(format!(
                        "{}.set({} {} 1);",
                        name,
                        tmp,
                        op.binary().symbol()
                    ));
                    Ok(tmp)
                }
            }
            Expression::PropertyAccess {
                receiver,
                binding: PropertyBinding::Resolved(property),
                ..
            } => {
                let receiver_code = self.stable_receiver(ctx, receiver.as_deref(), true)?;
                let read = match (&property.getter, &receiver_code) {
                    (Some(getter), Some(recv)) => format!("{}.{}()", recv, getter),
                    (Some(getter), None) => format!("{}()", getter),
                    (None, Some(recv)) => format!("{}.{}", recv, property.name),
                    (None, None) => property.name.clone(),
                };
                let write = |value: &str| match (&property.setter, &receiver_code) {
                    (Some(setter), Some(recv)) => format!("{}.{}({})", recv, setter, value),
                    (Some(setter), None) => format!("{}({})", setter, value),
                    (None, Some(recv)) => {
                        format!("{}.{} = {}", recv, property.name, value)
                    }
                    (None, None) => format!("{} = {}", property.name, value),
                };
                if !value_used {
                    let step = format!("{} {} 1", read, op.binary().symbol());
                    return Ok(write(&step));
                }
                let value_ty = self.render_type(&property.ty);
                let tmp = ctx.fresh_name(if prefix { "next" } else { "previous" });
                if prefix {
                    ctx.hoist(format!(
                        "final {} {} = {} {} 1;",
                        value_ty,
                        tmp,
                        read,
                        op.binary().symbol()
                    ));
                    ctx.hoist(format!("{};", write(&tmp)));
                    Ok(tmp)
                } else {
                    ctx.hoist(format!("final {} {} = {};", value_ty, tmp, read));
                    let step = format!("{} {} 1", tmp, op.binary().symbol());
                    ctx.hoist(format!("{};", write(&step)));
                    Ok(tmp)
                }
            }
            Expression::PropertyAccess {
                receiver,
                binding:
                    PropertyBinding::Unresolved {
                        name,
                        dynamic_scope,
                    },
                ..
            } => {
                // No static accessor pair; step through the runtime's
                // next/previous protocol.
                let method = match op {
                    IncDecOp::Increment => "next",
                    IncDecOp::Decrement => "previous",
                };
                let escaped = Self::escape_string(name);
                let receiver_code = self.stable_receiver(ctx, receiver.as_deref(), true)?;
                let recv = match (&receiver_code, dynamic_scope) {
                    (Some(recv), _) => recv.clone(),
                    (None, true) => {
                        format!("{}.current()", BINDING_CLASS)
                    }
                    (None, false) => self.render_this(ctx),
                };
                let binding_scope = receiver_code.is_none() && *dynamic_scope;
                let read = if binding_scope {
                    format!("{}.getValue(\"{}\")", recv, escaped)
                } else {
                    format!("{}.getProperty({}, \"{}\")", DYN_CLASS, recv, escaped)
                };
                let write = |value: &str| {
                    if binding_scope {
                        format!("{}.setValue(\"{}\", {})", recv, escaped, value)
                    } else {
                        format!(
                            "{}.setProperty({}, \"{}\", {})",
                            DYN_CLASS, recv, escaped, value
                        )
                    }
                };
                let step = |value: &str| {
                    format!(
                        "{}.invoke({}, \"{}\", new java.lang.Object[]{{}})",
                        DYN_CLASS, value, method
                    )
                };
                if !value_used {
                    return Ok(write(&step(&read)));
                }
                let tmp = ctx.fresh_name(if prefix { "next" } else { "previous" });
                if prefix {
                    ctx.hoist(format!(
                        "final java.lang.Object {} = {};",
                        tmp,
                        step(&read)
                    ));
                } else {
                    ctx.hoist(format!("final java.lang.Object {} = {};", tmp, read));
                }
                let written = if prefix { tmp.clone() } else { step(&tmp) };
                ctx.hoist(format!("{};", write(&written)));
                Ok(tmp)
            }
            other => Err(CodeGenError::UnsupportedConstruct {
                construct: "increment target is not a variable or property".to_string(),
                span: Some(other.span()),
            }),
        }
    }

    fn generate_null_safe(
        &mut self,
        ctx: &mut GenContext,
        receiver: &Expression,
        name: &str,
        property: Option<&PropertyRef>,
    ) -> Result<String, CodeGenError> {
        let receiver_code = self.generate_expression(ctx, receiver)?;
        let receiver_type = self.render_optional_type(receiver.static_type().as_ref());
        let tmp = ctx.fresh_name("safe");
        ctx.hoist(format!(
            "final {} {} = {};",
            receiver_type, tmp, receiver_code
        ));
        let access = match property {
            Some(property) => match &property.getter {
                Some(getter) => format!("{}.{}()", tmp, getter),
                None => format!("{}.{}", tmp, property.name),
            },
            None => format!(
                "{}.getProperty({}, \"{}\")",
                DYN_CLASS,
                tmp,
                Self::escape_string(name)
            ),
        };
        Ok(format!("({} == null ? null : {})", tmp, access))
    }

    fn generate_elvis(
        &mut self,
        ctx: &mut GenContext,
        value: &Expression,
        fallback: &Expression,
    ) -> Result<String, CodeGenError> {
        let value_code = self.generate_expression(ctx, value)?;
        let value_type = self.render_optional_type(value.static_type().as_ref());
        let tmp = ctx.fresh_name("candidate");
        ctx.hoist(format!("final {} {} = {};", value_type, tmp, value_code));
        let fallback_code = self.generate_expression(ctx, fallback)?;
        Ok(format!(
            "({}.truthy({}) ? {} : {})",
            DYN_CLASS, tmp, tmp, fallback_code
        ))
    }

    fn generate_list_literal(
        &mut self,
        ctx: &mut GenContext,
        elements: &[Expression],
        expected: Option<&TypeRef>,
    ) -> Result<String, CodeGenError> {
        if let Some(TypeRef::Array { element }) = expected {
            let element_type = self.render_type(element);
            if elements.is_empty() {
                return Ok(format!("new {}[0]", element_type));
            }
            let rendered = self.comma_separated(ctx, elements)?;
            return Ok(format!("new {}[]{{{}}}", element_type, rendered));
        }
        if elements.is_empty() {
            return Ok("new java.util.ArrayList<>()".to_string());
        }
        let rendered = self.comma_separated(ctx, elements)?;
        Ok(format!(
            "new java.util.ArrayList<>(java.util.Arrays.asList({}))",
            rendered
        ))
    }

    fn generate_map_literal(
        &mut self,
        ctx: &mut GenContext,
        entries: &[MapEntry],
    ) -> Result<String, CodeGenError> {
        if entries.is_empty() {
            return Ok("new java.util.LinkedHashMap<>()".to_string());
        }
        let tmp = ctx.fresh_name("map");
        ctx.hoist(format!(
            "final java.util.Map<java.lang.Object, java.lang.Object> {} = new java.util.LinkedHashMap<>();",
            tmp
        ));
        for entry in entries {
            let key = self.generate_expression(ctx, &entry.key)?;
            let value = self.generate_expression(ctx, &entry.value)?;
            ctx.hoist(format!("{}.put({}, {});", tmp, key, value));
        }
        Ok(tmp)
    }

    fn generate_range_literal(
        &mut self,
        ctx: &mut GenContext,
        from: &Expression,
        to: &Expression,
        inclusive: bool,
        ty: &TypeRef,
    ) -> Result<String, CodeGenError> {
        let from_code = self.generate_expression(ctx, from)?;
        let to_code = self.generate_expression(ctx, to)?;
        let class = match ty {
            TypeRef::Named(_) => self.render_type(ty),
            _ => {
                let numeric = from.static_type().map(|t| t.is_numeric()).unwrap_or(false)
                    && to.static_type().map(|t| t.is_numeric()).unwrap_or(false);
                if numeric {
                    INT_RANGE_CLASS.to_string()
                } else {
                    OBJECT_RANGE_CLASS.to_string()
                }
            }
        };
        Ok(format!(
            "new {}({}, {}, {})",
            class, from_code, to_code, inclusive
        ))
    }

    pub(super) fn comma_separated(
        &mut self,
        ctx: &mut GenContext,
        expressions: &[Expression],
    ) -> Result<String, CodeGenError> {
        let mut rendered = Vec::with_capacity(expressions.len());
        for expression in expressions {
            rendered.push(self.generate_expression(ctx, expression)?);
        }
        Ok(rendered.join(", "))
    }
}
