use super::*;
use crate::capture::CaptureKind;
use mira_ast::{
    ClosureParam, Expression, FunctionalShape, InterfaceMethodImpl, ParamSig, Statement,
};

impl JavaCodeGenerator {
    /// Expands a closure literal into an anonymous-class instantiation of its
    /// resolved functional type. A closure with no resolved shape falls back
    /// to the runtime's generic closure type.
    pub(super) fn generate_closure(
        &mut self,
        ctx: &mut GenContext,
        params: &[ClosureParam],
        body: &[Statement],
        shape: Option<&FunctionalShape>,
        span: Span,
    ) -> Result<String, CodeGenError> {
        let _ = span;
        match shape {
            Some(shape) => self.generate_shaped_closure(ctx, params, body, shape),
            None => self.generate_generic_closure(ctx, params, body),
        }
    }

    fn generate_shaped_closure(
        &mut self,
        ctx: &mut GenContext,
        params: &[ClosureParam],
        body: &[Statement],
        shape: &FunctionalShape,
    ) -> Result<String, CodeGenError> {
        let interface = self.render_type(&shape.interface);
        let method = self.anonymous_method_text(
            ctx,
            &shape.method,
            &shape.params,
            &shape.return_type,
            params,
            body,
        )?;

        let mut builder = self.builder();
        builder.push(&format!("new {}() {{\n", interface));
        builder.indent();
        Self::push_lines(&mut builder, &method);
        for overload in self.arity_overloads(ctx, params, shape)? {
            builder.push_line("");
            Self::push_lines(&mut builder, &overload);
        }
        builder.dedent();
        builder.push("}");
        Ok(builder.build())
    }

    /// Alternate-arity overloads for trailing optional parameters: each
    /// supplies the declared defaults for the dropped suffix and forwards to
    /// the primary method.
    fn arity_overloads(
        &mut self,
        ctx: &GenContext,
        params: &[ClosureParam],
        shape: &FunctionalShape,
    ) -> Result<Vec<String>, CodeGenError> {
        let trailing_defaults = params
            .iter()
            .rev()
            .take_while(|param| param.default_value.is_some())
            .count();
        let mut overloads = Vec::with_capacity(trailing_defaults);
        for dropped in 1..=trailing_defaults {
            let kept = params.len() - dropped;
            let mut child = ctx.extend();
            let mut signature = Vec::with_capacity(kept);
            let mut forwarded = Vec::with_capacity(params.len());
            for (index, param) in params.iter().take(kept).enumerate() {
                child.declare_name(&param.name);
                let ty = self.closure_param_type(param, shape.params.get(index));
                signature.push(format!("{} {}", self.render_type(&ty), param.name));
                forwarded.push(param.name.clone());
            }
            let mut default_lines = Vec::new();
            for param in params.iter().skip(kept) {
                let default = param
                    .default_value
                    .as_deref()
                    .ok_or_else(|| CodeGenError::InvalidMethodSignature {
                        message: format!(
                            "optional parameter {} has no default value",
                            param.name
                        ),
                        span: None,
                    })?;
                let code = self.generate_expression(&mut child, default)?;
                default_lines.extend(child.take_hoisted());
                forwarded.push(code);
            }

            let call = format!("{}({})", shape.method, forwarded.join(", "));
            let mut builder = self.builder();
            builder.push_line("@Override");
            builder.push(&format!(
                "public {} {}({}) {{\n",
                self.render_type(&shape.return_type),
                shape.method,
                signature.join(", ")
            ));
            builder.indent();
            for line in default_lines {
                Self::push_lines(&mut builder, &line);
            }
            if shape.return_type.is_void() {
                builder.push_line(&format!("{};", call));
            } else {
                builder.push_line(&format!("return {};", call));
            }
            builder.dedent();
            builder.push("}");
            overloads.push(builder.build());
        }
        Ok(overloads)
    }

    /// Closure without a resolved functional shape: parameters arrive as a
    /// variadic object array and are rebound by position.
    fn generate_generic_closure(
        &mut self,
        ctx: &mut GenContext,
        params: &[ClosureParam],
        body: &[Statement],
    ) -> Result<String, CodeGenError> {
        let mut child = ctx.extend();
        child.in_anonymous_body = true;
        child.break_label = None;
        child.declare_name("args");

        let implicit;
        let effective: &[ClosureParam] = if params.is_empty() {
            implicit = [ClosureParam {
                id: LocalId(u32::MAX),
                name: "it".to_string(),
                ty: None,
                default_value: None,
            }];
            &implicit
        } else {
            params
        };

        let mut prologue = Vec::new();
        for (index, param) in effective.iter().enumerate() {
            child.declare_name(&param.name);
            let fallback = match &param.default_value {
                Some(default) => {
                    let code = self.generate_expression(&mut child, default)?;
                    prologue.extend(child.take_hoisted());
                    code
                }
                None => "null".to_string(),
            };
            let mut value = format!("args.length > {} ? args[{}] : {}", index, index, fallback);
            let ty = param.ty.clone().unwrap_or_else(TypeRef::object);
            if !ty.is_object() && !ty.is_unknown() {
                value = format!("({}) ({})", self.render_type(&ty), value);
            } else {
                value = format!("({})", value);
            }
            let boxed = param.id != LocalId(u32::MAX) && self.is_boxed(param.id);
            let line = if boxed {
                format!(
                    "final {} {} = new {}<>({});",
                    self.render_boxed_value_type(&ty),
                    param.name,
                    REF_CLASS,
                    value
                )
            } else {
                match self.capture_kind_of(param) {
                    CaptureKind::Mutable => format!(
                        "{} {} = {};",
                        self.render_type(&ty),
                        param.name,
                        value
                    ),
                    _ => format!(
                        "final {} {} = {};",
                        self.render_type(&ty),
                        param.name,
                        value
                    ),
                }
            };
            prologue.push(line);
        }

        let saved_return = self.current_return_type.replace(TypeRef::object());
        let saved_has_value = std::mem::replace(&mut self.current_has_return_value, true);
        let trailing = Self::can_complete_normally(body).then_some("return null;");
        let block = self.render_block(&child, &prologue, body, trailing);
        self.current_return_type = saved_return;
        self.current_has_return_value = saved_has_value;
        let block = block?;

        let mut builder = self.builder();
        builder.push(&format!("new {}() {{\n", FUNC_CLASS));
        builder.indent();
        builder.push_line("@Override");
        Self::push_lines(
            &mut builder,
            &format!(
                "public java.lang.Object call(java.lang.Object... args) {}",
                block
            ),
        );
        builder.dedent();
        builder.push("}");
        Ok(builder.build())
    }

    fn capture_kind_of(&self, param: &ClosureParam) -> CaptureKind {
        if param.id == LocalId(u32::MAX) {
            CaptureKind::Final
        } else {
            self.capture_kind(param.id)
        }
    }

    fn closure_param_type(&self, param: &ClosureParam, sig: Option<&ParamSig>) -> TypeRef {
        param
            .ty
            .clone()
            .or_else(|| sig.map(|sig| sig.ty.clone()))
            .unwrap_or_else(TypeRef::object)
    }

    /// `@Override` method text implementing one functional-type method from
    /// a closure body.
    fn anonymous_method_text(
        &mut self,
        ctx: &GenContext,
        method_name: &str,
        sig_params: &[ParamSig],
        return_type: &TypeRef,
        closure_params: &[ClosureParam],
        body: &[Statement],
    ) -> Result<String, CodeGenError> {
        let mut child = ctx.extend();
        child.in_anonymous_body = true;
        child.break_label = None;

        // The closure's declared parameters take priority; a closure that
        // declares none gets the conventional single implicit parameter, or
        // the signature's own names for wider arities.
        let mut specs: Vec<(Option<LocalId>, String, TypeRef, bool)> = Vec::new();
        if closure_params.is_empty() {
            if sig_params.len() == 1 {
                specs.push((None, "it".to_string(), sig_params[0].ty.clone(), false));
            } else {
                for sig in sig_params {
                    specs.push((None, sig.name.clone(), sig.ty.clone(), false));
                }
            }
        } else {
            for (index, param) in closure_params.iter().enumerate() {
                let ty = self.closure_param_type(param, sig_params.get(index));
                specs.push((Some(param.id), param.name.clone(), ty, false));
            }
        }

        let java_params = self.lower_params(&mut child, &specs);
        let prologue: Vec<String> = java_params
            .iter()
            .filter_map(|param| param.prologue.clone())
            .collect();

        let saved_return = self.current_return_type.replace(return_type.clone());
        let saved_has_value =
            std::mem::replace(&mut self.current_has_return_value, !return_type.is_void());
        let trailing = (!return_type.is_void() && Self::can_complete_normally(body))
            .then_some("return null;");
        let block = self.render_block(&child, &prologue, body, trailing);
        self.current_return_type = saved_return;
        self.current_has_return_value = saved_has_value;
        let block = block?;

        let mut builder = self.builder();
        builder.push_line("@Override");
        builder.push(&format!(
            "public {} {}({}) {}",
            self.render_type(return_type),
            method_name,
            Self::render_param_list(&java_params),
            block
        ));
        Ok(builder.build())
    }

    /// Anonymous implementation of a multi-method type from a map of
    /// closures. The expansion is multi-statement, so the instantiation is
    /// hoisted into a named temporary and referenced by name.
    pub(super) fn generate_interface_from_map(
        &mut self,
        ctx: &mut GenContext,
        target: &TypeRef,
        methods: &[InterfaceMethodImpl],
    ) -> Result<String, CodeGenError> {
        let interface = self.render_type(target);
        let mut builder = self.builder();
        builder.push(&format!("new {}() {{\n", interface));
        builder.indent();
        for (index, method) in methods.iter().enumerate() {
            let Expression::Closure {
                params: closure_params,
                body,
                ..
            } = &method.closure
            else {
                return Err(CodeGenError::MalformedTree {
                    message: format!(
                        "entry for method {} is not a closure",
                        method.signature.name
                    ),
                    span: Some(method.closure.span()),
                });
            };
            if index > 0 {
                builder.push_line("");
            }
            let text = self.anonymous_method_text(
                ctx,
                &method.signature.name,
                &method.signature.params,
                &method.signature.return_type,
                closure_params,
                body,
            )?;
            Self::push_lines(&mut builder, &text);
        }
        builder.dedent();
        builder.push("};");

        let tmp = ctx.fresh_name("impl");
        let declaration = format!("final {} {} = {}", interface, tmp, builder.build());
        ctx.hoist(declaration);
        Ok(tmp)
    }
}
