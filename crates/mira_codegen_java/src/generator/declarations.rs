use super::*;
use mira_ast::{
    ConstructorDecl, DelegateKind, EnumConstant, Expression, Member, MethodDecl, Modifiers,
    TypeDecl, TypeKind, Visibility,
};

const BASE_CAPABILITY_MEMBERS: [&str; 3] = ["getProperty", "setProperty", "invokeMethod"];

impl JavaCodeGenerator {
    pub fn generate_type_declaration(&mut self, decl: &TypeDecl) -> Result<String, CodeGenError> {
        self.class_stack.push(decl.name.clone());
        let result = self.type_declaration_text(decl);
        self.class_stack.pop();
        result
    }

    fn type_declaration_text(&mut self, decl: &TypeDecl) -> Result<String, CodeGenError> {
        let trampolines_before: Vec<String> = self.trampolines.keys().cloned().collect();

        let mut builder = self.builder();
        self.emit_type_header(&mut builder, decl);
        builder.indent();

        if decl.kind == TypeKind::Enum {
            self.emit_enum_constants(&mut builder, &decl.enum_constants)?;
        }

        for (index, member) in decl.members.iter().enumerate() {
            if index > 0 || decl.kind == TypeKind::Enum {
                builder.push_line("");
            }
            let text = self.generate_member(decl, member)?;
            Self::push_lines(&mut builder, &text);
        }

        for nested in &decl.nested {
            builder.push_line("");
            let text = self.generate_type_declaration(nested)?;
            Self::push_lines(&mut builder, &text);
        }

        // Helpers registered while lowering this type's bodies are appended
        // to the class they were first needed in.
        let new_trampolines: Vec<String> = self
            .trampolines
            .iter()
            .filter(|(key, _)| !trampolines_before.contains(key))
            .map(|(_, trampoline)| trampoline.rendered.clone())
            .collect();
        for rendered in new_trampolines {
            builder.push_line("");
            Self::push_lines(&mut builder, &rendered);
        }

        builder.dedent();
        builder.push_line("}");
        Ok(builder.build())
    }

    fn emit_type_header(&mut self, builder: &mut JavaSourceBuilder, decl: &TypeDecl) {
        builder.push_indent();
        builder.push(&Self::modifiers_text(&decl.modifiers));
        match decl.kind {
            TypeKind::Class => builder.push("class "),
            TypeKind::Interface => builder.push("interface "),
            TypeKind::Enum => builder.push("enum "),
        }
        builder.push(&decl.name);

        if let Some(superclass) = &decl.superclass {
            builder.push(&format!(" extends {}", self.render_type(superclass)));
        }

        let interfaces = self.interface_clause(decl);
        if !interfaces.is_empty() {
            builder.push(if decl.kind == TypeKind::Interface {
                " extends "
            } else {
                " implements "
            });
            for interface in &interfaces {
                builder.push(interface);
                builder.push(", ");
            }
            builder.trim_trailing(2);
        }
        builder.push(" {\n");
    }

    /// Implemented-interface list with base-capability handling: the
    /// universal base type is elided when inherited transitively or
    /// re-declared member-by-member, and injected when configuration asks
    /// for it on every class.
    fn interface_clause(&mut self, decl: &TypeDecl) -> Vec<String> {
        let redeclares_base = BASE_CAPABILITY_MEMBERS.iter().all(|name| {
            decl.members.iter().any(
                |member| matches!(member, Member::Method(method) if method.name == *name),
            )
        });
        let elide_base = decl.inherits_base_capability || redeclares_base;

        let mut rendered: Vec<String> = Vec::new();
        let mut has_base = false;
        for interface in &decl.interfaces {
            let text = self.render_type(interface);
            if text == BASE_CAPABILITY_CLASS {
                if elide_base {
                    continue;
                }
                has_base = true;
            }
            rendered.push(text);
        }
        if self.config.always_implement_base_capability
            && decl.kind == TypeKind::Class
            && !has_base
            && !elide_base
        {
            rendered.push(BASE_CAPABILITY_CLASS.to_string());
        }
        rendered
    }

    fn emit_enum_constants(
        &mut self,
        builder: &mut JavaSourceBuilder,
        constants: &[EnumConstant],
    ) -> Result<(), CodeGenError> {
        // A constant-less enum body needs neither separators nor the
        // terminating semicolon.
        if constants.is_empty() {
            return Ok(());
        }
        for constant in constants {
            let text = self.enum_constant_text(constant)?;
            Self::push_lines(builder, &text);
        }
        // Replace the final separator with the terminating semicolon.
        builder.trim_trailing(2);
        builder.push(";\n");
        Ok(())
    }

    fn enum_constant_text(&mut self, constant: &EnumConstant) -> Result<String, CodeGenError> {
        let mut ctx = GenContext::new();
        let mut text = constant.name.clone();
        if !constant.args.is_empty() {
            let mut rendered = Vec::with_capacity(constant.args.len());
            for arg in &constant.args {
                rendered.push(self.generate_expression(&mut ctx, &arg.value)?);
            }
            text.push_str(&format!("({})", rendered.join(", ")));
        }
        if constant.body.is_empty() {
            text.push(',');
            return Ok(text);
        }
        let mut builder = self.builder();
        builder.push(&text);
        builder.push(" {\n");
        builder.indent();
        for (index, member) in constant.body.iter().enumerate() {
            if index > 0 {
                builder.push_line("");
            }
            let enclosing = TypeDecl::new(TypeKind::Class, constant.name.clone());
            let member_text = self.generate_member(&enclosing, member)?;
            Self::push_lines(&mut builder, &member_text);
        }
        builder.dedent();
        builder.push("},");
        Ok(builder.build())
    }

    fn generate_member(
        &mut self,
        decl: &TypeDecl,
        member: &Member,
    ) -> Result<String, CodeGenError> {
        match member {
            Member::Field {
                name,
                ty,
                initializer,
                modifiers,
                ..
            } => self.generate_field(name, ty.as_ref(), initializer.as_ref(), modifiers),
            Member::Method(method) => self.generate_method(decl, method),
            Member::Constructor(constructor) => self.generate_constructor(decl, constructor),
            Member::Initializer {
                is_static,
                body,
                span,
            } => {
                let ctx = GenContext::new();
                let analysis = self.captures_for(*span, &[], body);
                let saved = std::mem::replace(&mut self.captures, analysis);
                let block = self.render_block(&ctx, &[], body, None);
                self.captures = saved;
                let block = block?;
                if *is_static {
                    Ok(format!("static {}", block))
                } else {
                    Ok(block)
                }
            }
        }
    }

    fn generate_field(
        &mut self,
        name: &str,
        ty: Option<&TypeRef>,
        initializer: Option<&Expression>,
        modifiers: &Modifiers,
    ) -> Result<String, CodeGenError> {
        let field_type = ty
            .cloned()
            .or_else(|| initializer.and_then(|expr| expr.static_type()))
            .filter(|ty| !ty.is_unknown() && !ty.is_void())
            .unwrap_or_else(TypeRef::object);
        let rendered_type = self.render_type(&field_type);
        let mods = Self::modifiers_text(modifiers);

        let initializer = if self.is_stub() { None } else { initializer };
        let Some(initializer) = initializer else {
            return Ok(format!("{}{} {};", mods, rendered_type, name));
        };
        let mut ctx = GenContext::new();
        ctx.declare_name(name);
        let code = self.generate_expression(&mut ctx, initializer)?;
        let code = self.cast_if_needed(&field_type, initializer.static_type().as_ref(), code);
        if !ctx.has_hoisted() {
            return Ok(format!("{}{} {} = {};", mods, rendered_type, name, code));
        }
        // A multi-statement initializer moves into an initializer block.
        let mut builder = self.builder();
        builder.push_line(&format!("{}{} {};", mods, rendered_type, name));
        builder.push_line("");
        builder.push(if modifiers.is_static { "static {\n" } else { "{\n" });
        builder.indent();
        for hoisted in ctx.take_hoisted() {
            Self::push_lines(&mut builder, &hoisted);
        }
        builder.push_line(&format!("{} = {};", name, code));
        builder.dedent();
        builder.push("}");
        Ok(builder.build())
    }

    fn generate_method(
        &mut self,
        decl: &TypeDecl,
        method: &MethodDecl,
    ) -> Result<String, CodeGenError> {
        let return_type = method
            .return_type
            .clone()
            .unwrap_or_else(TypeRef::object);
        let mut ctx = GenContext::new();

        let unit = self.unit.clone();
        let mut specs = Vec::with_capacity(method.params.len());
        for (index, param) in method.params.iter().enumerate() {
            let ty = self.inference.parameter_type(
                unit.as_deref(),
                &decl.name,
                &method.name,
                index,
                param,
            );
            specs.push((
                Some(param.local.id),
                param.local.name.clone(),
                ty,
                param.is_variadic,
            ));
        }

        let header_mods = Self::modifiers_text(&method.modifiers);
        let Some(body) = &method.body else {
            // Abstract or interface method.
            let java_params = self.lower_params(&mut ctx, &specs);
            return Ok(format!(
                "{}{} {}({});",
                header_mods,
                self.render_type(&return_type),
                method.name,
                Self::render_param_list(&java_params)
            ));
        };

        if self.is_stub() {
            let java_params = self.lower_params(&mut ctx, &specs);
            return Ok(format!(
                "{}{} {}({}) {}",
                header_mods,
                self.render_type(&return_type),
                method.name,
                Self::render_param_list(&java_params),
                Self::stub_body(&return_type)
            ));
        }

        let analysis = self.captures_for(method.span, &method.params, body);
        let saved_captures = std::mem::replace(&mut self.captures, analysis);
        let saved_return = self.current_return_type.replace(return_type.clone());
        let saved_has_value =
            std::mem::replace(&mut self.current_has_return_value, method.has_return_value);

        let java_params = self.lower_params(&mut ctx, &specs);
        let prologue: Vec<String> = java_params
            .iter()
            .filter_map(|param| param.prologue.clone())
            .collect();
        let trailing = (!return_type.is_void()
            && method.has_return_value
            && Self::can_complete_normally(body))
        .then_some("return null;");
        let block = self.render_block(&ctx, &prologue, body, trailing);

        self.captures = saved_captures;
        self.current_return_type = saved_return;
        self.current_has_return_value = saved_has_value;
        let block = block?;

        Ok(format!(
            "{}{} {}({}) {}",
            header_mods,
            self.render_type(&return_type),
            method.name,
            Self::render_param_list(&java_params),
            block
        ))
    }

    fn generate_constructor(
        &mut self,
        decl: &TypeDecl,
        constructor: &ConstructorDecl,
    ) -> Result<String, CodeGenError> {
        let mut ctx = GenContext::new();
        let specs: Vec<(Option<LocalId>, String, TypeRef, bool)> = constructor
            .params
            .iter()
            .map(|param| {
                (
                    Some(param.local.id),
                    param.local.name.clone(),
                    param
                        .local
                        .ty
                        .clone()
                        .unwrap_or_else(TypeRef::object),
                    param.is_variadic,
                )
            })
            .collect();
        let header_mods = Self::modifiers_text(&constructor.modifiers);

        if self.is_stub() {
            let java_params = self.lower_params(&mut ctx, &specs);
            return Ok(format!(
                "{}{}({}) {{\n}}",
                header_mods,
                decl.name,
                Self::render_param_list(&java_params)
            ));
        }

        let analysis = self.captures_for(constructor.span, &constructor.params, &constructor.body);
        let saved_captures = std::mem::replace(&mut self.captures, analysis);
        let saved_return = self.current_return_type.take();
        let saved_has_value = std::mem::replace(&mut self.current_has_return_value, false);

        let java_params = self.lower_params(&mut ctx, &specs);
        let mut prologue: Vec<String> = Vec::new();
        if let Some(delegate) = &constructor.delegate {
            // The chaining call must stay the first statement; defaults for
            // ambiguously-resolved overloads are substituted by the binder.
            let mut delegate_ctx = ctx.extend();
            let bound = self.bind_arguments(
                &mut delegate_ctx,
                delegate.resolved.as_ref(),
                &delegate.args,
                &[],
            )?;
            debug_assert!(
                !delegate_ctx.has_hoisted(),
                "constructor delegation arguments must lower inline"
            );
            let keyword = match delegate.kind {
                DelegateKind::This => "this",
                DelegateKind::Super => "super",
            };
            prologue.push(format!("{}({});", keyword, bound));
        }
        prologue.extend(
            java_params
                .iter()
                .filter_map(|param| param.prologue.clone()),
        );
        let block = self.render_block(&ctx, &prologue, &constructor.body, None);

        self.captures = saved_captures;
        self.current_return_type = saved_return;
        self.current_has_return_value = saved_has_value;
        let block = block?;

        Ok(format!(
            "{}{}({}) {}",
            header_mods,
            decl.name,
            Self::render_param_list(&java_params),
            block
        ))
    }

    fn stub_body(return_type: &TypeRef) -> String {
        if return_type.is_void() {
            "{\n}".to_string()
        } else {
            format!(
                "{{\n    return {};\n}}",
                crate::types::default_value(return_type)
            )
        }
    }

    fn modifiers_text(modifiers: &Modifiers) -> String {
        let mut out = String::new();
        match modifiers.visibility {
            Visibility::Public => out.push_str("public "),
            Visibility::Protected => out.push_str("protected "),
            Visibility::Private => out.push_str("private "),
            Visibility::Package => {}
        }
        if modifiers.is_static {
            out.push_str("static ");
        }
        if modifiers.is_abstract {
            out.push_str("abstract ");
        }
        if modifiers.is_final {
            out.push_str("final ");
        }
        if modifiers.is_synchronized {
            out.push_str("synchronized ");
        }
        out
    }
}
