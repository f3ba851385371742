use super::*;
use crate::capture::CaptureKind;
use mira_ast::{DeclaredLocal, Expression, Statement};

/// One formal parameter as it appears in a generated Java signature.
pub(super) struct JavaParam {
    pub name: String,
    pub rendered_type: String,
    pub prologue: Option<String>,
    pub is_variadic: bool,
}

impl JavaCodeGenerator {
    /// Lowers formal parameters for a method, constructor, or anonymous-class
    /// method. A boxed parameter keeps its source name for the reference cell
    /// and takes a fresh name in the raw signature, with a prologue line that
    /// wraps the raw value.
    pub(super) fn lower_params(
        &mut self,
        ctx: &mut GenContext,
        params: &[(Option<LocalId>, String, TypeRef, bool)],
    ) -> Vec<JavaParam> {
        let mut lowered = Vec::with_capacity(params.len());
        for (id, name, ty, is_variadic) in params {
            ctx.declare_name(name);
            let boxed = matches!(id, Some(id) if self.is_boxed(*id));
            let rendered_type = if *is_variadic {
                match ty {
                    TypeRef::Array { element } => format!("{}...", self.render_type(element)),
                    other => format!("{}...", self.render_type(other)),
                }
            } else {
                self.render_type(ty)
            };
            if boxed {
                let raw = ctx.fresh_name(&format!("{}Value", name));
                let prologue = format!(
                    "final {} {} = new {}<>({});",
                    self.render_boxed_value_type(ty),
                    name,
                    REF_CLASS,
                    raw
                );
                lowered.push(JavaParam {
                    name: raw,
                    rendered_type,
                    prologue: Some(prologue),
                    is_variadic: *is_variadic,
                });
            } else {
                lowered.push(JavaParam {
                    name: name.clone(),
                    rendered_type,
                    prologue: None,
                    is_variadic: *is_variadic,
                });
            }
        }
        lowered
    }

    pub(super) fn render_param_list(params: &[JavaParam]) -> String {
        params
            .iter()
            .map(|param| format!("{} {}", param.rendered_type, param.name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Emits a statement sequence into `builder`, flushing each statement's
    /// hoisted prefix immediately before the statement itself.
    pub(super) fn emit_statements(
        &mut self,
        ctx: &mut GenContext,
        statements: &[Statement],
        builder: &mut JavaSourceBuilder,
    ) -> Result<(), CodeGenError> {
        for statement in statements {
            let code = self.generate_statement(ctx, statement)?;
            for hoisted in ctx.take_hoisted() {
                Self::push_lines(builder, &hoisted);
            }
            Self::push_lines(builder, &code);
        }
        Ok(())
    }

    /// Renders `{ ... }` block text under a child scope of `parent`.
    pub(super) fn render_block(
        &mut self,
        parent: &GenContext,
        prologue: &[String],
        statements: &[Statement],
        trailing: Option<&str>,
    ) -> Result<String, CodeGenError> {
        let mut child = parent.extend();
        let mut builder = self.builder();
        builder.push("{\n");
        builder.indent();
        for line in prologue {
            Self::push_lines(&mut builder, line);
        }
        self.emit_statements(&mut child, statements, &mut builder)?;
        if let Some(trailing) = trailing {
            builder.push_line(trailing);
        }
        builder.dedent();
        builder.push("}");
        Ok(builder.build())
    }

    fn branch_block(
        &mut self,
        ctx: &GenContext,
        statement: &Statement,
    ) -> Result<String, CodeGenError> {
        self.render_block(ctx, &[], Self::statement_body(statement), None)
    }

    /// Loop body block. Unlabeled breaks inside bind to the loop itself, so
    /// any pending break retarget stops here.
    fn loop_block(
        &mut self,
        ctx: &GenContext,
        statement: &Statement,
    ) -> Result<String, CodeGenError> {
        let mut child = ctx.extend();
        child.break_label = None;
        self.render_block(&child, &[], Self::statement_body(statement), None)
    }

    fn statement_body(statement: &Statement) -> &[Statement] {
        match statement {
            Statement::Block { statements, .. } => statements,
            other => std::slice::from_ref(other),
        }
    }

    pub fn generate_statement(
        &mut self,
        ctx: &mut GenContext,
        statement: &Statement,
    ) -> Result<String, CodeGenError> {
        match statement {
            Statement::Expression {
                expr,
                is_method_exit,
                ..
            } => {
                let code = self.generate_expression(ctx, expr)?;
                if *is_method_exit {
                    if let Some(return_type) = self.current_return_type.clone() {
                        if !return_type.is_void() && self.current_has_return_value {
                            let coerced = self.cast_if_needed(
                                &return_type,
                                expr.static_type().as_ref(),
                                code,
                            );
                            return Ok(format!("return {};", coerced));
                        }
                    }
                }
                Ok(format!("{};", code))
            }
            Statement::VariableDeclaration {
                locals,
                initializer,
                iteration_method,
                ..
            } => {
                if locals.len() <= 1 {
                    let Some(local) = locals.first() else {
                        return Err(CodeGenError::MalformedTree {
                            message: "variable declaration without declared locals".to_string(),
                            span: Some(statement.span()),
                        });
                    };
                    self.generate_single_declaration(ctx, local, initializer.as_ref())
                } else {
                    self.generate_destructuring(
                        ctx,
                        locals,
                        initializer.as_ref(),
                        iteration_method.as_ref().map(|sig| sig.name.as_str()),
                        statement,
                    )
                }
            }
            Statement::Return { value, .. } => match value {
                Some(value) => {
                    let code = self.generate_expression(ctx, value)?;
                    let coerced = match self.current_return_type.clone() {
                        Some(return_type) if !return_type.is_void() => {
                            self.cast_if_needed(&return_type, value.static_type().as_ref(), code)
                        }
                        _ => code,
                    };
                    Ok(format!("return {};", coerced))
                }
                None => Ok("return;".to_string()),
            },
            Statement::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                let cond = self.condition_text(ctx, condition)?;
                let then_code = self.branch_block(ctx, then_branch)?;
                let mut out = format!("if ({}) {}", cond, then_code);
                if let Some(else_branch) = else_branch {
                    let else_code = self.branch_block(ctx, else_branch)?;
                    out.push_str(&format!(" else {}", else_code));
                }
                Ok(out)
            }
            Statement::While {
                condition, body, ..
            } => {
                let cond = self.condition_text(ctx, condition)?;
                let body_code = self.loop_block(ctx, body)?;
                Ok(format!("while ({}) {}", cond, body_code))
            }
            Statement::For {
                init,
                condition,
                update,
                body,
                ..
            } => self.generate_for(ctx, init, condition.as_ref(), update, body),
            Statement::ForEach {
                variable,
                iterable,
                body,
                ..
            } => self.generate_for_each(ctx, variable, iterable, body),
            Statement::Switch {
                selector, cases, ..
            } => self.generate_switch(ctx, selector, cases),
            Statement::Try {
                body,
                catches,
                finally_block,
                ..
            } => {
                let mut out = format!("try {}", self.render_block(ctx, &[], body, None)?);
                for catch in catches {
                    let mut child = ctx.extend();
                    child.declare_name(&catch.parameter.name);
                    let block = self.render_block(&child, &[], &catch.body, None)?;
                    out.push_str(&format!(
                        " catch ({} {}) {}",
                        self.render_type(&catch.exception_type),
                        catch.parameter.name,
                        block
                    ));
                }
                if let Some(finally_block) = finally_block {
                    out.push_str(&format!(
                        " finally {}",
                        self.render_block(ctx, &[], finally_block, None)?
                    ));
                }
                Ok(out)
            }
            Statement::Throw { expr, .. } => {
                let code = self.generate_expression(ctx, expr)?;
                Ok(format!("throw {};", code))
            }
            Statement::Break { label, .. } => match (label, &ctx.break_label) {
                (Some(label), _) => Ok(format!("break {};", label)),
                (None, Some(target)) => Ok(format!("break {};", target)),
                (None, None) => Ok("break;".to_string()),
            },
            Statement::Continue { label, .. } => match label {
                Some(label) => Ok(format!("continue {};", label)),
                None => Ok("continue;".to_string()),
            },
            Statement::Block { statements, .. } => self.render_block(ctx, &[], statements, None),
            Statement::Labeled {
                label, statement, ..
            } => {
                let code = self.generate_statement(ctx, statement)?;
                Ok(format!("{}: {}", label, code))
            }
            Statement::Synchronized { monitor, body, .. } => {
                let monitor_code = self.generate_expression(ctx, monitor)?;
                let block = self.render_block(ctx, &[], body, None)?;
                Ok(format!("synchronized ({}) {}", monitor_code, block))
            }
            Statement::Unsupported { description, .. } => {
                Ok(format!("/* TODO: unsupported construct: {} */", description))
            }
        }
    }

    fn generate_single_declaration(
        &mut self,
        ctx: &mut GenContext,
        local: &DeclaredLocal,
        initializer: Option<&Expression>,
    ) -> Result<String, CodeGenError> {
        let ty = self.inference.local_type(local, initializer);
        let rendered_type = self.render_type(&ty);
        ctx.declare_name(&local.name);
        let init_code = match initializer {
            Some(initializer) => {
                let code = self.generate_expression(ctx, initializer)?;
                Some(self.cast_if_needed(&ty, initializer.static_type().as_ref(), code))
            }
            None => None,
        };
        match self.capture_kind(local.id) {
            CaptureKind::Boxed => {
                let init = init_code
                    .unwrap_or_else(|| crate::types::default_value(&ty).to_string());
                Ok(format!(
                    "final {} {} = new {}<>({});",
                    self.render_boxed_value_type(&ty),
                    local.name,
                    REF_CLASS,
                    init
                ))
            }
            CaptureKind::Final => match init_code {
                Some(init) => Ok(format!(
                    "final {} {} = {};",
                    rendered_type, local.name, init
                )),
                None => Ok(format!("{} {};", rendered_type, local.name)),
            },
            CaptureKind::Mutable => match init_code {
                Some(init) => Ok(format!("{} {} = {};", rendered_type, local.name, init)),
                None => Ok(format!("{} {};", rendered_type, local.name)),
            },
        }
    }

    fn generate_destructuring(
        &mut self,
        ctx: &mut GenContext,
        locals: &[DeclaredLocal],
        initializer: Option<&Expression>,
        iteration_method: Option<&str>,
        statement: &Statement,
    ) -> Result<String, CodeGenError> {
        let mut lines = Vec::new();
        match initializer {
            // A literal initializer destructures positionally without any
            // runtime iteration.
            Some(Expression::ListLiteral { elements, .. }) => {
                for (index, local) in locals.iter().enumerate() {
                    let line = self.generate_single_declaration(
                        ctx,
                        local,
                        elements.get(index),
                    )?;
                    lines.push(line);
                }
            }
            Some(Expression::MapLiteral { entries, .. }) => {
                for (index, local) in locals.iter().enumerate() {
                    let line = self.generate_single_declaration(
                        ctx,
                        local,
                        entries.get(index).map(|entry| &entry.value),
                    )?;
                    lines.push(line);
                }
            }
            Some(initializer) => {
                let source = self.generate_expression(ctx, initializer)?;
                let method = iteration_method.unwrap_or("iterator");
                let iterator = ctx.fresh_name("iterator");
                lines.push(format!(
                    "final java.util.Iterator<java.lang.Object> {} = {}.{}();",
                    iterator,
                    Self::parenthesize(source),
                    method
                ));
                for local in locals {
                    let ty = self.inference.local_type(local, None);
                    let pull = format!("{0}.hasNext() ? {0}.next() : null", iterator);
                    let value = if ty.is_object() || ty.is_unknown() {
                        format!("({})", pull)
                    } else {
                        format!("({}) ({})", self.render_type(&ty), pull)
                    };
                    ctx.declare_name(&local.name);
                    let rendered_type = self.render_type(&ty);
                    match self.capture_kind(local.id) {
                        CaptureKind::Boxed => lines.push(format!(
                            "final {} {} = new {}<>({});",
                            self.render_boxed_value_type(&ty),
                            local.name,
                            REF_CLASS,
                            value
                        )),
                        CaptureKind::Final => lines.push(format!(
                            "final {} {} = {};",
                            rendered_type, local.name, value
                        )),
                        CaptureKind::Mutable => lines.push(format!(
                            "{} {} = {};",
                            rendered_type, local.name, value
                        )),
                    }
                }
            }
            None => {
                return Err(CodeGenError::MalformedTree {
                    message: "destructuring declaration without an initializer".to_string(),
                    span: Some(statement.span()),
                });
            }
        }
        Ok(lines.join("\n"))
    }

    fn generate_for(
        &mut self,
        ctx: &mut GenContext,
        init: &[Statement],
        condition: Option<&Expression>,
        update: &[Expression],
        body: &Statement,
    ) -> Result<String, CodeGenError> {
        let mut child = ctx.extend();
        let mut before_loop = Vec::new();

        // Hoists raised by initializer parts splice into the initializer
        // list itself, comma-joined, so scoping stays inside the loop header.
        let mut init_parts = Vec::new();
        for statement in init {
            let code = self.generate_statement(&mut child, statement)?;
            for hoisted in child.take_hoisted() {
                init_parts.push(hoisted.trim_end_matches(';').to_string());
            }
            init_parts.push(code.trim_end_matches(';').to_string());
        }

        let cond_code = match condition {
            Some(condition) => {
                let code = self.condition_text(&mut child, condition)?;
                before_loop.extend(child.take_hoisted());
                code
            }
            None => String::new(),
        };

        let mut update_parts = Vec::new();
        for expression in update {
            let code = self.generate_expression(&mut child, expression)?;
            before_loop.extend(child.take_hoisted());
            update_parts.push(code);
        }

        child.break_label = None;
        let block = self.render_block(&child, &[], Self::statement_body(body), None)?;
        let header = format!(
            "for ({}; {}; {}) {}",
            init_parts.join(", "),
            cond_code,
            update_parts.join(", "),
            block
        );
        if before_loop.is_empty() {
            Ok(header)
        } else {
            before_loop.push(header);
            Ok(before_loop.join("\n"))
        }
    }

    fn generate_for_each(
        &mut self,
        ctx: &mut GenContext,
        variable: &DeclaredLocal,
        iterable: &Expression,
        body: &Statement,
    ) -> Result<String, CodeGenError> {
        let iterable_code = self.generate_expression(ctx, iterable)?;
        let ty = self.inference.local_type(variable, None);
        let rendered_type = self.render_type(&ty);
        let mut child = ctx.extend();
        child.break_label = None;
        child.declare_name(&variable.name);
        let (loop_name, prologue) = if self.is_boxed(variable.id) {
            let raw = child.fresh_name(&format!("{}Value", variable.name));
            let line = format!(
                "final {} {} = new {}<>({});",
                self.render_boxed_value_type(&ty),
                variable.name,
                REF_CLASS,
                raw
            );
            (raw, vec![line])
        } else {
            (variable.name.clone(), Vec::new())
        };
        let block =
            self.render_block(&child, &prologue, Self::statement_body(body), None)?;
        Ok(format!(
            "for ({} {} : {}) {}",
            rendered_type, loop_name, iterable_code, block
        ))
    }

    /// Whether execution can reach the end of the statement sequence.
    pub(super) fn can_complete_normally(statements: &[Statement]) -> bool {
        match statements.last() {
            None => true,
            Some(last) => Self::statement_completes_normally(last),
        }
    }

    fn statement_completes_normally(statement: &Statement) -> bool {
        match statement {
            Statement::Return { .. }
            | Statement::Throw { .. }
            | Statement::Break { .. }
            | Statement::Continue { .. } => false,
            Statement::Expression { is_method_exit, .. } => !is_method_exit,
            Statement::If {
                then_branch,
                else_branch: Some(else_branch),
                ..
            } => {
                Self::statement_completes_normally(then_branch)
                    || Self::statement_completes_normally(else_branch)
            }
            Statement::Block { statements, .. } => Self::can_complete_normally(statements),
            Statement::Labeled { statement, .. } => Self::statement_completes_normally(statement),
            Statement::Synchronized { body, .. } => Self::can_complete_normally(body),
            _ => true,
        }
    }
}
