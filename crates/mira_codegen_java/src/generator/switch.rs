use super::*;
use mira_ast::{CaseLabel, Expression, PropertyBinding, Statement, SwitchCase, TypeRef};

impl JavaCodeGenerator {
    /// Lowers a switch with one of two strategies, chosen once per node: a
    /// native Java switch when the selector type supports it, otherwise an
    /// if-chain driven by per-label `isCase` dispatch.
    pub(super) fn generate_switch(
        &mut self,
        ctx: &mut GenContext,
        selector: &Expression,
        cases: &[SwitchCase],
    ) -> Result<String, CodeGenError> {
        let default_sections = cases
            .iter()
            .filter(|case| {
                case.labels
                    .iter()
                    .any(|label| matches!(label, CaseLabel::Default))
            })
            .count();
        if default_sections > 1 {
            return Err(CodeGenError::InvalidSwitchCases {
                message: format!("{} default sections in one switch", default_sections),
                span: Some(selector.span()),
            });
        }

        let native = selector
            .static_type()
            .map(|ty| ty.is_switchable())
            .unwrap_or(false);
        if native {
            self.generate_native_switch(ctx, selector, cases)
        } else {
            self.generate_if_chain(ctx, selector, cases)
        }
    }

    /// Case bodies are translated verbatim; no break is injected, so source
    /// fallthrough carries over unchanged.
    fn generate_native_switch(
        &mut self,
        ctx: &mut GenContext,
        selector: &Expression,
        cases: &[SwitchCase],
    ) -> Result<String, CodeGenError> {
        let selector_code = self.generate_expression(ctx, selector)?;
        let mut builder = self.builder();
        builder.push(&format!("switch ({}) {{\n", selector_code));
        builder.indent();
        for case in cases {
            for label in &case.labels {
                match label {
                    CaseLabel::Expression(expr) => {
                        let label_code = self.case_label_text(ctx, selector, expr)?;
                        builder.push_line(&format!("case {}:", label_code));
                    }
                    CaseLabel::Default => builder.push_line("default:"),
                }
            }
            builder.indent();
            let mut child = ctx.extend();
            child.break_label = None;
            self.emit_statements(&mut child, &case.body, &mut builder)?;
            builder.dedent();
        }
        builder.dedent();
        builder.push("}");
        Ok(builder.build())
    }

    /// Java requires enum constants in `case` labels by their bare names, so
    /// a resolved constant reference is folded; everything else renders as a
    /// plain expression.
    fn case_label_text(
        &mut self,
        ctx: &mut GenContext,
        selector: &Expression,
        label: &Expression,
    ) -> Result<String, CodeGenError> {
        let enum_selector = matches!(
            selector.static_type(),
            Some(TypeRef::Named(named)) if named.is_enum
        );
        if enum_selector {
            if let Expression::PropertyAccess {
                binding: PropertyBinding::Resolved(property),
                ..
            } = label
            {
                return Ok(property.name.clone());
            }
        }
        self.generate_expression(ctx, label)
    }

    fn generate_if_chain(
        &mut self,
        ctx: &mut GenContext,
        selector: &Expression,
        cases: &[SwitchCase],
    ) -> Result<String, CodeGenError> {
        let subject = self.switch_subject(ctx, selector)?;

        // The chain itself is not a breakable statement; when a section
        // breaks from inside an if or a nested block, the whole chain is
        // wrapped in a labeled block for those breaks to land on.
        let needs_label = cases
            .iter()
            .any(|case| Self::section_has_nested_break(&case.body));
        let label = needs_label.then(|| ctx.fresh_name("caseBlock"));

        let mut segments: Vec<(String, String)> = Vec::new();
        let mut default_body: Option<String> = None;
        let mut pending: Vec<String> = Vec::new();

        for (index, case) in cases.iter().enumerate() {
            let is_default = case
                .labels
                .iter()
                .any(|label| matches!(label, CaseLabel::Default));
            let mut tests = Vec::new();
            for label in &case.labels {
                if let CaseLabel::Expression(expr) = label {
                    let label_code = self.operand(ctx, expr)?;
                    tests.push(format!("{}.isCase({})", label_code, subject));
                }
            }

            if case.body.is_empty() && !is_default {
                // Empty sections group into the next non-empty section's test.
                pending.append(&mut tests);
                continue;
            }

            let statements = Self::chain_body_statements(cases, index);
            let body = self.render_chain_block(ctx, &statements, label.as_deref())?;
            if is_default {
                default_body = Some(body);
            } else {
                let mut all_tests = std::mem::take(&mut pending);
                all_tests.append(&mut tests);
                segments.push((all_tests.join(" || "), body));
            }
        }

        let chain = match (segments.is_empty(), default_body) {
            (true, Some(body)) => format!("if (true) {}", body),
            (true, None) => String::new(),
            (false, default_body) => {
                let mut out = String::new();
                for (index, (cond, body)) in segments.iter().enumerate() {
                    if index == 0 {
                        out.push_str(&format!("if ({}) {}", cond, body));
                    } else {
                        out.push_str(&format!(" else if ({}) {}", cond, body));
                    }
                }
                if let Some(body) = default_body {
                    out.push_str(&format!(" else {}", body));
                }
                out
            }
        };

        match label {
            Some(label) if !chain.is_empty() => {
                let mut builder = self.builder();
                builder.push(&format!("{}: {{\n", label));
                builder.indent();
                Self::push_lines(&mut builder, &chain);
                builder.dedent();
                builder.push("}");
                Ok(builder.build())
            }
            _ => Ok(chain),
        }
    }

    /// Renders the selector once; composite selectors are hoisted into a
    /// temporary so every `isCase` test sees one evaluation.
    fn switch_subject(
        &mut self,
        ctx: &mut GenContext,
        selector: &Expression,
    ) -> Result<String, CodeGenError> {
        let code = self.generate_expression(ctx, selector)?;
        if matches!(
            selector,
            Expression::LocalRef { .. } | Expression::This { .. }
        ) {
            return Ok(code);
        }
        let ty = self.render_optional_type(selector.static_type().as_ref());
        let subject = ctx.fresh_name("subject");
        ctx.hoist(format!("final {} {} = {};", ty, subject, code));
        Ok(subject)
    }

    /// Effective statements of an if-chain branch: the section's own body,
    /// then subsequent sections' bodies inlined while the emitted tail can
    /// complete normally. An unlabeled break falls out of the chain and
    /// stops emission.
    fn chain_body_statements(cases: &[SwitchCase], start: usize) -> Vec<&Statement> {
        let mut out: Vec<&Statement> = Vec::new();
        let mut index = start;
        loop {
            let mut terminated = false;
            for statement in &cases[index].body {
                if matches!(statement, Statement::Break { label: None, .. }) {
                    terminated = true;
                    break;
                }
                out.push(statement);
            }
            if terminated {
                break;
            }
            let completes = out
                .last()
                .map(|statement| Self::statement_ref_completes(statement))
                .unwrap_or(true);
            if completes && index + 1 < cases.len() {
                index += 1;
            } else {
                break;
            }
        }
        out
    }

    fn statement_ref_completes(statement: &Statement) -> bool {
        Self::can_complete_normally(std::slice::from_ref(statement))
    }

    /// True when a section keeps an unlabeled break below its top level.
    /// Top-level breaks are consumed as section terminators and never reach
    /// the emitted chain.
    fn section_has_nested_break(body: &[Statement]) -> bool {
        for statement in body {
            if matches!(statement, Statement::Break { label: None, .. }) {
                return false;
            }
            if Self::statement_has_unlabeled_break(statement) {
                return true;
            }
        }
        false
    }

    fn statement_has_unlabeled_break(statement: &Statement) -> bool {
        match statement {
            Statement::Break { label: None, .. } => true,
            Statement::If {
                then_branch,
                else_branch,
                ..
            } => {
                Self::statement_has_unlabeled_break(then_branch)
                    || else_branch
                        .as_deref()
                        .map(Self::statement_has_unlabeled_break)
                        .unwrap_or(false)
            }
            Statement::Block { statements, .. } => {
                statements.iter().any(Self::statement_has_unlabeled_break)
            }
            Statement::Labeled { statement, .. } => {
                Self::statement_has_unlabeled_break(statement)
            }
            Statement::Synchronized { body, .. } => {
                body.iter().any(Self::statement_has_unlabeled_break)
            }
            Statement::Try {
                body,
                catches,
                finally_block,
                ..
            } => {
                body.iter().any(Self::statement_has_unlabeled_break)
                    || catches.iter().any(|clause| {
                        clause.body.iter().any(Self::statement_has_unlabeled_break)
                    })
                    || finally_block
                        .as_ref()
                        .map(|block| block.iter().any(Self::statement_has_unlabeled_break))
                        .unwrap_or(false)
            }
            // Loops and nested switches rebind unlabeled breaks themselves.
            _ => false,
        }
    }

    fn render_chain_block(
        &mut self,
        ctx: &GenContext,
        statements: &[&Statement],
        break_target: Option<&str>,
    ) -> Result<String, CodeGenError> {
        let mut child = ctx.extend();
        child.break_label = break_target.map(str::to_string);
        let mut builder = self.builder();
        builder.push("{\n");
        builder.indent();
        for statement in statements {
            let code = self.generate_statement(&mut child, statement)?;
            for hoisted in child.take_hoisted() {
                Self::push_lines(&mut builder, &hoisted);
            }
            Self::push_lines(&mut builder, &code);
        }
        builder.dedent();
        builder.push("}");
        Ok(builder.build())
    }
}
