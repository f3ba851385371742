use mira_ast::{
    CaseLabel, ClosureParam, DeclaredLocal, Expression, LocalId, Parameter, Statement,
};
use std::collections::{HashMap, HashSet};

/// How a local variable must be materialized in generated Java.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureKind {
    /// Never reassigned; declared `final`, safe to capture directly.
    Final,
    /// Reassigned but never observed across a closure boundary.
    Mutable,
    /// Reassigned and touched across a closure boundary; routed through a
    /// mutable reference cell.
    Boxed,
}

/// Result of analysing one declaration body. Locals absent from the map were
/// never reassigned and default to [`CaptureKind::Final`].
#[derive(Debug, Clone, Default)]
pub struct CaptureAnalysis {
    kinds: HashMap<LocalId, CaptureKind>,
}

impl CaptureAnalysis {
    pub fn kind(&self, id: LocalId) -> CaptureKind {
        self.kinds.get(&id).copied().unwrap_or(CaptureKind::Final)
    }

    pub fn is_boxed(&self, id: LocalId) -> bool {
        self.kind(id) == CaptureKind::Boxed
    }
}

/// Walks a declaration body once and classifies every local it declares.
///
/// The walk tracks a nesting grade that increases inside closure bodies and
/// anonymous-class method bodies. A local is boxed exactly when it is both
/// reassigned somewhere and referenced at a grade above its declaration
/// grade; reassignment alone keeps it a plain mutable, capture alone keeps
/// it final.
pub fn analyze(params: &[Parameter], body: &[Statement]) -> CaptureAnalysis {
    let mut walker = CaptureWalker::default();
    for param in params {
        walker.declare(&param.local);
    }
    walker.visit_statements(body);
    walker.finish()
}

#[derive(Default)]
struct CaptureWalker {
    grade: u32,
    declared: HashMap<LocalId, u32>,
    written: HashSet<LocalId>,
    crossed: HashSet<LocalId>,
}

impl CaptureWalker {
    fn declare(&mut self, local: &DeclaredLocal) {
        self.declared.insert(local.id, self.grade);
    }

    fn declare_closure_param(&mut self, param: &ClosureParam) {
        self.declared.insert(param.id, self.grade);
    }

    fn reference(&mut self, id: LocalId) {
        if let Some(&decl_grade) = self.declared.get(&id) {
            if self.grade > decl_grade {
                self.crossed.insert(id);
            }
        }
    }

    fn write(&mut self, target: &Expression) {
        if let Expression::LocalRef { id, .. } = target {
            self.written.insert(*id);
        }
    }

    fn visit_statements(&mut self, statements: &[Statement]) {
        for statement in statements {
            self.visit_statement(statement);
        }
    }

    fn visit_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Expression { expr, .. } => self.visit_expression(expr),
            Statement::VariableDeclaration {
                locals,
                initializer,
                ..
            } => {
                if let Some(initializer) = initializer {
                    self.visit_expression(initializer);
                }
                for local in locals {
                    self.declare(local);
                }
            }
            Statement::Return { value, .. } => {
                if let Some(value) = value {
                    self.visit_expression(value);
                }
            }
            Statement::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                self.visit_expression(condition);
                self.visit_statement(then_branch);
                if let Some(else_branch) = else_branch {
                    self.visit_statement(else_branch);
                }
            }
            Statement::While {
                condition, body, ..
            } => {
                self.visit_expression(condition);
                self.visit_statement(body);
            }
            Statement::For {
                init,
                condition,
                update,
                body,
                ..
            } => {
                self.visit_statements(init);
                if let Some(condition) = condition {
                    self.visit_expression(condition);
                }
                for expr in update {
                    self.visit_expression(expr);
                }
                self.visit_statement(body);
            }
            Statement::ForEach {
                variable,
                iterable,
                body,
                ..
            } => {
                self.visit_expression(iterable);
                self.declare(variable);
                self.visit_statement(body);
            }
            Statement::Switch {
                selector, cases, ..
            } => {
                self.visit_expression(selector);
                for case in cases {
                    for label in &case.labels {
                        if let CaseLabel::Expression(expr) = label {
                            self.visit_expression(expr);
                        }
                    }
                    self.visit_statements(&case.body);
                }
            }
            Statement::Try {
                body,
                catches,
                finally_block,
                ..
            } => {
                self.visit_statements(body);
                for catch in catches {
                    self.declare(&catch.parameter);
                    self.visit_statements(&catch.body);
                }
                if let Some(finally_block) = finally_block {
                    self.visit_statements(finally_block);
                }
            }
            Statement::Throw { expr, .. } => self.visit_expression(expr),
            Statement::Block { statements, .. } => self.visit_statements(statements),
            Statement::Labeled { statement, .. } => self.visit_statement(statement),
            Statement::Synchronized { monitor, body, .. } => {
                self.visit_expression(monitor);
                self.visit_statements(body);
            }
            Statement::Break { .. }
            | Statement::Continue { .. }
            | Statement::Unsupported { .. } => {}
        }
    }

    fn visit_expression(&mut self, expression: &Expression) {
        match expression {
            Expression::LocalRef { id, .. } => self.reference(*id),
            Expression::PropertyAccess { receiver, .. } => {
                if let Some(receiver) = receiver {
                    self.visit_expression(receiver);
                }
            }
            Expression::IndexAccess {
                receiver, index, ..
            } => {
                self.visit_expression(receiver);
                self.visit_expression(index);
            }
            Expression::Call {
                receiver,
                args,
                trailing_closures,
                ..
            } => {
                if let Some(receiver) = receiver {
                    self.visit_expression(receiver);
                }
                for arg in args {
                    self.visit_expression(&arg.value);
                }
                for closure in trailing_closures {
                    self.visit_expression(closure);
                }
            }
            Expression::New { args, .. } => {
                for arg in args {
                    self.visit_expression(&arg.value);
                }
            }
            Expression::Binary { left, right, .. } => {
                self.visit_expression(left);
                self.visit_expression(right);
            }
            Expression::Unary { operand, .. } => self.visit_expression(operand),
            Expression::Assignment { target, value, .. } => {
                self.write(target);
                self.visit_expression(target);
                self.visit_expression(value);
            }
            Expression::IncDec { target, .. } => {
                self.write(target);
                self.visit_expression(target);
            }
            Expression::NullSafe { receiver, .. } => self.visit_expression(receiver),
            Expression::Elvis {
                value, fallback, ..
            } => {
                self.visit_expression(value);
                self.visit_expression(fallback);
            }
            Expression::Conditional {
                condition,
                then_expr,
                else_expr,
                ..
            } => {
                self.visit_expression(condition);
                self.visit_expression(then_expr);
                self.visit_expression(else_expr);
            }
            Expression::ListLiteral { elements, .. } => {
                for element in elements {
                    self.visit_expression(element);
                }
            }
            Expression::MapLiteral { entries, .. } => {
                for entry in entries {
                    self.visit_expression(&entry.key);
                    self.visit_expression(&entry.value);
                }
            }
            Expression::RangeLiteral { from, to, .. } => {
                self.visit_expression(from);
                self.visit_expression(to);
            }
            Expression::InterfaceFromMap { methods, .. } => {
                self.grade += 1;
                for method in methods {
                    self.visit_expression(&method.closure);
                }
                self.grade -= 1;
            }
            Expression::Closure { params, body, .. } => {
                self.grade += 1;
                for param in params {
                    self.declare_closure_param(param);
                    if let Some(default) = &param.default_value {
                        self.visit_expression(default);
                    }
                }
                self.visit_statements(body);
                self.grade -= 1;
            }
            Expression::Cast { operand, .. } | Expression::TypeTest { operand, .. } => {
                self.visit_expression(operand)
            }
            Expression::Literal(_, _) | Expression::This { .. } | Expression::Super { .. } => {}
        }
    }

    fn finish(self) -> CaptureAnalysis {
        let mut kinds = HashMap::new();
        for id in &self.written {
            let kind = if self.crossed.contains(id) {
                CaptureKind::Boxed
            } else {
                CaptureKind::Mutable
            };
            kinds.insert(*id, kind);
        }
        CaptureAnalysis { kinds }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mira_ast::*;

    fn local_ref(id: u32, name: &str) -> Expression {
        Expression::LocalRef {
            id: LocalId(id),
            name: name.to_string(),
            ty: TypeRef::int(),
            span: Span::dummy(),
        }
    }

    fn assign(id: u32, name: &str, value: Expression) -> Statement {
        Statement::Expression {
            expr: Expression::Assignment {
                target: Box::new(local_ref(id, name)),
                op: None,
                value: Box::new(value),
                value_used: false,
                span: Span::dummy(),
            },
            is_method_exit: false,
            span: Span::dummy(),
        }
    }

    fn declare(id: u32, name: &str, initializer: Expression) -> Statement {
        Statement::VariableDeclaration {
            locals: vec![DeclaredLocal::new(LocalId(id), name)],
            initializer: Some(initializer),
            iteration_method: None,
            span: Span::dummy(),
        }
    }

    fn closure_over(body: Vec<Statement>) -> Expression {
        Expression::Closure {
            params: vec![],
            body,
            shape: None,
            span: Span::dummy(),
        }
    }

    fn int_lit(text: &str) -> Expression {
        Expression::Literal(Literal::Number(text.to_string()), Span::dummy())
    }

    #[test]
    fn unwritten_local_stays_final() {
        let body = vec![
            declare(1, "x", int_lit("1")),
            Statement::Expression {
                expr: closure_over(vec![Statement::Return {
                    value: Some(local_ref(1, "x")),
                    span: Span::dummy(),
                }]),
                is_method_exit: false,
                span: Span::dummy(),
            },
        ];
        let analysis = analyze(&[], &body);
        assert_eq!(analysis.kind(LocalId(1)), CaptureKind::Final);
    }

    #[test]
    fn written_but_uncaptured_local_is_mutable() {
        let body = vec![
            declare(1, "x", int_lit("1")),
            assign(1, "x", int_lit("2")),
        ];
        let analysis = analyze(&[], &body);
        assert_eq!(analysis.kind(LocalId(1)), CaptureKind::Mutable);
        assert!(!analysis.is_boxed(LocalId(1)));
    }

    #[test]
    fn written_and_captured_local_is_boxed() {
        let body = vec![
            declare(1, "count", int_lit("0")),
            Statement::Expression {
                expr: closure_over(vec![assign(
                    1,
                    "count",
                    Expression::Binary {
                        op: BinaryOp::Add,
                        left: Box::new(local_ref(1, "count")),
                        right: Box::new(int_lit("1")),
                        resolved_method: None,
                        ty: TypeRef::int(),
                        span: Span::dummy(),
                    },
                )]),
                is_method_exit: false,
                span: Span::dummy(),
            },
        ];
        let analysis = analyze(&[], &body);
        assert!(analysis.is_boxed(LocalId(1)));
    }

    #[test]
    fn write_outside_with_read_inside_boxes() {
        let body = vec![
            declare(1, "x", int_lit("0")),
            assign(1, "x", int_lit("5")),
            Statement::Expression {
                expr: closure_over(vec![Statement::Return {
                    value: Some(local_ref(1, "x")),
                    span: Span::dummy(),
                }]),
                is_method_exit: false,
                span: Span::dummy(),
            },
        ];
        let analysis = analyze(&[], &body);
        assert!(analysis.is_boxed(LocalId(1)));
    }

    #[test]
    fn closure_own_param_is_not_boxed() {
        let closure = Expression::Closure {
            params: vec![ClosureParam {
                id: LocalId(9),
                name: "it".to_string(),
                ty: None,
                default_value: None,
            }],
            body: vec![assign(9, "it", int_lit("3"))],
            shape: None,
            span: Span::dummy(),
        };
        let body = vec![Statement::Expression {
            expr: closure,
            is_method_exit: false,
            span: Span::dummy(),
        }];
        let analysis = analyze(&[], &body);
        assert_eq!(analysis.kind(LocalId(9)), CaptureKind::Mutable);
    }

    #[test]
    fn reassigned_method_param_crossing_boundary_is_boxed() {
        let param = Parameter::new(DeclaredLocal::new(LocalId(1), "seed"));
        let body = vec![
            assign(1, "seed", int_lit("7")),
            Statement::Expression {
                expr: closure_over(vec![Statement::Return {
                    value: Some(local_ref(1, "seed")),
                    span: Span::dummy(),
                }]),
                is_method_exit: false,
                span: Span::dummy(),
            },
        ];
        let analysis = analyze(&[param], &body);
        assert!(analysis.is_boxed(LocalId(1)));
    }
}
