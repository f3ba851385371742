// mira_ast/statement - Statement nodes of the resolved tree
use crate::expression::Expression;
use crate::resolution::ResolvedSignature;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// A local variable being introduced by a declaration statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclaredLocal {
    pub id: LocalId,
    pub name: String,
    /// Declared type; `None` for untyped declarations, whose type the
    /// converter infers from the initializer.
    #[serde(default)]
    pub ty: Option<TypeRef>,
}

impl DeclaredLocal {
    pub fn new(id: LocalId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ty: None,
        }
    }

    pub fn typed(id: LocalId, name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            id,
            name: name.into(),
            ty: Some(ty),
        }
    }
}

/// One label of a switch case section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CaseLabel {
    Expression(Expression),
    Default,
}

/// One case section of a switch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchCase {
    pub labels: Vec<CaseLabel>,
    pub body: Vec<Statement>,
    pub span: Span,
}

/// One catch clause of a try statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchClause {
    pub parameter: DeclaredLocal,
    pub exception_type: TypeRef,
    pub body: Vec<Statement>,
    pub span: Span,
}

/// Statement node of the resolved tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    Expression {
        expr: Expression,
        /// True when this statement is the value-producing exit point of a
        /// method whose last statement is an expression.
        #[serde(default)]
        is_method_exit: bool,
        span: Span,
    },

    /// Declaration of one local, or several for a destructuring form.
    VariableDeclaration {
        locals: Vec<DeclaredLocal>,
        initializer: Option<Expression>,
        /// Iteration method the resolver bound for destructuring a
        /// non-literal initializer.
        #[serde(default)]
        iteration_method: Option<ResolvedSignature>,
        span: Span,
    },

    Return {
        value: Option<Expression>,
        span: Span,
    },

    If {
        condition: Expression,
        then_branch: Box<Statement>,
        else_branch: Option<Box<Statement>>,
        span: Span,
    },

    While {
        condition: Expression,
        body: Box<Statement>,
        span: Span,
    },

    For {
        init: Vec<Statement>,
        condition: Option<Expression>,
        update: Vec<Expression>,
        body: Box<Statement>,
        span: Span,
    },

    ForEach {
        variable: DeclaredLocal,
        iterable: Expression,
        body: Box<Statement>,
        span: Span,
    },

    Switch {
        selector: Expression,
        cases: Vec<SwitchCase>,
        span: Span,
    },

    Try {
        body: Vec<Statement>,
        catches: Vec<CatchClause>,
        finally_block: Option<Vec<Statement>>,
        span: Span,
    },

    Throw {
        expr: Expression,
        span: Span,
    },

    Break {
        label: Option<String>,
        span: Span,
    },

    Continue {
        label: Option<String>,
        span: Span,
    },

    Block {
        statements: Vec<Statement>,
        span: Span,
    },

    Labeled {
        label: String,
        statement: Box<Statement>,
        span: Span,
    },

    Synchronized {
        monitor: Expression,
        body: Vec<Statement>,
        span: Span,
    },

    /// A construct the front end recognized but the converter cannot
    /// express; rendered as a placeholder comment.
    Unsupported {
        description: String,
        span: Span,
    },
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Expression { span, .. }
            | Statement::VariableDeclaration { span, .. }
            | Statement::Return { span, .. }
            | Statement::If { span, .. }
            | Statement::While { span, .. }
            | Statement::For { span, .. }
            | Statement::ForEach { span, .. }
            | Statement::Switch { span, .. }
            | Statement::Try { span, .. }
            | Statement::Throw { span, .. }
            | Statement::Break { span, .. }
            | Statement::Continue { span, .. }
            | Statement::Block { span, .. }
            | Statement::Labeled { span, .. }
            | Statement::Synchronized { span, .. }
            | Statement::Unsupported { span, .. } => *span,
        }
    }
}
