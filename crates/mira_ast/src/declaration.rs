// mira_ast/declaration - Type and member declarations
use crate::expression::{Argument, Expression};
use crate::resolution::ResolvedCall;
use crate::statement::{DeclaredLocal, Statement};
use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
    Package,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Modifiers {
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
    pub is_abstract: bool,
    pub is_synchronized: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
}

/// Formal parameter of a method or constructor declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub local: DeclaredLocal,
    #[serde(default)]
    pub default_value: Option<Expression>,
    #[serde(default)]
    pub is_variadic: bool,
}

impl Parameter {
    pub fn new(local: DeclaredLocal) -> Self {
        Self {
            local,
            default_value: None,
            is_variadic: false,
        }
    }
}

/// Constructor delegation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DelegateKind {
    This,
    Super,
}

/// Explicit `this(...)` or `super(...)` call at the head of a constructor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelegateCall {
    pub kind: DelegateKind,
    pub args: Vec<Argument>,
    #[serde(default)]
    pub resolved: Option<ResolvedCall>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    pub params: Vec<Parameter>,
    /// Declared return type; `None` for untyped methods, which render as the
    /// universal top type.
    #[serde(default)]
    pub return_type: Option<TypeRef>,
    /// `None` for abstract or interface methods.
    pub body: Option<Vec<Statement>>,
    pub modifiers: Modifiers,
    /// True when at least one reachable return carries a value.
    #[serde(default)]
    pub has_return_value: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructorDecl {
    pub params: Vec<Parameter>,
    #[serde(default)]
    pub delegate: Option<DelegateCall>,
    pub body: Vec<Statement>,
    pub modifiers: Modifiers,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Member {
    Field {
        name: String,
        #[serde(default)]
        ty: Option<TypeRef>,
        #[serde(default)]
        initializer: Option<Expression>,
        modifiers: Modifiers,
        span: Span,
    },
    Method(MethodDecl),
    Constructor(ConstructorDecl),
    Initializer {
        is_static: bool,
        body: Vec<Statement>,
        span: Span,
    },
}

/// One constant of an enum declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumConstant {
    pub name: String,
    #[serde(default)]
    pub args: Vec<Argument>,
    /// Constant-specific class body members.
    #[serde(default)]
    pub body: Vec<Member>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub kind: TypeKind,
    pub name: String,
    pub modifiers: Modifiers,
    #[serde(default)]
    pub superclass: Option<TypeRef>,
    #[serde(default)]
    pub interfaces: Vec<TypeRef>,
    /// True when a supertype already carries the language's base object
    /// capability, making a redundant `implements` clause unnecessary.
    #[serde(default)]
    pub inherits_base_capability: bool,
    pub members: Vec<Member>,
    #[serde(default)]
    pub enum_constants: Vec<EnumConstant>,
    #[serde(default)]
    pub nested: Vec<TypeDecl>,
    pub span: Span,
}

impl TypeDecl {
    pub fn new(kind: TypeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            modifiers: Modifiers::default(),
            superclass: None,
            interfaces: Vec::new(),
            inherits_base_capability: false,
            members: Vec::new(),
            enum_constants: Vec::new(),
            nested: Vec::new(),
            span: Span::dummy(),
        }
    }
}

/// One source file after resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilationUnit {
    /// Suggested output name, usually the source file stem.
    pub name: String,
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub imports: Vec<String>,
    pub types: Vec<TypeDecl>,
    pub span: Span,
}

impl CompilationUnit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: None,
            imports: Vec::new(),
            types: Vec::new(),
            span: Span::dummy(),
        }
    }

    /// Name the generated file should carry: the first top-level type's
    /// name when one exists, otherwise the unit's own name.
    pub fn output_name(&self) -> &str {
        self.types
            .first()
            .map(|decl| decl.name.as_str())
            .unwrap_or(&self.name)
    }
}
