// mira_ast/resolution - Signatures and bindings produced by semantic resolution
use crate::expression::Expression;
use crate::types::TypeRef;
use serde::{Deserialize, Serialize};

/// One formal parameter of a resolved signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSig {
    pub name: String,
    pub ty: TypeRef,
    #[serde(default)]
    pub is_variadic: bool,
    /// Source-level default value. Present only on declarations that
    /// declared one; substituted at call sites the resolver matched with
    /// fewer actuals than formals.
    #[serde(default)]
    pub default_value: Option<Box<Expression>>,
}

impl ParamSig {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            is_variadic: false,
            default_value: None,
        }
    }
}

/// A method or constructor signature the resolver bound a call to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSignature {
    pub name: String,
    /// Fully qualified name of the declaring type, when known.
    #[serde(default)]
    pub owner: Option<String>,
    pub params: Vec<ParamSig>,
    pub return_type: TypeRef,
}

impl ResolvedSignature {
    pub fn new(name: impl Into<String>, params: Vec<ParamSig>, return_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            owner: None,
            params,
            return_type,
        }
    }
}

/// A call site the resolver bound to a concrete signature, together with the
/// mapping from formal parameters to actual-argument positions. `param_args[i]`
/// lists indices into the call's combined actual list (positional arguments
/// followed by trailing closure blocks) consumed by formal `i`; an empty list
/// means the formal takes its declared default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedCall {
    pub signature: ResolvedSignature,
    pub param_args: Vec<Vec<usize>>,
}

/// A property the resolver bound to accessor methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRef {
    pub owner: String,
    pub name: String,
    #[serde(default)]
    pub getter: Option<String>,
    #[serde(default)]
    pub setter: Option<String>,
    pub ty: TypeRef,
}

/// Resolution state of a property access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyBinding {
    Resolved(PropertyRef),
    Unresolved {
        name: String,
        /// True when the access sits in a scope backed by a dynamic
        /// name-value bag rather than a class body.
        dynamic_scope: bool,
    },
}

impl PropertyBinding {
    pub fn name(&self) -> &str {
        match self {
            PropertyBinding::Resolved(property) => &property.name,
            PropertyBinding::Unresolved { name, .. } => name,
        }
    }
}

/// Method backing an overloaded operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorMethod {
    pub name: String,
    #[serde(default)]
    pub owner: Option<String>,
}

/// Shape of the single-method interface a closure is coerced to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionalShape {
    pub interface: TypeRef,
    pub method: String,
    pub params: Vec<ParamSig>,
    pub return_type: TypeRef,
}
