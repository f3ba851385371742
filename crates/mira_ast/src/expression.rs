// mira_ast/expression - Expression nodes of the resolved tree
use crate::resolution::*;
use crate::statement::Statement;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// One actual argument at a call site. Named arguments are packed into a
/// dynamic map by the converter when the call could not be resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    #[serde(default)]
    pub name: Option<String>,
    pub value: Expression,
}

impl Argument {
    pub fn positional(value: Expression) -> Self {
        Self { name: None, value }
    }

    pub fn named(name: impl Into<String>, value: Expression) -> Self {
        Self {
            name: Some(name.into()),
            value,
        }
    }
}

/// One entry of a map literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapEntry {
    pub key: Expression,
    pub value: Expression,
}

/// Formal parameter of a closure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosureParam {
    pub id: LocalId,
    pub name: String,
    #[serde(default)]
    pub ty: Option<TypeRef>,
    #[serde(default)]
    pub default_value: Option<Box<Expression>>,
}

/// One method implementation of an anonymous class built from a map of
/// name-to-closure entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceMethodImpl {
    pub signature: ResolvedSignature,
    pub closure: Expression,
}

/// Expression node of the resolved tree. Nodes carry the static type the
/// resolver computed where one exists; `TypeRef::Unknown` otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    Literal(Literal, Span),

    /// Reference to a local variable or parameter.
    LocalRef {
        id: LocalId,
        name: String,
        ty: TypeRef,
        span: Span,
    },

    This {
        span: Span,
    },

    Super {
        span: Span,
    },

    /// Property access, resolved to an accessor pair or left dynamic.
    PropertyAccess {
        receiver: Option<Box<Expression>>,
        binding: PropertyBinding,
        span: Span,
    },

    /// Indexed access: `a[i]`.
    IndexAccess {
        receiver: Box<Expression>,
        index: Box<Expression>,
        ty: TypeRef,
        span: Span,
    },

    /// Method call. `resolved` is absent for dynamic dispatch by name.
    Call {
        receiver: Option<Box<Expression>>,
        receiver_ty: Option<TypeRef>,
        name: String,
        args: Vec<Argument>,
        /// Closure blocks written after the argument list.
        trailing_closures: Vec<Expression>,
        resolved: Option<ResolvedCall>,
        ty: TypeRef,
        span: Span,
    },

    /// Constructor invocation.
    New {
        class: TypeRef,
        args: Vec<Argument>,
        resolved: Option<ResolvedCall>,
        span: Span,
    },

    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
        /// Operator method the resolver bound, for operator overloading.
        resolved_method: Option<OperatorMethod>,
        ty: TypeRef,
        span: Span,
    },

    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
        span: Span,
    },

    /// Plain or compound assignment. `op` carries the compound operator.
    Assignment {
        target: Box<Expression>,
        op: Option<BinaryOp>,
        value: Box<Expression>,
        /// True when the assignment's value flows into an enclosing
        /// expression rather than being discarded.
        value_used: bool,
        span: Span,
    },

    IncDec {
        target: Box<Expression>,
        op: IncDecOp,
        prefix: bool,
        value_used: bool,
        span: Span,
    },

    /// Null-propagating member access: `a?.b`.
    NullSafe {
        receiver: Box<Expression>,
        name: String,
        #[serde(default)]
        property: Option<PropertyRef>,
        ty: TypeRef,
        span: Span,
    },

    /// Null-coalescing choice: `a ?: b`.
    Elvis {
        value: Box<Expression>,
        fallback: Box<Expression>,
        ty: TypeRef,
        span: Span,
    },

    Conditional {
        condition: Box<Expression>,
        then_expr: Box<Expression>,
        else_expr: Box<Expression>,
        ty: TypeRef,
        span: Span,
    },

    ListLiteral {
        elements: Vec<Expression>,
        /// Target type when the literal sits in a typed position, used to
        /// pick an array rendering over a collection one.
        #[serde(default)]
        expected: Option<TypeRef>,
        span: Span,
    },

    MapLiteral {
        entries: Vec<MapEntry>,
        span: Span,
    },

    RangeLiteral {
        from: Box<Expression>,
        to: Box<Expression>,
        inclusive: bool,
        ty: TypeRef,
        span: Span,
    },

    /// Anonymous implementation of an interface from a map of closures.
    InterfaceFromMap {
        target: TypeRef,
        methods: Vec<InterfaceMethodImpl>,
        span: Span,
    },

    Closure {
        params: Vec<ClosureParam>,
        body: Vec<Statement>,
        /// Single-method interface shape the closure is coerced to, when
        /// the resolver found one.
        #[serde(default)]
        shape: Option<FunctionalShape>,
        span: Span,
    },

    Cast {
        operand: Box<Expression>,
        target: TypeRef,
        /// Conversion method replacing the cast, e.g. a coercion the
        /// resolver mapped to a `toX()` call.
        #[serde(default)]
        conversion_method: Option<String>,
        span: Span,
    },

    TypeTest {
        operand: Box<Expression>,
        target: TypeRef,
        span: Span,
    },
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::Literal(_, span)
            | Expression::LocalRef { span, .. }
            | Expression::This { span }
            | Expression::Super { span }
            | Expression::PropertyAccess { span, .. }
            | Expression::IndexAccess { span, .. }
            | Expression::Call { span, .. }
            | Expression::New { span, .. }
            | Expression::Binary { span, .. }
            | Expression::Unary { span, .. }
            | Expression::Assignment { span, .. }
            | Expression::IncDec { span, .. }
            | Expression::NullSafe { span, .. }
            | Expression::Elvis { span, .. }
            | Expression::Conditional { span, .. }
            | Expression::ListLiteral { span, .. }
            | Expression::MapLiteral { span, .. }
            | Expression::RangeLiteral { span, .. }
            | Expression::InterfaceFromMap { span, .. }
            | Expression::Closure { span, .. }
            | Expression::Cast { span, .. }
            | Expression::TypeTest { span, .. } => *span,
        }
    }

    /// Static type of the expression, when the resolver computed one.
    pub fn static_type(&self) -> Option<TypeRef> {
        match self {
            Expression::Literal(literal, _) => Some(match literal {
                Literal::String(_) => TypeRef::string(),
                Literal::Number(text) => {
                    if text.contains('.') || text.ends_with('d') || text.ends_with('f') {
                        TypeRef::Primitive("double".to_string())
                    } else if text.ends_with('L') {
                        TypeRef::Primitive("long".to_string())
                    } else {
                        TypeRef::int()
                    }
                }
                Literal::Boolean(_) => TypeRef::boolean(),
                Literal::Character(_) => TypeRef::Primitive("char".to_string()),
                Literal::Null => TypeRef::Unknown,
            }),
            Expression::LocalRef { ty, .. }
            | Expression::IndexAccess { ty, .. }
            | Expression::Call { ty, .. }
            | Expression::Binary { ty, .. }
            | Expression::NullSafe { ty, .. }
            | Expression::Elvis { ty, .. }
            | Expression::Conditional { ty, .. }
            | Expression::RangeLiteral { ty, .. } => Some(ty.clone()),
            Expression::PropertyAccess { binding, .. } => match binding {
                PropertyBinding::Resolved(property) => Some(property.ty.clone()),
                PropertyBinding::Unresolved { .. } => None,
            },
            Expression::New { class, .. } => Some(class.clone()),
            Expression::Cast { target, .. } => Some(target.clone()),
            Expression::TypeTest { .. } => Some(TypeRef::boolean()),
            Expression::InterfaceFromMap { target, .. } => Some(target.clone()),
            Expression::Closure { shape, .. } => {
                shape.as_ref().map(|shape| shape.interface.clone())
            }
            Expression::Unary { operand, .. } => operand.static_type(),
            Expression::Assignment { value, .. } => value.static_type(),
            Expression::IncDec { target, .. } => target.static_type(),
            Expression::ListLiteral { expected, .. } => expected.clone(),
            Expression::MapLiteral { .. } => Some(TypeRef::generic(
                "java.util.Map",
                vec![TypeRef::object(), TypeRef::object()],
            )),
            Expression::This { .. } | Expression::Super { .. } => None,
        }
    }
}
