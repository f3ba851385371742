// mira_ast/types - Position information, local identities, and resolved types
use serde::{Deserialize, Serialize};

/// Position information for tree nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Span {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl Span {
    pub fn new(start_line: usize, start_column: usize, end_line: usize, end_column: usize) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    pub fn dummy() -> Self {
        Self::default()
    }
}

/// Stable identity of a local variable or parameter. Two references to the
/// same source variable carry the same id regardless of shadowing or nesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocalId(pub u32);

/// Literal values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    String(String),
    Number(String), // Kept as source text for precision
    Boolean(bool),
    Character(char),
    Null,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,
}

impl BinaryOp {
    /// Raw Java operator token.
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::ShiftLeft => "<<",
            BinaryOp::ShiftRight => ">>",
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::Less
                | BinaryOp::LessEqual
                | BinaryOp::Greater
                | BinaryOp::GreaterEqual
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,    // !
    Minus,  // -
    Plus,   // +
    BitNot, // ~
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Minus => "-",
            UnaryOp::Plus => "+",
            UnaryOp::BitNot => "~",
        }
    }
}

/// Increment and decrement operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncDecOp {
    Increment,
    Decrement,
}

impl IncDecOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            IncDecOp::Increment => "++",
            IncDecOp::Decrement => "--",
        }
    }

    pub fn binary(&self) -> BinaryOp {
        match self {
            IncDecOp::Increment => BinaryOp::Add,
            IncDecOp::Decrement => BinaryOp::Subtract,
        }
    }
}

/// Bound direction of a wildcard type argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WildcardKind {
    Unbounded,
    Extends,
    Super,
}

/// A resolved reference to a named (class, interface, or enum) type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedType {
    /// Fully qualified binary name of the type as the resolver saw it.
    pub name: String,
    pub args: Vec<TypeRef>,
    #[serde(default)]
    pub is_enum: bool,
    /// Simple names of enclosing classes, outermost first, for nested types.
    #[serde(default)]
    pub enclosing: Vec<String>,
    /// Nearest referencable supertype when the type itself is not visible
    /// from generated code (local, anonymous, or package-private elsewhere).
    #[serde(default)]
    pub accessible_supertype: Option<String>,
}

impl NamedType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            is_enum: false,
            enclosing: Vec::new(),
            accessible_supertype: None,
        }
    }

    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

/// Resolved static type of an expression or declaration. `Unknown` is the
/// resolver's answer when no static type could be computed; renderers treat
/// it as the universal top type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeRef {
    Primitive(String),
    Named(NamedType),
    Array { element: Box<TypeRef> },
    Wildcard {
        kind: WildcardKind,
        bound: Option<Box<TypeRef>>,
    },
    /// Multiple simultaneous bounds, e.g. a closure coerced to `A & B`.
    Intersection(Vec<TypeRef>),
    Void,
    Unknown,
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(NamedType::new(name))
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        let mut ty = NamedType::new(name);
        ty.args = args;
        TypeRef::Named(ty)
    }

    pub fn object() -> Self {
        TypeRef::named("java.lang.Object")
    }

    pub fn string() -> Self {
        TypeRef::named("java.lang.String")
    }

    pub fn int() -> Self {
        TypeRef::Primitive("int".to_string())
    }

    pub fn boolean() -> Self {
        TypeRef::Primitive("boolean".to_string())
    }

    pub fn array(element: TypeRef) -> Self {
        TypeRef::Array {
            element: Box::new(element),
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Void)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, TypeRef::Unknown)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, TypeRef::Named(named) if named.name == "java.lang.Object")
    }

    pub fn is_string(&self) -> bool {
        matches!(self, TypeRef::Named(named) if named.name == "java.lang.String")
    }

    /// Numeric widening rank for primitives and their boxes. `None` for
    /// non-numeric types.
    pub fn numeric_rank(&self) -> Option<u8> {
        let name = match self {
            TypeRef::Primitive(name) => name.as_str(),
            TypeRef::Named(named) => match named.name.as_str() {
                "java.lang.Byte" => "byte",
                "java.lang.Short" => "short",
                "java.lang.Character" => "char",
                "java.lang.Integer" => "int",
                "java.lang.Long" => "long",
                "java.lang.Float" => "float",
                "java.lang.Double" => "double",
                _ => return None,
            },
            _ => return None,
        };
        match name {
            "byte" => Some(1),
            "short" | "char" => Some(2),
            "int" => Some(3),
            "long" => Some(4),
            "float" => Some(5),
            "double" => Some(6),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.numeric_rank().is_some()
    }

    /// True for types a Java `switch` statement accepts as a selector:
    /// ordinal numerics at or below int rank, and enums.
    pub fn is_switchable(&self) -> bool {
        match self {
            TypeRef::Primitive(_) => self.numeric_rank().map(|rank| rank <= 3).unwrap_or(false),
            TypeRef::Named(named) => {
                named.is_enum || self.numeric_rank().map(|rank| rank <= 3).unwrap_or(false)
            }
            _ => false,
        }
    }
}
