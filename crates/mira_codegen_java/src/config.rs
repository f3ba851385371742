use serde::{Deserialize, Serialize};

/// Configuration options that drive Java code generation behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JavaCodeGenConfig {
    /// Indentation string used when pretty-printing generated Java.
    pub indent: String,
    /// Whether arithmetic on statically numeric operands is also routed
    /// through operator methods instead of raw Java operators.
    pub replace_numeric_operators_with_methods: bool,
    /// Whether every generated class declares the runtime's base object
    /// capability interface even when a supertype already provides it.
    pub always_implement_base_capability: bool,
}

impl Default for JavaCodeGenConfig {
    fn default() -> Self {
        Self {
            indent: "    ".to_string(),
            replace_numeric_operators_with_methods: false,
            always_implement_base_capability: false,
        }
    }
}
