use mira_ast::Span;
use thiserror::Error;

/// Error variants produced while converting a resolved tree to Java source.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodeGenError {
    #[error("Unsupported construct: {construct}")]
    UnsupportedConstruct {
        construct: String,
        span: Option<Span>,
    },

    #[error("Malformed resolved tree: {message}")]
    MalformedTree { message: String, span: Option<Span> },

    #[error("Invalid method signature: {message}")]
    InvalidMethodSignature { message: String, span: Option<Span> },

    #[error("Invalid switch cases: {message}")]
    InvalidSwitchCases { message: String, span: Option<Span> },
}
