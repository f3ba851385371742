// mira_ast - Resolved syntax tree definitions for the Mira language
//! This crate provides the resolved syntax tree consumed by the Java source
//! converter. The tree is the output of parsing plus semantic resolution:
//! nodes carry static types, resolved signatures, and stable local-variable
//! identities wherever the resolver could compute them.

pub mod declaration;
pub mod expression;
pub mod resolution;
pub mod statement;
pub mod types;

pub use declaration::*;
pub use expression::*;
pub use resolution::*;
pub use statement::*;
pub use types::*;
