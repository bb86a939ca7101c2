//! The abstract syntax tree of the Llama language.
//!
//! Nodes are plain data: one struct per variant with a `pos` attribute,
//! grouped under enums per semantic family (definitions, expressions,
//! patterns, types). Structural equality ignores source positions.

mod definition;
mod expression;
mod pattern;
mod types;
pub mod visitor;

pub use definition::*;
pub use expression::*;
pub use pattern::*;
pub use types::*;

pub use crate::lexer::Pos;

/// A node with a user-defined name, insertable into the symbol table.
pub trait Named {
    fn name(&self) -> &str;
    fn pos(&self) -> Pos;
}
