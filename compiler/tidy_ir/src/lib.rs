//! Token model and token buffer for the tidy rewriting engine.
//!
//! - [`token`]: tagged-variant [`Token`] with pure classification predicates
//! - [`buffer`]: the mutable, index-addressed [`TokenBuffer`] and its
//!   directive-driven enabled mask

pub mod buffer;
pub mod token;

pub use buffer::{Directive, DirectiveKind, TokenBuffer, ALL_RULES, DIRECTIVE_PREFIX};
pub use token::{closes, source_of, Fixity, NumberKind, Token};
