//! Structural queries over tidy token buffers.
//!
//! Nothing here builds an AST. Everything is answered directly from the
//! flat token sequence, by index.
//!
//! # Modules
//!
//! - [`navigator`]: scope matching, statement boundaries, closure
//!   classification, expression and type extents
//! - [`declarations`]: the shallow declaration tree and signature
//!   sub-parsers

pub mod declarations;
mod error;
pub mod navigator;
mod stack;

pub use declarations::{parse_declarations, Declaration, TokenRun};
pub use error::ParseError;
pub use navigator::{text_width, Navigator};
pub use stack::ensure_sufficient_stack;
