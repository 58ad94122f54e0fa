//! Tidy Formatter
//!
//! Rewrites token buffers with a pipeline of small, independent rules.
//!
//! # Architecture
//!
//! The input is lexed once into a [`TokenBuffer`](tidy_ir::TokenBuffer).
//! Each rule reads it through a [`Navigator`](tidy_parse::Navigator) and
//! mutates it through a [`Formatter`], which drops writes to positions a
//! directive comment has disabled for that rule. The pipeline repeats the
//! rule sequence until the buffer stops changing.
//!
//! # Modules
//!
//! - [`options`]: the configuration record, resolvable by option name
//! - [`formatter`]: the rule-facing, directive-aware buffer
//! - [`rules`]: the rule registry and every shipped rule
//! - [`pipeline`]: fixed-point application, diagnostics and batches

mod error;
pub mod formatter;
pub mod options;
pub mod pipeline;
pub mod rules;

pub use error::FormatError;
pub use formatter::Formatter;
pub use options::{FormatOptions, IfdefIndent, OptionValue, SelfMode, Version, WrapMode};
pub use pipeline::{apply_rules, diagnose, format, format_batch, Change, MAX_PASSES};
pub use rules::{default_rules, rule_named, rules, rules_named, Rule};
