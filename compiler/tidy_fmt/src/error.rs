//! Errors surfaced by the rule pipeline.

use thiserror::Error;
use tidy_parse::ParseError;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The buffer's structure could not be navigated safely.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A rule name that is not in the registry.
    #[error("unknown rule: {0}")]
    UnknownRule(String),

    /// An option name that [`FormatOptions`](crate::FormatOptions) does not have.
    #[error("unknown option: {0}")]
    UnknownOption(String),

    /// An option value that does not parse for its option.
    #[error("invalid value '{value}' for option '{name}': expected {expected}")]
    InvalidOption {
        name: String,
        value: String,
        expected: &'static str,
    },
}

impl FormatError {
    pub(crate) fn invalid(name: &str, value: &str, expected: &'static str) -> Self {
        FormatError::InvalidOption {
            name: name.to_owned(),
            value: value.to_owned(),
            expected,
        }
    }
}
