//! Parse error type.
//!
//! A [`ParseError`] means the token stream violated a structural assumption
//! the parser had already committed to, such as a `{` with no matching `}`.
//! It aborts processing of the current buffer; callers working on many
//! buffers report it and move on.

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("parsing failed at position {position}: expected {expected}")]
pub struct ParseError {
    /// Token index at which the expectation failed.
    pub position: usize,
    /// Human-readable description of the missing token.
    pub expected: String,
}

impl ParseError {
    pub fn expected(position: usize, expected: impl Into<String>) -> Self {
        ParseError {
            position,
            expected: expected.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_names_position_and_expectation() {
        let error = ParseError::expected(12, "`}`");
        assert_eq!(
            error.to_string(),
            "parsing failed at position 12: expected `}`"
        );
    }
}
