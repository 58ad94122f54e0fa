//! Statement boundary classification.
//!
//! A linebreak separates two statements when the token before it may end a
//! statement and the token after it may start one. Otherwise the next line
//! continues the current statement (a "linewrap"). Both predicates are keyed
//! on token kind plus fixed keyword lists; the indentation engine and the
//! closure classifier share them.

use tidy_ir::{Fixity, Token};

use super::Navigator;

/// Keywords after which a statement may end.
const STATEMENT_END_KEYWORDS: &[&str] = &[
    "return", "break", "continue", "fallthrough", "true", "false", "nil", "self", "Self", "super",
    "init", "deinit", "in", "Any", "throws", "rethrows", "async",
];

/// Keywords that continue the previous line when they start a line.
const CONTINUATION_KEYWORDS: &[&str] = &["as", "is", "in", "where", "throws", "rethrows"];

impl<'a> Navigator<'a> {
    /// Whether a statement may end with the token at `at`.
    pub fn is_end_of_statement(&self, at: usize) -> bool {
        let Some(token) = self.token(at) else {
            return true;
        };
        match token {
            Token::Identifier(_) | Token::Number(..) | Token::Error(_) => true,
            Token::Keyword(k) => {
                k.starts_with('@') || k.starts_with('#') || STATEMENT_END_KEYWORDS.contains(&k.as_str())
            }
            Token::EndOfScope(s) => s != "case" && s != "default",
            Token::StartOfScope(s) => matches!(s.as_str(), "{" | ":" | "#if"),
            Token::Operator(_, fixity) => *fixity == Fixity::Postfix,
            Token::Delimiter(d) => d == ";",
            Token::StringBody(_) => false,
            Token::Space(_) | Token::Linebreak(_) | Token::CommentBody(_) => true,
        }
    }

    /// Whether a statement may start with the token at `at`.
    pub fn is_start_of_statement(&self, at: usize) -> bool {
        let Some(token) = self.token(at) else {
            return true;
        };
        match token {
            Token::Operator(op, fixity) => *fixity == Fixity::Prefix && op != ".",
            Token::Delimiter(_) => false,
            Token::Keyword(k) => !CONTINUATION_KEYWORDS.contains(&k.as_str()),
            Token::StartOfScope(s) => s != "<" && s != ":",
            _ => true,
        }
    }

    /// Whether the linebreak at `at` separates two statements.
    ///
    /// Linebreaks at the very start or end of the buffer always do.
    pub fn is_statement_boundary(&self, at: usize) -> bool {
        let (Some(prev), Some(next)) = (self.prev_significant(at), self.next_significant(at)) else {
            return true;
        };
        self.is_end_of_statement(prev) && self.is_start_of_statement(next)
    }

    /// Whether any statement boundary lies strictly between `from` and `to`.
    pub(crate) fn crosses_statement_boundary(&self, from: usize, to: usize) -> bool {
        (from + 1..to).any(|i| self.is(i, Token::is_linebreak) && self.is_statement_boundary(i))
    }

    /// Index of the last keyword before `at` in the same scope, ignoring
    /// the words in `excluding`. Nested scopes are skipped whole.
    pub fn last_significant_keyword(&self, at: usize, excluding: &[&str]) -> Option<usize> {
        let mut i = self.prev_significant(at)?;
        loop {
            match self.token(i)? {
                Token::Keyword(k) if !excluding.contains(&k.as_str()) => return Some(i),
                Token::StartOfScope(_) => return None,
                Token::EndOfScope(s) if s != "case" && s != "default" => {
                    i = self.start_of_scope(i)?;
                }
                _ => {}
            }
            i = self.prev_significant(i)?;
        }
    }

    /// First index of the statement containing `at`, within its scope.
    pub fn start_of_statement(&self, at: usize) -> usize {
        let mut start = at;
        let mut i = at;
        while let Some(prev) = self.prev_significant(i) {
            let token = &self.buffer[prev];
            if token.is_start_of_scope() || token.is_delimiter(";") {
                break;
            }
            if token.is_end_of_scope_named("case") || token.is_end_of_scope_named("default") {
                break;
            }
            if self.crosses_statement_boundary(prev, i) {
                break;
            }
            let resume = match token {
                Token::EndOfScope(_) => self.start_of_scope(prev).unwrap_or(prev),
                _ => prev,
            };
            start = resume;
            i = resume;
        }
        start
    }
}
