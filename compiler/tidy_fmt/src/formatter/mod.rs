//! Rule-facing view of a token buffer.
//!
//! A [`Formatter`] owns the buffer being rewritten and the options for the
//! run. It tracks which rule is currently running so that every mutation
//! can be checked against that rule's directive mask: a write whose
//! governing position is disabled is dropped and reported as `false`.
//!
//! Reads go straight to the buffer through `Deref`.

use std::ops::{Deref, Range};

use tidy_ir::{Token, TokenBuffer};
use tidy_parse::Navigator;
use tracing::trace;

use crate::FormatOptions;

pub struct Formatter<'o> {
    buffer: TokenBuffer,
    options: &'o FormatOptions,
    rule: &'static str,
    /// Enabled flag per position for `rule`, kept aligned with `buffer`.
    enabled: Vec<bool>,
}

impl<'o> Formatter<'o> {
    pub fn new(buffer: TokenBuffer, options: &'o FormatOptions) -> Self {
        let enabled = vec![true; buffer.len()];
        Formatter {
            buffer,
            options,
            rule: "",
            enabled,
        }
    }

    #[inline]
    pub fn options(&self) -> &'o FormatOptions {
        self.options
    }

    /// Name of the rule currently running.
    #[inline]
    pub fn rule(&self) -> &'static str {
        self.rule
    }

    #[inline]
    pub fn buffer(&self) -> &TokenBuffer {
        &self.buffer
    }

    pub fn into_buffer(self) -> TokenBuffer {
        self.buffer
    }

    /// A navigator over the current tokens. Re-create it after mutating.
    #[inline]
    pub fn navigator(&self) -> Navigator<'_> {
        Navigator::new(&self.buffer)
    }

    /// Switch to `rule`, recomputing the directive mask.
    pub fn begin_rule(&mut self, rule: &'static str) {
        self.rule = rule;
        self.enabled = self.buffer.enabled_mask(rule);
    }

    /// Whether the current rule may rewrite position `at`.
    ///
    /// Positions at or past the end take the flag of the last token.
    pub fn is_enabled(&self, at: usize) -> bool {
        self.enabled
            .get(at)
            .or_else(|| self.enabled.last())
            .copied()
            .unwrap_or(true)
    }

    // ─── Mutation ────────────────────────────────────────────────────

    pub fn insert(&mut self, at: usize, token: Token) -> bool {
        self.insert_all(at, [token]) > 0
    }

    /// Insert `tokens` before `at`. Returns the number inserted, zero when
    /// `at` is disabled.
    pub fn insert_all(&mut self, at: usize, tokens: impl IntoIterator<Item = Token>) -> usize {
        if !self.is_enabled(at) {
            return 0;
        }
        let count = self.buffer.insert_all(at, tokens);
        self.enabled.splice(at..at, std::iter::repeat(true).take(count));
        trace!(rule = self.rule, at, count, "insert");
        count
    }

    pub fn remove(&mut self, at: usize) -> bool {
        self.remove_range(at..at + 1)
    }

    pub fn remove_range(&mut self, range: Range<usize>) -> bool {
        if range.is_empty() || !self.is_enabled(range.start) {
            return false;
        }
        trace!(rule = self.rule, ?range, "remove");
        self.enabled.drain(range.clone());
        self.buffer.remove_range(range);
        true
    }

    /// Replace the token at `at` unless it is already equal to `token`.
    pub fn replace(&mut self, at: usize, token: Token) -> bool {
        if self.buffer.token(at) == Some(&token) || !self.is_enabled(at) {
            return false;
        }
        self.buffer.replace(at, token);
        true
    }

    /// Replace `range` with `tokens`. Returns the change in length, or
    /// `None` when the range start is disabled.
    pub fn replace_range(&mut self, range: Range<usize>, tokens: impl IntoIterator<Item = Token>) -> Option<isize> {
        if !self.is_enabled(range.start) {
            return None;
        }
        let tokens: Vec<Token> = tokens.into_iter().collect();
        let count = tokens.len();
        trace!(rule = self.rule, ?range, count, "replace");
        self.enabled
            .splice(range.clone(), std::iter::repeat(true).take(count));
        Some(self.buffer.replace_range(range, tokens))
    }

    // ─── Line helpers ────────────────────────────────────────────────

    /// Set the leading whitespace of the line starting at `line_start`.
    ///
    /// Returns the change in buffer length (-1, 0 or 1).
    pub fn set_line_indent(&mut self, line_start: usize, indent: &str) -> isize {
        match self.buffer.token(line_start) {
            Some(Token::Space(current)) if current == indent => 0,
            Some(Token::Space(_)) if indent.is_empty() => -isize::from(self.remove(line_start)),
            Some(Token::Space(_)) => {
                self.replace(line_start, Token::space(indent));
                0
            }
            _ if indent.is_empty() => 0,
            _ => isize::from(self.insert(line_start, Token::space(indent))),
        }
    }

    /// Break the line before `at`: drop whitespace before it, then insert a
    /// linebreak and `indent`. Returns the index `at` moved to.
    pub fn insert_linebreak(&mut self, at: usize, indent: &str) -> usize {
        if !self.is_enabled(at) {
            return at;
        }
        let mut at = at;
        if at > 0 && self.buffer.token(at - 1).is_some_and(Token::is_space) && self.remove(at - 1) {
            at -= 1;
        }
        if self.buffer.token(at).is_some_and(Token::is_space) {
            self.remove(at);
        }
        let mut tokens = vec![Token::linebreak(self.options.linebreak.as_str())];
        if !indent.is_empty() {
            tokens.push(Token::space(indent));
        }
        at + self.insert_all(at, tokens)
    }
}

impl Deref for Formatter<'_> {
    type Target = TokenBuffer;

    fn deref(&self) -> &TokenBuffer {
        &self.buffer
    }
}
