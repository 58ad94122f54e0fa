//! Mutable token buffer.
//!
//! The buffer is a growable array of [`Token`]s addressed by plain indices.
//! It hands out no stable token identities: every insert, remove or replace
//! is an O(n) splice that shifts the positions of all later tokens. Callers
//! iterating backward may mutate behind their cursor freely; callers iterating
//! forward must re-read `token(at)` after each mutation.
//!
//! Queries past either end return `None` rather than panicking, so a
//! navigation query that runs off the buffer simply means "not applicable".

mod directive;

pub use directive::{Directive, DirectiveKind, ALL_RULES, DIRECTIVE_PREFIX};

use std::fmt;
use std::ops::Range;

use crate::Token;

#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct TokenBuffer {
    tokens: Vec<Token>,
}

impl TokenBuffer {
    #[inline]
    pub fn new() -> Self {
        TokenBuffer { tokens: Vec::new() }
    }

    #[inline]
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        TokenBuffer { tokens }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token at `at`, or `None` past the end.
    #[inline]
    pub fn token(&self, at: usize) -> Option<&Token> {
        self.tokens.get(at)
    }

    #[inline]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Tokens in `range`, clamped to the buffer.
    pub fn slice(&self, range: Range<usize>) -> &[Token] {
        let end = range.end.min(self.tokens.len());
        let start = range.start.min(end);
        &self.tokens[start..end]
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    #[inline]
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// Concatenated source text.
    pub fn source(&self) -> String {
        crate::source_of(&self.tokens)
    }

    // ─── Mutation ────────────────────────────────────────────────────

    /// Insert a single token before position `at`.
    pub fn insert(&mut self, at: usize, token: Token) {
        debug_assert!(at <= self.tokens.len(), "insert position {at} out of bounds");
        self.tokens.insert(at, token);
    }

    /// Insert tokens before position `at`. Returns the number inserted.
    pub fn insert_all(&mut self, at: usize, tokens: impl IntoIterator<Item = Token>) -> usize {
        debug_assert!(at <= self.tokens.len(), "insert position {at} out of bounds");
        let before = self.tokens.len();
        self.tokens.splice(at..at, tokens);
        self.tokens.len() - before
    }

    /// Remove the token at `at`.
    pub fn remove(&mut self, at: usize) -> Token {
        self.tokens.remove(at)
    }

    /// Remove every token in `range`.
    pub fn remove_range(&mut self, range: Range<usize>) -> Vec<Token> {
        self.tokens.drain(range).collect()
    }

    /// Replace the token at `at`, returning the previous one.
    pub fn replace(&mut self, at: usize, token: Token) -> Token {
        std::mem::replace(&mut self.tokens[at], token)
    }

    /// Replace `range` with `tokens`. Returns the change in buffer length.
    pub fn replace_range(
        &mut self,
        range: Range<usize>,
        tokens: impl IntoIterator<Item = Token>,
    ) -> isize {
        let before = self.tokens.len();
        self.tokens.splice(range, tokens);
        self.tokens.len() as isize - before as isize
    }

    // ─── Directives ──────────────────────────────────────────────────

    /// Whether `rule` is enabled at position `at`.
    ///
    /// Scans the directive comments from the start of the buffer up to the
    /// end of the line containing `at` (a `disable:this` directive later on
    /// the same line still applies).
    pub fn is_enabled(&self, at: usize, rule: &str) -> bool {
        let line_end = self.tokens[at.min(self.tokens.len())..]
            .iter()
            .position(Token::is_linebreak)
            .map_or(self.tokens.len(), |offset| at + offset + 1);
        directive::scan(&self.tokens, rule, line_end)
            .get(at)
            .copied()
            .unwrap_or(true)
    }

    /// Enabled flag for every position, computed in one pass.
    pub fn enabled_mask(&self, rule: &str) -> Vec<bool> {
        directive::scan(&self.tokens, rule, self.tokens.len())
    }
}

impl fmt::Debug for TokenBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenBuffer({} tokens)", self.tokens.len())
    }
}

impl From<Vec<Token>> for TokenBuffer {
    fn from(tokens: Vec<Token>) -> Self {
        TokenBuffer::from_tokens(tokens)
    }
}

impl std::ops::Index<usize> for TokenBuffer {
    type Output = Token;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.tokens[index]
    }
}

impl<'a> IntoIterator for &'a TokenBuffer {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
