//! Scope-aware navigation over a token buffer.
//!
//! [`Navigator`] borrows a [`TokenBuffer`] and answers structural questions
//! about it: where a scope starts and ends, where a line starts, whether a
//! `{` opens a closure, how far an expression extends. Every query is a
//! partial function. `None` means "not applicable here" and is never an
//! error.
//!
//! A navigator cannot outlive a mutation of its buffer; rules re-create one
//! after every change instead of caching positions across it.

mod closures;
mod expressions;
mod statements;

pub use closures::{Capture, CaptureKind, ClosureSignature};

use smallvec::SmallVec;
use tidy_ir::{Token, TokenBuffer};

type ScopeStack<'a> = SmallVec<[&'a str; 16]>;

#[derive(Clone, Copy)]
pub struct Navigator<'a> {
    buffer: &'a TokenBuffer,
}

impl<'a> Navigator<'a> {
    pub fn new(buffer: &'a TokenBuffer) -> Self {
        Navigator { buffer }
    }

    #[inline]
    pub fn buffer(&self) -> &'a TokenBuffer {
        self.buffer
    }

    #[inline]
    pub fn token(&self, at: usize) -> Option<&'a Token> {
        self.buffer.token(at)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Whether the token at `at` satisfies `predicate`; `false` out of range.
    #[inline]
    pub fn is(&self, at: usize, predicate: impl FnOnce(&Token) -> bool) -> bool {
        self.token(at).is_some_and(predicate)
    }

    // ─── Index helpers ───────────────────────────────────────────────

    /// First index after `after` whose token satisfies `predicate`.
    pub fn next_index(&self, after: usize, mut predicate: impl FnMut(&Token) -> bool) -> Option<usize> {
        let tokens = self.buffer.tokens();
        (after.saturating_add(1)..tokens.len()).find(|&i| predicate(&tokens[i]))
    }

    /// Last index before `before` whose token satisfies `predicate`.
    pub fn prev_index(&self, before: usize, mut predicate: impl FnMut(&Token) -> bool) -> Option<usize> {
        let tokens = self.buffer.tokens();
        (0..before.min(tokens.len())).rev().find(|&i| predicate(&tokens[i]))
    }

    /// Next token that is not whitespace, a linebreak or a comment.
    pub fn next_significant(&self, after: usize) -> Option<usize> {
        self.next_index(after, |t| !t.is_space_or_comment_or_linebreak())
    }

    /// Previous token that is not whitespace, a linebreak or a comment.
    pub fn prev_significant(&self, before: usize) -> Option<usize> {
        self.prev_index(before, |t| !t.is_space_or_comment_or_linebreak())
    }

    pub fn next_non_space(&self, after: usize) -> Option<usize> {
        self.next_index(after, |t| !t.is_space())
    }

    /// Next token that is not whitespace or a comment; may be a linebreak.
    pub fn next_non_space_or_comment(&self, after: usize) -> Option<usize> {
        self.next_index(after, |t| !t.is_space_or_comment())
    }

    // ─── Scopes ──────────────────────────────────────────────────────

    /// The scope opener for `at`.
    ///
    /// For a closer this is its matching opener. For a `case`/`default`
    /// label it is the enclosing `switch` brace: the whole switch is a
    /// single scope. For any other token it is the innermost unclosed
    /// opener before `at`.
    pub fn start_of_scope(&self, at: usize) -> Option<usize> {
        match self.token(at)? {
            Token::EndOfScope(label) if label == "case" || label == "default" => {
                let enclosing = self.scan_back(at, ScopeStack::new(), true)?;
                if self.is(enclosing, |t| t.is_start_of_scope_named(":")) {
                    self.scan_back(enclosing, ScopeStack::new(), true)
                } else {
                    Some(enclosing)
                }
            }
            Token::EndOfScope(close) => {
                let mut closers = ScopeStack::new();
                closers.push(close.as_str());
                self.scan_back(at, closers, false)
            }
            _ => self.scan_back(at, ScopeStack::new(), true),
        }
    }

    /// The scope closer for `at`.
    ///
    /// For an opener this is its matching closer (the terminating linebreak
    /// for `//`). For any other token it is the closer of the innermost
    /// scope containing `at`.
    pub fn end_of_scope(&self, at: usize) -> Option<usize> {
        match self.token(at)? {
            Token::StartOfScope(open) if open == "//" => self.next_index(at, Token::is_linebreak),
            Token::StartOfScope(open) => {
                let mut openers = ScopeStack::new();
                openers.push(open.as_str());
                self.scan_forward(at, openers, false)
            }
            _ => self.scan_forward(at, ScopeStack::new(), true),
        }
    }

    /// Backward scope matching.
    ///
    /// With `enclosing` set, returns the first opener left unmatched by the
    /// closers seen so far. Otherwise returns the opener that empties the
    /// initial `closers` stack.
    fn scan_back(&self, before: usize, mut closers: ScopeStack<'a>, enclosing: bool) -> Option<usize> {
        let tokens = self.buffer.tokens();
        let mut crossed_linebreak = false;
        for i in (0..before.min(tokens.len())).rev() {
            match &tokens[i] {
                Token::Linebreak(_) => crossed_linebreak = true,
                Token::EndOfScope(close) => closers.push(close.as_str()),
                Token::StartOfScope(open) => {
                    if open == "//" {
                        if closers.is_empty() && !crossed_linebreak {
                            return Some(i);
                        }
                        continue;
                    }
                    let Some(&top) = closers.last() else {
                        return Some(i);
                    };
                    if open == ":" {
                        // Closed either by the next label or, implicitly,
                        // by the switch's own closer.
                        if top == "case" || top == "default" {
                            closers.pop();
                            if closers.is_empty() {
                                return Some(i);
                            }
                        }
                        continue;
                    }
                    while matches!(closers.last(), Some(&("case" | "default"))) {
                        closers.pop();
                    }
                    if closers.pop().is_none() {
                        return enclosing.then_some(i);
                    }
                    if closers.is_empty() && !enclosing {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Forward scope matching; the mirror of [`Self::scan_back`].
    fn scan_forward(&self, after: usize, mut openers: ScopeStack<'a>, enclosing: bool) -> Option<usize> {
        let tokens = self.buffer.tokens();
        for (i, token) in tokens.iter().enumerate().skip(after.saturating_add(1)) {
            match token {
                Token::StartOfScope(open) if open == "//" => {}
                Token::StartOfScope(open) => openers.push(open.as_str()),
                Token::EndOfScope(label) if label == "case" || label == "default" => {
                    if openers.last() == Some(&":") {
                        openers.pop();
                        if openers.is_empty() {
                            return Some(i);
                        }
                    } else if openers.is_empty() {
                        return Some(i);
                    }
                }
                Token::EndOfScope(close) => {
                    if close == "}" || close == "#endif" {
                        while openers.last() == Some(&":") {
                            openers.pop();
                            if openers.is_empty() {
                                return Some(i);
                            }
                        }
                    }
                    if openers.pop().is_none() {
                        return Some(i);
                    }
                    if openers.is_empty() && !enclosing {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Whether `at` is directly inside a scope opened by `open`.
    pub fn is_in_scope(&self, at: usize, open: &str) -> bool {
        self.scan_back(at, ScopeStack::new(), true)
            .is_some_and(|start| self.is(start, |t| t.is_start_of_scope_named(open)))
    }

    // ─── Lines ───────────────────────────────────────────────────────

    /// Index of the first token on the line containing `at`.
    pub fn start_of_line(&self, at: usize) -> usize {
        self.prev_index(at, Token::is_linebreak).map_or(0, |i| i + 1)
    }

    /// Index of the linebreak ending the line containing `at`, or the
    /// buffer length on the last line.
    pub fn end_of_line(&self, at: usize) -> usize {
        let tokens = self.buffer.tokens();
        (at..tokens.len())
            .find(|&i| tokens[i].is_linebreak())
            .unwrap_or(tokens.len())
    }

    /// Leading whitespace of the line containing `at`.
    pub fn line_indent(&self, at: usize) -> &'a str {
        match self.token(self.start_of_line(at)) {
            Some(Token::Space(indent)) => indent,
            _ => "",
        }
    }

    /// Display width of the line containing `at`, with tabs expanded to
    /// `tab_width` columns.
    pub fn line_width(&self, at: usize, tab_width: usize) -> usize {
        let start = self.start_of_line(at);
        let end = self.end_of_line(at);
        text_width(
            self.buffer.slice(start..end).iter().flat_map(|t| t.text().chars()),
            tab_width,
        )
    }

    /// Display width of everything on `at`'s line before `at`.
    pub fn column(&self, at: usize, tab_width: usize) -> usize {
        let start = self.start_of_line(at);
        text_width(
            self.buffer.slice(start..at).iter().flat_map(|t| t.text().chars()),
            tab_width,
        )
    }

    /// Whether only whitespace precedes `at` on its line.
    pub fn is_first_on_line(&self, at: usize) -> bool {
        let start = self.start_of_line(at);
        self.buffer.slice(start..at).iter().all(Token::is_space)
    }
}

/// Column count of `chars`, advancing tabs to the next multiple of `tab_width`.
pub fn text_width(chars: impl IntoIterator<Item = char>, tab_width: usize) -> usize {
    let tab_width = tab_width.max(1);
    chars.into_iter().fold(0, |width, c| {
        if c == '\t' {
            width + tab_width - width % tab_width
        } else {
            width + 1
        }
    })
}
