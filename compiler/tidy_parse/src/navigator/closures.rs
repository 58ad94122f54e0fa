//! Closure classification.
//!
//! Whether a `{` opens a closure literal or a control-flow/declaration body
//! is decided from the token before it. When that token is an operand (a
//! name, a `)`, a type) the decision falls to the keyword that governs the
//! statement, found by walking backward over operands, operators and whole
//! bracketed groups until a statement boundary or the enclosing scope.

use tidy_ir::token::{is_accessor_name, is_body_keyword};
use tidy_ir::{Fixity, Token};

use super::Navigator;

/// Keywords directly before `{` that make it a closure.
const CLOSURE_KEYWORDS: &[&str] = &["return", "throw", "try", "await", "in", "as", "is"];

/// Keywords directly before `{` that defer to the governing keyword.
const OPERAND_KEYWORDS: &[&str] = &[
    "self", "Self", "super", "true", "false", "nil", "Any", "init", "throws", "rethrows", "async",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureKind {
    Strong,
    Weak,
    Unowned,
}

/// One entry of a closure capture list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Capture {
    pub name: String,
    pub kind: CaptureKind,
    /// Index of the captured name token.
    pub index: usize,
}

/// Capture list and parameters of a closure literal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClosureSignature {
    pub captures: Vec<Capture>,
    /// Parameter names with their token indices; `_` is omitted.
    pub params: Vec<(String, usize)>,
    /// Index of the `in` keyword ending the signature.
    pub in_index: Option<usize>,
}

impl<'a> Navigator<'a> {
    /// Whether the `{` at `at` opens a closure literal.
    pub fn is_start_of_closure(&self, at: usize) -> bool {
        if !self.is(at, |t| t.is_start_of_scope_named("{")) {
            return false;
        }
        if self.is_accessor_block(at) {
            return false;
        }
        let Some(prev) = self.prev_significant(at) else {
            return true;
        };
        match &self.buffer[prev] {
            Token::Operator(_, Fixity::Postfix) => self.is_closure_by_keyword(prev),
            Token::Operator(..) | Token::StartOfScope(_) | Token::Delimiter(_) => true,
            Token::Keyword(k) if k.starts_with('@') => true,
            Token::Keyword(k) if CLOSURE_KEYWORDS.contains(&k.as_str()) => true,
            Token::Keyword(_) if self.is_accessor_effects(prev) => false,
            Token::Keyword(k) if OPERAND_KEYWORDS.contains(&k.as_str()) => self.is_closure_by_keyword(prev),
            Token::Keyword(_) => false,
            Token::Identifier(name) if is_accessor_name(name) && self.is_accessor_label(prev) => false,
            Token::EndOfScope(s) if s == "\"" || s == "\"\"\"" => true,
            Token::EndOfScope(s) if s == ")" && self.is_accessor_parameter(prev) => false,
            Token::EndOfScope(s) if s == ")" && self.is_accessor_effects(prev) => false,
            Token::EndOfScope(s) if s == "case" || s == "default" => true,
            _ => self.is_closure_by_keyword(prev),
        }
    }

    /// `{ get set }`, `{ didSet { ... } }` and similar accessor blocks.
    fn is_accessor_block(&self, at: usize) -> bool {
        let Some(mut first) = self.next_significant(at) else {
            return false;
        };
        if self.is(first, |t| t.is_keyword_named("mutating") || t.is_keyword_named("nonmutating")) {
            match self.next_significant(first) {
                Some(next) => first = next,
                None => return false,
            }
        }
        let is_accessor = matches!(&self.buffer[first], Token::Identifier(name) if is_accessor_name(name));
        if !is_accessor {
            return false;
        }
        match self.next_significant(first).map(|i| &self.buffer[i]) {
            Some(Token::StartOfScope(s)) => s == "{" || s == "(",
            Some(Token::EndOfScope(s)) => s == "}",
            Some(Token::Identifier(name)) => is_accessor_name(name),
            Some(Token::Keyword(k)) => k != "in",
            _ => false,
        }
    }

    /// `get`/`set`/`willSet`/`didSet` written as an accessor label.
    fn is_accessor_label(&self, at: usize) -> bool {
        match self.prev_significant(at).map(|i| &self.buffer[i]) {
            None => false,
            Some(Token::StartOfScope(s)) => s == "{",
            Some(Token::EndOfScope(s)) => s == "}",
            Some(Token::Keyword(k)) => k == "mutating" || k == "nonmutating" || k.starts_with('@'),
            Some(_) => false,
        }
    }

    /// The `)` of `set(newValue)` or `willSet(value)`.
    fn is_accessor_parameter(&self, close: usize) -> bool {
        self.start_of_scope(close)
            .and_then(|open| self.prev_significant(open))
            .is_some_and(|name| {
                matches!(&self.buffer[name], Token::Identifier(n) if is_accessor_name(n))
                    && self.is_accessor_label(name)
            })
    }

    /// The effects of an accessor, ending at `last`: `get async throws {`,
    /// `get throws(MyError) {`.
    fn is_accessor_effects(&self, last: usize) -> bool {
        let mut i = last;
        let mut crossed = false;
        loop {
            match &self.buffer[i] {
                Token::Keyword(k) if matches!(k.as_str(), "async" | "throws" | "rethrows") => crossed = true,
                Token::EndOfScope(s) if s == ")" => {
                    let Some(open) = self.start_of_scope(i) else {
                        return false;
                    };
                    let typed_throws = self
                        .prev_significant(open)
                        .is_some_and(|p| self.buffer[p].is_keyword_named("throws"));
                    if !typed_throws {
                        return false;
                    }
                    i = open;
                }
                Token::Identifier(name) => return crossed && is_accessor_name(name) && self.is_accessor_label(i),
                _ => return false,
            }
            let Some(prev) = self.prev_significant(i) else {
                return false;
            };
            i = prev;
        }
    }

    /// Walk back from `from` to the keyword governing the statement.
    ///
    /// `let`/`var` in a condition list keep the walk going; a plain binding
    /// decides by whether an assignment was crossed (`let x = f { }` is a
    /// trailing closure, `var x: T { }` a computed property).
    fn is_closure_by_keyword(&self, from: usize) -> bool {
        let mut i = from;
        let mut assigned = false;
        loop {
            match &self.buffer[i] {
                Token::EndOfScope(s) if s != "case" && s != "default" && s != "*/" => {
                    match self.start_of_scope(i) {
                        Some(open) => i = open,
                        None => return true,
                    }
                }
                Token::StartOfScope(_) | Token::EndOfScope(_) => return true,
                Token::Delimiter(d) if d == ";" => return true,
                Token::Operator(..) if self.buffer[i].is_assignment_operator() => assigned = true,
                Token::Keyword(k) => match k.as_str() {
                    "let" | "var" => {
                        let in_condition = self.prev_significant(i).is_some_and(|p| {
                            matches!(&self.buffer[p], Token::Delimiter(d) if d == ",")
                                || matches!(&self.buffer[p], Token::Keyword(k)
                                    if matches!(k.as_str(), "if" | "guard" | "while" | "case"))
                        });
                        if !in_condition {
                            return assigned;
                        }
                    }
                    "return" | "throw" => return true,
                    "init" if self.prev_significant(i).is_some_and(|p| self.buffer[p].is_operator(".")) => {}
                    word if is_body_keyword(word) => return false,
                    _ => {}
                },
                _ => {}
            }
            let Some(prev) = self.prev_significant(i) else {
                return true;
            };
            if self.crosses_statement_boundary(prev, i) {
                return true;
            }
            i = prev;
        }
    }

    /// Parse the capture list and parameters of the closure opened at `at`.
    ///
    /// A closure without an `in` clause has an empty signature.
    pub fn closure_signature(&self, at: usize) -> Option<ClosureSignature> {
        if !self.is(at, |t| t.is_start_of_scope_named("{")) {
            return None;
        }
        let end = self.end_of_scope(at)?;
        let mut signature = ClosureSignature::default();
        let mut i = self.next_significant(at).filter(|&i| i < end)?;

        if self.is(i, |t| t.is_start_of_scope_named("[")) {
            let close = self.end_of_scope(i)?;
            signature.captures = self.capture_list(i, close);
            i = self.next_significant(close).filter(|&i| i < end)?;
        }

        match &self.buffer[i] {
            Token::StartOfScope(s) if s == "(" => {
                let close = self.end_of_scope(i)?;
                signature.params = self.parameter_names(i, close);
                i = self.next_significant(close).filter(|&i| i < end)?;
            }
            Token::Identifier(_) => loop {
                if let Token::Identifier(name) = &self.buffer[i] {
                    if name != "_" {
                        signature.params.push((name.clone(), i));
                    }
                }
                let Some(next) = self.next_significant(i).filter(|&n| n < end) else {
                    return Some(ClosureSignature::default());
                };
                if self.buffer[next].is_delimiter(",") {
                    i = self.next_significant(next).filter(|&n| n < end)?;
                } else {
                    i = next;
                    break;
                }
            },
            _ => {}
        }

        // Effects and an explicit return type may precede `in`.
        loop {
            match &self.buffer[i] {
                Token::Keyword(k) if k == "in" => {
                    signature.in_index = Some(i);
                    return Some(signature);
                }
                Token::StartOfScope(s) if matches!(s.as_str(), "(" | "[" | "<") => {
                    i = self.end_of_scope(i)?;
                }
                Token::Keyword(k) if matches!(k.as_str(), "throws" | "rethrows" | "async" | "Any" | "Self") => {}
                Token::Identifier(_) | Token::Operator(..) | Token::EndOfScope(_) => {}
                _ => return Some(ClosureSignature::default()),
            }
            match self.next_significant(i).filter(|&n| n < end) {
                Some(next) => i = next,
                None => return Some(ClosureSignature::default()),
            }
        }
    }

    fn capture_list(&self, open: usize, close: usize) -> Vec<Capture> {
        let mut captures = Vec::new();
        let mut kind = CaptureKind::Strong;
        let mut expect_name = true;
        let mut i = open;
        while let Some(next) = self.next_significant(i).filter(|&n| n < close) {
            i = next;
            match &self.buffer[i] {
                Token::Keyword(k) if k == "weak" && expect_name => kind = CaptureKind::Weak,
                Token::Keyword(k) if k == "unowned" && expect_name => {
                    kind = CaptureKind::Unowned;
                    // `unowned(safe)` / `unowned(unsafe)`
                    if let Some(paren) = self.next_significant(i).filter(|&p| self.buffer[p].is_start_of_scope_named("(")) {
                        i = self.end_of_scope(paren).unwrap_or(paren);
                    }
                }
                Token::Identifier(name) | Token::Keyword(name) if expect_name => {
                    captures.push(Capture {
                        name: name.clone(),
                        kind,
                        index: i,
                    });
                    expect_name = false;
                }
                Token::StartOfScope(_) => i = self.end_of_scope(i).unwrap_or(i),
                Token::Delimiter(d) if d == "," => {
                    kind = CaptureKind::Strong;
                    expect_name = true;
                }
                _ => {}
            }
        }
        captures
    }

    /// First name of each comma-separated group inside `(...)`.
    pub(crate) fn parameter_names(&self, open: usize, close: usize) -> Vec<(String, usize)> {
        let mut names = Vec::new();
        let mut expect_name = true;
        let mut i = open;
        while let Some(next) = self.next_significant(i).filter(|&n| n < close) {
            i = next;
            match &self.buffer[i] {
                Token::Identifier(name) if expect_name => {
                    if name != "_" {
                        names.push((name.clone(), i));
                    }
                    expect_name = false;
                }
                Token::StartOfScope(_) => i = self.end_of_scope(i).unwrap_or(i),
                Token::Delimiter(d) if d == "," => expect_name = true,
                _ => {}
            }
        }
        names
    }
}
