//! Shallow declaration tree.
//!
//! [`parse_declarations`] splits a buffer range into top-level declarations.
//! Type bodies and `#if` blocks recurse; every other declaration (functions
//! included) is a flat run of tokens. The tree is a snapshot: it copies the
//! tokens it covers and records the range they came from, so it stays valid
//! while a rule rebuilds the buffer from it.
//!
//! Trivia assignment: comment and attribute lines directly above a
//! declaration belong to it; anything separated from it by a blank line
//! stays with the previous declaration. The first declaration in a range
//! absorbs the range's leading trivia, so flattening a parse result always
//! reproduces the input range exactly.

mod signatures;

pub use signatures::{
    Binding, CallArgument, FunctionSignature, GenericParam, Parameter, Pattern, Property,
};

use std::ops::Range;

use tidy_ir::token::{is_declaration_keyword, is_modifier, is_type_keyword};
use tidy_ir::{Token, TokenBuffer, ALL_RULES};
use tracing::trace;

use crate::{ensure_sufficient_stack, Navigator, ParseError};

/// Tokens copied out of a buffer, with the range they occupied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenRun {
    pub range: Range<usize>,
    pub tokens: Vec<Token>,
}

impl TokenRun {
    fn new(buffer: &TokenBuffer, range: Range<usize>) -> Self {
        TokenRun {
            tokens: buffer.slice(range.clone()).to_vec(),
            range,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Declaration {
    /// A declaration without a parsed body: properties, functions, cases,
    /// imports, and loose statements.
    Simple { keyword: String, run: TokenRun },
    /// A type or extension whose body spans more than one line.
    TypeBody {
        keyword: String,
        open: TokenRun,
        body: Vec<Declaration>,
        close: TokenRun,
    },
    /// An `#if` ... `#endif` block.
    ConditionalCompilation {
        open: TokenRun,
        body: Vec<Declaration>,
        close: TokenRun,
    },
}

impl Declaration {
    /// The introducing keyword; `#if` for conditional blocks and empty for
    /// a run with no declaration keyword at all.
    pub fn keyword(&self) -> &str {
        match self {
            Declaration::Simple { keyword, .. } | Declaration::TypeBody { keyword, .. } => keyword,
            Declaration::ConditionalCompilation { .. } => "#if",
        }
    }

    /// Buffer range this declaration was parsed from.
    pub fn range(&self) -> Range<usize> {
        match self {
            Declaration::Simple { run, .. } => run.range.clone(),
            Declaration::TypeBody { open, close, .. }
            | Declaration::ConditionalCompilation { open, close, .. } => open.range.start..close.range.end,
        }
    }

    pub fn body(&self) -> Option<&[Declaration]> {
        match self {
            Declaration::Simple { .. } => None,
            Declaration::TypeBody { body, .. } | Declaration::ConditionalCompilation { body, .. } => Some(body),
        }
    }

    /// Leading tokens: the whole run for simple declarations, the opening
    /// line otherwise.
    pub fn open_tokens(&self) -> &[Token] {
        match self {
            Declaration::Simple { run, .. } => &run.tokens,
            Declaration::TypeBody { open, .. } | Declaration::ConditionalCompilation { open, .. } => &open.tokens,
        }
    }

    /// All tokens in source order.
    pub fn tokens(&self) -> Vec<Token> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(&self, out: &mut Vec<Token>) {
        match self {
            Declaration::Simple { run, .. } => out.extend_from_slice(&run.tokens),
            Declaration::TypeBody { open, body, close, .. }
            | Declaration::ConditionalCompilation { open, body, close } => {
                out.extend_from_slice(&open.tokens);
                for child in body {
                    child.flatten_into(out);
                }
                out.extend_from_slice(&close.tokens);
            }
        }
    }

    /// Index of the keyword within [`Self::open_tokens`].
    fn keyword_offset(&self) -> Option<usize> {
        let keyword = self.keyword();
        if keyword.is_empty() {
            return None;
        }
        self.open_tokens().iter().position(|t| match t {
            Token::Keyword(k) | Token::StartOfScope(k) => k == keyword,
            _ => false,
        })
    }

    /// The declared name: the identifier after the keyword, or the keyword
    /// itself for `init`, `deinit` and `subscript`. Extensions report the
    /// full dotted type name.
    pub fn name(&self) -> Option<String> {
        let tokens = self.open_tokens();
        let offset = self.keyword_offset()?;
        match self.keyword() {
            "init" | "deinit" | "subscript" => return Some(self.keyword().to_owned()),
            "#if" => return None,
            _ => {}
        }
        let mut significant = tokens[offset + 1..]
            .iter()
            .filter(|t| !t.is_space_or_comment_or_linebreak());
        let first = significant.next()?;
        let mut name = match first {
            Token::Identifier(name) => name.trim_matches('`').to_owned(),
            Token::Operator(op, _) if self.keyword() == "func" => return Some(op.clone()),
            _ => return None,
        };
        if self.keyword() == "extension" {
            while let Some(Token::Operator(dot, _)) = significant.next() {
                if dot != "." {
                    break;
                }
                match significant.next() {
                    Some(Token::Identifier(part)) => {
                        name.push('.');
                        name.push_str(part);
                    }
                    _ => break,
                }
            }
        }
        Some(name)
    }

    /// Modifier keywords written before the introducing keyword.
    pub fn modifiers(&self) -> Vec<&str> {
        let Some(offset) = self.keyword_offset() else {
            return Vec::new();
        };
        self.open_tokens()[..offset]
            .iter()
            .filter_map(|t| match t {
                Token::Keyword(k) if is_modifier(k) => Some(k.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn is_static(&self) -> bool {
        self.modifiers().iter().any(|m| *m == "static" || *m == "class")
    }
}

/// Parse the declarations in `range` of `buffer`.
///
/// Fails when a type body or `#if` block is left unclosed.
#[tracing::instrument(level = "debug", skip(buffer))]
pub fn parse_declarations(buffer: &TokenBuffer, range: Range<usize>) -> Result<Vec<Declaration>, ParseError> {
    let mask = buffer.enabled_mask(ALL_RULES);
    let parser = DeclarationParser {
        nav: Navigator::new(buffer),
        mask: &mask,
    };
    let end = range.end.min(buffer.len());
    parser.parse_range(range.start.min(end)..end)
}

struct DeclarationParser<'a> {
    nav: Navigator<'a>,
    /// Enabled flags for `all`; `#if` openers in disabled regions are opaque.
    mask: &'a [bool],
}

/// A declaration start: its keyword position and the first token it owns.
#[derive(Clone, Copy, Debug)]
struct Start {
    keyword: usize,
    first: usize,
}

/// Tokens before a declaration keyword that rule it out.
const NON_DECLARATION_PRECEDERS: &[&str] = &["if", "guard", "while", "for", "case", "catch"];

impl<'a> DeclarationParser<'a> {
    fn buffer(&self) -> &'a TokenBuffer {
        self.nav.buffer()
    }

    fn parse_range(&self, range: Range<usize>) -> Result<Vec<Declaration>, ParseError> {
        ensure_sufficient_stack(|| {
            if range.is_empty() {
                return Ok(Vec::new());
            }
            let mut starts = self.collect_starts(range.clone())?;
            let Some(first) = starts.first_mut() else {
                return Ok(vec![Declaration::Simple {
                    keyword: String::new(),
                    run: TokenRun::new(self.buffer(), range),
                }]);
            };
            first.first = range.start;

            let mut declarations = Vec::with_capacity(starts.len());
            for (i, start) in starts.iter().enumerate() {
                let end = starts.get(i + 1).map_or(range.end, |next| next.first);
                declarations.push(self.parse_one(*start, end)?);
            }
            trace!(count = declarations.len(), ?range, "parsed declarations");
            Ok(declarations)
        })
    }

    fn collect_starts(&self, range: Range<usize>) -> Result<Vec<Start>, ParseError> {
        let buffer = self.buffer();
        let mut starts: Vec<Start> = Vec::new();
        let mut i = range.start;
        while i < range.end {
            match &buffer[i] {
                Token::StartOfScope(open) if open == "#if" => {
                    if self.mask.get(i).copied().unwrap_or(true) {
                        self.push_start(&mut starts, i, range.start);
                    }
                    i = self.end_of_scope(i, "#endif")?;
                }
                Token::StartOfScope(open) => {
                    let expected = match open.as_str() {
                        "(" => ")",
                        "[" => "]",
                        "{" => "}",
                        "<" => ">",
                        "/*" => "*/",
                        "//" => "linebreak",
                        other => other,
                    };
                    i = match self.nav.end_of_scope(i) {
                        Some(end) => end,
                        // A trailing line comment has no linebreak to end it.
                        None if open == "//" => range.end,
                        None => return Err(ParseError::expected(i, expected)),
                    };
                }
                Token::Keyword(k) if k == "#else" || k == "#elseif" => {
                    self.push_start(&mut starts, i, range.start);
                }
                Token::Keyword(k) if is_declaration_keyword(k) && self.introduces_declaration(i) => {
                    self.push_start(&mut starts, i, range.start);
                }
                _ => {}
            }
            i += 1;
        }
        Ok(starts)
    }

    fn end_of_scope(&self, open: usize, expected: &str) -> Result<usize, ParseError> {
        self.nav
            .end_of_scope(open)
            .ok_or_else(|| ParseError::expected(open, expected))
    }

    /// Whether the declaration keyword at `at` starts a new declaration.
    fn introduces_declaration(&self, at: usize) -> bool {
        let buffer = self.buffer();
        if buffer[at].is_keyword_named("class") {
            // `class func`, `class var`: a modifier.
            let modifies = self.nav.next_significant(at).is_some_and(|next| {
                matches!(&buffer[next], Token::Keyword(k) if is_declaration_keyword(k) || is_modifier(k))
            });
            if modifies {
                return false;
            }
        }
        match self.nav.prev_significant(at).map(|p| &buffer[p]) {
            Some(Token::Keyword(k)) => !NON_DECLARATION_PRECEDERS.contains(&k.as_str()),
            Some(Token::Delimiter(d)) => d != "," && d != ":",
            Some(Token::Operator(op, _)) => op != ".",
            _ => true,
        }
    }

    fn push_start(&self, starts: &mut Vec<Start>, keyword: usize, floor: usize) {
        let floor = starts.last().map_or(floor, |last| (last.keyword + 1).max(floor));
        let line_start = self.nav.start_of_line(keyword);
        let first = if line_start < floor {
            // Another declaration shares this line.
            self.modifier_start(keyword).max(floor)
        } else {
            self.leading_trivia_start(line_start, floor)
        };
        starts.push(Start { keyword, first });
    }

    /// First modifier or attribute directly before `keyword` on its line.
    fn modifier_start(&self, keyword: usize) -> usize {
        let buffer = self.buffer();
        let mut first = keyword;
        while let Some(prev) = self.nav.prev_significant(first) {
            let owned = match &buffer[prev] {
                Token::Keyword(k) => is_modifier(k) || k.starts_with('@'),
                // `private(set)`, `@available(...)`
                Token::EndOfScope(close) if close == ")" => self
                    .nav
                    .start_of_scope(prev)
                    .and_then(|open| self.nav.prev_significant(open))
                    .is_some_and(|p| matches!(&buffer[p], Token::Keyword(k) if is_modifier(k) || k.starts_with('@'))),
                _ => false,
            };
            if !owned || self.nav.start_of_line(prev) != self.nav.start_of_line(keyword) {
                break;
            }
            first = match &buffer[prev] {
                Token::EndOfScope(_) => self.nav.start_of_scope(prev).and_then(|o| self.nav.prev_significant(o)).unwrap_or(prev),
                _ => prev,
            };
        }
        first
    }

    /// Walk `line_start` back over comment-only and attribute-only lines
    /// that directly precede it.
    fn leading_trivia_start(&self, mut line_start: usize, floor: usize) -> usize {
        let buffer = self.buffer();
        while line_start > floor {
            let previous = self.nav.start_of_line(line_start - 1);
            if previous < floor {
                break;
            }
            let first_significant = buffer
                .slice(previous..line_start)
                .iter()
                .find(|t| !t.is_space());
            let attached = match first_significant {
                Some(t) if t.is_comment() => true,
                Some(Token::Keyword(k)) => k.starts_with('@'),
                _ => false,
            };
            if !attached {
                break;
            }
            line_start = previous;
        }
        line_start
    }

    fn parse_one(&self, start: Start, end: usize) -> Result<Declaration, ParseError> {
        let buffer = self.buffer();
        match &buffer[start.keyword] {
            Token::StartOfScope(_) => self.parse_conditional(start, end),
            Token::Keyword(k) if is_type_keyword(k) => self.parse_type_body(start, end, k),
            Token::Keyword(k) => Ok(Declaration::Simple {
                keyword: k.clone(),
                run: TokenRun::new(buffer, start.first..end),
            }),
            other => Err(ParseError::expected(start.keyword, format!("declaration, found `{}`", other.text()))),
        }
    }

    fn parse_conditional(&self, start: Start, end: usize) -> Result<Declaration, ParseError> {
        let endif = self.end_of_scope(start.keyword, "#endif")?;
        if endif >= end {
            return Err(ParseError::expected(start.keyword, "#endif"));
        }
        let body_start = self.after_line(start.keyword);
        let close_start = self.nav.start_of_line(endif).max(body_start);
        Ok(Declaration::ConditionalCompilation {
            open: TokenRun::new(self.buffer(), start.first..body_start),
            body: self.parse_range(body_start..close_start)?,
            close: TokenRun::new(self.buffer(), close_start..end),
        })
    }

    fn parse_type_body(&self, start: Start, end: usize, keyword: &str) -> Result<Declaration, ParseError> {
        let buffer = self.buffer();
        let simple = || Declaration::Simple {
            keyword: keyword.to_owned(),
            run: TokenRun::new(buffer, start.first..end),
        };
        let Some(open) = self.body_brace(start.keyword, end) else {
            return Ok(simple());
        };
        let close = self.end_of_scope(open, "}")?;
        if close >= end {
            return Err(ParseError::expected(open, "}"));
        }
        if !self.nav.has_linebreak_between(open, close) {
            return Ok(simple());
        }
        let body_start = match self.nav.next_non_space(open) {
            Some(next) if buffer[next].is_linebreak() => next + 1,
            _ => open + 1,
        };
        let close_start = if self.nav.is_first_on_line(close) {
            self.nav.start_of_line(close).max(body_start)
        } else {
            close
        };
        Ok(Declaration::TypeBody {
            keyword: keyword.to_owned(),
            open: TokenRun::new(buffer, start.first..body_start),
            body: self.parse_range(body_start..close_start)?,
            close: TokenRun::new(buffer, close_start..end),
        })
    }

    /// The `{` opening the body of the type declared at `keyword`.
    fn body_brace(&self, keyword: usize, end: usize) -> Option<usize> {
        let mut i = keyword;
        while let Some(next) = self.nav.next_significant(i).filter(|&n| n < end) {
            match &self.buffer()[next] {
                Token::StartOfScope(open) if open == "{" => return Some(next),
                Token::StartOfScope(_) => i = self.nav.end_of_scope(next)?,
                _ => i = next,
            }
        }
        None
    }

    /// Index just past the linebreak ending `at`'s line.
    fn after_line(&self, at: usize) -> usize {
        let end = self.nav.end_of_line(at);
        (end + 1).min(self.buffer().len())
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
