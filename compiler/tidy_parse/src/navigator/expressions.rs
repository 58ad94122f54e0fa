//! Expression and type extents.
//!
//! These are greedy, non-backtracking scans: a base term followed by any
//! number of suffixes tried in a fixed order. They run in linear time and
//! accept that rare pathological inputs are mis-measured.

use std::ops::RangeInclusive;

use tidy_ir::{Fixity, Token};

use super::Navigator;

impl<'a> Navigator<'a> {
    /// Inclusive token range of the expression starting at `start`.
    ///
    /// Suffixes, in trial order: call, subscript or generic arguments;
    /// `.member`; postfix operator; infix operator with its right-hand
    /// side; `is`/`as` with a type; trailing closure; labeled trailing
    /// closure. Assignment and `->` end the expression.
    pub fn parse_expression_range(&self, start: usize) -> Option<RangeInclusive<usize>> {
        let mut end = self.expression_base(start)?;
        let mut after_trailing_closure = false;
        loop {
            let Some(next) = self.next_significant(end) else {
                break;
            };
            let same_line = !self.has_linebreak_between(end, next);
            let token = &self.buffer[next];
            match token {
                Token::StartOfScope(s) if same_line && matches!(s.as_str(), "(" | "[" | "<") => {
                    end = self.end_of_scope(next)?;
                    after_trailing_closure = false;
                }
                Token::Operator(op, Fixity::Infix) if op == "." => {
                    let member = self.next_significant(next)?;
                    let token = &self.buffer[member];
                    if !token.is_identifier_or_keyword() && !token.is_number() {
                        break;
                    }
                    end = member;
                    after_trailing_closure = false;
                }
                Token::Operator(_, Fixity::Postfix) => end = next,
                Token::Operator(op, Fixity::Infix) if !token.is_assignment_operator() && op != "->" => {
                    let rhs = self.next_significant(next)?;
                    end = *self.parse_expression_range(rhs)?.end();
                }
                Token::Keyword(k) if k == "is" || k == "as" => {
                    let mut type_start = self.next_significant(next)?;
                    if self.buffer[type_start].is_unwrap_operator() {
                        type_start = self.next_significant(type_start)?;
                    }
                    end = *self.parse_type(type_start)?.end();
                }
                Token::StartOfScope(s) if same_line && s == "{" && self.is_start_of_closure(next) => {
                    end = self.end_of_scope(next)?;
                    after_trailing_closure = true;
                }
                Token::Identifier(_) if after_trailing_closure => {
                    // `label: { ... }` after a trailing closure.
                    let Some(colon) = self.next_significant(next) else {
                        break;
                    };
                    let Some(brace) = self.next_significant(colon) else {
                        break;
                    };
                    if !self.buffer[colon].is_delimiter(":")
                        || !self.buffer[brace].is_start_of_scope_named("{")
                    {
                        break;
                    }
                    end = self.end_of_scope(brace)?;
                }
                _ => break,
            }
        }
        Some(start..=end)
    }

    /// Last index of the base term at `start`.
    fn expression_base(&self, start: usize) -> Option<usize> {
        match self.token(start)? {
            Token::Identifier(_) | Token::Number(..) => Some(start),
            Token::Keyword(k) => match k.as_str() {
                "try" | "await" => {
                    let mut operand = self.next_significant(start)?;
                    if self.buffer[operand].is_unwrap_operator() {
                        operand = self.next_significant(operand)?;
                    }
                    Some(*self.parse_expression_range(operand)?.end())
                }
                "if" => self.if_expression(start),
                "switch" => {
                    let brace = self.next_index(start, |t| t.is_start_of_scope_named("{"))?;
                    self.end_of_scope(brace)
                }
                word if word.starts_with('#') => Some(start),
                _ if self.buffer[start].is_value_keyword() => Some(start),
                _ => None,
            },
            Token::StartOfScope(s) if matches!(s.as_str(), "(" | "[" | "\"" | "\"\"\"" | "{") => {
                self.end_of_scope(start)
            }
            Token::Operator(_, Fixity::Prefix) => {
                let operand = self.next_significant(start)?;
                Some(*self.parse_expression_range(operand)?.end())
            }
            _ => None,
        }
    }

    /// `if cond { } else if cond { } else { }` used as an expression.
    fn if_expression(&self, start: usize) -> Option<usize> {
        let brace = self.next_index(start, |t| t.is_start_of_scope_named("{"))?;
        let mut end = self.end_of_scope(brace)?;
        while let Some(next) = self.next_significant(end) {
            if !self.buffer[next].is_keyword_named("else") {
                break;
            }
            let body = self.next_index(next, |t| t.is_start_of_scope_named("{"))?;
            end = self.end_of_scope(body)?;
        }
        Some(end)
    }

    /// Inclusive token range of the type starting at `start`.
    pub fn parse_type(&self, start: usize) -> Option<RangeInclusive<usize>> {
        let mut base = start;
        // Attributes, `inout`, and `some`/`any` prefixes.
        loop {
            match self.token(base)? {
                Token::Keyword(k) if k.starts_with('@') || k == "inout" => {}
                Token::Identifier(word) if word == "some" || word == "any" => {
                    let qualifies = self.next_significant(base).is_some_and(|n| {
                        let next = &self.buffer[n];
                        next.is_identifier_or_keyword() || next.is_start_of_scope_named("(")
                    });
                    if !qualifies {
                        break;
                    }
                }
                _ => break,
            }
            base = self.next_significant(base)?;
        }

        let mut end = match self.token(base)? {
            Token::Identifier(_) => base,
            Token::Keyword(k) if matches!(k.as_str(), "Self" | "Any" | "self") => base,
            Token::StartOfScope(s) if s == "(" || s == "[" => self.end_of_scope(base)?,
            _ => return None,
        };
        loop {
            let Some(next) = self.next_significant(end) else {
                break;
            };
            let same_line = !self.has_linebreak_between(end, next);
            match &self.buffer[next] {
                Token::StartOfScope(s) if s == "<" && same_line => end = self.end_of_scope(next)?,
                Token::Operator(op, Fixity::Infix) if op == "." => {
                    let member = self.next_significant(next)?;
                    if !self.buffer[member].is_identifier_or_keyword() {
                        break;
                    }
                    end = member;
                }
                Token::Operator(_, Fixity::Postfix) if self.buffer[next].is_unwrap_operator() => end = next,
                Token::Operator(op, _) if op == "->" || op == "&" => {
                    let rhs = self.next_significant(next)?;
                    end = *self.parse_type(rhs)?.end();
                }
                token if is_effect(token) => {
                    // Only part of a function type when an arrow follows.
                    let mut arrow = next;
                    while self.is(arrow, is_effect) {
                        arrow = self.next_significant(arrow)?;
                    }
                    if !self.buffer[arrow].is_operator("->") {
                        break;
                    }
                    end = self.prev_significant(arrow)?;
                }
                _ => break,
            }
        }
        Some(start..=end)
    }

    /// Whether a linebreak lies strictly between `from` and `to`.
    pub fn has_linebreak_between(&self, from: usize, to: usize) -> bool {
        self.buffer.slice(from + 1..to).iter().any(Token::is_linebreak)
    }
}

fn is_effect(token: &Token) -> bool {
    matches!(token, Token::Keyword(k) if matches!(k.as_str(), "async" | "throws" | "rethrows"))
}
