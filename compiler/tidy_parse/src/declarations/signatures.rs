//! Sub-parsers for the parts of a declaration rules need to look inside.
//!
//! Each parser starts at a known token and returns `None` when the tokens
//! there do not have the expected shape.

use std::ops::{Range, RangeInclusive};

use tidy_ir::{Fixity, Token};
use tracing::trace;

use crate::Navigator;

/// `let`/`var` declaration with a single name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Property {
    pub keyword: usize,
    pub name: String,
    pub name_index: usize,
    pub type_range: Option<RangeInclusive<usize>>,
    pub value_range: Option<RangeInclusive<usize>>,
    /// `{` ... `}` of a computed property or observer block.
    pub body_range: Option<RangeInclusive<usize>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameter {
    /// External label when it differs from the internal name.
    pub label: Option<String>,
    pub name: String,
    pub name_index: usize,
    pub type_range: Option<RangeInclusive<usize>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenericParam {
    pub name: String,
    pub conformances: Vec<String>,
}

/// `func`, `init` or `subscript` signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionSignature {
    pub keyword: usize,
    pub name: String,
    pub generics: Vec<GenericParam>,
    pub params: Vec<Parameter>,
    pub params_range: RangeInclusive<usize>,
    pub effects: Vec<String>,
    pub return_type: Option<RangeInclusive<usize>>,
    pub body_range: Option<RangeInclusive<usize>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallArgument {
    pub label: Option<String>,
    /// First to last token of the argument, label included.
    pub range: RangeInclusive<usize>,
}

/// A name bound by a pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub index: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pattern {
    pub names: Vec<Binding>,
    /// Last token of the pattern.
    pub end: usize,
}

impl Navigator<'_> {
    /// Parse the property introduced by the `let`/`var` at `keyword`.
    pub fn parse_property(&self, keyword: usize) -> Option<Property> {
        if !self.is(keyword, |t| t.is_keyword_named("let") || t.is_keyword_named("var")) {
            return None;
        }
        let name_index = self.next_significant(keyword)?;
        let Token::Identifier(name) = &self.buffer()[name_index] else {
            return None;
        };
        let mut property = Property {
            keyword,
            name: name.trim_matches('`').to_owned(),
            name_index,
            type_range: None,
            value_range: None,
            body_range: None,
        };
        let mut end = name_index;
        if let Some(colon) = self.next_significant(end).filter(|&c| self.buffer()[c].is_delimiter(":")) {
            let range = self.parse_type(self.next_significant(colon)?)?;
            end = *range.end();
            property.type_range = Some(range);
        }
        if let Some(equals) = self.next_significant(end).filter(|&e| self.buffer()[e].is_operator("=")) {
            let range = self.parse_expression_range(self.next_significant(equals)?)?;
            end = *range.end();
            property.value_range = Some(range);
        }
        if let Some(open) = self.next_significant(end).filter(|&o| self.buffer()[o].is_start_of_scope_named("{")) {
            if !self.is_start_of_closure(open) {
                property.body_range = Some(open..=self.end_of_scope(open)?);
            }
        }
        Some(property)
    }

    /// Parse the function, initializer or subscript introduced at `keyword`.
    pub fn parse_function(&self, keyword: usize) -> Option<FunctionSignature> {
        let Token::Keyword(word) = self.token(keyword)? else {
            return None;
        };
        let mut i = keyword;
        let name = match word.as_str() {
            "func" => {
                i = self.next_significant(i)?;
                match &self.buffer()[i] {
                    Token::Identifier(name) => name.trim_matches('`').to_owned(),
                    Token::Operator(op, _) => op.clone(),
                    _ => return None,
                }
            }
            "init" => {
                // `init?` / `init!`
                if let Some(next) = self.next_non_space(i).filter(|&n| self.buffer()[n].is_unwrap_operator()) {
                    i = next;
                }
                "init".to_owned()
            }
            "subscript" => "subscript".to_owned(),
            _ => return None,
        };

        let mut next = self.next_significant(i)?;
        let mut generics = Vec::new();
        if self.buffer()[next].is_start_of_scope_named("<") {
            let (params, close) = self.parse_generics(next)?;
            generics = params;
            next = self.next_significant(close)?;
        }
        if !self.buffer()[next].is_start_of_scope_named("(") {
            return None;
        }
        let close = self.end_of_scope(next)?;
        let params = self.parse_parameters(next, close);
        let mut signature = FunctionSignature {
            keyword,
            name,
            generics,
            params,
            params_range: next..=close,
            effects: Vec::new(),
            return_type: None,
            body_range: None,
        };

        let mut i = close;
        while let Some(next) = self.next_significant(i) {
            match &self.buffer()[next] {
                Token::Keyword(k) if matches!(k.as_str(), "async" | "throws" | "rethrows") => {
                    signature.effects.push(k.clone());
                    i = next;
                }
                // Typed throws: `throws(MyError)`
                Token::StartOfScope(s) if s == "(" && self.buffer()[i].is_keyword_named("throws") => {
                    i = self.end_of_scope(next)?;
                }
                Token::Operator(op, _) if op == "->" => {
                    let range = self.parse_type(self.next_significant(next)?)?;
                    i = *range.end();
                    signature.return_type = Some(range);
                }
                Token::Keyword(k) if k == "where" => {
                    i = self.next_index(next, |t| t.is_start_of_scope_named("{") || t.is_linebreak())?;
                    if self.buffer()[i].is_linebreak() {
                        break;
                    }
                    signature.body_range = Some(i..=self.end_of_scope(i)?);
                    break;
                }
                Token::StartOfScope(s) if s == "{" => {
                    signature.body_range = Some(next..=self.end_of_scope(next)?);
                    break;
                }
                _ => break,
            }
        }
        Some(signature)
    }

    fn parse_parameters(&self, open: usize, close: usize) -> Vec<Parameter> {
        let mut params = Vec::new();
        for group in self.comma_groups(open, close) {
            let names: Vec<usize> = group
                .clone()
                .filter(|&i| self.buffer()[i].is_identifier())
                .take_while(|&i| {
                    self.next_significant(i)
                        .is_some_and(|n| self.buffer()[n].is_identifier() || self.buffer()[n].is_delimiter(":"))
                })
                .collect();
            let (label, name_index) = match names.as_slice() {
                [name] => (None, *name),
                [label, name, ..] => (Some(self.buffer()[*label].text().to_owned()), *name),
                [] => continue,
            };
            let type_range = self
                .next_significant(name_index)
                .filter(|&c| self.buffer()[c].is_delimiter(":"))
                .and_then(|c| self.next_significant(c))
                .and_then(|t| self.parse_type(t));
            params.push(Parameter {
                label,
                name: self.buffer()[name_index].text().trim_matches('`').to_owned(),
                name_index,
                type_range,
            });
        }
        params
    }

    /// Parse `<T: P, U>` at `open`; returns the parameters and the index of
    /// the closing `>`.
    pub fn parse_generics(&self, open: usize) -> Option<(Vec<GenericParam>, usize)> {
        if !self.is(open, |t| t.is_start_of_scope_named("<")) {
            return None;
        }
        let close = self.end_of_scope(open)?;
        let mut params = Vec::new();
        for group in self.comma_groups(open, close) {
            let mut tokens = group.filter(|&i| !self.buffer()[i].is_space_or_comment_or_linebreak());
            let Some(Token::Identifier(name)) = tokens.next().map(|i| &self.buffer()[i]) else {
                continue;
            };
            let conformances = tokens
                .filter_map(|i| match &self.buffer()[i] {
                    Token::Identifier(c) => Some(c.clone()),
                    _ => None,
                })
                .collect();
            params.push(GenericParam {
                name: name.clone(),
                conformances,
            });
        }
        Some((params, close))
    }

    /// Parse the argument list of the call whose `(` is at `open`.
    pub fn parse_call_arguments(&self, open: usize) -> Option<Vec<CallArgument>> {
        if !self.is(open, |t| t.is_start_of_scope_named("(")) {
            return None;
        }
        let close = self.end_of_scope(open)?;
        let mut arguments = Vec::new();
        for group in self.comma_groups(open, close) {
            let mut significant = group.filter(|&i| !self.buffer()[i].is_space_or_comment_or_linebreak());
            let Some(first) = significant.next() else {
                continue;
            };
            let last = significant.next_back().unwrap_or(first);
            let label = match (&self.buffer()[first], self.next_significant(first)) {
                (Token::Identifier(name) | Token::Keyword(name), Some(colon))
                    if self.buffer()[colon].is_delimiter(":") =>
                {
                    Some(name.clone())
                }
                _ => None,
            };
            arguments.push(CallArgument {
                label,
                range: first..=last,
            });
        }
        Some(arguments)
    }

    /// Token ranges between the top-level commas of the scope `open..close`.
    fn comma_groups(&self, open: usize, close: usize) -> Vec<Range<usize>> {
        let mut groups = Vec::new();
        let mut start = open + 1;
        let mut i = open + 1;
        while i < close {
            match &self.buffer()[i] {
                Token::StartOfScope(s) if s != "//" => {
                    i = self.end_of_scope(i).unwrap_or(close);
                }
                Token::Delimiter(d) if d == "," => {
                    groups.push(start..i);
                    start = i + 1;
                }
                _ => {}
            }
            i += 1;
        }
        if self.buffer().slice(start..close).iter().any(|t| !t.is_space_or_comment_or_linebreak()) {
            groups.push(start..close);
        }
        groups
    }

    /// Names bound by the pattern starting at `at`.
    ///
    /// Handles plain names, tuples, `let`/`var` nested in patterns, enum
    /// case patterns with associated values and `name?` optional patterns.
    /// `_` binds nothing.
    pub fn binding_names(&self, at: usize) -> Option<Pattern> {
        let mut pattern = Pattern {
            names: Vec::new(),
            end: at,
        };
        pattern.end = self.collect_bindings(at, &mut pattern.names)?;
        Some(pattern)
    }

    fn collect_bindings(&self, at: usize, names: &mut Vec<Binding>) -> Option<usize> {
        match self.token(at)? {
            Token::Keyword(k) if k == "let" || k == "var" => {
                let next = self.next_significant(at)?;
                self.collect_bindings(next, names)
            }
            Token::Identifier(name) => {
                let mut end = at;
                match self.next_significant(at).map(|n| (n, &self.buffer()[n])) {
                    // `Foo.bar(x)`: a case path, not a binding.
                    Some((dot, Token::Operator(op, Fixity::Infix))) if op == "." => {
                        return self.case_pattern(dot, names);
                    }
                    Some((paren, Token::StartOfScope(s))) if s == "(" => {
                        return self.case_arguments(paren, names);
                    }
                    Some((question, token)) if token.is_unwrap_operator() => end = question,
                    _ => {}
                }
                if name != "_" {
                    names.push(Binding {
                        name: name.trim_matches('`').to_owned(),
                        index: at,
                    });
                }
                Some(end)
            }
            Token::Operator(op, Fixity::Prefix) if op == "." => self.case_pattern(at, names),
            Token::StartOfScope(s) if s == "(" => self.case_arguments(at, names),
            _ => None,
        }
    }

    /// `.member` or `Type.member`, optionally followed by `(patterns)`.
    fn case_pattern(&self, dot: usize, names: &mut Vec<Binding>) -> Option<usize> {
        let mut end = self.next_significant(dot)?;
        while let Some(next) = self.next_significant(end) {
            match &self.buffer()[next] {
                Token::Operator(op, Fixity::Infix) if op == "." => end = self.next_significant(next)?,
                Token::StartOfScope(s) if s == "(" => return self.case_arguments(next, names),
                _ => break,
            }
        }
        Some(end)
    }

    /// Tuple or associated-value list; `label:` prefixes are skipped.
    fn case_arguments(&self, open: usize, names: &mut Vec<Binding>) -> Option<usize> {
        let close = self.end_of_scope(open)?;
        for group in self.comma_groups(open, close) {
            let Some(mut first) = group
                .clone()
                .find(|&i| !self.buffer()[i].is_space_or_comment_or_linebreak())
            else {
                continue;
            };
            if self
                .next_significant(first)
                .is_some_and(|n| n < group.end && self.buffer()[n].is_delimiter(":"))
            {
                first = self.next_significant(first).and_then(|c| self.next_significant(c))?;
            }
            if self.collect_bindings(first, names).is_none() {
                trace!(at = first, "pattern element binds nothing");
            }
        }
        Some(close)
    }
}
