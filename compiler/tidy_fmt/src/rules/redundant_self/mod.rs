//! Explicit `self` policy.
//!
//! `remove` drops `self.` wherever the member is reachable implicitly,
//! `insert` adds it before every bare reference to a member, and
//! `init-only` inserts inside initializers and removes everywhere else.
//!
//! There is no symbol table. One recursive walk mirrors the nested scopes
//! of the file (type bodies, functions, accessors, closures, control-flow
//! bodies) and threads a [`Scope`] value through them. At an identifier a
//! local shadow wins over a member, and anything else is left untouched.
//!
//! Edits are collected during the walk and applied afterwards, last first,
//! so every recorded position stays valid.

mod members;

use rustc_hash::FxHashSet;
use tidy_ir::token::{is_accessor_name, is_declaration_keyword, is_modifier, KEYWORDS};
use tidy_ir::{Fixity, Token};
use tidy_parse::navigator::{CaptureKind, ClosureSignature};
use tidy_parse::{ensure_sufficient_stack, parse_declarations, Navigator, ParseError};
use tracing::debug;

use crate::options::{SelfMode, Version};
use crate::{FormatError, FormatOptions, Formatter};
use members::{collect_type_members, type_path, TypeMap, TypeMembers};

/// First version where an unwrapped weak `self` allows implicit access.
const IMPLICIT_WEAK_SELF: Version = Version::new(5, 8, 0);

/// Member names that never stand alone after `self.`.
const SELF_ONLY_NAMES: &[&str] = &["init", "self", "Type", "Protocol", "dynamicType"];

pub(crate) fn redundant_self(f: &mut Formatter<'_>) -> Result<(), FormatError> {
    if f.options().fragment {
        return Ok(());
    }
    let mut edits = {
        let declarations = parse_declarations(f.buffer(), 0..f.len())?;
        let nav = f.navigator();
        let types = collect_type_members(&declarations, nav)?;
        let mut resolver = Resolver {
            nav,
            options: f.options(),
            types: &types,
            edits: Vec::new(),
        };
        resolver.walk(0, nav.len(), &mut Scope::root())?;
        resolver.edits
    };
    edits.sort_unstable();
    edits.dedup();
    debug!(edits = edits.len(), mode = ?f.options().self_mode, "resolve self");
    for edit in edits.into_iter().rev() {
        match edit {
            Edit::Insert(at) => {
                f.insert_all(at, [Token::keyword("self"), Token::operator(".", Fixity::Infix)]);
            }
            Edit::Remove(at) => {
                f.remove_range(at..at + 2);
            }
        }
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SelfAccess {
    /// Members are reachable without `self.`.
    Implicit,
    /// `self.` is required: an escaping closure in a reference type.
    Explicit,
    /// `self` is optional here; nothing may be inserted or removed.
    WeakSelf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Edit {
    /// Insert `self.` before the identifier at this index.
    Insert(usize),
    /// Remove the `self` `.` pair starting at this index.
    Remove(usize),
}

/// Lexical context of one point in the walk.
#[derive(Clone, Debug)]
struct Scope<'a> {
    /// Dotted path of the innermost enclosing type.
    path: String,
    members: Option<&'a TypeMembers>,
    /// Directly inside a type body, among member declarations.
    type_level: bool,
    is_static: bool,
    in_init: bool,
    access: SelfAccess,
    locals: FxHashSet<String>,
    /// Names being declared by the enclosing statement, or later in the
    /// enclosing block.
    blocked: FxHashSet<String>,
}

impl Scope<'_> {
    fn root() -> Self {
        Scope {
            path: String::new(),
            members: None,
            type_level: false,
            is_static: false,
            in_init: false,
            access: SelfAccess::Implicit,
            locals: FxHashSet::default(),
            blocked: FxHashSet::default(),
        }
    }

    fn shadows(&self, name: &str) -> bool {
        self.locals.contains(name) || self.blocked.contains(name)
    }
}

struct Resolver<'a> {
    nav: Navigator<'a>,
    options: &'a FormatOptions,
    types: &'a TypeMap,
    edits: Vec<Edit>,
}

impl<'a> Resolver<'a> {
    fn token(&self, at: usize) -> &'a Token {
        &self.nav.buffer()[at]
    }

    fn close_of(&self, open: usize) -> Result<usize, FormatError> {
        let Some(close) = self.nav.end_of_scope(open) else {
            let expected = match self.token(open).text() {
                "(" => ")",
                "[" => "]",
                ":" => "case, default or }",
                _ => "}",
            };
            return Err(ParseError::expected(open, expected).into());
        };
        Ok(close)
    }

    fn walk(&mut self, start: usize, end: usize, scope: &mut Scope<'a>) -> Result<(), FormatError> {
        ensure_sufficient_stack(|| {
            let mut i = start;
            while i < end {
                i = self.step(i, scope)?.max(i + 1);
            }
            Ok(())
        })
    }

    /// Walk the inside of the block opened at `open`. Names the block
    /// declares are blocked from the start, so a member reference can
    /// never be rewritten to resolve to a local declared further down.
    fn walk_block(&mut self, open: usize, close: usize, mut scope: Scope<'a>) -> Result<(), FormatError> {
        scope.blocked.extend(self.declared_names(open + 1, close));
        self.walk(open + 1, close, &mut scope)
    }

    /// Handle the token at `i`; returns where to continue.
    fn step(&mut self, i: usize, scope: &mut Scope<'a>) -> Result<usize, FormatError> {
        match self.token(i) {
            Token::Keyword(word) => match word.as_str() {
                "class" | "struct" | "enum" | "actor" | "extension" | "protocol" if self.declares_type(i) => {
                    self.type_declaration(i, word, scope)
                }
                "func" => self.function(i, scope),
                "init" | "subscript" if scope.type_level => self.function(i, scope),
                "deinit" if scope.type_level => self.deinitializer(i, scope),
                "let" | "var" if scope.type_level => self.member_property(i, scope),
                "let" | "var" => self.local_binding(i, scope),
                "if" | "while" | "guard" => self.conditional(i, scope),
                "for" => self.for_loop(i, scope),
                "catch" => self.catch_clause(i, scope),
                "self" => {
                    self.check_removal(i, scope);
                    Ok(i + 1)
                }
                "#selector" | "#keyPath" => self.skip_arguments(i),
                _ => Ok(i + 1),
            },
            Token::Identifier(name) => self.identifier(i, name, scope),
            Token::StartOfScope(open) if open == "{" => self.brace(i, scope),
            Token::EndOfScope(label) if label == "case" || label == "default" => self.case_body(i, scope),
            _ => Ok(i + 1),
        }
    }

    // ─── Declarations ────────────────────────────────────────────────

    fn declares_type(&self, keyword: usize) -> bool {
        self.nav
            .next_significant(keyword)
            .is_some_and(|n| self.token(n).is_identifier())
    }

    fn type_declaration(&mut self, keyword: usize, word: &str, scope: &Scope<'a>) -> Result<usize, FormatError> {
        let Some(name) = self.nav.next_significant(keyword).map(|n| self.dotted_name(n)) else {
            return Ok(keyword + 1);
        };
        let Some(open) = self.body_brace(keyword) else {
            return Ok(keyword + 1);
        };
        let close = self.close_of(open)?;
        let path = type_path(&scope.path, word, &name);
        let mut inner = Scope::root();
        inner.members = self.types.get(&path);
        inner.path = path;
        inner.type_level = true;
        self.walk(open + 1, close, &mut inner)?;
        Ok(close + 1)
    }

    /// `A.B.C` starting at the identifier `at`.
    fn dotted_name(&self, at: usize) -> String {
        let mut name = self.token(at).text().trim_matches('`').to_owned();
        let mut i = at;
        while let Some(dot) = self.nav.next_significant(i).filter(|&d| self.token(d).is_operator(".")) {
            let Some(part) = self.nav.next_significant(dot).filter(|&p| self.token(p).is_identifier()) else {
                break;
            };
            name.push('.');
            name.push_str(self.token(part).text());
            i = part;
        }
        name
    }

    /// The body `{` governed by the keyword at `from`, skipping bracketed
    /// groups and closures on the way.
    fn body_brace(&self, from: usize) -> Option<usize> {
        let mut i = self.nav.next_significant(from)?;
        loop {
            match self.token(i) {
                Token::StartOfScope(s) if s == "{" => {
                    if !self.nav.is_start_of_closure(i) {
                        return Some(i);
                    }
                    i = self.nav.end_of_scope(i)?;
                }
                Token::StartOfScope(s) if s != ":" => i = self.nav.end_of_scope(i)?,
                Token::EndOfScope(_) => return None,
                Token::Delimiter(d) if d == ";" => return None,
                _ => {}
            }
            i = self.nav.next_significant(i)?;
        }
    }

    fn has_static_modifier(&self, keyword: usize) -> bool {
        let mut i = keyword;
        while let Some(prev) = self.nav.prev_significant(i) {
            match self.token(prev) {
                Token::Keyword(k) if k == "static" || k == "class" => return true,
                Token::Keyword(k) if is_modifier(k) || k.starts_with('@') => i = prev,
                // `private(set)`, `@available(...)`
                Token::EndOfScope(s) if s == ")" => match self.nav.start_of_scope(prev) {
                    Some(open) => i = open,
                    None => return false,
                },
                _ => return false,
            }
        }
        false
    }

    fn function(&mut self, keyword: usize, scope: &mut Scope<'a>) -> Result<usize, FormatError> {
        let Some(signature) = self.nav.parse_function(keyword) else {
            return Ok(keyword + 1);
        };
        let is_func = self.token(keyword).is_keyword_named("func");
        if is_func && !scope.type_level {
            scope.locals.insert(signature.name.clone());
        }
        let Some(body) = signature.body_range else {
            return Ok(signature.params_range.end() + 1);
        };
        let mut inner = scope.clone();
        if scope.type_level {
            inner.type_level = false;
            inner.locals.clear();
            inner.blocked.clear();
            inner.is_static = self.has_static_modifier(keyword);
            inner.in_init = self.token(keyword).is_keyword_named("init");
            inner.access = SelfAccess::Implicit;
        }
        inner.locals.extend(signature.params.into_iter().map(|p| p.name));
        self.walk_block(*body.start(), *body.end(), inner)?;
        Ok(body.end() + 1)
    }

    fn deinitializer(&mut self, keyword: usize, scope: &Scope<'a>) -> Result<usize, FormatError> {
        let Some(open) = self.body_brace(keyword) else {
            return Ok(keyword + 1);
        };
        let close = self.close_of(open)?;
        let mut inner = scope.clone();
        inner.type_level = false;
        self.walk_block(open, close, inner)?;
        Ok(close + 1)
    }

    /// A stored or computed property among a type's members. Initializer
    /// expressions cannot see `self` and are skipped.
    fn member_property(&mut self, keyword: usize, scope: &Scope<'a>) -> Result<usize, FormatError> {
        let Some(property) = self.nav.parse_property(keyword) else {
            return Ok(keyword + 1);
        };
        let end = [
            Some(property.name_index),
            property.type_range.as_ref().map(|r| *r.end()),
            property.value_range.as_ref().map(|r| *r.end()),
            property.body_range.as_ref().map(|r| *r.end()),
        ]
        .into_iter()
        .flatten()
        .max()
        .unwrap_or(keyword);
        if let Some(body) = property.body_range {
            let mut inner = scope.clone();
            inner.type_level = false;
            inner.is_static = self.has_static_modifier(keyword);
            self.accessors(*body.start(), *body.end(), inner)?;
        }
        Ok(end + 1)
    }

    /// A property body: either accessor clauses or an implicit getter.
    fn accessors(&mut self, open: usize, close: usize, scope: Scope<'a>) -> Result<(), FormatError> {
        let mut i = open;
        let is_clause_list = loop {
            let Some(next) = self.nav.next_significant(i).filter(|&n| n < close) else {
                break false;
            };
            match self.token(next) {
                Token::Keyword(k) if is_modifier(k) || k.starts_with('@') => i = next,
                Token::Identifier(name) => break is_accessor_name(name),
                _ => break false,
            }
        };
        if !is_clause_list {
            return self.walk_block(open, close, scope);
        }

        let mut i = open + 1;
        while i < close {
            match self.token(i) {
                Token::Identifier(name) if is_accessor_name(name) => {
                    let mut body = self.nav.next_significant(i).filter(|&b| b < close);
                    let mut parameter = None;
                    if let Some(paren) = body.filter(|&p| self.token(p).is_start_of_scope_named("(")) {
                        let paren_close = self.close_of(paren)?;
                        parameter = self
                            .nav
                            .next_significant(paren)
                            .filter(|&p| p < paren_close && self.token(p).is_identifier())
                            .map(|p| self.token(p).text().to_owned());
                        body = self.nav.next_significant(paren_close).filter(|&b| b < close);
                    }
                    // `get async throws`, `get throws(E)`
                    while let Some(effect) = body.filter(|&e| {
                        matches!(self.token(e), Token::Keyword(k) if matches!(k.as_str(), "async" | "throws" | "rethrows"))
                    }) {
                        let mut last = effect;
                        if let Some(paren) = self
                            .nav
                            .next_significant(effect)
                            .filter(|&p| self.token(p).is_start_of_scope_named("("))
                        {
                            last = self.close_of(paren)?;
                        }
                        body = self.nav.next_significant(last).filter(|&b| b < close);
                    }
                    let Some(body) = body.filter(|&b| self.token(b).is_start_of_scope_named("{")) else {
                        i += 1;
                        continue;
                    };
                    let body_close = self.close_of(body)?;
                    let mut inner = scope.clone();
                    let implicit = match name.as_str() {
                        "set" | "willSet" => Some("newValue"),
                        "didSet" => Some("oldValue"),
                        _ => None,
                    };
                    if let Some(local) = parameter.or_else(|| implicit.map(str::to_owned)) {
                        inner.locals.insert(local);
                    }
                    self.walk_block(body, body_close, inner)?;
                    i = body_close + 1;
                }
                Token::StartOfScope(_) => i = self.nav.end_of_scope(i).unwrap_or(i) + 1,
                _ => i += 1,
            }
        }
        Ok(())
    }

    /// Statement-level `let`/`var`, including `let a = 1, b = a`.
    fn local_binding(&mut self, keyword: usize, scope: &mut Scope<'a>) -> Result<usize, FormatError> {
        let mut at = keyword;
        let mut end = keyword;
        loop {
            let Some(pattern) = self.nav.next_significant(at).and_then(|first| self.nav.binding_names(first))
            else {
                break;
            };
            let names: Vec<String> = pattern.names.into_iter().map(|b| b.name).collect();
            end = pattern.end;
            if let Some(range) = self
                .nav
                .next_significant(end)
                .filter(|&c| self.token(c).is_delimiter(":"))
                .and_then(|c| self.nav.next_significant(c))
                .and_then(|t| self.nav.parse_type(t))
            {
                end = *range.end();
            }
            if let Some(range) = self
                .nav
                .next_significant(end)
                .filter(|&e| self.token(e).is_operator("="))
                .and_then(|e| self.nav.next_significant(e))
                .and_then(|v| self.nav.parse_expression_range(v))
            {
                let mut value_scope = scope.clone();
                value_scope.blocked.extend(names.iter().cloned());
                self.walk(*range.start(), range.end() + 1, &mut value_scope)?;
                end = *range.end();
            }
            if let Some(open) = self
                .nav
                .next_significant(end)
                .filter(|&o| self.token(o).is_start_of_scope_named("{") && !self.nav.is_start_of_closure(o))
            {
                let close = self.close_of(open)?;
                self.accessors(open, close, scope.clone())?;
                end = close;
            }
            scope.locals.extend(names);
            match self.nav.next_significant(end) {
                Some(comma) if self.token(comma).is_delimiter(",") => at = comma,
                _ => break,
            }
        }
        Ok(end + 1)
    }

    /// Names declared directly in `start..end`, ignoring condition
    /// bindings whose scope is a nested body.
    fn declared_names(&self, start: usize, end: usize) -> Vec<String> {
        let mut names = Vec::new();
        let mut i = start;
        while i < end {
            match self.token(i) {
                Token::StartOfScope(s) if s != ":" => {
                    i = self.nav.end_of_scope(i).unwrap_or(i);
                }
                Token::Keyword(k) if (k == "let" || k == "var") && self.binds_in_block(i) => {
                    if let Some(pattern) = self.nav.next_significant(i).and_then(|n| self.nav.binding_names(n)) {
                        names.extend(pattern.names.into_iter().map(|b| b.name));
                    }
                }
                Token::Keyword(k) if k == "func" => {
                    if let Some(name) = self.nav.next_significant(i).filter(|&n| self.token(n).is_identifier()) {
                        names.push(self.token(name).text().trim_matches('`').to_owned());
                    }
                }
                _ => {}
            }
            i += 1;
        }
        names
    }

    fn binds_in_block(&self, keyword: usize) -> bool {
        let after_label = self.nav.prev_significant(keyword).is_some_and(|p| {
            matches!(self.token(p), Token::Keyword(k) | Token::EndOfScope(k) if k == "case" || k == "catch")
        });
        let start = self.nav.start_of_statement(keyword);
        let in_condition = start != keyword
            && matches!(
                self.token(start),
                Token::Keyword(k) if matches!(k.as_str(), "if" | "while" | "for" | "switch" | "catch" | "case")
            );
        !after_label && !in_condition
    }

    // ─── Control flow ────────────────────────────────────────────────

    fn conditional(&mut self, keyword: usize, scope: &mut Scope<'a>) -> Result<usize, FormatError> {
        if self.is_repeat_while(keyword) {
            return Ok(keyword + 1);
        }
        let Some(body) = self.body_brace(keyword) else {
            return Ok(keyword + 1);
        };
        let close = self.close_of(body)?;
        let is_guard = self.token(keyword).is_keyword_named("guard");
        let conditions_end = if is_guard {
            self.nav
                .prev_significant(body)
                .filter(|&e| self.token(e).is_keyword_named("else"))
                .unwrap_or(body)
        } else {
            body
        };
        let mut bound = scope.clone();
        self.conditions(keyword + 1, conditions_end, &mut bound)?;
        if is_guard {
            self.walk_block(body, close, scope.clone())?;
            *scope = bound;
        } else {
            self.walk_block(body, close, bound)?;
        }
        Ok(close + 1)
    }

    /// `repeat { ... } while cond`: the condition is a plain expression.
    fn is_repeat_while(&self, keyword: usize) -> bool {
        self.token(keyword).is_keyword_named("while")
            && self
                .nav
                .prev_significant(keyword)
                .filter(|&p| self.token(p).is_end_of_scope_named("}"))
                .and_then(|p| self.nav.start_of_scope(p))
                .and_then(|open| self.nav.prev_significant(open))
                .is_some_and(|r| self.token(r).is_keyword_named("repeat"))
    }

    /// A condition list. Each binding is visible to the conditions after it.
    fn conditions(&mut self, start: usize, end: usize, scope: &mut Scope<'a>) -> Result<(), FormatError> {
        let mut i = start;
        while i < end {
            i = match self.token(i) {
                Token::Keyword(k) if k == "let" || k == "var" => self.condition_binding(i, end, scope)?,
                Token::Keyword(k) if k == "case" => self.case_condition(i, end, scope)?,
                _ => self.step(i, scope)?,
            }
            .max(i + 1);
        }
        Ok(())
    }

    fn condition_binding(&mut self, keyword: usize, end: usize, scope: &mut Scope<'a>) -> Result<usize, FormatError> {
        let Some(target) = self.nav.next_significant(keyword).filter(|&t| t < end) else {
            return Ok(keyword + 1);
        };
        if self.token(target).is_keyword_named("self") {
            if scope.access == SelfAccess::WeakSelf {
                scope.access = if self.options.language_version >= IMPLICIT_WEAK_SELF {
                    SelfAccess::Implicit
                } else {
                    SelfAccess::Explicit
                };
            }
            let rhs = self
                .nav
                .next_significant(target)
                .filter(|&e| e < end && self.token(e).is_operator("="))
                .and_then(|e| self.nav.next_significant(e))
                .filter(|&v| v < end);
            return Ok(rhs.unwrap_or(target) + 1);
        }
        let Some(pattern) = self.nav.binding_names(target) else {
            return Ok(keyword + 1);
        };
        let names: Vec<String> = pattern.names.into_iter().map(|b| b.name).collect();
        let mut last = pattern.end;
        if let Some(range) = self
            .nav
            .next_significant(last)
            .filter(|&c| c < end && self.token(c).is_delimiter(":"))
            .and_then(|c| self.nav.next_significant(c))
            .and_then(|t| self.nav.parse_type(t))
        {
            last = (*range.end()).min(end - 1);
        }
        last = self.condition_value(last, end, &names, scope)?;
        scope.locals.extend(names);
        Ok(last + 1)
    }

    /// `if case .some(let x) = value`
    fn case_condition(&mut self, keyword: usize, end: usize, scope: &mut Scope<'a>) -> Result<usize, FormatError> {
        let mut i = keyword;
        let mut equals = None;
        while let Some(next) = self.nav.next_significant(i).filter(|&n| n < end) {
            match self.token(next) {
                Token::Operator(op, _) if op == "=" => {
                    equals = Some(next);
                    break;
                }
                Token::Delimiter(d) if d == "," => break,
                Token::StartOfScope(_) => i = self.close_of(next)?,
                _ => i = next,
            }
        }
        let pattern_end = equals.unwrap_or(i);
        let names = self.pattern_bindings(keyword + 1, pattern_end);
        let last = match equals {
            Some(equals) => self.condition_value(equals - 1, end, &names, scope)?,
            None => pattern_end,
        };
        scope.locals.extend(names);
        Ok(last + 1)
    }

    /// Walk the `= value` after `last`, if any; returns the last index used.
    fn condition_value(
        &mut self,
        last: usize,
        end: usize,
        names: &[String],
        scope: &Scope<'a>,
    ) -> Result<usize, FormatError> {
        let Some(range) = self
            .nav
            .next_significant(last)
            .filter(|&e| e < end && self.token(e).is_operator("="))
            .and_then(|e| self.nav.next_significant(e))
            .and_then(|v| self.nav.parse_expression_range(v))
        else {
            return Ok(last);
        };
        let value_end = (*range.end()).min(end - 1);
        let mut value_scope = scope.clone();
        value_scope.blocked.extend(names.iter().cloned());
        self.walk(*range.start(), value_end + 1, &mut value_scope)?;
        Ok(value_end)
    }

    /// Names bound by every `let`/`var` in `start..end`.
    fn pattern_bindings(&self, start: usize, end: usize) -> Vec<String> {
        (start..end)
            .filter(|&i| self.token(i).is_keyword_named("let") || self.token(i).is_keyword_named("var"))
            .filter_map(|i| self.nav.binding_names(i))
            .flat_map(|pattern| pattern.names)
            .map(|binding| binding.name)
            .collect()
    }

    fn for_loop(&mut self, keyword: usize, scope: &Scope<'a>) -> Result<usize, FormatError> {
        let Some(body) = self.body_brace(keyword) else {
            return Ok(keyword + 1);
        };
        let close = self.close_of(body)?;
        let mut start = keyword;
        while let Some(next) = self.nav.next_significant(start).filter(|&n| n < body) {
            start = next;
            if !matches!(self.token(next), Token::Keyword(k) if matches!(k.as_str(), "case" | "try" | "await")) {
                break;
            }
        }
        let in_index = (start..body).find(|&i| self.token(i).is_keyword_named("in"));
        let mut inner = scope.clone();
        if let Some(pattern) = self.nav.binding_names(start) {
            inner.locals.extend(pattern.names.into_iter().map(|b| b.name));
        }
        inner
            .locals
            .extend(self.pattern_bindings(start, in_index.unwrap_or(body)));
        // The sequence and any `where` clause.
        if let Some(in_index) = in_index {
            self.walk(in_index + 1, body, &mut inner.clone())?;
        }
        self.walk_block(body, close, inner)?;
        Ok(close + 1)
    }

    fn catch_clause(&mut self, keyword: usize, scope: &Scope<'a>) -> Result<usize, FormatError> {
        let Some(body) = self.body_brace(keyword) else {
            return Ok(keyword + 1);
        };
        let close = self.close_of(body)?;
        let mut inner = scope.clone();
        if self.nav.next_significant(keyword) == Some(body) {
            inner.locals.insert("error".to_owned());
        } else {
            inner.locals.extend(self.pattern_bindings(keyword + 1, body));
            self.walk(keyword + 1, body, &mut inner.clone())?;
        }
        self.walk_block(body, close, inner)?;
        Ok(close + 1)
    }

    /// A `case`/`default` label and the statements up to the next label.
    fn case_body(&mut self, label: usize, scope: &Scope<'a>) -> Result<usize, FormatError> {
        let Some(colon) = self.nav.next_index(label, |t| t.is_start_of_scope_named(":")) else {
            return Ok(label + 1);
        };
        let end = self.close_of(colon)?;
        let mut inner = scope.clone();
        inner.locals.extend(self.pattern_bindings(label + 1, colon));
        self.walk(label + 1, colon, &mut inner.clone())?;
        self.walk_block(colon, end, inner)?;
        Ok(end)
    }

    // ─── Expressions ─────────────────────────────────────────────────

    fn brace(&mut self, open: usize, scope: &Scope<'a>) -> Result<usize, FormatError> {
        let close = self.close_of(open)?;
        if scope.type_level {
            return Ok(close + 1);
        }
        if !self.nav.is_start_of_closure(open) {
            self.walk_block(open, close, scope.clone())?;
            return Ok(close + 1);
        }
        let signature = self.nav.closure_signature(open).unwrap_or_default();
        let mut inner = scope.clone();
        inner.access = closure_access(&signature, scope);
        inner.locals.extend(signature.params.iter().map(|(name, _)| name.clone()));
        inner.locals.extend(
            signature
                .captures
                .iter()
                .filter(|c| c.name != "self")
                .map(|c| c.name.clone()),
        );
        self.walk_block(signature.in_index.unwrap_or(open), close, inner)?;
        Ok(close + 1)
    }

    fn identifier(&mut self, at: usize, name: &str, scope: &Scope<'a>) -> Result<usize, FormatError> {
        self.check_insertion(at, name, scope);
        if !self.options.self_required.iter().any(|required| required == name) {
            return Ok(at + 1);
        }
        let Some(open) = Some(at + 1).filter(|&o| self.nav.is(o, |t| t.is_start_of_scope_named("("))) else {
            return Ok(at + 1);
        };
        let close = self.close_of(open)?;
        let mut explicit = scope.clone();
        if explicit.access == SelfAccess::Implicit {
            explicit.access = SelfAccess::Explicit;
        }
        self.walk(open + 1, close, &mut explicit)?;
        Ok(close + 1)
    }

    fn skip_arguments(&self, keyword: usize) -> Result<usize, FormatError> {
        match Some(keyword + 1).filter(|&o| self.nav.is(o, |t| t.is_start_of_scope_named("("))) {
            Some(open) => Ok(self.close_of(open)? + 1),
            None => Ok(keyword + 1),
        }
    }

    fn check_insertion(&mut self, at: usize, name: &str, scope: &Scope<'a>) {
        let inserting = match self.options.self_mode {
            SelfMode::Insert => true,
            SelfMode::InitOnly => scope.in_init,
            SelfMode::Remove => false,
        };
        if !inserting || scope.type_level || scope.access == SelfAccess::WeakSelf {
            return;
        }
        let Some(members) = scope.members else {
            return;
        };
        let name = name.trim_matches('`');
        let visible = if scope.is_static {
            &members.statics
        } else {
            &members.instance
        };
        if scope.shadows(name) || !visible.contains(name) {
            return;
        }
        let qualified = self.nav.prev_significant(at).is_some_and(|p| match self.token(p) {
            Token::Operator(op, _) => op == "." || op == "\\",
            Token::Keyword(k) => is_declaration_keyword(k) || matches!(k.as_str(), "as" | "is"),
            _ => false,
        });
        // Argument labels and dictionary keys.
        let labelled = self
            .nav
            .next_significant(at)
            .is_some_and(|n| self.token(n).is_delimiter(":"));
        if !qualified && !labelled {
            self.edits.push(Edit::Insert(at));
        }
    }

    fn check_removal(&mut self, at: usize, scope: &Scope<'a>) {
        let removing = match self.options.self_mode {
            SelfMode::Remove => true,
            SelfMode::InitOnly => !scope.in_init,
            SelfMode::Insert => false,
        };
        if !removing || scope.type_level || scope.access != SelfAccess::Implicit || scope.members.is_none() {
            return;
        }
        let (Some(Token::Operator(dot, Fixity::Infix)), Some(Token::Identifier(name))) =
            (self.nav.token(at + 1), self.nav.token(at + 2))
        else {
            return;
        };
        if dot != "." {
            return;
        }
        let name = name.trim_matches('`');
        if scope.shadows(name) || KEYWORDS.contains(&name) || SELF_ONLY_NAMES.contains(&name) {
            return;
        }
        if self
            .nav
            .prev_significant(at)
            .is_some_and(|p| self.token(p).is_operator(".") || self.token(p).is_operator("\\"))
        {
            return;
        }
        self.edits.push(Edit::Remove(at));
    }
}

/// How a closure may refer to the members of its enclosing type.
fn closure_access(signature: &ClosureSignature, scope: &Scope<'_>) -> SelfAccess {
    let captured = signature.captures.iter().find(|c| c.name == "self").map(|c| c.kind);
    match captured {
        Some(CaptureKind::Weak) => SelfAccess::WeakSelf,
        Some(CaptureKind::Unowned) => SelfAccess::Explicit,
        Some(CaptureKind::Strong) => SelfAccess::Implicit,
        None if scope.access == SelfAccess::WeakSelf => SelfAccess::WeakSelf,
        None if scope.members.is_some_and(|m| m.value_type) => SelfAccess::Implicit,
        None => SelfAccess::Explicit,
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
