//! Declaration ordering inside type bodies.
//!
//! Members of the types named by `organize_types` are stably sorted into
//! fixed categories. A member moves together with the comment and
//! attribute lines attached to it and the blank lines that follow it.
//!
//! A body is left alone when it holds `#if` blocks or loose statements,
//! when its first or last member shares a line with a brace, or when any
//! of it is disabled for this rule.

use tidy_ir::{Token, TokenBuffer};
use tidy_parse::{parse_declarations, Declaration, Navigator};
use tracing::debug;

use crate::{FormatError, Formatter};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Category {
    Case,
    NestedType,
    StaticProperty,
    StoredProperty,
    ComputedProperty,
    Initializer,
    StaticMethod,
    InstanceMethod,
}

pub(crate) fn organize_declarations(f: &mut Formatter<'_>) -> Result<(), FormatError> {
    let declarations = parse_declarations(f.buffer(), 0..f.len())?;
    let organizer = Organizer {
        nav: f.navigator(),
        formatter: f,
    };
    let mut edits = Vec::new();
    for declaration in &declarations {
        organizer.collect_edits(declaration, &mut edits);
    }
    for (range, tokens) in edits.into_iter().rev() {
        debug!(?range, "reorder type body");
        f.replace_range(range, tokens);
    }
    Ok(())
}

struct Organizer<'a, 'o> {
    nav: Navigator<'a>,
    formatter: &'a Formatter<'o>,
}

impl Organizer<'_, '_> {
    fn buffer(&self) -> &TokenBuffer {
        self.nav.buffer()
    }

    /// Queue a replacement for the outermost bodies whose organized tokens
    /// differ from the source. Nested bodies ride along inside them.
    fn collect_edits(&self, declaration: &Declaration, edits: &mut Vec<(std::ops::Range<usize>, Vec<Token>)>) {
        let (Declaration::TypeBody { open, close, .. } | Declaration::ConditionalCompilation { open, close, .. }) =
            declaration
        else {
            return;
        };
        let range = open.range.end..close.range.start;
        let organized = self.organized_body(declaration);
        if organized.as_slice() != self.buffer().slice(range.clone()) {
            edits.push((range, organized));
        }
    }

    fn organized_tokens(&self, declaration: &Declaration) -> Vec<Token> {
        match declaration {
            Declaration::Simple { run, .. } => run.tokens.clone(),
            Declaration::TypeBody { open, close, .. } | Declaration::ConditionalCompilation { open, close, .. } => {
                let mut tokens = open.tokens.clone();
                tokens.extend(self.organized_body(declaration));
                tokens.extend_from_slice(&close.tokens);
                tokens
            }
        }
    }

    fn organized_body(&self, declaration: &Declaration) -> Vec<Token> {
        let body = declaration.body().unwrap_or_default();
        let mut members: Vec<(Option<Category>, Vec<Token>)> = body
            .iter()
            .map(|member| (self.category(member), self.organized_tokens(member)))
            .collect();
        if self.is_sortable(declaration) {
            members.sort_by_key(|(category, _)| *category);
        }
        members.into_iter().flat_map(|(_, tokens)| tokens).collect()
    }

    fn is_sortable(&self, declaration: &Declaration) -> bool {
        let Declaration::TypeBody { keyword, open, body, .. } = declaration else {
            return false;
        };
        let options = self.formatter.options();
        if !options.organize_types.iter().any(|t| t == keyword) || body.len() < 2 {
            return false;
        }
        if !open.tokens.last().is_some_and(Token::is_linebreak) {
            return false;
        }
        let members_ok = body.iter().all(|member| {
            self.category(member).is_some() && member.tokens().last().is_some_and(Token::is_linebreak)
        });
        members_ok && declaration.range().all(|i| self.formatter.is_enabled(i))
    }

    /// Sort key of a member; `None` for members that pin the body's order.
    fn category(&self, member: &Declaration) -> Option<Category> {
        let category = match member.keyword() {
            "case" | "typealias" | "associatedtype" => Category::Case,
            "class" | "struct" | "enum" | "actor" | "protocol" => Category::NestedType,
            "init" | "deinit" => Category::Initializer,
            "let" | "var" if member.is_static() => Category::StaticProperty,
            "let" | "var" if self.is_computed(member) => Category::ComputedProperty,
            "let" | "var" => Category::StoredProperty,
            "func" | "subscript" if member.is_static() => Category::StaticMethod,
            "func" | "subscript" => Category::InstanceMethod,
            _ => return None,
        };
        Some(category)
    }

    /// A property with a getter body. Observed properties are stored.
    fn is_computed(&self, member: &Declaration) -> bool {
        let Declaration::Simple { keyword, run } = member else {
            return false;
        };
        let Some(offset) = run.tokens.iter().position(|t| t.is_keyword_named(keyword)) else {
            return false;
        };
        let Some(property) = self.nav.parse_property(run.range.start + offset) else {
            return false;
        };
        let Some(body) = property.body_range else {
            return false;
        };
        !self
            .nav
            .next_significant(*body.start())
            .is_some_and(|first| {
                matches!(&self.buffer()[first], Token::Identifier(name) if name == "willSet" || name == "didSet")
            })
    }
}
