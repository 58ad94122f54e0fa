//! Member tables for the types declared in one file.
//!
//! A type's members are merged across its declaration and every extension
//! of it in the same file. Nested types are keyed by their dotted path,
//! which is also how extensions name them. A body written on one line is
//! parsed on demand, since the declaration tree keeps it as a single run.

use std::borrow::Cow;
use std::ops::Range;

use rustc_hash::{FxHashMap, FxHashSet};
use tidy_ir::token::is_type_keyword;
use tidy_ir::Token;
use tidy_parse::{parse_declarations, Declaration, Navigator, ParseError, TokenRun};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct TypeMembers {
    /// `struct` or `enum`: closures may always use implicit self.
    pub value_type: bool,
    pub instance: FxHashSet<String>,
    /// `static`/`class` members and enum cases.
    pub statics: FxHashSet<String>,
}

pub(crate) type TypeMap = FxHashMap<String, TypeMembers>;

pub(crate) fn collect_type_members(declarations: &[Declaration], nav: Navigator<'_>) -> Result<TypeMap, ParseError> {
    let mut types = TypeMap::default();
    collect_types(declarations, "", nav, &mut types)?;
    Ok(types)
}

/// Dotted path of a type declared as `name` inside `prefix`.
pub(crate) fn type_path(prefix: &str, keyword: &str, name: &str) -> String {
    if prefix.is_empty() || keyword == "extension" {
        name.to_owned()
    } else {
        format!("{prefix}.{name}")
    }
}

fn collect_types(
    declarations: &[Declaration],
    prefix: &str,
    nav: Navigator<'_>,
    types: &mut TypeMap,
) -> Result<(), ParseError> {
    for declaration in declarations {
        let keyword = declaration.keyword();
        let body = match declaration {
            Declaration::ConditionalCompilation { body, .. } => {
                collect_types(body, prefix, nav, types)?;
                continue;
            }
            Declaration::TypeBody { body, .. } => Cow::Borrowed(body.as_slice()),
            Declaration::Simple { run, .. } if is_type_keyword(keyword) => match inline_body(run, keyword, nav) {
                Some(range) => Cow::Owned(parse_declarations(nav.buffer(), range)?),
                None => Cow::Borrowed(&[][..]),
            },
            Declaration::Simple { .. } => continue,
        };
        let Some(name) = declaration.name() else {
            continue;
        };
        let path = type_path(prefix, keyword, &name);
        let entry = types.entry(path.clone()).or_default();
        entry.value_type |= matches!(keyword, "struct" | "enum");
        collect_members(&body, nav, entry);
        collect_types(&body, &path, nav, types)?;
    }
    Ok(())
}

/// Inside of the `{ ... }` body of a type declared on a single run.
fn inline_body(run: &TokenRun, keyword: &str, nav: Navigator<'_>) -> Option<Range<usize>> {
    let offset = run.tokens.iter().position(|t| t.is_keyword_named(keyword))?;
    let mut i = run.range.start + offset;
    while let Some(next) = nav.next_significant(i).filter(|&n| n < run.range.end) {
        match &nav.buffer()[next] {
            Token::StartOfScope(open) if open == "{" => {
                let close = nav.end_of_scope(next)?;
                return Some(next + 1..close);
            }
            Token::StartOfScope(_) => i = nav.end_of_scope(next)?,
            Token::Delimiter(d) if d == ";" => return None,
            _ => i = next,
        }
    }
    None
}

fn collect_members(body: &[Declaration], nav: Navigator<'_>, entry: &mut TypeMembers) {
    for member in body {
        if let Declaration::ConditionalCompilation { body, .. } = member {
            collect_members(body, nav, entry);
            continue;
        }
        let Declaration::Simple { keyword, run } = member else {
            continue;
        };
        let target = if member.is_static() {
            &mut entry.statics
        } else {
            &mut entry.instance
        };
        match keyword.as_str() {
            "let" | "var" => {
                let Some(offset) = run.tokens.iter().position(|t| t.is_keyword_named(keyword)) else {
                    continue;
                };
                let names = nav
                    .next_significant(run.range.start + offset)
                    .and_then(|first| nav.binding_names(first))
                    .map(|pattern| pattern.names)
                    .unwrap_or_default();
                target.extend(names.into_iter().map(|binding| binding.name));
            }
            "func" => {
                if let Some(name) = member.name() {
                    target.insert(name);
                }
            }
            "case" => entry.statics.extend(case_names(&run.tokens)),
            _ => {}
        }
    }
}

/// Names declared by `case a, b(Int), c = 1`.
fn case_names(tokens: &[Token]) -> Vec<String> {
    let mut names = Vec::new();
    let mut depth = 0usize;
    let mut expect_name = false;
    for token in tokens.iter().filter(|t| !t.is_space_or_comment_or_linebreak()) {
        match token {
            Token::Keyword(k) if k == "case" && depth == 0 => expect_name = true,
            Token::Identifier(name) if expect_name && depth == 0 => {
                names.push(name.trim_matches('`').to_owned());
                expect_name = false;
            }
            Token::Delimiter(d) if d == "," && depth == 0 => expect_name = true,
            Token::StartOfScope(_) => depth += 1,
            Token::EndOfScope(_) => depth = depth.saturating_sub(1),
            _ => expect_name = false,
        }
    }
    names
}
