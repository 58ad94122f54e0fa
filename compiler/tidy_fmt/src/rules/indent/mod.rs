//! Indentation engine.
//!
//! One forward pass over the buffer. A stack mirrors the open scopes; each
//! entry records the indent for lines inside the scope, the indent for the
//! line that closes it, and whether the statement currently running in it
//! has wrapped onto a continuation line.
//!
//! At the start of every line the engine picks that line's indent from the
//! stack top (or, for a line that begins with a closer, from the scope being
//! closed) and rewrites the leading whitespace. Inner indents are derived
//! from the opener line's indent *after* it was rewritten, so nesting is
//! always relative to the corrected layout.
//!
//! Lines are left untouched when the engine cannot know better: inside
//! string literals, non-`*` lines of block comments, lines holding error
//! tokens, and closers without a matching opener on the stack.

use smallvec::{smallvec, SmallVec};
use tidy_ir::{closes, Token};
use tidy_parse::text_width;
use tracing::trace;

use crate::options::IfdefIndent;
use crate::{FormatError, Formatter};

/// Keywords a `switch` subject may contain before its `{`.
const SWITCH_SUBJECT_KEYWORDS: &[&str] = &[
    "self", "Self", "super", "true", "false", "nil", "try", "await", "as", "is",
];

#[derive(Clone, Debug)]
struct Scope {
    /// Opener text; empty for the file itself.
    open: String,
    /// Indent of lines inside the scope.
    inner: String,
    /// Indent of a line starting with the scope's closer.
    closing: String,
    linewrap: bool,
    /// Block comment whose `*` lines align one space inside the opener.
    align_comment: bool,
}

impl Scope {
    fn new(open: &str, inner: String, closing: String) -> Self {
        Scope {
            open: open.to_owned(),
            inner,
            closing,
            linewrap: false,
            align_comment: false,
        }
    }

    /// Scopes holding statements, as opposed to comma-separated lists.
    fn holds_statements(&self) -> bool {
        matches!(self.open.as_str(), "" | "{" | ":" | "#if")
    }

    fn is_opaque(&self) -> bool {
        matches!(self.open.as_str(), "\"" | "\"\"\"" | "/*")
    }
}

enum Step {
    Open(String),
    Close(String),
    Linebreak,
    Other,
}

/// Rewrite the leading whitespace of every line.
pub(crate) fn indent(f: &mut Formatter<'_>) -> Result<(), FormatError> {
    let base = if f.options().fragment {
        fragment_indent(f)
    } else {
        String::new()
    };
    let unit = f.options().indent.clone();
    let mut pass = IndentPass {
        f,
        unit,
        stack: smallvec![Scope::new("", base.clone(), base)],
    };
    pass.run();
    Ok(())
}

/// A fragment keeps the indent of its first non-blank line as its base.
fn fragment_indent(f: &Formatter<'_>) -> String {
    f.iter()
        .position(|t| !t.is_space_or_linebreak())
        .map(|first| f.navigator().line_indent(first).to_owned())
        .unwrap_or_default()
}

struct IndentPass<'f, 'o> {
    f: &'f mut Formatter<'o>,
    unit: String,
    /// Never empty: the file scope sits at the bottom.
    stack: SmallVec<[Scope; 16]>,
}

impl IndentPass<'_, '_> {
    fn run(&mut self) {
        let mut i = self.indent_line(0);
        while i < self.f.len() {
            let step = match &self.f[i] {
                Token::StartOfScope(open) => Step::Open(open.clone()),
                Token::EndOfScope(close) => Step::Close(close.clone()),
                Token::Linebreak(_) => Step::Linebreak,
                _ => Step::Other,
            };
            match step {
                Step::Open(open) => self.push_scope(i, &open),
                Step::Close(close) => self.pop_scope(&close),
                Step::Linebreak => {
                    self.end_line(i);
                    i = self.indent_line(i + 1);
                    continue;
                }
                Step::Other => {}
            }
            i += 1;
        }
    }

    fn top(&self) -> &Scope {
        &self.stack[self.stack.len() - 1]
    }

    fn top_mut(&mut self) -> &mut Scope {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn pop(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    /// Indent for an ordinary line in the current scope.
    fn current_indent(&self) -> String {
        let top = self.top();
        if top.linewrap {
            format!("{}{}", top.inner, self.unit)
        } else {
            top.inner.clone()
        }
    }

    // ─── Lines ───────────────────────────────────────────────────────

    /// Indent the line starting at `start`; returns the index of its first
    /// non-space token.
    fn indent_line(&mut self, start: usize) -> usize {
        let first = if self.f.token(start).is_some_and(Token::is_space) {
            start + 1
        } else {
            start
        };
        let Some(indent) = self.indent_for_line(first) else {
            return first;
        };
        let delta = self.f.set_line_indent(start, &indent);
        trace!(line_start = start, indent = indent.len(), "indent line");
        first.saturating_add_signed(delta)
    }

    /// The indent the line whose first non-space token is at `first`
    /// should have, or `None` to leave it as is.
    fn indent_for_line(&self, first: usize) -> Option<String> {
        let top = self.top();
        match top.open.as_str() {
            "\"" | "\"\"\"" => return None,
            "/*" => {
                let star_line = match self.f.token(first) {
                    Some(Token::CommentBody(body)) => body.starts_with('*'),
                    Some(Token::EndOfScope(close)) => close == "*/",
                    _ => false,
                };
                return (top.align_comment && star_line).then(|| top.inner.clone());
            }
            _ => {}
        }

        let Some(token) = self.f.token(first).filter(|t| !t.is_linebreak()) else {
            return Some(if self.f.options().truncate_blank_lines {
                String::new()
            } else {
                self.current_indent()
            });
        };
        let end = self.f.navigator().end_of_line(first);
        if self.f.slice(first..end).iter().any(Token::is_error) {
            return None;
        }
        match token {
            Token::EndOfScope(label) if label == "case" || label == "default" => {
                Some(self.case_scope().inner.clone())
            }
            Token::EndOfScope(close) => self.closed_scope(close).map(|scope| scope.closing.clone()),
            Token::Keyword(k) if k == "#else" || k == "#elseif" => {
                self.closed_scope("#endif").map(|scope| scope.closing.clone())
            }
            Token::StartOfScope(open) if open == "#if" && self.f.options().ifdef_indent == IfdefIndent::Outdent => {
                Some(String::new())
            }
            _ => Some(self.current_indent()),
        }
    }

    /// The scope whose body holds `case` labels.
    fn case_scope(&self) -> &Scope {
        let n = self.stack.len();
        if self.top().open == ":" && n >= 2 {
            &self.stack[n - 2]
        } else {
            self.top()
        }
    }

    /// The scope `close` would close, if it is on the stack top. A case body
    /// is closed implicitly by `}` and `#endif`.
    fn closed_scope(&self, close: &str) -> Option<&Scope> {
        let mut index = self.stack.len() - 1;
        if self.stack[index].open == ":" && matches!(close, "}" | "#endif") && index > 1 {
            index -= 1;
        }
        (index > 0 && closes(&self.stack[index].open, close)).then(|| &self.stack[index])
    }

    /// Record whether the line after the linebreak at `at` continues the
    /// current statement.
    fn end_line(&mut self, at: usize) {
        if self.top().open == "\"" {
            // Unterminated single-line string.
            self.pop();
        }
        if self.top().is_opaque() {
            return;
        }
        let wrapped = self.is_linewrap(at);
        self.top_mut().linewrap = wrapped;
    }

    fn is_linewrap(&self, at: usize) -> bool {
        let nav = self.f.navigator();
        let Some(prev) = nav.prev_significant(at) else {
            return false;
        };
        if self.f[prev].is_start_of_scope() {
            return false;
        }
        if self.top().holds_statements() {
            return !nav.is_statement_boundary(at);
        }
        let Some(next) = nav.next_significant(at) else {
            return false;
        };
        !(self.f[prev].is_delimiter(",") || self.f[next].is_end_of_scope())
    }

    // ─── Scopes ──────────────────────────────────────────────────────

    fn push_scope(&mut self, at: usize, open: &str) {
        let nav = self.f.navigator();
        let line_indent = nav.line_indent(at).to_owned();
        let indented = format!("{line_indent}{}", self.unit);
        let scope = match open {
            "//" => return,
            "\"" | "\"\"\"" => Scope::new(open, line_indent.clone(), line_indent),
            "/*" => Scope {
                align_comment: nav.is_first_on_line(at),
                ..Scope::new(open, format!("{line_indent} "), line_indent)
            },
            "(" | "[" | "<" => {
                let inner = match nav.next_non_space_or_comment(at) {
                    Some(next) if !self.f[next].is_linebreak() => {
                        let tab_width = self.f.options().tab_width;
                        let width = text_width(line_indent.chars(), tab_width);
                        let column = nav.column(next, tab_width);
                        format!("{line_indent}{}", " ".repeat(column.saturating_sub(width)))
                    }
                    _ => indented,
                };
                Scope::new(open, inner, line_indent)
            }
            "{" => {
                // A body brace ending a wrapped condition or signature closes
                // at the statement's indent, not the continuation's.
                let base = if self.top().linewrap && !nav.is_start_of_closure(at) {
                    self.top().inner.clone()
                } else {
                    line_indent
                };
                if self.is_switch(at) && !self.f.options().indent_case {
                    Scope::new(open, base.clone(), base)
                } else {
                    Scope::new(open, format!("{base}{}", self.unit), base)
                }
            }
            "#if" => {
                let base = self.top().inner.clone();
                let inner = match self.f.options().ifdef_indent {
                    IfdefIndent::Indent => format!("{base}{}", self.unit),
                    IfdefIndent::NoIndent | IfdefIndent::Outdent => base,
                };
                Scope::new(open, inner, line_indent)
            }
            _ => Scope::new(open, indented, line_indent),
        };
        trace!(open, inner = scope.inner.len(), "push scope");
        self.stack.push(scope);
    }

    fn pop_scope(&mut self, close: &str) {
        match close {
            "case" | "default" => {
                if self.top().open == ":" {
                    self.pop();
                }
            }
            _ => {
                if matches!(close, "}" | "#endif") && self.top().open == ":" && self.stack.len() > 2 {
                    self.pop();
                }
                if closes(&self.top().open, close) {
                    self.pop();
                }
            }
        }
    }

    /// Whether the `{` at `open` is a `switch` body.
    fn is_switch(&self, open: usize) -> bool {
        let nav = self.f.navigator();
        nav.next_significant(open)
            .is_some_and(|n| self.f[n].is_end_of_scope_named("case") || self.f[n].is_end_of_scope_named("default"))
            || nav
                .last_significant_keyword(open, SWITCH_SUBJECT_KEYWORDS)
                .is_some_and(|k| self.f[k].is_keyword_named("switch"))
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
