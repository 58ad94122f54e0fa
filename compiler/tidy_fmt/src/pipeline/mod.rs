//! Rule Pipeline
//!
//! Applies a rule selection to a buffer, in registry order, until the
//! tokens stop changing. Rules are independent; a later rule may undo or
//! extend an earlier one's work, and the next pass settles it.
//!
//! Outside fragment mode the buffer must be balanced before any rule
//! runs: a stray closer or a scope left open aborts the file with a
//! [`ParseError`].

use std::ops::Range;

use rayon::prelude::*;
use tidy_ir::{closes, Token, TokenBuffer};
use tidy_lexer::lex;
use tidy_parse::ParseError;
use tracing::{debug, warn};

use crate::rules::Rule;
use crate::{FormatError, FormatOptions, Formatter};

/// Upper bound on passes over the rule sequence.
pub const MAX_PASSES: usize = 10;

/// One rule's rewrite of a buffer, as reported by [`diagnose`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Change {
    pub rule: &'static str,
    /// Changed tokens, in the coordinates of the buffer after the rule ran.
    pub range: Range<usize>,
}

/// Apply `rules` to `buffer` until it reaches a fixed point.
#[tracing::instrument(level = "debug", skip_all, fields(rules = rules.len(), tokens = buffer.len()))]
pub fn apply_rules(
    buffer: TokenBuffer,
    rules: &[&'static Rule],
    options: &FormatOptions,
) -> Result<TokenBuffer, FormatError> {
    check_structure(&buffer, options)?;
    let rules = ordered(rules);
    let mut formatter = Formatter::new(buffer, options);
    for pass in 1..=MAX_PASSES {
        let before = formatter.tokens().to_vec();
        for rule in &rules {
            formatter.begin_rule(rule.name);
            (rule.apply)(&mut formatter)?;
        }
        if formatter.tokens() == before.as_slice() {
            debug!(pass, "converged");
            return Ok(formatter.into_buffer());
        }
    }
    warn!(passes = MAX_PASSES, "rules did not converge");
    Ok(formatter.into_buffer())
}

/// Lex, format and re-render `source`.
pub fn format(source: &str, rules: &[&'static Rule], options: &FormatOptions) -> Result<String, FormatError> {
    apply_rules(lex(source), rules, options).map(|buffer| buffer.source())
}

/// Format `buffer` while recording which rule changed what.
///
/// Each rule runs against a snapshot of the buffer as the previous rule
/// left it, so every reported range belongs to exactly one rule.
pub fn diagnose(
    buffer: TokenBuffer,
    rules: &[&'static Rule],
    options: &FormatOptions,
) -> Result<(TokenBuffer, Vec<Change>), FormatError> {
    check_structure(&buffer, options)?;
    let rules = ordered(rules);
    let mut formatter = Formatter::new(buffer, options);
    let mut changes = Vec::new();
    for _ in 0..MAX_PASSES {
        let before_pass = formatter.tokens().to_vec();
        for rule in &rules {
            let snapshot = formatter.tokens().to_vec();
            formatter.begin_rule(rule.name);
            (rule.apply)(&mut formatter)?;
            if let Some(range) = changed_range(&snapshot, formatter.tokens()) {
                debug!(rule = rule.name, ?range, "rule changed buffer");
                changes.push(Change { rule: rule.name, range });
            }
        }
        if formatter.tokens() == before_pass.as_slice() {
            break;
        }
    }
    Ok((formatter.into_buffer(), changes))
}

/// Format independent sources in parallel, one result per source.
pub fn format_batch<S>(sources: &[S], rules: &[&'static Rule], options: &FormatOptions) -> Vec<Result<String, FormatError>>
where
    S: AsRef<str> + Sync,
{
    sources
        .par_iter()
        .map(|source| format(source.as_ref(), rules, options))
        .collect()
}

/// Registry order, each rule once.
fn ordered(rules: &[&'static Rule]) -> Vec<&'static Rule> {
    let mut ordered = rules.to_vec();
    ordered.sort_by_key(|rule| rule.name);
    ordered.dedup_by_key(|rule| rule.name);
    ordered
}

fn check_structure(buffer: &TokenBuffer, options: &FormatOptions) -> Result<(), ParseError> {
    if options.fragment {
        return Ok(());
    }
    match unbalanced(buffer) {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

/// The first stray closer or unclosed opener.
fn unbalanced(buffer: &TokenBuffer) -> Option<ParseError> {
    let mut stack: Vec<(usize, &str)> = Vec::new();
    for (i, token) in buffer.iter().enumerate() {
        match token {
            Token::Error(text) => {
                return Some(ParseError::expected(i, format!("an opener for `{text}`")));
            }
            // Line comments end at the linebreak; an unterminated
            // single-line string is dropped there by the lexer.
            Token::Linebreak(_) => {
                if matches!(stack.last(), Some((_, "//" | "\""))) {
                    stack.pop();
                }
            }
            Token::StartOfScope(open) => stack.push((i, open.as_str())),
            Token::EndOfScope(close) => {
                let is_label = close == "case" || close == "default";
                if matches!(stack.last(), Some((_, ":"))) {
                    stack.pop();
                }
                // A label directly inside a switch brace closes nothing.
                if is_label {
                    continue;
                }
                match stack.pop() {
                    Some((_, open)) if closes(open, close) => {}
                    Some((_, open)) => {
                        return Some(ParseError::expected(i, format!("a closer for `{open}`")));
                    }
                    None => return Some(ParseError::expected(i, format!("an opener for `{close}`"))),
                }
            }
            _ => {}
        }
    }
    stack
        .into_iter()
        .find(|&(_, open)| open != "//")
        .map(|(at, open)| ParseError::expected(at, format!("a closer for `{open}`")))
}

/// The span where `after` differs from `before`, in `after`'s indices.
fn changed_range(before: &[Token], after: &[Token]) -> Option<Range<usize>> {
    if before == after {
        return None;
    }
    let prefix = before.iter().zip(after).take_while(|(a, b)| a == b).count();
    let limit = before.len().min(after.len()) - prefix;
    let suffix = before
        .iter()
        .rev()
        .zip(after.iter().rev())
        .take(limit)
        .take_while(|(a, b)| a == b)
        .count();
    Some(prefix..after.len() - suffix)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
