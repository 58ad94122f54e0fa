//! Whitespace and blank-line rules.
//!
//! Each rule walks the buffer backward so that removals never disturb the
//! positions still to be visited.

use std::ops::Range;

use tidy_ir::Token;

use crate::{FormatError, Formatter};

/// Openers whose leading and trailing blank lines are removed.
const TRIMMED_SCOPES: &[&str] = &["{", "(", "["];

/// Remove whitespace at the end of lines.
pub(crate) fn trailing_space(f: &mut Formatter<'_>) -> Result<(), FormatError> {
    let keep_blank = !f.options().truncate_blank_lines;
    for i in (0..f.len()).rev() {
        if !f[i].is_space() || !f.token(i + 1).map_or(true, Token::is_linebreak) {
            continue;
        }
        let blank_line = i == 0 || f[i - 1].is_linebreak();
        if blank_line && keep_blank {
            continue;
        }
        f.remove(i);
    }
    Ok(())
}

/// Collapse runs of spaces inside a line to a single space.
///
/// Indentation, trailing whitespace and the padding around comments are
/// left alone.
pub(crate) fn consecutive_spaces(f: &mut Formatter<'_>) -> Result<(), FormatError> {
    for i in (1..f.len()).rev() {
        let Token::Space(space) = &f[i] else {
            continue;
        };
        if space == " " || f[i - 1].is_linebreak() {
            continue;
        }
        let Some(next) = f.token(i + 1) else {
            continue;
        };
        if next.is_linebreak() || next.is_comment() || f[i - 1].is_comment() {
            continue;
        }
        f.replace(i, Token::space(" "));
    }
    Ok(())
}

/// Remove blank lines directly after `{`, `(` and `[`.
pub(crate) fn blank_lines_at_start_of_scope(f: &mut Formatter<'_>) -> Result<(), FormatError> {
    for i in (0..f.len()).rev() {
        if !TRIMMED_SCOPES.iter().any(|s| f[i].is_start_of_scope_named(s)) {
            continue;
        }
        let nav = f.navigator();
        let Some(first_break) = nav.next_non_space(i).filter(|&b| f[b].is_linebreak()) else {
            continue;
        };
        let mut last_blank = None;
        let mut line_end = first_break;
        while let Some(next) = nav.next_non_space(line_end).filter(|&b| f[b].is_linebreak()) {
            last_blank = Some(next);
            line_end = next;
        }
        if let Some(last) = last_blank {
            f.remove_range(first_break + 1..last + 1);
        }
    }
    Ok(())
}

/// Remove blank lines directly before `}`, `)` and `]`.
pub(crate) fn blank_lines_at_end_of_scope(f: &mut Formatter<'_>) -> Result<(), FormatError> {
    for i in (0..f.len()).rev() {
        let Token::EndOfScope(close) = &f[i] else {
            continue;
        };
        if !matches!(close.as_str(), "}" | ")" | "]") {
            continue;
        }
        let nav = f.navigator();
        if !nav.is_first_on_line(i) {
            continue;
        }
        let line_start = nav.start_of_line(i);
        let Some(content) = nav.prev_index(line_start, |t| !t.is_space_or_linebreak()) else {
            continue;
        };
        let Some(kept_break) = nav.next_index(content, Token::is_linebreak) else {
            continue;
        };
        if kept_break + 1 < line_start {
            f.remove_range(kept_break + 1..line_start);
        }
    }
    Ok(())
}

/// Collapse runs of blank lines to a single blank line.
///
/// Blank lines inside multi-line strings and block comments are content.
pub(crate) fn consecutive_blank_lines(f: &mut Formatter<'_>) -> Result<(), FormatError> {
    let mut removals: Vec<Range<usize>> = Vec::new();
    let mut opaque_depth = 0usize;
    let mut line_start = 0;
    let mut blank_run = 0usize;
    for (i, token) in f.iter().enumerate() {
        match token {
            Token::StartOfScope(s) if s == "\"\"\"" || s == "/*" => opaque_depth += 1,
            Token::EndOfScope(s) if s == "\"\"\"" || s == "*/" => opaque_depth = opaque_depth.saturating_sub(1),
            Token::Linebreak(_) => {
                let blank = f.slice(line_start..i).iter().all(Token::is_space);
                if blank && opaque_depth == 0 {
                    blank_run += 1;
                    if blank_run > 1 {
                        removals.push(line_start..i + 1);
                    }
                } else {
                    blank_run = 0;
                }
                line_start = i + 1;
            }
            _ => {}
        }
    }
    for range in removals.into_iter().rev() {
        f.remove_range(range);
    }
    Ok(())
}

/// End the file with exactly one linebreak.
pub(crate) fn linebreak_at_end_of_file(f: &mut Formatter<'_>) -> Result<(), FormatError> {
    if f.options().fragment {
        return Ok(());
    }
    let nav = f.navigator();
    let Some(last) = nav.prev_index(f.len(), |t| !t.is_space_or_linebreak()) else {
        return Ok(());
    };
    // Trailing whitespace inside an unterminated block comment or string
    // is content.
    if nav.is_in_scope(last, "/*") || nav.is_in_scope(last, "\"\"\"") {
        return Ok(());
    }
    let tail = f.slice(last + 1..f.len());
    if tail.len() == 1 && tail[0].is_linebreak() {
        return Ok(());
    }
    let linebreak = Token::linebreak(f.options().linebreak.as_str());
    let end = f.len();
    f.replace_range(last + 1..end, [linebreak]);
    Ok(())
}
