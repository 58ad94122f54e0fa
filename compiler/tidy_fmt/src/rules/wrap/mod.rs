//! Argument wrapping.
//!
//! A call or parameter list written on one line is split when its line is
//! wider than `max_width`. The leftmost list on an over-long line wraps
//! first; lists nested inside it are revisited on their new, shorter lines.

use tidy_ir::{Fixity, Token};
use tidy_parse::text_width;
use tracing::debug;

use crate::options::WrapMode;
use crate::{FormatError, Formatter};

pub(crate) fn wrap_arguments(f: &mut Formatter<'_>) -> Result<(), FormatError> {
    let mode = f.options().wrap_arguments;
    if f.options().max_width == 0 || mode == WrapMode::Preserve {
        return Ok(());
    }
    let mut i = 0;
    while i < f.len() {
        if f[i].is_start_of_scope_named("(") && is_argument_list(f, i) && needs_wrap(f, i) {
            wrap_list(f, i, mode);
        }
        i += 1;
    }
    Ok(())
}

/// A `(` directly after a callee name: a call, or a declaration's
/// parameter list.
fn is_argument_list(f: &Formatter<'_>, open: usize) -> bool {
    let Some(prev) = open.checked_sub(1).map(|p| &f[p]) else {
        return false;
    };
    match prev {
        Token::Identifier(_) => true,
        Token::Keyword(_) => prev.is_value_keyword(),
        Token::EndOfScope(close) => matches!(close.as_str(), ")" | "]" | ">"),
        Token::Operator(_, Fixity::Postfix) => true,
        _ => false,
    }
}

fn needs_wrap(f: &Formatter<'_>, open: usize) -> bool {
    let nav = f.navigator();
    let Some(close) = nav.end_of_scope(open) else {
        return false;
    };
    if nav.has_linebreak_between(open, close) || nav.next_significant(open) == Some(close) {
        return false;
    }
    f.is_enabled(open) && nav.line_width(open, f.options().tab_width) > f.options().max_width
}

fn wrap_list(f: &mut Formatter<'_>, open: usize, mode: WrapMode) {
    let nav = f.navigator();
    let Some(close) = nav.end_of_scope(open) else {
        return;
    };
    let Some(arguments) = nav.parse_call_arguments(open) else {
        return;
    };
    let Some(first) = arguments.first().map(|a| *a.range.start()) else {
        return;
    };
    let indent = nav.line_indent(open).to_owned();
    let tab_width = f.options().tab_width;
    let padding = nav
        .column(first, tab_width)
        .saturating_sub(text_width(indent.chars(), tab_width));
    let starts: Vec<usize> = arguments.iter().map(|a| *a.range.start()).collect();
    debug!(open, arguments = starts.len(), ?mode, "wrap arguments");

    match mode {
        WrapMode::BeforeFirst => {
            let inner = format!("{indent}{}", f.options().indent);
            f.insert_linebreak(close, &indent);
            for &start in starts.iter().rev() {
                f.insert_linebreak(start, &inner);
            }
        }
        WrapMode::AfterFirst => {
            let aligned = format!("{indent}{}", " ".repeat(padding));
            for &start in starts.iter().skip(1).rev() {
                f.insert_linebreak(start, &aligned);
            }
        }
        WrapMode::Preserve => {}
    }
}
