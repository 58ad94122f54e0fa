//! Rule Registry
//!
//! Every rule is a plain function over a [`Formatter`]. The registry lists
//! them sorted by name, and that order is the order the pipeline applies
//! them in, whatever order a caller selects them in.
//!
//! # Rules
//!
//! - Whitespace: `trailingSpace`, `consecutiveSpaces`,
//!   `blankLinesAtStartOfScope`, `blankLinesAtEndOfScope`,
//!   `consecutiveBlankLines`, `linebreakAtEndOfFile`
//! - `indent`: the indentation engine
//! - `wrapArguments`: splits over-long argument lists
//! - `organizeDeclarations`: sorts type members (off by default)
//! - `redundantSelf`: explicit `self` policy

mod indent;
mod organize;
mod redundant_self;
mod whitespace;
mod wrap;

use std::fmt;

use crate::{FormatError, Formatter};

/// Signature shared by every rule.
pub type ApplyFn = fn(&mut Formatter<'_>) -> Result<(), FormatError>;

/// A named rewrite rule.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub help: &'static str,
    /// Part of [`default_rules`].
    pub default_enabled: bool,
    pub apply: ApplyFn,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("default_enabled", &self.default_enabled)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Rule {}

const fn rule(name: &'static str, help: &'static str, apply: ApplyFn) -> Rule {
    Rule {
        name,
        help,
        default_enabled: true,
        apply,
    }
}

/// All rules, sorted by name.
static RULES: &[Rule] = &[
    rule(
        "blankLinesAtEndOfScope",
        "Remove blank lines before a closing brace, bracket or parenthesis.",
        whitespace::blank_lines_at_end_of_scope,
    ),
    rule(
        "blankLinesAtStartOfScope",
        "Remove blank lines after an opening brace, bracket or parenthesis.",
        whitespace::blank_lines_at_start_of_scope,
    ),
    rule(
        "consecutiveBlankLines",
        "Collapse runs of blank lines into a single blank line.",
        whitespace::consecutive_blank_lines,
    ),
    rule(
        "consecutiveSpaces",
        "Collapse runs of spaces inside a line into a single space.",
        whitespace::consecutive_spaces,
    ),
    rule(
        "indent",
        "Indent code according to scope depth.",
        indent::indent,
    ),
    rule(
        "linebreakAtEndOfFile",
        "End the file with exactly one linebreak.",
        whitespace::linebreak_at_end_of_file,
    ),
    Rule {
        default_enabled: false,
        ..rule(
            "organizeDeclarations",
            "Sort the members of type bodies into categories.",
            organize::organize_declarations,
        )
    },
    rule(
        "redundantSelf",
        "Insert or remove explicit `self` before member references.",
        redundant_self::redundant_self,
    ),
    rule(
        "trailingSpace",
        "Remove whitespace at the end of lines.",
        whitespace::trailing_space,
    ),
    rule(
        "wrapArguments",
        "Wrap argument and parameter lists wider than the maximum width.",
        wrap::wrap_arguments,
    ),
];

/// Every registered rule, sorted by name.
pub fn rules() -> &'static [Rule] {
    RULES
}

/// Look up a rule by name.
pub fn rule_named(name: &str) -> Option<&'static Rule> {
    RULES
        .binary_search_by(|rule| rule.name.cmp(name))
        .ok()
        .map(|index| &RULES[index])
}

/// The rules enabled when the caller selects none explicitly.
pub fn default_rules() -> Vec<&'static Rule> {
    RULES.iter().filter(|rule| rule.default_enabled).collect()
}

/// Resolve rule names, failing on the first unknown one.
pub fn rules_named<S: AsRef<str>>(names: &[S]) -> Result<Vec<&'static Rule>, FormatError> {
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            rule_named(name).ok_or_else(|| FormatError::UnknownRule(name.to_owned()))
        })
        .collect()
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
