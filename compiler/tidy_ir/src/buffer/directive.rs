//! Inline enable/disable directives.
//!
//! A directive is a comment whose body starts with `tidy:`:
//!
//! ```text
//! // tidy:disable indent wrapArguments
//! // tidy:enable all
//! // tidy:disable:next redundantSelf
//! let x = 1 // tidy:disable:this all
//! ```

use crate::Token;

/// Comment prefix that marks a directive.
pub const DIRECTIVE_PREFIX: &str = "tidy:";

/// Rule name matching every rule in a directive.
pub const ALL_RULES: &str = "all";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirectiveKind {
    /// Disable from this point until a matching `enable`.
    Disable,
    Enable,
    /// Disable the line following the comment.
    DisableNext,
    /// Disable the line containing the comment.
    DisableThis,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Directive {
    pub kind: DirectiveKind,
    pub rules: Vec<String>,
}

impl Directive {
    /// Parse a comment body. Returns `None` for ordinary comments.
    pub fn parse(comment: &str) -> Option<Self> {
        let rest = comment.trim().strip_prefix(DIRECTIVE_PREFIX)?;
        let mut words = rest.split_whitespace();
        let kind = match words.next()? {
            "disable" => DirectiveKind::Disable,
            "enable" => DirectiveKind::Enable,
            "disable:next" => DirectiveKind::DisableNext,
            "disable:this" => DirectiveKind::DisableThis,
            _ => return None,
        };
        let rules: Vec<String> = words.map(str::to_owned).collect();
        if rules.is_empty() {
            return None;
        }
        Some(Directive { kind, rules })
    }

    /// Whether this directive governs `rule`.
    ///
    /// The rule-agnostic query name [`ALL_RULES`] is only governed by
    /// directives that name `all`.
    pub fn applies_to(&self, rule: &str) -> bool {
        self.rules.iter().any(|r| r == ALL_RULES || r == rule)
    }
}

/// Compute the enabled flag for `tokens[..limit]`.
pub(crate) fn scan(tokens: &[Token], rule: &str, limit: usize) -> Vec<bool> {
    let limit = limit.min(tokens.len());
    let mut mask = vec![true; limit];
    let mut enabled = true;
    let mut line_start = 0;
    let mut this_line = false;
    let mut next_pending = false;
    let mut next_active = false;

    for (i, token) in tokens[..limit].iter().enumerate() {
        if let Token::CommentBody(body) = token {
            if let Some(directive) = Directive::parse(body).filter(|d| d.applies_to(rule)) {
                match directive.kind {
                    DirectiveKind::Disable => enabled = false,
                    DirectiveKind::Enable => enabled = true,
                    DirectiveKind::DisableNext => next_pending = true,
                    DirectiveKind::DisableThis => {
                        mask[line_start..i].fill(false);
                        this_line = true;
                    }
                }
            }
        }
        mask[i] = enabled && !this_line && !next_active;
        if token.is_linebreak() {
            line_start = i + 1;
            this_line = false;
            next_active = next_pending;
            next_pending = false;
        }
    }
    mask
}
