//! Token model for the rewriting engine.
//!
//! A [`Token`] is an immutable, structurally comparable value. Tokens carry no
//! position: a position is always an index into the *current* buffer and is
//! invalidated by any mutation of that buffer.
//!
//! The textual form of every token is stored verbatim, so concatenating the
//! tokens of a buffer reproduces the source byte-for-byte.

mod keywords;

pub use keywords::{
    is_accessor_name, is_body_keyword, is_declaration_keyword, is_modifier, is_type_keyword,
    ACCESSOR_NAMES, DECLARATION_KEYWORDS, KEYWORDS, MODIFIERS,
};

use std::fmt;

/// Operator fixity, derived from surrounding whitespace by the lexer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Fixity {
    /// Operand follows: `-x`, `!flag`, `.member`.
    Prefix,
    /// Operands on both sides: `a + b`, `a.b`.
    Infix,
    /// Operand precedes: `x!`, `value?`.
    Postfix,
    /// Standalone operator reference, e.g. `(+)` or `func ==`.
    None,
}

/// Literal kind of a number token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NumberKind {
    Integer,
    Decimal,
    Hex,
    Octal,
    Binary,
}

/// A single lexical token.
///
/// Scope delimiters carry their exact delimiter text so that a closer can be
/// checked against its opener without further context.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Token {
    /// Numeric literal with its literal kind.
    Number(String, NumberKind),
    /// `\n`, `\r\n` or a lone `\r`.
    Linebreak(String),
    /// Opening delimiter: `(`, `[`, `{`, `<`, `"`, `"""`, `/*`, `//`, `#if`,
    /// and the `:` that opens a switch-case body.
    StartOfScope(String),
    /// Closing delimiter: `)`, `]`, `}`, `>`, `"`, `"""`, `*/`, `#endif`,
    /// and the `case`/`default` labels that close a switch-case body.
    EndOfScope(String),
    /// `,`, `;` or a non-operator `:`.
    Delimiter(String),
    /// Operator text and fixity.
    Operator(String, Fixity),
    /// Literal text between string delimiters.
    StringBody(String),
    /// Reserved word, attribute (`@objc`) or compiler directive (`#else`).
    Keyword(String),
    Identifier(String),
    /// Horizontal whitespace.
    Space(String),
    /// Comment text without its delimiters.
    CommentBody(String),
    /// Input the lexer could not classify, such as an unmatched closer.
    Error(String),
}

impl Token {
    /// The verbatim source text of this token.
    pub fn text(&self) -> &str {
        match self {
            Token::Number(text, _)
            | Token::Linebreak(text)
            | Token::StartOfScope(text)
            | Token::EndOfScope(text)
            | Token::Delimiter(text)
            | Token::Operator(text, _)
            | Token::StringBody(text)
            | Token::Keyword(text)
            | Token::Identifier(text)
            | Token::Space(text)
            | Token::CommentBody(text)
            | Token::Error(text) => text,
        }
    }

    // ─── Constructors ────────────────────────────────────────────────

    pub fn space(text: impl Into<String>) -> Self {
        Token::Space(text.into())
    }

    pub fn linebreak(text: impl Into<String>) -> Self {
        Token::Linebreak(text.into())
    }

    pub fn keyword(text: impl Into<String>) -> Self {
        Token::Keyword(text.into())
    }

    pub fn identifier(text: impl Into<String>) -> Self {
        Token::Identifier(text.into())
    }

    pub fn delimiter(text: impl Into<String>) -> Self {
        Token::Delimiter(text.into())
    }

    pub fn operator(text: impl Into<String>, fixity: Fixity) -> Self {
        Token::Operator(text.into(), fixity)
    }

    pub fn start_of_scope(text: impl Into<String>) -> Self {
        Token::StartOfScope(text.into())
    }

    pub fn end_of_scope(text: impl Into<String>) -> Self {
        Token::EndOfScope(text.into())
    }

    // ─── Kind predicates ─────────────────────────────────────────────

    #[inline]
    pub fn is_space(&self) -> bool {
        matches!(self, Token::Space(_))
    }

    #[inline]
    pub fn is_linebreak(&self) -> bool {
        matches!(self, Token::Linebreak(_))
    }

    #[inline]
    pub fn is_space_or_linebreak(&self) -> bool {
        matches!(self, Token::Space(_) | Token::Linebreak(_))
    }

    /// Comment delimiters and comment text.
    pub fn is_comment(&self) -> bool {
        match self {
            Token::CommentBody(_) => true,
            Token::StartOfScope(s) => s == "//" || s == "/*",
            Token::EndOfScope(s) => s == "*/",
            _ => false,
        }
    }

    #[inline]
    pub fn is_space_or_comment(&self) -> bool {
        self.is_space() || self.is_comment()
    }

    #[inline]
    pub fn is_space_or_comment_or_linebreak(&self) -> bool {
        self.is_space_or_linebreak() || self.is_comment()
    }

    #[inline]
    pub fn is_start_of_scope(&self) -> bool {
        matches!(self, Token::StartOfScope(_))
    }

    #[inline]
    pub fn is_end_of_scope(&self) -> bool {
        matches!(self, Token::EndOfScope(_))
    }

    #[inline]
    pub fn is_identifier(&self) -> bool {
        matches!(self, Token::Identifier(_))
    }

    #[inline]
    pub fn is_keyword(&self) -> bool {
        matches!(self, Token::Keyword(_))
    }

    #[inline]
    pub fn is_identifier_or_keyword(&self) -> bool {
        matches!(self, Token::Identifier(_) | Token::Keyword(_))
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, Token::Error(_))
    }

    #[inline]
    pub fn is_number(&self) -> bool {
        matches!(self, Token::Number(..))
    }

    /// Matches a specific keyword.
    #[inline]
    pub fn is_keyword_named(&self, name: &str) -> bool {
        matches!(self, Token::Keyword(k) if k == name)
    }

    /// Matches an operator with the given text, any fixity.
    #[inline]
    pub fn is_operator(&self, text: &str) -> bool {
        matches!(self, Token::Operator(op, _) if op == text)
    }

    #[inline]
    pub fn is_delimiter(&self, text: &str) -> bool {
        matches!(self, Token::Delimiter(d) if d == text)
    }

    #[inline]
    pub fn is_start_of_scope_named(&self, text: &str) -> bool {
        matches!(self, Token::StartOfScope(s) if s == text)
    }

    #[inline]
    pub fn is_end_of_scope_named(&self, text: &str) -> bool {
        matches!(self, Token::EndOfScope(s) if s == text)
    }

    pub fn fixity(&self) -> Option<Fixity> {
        match self {
            Token::Operator(_, fixity) => Some(*fixity),
            _ => None,
        }
    }

    /// Postfix `?` or `!`.
    pub fn is_unwrap_operator(&self) -> bool {
        matches!(self, Token::Operator(op, Fixity::Postfix) if op == "?" || op == "!")
    }

    /// Assignment or compound assignment operator.
    pub fn is_assignment_operator(&self) -> bool {
        match self {
            Token::Operator(op, Fixity::Infix) => {
                op == "="
                    || (op.len() > 1
                        && op.ends_with('=')
                        && !matches!(op.as_str(), "==" | "!=" | "<=" | ">=" | "===" | "!=="))
            }
            _ => false,
        }
    }

    /// Value-like keyword that can stand alone as an expression.
    pub fn is_value_keyword(&self) -> bool {
        matches!(
            self,
            Token::Keyword(k) if matches!(
                k.as_str(),
                "self" | "Self" | "super" | "true" | "false" | "nil" | "init" | "Any"
                    | "#file" | "#fileID" | "#filePath" | "#line" | "#column" | "#function"
                    | "#dsohandle"
            )
        )
    }

    /// A token after which a value ends (used for operator fixity decisions).
    pub fn is_rvalue_end(&self) -> bool {
        match self {
            Token::Identifier(_) | Token::Number(..) => true,
            Token::Keyword(_) => self.is_value_keyword(),
            Token::EndOfScope(s) => matches!(s.as_str(), ")" | "]" | "}" | ">" | "\"" | "\"\"\""),
            Token::Operator(_, Fixity::Postfix) => true,
            _ => false,
        }
    }
}

/// Closer text paired with opener text.
pub fn closes(open: &str, close: &str) -> bool {
    match open {
        "(" => close == ")",
        "[" => close == "]",
        "{" => close == "}",
        "<" => close == ">",
        "\"" => close == "\"",
        "\"\"\"" => close == "\"\"\"",
        "/*" => close == "*/",
        "#if" => close == "#endif",
        ":" => matches!(close, "case" | "default" | "}"),
        _ => false,
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Token::Number(..) => "number",
            Token::Linebreak(_) => "linebreak",
            Token::StartOfScope(_) => "startOfScope",
            Token::EndOfScope(_) => "endOfScope",
            Token::Delimiter(_) => "delimiter",
            Token::Operator(_, fixity) => {
                return write!(f, "operator({:?}, {fixity:?})", self.text());
            }
            Token::StringBody(_) => "stringBody",
            Token::Keyword(_) => "keyword",
            Token::Identifier(_) => "identifier",
            Token::Space(_) => "space",
            Token::CommentBody(_) => "commentBody",
            Token::Error(_) => "error",
        };
        write!(f, "{kind}({:?})", self.text())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Concatenate token texts.
pub fn source_of<'a>(tokens: impl IntoIterator<Item = &'a Token>) -> String {
    tokens.into_iter().map(Token::text).collect()
}
