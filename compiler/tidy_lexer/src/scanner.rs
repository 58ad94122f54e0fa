//! Hand-written scanner producing [`Token`]s.
//!
//! The scanner makes a single forward pass over the source and emits one
//! token per lexeme, keeping the verbatim text of each so that the output
//! concatenates back to the input byte-for-byte. It never fails: input it
//! cannot classify becomes [`Token::Error`].
//!
//! # Scope tracking
//!
//! A small stack of open scopes drives the context-sensitive decisions:
//!
//! - string interpolation `\( ... )` resumes the enclosing string on its `)`
//! - inside a `switch` body, `case`/`default` close the previous case body
//!   and the `:` ending their pattern opens the next one
//! - a ternary `?` makes the next same-scope `:` an infix operator
//! - `>` closes a generic argument list opened by `<`

use smallvec::SmallVec;
use tidy_ir::token::KEYWORDS;
use tidy_ir::{closes, Fixity, NumberKind, Token};

use crate::cursor::{
    is_horizontal_space, is_identifier_char, is_identifier_start, is_operator_char, Cursor,
};

/// An open scope on the scanner's stack.
#[derive(Clone, Debug)]
struct Scope {
    open: &'static str,
    /// `{` that opens a `switch` body.
    switch: bool,
    /// `(` opened by a string interpolation.
    interpolation: bool,
    /// Ternary `?` operators still waiting for their `:`.
    ternaries: u32,
}

impl Scope {
    fn new(open: &'static str) -> Self {
        Scope {
            open,
            switch: false,
            interpolation: false,
            ternaries: 0,
        }
    }
}

/// Tokenize `source`.
///
/// Concatenating the texts of the returned tokens reproduces `source`
/// exactly.
pub fn tokenize(source: &str) -> Vec<Token> {
    Scanner::new(source).run()
}

struct Scanner<'a> {
    cursor: Cursor<'a>,
    tokens: Vec<Token>,
    root: Scope,
    scopes: SmallVec<[Scope; 16]>,
    /// Depth at which a `switch` keyword is waiting for its `{`.
    pending_switch: Option<usize>,
    /// Depth at which a `case` label is waiting for its `:`.
    pending_case: Option<usize>,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str) -> Self {
        Scanner {
            cursor: Cursor::new(source),
            tokens: Vec::with_capacity(source.len() / 3),
            root: Scope::new(""),
            scopes: SmallVec::new(),
            pending_switch: None,
            pending_case: None,
        }
    }

    fn run(mut self) -> Vec<Token> {
        while let Some(c) = self.cursor.peek() {
            let start = self.cursor.pos();
            match c {
                '\n' | '\r' => self.linebreak(),
                c if is_horizontal_space(c) => {
                    self.cursor.eat_while(is_horizontal_space);
                    self.push(Token::space(self.cursor.slice_from(start)));
                }
                '/' if self.cursor.starts_with("//") => self.line_comment(),
                '/' if self.cursor.starts_with("/*") => self.block_comment(),
                '"' => self.string(),
                '`' => self.escaped_identifier(start),
                '#' => self.hash(start),
                '@' => self.attribute(start),
                '0'..='9' => self.number(start),
                '(' | '[' | '{' => self.open(c),
                ')' | ']' | '}' => self.close(c),
                ',' | ';' => {
                    self.cursor.advance();
                    self.push(Token::delimiter(self.cursor.slice_from(start)));
                }
                ':' => self.colon(),
                '\\' => {
                    self.cursor.advance();
                    self.push(Token::operator("\\", Fixity::Prefix));
                }
                c if is_identifier_start(c) => self.identifier(start),
                c if is_operator_char(c) => self.operator(start),
                _ => {
                    self.cursor.advance();
                    self.push(Token::Error(self.cursor.slice_from(start).to_owned()));
                }
            }
        }
        self.tokens
    }

    // ─── Helpers ─────────────────────────────────────────────────────

    #[inline]
    fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    fn top(&self) -> &Scope {
        self.scopes.last().unwrap_or(&self.root)
    }

    fn top_mut(&mut self) -> &mut Scope {
        match self.scopes.last_mut() {
            Some(scope) => scope,
            None => &mut self.root,
        }
    }

    /// Last token that is not whitespace or comment.
    fn last_significant(&self) -> Option<&Token> {
        self.tokens
            .iter()
            .rev()
            .find(|t| !t.is_space_or_comment_or_linebreak())
    }

    /// Whether the innermost non-`#if` scope is a switch body or case body.
    fn in_switch_body(&self) -> bool {
        self.scopes
            .iter()
            .rev()
            .find(|s| s.open != "#if")
            .is_some_and(|s| s.open == ":" || s.switch)
    }

    fn linebreak(&mut self) {
        let start = self.cursor.pos();
        if self.cursor.advance() == Some('\r') && self.cursor.peek() == Some('\n') {
            self.cursor.advance();
        }
        self.push(Token::linebreak(self.cursor.slice_from(start)));
    }

    // ─── Comments ────────────────────────────────────────────────────

    fn line_comment(&mut self) {
        self.cursor.advance_str("//");
        self.push(Token::start_of_scope("//"));
        let start = self.cursor.pos();
        self.cursor.eat_while(|c| c != '\n' && c != '\r');
        self.push_comment_text(self.cursor.slice_from(start));
    }

    /// Block comments nest; inner delimiters are part of the comment text.
    fn block_comment(&mut self) {
        self.cursor.advance_str("/*");
        self.push(Token::start_of_scope("/*"));
        let mut depth = 1usize;
        let mut start = self.cursor.pos();
        loop {
            match self.cursor.peek() {
                None => {
                    self.push_comment_text(self.cursor.slice_from(start));
                    return;
                }
                Some('*') if self.cursor.starts_with("*/") => {
                    depth -= 1;
                    if depth == 0 {
                        self.push_comment_text(self.cursor.slice_from(start));
                        self.cursor.advance_str("*/");
                        self.push(Token::end_of_scope("*/"));
                        return;
                    }
                    self.cursor.advance_str("*/");
                }
                Some('/') if self.cursor.starts_with("/*") => {
                    depth += 1;
                    self.cursor.advance_str("/*");
                }
                Some('\n' | '\r') => {
                    self.push_comment_text(self.cursor.slice_from(start));
                    self.linebreak();
                    start = self.cursor.pos();
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    /// Split comment text into leading space, body and trailing space.
    fn push_comment_text(&mut self, text: &str) {
        let body = text.trim_matches(is_horizontal_space);
        if body.is_empty() {
            if !text.is_empty() {
                self.push(Token::space(text));
            }
            return;
        }
        let lead = text.len() - text.trim_start_matches(is_horizontal_space).len();
        let trail = text.trim_end_matches(is_horizontal_space).len();
        if lead > 0 {
            self.push(Token::space(&text[..lead]));
        }
        self.push(Token::CommentBody(text[lead..trail].to_owned()));
        if trail < text.len() {
            self.push(Token::space(&text[trail..]));
        }
    }

    // ─── Strings ─────────────────────────────────────────────────────

    fn string(&mut self) {
        let delimiter = if self.cursor.starts_with("\"\"\"") {
            "\"\"\""
        } else {
            "\""
        };
        self.cursor.advance_str(delimiter);
        self.push(Token::start_of_scope(delimiter));
        self.scopes.push(Scope::new(delimiter));
        self.string_body(delimiter);
    }

    /// Scan string content up to the closing delimiter or an interpolation.
    ///
    /// Multi-line string content keeps its leading whitespace inside the
    /// string body so that no whitespace rule touches it.
    fn string_body(&mut self, delimiter: &'static str) {
        let multiline = delimiter.len() == 3;
        let mut start = self.cursor.pos();
        loop {
            let Some(c) = self.cursor.peek() else {
                self.push_string_text(start);
                return;
            };
            match c {
                '"' if self.cursor.starts_with(delimiter) => {
                    self.push_string_text(start);
                    self.cursor.advance_str(delimiter);
                    self.push(Token::end_of_scope(delimiter));
                    self.scopes.pop();
                    return;
                }
                '\\' => {
                    self.cursor.advance();
                    match self.cursor.peek() {
                        Some('(') => {
                            self.push_string_text(start);
                            self.cursor.advance();
                            self.push(Token::start_of_scope("("));
                            self.scopes.push(Scope {
                                interpolation: true,
                                ..Scope::new("(")
                            });
                            return;
                        }
                        Some('\n' | '\r') | None => {}
                        Some(_) => {
                            self.cursor.advance();
                        }
                    }
                }
                '\n' | '\r' if !multiline => {
                    // Unterminated literal; the linebreak belongs to the code.
                    self.push_string_text(start);
                    self.scopes.pop();
                    return;
                }
                '\n' | '\r' => {
                    self.push_string_text(start);
                    self.linebreak();
                    start = self.cursor.pos();
                }
                _ => {
                    self.cursor.advance();
                }
            }
        }
    }

    fn push_string_text(&mut self, start: usize) {
        let text = self.cursor.slice_from(start);
        if !text.is_empty() {
            self.push(Token::StringBody(text.to_owned()));
        }
    }

    // ─── Words ───────────────────────────────────────────────────────

    fn identifier(&mut self, start: usize) {
        self.cursor.eat_while(is_identifier_char);
        let word = self.cursor.slice_from(start);
        let token = if KEYWORDS.contains(&word) {
            self.classify_keyword(word)
        } else {
            Token::identifier(word)
        };
        self.push(token);
    }

    fn classify_keyword(&mut self, word: &str) -> Token {
        let prev = self.last_significant();
        let after_dot = prev.is_some_and(|t| t.is_operator("."));
        let after_list_start =
            prev.is_some_and(|t| t.is_start_of_scope_named("(") || t.is_delimiter(","));
        let in_condition = prev.is_some_and(|t| {
            t.is_delimiter(",")
                || matches!(t, Token::Keyword(k) if matches!(k.as_str(), "if" | "guard" | "while" | "for"))
        });

        // Member names such as `.default` or `foo.class`.
        if after_dot && !matches!(word, "self" | "init") {
            return Token::identifier(word);
        }
        // Argument labels such as `foo(for: x)` or `func f(in rect: Rect)`.
        if after_list_start && self.next_is_label() {
            return Token::identifier(word);
        }
        if matches!(word, "case" | "default") && !in_condition && self.in_switch_body() {
            if self.top().open == ":" {
                self.scopes.pop();
            }
            self.pending_case = Some(self.scopes.len());
            return Token::end_of_scope(word);
        }
        if word == "switch" {
            self.pending_switch = Some(self.scopes.len());
        }
        Token::keyword(word)
    }

    /// Whether the upcoming text is `: ` or `name:`, i.e. the word just
    /// scanned is an argument label.
    fn next_is_label(&self) -> bool {
        let rest = self.cursor.rest().trim_start_matches(is_horizontal_space);
        if rest.starts_with(':') {
            return true;
        }
        let name_len = rest
            .find(|c| !is_identifier_char(c))
            .unwrap_or(rest.len());
        name_len > 0
            && rest[name_len..]
                .trim_start_matches(is_horizontal_space)
                .starts_with(':')
    }

    fn escaped_identifier(&mut self, start: usize) {
        self.cursor.advance();
        self.cursor.eat_while(|c| c != '`' && c != '\n' && c != '\r');
        if self.cursor.peek() == Some('`') {
            self.cursor.advance();
            self.push(Token::identifier(self.cursor.slice_from(start)));
        } else {
            self.push(Token::Error(self.cursor.slice_from(start).to_owned()));
        }
    }

    /// `#if`/`#endif` scopes and other `#` directives.
    fn hash(&mut self, start: usize) {
        self.cursor.advance();
        if !self.cursor.peek().is_some_and(is_identifier_start) {
            self.push(Token::Error("#".to_owned()));
            return;
        }
        self.cursor.eat_while(is_identifier_char);
        let word = self.cursor.slice_from(start);
        match word {
            "#if" => {
                self.push(Token::start_of_scope("#if"));
                self.scopes.push(Scope::new("#if"));
            }
            "#endif" => {
                let len = self.scopes.len();
                if self.top().open == ":" && len >= 2 && self.scopes[len - 2].open == "#if" {
                    self.scopes.pop();
                }
                if self.top().open == "#if" && !self.scopes.is_empty() {
                    self.scopes.pop();
                    self.push(Token::end_of_scope("#endif"));
                } else {
                    self.push(Token::Error(word.to_owned()));
                }
            }
            _ => self.push(Token::keyword(word)),
        }
    }

    fn attribute(&mut self, start: usize) {
        self.cursor.advance();
        if self.cursor.peek().is_some_and(is_identifier_start) {
            self.cursor.eat_while(is_identifier_char);
            self.push(Token::keyword(self.cursor.slice_from(start)));
        } else {
            self.push(Token::Error("@".to_owned()));
        }
    }

    // ─── Numbers ─────────────────────────────────────────────────────

    fn number(&mut self, start: usize) {
        let is_digit = |c: char| c.is_ascii_digit() || c == '_';
        let kind = if self.cursor.starts_with("0x") {
            self.cursor.advance_str("0x");
            let is_hex = |c: char| c.is_ascii_hexdigit() || c == '_';
            self.cursor.eat_while(is_hex);
            if self.cursor.peek() == Some('.') && self.cursor.peek_nth(1).is_some_and(is_hex) {
                self.cursor.advance();
                self.cursor.eat_while(is_hex);
            }
            if matches!(self.cursor.peek(), Some('p' | 'P')) {
                self.exponent();
            }
            NumberKind::Hex
        } else if self.cursor.starts_with("0o") {
            self.cursor.advance_str("0o");
            self.cursor.eat_while(|c| matches!(c, '0'..='7' | '_'));
            NumberKind::Octal
        } else if self.cursor.starts_with("0b") {
            self.cursor.advance_str("0b");
            self.cursor.eat_while(|c| matches!(c, '0' | '1' | '_'));
            NumberKind::Binary
        } else {
            self.cursor.eat_while(is_digit);
            let mut kind = NumberKind::Integer;
            if self.cursor.peek() == Some('.')
                && self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit())
            {
                self.cursor.advance();
                self.cursor.eat_while(is_digit);
                kind = NumberKind::Decimal;
            }
            if matches!(self.cursor.peek(), Some('e' | 'E')) && self.exponent() {
                kind = NumberKind::Decimal;
            }
            kind
        };
        self.push(Token::Number(self.cursor.slice_from(start).to_owned(), kind));
    }

    /// Consume an exponent suffix if one follows. Returns whether it did.
    fn exponent(&mut self) -> bool {
        let signed = matches!(self.cursor.peek_nth(1), Some('+' | '-'));
        let digit_at = if signed { 2 } else { 1 };
        if !self.cursor.peek_nth(digit_at).is_some_and(|c| c.is_ascii_digit()) {
            return false;
        }
        for _ in 0..digit_at {
            self.cursor.advance();
        }
        self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');
        true
    }

    // ─── Scopes ──────────────────────────────────────────────────────

    fn open(&mut self, c: char) {
        self.cursor.advance();
        let open = match c {
            '(' => "(",
            '[' => "[",
            _ => "{",
        };
        let mut scope = Scope::new(open);
        if open == "{" && self.pending_switch == Some(self.scopes.len()) {
            scope.switch = true;
            self.pending_switch = None;
        }
        self.push(Token::start_of_scope(open));
        self.scopes.push(scope);
    }

    fn close(&mut self, c: char) {
        self.cursor.advance();
        let close = match c {
            ')' => ")",
            ']' => "]",
            _ => "}",
        };
        if close == "}" && self.top().open == ":" {
            self.scopes.pop();
        }
        if self.scopes.is_empty() || !closes(self.top().open, close) {
            self.push(Token::Error(close.to_owned()));
            return;
        }
        let interpolation = self.top().interpolation;
        self.scopes.pop();
        let depth = self.scopes.len();
        self.pending_case = self.pending_case.filter(|&d| d <= depth);
        self.pending_switch = self.pending_switch.filter(|&d| d <= depth);
        self.push(Token::end_of_scope(close));

        if interpolation {
            let open = self.top().open;
            if open == "\"" || open == "\"\"\"" {
                self.string_body(open);
            }
        }
    }

    fn colon(&mut self) {
        self.cursor.advance();
        if self.pending_case == Some(self.scopes.len()) {
            self.pending_case = None;
            self.push(Token::start_of_scope(":"));
            self.scopes.push(Scope::new(":"));
        } else if self.top().ternaries > 0 {
            self.top_mut().ternaries -= 1;
            self.push(Token::operator(":", Fixity::Infix));
        } else {
            self.push(Token::delimiter(":"));
        }
    }

    // ─── Operators ───────────────────────────────────────────────────

    fn operator(&mut self, start: usize) {
        let in_generic = self.top().open == "<";
        match self.cursor.peek() {
            Some('<') if self.looks_like_generic() => {
                self.cursor.advance();
                self.push(Token::start_of_scope("<"));
                self.scopes.push(Scope::new("<"));
                return;
            }
            Some('>') if in_generic => {
                self.cursor.advance();
                self.scopes.pop();
                self.push(Token::end_of_scope(">"));
                return;
            }
            _ => {}
        }

        let dotted = self.cursor.peek() == Some('.');
        while let Some(c) = self.cursor.peek() {
            let stop = !is_operator_char(c)
                || (c == '.' && !dotted)
                || (c == '/' && (self.cursor.starts_with("//") || self.cursor.starts_with("/*")))
                || (in_generic && c == '>' && self.cursor.slice_from(start) != "-");
            if stop {
                break;
            }
            self.cursor.advance();
        }

        let text = self.cursor.slice_from(start);
        let fixity = self.fixity(text, start);
        if text == "?" && fixity == Fixity::Infix {
            self.top_mut().ternaries += 1;
        }
        self.push(Token::operator(text, fixity));
    }

    /// Fixity from the whitespace around the operator.
    ///
    /// Bound on both sides or neither is infix, bound on the left only is
    /// postfix, bound on the right only is prefix. A member-access dot is
    /// infix after a value and prefix otherwise (`.member` shorthand).
    fn fixity(&self, text: &str, start: usize) -> Fixity {
        let prev = self.last_significant();
        let left = self.cursor.char_before(start);
        let right = self.cursor.peek();

        let declares_operator = prev.is_some_and(|t| {
            matches!(t, Token::Keyword(k) if matches!(k.as_str(), "func" | "operator" | "prefix" | "postfix" | "infix"))
        });
        if declares_operator {
            return Fixity::None;
        }
        if text == "." {
            return if prev.is_some_and(Token::is_rvalue_end) {
                Fixity::Infix
            } else {
                Fixity::Prefix
            };
        }

        let next = self.cursor.rest().trim_start_matches(is_horizontal_space).chars().next();
        let in_list = prev.is_some_and(|t| t.is_start_of_scope_named("(") || t.is_delimiter(","));
        if in_list && matches!(next, Some(')' | ',')) {
            return Fixity::None;
        }

        let left_bound = left.is_some_and(|c| {
            !c.is_whitespace() && !matches!(c, '(' | '[' | '{' | ',' | ';' | ':')
        });
        let right_bound = right.is_some_and(|c| {
            !c.is_whitespace() && !matches!(c, ')' | ']' | '}' | ',' | ';' | ':')
        });
        if left_bound && (matches!(text, "?" | "!") || right == Some('.')) {
            return Fixity::Postfix;
        }
        match (left_bound, right_bound) {
            (true, false) => Fixity::Postfix,
            (false, true) => Fixity::Prefix,
            _ => Fixity::Infix,
        }
    }

    /// Whether the `<` under the cursor opens a generic argument list.
    ///
    /// It must directly follow a name and be closed on the same line by a
    /// `>` with only type-like text in between.
    fn looks_like_generic(&self) -> bool {
        let pos = self.cursor.pos();
        if !self.cursor.char_before(pos).is_some_and(is_identifier_char) {
            return false;
        }
        let mut depth = 0usize;
        let mut chars = self.cursor.rest().chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '<' => depth += 1,
                '>' => {
                    depth -= 1;
                    if depth == 0 {
                        return true;
                    }
                }
                '-' if chars.peek() == Some(&'>') => {
                    chars.next();
                }
                c if is_identifier_char(c)
                    || matches!(c, ' ' | '.' | ',' | ':' | '?' | '!' | '[' | ']' | '(' | ')') => {}
                _ => return false,
            }
        }
        false
    }
}

#[cfg(test)]
mod tests;
