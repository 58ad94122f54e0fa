//! Reference tokenizer for tidy.
//!
//! Turns source text into the flat [`Token`] sequence the rewriting engine
//! operates on. The tokenizer is lossless: every byte of input lands in
//! exactly one token, so concatenating token texts reproduces the source.
//!
//! ```
//! use tidy_lexer::tokenize;
//!
//! let tokens = tokenize("let x = 1\n");
//! assert_eq!(tidy_ir::source_of(&tokens), "let x = 1\n");
//! ```

mod cursor;
mod scanner;

pub use scanner::tokenize;

use tidy_ir::{Token, TokenBuffer};

/// Tokenize `source` into a fresh buffer.
pub fn lex(source: &str) -> TokenBuffer {
    TokenBuffer::from_tokens(tokenize(source))
}

/// Whether the tokens contain any [`Token::Error`].
pub fn has_errors(tokens: &[Token]) -> bool {
    tokens.iter().any(Token::is_error)
}
