//! oat-lexer - Lexer for the Oat language
//!
//! Turns a source buffer into a lazy stream of tokens.
//!
//! # Features
//!
//! - Identifiers (`foo`) and struct names (`Foo`) are distinct token kinds
//! - Signed integer literals (`-5`, `0x1F`) lex as a single token
//! - `//` and `/* */` comments are skipped as trivia
//! - Lexing stops at the first error; the stream is fused
//!
//! # Example
//!
//! ```rust
//! use oat_lexer::{tokenize, TokenKind};
//!
//! let source = "int f() { return -5; }";
//! let kinds: Vec<TokenKind> = tokenize(source, 0)
//!     .map(|t| t.unwrap().kind)
//!     .collect();
//!
//! assert_eq!(kinds[0], TokenKind::Int);
//! assert_eq!(kinds.last(), Some(&TokenKind::Eof));
//! ```

pub mod lexer;
pub mod token;

pub use lexer::{tokenize, Lexer};
pub use token::{Token, TokenKind};
