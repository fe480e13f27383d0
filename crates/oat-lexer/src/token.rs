//! Tokens for the Oat language
//!
//! `TokenKind` is the logos automaton itself: keyword and operator tables
//! are compiled into it, so the lexer shares no mutable state between runs.

use logos::Logos;
use oat_error::span::Span;
use oat_error::LexErrorKind;
use std::fmt;

/// All token kinds of Oat v1 and v2
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TokenKind {
    // =========================================
    // Keywords
    // =========================================
    #[token("global")]
    Global,
    #[token("struct")]
    Struct,
    #[token("var")]
    Var,
    #[token("return")]
    Return,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("while")]
    While,
    #[token("new")]
    New,
    #[token("length")]
    Length,
    #[token("int")]
    Int,
    #[token("bool")]
    Bool,
    #[token("string")]
    String,
    #[token("void")]
    Void,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    // =========================================
    // Names and literals
    // =========================================
    /// Value names start lowercase (or with `_`)
    #[regex(r"[a-z_][A-Za-z0-9_]*")]
    Ident,
    /// Type names start uppercase
    #[regex(r"[A-Z][A-Za-z0-9_]*")]
    StructName,
    /// Optional sign is part of the literal: `-5` is one token
    #[regex(r"-?(0x[0-9A-Fa-f]+|[0-9]+)")]
    IntLit,
    #[token("\"", lex_string)]
    StringLit,

    // =========================================
    // Trivia (filtered out by `Lexer`)
    // =========================================
    #[regex(r"//[^\n]*")]
    LineComment,
    #[token("/*", lex_block_comment)]
    BlockComment,

    // =========================================
    // Operators
    // =========================================
    #[token("*")]
    Star,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token(">>>")]
    Sar,
    #[token("<")]
    Lt,
    #[token("<=")]
    Le,
    #[token(">")]
    Gt,
    #[token(">=")]
    Ge,
    #[token("==")]
    EqEq,
    #[token("!=")]
    Ne,
    /// `&` - logical and
    #[token("&")]
    Amp,
    /// `|` - logical or
    #[token("|")]
    Pipe,
    /// `[&]` - bitwise and
    #[token("[&]")]
    BitAnd,
    /// `[|]` - bitwise or
    #[token("[|]")]
    BitOr,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,

    // =========================================
    // Punctuation
    // =========================================
    #[token("=")]
    Eq,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    /// `[]` - array type suffix
    #[token("[]")]
    Brackets,
    #[token("->")]
    Arrow,
    #[token("?")]
    Question,

    /// Terminal sentinel, never produced by the automaton
    Eof,
}

/// Consumes the body of a string literal after its opening quote.
/// Escape pairs are kept opaque; only the terminator is checked.
fn lex_string(lex: &mut logos::Lexer<'_, TokenKind>) -> Result<(), LexErrorKind> {
    let rest = lex.remainder();
    let mut chars = rest.char_indices();

    while let Some((i, ch)) = chars.next() {
        match ch {
            '"' => {
                lex.bump(i + 1);
                return Ok(());
            }
            '\n' => {
                lex.bump(i);
                return Err(LexErrorKind::UnterminatedString);
            }
            '\\' => match chars.next() {
                Some((j, '\n')) => {
                    lex.bump(j);
                    return Err(LexErrorKind::UnterminatedString);
                }
                Some(_) => {}
                None => break,
            },
            _ => {}
        }
    }

    lex.bump(rest.len());
    Err(LexErrorKind::UnterminatedString)
}

/// Consumes a block comment up to the first `*/`
fn lex_block_comment(lex: &mut logos::Lexer<'_, TokenKind>) -> Result<(), LexErrorKind> {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            Ok(())
        }
        None => {
            lex.bump(lex.remainder().len());
            Err(LexErrorKind::UnterminatedComment)
        }
    }
}

impl TokenKind {
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Global
                | TokenKind::Struct
                | TokenKind::Var
                | TokenKind::Return
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::For
                | TokenKind::While
                | TokenKind::New
                | TokenKind::Length
                | TokenKind::Int
                | TokenKind::Bool
                | TokenKind::String
                | TokenKind::Void
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
        )
    }

    pub fn is_trivia(&self) -> bool {
        matches!(self, TokenKind::LineComment | TokenKind::BlockComment)
    }

    /// Closing delimiters, used to report mismatched brackets
    pub fn is_closing_delimiter(&self) -> bool {
        matches!(self, TokenKind::RParen | TokenKind::RBrace | TokenKind::RBracket)
    }

    /// Human readable description used in diagnostics
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Global => "`global`",
            TokenKind::Struct => "`struct`",
            TokenKind::Var => "`var`",
            TokenKind::Return => "`return`",
            TokenKind::If => "`if`",
            TokenKind::Else => "`else`",
            TokenKind::For => "`for`",
            TokenKind::While => "`while`",
            TokenKind::New => "`new`",
            TokenKind::Length => "`length`",
            TokenKind::Int => "`int`",
            TokenKind::Bool => "`bool`",
            TokenKind::String => "`string`",
            TokenKind::Void => "`void`",
            TokenKind::True => "`true`",
            TokenKind::False => "`false`",
            TokenKind::Null => "`null`",
            TokenKind::Ident => "identifier",
            TokenKind::StructName => "struct name",
            TokenKind::IntLit => "integer literal",
            TokenKind::StringLit => "string literal",
            TokenKind::LineComment | TokenKind::BlockComment => "comment",
            TokenKind::Star => "`*`",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Shl => "`<<`",
            TokenKind::Shr => "`>>`",
            TokenKind::Sar => "`>>>`",
            TokenKind::Lt => "`<`",
            TokenKind::Le => "`<=`",
            TokenKind::Gt => "`>`",
            TokenKind::Ge => "`>=`",
            TokenKind::EqEq => "`==`",
            TokenKind::Ne => "`!=`",
            TokenKind::Amp => "`&`",
            TokenKind::Pipe => "`|`",
            TokenKind::BitAnd => "`[&]`",
            TokenKind::BitOr => "`[|]`",
            TokenKind::Bang => "`!`",
            TokenKind::Tilde => "`~`",
            TokenKind::Eq => "`=`",
            TokenKind::Semi => "`;`",
            TokenKind::Comma => "`,`",
            TokenKind::Dot => "`.`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::Brackets => "`[]`",
            TokenKind::Arrow => "`->`",
            TokenKind::Question => "`?`",
            TokenKind::Eof => "end of input",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A token: its kind, the exact source text and where it came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub text: &'src str,
    pub span: Span,
}

impl<'src> Token<'src> {
    pub fn new(kind: TokenKind, text: &'src str, span: Span) -> Self {
        Self { kind, text, span }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Description for "found ..." in diagnostics
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Ident | TokenKind::StructName | TokenKind::IntLit => {
                format!("{} `{}`", self.kind, self.text)
            }
            _ => self.kind.to_string(),
        }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "<eof>"),
            _ => f.write_str(self.text),
        }
    }
}
