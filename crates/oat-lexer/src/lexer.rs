//! Lexer for the Oat language
//!
//! Wraps the logos automaton into a lazy, fused stream of tokens with
//! line/column spans. Comments and whitespace never leave this module.

use crate::token::{Token, TokenKind};
use logos::Logos;
use oat_error::span::{Position, Span};
use oat_error::{LexError, LexErrorKind};

/// The Oat lexer
pub struct Lexer<'src> {
    source: &'src str,
    inner: logos::Lexer<'src, TokenKind>,
    file_id: u32,
    /// Position of the last byte offset we translated into line/column
    cursor: Position,
    /// Set once `Eof` or an error has been produced
    finished: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str, file_id: u32) -> Self {
        Self {
            source,
            inner: TokenKind::lexer(source),
            file_id,
            cursor: Position::start(),
            finished: false,
        }
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Moves the line/column cursor forward to `offset`
    fn position_at(&mut self, mut offset: usize) -> Position {
        if offset < self.cursor.offset {
            return self.cursor;
        }
        while offset < self.source.len() && !self.source.is_char_boundary(offset) {
            offset += 1;
        }
        let skipped = &self.source[self.cursor.offset..offset];
        for ch in skipped.chars() {
            if ch == '\n' {
                self.cursor.line += 1;
                self.cursor.column = 1;
            } else {
                self.cursor.column += 1;
            }
        }
        self.cursor.offset = offset;
        self.cursor
    }

    fn make_span(&mut self, range: std::ops::Range<usize>) -> Span {
        let start = self.position_at(range.start);
        let end = self.position_at(range.end);
        Span::new(start, end, self.file_id)
    }

    /// Drains the stream. The last token is always `Eof` on success.
    pub fn collect_tokens(self) -> Result<Vec<Token<'src>>, LexError> {
        self.collect()
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Result<Token<'src>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            let Some(result) = self.inner.next() else {
                self.finished = true;
                let end = self.position_at(self.source.len());
                let span = Span::point(end, self.file_id);
                return Some(Ok(Token::new(TokenKind::Eof, "", span)));
            };

            let range = self.inner.span();
            let span = self.make_span(range.clone());

            match result {
                Ok(kind) if kind.is_trivia() => continue,
                Ok(kind) => {
                    let text = &self.source[range];
                    return Some(Ok(Token::new(kind, text, span)));
                }
                Err(kind) => {
                    self.finished = true;
                    let kind = match kind {
                        LexErrorKind::Unrecognized => {
                            let ch = self.source.get(range.start..).and_then(|s| s.chars().next());
                            LexErrorKind::IllegalCharacter(ch.unwrap_or('\0'))
                        }
                        other => other,
                    };
                    tracing::debug!(error = %kind, offset = range.start, "lexing stopped");
                    return Some(Err(LexError::new(kind, span)));
                }
            }
        }
    }
}

impl std::iter::FusedIterator for Lexer<'_> {}

/// Lazily tokenizes `source`
pub fn tokenize(source: &str, file_id: u32) -> Lexer<'_> {
    Lexer::new(source, file_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source, 0)
            .map(|t| t.expect("lexing failed").kind)
            .collect()
    }

    fn lex_error(source: &str) -> LexError {
        tokenize(source, 0)
            .find_map(|t| t.err())
            .expect("expected a lex error")
    }

    #[test]
    fn test_keywords_and_names() {
        assert_eq!(
            kinds("global struct var return if else for while new length int bool string void true false null"),
            vec![
                TokenKind::Global,
                TokenKind::Struct,
                TokenKind::Var,
                TokenKind::Return,
                TokenKind::If,
                TokenKind::Else,
                TokenKind::For,
                TokenKind::While,
                TokenKind::New,
                TokenKind::Length,
                TokenKind::Int,
                TokenKind::Bool,
                TokenKind::String,
                TokenKind::Void,
                TokenKind::True,
                TokenKind::False,
                TokenKind::Null,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_identifier_vs_struct_name() {
        assert_eq!(
            kinds("foo Foo _tmp integer Int nullable x1"),
            vec![
                TokenKind::Ident,
                TokenKind::StructName,
                TokenKind::Ident,
                TokenKind::Ident,
                TokenKind::StructName,
                TokenKind::Ident,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_signed_literal_is_one_token() {
        let tokens: Vec<_> = tokenize("-5 -x 0x1F -0xff", 0)
            .map(|t| t.unwrap())
            .collect();
        assert_eq!(tokens[0].kind, TokenKind::IntLit);
        assert_eq!(tokens[0].text, "-5");
        assert_eq!(tokens[1].kind, TokenKind::Minus);
        assert_eq!(tokens[2].kind, TokenKind::Ident);
        assert_eq!(tokens[3].text, "0x1F");
        assert_eq!(tokens[4].text, "-0xff");
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("* + - << >> >>> < <= > >= == != & | [&] [|] ! ~ -> ? [] [ ]"),
            vec![
                TokenKind::Star,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Shl,
                TokenKind::Shr,
                TokenKind::Sar,
                TokenKind::Lt,
                TokenKind::Le,
                TokenKind::Gt,
                TokenKind::Ge,
                TokenKind::EqEq,
                TokenKind::Ne,
                TokenKind::Amp,
                TokenKind::Pipe,
                TokenKind::BitAnd,
                TokenKind::BitOr,
                TokenKind::Bang,
                TokenKind::Tilde,
                TokenKind::Arrow,
                TokenKind::Question,
                TokenKind::Brackets,
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_strings_keep_escapes_opaque() {
        let tokens: Vec<_> = tokenize(r#""a\"b" "\q""#, 0).map(|t| t.unwrap()).collect();
        assert_eq!(tokens[0].kind, TokenKind::StringLit);
        assert_eq!(tokens[0].text, r#""a\"b""#);
        assert_eq!(tokens[1].text, r#""\q""#);
    }

    #[test]
    fn test_comments_are_trivia() {
        assert_eq!(
            kinds("x // line\n/* block * with stars **/ y /**/ z"),
            vec![TokenKind::Ident, TokenKind::Ident, TokenKind::Ident, TokenKind::Eof]
        );
    }

    #[test]
    fn test_block_comment_is_non_greedy() {
        assert_eq!(
            kinds("/* a */ x /* b */"),
            vec![TokenKind::Ident, TokenKind::Eof]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let err = lex_error("var s = \"abc\nvar t = 1;");
        assert_eq!(err.kind, LexErrorKind::UnterminatedString);
        assert_eq!(err.span.start.column, 9);

        assert_eq!(lex_error("\"abc").kind, LexErrorKind::UnterminatedString);
    }

    #[test]
    fn test_unterminated_block_comment() {
        let err = lex_error("x /* never closed");
        assert_eq!(err.kind, LexErrorKind::UnterminatedComment);
        assert_eq!(err.span.start.offset, 2);
    }

    #[test]
    fn test_illegal_character() {
        let err = lex_error("var x = 1 $ 2;");
        assert_eq!(err.kind, LexErrorKind::IllegalCharacter('$'));
        assert_eq!(err.span.start.column, 11);
    }

    #[test]
    fn test_stream_is_fused_after_error() {
        let mut lexer = tokenize("a # b c", 0);
        assert!(lexer.next().unwrap().is_ok());
        assert!(lexer.next().unwrap().is_err());
        assert!(lexer.next().is_none());
        assert!(lexer.next().is_none());
    }

    #[test]
    fn test_spans_track_lines_and_columns() {
        let tokens = tokenize("int x;\n  x = 10;", 0).collect_tokens().unwrap();
        let ten = tokens.iter().find(|t| t.text == "10").unwrap();
        assert_eq!(ten.span.start, Position::new(2, 7, 13));
        assert_eq!(ten.span.end, Position::new(2, 9, 15));

        let eof = tokens.last().unwrap();
        assert!(eof.is_eof());
        assert_eq!(eof.span.start.offset, 16);
    }
}
