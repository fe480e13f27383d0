//! Parser for the Oat language
//!
//! Recursive descent over a lazily filled token buffer. Expressions use
//! precedence climbing (`expr.rs`), types have their own grammar
//! (`types.rs`), statements and declarations recover from errors at
//! their own granularity (`stmt.rs`, `decl.rs`).

use crate::ast::*;
use crate::dialect::{Dialect, ParseOptions};
use oat_error::span::Position;
use oat_error::{Diagnostic, Diagnostics, LexError, Span, SyntaxError, SyntaxErrorKind};
use oat_lexer::{Lexer, Token, TokenKind};
use std::collections::VecDeque;

/// Errors are reported into `Parser::diagnostics` before `Err(())` is returned
pub(crate) type PResult<T> = Result<T, ()>;

/// Deepest nesting of expressions, types and blocks the parser accepts
pub const MAX_NESTING: usize = 128;

/// A delimiter consumed but not yet closed
#[derive(Debug, Clone, Copy)]
struct OpenDelim {
    kind: TokenKind,
    /// `(` directly after `for`, whose contents are separated by `;`
    for_header: bool,
}

/// Where a statement or declaration started, for recovery
#[derive(Debug, Clone, Copy)]
pub(crate) struct Checkpoint {
    consumed: usize,
    depth: usize,
}

/// Look-ahead buffer over the lexer
struct TokenStream<'src> {
    lexer: Lexer<'src>,
    buffer: VecDeque<Token<'src>>,
    /// Returned once the lexer is exhausted or has failed
    eof: Token<'src>,
    exhausted: bool,
    lex_error: Option<LexError>,
    /// Number of tokens handed out by `bump`
    consumed: usize,
    /// Kind of the last token handed out
    last: TokenKind,
    open: Vec<OpenDelim>,
}

impl<'src> TokenStream<'src> {
    fn new(lexer: Lexer<'src>, file_id: u32) -> Self {
        Self {
            lexer,
            buffer: VecDeque::new(),
            eof: Token::new(TokenKind::Eof, "", Span::point(Position::start(), file_id)),
            exhausted: false,
            lex_error: None,
            consumed: 0,
            last: TokenKind::Eof,
            open: Vec::new(),
        }
    }

    fn fill(&mut self, n: usize) {
        while self.buffer.len() <= n && !self.exhausted {
            match self.lexer.next() {
                Some(Ok(token)) if token.is_eof() => {
                    self.eof = token;
                    self.exhausted = true;
                }
                Some(Ok(token)) => self.buffer.push_back(token),
                Some(Err(err)) => {
                    // Everything past a lex error is unreliable: end the stream there
                    let at = Span::point(err.span.start, err.span.file_id);
                    self.eof = Token::new(TokenKind::Eof, "", at);
                    self.lex_error = Some(err);
                    self.exhausted = true;
                }
                None => self.exhausted = true,
            }
        }
    }

    fn peek_nth(&mut self, n: usize) -> Token<'src> {
        self.fill(n);
        self.buffer.get(n).copied().unwrap_or(self.eof)
    }

    fn bump(&mut self) -> Token<'src> {
        self.fill(0);
        match self.buffer.pop_front() {
            Some(token) => {
                self.consumed += 1;
                self.track(token.kind);
                token
            }
            None => self.eof,
        }
    }

    /// Keeps `open` in step with the consumed delimiters
    fn track(&mut self, kind: TokenKind) {
        match kind {
            TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => {
                let for_header = kind == TokenKind::LParen && self.last == TokenKind::For;
                self.open.push(OpenDelim { kind, for_header });
            }
            TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                // A closer also ends the groups left unclosed inside its own
                if let Some(at) = self.open.iter().rposition(|d| closer_of(d.kind) == kind) {
                    self.open.truncate(at);
                }
            }
            _ => {}
        }
        self.last = kind;
    }

    /// Replaces the front token by `first` followed by `second`
    fn split_front(&mut self, first: Token<'src>, second: Token<'src>) {
        self.buffer.pop_front();
        self.buffer.push_front(second);
        self.buffer.push_front(first);
    }
}

/// Parser for the Oat language
pub struct Parser<'src> {
    tokens: TokenStream<'src>,
    pub(crate) options: ParseOptions,
    diagnostics: Diagnostics,
    /// Span of the most recently consumed token
    prev_span: Span,
    /// Set when a construct already skipped its own remains after an error
    recovered: bool,
    /// Current depth of `nested` calls
    nesting: usize,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str, file_id: u32, options: impl Into<ParseOptions>) -> Self {
        let tokens = TokenStream::new(Lexer::new(source, file_id), file_id);
        let prev_span = tokens.eof.span;
        Self {
            tokens,
            options: options.into(),
            diagnostics: Diagnostics::new(),
            prev_span,
            recovered: false,
            nesting: 0,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.options.dialect
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Consumes the diagnostics; a lex error, if any, comes last
    pub fn take_diagnostics(&mut self) -> Diagnostics {
        if let Some(err) = self.tokens.lex_error.take() {
            self.diagnostics.push(err);
        }
        std::mem::take(&mut self.diagnostics)
    }

    // =========================================
    // Helpers
    // =========================================

    pub(crate) fn peek(&mut self) -> Token<'src> {
        self.tokens.peek_nth(0)
    }

    pub(crate) fn peek_kind(&mut self) -> TokenKind {
        self.tokens.peek_nth(0).kind
    }

    pub(crate) fn peek_nth_kind(&mut self, n: usize) -> TokenKind {
        self.tokens.peek_nth(n).kind
    }

    pub(crate) fn check(&mut self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    pub(crate) fn is_at_end(&mut self) -> bool {
        self.check(TokenKind::Eof)
    }

    pub(crate) fn advance(&mut self) -> Token<'src> {
        let token = self.tokens.bump();
        if !token.is_eof() {
            self.prev_span = token.span;
        }
        token
    }

    pub(crate) fn previous_span(&self) -> Span {
        self.prev_span
    }

    /// Span from `start` up to the last consumed token
    pub(crate) fn span_from(&self, start: Span) -> Span {
        start.merge(self.prev_span)
    }

    pub(crate) fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Requires a specific token or reports that `what` was expected
    pub(crate) fn expect(&mut self, kind: TokenKind, what: &str) -> PResult<Token<'src>> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            self.error_expected(what);
            Err(())
        }
    }

    pub(crate) fn expect_ident(&mut self, what: &str) -> PResult<Token<'src>> {
        self.expect(TokenKind::Ident, what)
    }

    /// Requires the delimiter closing `open`
    pub(crate) fn expect_closing(&mut self, open: Token<'src>, close: TokenKind) -> PResult<Token<'src>> {
        if self.check(close) {
            return Ok(self.advance());
        }

        let found = self.peek();
        if found.kind.is_closing_delimiter() {
            let kind = SyntaxErrorKind::MismatchedDelimiter {
                open: delimiter_char(open.kind),
                expected: delimiter_char(close),
                found: found.describe(),
            };
            if self.should_report(found.span) {
                let diagnostic = Diagnostic::from(SyntaxError::new(kind, found.span))
                    .with_secondary_label(open.span, "unclosed delimiter");
                self.diagnostics.push(diagnostic);
            }
        } else {
            self.error_expected(close.describe());
        }
        Err(())
    }

    /// Syntax errors at or after a lex error are artifacts of the truncated stream
    fn should_report(&self, span: Span) -> bool {
        match &self.tokens.lex_error {
            Some(err) => span.start.offset < err.span.start.offset,
            None => true,
        }
    }

    pub(crate) fn error(&mut self, kind: SyntaxErrorKind, span: Span) {
        if self.should_report(span) {
            self.diagnostics.push(SyntaxError::new(kind, span));
        }
    }

    pub(crate) fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        let reportable = diagnostic
            .primary_span()
            .map_or(true, |span| self.should_report(span));
        if reportable {
            self.diagnostics.push(diagnostic);
        }
    }

    /// Reports that `what` was expected at the current token.
    ///
    /// When the current token is a separator or closer, the construct is
    /// missing: the error points right after the previous token.
    pub(crate) fn error_expected(&mut self, what: &str) {
        let found = self.peek();
        let boundary = matches!(
            found.kind,
            TokenKind::Semi
                | TokenKind::Comma
                | TokenKind::RParen
                | TokenKind::RBrace
                | TokenKind::RBracket
                | TokenKind::Eof
        );

        if !self.should_report(found.span) {
            return;
        }

        let diagnostic = if boundary && self.tokens.consumed > 0 {
            let kind = SyntaxErrorKind::MissingToken {
                expected: what.to_string(),
                found: found.describe(),
            };
            Diagnostic::from(SyntaxError::new(kind, self.prev_span.after()))
                .with_secondary_label(found.span, "found here")
        } else {
            let kind = SyntaxErrorKind::UnexpectedToken {
                expected: what.to_string(),
                found: found.describe(),
            };
            Diagnostic::from(SyntaxError::new(kind, found.span))
        };
        self.diagnostics.push(diagnostic);
    }

    /// Fails with `NotInDialect` unless parsing v2
    pub(crate) fn require_v2(&mut self, construct: &str, span: Span) -> PResult<()> {
        if self.options.dialect.is_v2() {
            return Ok(());
        }
        self.error(
            SyntaxErrorKind::NotInDialect {
                construct: construct.to_string(),
                dialect: self.options.dialect.to_string(),
            },
            span,
        );
        Err(())
    }

    /// Splits a leading negative literal into `-` and its magnitude.
    /// Used where a binary operator is expected: `a -1` is `a - 1`.
    pub(crate) fn split_negative_literal(&mut self) {
        let token = self.peek();
        if token.kind != TokenKind::IntLit || !token.text.starts_with('-') {
            return;
        }

        let span = token.span;
        let mid = Position::new(span.start.line, span.start.column + 1, span.start.offset + 1);
        let minus = Token::new(TokenKind::Minus, &token.text[..1], Span::new(span.start, mid, span.file_id));
        let literal = Token::new(TokenKind::IntLit, &token.text[1..], Span::new(mid, span.end, span.file_id));
        self.tokens.split_front(minus, literal);
    }

    /// Whether the parenthesized group at the cursor is a type rather than
    /// an expression: its closing `)` is followed by `->`, `null`, `[]` or `?`.
    pub(crate) fn paren_starts_type(&mut self) -> bool {
        let mut depth = 0usize;
        let mut n = 0usize;
        loop {
            match self.peek_nth_kind(n) {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        break;
                    }
                }
                TokenKind::Eof => return false,
                _ => {}
            }
            n += 1;
        }
        matches!(
            self.peek_nth_kind(n + 1),
            TokenKind::Arrow | TokenKind::Null | TokenKind::Brackets | TokenKind::Question
        )
    }

    pub(crate) fn consumed(&self) -> usize {
        self.tokens.consumed
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            consumed: self.tokens.consumed,
            depth: self.tokens.open.len(),
        }
    }

    /// Runs `f` one nesting level deeper, failing past `MAX_NESTING`
    pub(crate) fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.nesting >= MAX_NESTING {
            let span = self.peek().span;
            self.error(SyntaxErrorKind::NestingTooDeep(MAX_NESTING), span);
            return Err(());
        }
        self.nesting += 1;
        let result = f(self);
        self.nesting -= 1;
        result
    }

    /// Marks that the failed construct already skipped its own tokens
    pub(crate) fn mark_recovered(&mut self) {
        self.recovered = true;
    }

    // =========================================
    // Error recovery
    // =========================================

    /// Whether the `{` at the cursor opens an array, struct or generator
    /// literal rather than a block
    fn brace_opens_literal(&mut self) -> bool {
        match self.tokens.last {
            TokenKind::Brackets | TokenKind::StructName => true,
            TokenKind::RBracket => {
                self.peek_nth_kind(1) == TokenKind::Ident && self.peek_nth_kind(2) == TokenKind::Arrow
            }
            _ => false,
        }
    }

    /// Skips what is left of the delimiter groups opened since `start`.
    ///
    /// A group that was never closed ends where its contents cannot go on:
    /// at a `;` outside braces and `for` headers, at a block's `{`, at a
    /// closer of another kind, or, between declarations, at `global` or
    /// `struct`.
    fn close_groups(&mut self, start: Checkpoint, at_declaration: bool) {
        while self.tokens.open.len() > start.depth {
            let Some(top) = self.tokens.open.last().copied() else {
                break;
            };
            let unclosed = match self.peek_kind() {
                TokenKind::Eof => return,
                TokenKind::Global | TokenKind::Struct if at_declaration => {
                    self.tokens.open.truncate(start.depth);
                    return;
                }
                TokenKind::Semi => top.kind != TokenKind::LBrace && !top.for_header,
                TokenKind::LBrace => top.kind != TokenKind::LBrace && !self.brace_opens_literal(),
                kind if kind.is_closing_delimiter() => kind != closer_of(top.kind),
                _ => false,
            };
            if unclosed {
                self.tokens.open.pop();
            } else {
                self.advance();
            }
        }
    }

    /// Skips to the next statement boundary: past a `;` or a balanced `}`
    /// at the depth the statement started at, or up to the `}` closing
    /// the block.
    pub(crate) fn synchronize_statement(&mut self, start: Checkpoint) {
        if std::mem::take(&mut self.recovered) {
            return;
        }

        self.close_groups(start, false);
        let mut depth = 0usize;
        loop {
            match self.peek_kind() {
                TokenKind::Eof => break,
                TokenKind::RBrace if depth == 0 => break,
                TokenKind::Semi if depth == 0 => {
                    self.advance();
                    break;
                }
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::RParen | TokenKind::RBracket => {
                    depth = depth.saturating_sub(1);
                    self.advance();
                }
                TokenKind::RBrace => {
                    depth -= 1;
                    self.advance();
                    if depth == 0 {
                        break;
                    }
                }
                _ => {
                    self.advance();
                }
            }
        }

        if self.consumed() == start.consumed && !self.is_at_end() {
            self.advance();
        }
        tracing::trace!(resume_at = self.peek().span.start.offset, "statement recovery");
    }

    /// Skips to the next declaration boundary: a `global`/`struct` keyword
    /// at depth zero, or past a `;` or balanced `}` at depth zero.
    pub(crate) fn synchronize_declaration(&mut self, start: Checkpoint) {
        if std::mem::take(&mut self.recovered) {
            return;
        }

        let inside = self.tokens.open.len() > start.depth;
        self.close_groups(start, true);
        // The failed declaration's own braces just closed
        if inside && self.tokens.last == TokenKind::RBrace {
            self.match_token(TokenKind::Semi);
            tracing::trace!(resume_at = self.peek().span.start.offset, "declaration recovery");
            return;
        }

        let mut depth = 0usize;
        loop {
            match self.peek_kind() {
                TokenKind::Eof => break,
                TokenKind::Global | TokenKind::Struct if depth == 0 => break,
                TokenKind::Semi if depth == 0 => {
                    self.advance();
                    break;
                }
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::RParen | TokenKind::RBracket => {
                    depth = depth.saturating_sub(1);
                    self.advance();
                }
                TokenKind::RBrace => {
                    depth = depth.saturating_sub(1);
                    self.advance();
                    if depth == 0 {
                        break;
                    }
                }
                _ => {
                    self.advance();
                }
            }
        }

        if self.consumed() == start.consumed && !self.is_at_end() {
            self.advance();
        }
        tracing::trace!(resume_at = self.peek().span.start.offset, "declaration recovery");
    }

    // =========================================
    // Main parsing
    // =========================================

    /// Parses declarations until end of input
    pub fn parse_program(&mut self) -> Program {
        tracing::debug!(dialect = %self.options.dialect, "parsing program");
        let mut decls = Vec::new();

        while !self.is_at_end() {
            let start = self.checkpoint();
            match self.parse_declaration() {
                Ok(decl) => decls.push(decl),
                Err(()) => self.synchronize_declaration(start),
            }
        }

        tracing::debug!(
            decls = decls.len(),
            errors = self.diagnostics.len(),
            "parsed program"
        );
        Program { decls }
    }

    /// Parses statements until end of input, recovering between them
    pub fn parse_statements(&mut self) -> Vec<Stmt> {
        let mut stmts = Vec::new();

        while !self.is_at_end() {
            let start = self.checkpoint();
            match self.parse_statement() {
                Ok(stmt) => stmts.push(stmt),
                Err(()) => self.synchronize_statement(start),
            }
        }

        stmts
    }

    /// Runs `f` and requires the whole input to be consumed
    fn parse_complete<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> oat_error::Result<T> {
        let result = f(self);
        if result.is_ok() && !self.is_at_end() {
            self.error_expected("end of input");
        }

        let diagnostics = self.take_diagnostics();
        match (result, diagnostics.into_iter().next()) {
            (Ok(value), None) => Ok(value),
            (_, Some(first)) => Err(first),
            (Err(()), None) => Err(Diagnostic::error("parse failed")),
        }
    }
}

fn closer_of(open: TokenKind) -> TokenKind {
    match open {
        TokenKind::LParen => TokenKind::RParen,
        TokenKind::LBracket => TokenKind::RBracket,
        _ => TokenKind::RBrace,
    }
}

fn delimiter_char(kind: TokenKind) -> char {
    match kind {
        TokenKind::LParen => '(',
        TokenKind::RParen => ')',
        TokenKind::LBrace => '{',
        TokenKind::RBrace => '}',
        TokenKind::LBracket => '[',
        TokenKind::RBracket => ']',
        _ => '?',
    }
}

// =========================================
// Entry points
// =========================================

/// Parses a whole program
pub fn parse(source: &str, options: impl Into<ParseOptions>) -> (Program, Diagnostics) {
    parse_file(source, 0, options)
}

/// Parses a whole program whose spans refer to `file_id`
pub fn parse_file(source: &str, file_id: u32, options: impl Into<ParseOptions>) -> (Program, Diagnostics) {
    let mut parser = Parser::new(source, file_id, options);
    let program = parser.parse_program();
    (program, parser.take_diagnostics())
}

/// Parses a sequence of statements, as found inside a block
pub fn parse_statements(source: &str, options: impl Into<ParseOptions>) -> (Vec<Stmt>, Diagnostics) {
    let mut parser = Parser::new(source, 0, options);
    let stmts = parser.parse_statements();
    (stmts, parser.take_diagnostics())
}

/// Parses exactly one type
pub fn parse_type(source: &str, options: impl Into<ParseOptions>) -> oat_error::Result<Type> {
    Parser::new(source, 0, options).parse_complete(|p| p.parse_type())
}

/// Parses exactly one expression
pub fn parse_expression(source: &str, options: impl Into<ParseOptions>) -> oat_error::Result<Expr> {
    Parser::new(source, 0, options).parse_complete(|p| p.parse_expression())
}

/// Parses exactly one global initializer
pub fn parse_global_expression(source: &str, options: impl Into<ParseOptions>) -> oat_error::Result<Expr> {
    Parser::new(source, 0, options).parse_complete(|p| p.parse_gexp())
}
