//! Statement grammar
//!
//! A failed statement is skipped by `synchronize_statement`, so one bad
//! statement costs exactly one diagnostic and its block keeps parsing.

use crate::ast::*;
use crate::dialect::ForInits;
use crate::parser::{PResult, Parser};
use oat_error::{Diagnostic, SyntaxError, SyntaxErrorKind};
use oat_lexer::{Token, TokenKind};

impl<'src> Parser<'src> {
    pub(crate) fn parse_statement(&mut self) -> PResult<Stmt> {
        match self.peek_kind() {
            TokenKind::Var => {
                let decl = self.parse_var_decl()?;
                self.expect(TokenKind::Semi, "`;` after variable declaration")?;
                let span = self.span_from(decl.span);
                Ok(Stmt::new(StmtKind::Decl(decl), span))
            }
            TokenKind::Return => self.parse_return(),
            TokenKind::If => self.parse_if(),
            TokenKind::For => self.parse_for(),
            TokenKind::While => self.parse_while(),
            _ => self.parse_simple_statement(),
        }
    }

    /// `var name = init`, without the terminator
    fn parse_var_decl(&mut self) -> PResult<VarDecl> {
        let keyword = self.expect(TokenKind::Var, "`var`")?;
        let name = self.expect_ident("variable name")?;
        self.expect(TokenKind::Eq, "`=` after variable name")?;
        let init = self.parse_expression()?;
        Ok(VarDecl {
            name: name.text.to_string(),
            init,
            span: self.span_from(keyword.span),
        })
    }

    fn parse_return(&mut self) -> PResult<Stmt> {
        let keyword = self.advance();
        let value = if self.check(TokenKind::Semi) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::Semi, "`;` after return")?;
        Ok(Stmt::new(StmtKind::Return(value), self.span_from(keyword.span)))
    }

    /// Assignment or call statement
    fn parse_simple_statement(&mut self) -> PResult<Stmt> {
        let target = self.parse_expression()?;

        if self.match_token(TokenKind::Eq) {
            let value = self.parse_expression()?;
            self.expect(TokenKind::Semi, "`;` after assignment")?;
            let span = self.span_from(target.span);
            return Ok(Stmt::new(StmtKind::Assign { lhs: target, rhs: value }, span));
        }

        if target.is_call() {
            self.expect(TokenKind::Semi, "`;` after call")?;
            let span = self.span_from(target.span);
            return Ok(Stmt::new(StmtKind::Call(target), span));
        }

        self.error_expected("`=` or a call");
        Err(())
    }

    fn parse_if(&mut self) -> PResult<Stmt> {
        let keyword = self.advance();
        if self.check(TokenKind::Question) {
            return self.parse_if_cast(keyword);
        }

        let open = self.expect(TokenKind::LParen, "`(` after `if`")?;
        let cond = self.parse_expression()?;
        self.expect_closing(open, TokenKind::RParen)?;
        let then = self.parse_block()?;
        let otherwise = self.parse_else()?;

        Ok(Stmt::new(
            StmtKind::If {
                cond,
                then,
                otherwise,
            },
            self.span_from(keyword.span),
        ))
    }

    /// `if? (R name = e) { ... } [else ...]`, at the `?`
    fn parse_if_cast(&mut self, keyword: Token<'src>) -> PResult<Stmt> {
        let question = self.advance();
        if self.require_v2("`if?`", keyword.span.merge(question.span)).is_err() {
            self.skip_if_remains();
            return Err(());
        }

        let open = self.expect(TokenKind::LParen, "`(` after `if?`")?;
        let ty_start = self.peek().span;
        let ty = self.parse_type()?;
        if !ty.is_reference() {
            let message = format!("`if?` needs a reference type, found `{ty}`");
            self.error(SyntaxErrorKind::MalformedType(message), self.span_from(ty_start));
            return Err(());
        }
        let name = self.expect_ident("variable name")?;
        self.expect(TokenKind::Eq, "`=` after variable name")?;
        let scrutinee = self.parse_expression()?;
        self.expect_closing(open, TokenKind::RParen)?;
        let then = self.parse_block()?;
        let otherwise = self.parse_else()?;

        Ok(Stmt::new(
            StmtKind::IfCast {
                ty,
                name: name.text.to_string(),
                scrutinee,
                then,
                otherwise,
            },
            self.span_from(keyword.span),
        ))
    }

    /// Skips the header, body and `else` chain of a rejected `if`
    fn skip_if_remains(&mut self) {
        self.skip_group();
        self.skip_group();
        while self.match_token(TokenKind::Else) {
            if self.match_token(TokenKind::If) {
                self.match_token(TokenKind::Question);
                self.skip_group();
            }
            self.skip_group();
        }
        self.mark_recovered();
    }

    /// Skips one balanced `( ... )`, `[ ... ]` or `{ ... }` group
    fn skip_group(&mut self) {
        if !matches!(
            self.peek_kind(),
            TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace
        ) {
            return;
        }

        let mut depth = 0usize;
        loop {
            match self.peek_kind() {
                TokenKind::Eof => return,
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        return;
                    }
                }
                _ => {}
            }
            self.advance();
        }
    }

    fn parse_else(&mut self) -> PResult<Option<Else>> {
        if !self.match_token(TokenKind::Else) {
            return Ok(None);
        }
        if self.check(TokenKind::If) {
            let chained = self.parse_if()?;
            return Ok(Some(Else::If(Box::new(chained))));
        }
        self.parse_block().map(|block| Some(Else::Block(block)))
    }

    /// `for (inits; cond; step) { ... }`; the step carries its own `;`
    fn parse_for(&mut self) -> PResult<Stmt> {
        let keyword = self.advance();
        let open = self.expect(TokenKind::LParen, "`(` after `for`")?;

        let mut inits = Vec::new();
        if self.check(TokenKind::Var) {
            loop {
                inits.push(self.parse_var_decl()?);
                if !self.check(TokenKind::Comma) {
                    break;
                }
                if self.options.for_inits == ForInits::Single {
                    let comma = self.peek();
                    let kind = SyntaxErrorKind::UnexpectedToken {
                        expected: "`;` after the loop variable".into(),
                        found: comma.describe(),
                    };
                    self.push_diagnostic(
                        Diagnostic::from(SyntaxError::new(kind, comma.span))
                            .with_note("multiple `for` initializers are disabled"),
                    );
                }
                self.advance();
            }
        }
        self.expect(TokenKind::Semi, "`;` after loop initializers")?;

        let cond = if self.check(TokenKind::Semi) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::Semi, "`;` after loop condition")?;

        let step = if self.check(TokenKind::RParen) {
            None
        } else {
            Some(Box::new(self.parse_statement()?))
        };
        self.expect_closing(open, TokenKind::RParen)?;
        let body = self.parse_block()?;

        Ok(Stmt::new(
            StmtKind::For {
                inits,
                cond,
                step,
                body,
            },
            self.span_from(keyword.span),
        ))
    }

    fn parse_while(&mut self) -> PResult<Stmt> {
        let keyword = self.advance();
        let open = self.expect(TokenKind::LParen, "`(` after `while`")?;
        let cond = self.parse_expression()?;
        self.expect_closing(open, TokenKind::RParen)?;
        let body = self.parse_block()?;

        Ok(Stmt::new(
            StmtKind::While { cond, body },
            self.span_from(keyword.span),
        ))
    }

    /// `{ stmt* }`, recovering between statements
    pub(crate) fn parse_block(&mut self) -> PResult<Block> {
        self.nested(|p| p.parse_block_body())
    }

    fn parse_block_body(&mut self) -> PResult<Block> {
        let open = self.expect(TokenKind::LBrace, "`{`")?;
        let mut stmts = Vec::new();

        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            let start = self.checkpoint();
            match self.parse_statement() {
                Ok(stmt) => stmts.push(stmt),
                Err(()) => self.synchronize_statement(start),
            }
        }
        self.expect_closing(open, TokenKind::RBrace)?;

        Ok(Block {
            stmts,
            span: self.span_from(open.span),
        })
    }
}
