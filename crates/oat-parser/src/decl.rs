//! Top-level declarations: globals, functions and (v2) structs

use crate::ast::*;
use crate::parser::{PResult, Parser};
use oat_lexer::TokenKind;

impl<'src> Parser<'src> {
    pub(crate) fn parse_declaration(&mut self) -> PResult<Decl> {
        match self.peek_kind() {
            TokenKind::Global => self.parse_global().map(Decl::Global),
            TokenKind::Struct => self.parse_struct().map(Decl::Struct),
            TokenKind::Void
            | TokenKind::Int
            | TokenKind::Bool
            | TokenKind::String
            | TokenKind::StructName
            | TokenKind::LParen => self.parse_function().map(Decl::Function),
            _ => {
                self.error_expected("declaration");
                Err(())
            }
        }
    }

    /// `global name = gexp;`
    fn parse_global(&mut self) -> PResult<GlobalDecl> {
        let keyword = self.advance();
        let name = self.expect_ident("global name")?;
        self.expect(TokenKind::Eq, "`=` after global name")?;
        let init = self.parse_gexp()?;
        self.expect(TokenKind::Semi, "`;` after global initializer")?;

        tracing::trace!(name = name.text, "global");
        Ok(GlobalDecl {
            name: name.text.to_string(),
            init,
            span: self.span_from(keyword.span),
        })
    }

    /// `retty name(T a, U b) { ... }`
    fn parse_function(&mut self) -> PResult<FnDecl> {
        let start = self.peek().span;
        let ret = self.parse_ret_type()?;
        let name = self.expect_ident("function name")?;
        let open = self.expect(TokenKind::LParen, "`(` after function name")?;

        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                let param_start = self.peek().span;
                let ty = self.parse_type()?;
                let param = self.expect_ident("parameter name")?;
                params.push(Param {
                    ty,
                    name: param.text.to_string(),
                    span: self.span_from(param_start),
                });
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect_closing(open, TokenKind::RParen)?;
        let body = self.parse_block()?;

        tracing::trace!(name = name.text, params = params.len(), "function");
        Ok(FnDecl {
            ret,
            name: name.text.to_string(),
            params,
            body,
            span: self.span_from(start),
        })
    }

    /// `struct Name { T a; U b }`; a trailing `;` is accepted
    fn parse_struct(&mut self) -> PResult<StructDecl> {
        let keyword = self.advance();
        self.require_v2("struct declaration", keyword.span)?;
        let name = self.expect(TokenKind::StructName, "struct name")?;
        let open = self.expect(TokenKind::LBrace, "`{` after struct name")?;

        let mut fields = Vec::new();
        while !self.check(TokenKind::RBrace) {
            let field_start = self.peek().span;
            let ty = self.parse_type()?;
            let field = self.expect_ident("field name")?;
            fields.push(FieldDecl {
                ty,
                name: field.text.to_string(),
                span: self.span_from(field_start),
            });
            if !self.match_token(TokenKind::Semi) {
                break;
            }
        }
        self.expect_closing(open, TokenKind::RBrace)?;

        tracing::trace!(name = name.text, fields = fields.len(), "struct");
        Ok(StructDecl {
            name: name.text.to_string(),
            fields,
            span: self.span_from(keyword.span),
        })
    }
}
