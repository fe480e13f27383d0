//! Expression grammar
//!
//! Binary operators are parsed by precedence climbing over
//! `BinOp::precedence`. Prefix operators bind tighter than any binary
//! operator; calls, indexing and field access bind tightest.
//!
//! Global initializers use a restricted grammar (`parse_gexp`): literals,
//! identifiers, `T null`, and array/struct literals of global initializers.

use crate::ast::*;
use crate::parser::{PResult, Parser};
use oat_error::{Span, SyntaxErrorKind};
use oat_lexer::{Token, TokenKind};

/// Parser for the elements of a literal: full or global expressions
type ElemParser<'src> = fn(&mut Parser<'src>) -> PResult<Expr>;

fn binary_op(kind: TokenKind) -> Option<BinOp> {
    let op = match kind {
        TokenKind::Star => BinOp::Mul,
        TokenKind::Plus => BinOp::Add,
        TokenKind::Minus => BinOp::Sub,
        TokenKind::Shl => BinOp::Shl,
        TokenKind::Shr => BinOp::Shr,
        TokenKind::Sar => BinOp::Sar,
        TokenKind::Lt => BinOp::Lt,
        TokenKind::Le => BinOp::Le,
        TokenKind::Gt => BinOp::Gt,
        TokenKind::Ge => BinOp::Ge,
        TokenKind::EqEq => BinOp::Eq,
        TokenKind::Ne => BinOp::Neq,
        TokenKind::Amp => BinOp::And,
        TokenKind::Pipe => BinOp::Or,
        TokenKind::BitAnd => BinOp::IAnd,
        TokenKind::BitOr => BinOp::IOr,
        _ => return None,
    };
    Some(op)
}

impl<'src> Parser<'src> {
    pub(crate) fn parse_expression(&mut self) -> PResult<Expr> {
        self.nested(|p| p.parse_binary(0))
    }

    fn parse_binary(&mut self, min_prec: u8) -> PResult<Expr> {
        let mut lhs = self.parse_unary()?;

        loop {
            self.split_negative_literal();
            let Some(op) = binary_op(self.peek_kind()) else {
                break;
            };
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }

            self.advance();
            let rhs = self.parse_binary(prec + 1)?;
            let span = lhs.span.merge(rhs.span);
            lhs = Expr::new(
                ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            );
        }

        Ok(lhs)
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        let op = match self.peek_kind() {
            TokenKind::Minus => UnOp::Neg,
            TokenKind::Bang => UnOp::Not,
            TokenKind::Tilde => UnOp::BitNot,
            _ => return self.parse_postfix(),
        };

        let start = self.advance().span;
        let operand = self.nested(|p| p.parse_unary())?;
        let span = start.merge(operand.span);
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    fn parse_postfix(&mut self) -> PResult<Expr> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.peek_kind() {
                TokenKind::LParen => {
                    let open = self.advance();
                    let args = self.parse_arguments(open)?;
                    let span = self.span_from(expr.span);
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        span,
                    );
                }
                TokenKind::LBracket => {
                    let open = self.advance();
                    let index = self.parse_expression()?;
                    self.expect_closing(open, TokenKind::RBracket)?;
                    let span = self.span_from(expr.span);
                    expr = Expr::new(
                        ExprKind::Index {
                            base: Box::new(expr),
                            index: Box::new(index),
                        },
                        span,
                    );
                }
                TokenKind::Dot => {
                    self.advance();
                    let name = self.expect_ident("field name")?;
                    let span = self.span_from(expr.span);
                    expr = Expr::new(
                        ExprKind::Field {
                            base: Box::new(expr),
                            name: name.text.to_string(),
                        },
                        span,
                    );
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    /// Call arguments after the opening `(`
    fn parse_arguments(&mut self, open: Token<'src>) -> PResult<Vec<Expr>> {
        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect_closing(open, TokenKind::RParen)?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        let token = self.peek();
        match token.kind {
            TokenKind::Ident => {
                self.advance();
                Ok(Expr::new(ExprKind::Id(token.text.to_string()), token.span))
            }
            TokenKind::IntLit | TokenKind::StringLit | TokenKind::True | TokenKind::False => {
                self.parse_literal()
            }
            TokenKind::LParen if self.paren_starts_type() => {
                self.parse_typed_literal(token.span, Parser::parse_expression)
            }
            TokenKind::LParen => {
                let open = self.advance();
                let inner = self.parse_expression()?;
                self.expect_closing(open, TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::Length => self.parse_length(),
            TokenKind::New => self.parse_new(Parser::parse_expression),
            TokenKind::StructName if self.peek_nth_kind(1) == TokenKind::LBrace => {
                self.parse_struct_literal(token.span, Parser::parse_expression)
            }
            TokenKind::Int | TokenKind::Bool | TokenKind::String | TokenKind::StructName => {
                self.parse_typed_literal(token.span, Parser::parse_expression)
            }
            _ => {
                self.error_expected("expression");
                Err(())
            }
        }
    }

    /// Integer, string and boolean literals
    fn parse_literal(&mut self) -> PResult<Expr> {
        let token = self.advance();
        let kind = match token.kind {
            TokenKind::IntLit => ExprKind::Int(self.int_value(token)?),
            // Quotes stripped, escapes kept verbatim
            TokenKind::StringLit => ExprKind::Str(token.text[1..token.text.len() - 1].to_string()),
            TokenKind::True => ExprKind::Bool(true),
            _ => ExprKind::Bool(false),
        };
        Ok(Expr::new(kind, token.span))
    }

    /// Decimal literals must fit `i64`; hex literals are 64-bit patterns
    fn int_value(&mut self, token: Token<'src>) -> PResult<i64> {
        let (negative, digits) = match token.text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, token.text),
        };

        let value = match digits.strip_prefix("0x") {
            Some(hex) => u64::from_str_radix(hex, 16).ok().map(|bits| {
                let value = bits as i64;
                if negative {
                    value.wrapping_neg()
                } else {
                    value
                }
            }),
            None => digits
                .parse::<i128>()
                .ok()
                .map(|magnitude| if negative { -magnitude } else { magnitude })
                .and_then(|value| i64::try_from(value).ok()),
        };

        match value {
            Some(value) => Ok(value),
            None => {
                self.error(SyntaxErrorKind::IntOutOfRange(token.text.to_string()), token.span);
                Err(())
            }
        }
    }

    fn parse_length(&mut self) -> PResult<Expr> {
        let keyword = self.advance();
        self.require_v2("`length`", keyword.span)?;
        let open = self.expect(TokenKind::LParen, "`(` after `length`")?;
        let inner = self.parse_expression()?;
        self.expect_closing(open, TokenKind::RParen)?;
        Ok(Expr::new(
            ExprKind::Length(Box::new(inner)),
            self.span_from(keyword.span),
        ))
    }

    /// A type followed by `null` or, for array types, `{ elems }`
    fn parse_typed_literal(&mut self, start: Span, elem: ElemParser<'src>) -> PResult<Expr> {
        let ty = self.parse_type()?;

        if self.check(TokenKind::Null) {
            let null = self.advance();
            if !ty.is_reference() {
                let message = format!("`null` requires a reference type, found `{ty}`");
                self.error(SyntaxErrorKind::MalformedType(message), start.merge(null.span));
                return Err(());
            }
            return Ok(Expr::new(ExprKind::Null(ty), start.merge(null.span)));
        }

        match ty {
            Type::Array(elem_ty) if self.check(TokenKind::LBrace) => {
                self.parse_array_literal(start, *elem_ty, elem)
            }
            _ => {
                self.error_expected("`null` or an array literal after type");
                Err(())
            }
        }
    }

    /// `{ e1, e2, ... }` of an array literal, at the opening brace
    fn parse_array_literal(&mut self, start: Span, ty: Type, elem: ElemParser<'src>) -> PResult<Expr> {
        let open = self.advance();
        let mut elems = Vec::new();

        if !self.check(TokenKind::RBrace) {
            loop {
                elems.push(elem(self)?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect_closing(open, TokenKind::RBrace)?;

        Ok(Expr::new(ExprKind::ArrayLit { ty, elems }, self.span_from(start)))
    }

    /// `Name{ f = e; g = e }`, at the struct name
    fn parse_struct_literal(&mut self, start: Span, value: ElemParser<'src>) -> PResult<Expr> {
        let name = self.advance();
        // Checked up front, rejected after the closing brace
        let in_dialect = self.require_v2("struct literal", name.span).is_ok();
        let open = self.expect(TokenKind::LBrace, "`{`")?;

        let mut fields: Vec<FieldInit> = Vec::new();
        let mut duplicate = false;

        if !self.check(TokenKind::RBrace) {
            loop {
                let field = self.expect_ident("field name")?;
                self.expect(TokenKind::Eq, "`=` after field name")?;
                let init = value(self)?;

                // Keep going to the closing brace so recovery resumes after the literal
                if fields.iter().any(|f| f.name == field.text) {
                    self.error(SyntaxErrorKind::DuplicateField(field.text.to_string()), field.span);
                    duplicate = true;
                }
                fields.push(FieldInit {
                    name: field.text.to_string(),
                    value: init,
                    span: self.span_from(field.span),
                });

                if !self.match_token(TokenKind::Semi) || self.check(TokenKind::RBrace) {
                    break;
                }
            }
        }
        self.expect_closing(open, TokenKind::RBrace)?;

        if duplicate || !in_dialect {
            return Err(());
        }
        Ok(Expr::new(
            ExprKind::StructLit {
                name: name.text.to_string(),
                fields,
            },
            self.span_from(start),
        ))
    }

    /// `new` forms: array literal, sized array, generator, struct literal
    fn parse_new(&mut self, elem: ElemParser<'src>) -> PResult<Expr> {
        let new = self.advance();

        if self.check(TokenKind::StructName) && self.peek_nth_kind(1) == TokenKind::LBrace {
            return self.parse_struct_literal(new.span, elem);
        }

        let ty = self.parse_type()?;
        match self.peek_kind() {
            TokenKind::LBrace => match ty {
                Type::Array(elem_ty) => self.parse_array_literal(new.span, *elem_ty, elem),
                _ => {
                    self.error_expected("`[` after element type");
                    Err(())
                }
            },
            TokenKind::LBracket => self.parse_sized_array(new.span, ty),
            _ => {
                self.error_expected("`[` or `{` after type");
                Err(())
            }
        }
    }

    /// `new T[size]`, optionally followed by `{ x -> init }`
    fn parse_sized_array(&mut self, start: Span, ty: Type) -> PResult<Expr> {
        let open = self.advance();
        let size = self.parse_expression()?;
        self.expect_closing(open, TokenKind::RBracket)?;

        let is_generator = self.check(TokenKind::LBrace)
            && self.peek_nth_kind(1) == TokenKind::Ident
            && self.peek_nth_kind(2) == TokenKind::Arrow;
        if !is_generator {
            return Ok(Expr::new(
                ExprKind::ArrayNew {
                    ty,
                    size: Box::new(size),
                },
                self.span_from(start),
            ));
        }

        let brace = self.advance();
        let var = self.advance();
        self.advance();
        let init = self.parse_expression()?;
        self.expect_closing(brace, TokenKind::RBrace)?;

        let span = self.span_from(start);
        self.require_v2("array initializer", span)?;
        Ok(Expr::new(
            ExprKind::ArrayGen {
                ty,
                size: Box::new(size),
                var: var.text.to_string(),
                init: Box::new(init),
            },
            span,
        ))
    }

    // =========================================
    // Global initializers
    // =========================================

    pub(crate) fn parse_gexp(&mut self) -> PResult<Expr> {
        self.nested(|p| p.parse_gexp_atom())
    }

    fn parse_gexp_atom(&mut self) -> PResult<Expr> {
        let token = self.peek();
        match token.kind {
            TokenKind::IntLit | TokenKind::StringLit | TokenKind::True | TokenKind::False => {
                self.parse_literal()
            }
            TokenKind::Ident => {
                self.advance();
                Ok(Expr::new(ExprKind::Id(token.text.to_string()), token.span))
            }
            TokenKind::New => {
                let new = self.advance();
                if self.check(TokenKind::StructName) && self.peek_nth_kind(1) == TokenKind::LBrace {
                    return self.parse_struct_literal(new.span, Parser::parse_gexp);
                }
                let ty = self.parse_type()?;
                match ty {
                    Type::Array(elem_ty) if self.check(TokenKind::LBrace) => {
                        self.parse_array_literal(new.span, *elem_ty, Parser::parse_gexp)
                    }
                    _ => {
                        self.error_expected("array literal in global initializer");
                        Err(())
                    }
                }
            }
            TokenKind::StructName if self.peek_nth_kind(1) == TokenKind::LBrace => {
                self.parse_struct_literal(token.span, Parser::parse_gexp)
            }
            TokenKind::Int
            | TokenKind::Bool
            | TokenKind::String
            | TokenKind::StructName
            | TokenKind::LParen => self.parse_typed_literal(token.span, Parser::parse_gexp),
            _ => {
                self.error_expected("global initializer");
                Err(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::dialect::Dialect;
    use crate::parser::{parse_expression, parse_global_expression};
    use oat_error::ErrorCode;
    use pretty_assertions::assert_eq;

    fn expr(source: &str) -> ExprKind {
        parse_expression(source, Dialect::V2)
            .unwrap_or_else(|d| panic!("{source}: {d}"))
            .kind
    }

    fn code(source: &str, dialect: Dialect) -> Option<ErrorCode> {
        parse_expression(source, dialect).unwrap_err().code
    }

    fn binary(kind: &ExprKind) -> (BinOp, &ExprKind, &ExprKind) {
        match kind {
            ExprKind::Binary { op, lhs, rhs } => (*op, &lhs.kind, &rhs.kind),
            other => panic!("expected binary expression, got {:?}", other),
        }
    }

    fn id(name: &str) -> ExprKind {
        ExprKind::Id(name.to_string())
    }

    #[test]
    fn test_multiplication_binds_tighter() {
        let e = expr("1 + 2 * 3");
        let (op, lhs, rhs) = binary(&e);
        assert_eq!(op, BinOp::Add);
        assert_eq!(lhs, &ExprKind::Int(1));
        let (op, lhs, rhs) = binary(rhs);
        assert_eq!(op, BinOp::Mul);
        assert_eq!((lhs, rhs), (&ExprKind::Int(2), &ExprKind::Int(3)));
    }

    #[test]
    fn test_subtraction_is_left_associative() {
        let e = expr("1 - 2 - 3");
        let (op, lhs, rhs) = binary(&e);
        assert_eq!(op, BinOp::Sub);
        assert_eq!(rhs, &ExprKind::Int(3));
        let (op, lhs, rhs) = binary(lhs);
        assert_eq!(op, BinOp::Sub);
        assert_eq!((lhs, rhs), (&ExprKind::Int(1), &ExprKind::Int(2)));
    }

    #[test]
    fn test_precedence_ladder() {
        // [|] < [&] < | < & < == < < < << < + < *
        let e = expr("a [|] b [&] c | d & e == f < g << h + i * j");
        let (op, _, rhs) = binary(&e);
        assert_eq!(op, BinOp::IOr);
        let (op, _, rhs) = binary(rhs);
        assert_eq!(op, BinOp::IAnd);
        let (op, _, rhs) = binary(rhs);
        assert_eq!(op, BinOp::Or);
        let (op, _, rhs) = binary(rhs);
        assert_eq!(op, BinOp::And);
        let (op, _, rhs) = binary(rhs);
        assert_eq!(op, BinOp::Eq);
        let (op, _, rhs) = binary(rhs);
        assert_eq!(op, BinOp::Lt);
        let (op, _, rhs) = binary(rhs);
        assert_eq!(op, BinOp::Shl);
        let (op, _, rhs) = binary(rhs);
        assert_eq!(op, BinOp::Add);
        let (op, lhs, rhs) = binary(rhs);
        assert_eq!(op, BinOp::Mul);
        assert_eq!((lhs, rhs), (&id("i"), &id("j")));
    }

    #[test]
    fn test_unary_binds_tighter_than_binary() {
        let e = expr("-a * b");
        let (op, lhs, _) = binary(&e);
        assert_eq!(op, BinOp::Mul);
        assert!(matches!(lhs, ExprKind::Unary { op: UnOp::Neg, .. }));

        let e = expr("!f(x)");
        match e {
            ExprKind::Unary { op, operand } => {
                assert_eq!(op, UnOp::Not);
                assert!(operand.is_call());
            }
            other => panic!("expected unary, got {:?}", other),
        }
    }

    #[test]
    fn test_postfix_chain() {
        let e = expr("a.b[1](2).c");
        let ExprKind::Field { base, name } = e else {
            panic!("expected field access");
        };
        assert_eq!(name, "c");
        let ExprKind::Call { callee, args } = base.kind else {
            panic!("expected call");
        };
        assert_eq!(args.len(), 1);
        assert!(matches!(callee.kind, ExprKind::Index { .. }));
    }

    #[test]
    fn test_literals() {
        assert_eq!(expr("42"), ExprKind::Int(42));
        assert_eq!(expr("0x1F"), ExprKind::Int(31));
        assert_eq!(expr("-0x10"), ExprKind::Int(-16));
        assert_eq!(expr("-9223372036854775808"), ExprKind::Int(i64::MIN));
        assert_eq!(expr("0xFFFFFFFFFFFFFFFF"), ExprKind::Int(-1));
        assert_eq!(expr(r#""a\nb""#), ExprKind::Str(r"a\nb".into()));
        assert_eq!(expr("true"), ExprKind::Bool(true));
    }

    #[test]
    fn test_int_out_of_range() {
        assert_eq!(code("9223372036854775808", Dialect::V2), Some(ErrorCode::INT_OUT_OF_RANGE));
        assert_eq!(code("0x1FFFFFFFFFFFFFFFF", Dialect::V2), Some(ErrorCode::INT_OUT_OF_RANGE));
    }

    #[test]
    fn test_null_and_array_literals() {
        assert_eq!(expr("Point null"), ExprKind::Null(Type::Struct("Point".into())));
        assert_eq!(expr("string[] null"), ExprKind::Null(Type::array(Type::Str)));
        assert_eq!(code("int null", Dialect::V2), Some(ErrorCode::MALFORMED_TYPE));

        let ExprKind::ArrayLit { ty, elems } = expr("new int[]{1, 2, 3}") else {
            panic!("expected array literal");
        };
        assert_eq!(ty, Type::Int);
        assert_eq!(elems.len(), 3);

        let ExprKind::ArrayLit { ty, elems } = expr("int[][]{}") else {
            panic!("expected array literal");
        };
        assert_eq!(ty, Type::array(Type::Int));
        assert!(elems.is_empty());
    }

    #[test]
    fn test_function_typed_null() {
        assert_eq!(
            expr("(int) -> int null"),
            ExprKind::Null(Type::function(vec![Type::Int], RetTy::Value(Type::Int)))
        );
    }

    #[test]
    fn test_parenthesized_expression() {
        let e = expr("(1 + 2) * 3");
        let (op, lhs, _) = binary(&e);
        assert_eq!(op, BinOp::Mul);
        assert!(matches!(lhs, ExprKind::Binary { op: BinOp::Add, .. }));
    }

    #[test]
    fn test_sized_array_and_generator() {
        let ExprKind::ArrayNew { ty, size } = expr("new int[][n + 1]") else {
            panic!("expected sized array");
        };
        assert_eq!(ty, Type::array(Type::Int));
        assert!(matches!(size.kind, ExprKind::Binary { .. }));

        let ExprKind::ArrayGen { ty, var, init, .. } = expr("new int[3]{i -> i * i}") else {
            panic!("expected generator");
        };
        assert_eq!(ty, Type::Int);
        assert_eq!(var, "i");
        assert!(matches!(init.kind, ExprKind::Binary { op: BinOp::Mul, .. }));
    }

    #[test]
    fn test_generator_rejected_in_v1() {
        assert_eq!(code("new int[3]{i -> i}", Dialect::V1), Some(ErrorCode::NOT_IN_DIALECT));
        assert!(parse_expression("new int[3]", Dialect::V1).is_ok());
    }

    #[test]
    fn test_struct_literal() {
        let ExprKind::StructLit { name, fields } = expr("new Point{x = 1; y = 2}") else {
            panic!("expected struct literal");
        };
        assert_eq!(name, "Point");
        let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y"]);

        assert!(matches!(expr("Point{x = 1;}"), ExprKind::StructLit { .. }));
        assert!(matches!(expr("Empty{}"), ExprKind::StructLit { .. }));
    }

    #[test]
    fn test_duplicate_field_is_reported() {
        let err = parse_expression("Point{x = 1; x = 2}", Dialect::V2).unwrap_err();
        assert_eq!(err.code, Some(ErrorCode::DUPLICATE_FIELD));
        assert!(err.message.contains("`x`"));
        assert_eq!(err.primary_span().unwrap().start.offset, 13);
    }

    #[test]
    fn test_length() {
        assert!(matches!(expr("length(a)"), ExprKind::Length(_)));
        assert_eq!(code("length(a)", Dialect::V1), Some(ErrorCode::NOT_IN_DIALECT));
    }

    #[test]
    fn test_missing_operand() {
        assert_eq!(code("1 +", Dialect::V2), Some(ErrorCode::MISSING_TOKEN));
        assert_eq!(code("f(1,)", Dialect::V2), Some(ErrorCode::MISSING_TOKEN));
    }

    #[test]
    fn test_global_expressions() {
        let gexp = |s: &str| parse_global_expression(s, Dialect::V2).map(|e| e.kind);

        assert_eq!(gexp("42"), Ok(ExprKind::Int(42)));
        assert_eq!(gexp("other"), Ok(ExprKind::Id("other".into())));
        assert_eq!(gexp("string null"), Ok(ExprKind::Null(Type::Str)));
        assert!(matches!(gexp("new int[]{1, 2}"), Ok(ExprKind::ArrayLit { .. })));
        assert!(matches!(gexp("int[]{1, 2}"), Ok(ExprKind::ArrayLit { .. })));
        assert!(matches!(gexp("Point{x = 1; y = 2}"), Ok(ExprKind::StructLit { .. })));

        // Operators, calls and sized arrays need code to run
        assert!(gexp("1 + 2").is_err());
        assert!(gexp("f()").is_err());
        assert!(gexp("new int[3]").is_err());
        assert!(gexp("int[]{1 + 2}").is_err());
    }
}
