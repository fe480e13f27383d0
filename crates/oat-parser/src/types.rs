//! Type grammar
//!
//! ```text
//! type    := atom ( "[]" | "?" )*
//! atom    := "int" | "bool" | "string" | Name
//!          | "(" types ")" "->" retty
//!          | "(" reftype ")"
//! retty   := "void" | type
//! ```

use crate::ast::{RetTy, Type};
use crate::parser::{PResult, Parser};
use oat_error::SyntaxErrorKind;
use oat_lexer::TokenKind;

impl<'src> Parser<'src> {
    /// Parses a type, taking every `[]` and `?` suffix that follows
    pub(crate) fn parse_type(&mut self) -> PResult<Type> {
        self.nested(|p| p.parse_suffixed_type())
    }

    fn parse_suffixed_type(&mut self) -> PResult<Type> {
        let start = self.peek().span;
        let mut ty = self.parse_type_atom()?;

        loop {
            match self.peek_kind() {
                TokenKind::Brackets => {
                    self.advance();
                    ty = Type::array(ty);
                }
                TokenKind::Question => {
                    let question = self.advance();
                    let span = start.merge(question.span);
                    self.require_v2("nullable type", span)?;

                    if ty.is_primitive() {
                        self.error(SyntaxErrorKind::NullablePrimitive(ty.to_string()), span);
                        return Err(());
                    }
                    if matches!(ty, Type::Nullable(_)) {
                        self.error(
                            SyntaxErrorKind::MalformedType(format!("`{ty}` is already nullable")),
                            span,
                        );
                        return Err(());
                    }
                    ty = Type::nullable(ty);
                }
                _ => break,
            }
        }

        Ok(ty)
    }

    fn parse_type_atom(&mut self) -> PResult<Type> {
        let token = self.peek();
        match token.kind {
            TokenKind::Int => {
                self.advance();
                Ok(Type::Int)
            }
            TokenKind::Bool => {
                self.advance();
                Ok(Type::Bool)
            }
            TokenKind::String => {
                self.advance();
                Ok(Type::Str)
            }
            TokenKind::StructName => {
                self.advance();
                self.require_v2("struct type", token.span)?;
                Ok(Type::Struct(token.text.to_string()))
            }
            TokenKind::LParen => self.parse_paren_type(),
            _ => {
                self.error_expected("type");
                Err(())
            }
        }
    }

    /// `(T, U) -> R` or a parenthesized reference type
    fn parse_paren_type(&mut self) -> PResult<Type> {
        let open = self.advance();
        let mut types = Vec::new();

        if !self.check(TokenKind::RParen) {
            loop {
                types.push(self.parse_type()?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        let close = self.expect_closing(open, TokenKind::RParen)?;

        if self.check(TokenKind::Arrow) {
            let arrow = self.advance();
            self.require_v2("function type", open.span.merge(arrow.span))?;
            let ret = self.parse_ret_type()?;
            return Ok(Type::function(types, ret));
        }

        let span = open.span.merge(close.span);
        match types.len() {
            1 if types[0].is_reference() => Ok(types.remove(0)),
            1 => {
                let message = format!("only reference types may be parenthesized, found `{}`", types[0]);
                self.error(SyntaxErrorKind::MalformedType(message), span);
                Err(())
            }
            _ => {
                self.error(
                    SyntaxErrorKind::MalformedType("expected `->` after function parameter types".into()),
                    span,
                );
                Err(())
            }
        }
    }

    pub(crate) fn parse_ret_type(&mut self) -> PResult<RetTy> {
        if self.match_token(TokenKind::Void) {
            Ok(RetTy::Void)
        } else {
            self.parse_type().map(RetTy::Value)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{RetTy, Type};
    use crate::dialect::Dialect;
    use crate::parser::parse_type;
    use oat_error::ErrorCode;
    use pretty_assertions::assert_eq;

    fn ty(source: &str) -> Type {
        parse_type(source, Dialect::V2).unwrap_or_else(|d| panic!("{source}: {d}"))
    }

    fn code(source: &str, dialect: Dialect) -> Option<ErrorCode> {
        parse_type(source, dialect).unwrap_err().code
    }

    #[test]
    fn test_primitives_and_arrays() {
        assert_eq!(ty("int"), Type::Int);
        assert_eq!(ty("int[]"), Type::array(Type::Int));
        assert_eq!(ty("int[][]"), Type::array(Type::array(Type::Int)));
        assert_eq!(ty("bool[]"), Type::array(Type::Bool));
    }

    #[test]
    fn test_nullable_reference_types() {
        assert_eq!(ty("string?"), Type::nullable(Type::Str));
        assert_eq!(ty("Point?"), Type::nullable(Type::Struct("Point".into())));
        assert_eq!(ty("int[]?"), Type::nullable(Type::array(Type::Int)));
        assert_eq!(
            ty("string?[]"),
            Type::array(Type::nullable(Type::Str))
        );
    }

    #[test]
    fn test_nullable_primitive_rejected() {
        let err = parse_type("int?", Dialect::V2).unwrap_err();
        assert_eq!(err.code, Some(ErrorCode::NULLABLE_PRIMITIVE));
        assert!(err.message.contains("`int`"));
        assert_eq!(code("bool?", Dialect::V2), Some(ErrorCode::NULLABLE_PRIMITIVE));
    }

    #[test]
    fn test_double_nullable_rejected() {
        assert_eq!(code("string??", Dialect::V2), Some(ErrorCode::MALFORMED_TYPE));
    }

    #[test]
    fn test_function_types() {
        assert_eq!(
            ty("(int, bool) -> string"),
            Type::function(vec![Type::Int, Type::Bool], RetTy::Value(Type::Str))
        );
        assert_eq!(ty("() -> void"), Type::function(vec![], RetTy::Void));
        assert_eq!(
            ty("((int) -> int)[]"),
            Type::array(Type::function(vec![Type::Int], RetTy::Value(Type::Int)))
        );
        assert_eq!(
            ty("(int) -> int[]"),
            Type::function(vec![Type::Int], RetTy::Value(Type::array(Type::Int)))
        );
    }

    #[test]
    fn test_parenthesized_reference_type() {
        assert_eq!(ty("(string)"), Type::Str);
        assert_eq!(ty("(int[])[]"), Type::array(Type::array(Type::Int)));
        assert_eq!(code("(int)", Dialect::V2), Some(ErrorCode::MALFORMED_TYPE));
        assert_eq!(code("(int, bool)", Dialect::V2), Some(ErrorCode::MALFORMED_TYPE));
    }

    #[test]
    fn test_v2_types_rejected_in_v1() {
        assert_eq!(parse_type("int[]", Dialect::V1), Ok(Type::array(Type::Int)));
        assert_eq!(code("Point", Dialect::V1), Some(ErrorCode::NOT_IN_DIALECT));
        assert_eq!(code("string?", Dialect::V1), Some(ErrorCode::NOT_IN_DIALECT));
        assert_eq!(code("(int) -> int", Dialect::V1), Some(ErrorCode::NOT_IN_DIALECT));
    }

    #[test]
    fn test_missing_type() {
        assert_eq!(code("var", Dialect::V2), Some(ErrorCode::UNEXPECTED_TOKEN));
    }
}
