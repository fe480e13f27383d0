//! Error taxonomy of the Oat frontend
//!
//! `LexError` is fatal for the rest of the buffer; `SyntaxError` aborts the
//! statement or declaration being parsed. Both lower into a `Diagnostic`.

use crate::diagnostic::{Diagnostic, ErrorCode};
use crate::span::Span;
use thiserror::Error;

/// What went wrong while splitting the source into tokens
#[derive(Debug, Clone, PartialEq, Eq, Default, Error)]
pub enum LexErrorKind {
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated block comment")]
    UnterminatedComment,
    #[error("illegal character `{0}`")]
    IllegalCharacter(char),
    /// Placeholder used before the offending character is known
    #[default]
    #[error("unrecognized input")]
    Unrecognized,
}

impl LexErrorKind {
    pub fn code(&self) -> ErrorCode {
        match self {
            LexErrorKind::IllegalCharacter(_) | LexErrorKind::Unrecognized => {
                ErrorCode::ILLEGAL_CHAR
            }
            LexErrorKind::UnterminatedString => ErrorCode::UNTERMINATED_STRING,
            LexErrorKind::UnterminatedComment => ErrorCode::UNTERMINATED_COMMENT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

impl LexError {
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// What went wrong while building the tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxErrorKind {
    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },
    #[error("expected {expected} before {found}")]
    MissingToken { expected: String, found: String },
    #[error("malformed type: {0}")]
    MalformedType(String),
    #[error("duplicate field initializer `{0}`")]
    DuplicateField(String),
    #[error("nullable suffix `?` cannot be applied to primitive type `{0}`")]
    NullablePrimitive(String),
    #[error("mismatched closing delimiter: expected `{expected}` to close `{open}`, found {found}")]
    MismatchedDelimiter {
        open: char,
        expected: char,
        found: String,
    },
    #[error("{construct} is not available in Oat {dialect}")]
    NotInDialect { construct: String, dialect: String },
    #[error("integer literal `{0}` does not fit in 64 bits")]
    IntOutOfRange(String),
    #[error("nesting exceeds the limit of {0} levels")]
    NestingTooDeep(usize),
}

impl SyntaxErrorKind {
    pub fn code(&self) -> ErrorCode {
        match self {
            SyntaxErrorKind::UnexpectedToken { .. } => ErrorCode::UNEXPECTED_TOKEN,
            SyntaxErrorKind::MissingToken { .. } => ErrorCode::MISSING_TOKEN,
            SyntaxErrorKind::MalformedType(_) => ErrorCode::MALFORMED_TYPE,
            SyntaxErrorKind::DuplicateField(_) => ErrorCode::DUPLICATE_FIELD,
            SyntaxErrorKind::NullablePrimitive(_) => ErrorCode::NULLABLE_PRIMITIVE,
            SyntaxErrorKind::MismatchedDelimiter { .. } => ErrorCode::MISMATCHED_DELIMITER,
            SyntaxErrorKind::NotInDialect { .. } => ErrorCode::NOT_IN_DIALECT,
            SyntaxErrorKind::IntOutOfRange(_) => ErrorCode::INT_OUT_OF_RANGE,
            SyntaxErrorKind::NestingTooDeep(_) => ErrorCode::NESTING_TOO_DEEP,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            SyntaxErrorKind::UnexpectedToken { .. } => "unexpected token",
            SyntaxErrorKind::MissingToken { .. } => "expected here",
            SyntaxErrorKind::MalformedType(_) => "in this type",
            SyntaxErrorKind::DuplicateField(_) => "field already initialized",
            SyntaxErrorKind::NullablePrimitive(_) => "only reference types can be nullable",
            SyntaxErrorKind::MismatchedDelimiter { .. } => "wrong closing delimiter",
            SyntaxErrorKind::NotInDialect { .. } => "not supported by the selected dialect",
            SyntaxErrorKind::IntOutOfRange(_) => "literal out of range",
            SyntaxErrorKind::NestingTooDeep(_) => "too deeply nested",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub span: Span,
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

impl From<LexError> for Diagnostic {
    fn from(err: LexError) -> Self {
        Diagnostic::error(err.kind.to_string())
            .with_code(err.kind.code())
            .with_label(err.span, "token boundaries are unreliable past this point")
    }
}

impl From<SyntaxError> for Diagnostic {
    fn from(err: SyntaxError) -> Self {
        let label = err.kind.label();
        let diagnostic = Diagnostic::error(err.kind.to_string())
            .with_code(err.kind.code())
            .with_label(err.span, label);

        match &err.kind {
            SyntaxErrorKind::NullablePrimitive(ty) => {
                diagnostic.with_help(format!("`{ty}` is a primitive; only string, struct, array and function types take `?`"))
            }
            SyntaxErrorKind::DuplicateField(name) => {
                diagnostic.with_help(format!("remove one of the `{name} = ...` initializers"))
            }
            _ => diagnostic,
        }
    }
}
