//! End-to-end tests for the Oat frontend
//!
//! Source -> Lexer -> Parser -> Printer, over a small corpus of v1 and v2
//! programs plus targeted error-recovery cases.

use oat_error::{Diagnostics, ErrorCode};
use oat_parser::{parse, Dialect, Program};

/// Corpus programs, by dialect
pub const V1_PROGRAMS: &[(&str, &str)] = &[
    ("bubble_sort", include_str!("../programs/v1/bubble_sort.oat")),
    ("bits", include_str!("../programs/v1/bits.oat")),
];

pub const V2_PROGRAMS: &[(&str, &str)] = &[
    ("linked_list", include_str!("../programs/v2/linked_list.oat")),
    ("higher_order", include_str!("../programs/v2/higher_order.oat")),
];

/// Result of parsing an Oat source buffer
#[derive(Debug)]
pub struct ParseResult {
    pub program: Program,
    pub diagnostics: Diagnostics,
}

impl ParseResult {
    pub fn success(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Error codes in report order
    pub fn codes(&self) -> Vec<ErrorCode> {
        self.diagnostics.iter().filter_map(|d| d.code).collect()
    }
}

pub fn parse_source(source: &str, dialect: Dialect) -> ParseResult {
    let (program, diagnostics) = parse(source, dialect);
    ParseResult {
        program,
        diagnostics,
    }
}

/// Asserts that source parses without diagnostics and returns the program
pub fn assert_parses(source: &str, dialect: Dialect) -> Program {
    let result = parse_source(source, dialect);
    if !result.success() {
        panic!(
            "Expected source to parse as {}, but got errors:\n{:#?}",
            dialect, result.diagnostics
        );
    }
    result.program
}

/// Asserts that source fails to parse; returns the error codes
pub fn assert_parse_fails(source: &str, dialect: Dialect) -> Vec<ErrorCode> {
    let result = parse_source(source, dialect);
    if result.success() {
        panic!("Expected source to fail parsing as {}, but it succeeded", dialect);
    }
    result.codes()
}

/// Prints a parsed program and parses the output again; the two trees
/// must have the same shape and printing must be a fixed point.
pub fn assert_roundtrip(source: &str, dialect: Dialect) -> String {
    let first = assert_parses(source, dialect);
    let printed = first.to_string();
    let second = assert_parses(&printed, dialect);

    if !first.same_shape(&second) {
        panic!("Printed program parses to a different tree:\n{}", printed);
    }
    let reprinted = second.to_string();
    if reprinted != printed {
        panic!(
            "Printing is not stable.\n\nFirst:\n{}\n\nSecond:\n{}",
            printed, reprinted
        );
    }
    printed
}

#[cfg(test)]
mod corpus_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_v1_corpus_parses_in_both_dialects() {
        for (name, source) in V1_PROGRAMS {
            let v1 = parse_source(source, Dialect::V1);
            assert!(v1.success(), "{name}: {:#?}", v1.diagnostics);
            let v2 = parse_source(source, Dialect::V2);
            assert!(v2.success(), "{name}: {:#?}", v2.diagnostics);
        }
    }

    #[test]
    fn test_v2_corpus_parses() {
        for (name, source) in V2_PROGRAMS {
            let result = parse_source(source, Dialect::V2);
            assert!(result.success(), "{name}: {:#?}", result.diagnostics);
        }
    }

    #[test]
    fn test_v2_corpus_rejected_by_v1() {
        for (_, source) in V2_PROGRAMS {
            let codes = assert_parse_fails(source, Dialect::V1);
            assert!(codes.contains(&ErrorCode::NOT_IN_DIALECT), "{:?}", codes);
        }
    }

    #[test]
    fn test_corpus_roundtrips() {
        for (_, source) in V1_PROGRAMS {
            assert_roundtrip(source, Dialect::V1);
        }
        for (_, source) in V2_PROGRAMS {
            assert_roundtrip(source, Dialect::V2);
        }
    }

    #[test]
    fn test_corpus_declaration_counts() {
        let program = assert_parses(V2_PROGRAMS[0].1, Dialect::V2);
        let names: Vec<_> = program.decls.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["Node", "List", "empty", "push", "sum", "program"]);

        let program = assert_parses(V1_PROGRAMS[0].1, Dialect::V1);
        assert_eq!(program.decls.len(), 4);
    }
}

#[cfg(test)]
mod lexer_tests {
    use super::*;
    use oat_lexer::{tokenize, TokenKind};
    use pretty_assertions::assert_eq;

    /// Identifiers and struct names in source order
    fn names(source: &str) -> Vec<String> {
        tokenize(source, 0)
            .collect_tokens()
            .unwrap_or_else(|e| panic!("lexing failed: {e}"))
            .into_iter()
            .filter(|t| matches!(t.kind, TokenKind::Ident | TokenKind::StructName))
            .map(|t| t.text.to_string())
            .collect()
    }

    #[test]
    fn test_corpus_token_spans_match_text() {
        for (name, source) in V1_PROGRAMS.iter().chain(V2_PROGRAMS) {
            let tokens = tokenize(source, 0)
                .collect_tokens()
                .unwrap_or_else(|e| panic!("{name}: {e}"));
            assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof), "{name}");
            for token in &tokens {
                assert_eq!(token.span.slice(source), token.text, "{name}");
            }
        }
    }

    #[test]
    fn test_printing_keeps_names_in_order() {
        for (_, source) in V1_PROGRAMS {
            let printed = assert_roundtrip(source, Dialect::V1);
            assert_eq!(names(&printed), names(source));
        }
        for (_, source) in V2_PROGRAMS {
            let printed = assert_roundtrip(source, Dialect::V2);
            assert_eq!(names(&printed), names(source));
        }
    }
}
