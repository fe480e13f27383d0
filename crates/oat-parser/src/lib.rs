//! oat-parser - Parser for the Oat language
//!
//! Converts Oat source into an AST (Abstract Syntax Tree), for either
//! dialect: v1 (ints, bools, strings, arrays) or v2 (adds structs,
//! nullable and function types, `if?`, `length` and array generators).
//!
//! Errors never stop the parse: each one is recorded as a diagnostic and
//! the parser resumes at the next statement or declaration.
//!
//! # Example
//!
//! ```rust
//! use oat_parser::{parse, Dialect};
//!
//! let source = "int main(int argc, string[] argv) { return 1 + 2 * 3; }";
//! let (program, diagnostics) = parse(source, Dialect::V1);
//!
//! assert!(diagnostics.is_empty());
//! assert_eq!(program.decls.len(), 1);
//! assert!(program.to_string().contains("return (1 + (2 * 3));"));
//! ```

pub mod ast;
pub mod dialect;
pub mod parser;
mod print;

mod decl;
mod expr;
mod stmt;
mod types;

pub use ast::*;
pub use dialect::{Dialect, ForInits, ParseOptions};
pub use parser::{
    parse, parse_expression, parse_file, parse_global_expression, parse_statements, parse_type,
    Parser,
};
