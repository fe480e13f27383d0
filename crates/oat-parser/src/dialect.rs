//! Grammar selection
//!
//! Both dialects share one parser and one AST; the v2-only productions
//! check `Dialect` before committing.

use std::fmt;
use std::str::FromStr;

/// Oat language version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// Ints, bools, strings and arrays only
    V1,
    /// Adds structs, nullable and function types, `if?`, `length`,
    /// struct literals and array generators
    #[default]
    V2,
}

impl Dialect {
    pub fn is_v2(self) -> bool {
        self == Dialect::V2
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::V1 => f.write_str("v1"),
            Dialect::V2 => f.write_str("v2"),
        }
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "v1" | "1" => Ok(Dialect::V1),
            "v2" | "2" => Ok(Dialect::V2),
            other => Err(format!("unknown Oat dialect `{other}` (expected v1 or v2)")),
        }
    }
}

/// How many `var` declarations a `for` header may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForInits {
    /// Zero or one
    Single,
    /// Zero or more, comma separated
    #[default]
    Multiple,
}

/// Parser configuration, fixed for the duration of one parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    pub dialect: Dialect,
    pub for_inits: ForInits,
}

impl ParseOptions {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Self::default()
        }
    }

    pub fn with_for_inits(mut self, for_inits: ForInits) -> Self {
        self.for_inits = for_inits;
        self
    }
}

impl From<Dialect> for ParseOptions {
    fn from(dialect: Dialect) -> Self {
        ParseOptions::new(dialect)
    }
}
