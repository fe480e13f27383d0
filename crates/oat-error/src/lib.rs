//! oat-error - Diagnostics for the Oat frontend
//!
//! Spans, the lexical/syntactic error taxonomy, and rustc-style rendering
//! of the diagnostics a parse accumulates.
//!
//! # Example
//!
//! ```rust
//! use oat_error::{Diagnostic, ErrorCode, SourceCache, DiagnosticRenderer};
//! use oat_error::span::{Span, Position};
//!
//! let mut cache = SourceCache::new();
//! let file_id = cache.add("example.oat", "global x = ;");
//!
//! let span = Span::point(Position::new(1, 12, 11), file_id);
//! let diagnostic = Diagnostic::error("expected global initializer, found `;`")
//!     .with_code(ErrorCode::UNEXPECTED_TOKEN)
//!     .with_label(span, "unexpected token");
//!
//! let renderer = DiagnosticRenderer::new(&cache);
//! println!("{}", renderer.render(&diagnostic));
//! ```

pub mod diagnostic;
pub mod error;
pub mod span;

pub use diagnostic::{
    Diagnostic, DiagnosticRenderer, ErrorCode, Label, Level, SourceCache, SourceFile, Suggestion,
};
pub use error::{LexError, LexErrorKind, SyntaxError, SyntaxErrorKind};
pub use span::{Position, Span, Spanned};

/// Default Result type for operations that fail with a single diagnostic
pub type Result<T> = std::result::Result<T, Diagnostic>;

/// Diagnostics accumulated by one parse
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: impl Into<Diagnostic>) {
        self.items.push(diagnostic.into());
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|d| d.level == Level::Error)
    }

    /// Whether a lexical error stopped the token stream
    pub fn has_lex_error(&self) -> bool {
        self.items
            .iter()
            .any(|d| d.code.is_some_and(|c| c.is_lexical()))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn first(&self) -> Option<&Diagnostic> {
        self.items.first()
    }

    /// Renders all diagnostics, separated by blank lines
    pub fn render(&self, cache: &SourceCache) -> String {
        let renderer = DiagnosticRenderer::new(cache);
        self.render_with(&renderer)
    }

    pub fn render_with(&self, renderer: &DiagnosticRenderer<'_>) -> String {
        self.items
            .iter()
            .map(|d| renderer.render(d))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
