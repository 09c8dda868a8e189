//! Diagnostics
//!
//! Spans the parser skipped, with enough position information to point a
//! schema author at the offending text. Parsing stays lenient; the caller
//! decides whether any of this is fatal.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::lexer::Span;

// =============================================================================
// Diagnostic Codes
// =============================================================================

/// Diagnostic code for categorizing skipped input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    /// `class` declaration that does not match the declaration shape
    MalformedDeclaration,
    /// Property block opened with `{` but never closed
    UnterminatedBlock,
    /// Text inside a property block that is not `*name Range;`
    MalformedProperty,
    /// Text outside any declaration
    StrayText,
    /// Class declared more than once; the later declaration wins
    DuplicateClass,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MalformedDeclaration => "E001",
            Self::UnterminatedBlock => "E002",
            Self::MalformedProperty => "E003",
            Self::StrayText => "W001",
            Self::DuplicateClass => "W002",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::MalformedDeclaration | Self::UnterminatedBlock | Self::MalformedProperty => {
                Severity::Error
            }
            Self::StrayText | Self::DuplicateClass => Severity::Warning,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Severity
// =============================================================================

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

// =============================================================================
// Line Index
// =============================================================================

/// Maps byte offsets to 1-based line and column numbers
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { line_starts }
    }

    /// Line and column (both 1-based, column counted in chars)
    pub fn position(&self, text: &str, offset: usize) -> (usize, usize) {
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let line_start = self.line_starts[line - 1];
        let column = text[line_start..offset].chars().count() + 1;
        (line, column)
    }
}

// =============================================================================
// Diagnostic
// =============================================================================

/// A single skipped or suspicious span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub message: String,
    pub span: Span,
    pub line: usize,
    pub column: usize,
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}[{}]: {}",
            self.line,
            self.column,
            self.severity(),
            self.code,
            self.message
        )
    }
}

// =============================================================================
// Diagnostics Collection
// =============================================================================

/// Collection of diagnostics from one parse
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| !d.is_error())
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(Diagnostic::is_error)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_index_positions() {
        let text = "class A .\n  class B .\nclass";
        let index = LineIndex::new(text);
        assert_eq!(index.position(text, 0), (1, 1));
        assert_eq!(index.position(text, 12), (2, 3));
        assert_eq!(index.position(text, 22), (3, 1));
    }

    #[test]
    fn test_column_counts_chars() {
        let text = "é class";
        let index = LineIndex::new(text);
        assert_eq!(index.position(text, 3), (1, 3));
    }

    #[test]
    fn test_display_format() {
        let diagnostic = Diagnostic {
            code: DiagnosticCode::MalformedDeclaration,
            message: "expected `.`".to_string(),
            span: Span::new(0, 5),
            line: 4,
            column: 2,
        };
        assert_eq!(diagnostic.to_string(), "4:2: error[E001]: expected `.`");
    }

    #[test]
    fn test_error_filtering() {
        let mut diagnostics = Diagnostics::new();
        for code in [DiagnosticCode::StrayText, DiagnosticCode::MalformedProperty] {
            diagnostics.push(Diagnostic {
                code,
                message: String::new(),
                span: Span::default(),
                line: 1,
                column: 1,
            });
        }
        assert!(diagnostics.has_errors());
        assert_eq!(diagnostics.error_count(), 1);
        assert_eq!(diagnostics.warnings().count(), 1);
    }
}
