//! Diagnostic data model
//!
//! Diagnostics are produced by the rules crate and consumed by whatever
//! presents them (editor markers, terminal output, JSON). Every diagnostic
//! belongs to exactly one [`DiagnosticCategory`], which is also the unit of
//! configuration.

mod renderer;

pub use renderer::{DiagnosticRenderer, OutputFormat};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::document::Position;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Hint => "hint",
        };
        f.write_str(text)
    }
}

/// Independently toggleable families of checks
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticCategory {
    UnknownStatement,
    StatementParameter,
    UnbalancedParentheses,
    MissingTerminator,
    UnknownOperand,
    DuplicateOperand,
    EmptyOperandParameter,
    MissingRequiredOperand,
    DependencyViolation,
    MutualExclusion,
    RequiredGroup,
    MissingInlineData,
    SubOperand,
    ColumnLimit,
    StandaloneComment,
    Syntax,
}

impl DiagnosticCategory {
    pub const ALL: [DiagnosticCategory; 16] = [
        DiagnosticCategory::UnknownStatement,
        DiagnosticCategory::StatementParameter,
        DiagnosticCategory::UnbalancedParentheses,
        DiagnosticCategory::MissingTerminator,
        DiagnosticCategory::UnknownOperand,
        DiagnosticCategory::DuplicateOperand,
        DiagnosticCategory::EmptyOperandParameter,
        DiagnosticCategory::MissingRequiredOperand,
        DiagnosticCategory::DependencyViolation,
        DiagnosticCategory::MutualExclusion,
        DiagnosticCategory::RequiredGroup,
        DiagnosticCategory::MissingInlineData,
        DiagnosticCategory::SubOperand,
        DiagnosticCategory::ColumnLimit,
        DiagnosticCategory::StandaloneComment,
        DiagnosticCategory::Syntax,
    ];

    /// Stable kebab-case identifier
    pub fn code(self) -> &'static str {
        match self {
            DiagnosticCategory::UnknownStatement => "unknown-statement",
            DiagnosticCategory::StatementParameter => "statement-parameter",
            DiagnosticCategory::UnbalancedParentheses => "unbalanced-parentheses",
            DiagnosticCategory::MissingTerminator => "missing-terminator",
            DiagnosticCategory::UnknownOperand => "unknown-operand",
            DiagnosticCategory::DuplicateOperand => "duplicate-operand",
            DiagnosticCategory::EmptyOperandParameter => "empty-operand-parameter",
            DiagnosticCategory::MissingRequiredOperand => "missing-required-operand",
            DiagnosticCategory::DependencyViolation => "dependency-violation",
            DiagnosticCategory::MutualExclusion => "mutual-exclusion",
            DiagnosticCategory::RequiredGroup => "required-group",
            DiagnosticCategory::MissingInlineData => "missing-inline-data",
            DiagnosticCategory::SubOperand => "sub-operand",
            DiagnosticCategory::ColumnLimit => "column-limit",
            DiagnosticCategory::StandaloneComment => "standalone-comment",
            DiagnosticCategory::Syntax => "syntax",
        }
    }
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Zero-based line and character
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct LinePosition {
    pub line: usize,
    pub character: usize,
}

impl LinePosition {
    pub fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

/// Half-open source range
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: LinePosition,
    pub end: LinePosition,
}

impl Range {
    pub fn new(start: LinePosition, end: LinePosition) -> Self {
        Self { start, end }
    }

    /// Range on one line covering `start..end` characters
    pub fn on_line(line: usize, start: usize, end: usize) -> Self {
        Self::new(LinePosition::new(line, start), LinePosition::new(line, end))
    }

    /// Number of characters covered when the range sits on one line
    pub fn len(&self) -> usize {
        if self.start.line == self.end.line {
            self.end.character.saturating_sub(self.start.character)
        } else {
            0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Range covered by `position` in `source`, which may span lines
    pub fn from_position(position: Position, source: &str) -> Self {
        let (line, character) = position.end(source);
        Self::new(
            LinePosition::new(position.line, position.character),
            LinePosition::new(line, character),
        )
    }
}

/// Single-line conversion; use [`Range::from_position`] for values that may
/// continue onto later lines
impl From<Position> for Range {
    fn from(position: Position) -> Self {
        Range::on_line(position.line, position.character, position.end_character())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub severity: Severity,
    pub range: Range,
    pub message: String,
    /// Finer-grained identifier within the category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Diagnostic {
    pub fn new(
        category: DiagnosticCategory,
        severity: Severity,
        range: impl Into<Range>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            severity,
            range: range.into(),
            message: message.into(),
            code: None,
        }
    }

    pub fn error(
        category: DiagnosticCategory,
        range: impl Into<Range>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(category, Severity::Error, range, message)
    }

    pub fn warning(
        category: DiagnosticCategory,
        range: impl Into<Range>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(category, Severity::Warning, range, message)
    }

    pub fn info(
        category: DiagnosticCategory,
        range: impl Into<Range>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(category, Severity::Info, range, message)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_codes_are_unique() {
        let mut codes: Vec<_> = DiagnosticCategory::ALL.iter().map(|c| c.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), DiagnosticCategory::ALL.len());
    }

    #[test]
    fn test_category_serializes_as_code() {
        for category in DiagnosticCategory::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.code()));
        }
    }

    #[test]
    fn test_range_from_position() {
        let range = Range::from(Position::new(3, 5, 7));
        assert_eq!(range.start, LinePosition::new(3, 5));
        assert_eq!(range.end, LinePosition::new(3, 12));
        assert_eq!(range.len(), 7);
    }

    #[test]
    fn test_range_from_position_across_lines() {
        let source = "++MAC(A) MALIAS(ONE,\n  TWO) DISTLIB(D).";
        let range = Range::from_position(Position::new(0, 16, 10), source);
        assert_eq!(range.start, LinePosition::new(0, 16));
        assert_eq!(range.end, LinePosition::new(1, 5));

        let single = Range::from_position(Position::new(0, 9, 6), source);
        assert_eq!(single, Range::on_line(0, 9, 15));
    }

    #[test]
    fn test_diagnostic_json_shape() {
        let diagnostic = Diagnostic::warning(
            DiagnosticCategory::ColumnLimit,
            Range::on_line(0, 72, 80),
            "Line exceeds column 72",
        );
        let json = serde_json::to_value(&diagnostic).unwrap();
        assert_eq!(json["category"], "column-limit");
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["range"]["start"]["character"], 72);
        assert!(json.get("code").is_none());
    }
}
