//! Errors raised while turning query results into report text.

use thiserror::Error;

use super::request::Section;

/// Result type for report shaping.
pub type ReportResult<T> = Result<T, ReportError>;

/// A result batch that violates the shape the formatter expects.
///
/// The batch came back from the executor but cannot be rendered.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReportError {
    /// The batch does not hold one result per descriptor.
    #[error("expected {expected} results for {kind} report, got {actual}")]
    ResultCount {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },

    /// No result carries the section's tag.
    #[error("no result for section '{0}'")]
    MissingSection(Section),

    /// The result has no totals row.
    #[error("result for section '{0}' has no totals row")]
    MissingTotals(Section),

    /// A row has no dimension value or no metric value to render.
    #[error("row {row} of section '{section}' has no {missing} value")]
    EmptyRow {
        section: Section,
        row: usize,
        missing: &'static str,
    },

    /// A row's width differs from the descriptor that requested it.
    #[error("{what} of section '{section}' has {actual} {column}s, expected {expected}")]
    ShapeMismatch {
        section: Section,
        what: String,
        column: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A value that should be numeric is not.
    #[error("value '{value}' of {metric} is not a number")]
    InvalidNumber { metric: &'static str, value: String },
}

