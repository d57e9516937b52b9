//! Rendering of query results into chat-ready text.
//!
//! Each report kind renders as a block of lines. Blocks are composed as line
//! vectors and joined once; nothing is appended after a document is built.

use std::fmt;

use super::error::{ReportError, ReportResult};
use super::kind::ReportKind;
use super::request::Section;
use super::result::{QueryResult, Row};

/// Label used in report titles when none is configured.
pub const DEFAULT_LABEL: &str = "MAINNET";

const ROW_INDENT: &str = "    - ";
const SEPARATOR: &str = "    -------";

/// A rendered report document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportText(String);

impl ReportText {
    /// Build a document from lines, terminating each with a line break.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let text = lines.into_iter().fold(String::new(), |mut acc, line| {
            acc.push_str(line.as_ref());
            acc.push('\n');
            acc
        });
        Self(text)
    }

    /// Join documents in order, separated by a single line break.
    pub fn join(documents: &[ReportText]) -> Self {
        let parts: Vec<&str> = documents.iter().map(ReportText::as_str).collect();
        Self(parts.join("\n"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

impl fmt::Display for ReportText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Turns a batch of query results into a report document.
#[derive(Debug, Clone)]
pub struct ReportFormatter {
    label: String,
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_LABEL)
    }
}

impl ReportFormatter {
    /// Create a formatter that titles reports with `label`.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    /// Render `results` as a `kind` report.
    ///
    /// Results are looked up by section tag. The batch must hold exactly one
    /// result per descriptor the kind builds.
    pub fn format(&self, kind: ReportKind, results: &[QueryResult]) -> ReportResult<ReportText> {
        let expected = kind.expected_queries();
        if results.len() != expected {
            return Err(ReportError::ResultCount {
                kind: kind.as_str(),
                expected,
                actual: results.len(),
            });
        }

        let lines = match kind {
            ReportKind::SingleDay => self.single_day(results)?,
            ReportKind::MultiMetricWindow => self.multi_metric_window(results)?,
        };

        Ok(ReportText::from_lines(lines))
    }

    fn single_day(&self, results: &[QueryResult]) -> ReportResult<Vec<String>> {
        let visitors = find_section(results, Section::Visitors)?;
        let totals = visitors.first_totals()?;

        let sessions = totals_value(totals, 0, Section::Visitors)?;
        let bounce_rate = totals_value(totals, 1, Section::Visitors)?;
        let duration = totals_value(totals, 2, Section::Visitors)?;
        let minutes = seconds_to_minutes(duration)?;

        Ok(vec![
            format!("**{} | Yesterday metrics**", self.label),
            format!(
                "{}Average session duration: {} seconds / {} minutes",
                ROW_INDENT, duration, minutes
            ),
            format!("{}Unique sessions: {}", ROW_INDENT, sessions),
            format!("{}Bounce rate: {}", ROW_INDENT, bounce_rate),
        ])
    }

    fn multi_metric_window(&self, results: &[QueryResult]) -> ReportResult<Vec<String>> {
        let mut lines = vec![format!("**{} | Last 7 days metrics**", self.label)];
        for section in Section::BREAKDOWN {
            let result = find_section(results, section)?;
            lines.extend(breakdown_lines(result)?);
        }
        Ok(lines)
    }
}

/// Render `results` with the default label.
pub fn format_report(kind: ReportKind, results: &[QueryResult]) -> ReportResult<ReportText> {
    ReportFormatter::default().format(kind, results)
}

fn find_section(results: &[QueryResult], section: Section) -> ReportResult<&QueryResult> {
    results
        .iter()
        .find(|result| result.section == section)
        .ok_or(ReportError::MissingSection(section))
}

fn totals_value(totals: &Row, index: usize, section: Section) -> ReportResult<&str> {
    totals.metric(index).ok_or_else(|| ReportError::ShapeMismatch {
        section,
        what: "totals row 0".to_string(),
        column: "metric",
        expected: index + 1,
        actual: totals.metric_values.len(),
    })
}

/// Only the first dimension and the first metric of each row are shown.
fn breakdown_lines(result: &QueryResult) -> ReportResult<Vec<String>> {
    let total = result
        .first_totals()?
        .metric(0)
        .ok_or(ReportError::EmptyRow {
            section: result.section,
            row: 0,
            missing: "totals metric",
        })?;

    let mut lines = Vec::with_capacity(result.rows.len() + 3);
    lines.push(result.section.heading().to_string());

    for (index, row) in result.rows.iter().enumerate() {
        let dimension = row.dimension(0).ok_or(ReportError::EmptyRow {
            section: result.section,
            row: index,
            missing: "dimension",
        })?;
        let metric = row.metric(0).ok_or(ReportError::EmptyRow {
            section: result.section,
            row: index,
            missing: "metric",
        })?;
        lines.push(format!("{}{}: {}", ROW_INDENT, dimension, metric));
    }

    lines.push(SEPARATOR.to_string());
    lines.push(format!("    Total: {}", total));
    Ok(lines)
}

/// Convert a seconds value to minutes with two decimal places.
fn seconds_to_minutes(seconds: &str) -> ReportResult<String> {
    let value: f64 = seconds
        .trim()
        .parse()
        .map_err(|_| ReportError::InvalidNumber {
            metric: "average session duration",
            value: seconds.to_string(),
        })?;
    if !value.is_finite() {
        return Err(ReportError::InvalidNumber {
            metric: "average session duration",
            value: seconds.to_string(),
        });
    }
    Ok(format!("{:.2}", value / 60.0))
}
