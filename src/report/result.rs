//! Tabular results returned by a query executor.

use super::error::{ReportError, ReportResult};
use super::request::{QueryDescriptor, Section};

/// One row of a result. Metric values keep their textual form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub dimension_values: Vec<String>,
    pub metric_values: Vec<String>,
}

impl Row {
    pub fn new<D, M>(dimension_values: D, metric_values: M) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        M: IntoIterator,
        M::Item: Into<String>,
    {
        Self {
            dimension_values: dimension_values.into_iter().map(Into::into).collect(),
            metric_values: metric_values.into_iter().map(Into::into).collect(),
        }
    }

    /// A totals row: metric values only.
    pub fn totals<M>(metric_values: M) -> Self
    where
        M: IntoIterator,
        M::Item: Into<String>,
    {
        Self::new(Vec::<String>::new(), metric_values)
    }

    pub fn metric(&self, index: usize) -> Option<&str> {
        self.metric_values.get(index).map(String::as_str)
    }

    pub fn dimension(&self, index: usize) -> Option<&str> {
        self.dimension_values.get(index).map(String::as_str)
    }
}

/// The tabular answer to one [`QueryDescriptor`], tagged with its section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    pub section: Section,
    pub rows: Vec<Row>,
    pub totals: Vec<Row>,
}

impl QueryResult {
    pub fn new(section: Section, rows: Vec<Row>, totals: Vec<Row>) -> Self {
        Self {
            section,
            rows,
            totals,
        }
    }

    /// The first totals row.
    pub fn first_totals(&self) -> ReportResult<&Row> {
        self.totals
            .first()
            .ok_or(ReportError::MissingTotals(self.section))
    }

    /// Check that every row matches the widths `descriptor` asked for.
    ///
    /// Totals rows carry one value per metric and no dimension values.
    pub fn validate_against(&self, descriptor: &QueryDescriptor) -> ReportResult<()> {
        let metrics = descriptor.metrics.len();
        let dimensions = descriptor.dimensions.len();

        for (index, row) in self.rows.iter().enumerate() {
            check_width(
                self.section,
                || format!("row {}", index),
                "metric",
                metrics,
                row.metric_values.len(),
            )?;
            check_width(
                self.section,
                || format!("row {}", index),
                "dimension",
                dimensions,
                row.dimension_values.len(),
            )?;
        }

        for (index, row) in self.totals.iter().enumerate() {
            check_width(
                self.section,
                || format!("totals row {}", index),
                "metric",
                metrics,
                row.metric_values.len(),
            )?;
        }

        Ok(())
    }
}

fn check_width(
    section: Section,
    what: impl FnOnce() -> String,
    column: &'static str,
    expected: usize,
    actual: usize,
) -> ReportResult<()> {
    if expected == actual {
        return Ok(());
    }
    Err(ReportError::ShapeMismatch {
        section,
        what: what(),
        column,
        expected,
        actual,
    })
}
