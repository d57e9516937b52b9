//! Wire types for the Analytics Reporting v4 `reports:batchGet` call.
//!
//! The backend answers positionally: report `i` belongs to request `i`.
//! [`BatchGetResponse::into_results`] re-attaches each descriptor's section tag
//! so nothing downstream depends on positions.

use serde::{Deserialize, Serialize};

use super::error::{ExecutorResult, QueryError};
use crate::report::{DateRange, QueryDescriptor, QueryResult, Row};

// ============================================================================
// Request
// ============================================================================

/// Body of a `reports:batchGet` request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchGetRequest {
    pub report_requests: Vec<ReportRequest>,
}

/// One report request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    /// Analytics view (property) id.
    pub view_id: String,
    pub date_ranges: Vec<WireDateRange>,
    pub metrics: Vec<WireMetric>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<WireDimension>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireDateRange {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WireMetric {
    pub expression: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WireDimension {
    pub name: String,
}

impl From<&DateRange> for WireDateRange {
    fn from(range: &DateRange) -> Self {
        Self {
            start_date: range.start.to_string(),
            end_date: range.end.to_string(),
        }
    }
}

impl From<&QueryDescriptor> for ReportRequest {
    fn from(descriptor: &QueryDescriptor) -> Self {
        Self {
            view_id: descriptor.target_id.clone(),
            date_ranges: descriptor.date_ranges.iter().map(Into::into).collect(),
            metrics: descriptor
                .metrics
                .iter()
                .map(|m| WireMetric {
                    expression: m.expression.clone(),
                    alias: m.alias.clone(),
                })
                .collect(),
            dimensions: descriptor
                .dimensions
                .iter()
                .map(|d| WireDimension {
                    name: d.name.clone(),
                })
                .collect(),
        }
    }
}

impl BatchGetRequest {
    pub fn from_descriptors(descriptors: &[QueryDescriptor]) -> Self {
        Self {
            report_requests: descriptors.iter().map(Into::into).collect(),
        }
    }
}

// ============================================================================
// Response
// ============================================================================

/// Body of a successful `reports:batchGet` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchGetResponse {
    #[serde(default)]
    pub reports: Vec<WireReport>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireReport {
    #[serde(default)]
    pub data: ReportData,
}

/// Rows are omitted by the backend when a report has no data.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    #[serde(default)]
    pub rows: Vec<WireRow>,
    /// One entry per requested date range.
    #[serde(default)]
    pub totals: Vec<DateRangeValues>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireRow {
    #[serde(default)]
    pub dimensions: Vec<String>,
    /// One entry per requested date range.
    #[serde(default)]
    pub metrics: Vec<DateRangeValues>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateRangeValues {
    #[serde(default)]
    pub values: Vec<String>,
}

impl WireRow {
    /// Keep the dimensions and the values of the first date range.
    fn into_row(self) -> Row {
        let metric_values = self
            .metrics
            .into_iter()
            .next()
            .map(|range| range.values)
            .unwrap_or_default();
        Row {
            dimension_values: self.dimensions,
            metric_values,
        }
    }
}

impl BatchGetResponse {
    /// Pair each report with the descriptor at the same position and tag it.
    pub fn into_results(self, descriptors: &[QueryDescriptor]) -> ExecutorResult<Vec<QueryResult>> {
        if self.reports.len() != descriptors.len() {
            return Err(QueryError::ResultCount {
                expected: descriptors.len(),
                actual: self.reports.len(),
            });
        }

        Ok(self
            .reports
            .into_iter()
            .zip(descriptors)
            .map(|(report, descriptor)| {
                QueryResult::new(
                    descriptor.section,
                    report.data.rows.into_iter().map(WireRow::into_row).collect(),
                    report
                        .data
                        .totals
                        .into_iter()
                        .map(|range| Row::totals(range.values))
                        .collect(),
                )
            })
            .collect())
    }
}

/// Error body returned by Google APIs.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorInfo {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Pull a readable message out of an error body, falling back to the raw text.
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => match envelope.error.status {
            Some(status) => format!("{} ({})", envelope.error.message, status),
            None => envelope.error.message,
        },
        Err(_) => body.trim().to_string(),
    }
}
