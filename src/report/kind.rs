//! Report kinds and the date tokens they query.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which predefined bundle of metrics and dimensions to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// Totals for yesterday: sessions, bounce rate, average session duration.
    #[serde(alias = "yesterday")]
    SingleDay,
    /// Seven-day breakdown by device, browser, country, page and traffic source.
    #[serde(alias = "last_7_days")]
    MultiMetricWindow,
}

impl ReportKind {
    /// All kinds, in the order a full digest emits them.
    pub const ALL: [ReportKind; 2] = [ReportKind::SingleDay, ReportKind::MultiMetricWindow];

    /// Number of query descriptors this kind produces.
    pub fn expected_queries(&self) -> usize {
        match self {
            ReportKind::SingleDay => 1,
            ReportKind::MultiMetricWindow => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::SingleDay => "single_day",
            ReportKind::MultiMetricWindow => "multi_metric_window",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A relative date understood by the analytics backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateToken {
    Yesterday,
    /// `N` days before today (`NdaysAgo` on the wire).
    DaysAgo(u32),
}

impl fmt::Display for DateToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateToken::Yesterday => f.write_str("yesterday"),
            DateToken::DaysAgo(n) => write!(f, "{}daysAgo", n),
        }
    }
}

/// Inclusive date range of one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateToken,
    pub end: DateToken,
}

impl DateRange {
    pub fn new(start: DateToken, end: DateToken) -> Self {
        Self { start, end }
    }

    /// Yesterday through yesterday.
    pub fn yesterday() -> Self {
        Self::new(DateToken::Yesterday, DateToken::Yesterday)
    }

    /// Seven days ago through yesterday.
    pub fn last_seven_days() -> Self {
        Self::new(DateToken::DaysAgo(7), DateToken::Yesterday)
    }
}
