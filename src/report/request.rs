//! Query descriptors and the builder that produces them per report kind.
//!
//! Every descriptor carries a [`Section`] tag. Executors echo the tag on the
//! matching result so the formatter pairs them by key rather than by position.

use std::fmt;

use super::kind::{DateRange, ReportKind};

/// Tag pairing a descriptor with the result it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// Single-day totals.
    Visitors,
    Devices,
    Browsers,
    Countries,
    TopPages,
    TrafficSources,
}

impl Section {
    /// Sections of the seven-day breakdown, in emission order.
    pub const BREAKDOWN: [Section; 5] = [
        Section::Devices,
        Section::Browsers,
        Section::Countries,
        Section::TopPages,
        Section::TrafficSources,
    ];

    /// Header line printed above the section's rows.
    pub fn heading(&self) -> &'static str {
        match self {
            Section::Visitors => "Visitors",
            Section::Devices => "Devices",
            Section::Browsers => "Browsers",
            Section::Countries => "Countries",
            Section::TopPages => "Top Page Views",
            Section::TrafficSources => "Traffic Sources",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Visitors => "visitors",
            Section::Devices => "devices",
            Section::Browsers => "browsers",
            Section::Countries => "countries",
            Section::TopPages => "top_pages",
            Section::TrafficSources => "traffic_sources",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metric to request. The expression is an opaque backend identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSpec {
    pub expression: String,
    pub alias: Option<String>,
}

impl MetricSpec {
    /// Metric with its alias set.
    pub fn aliased(expression: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            alias: Some(alias.into()),
        }
    }
}

/// A dimension to break results down by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionSpec {
    pub name: String,
    pub alias: Option<String>,
}

impl DimensionSpec {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }
}

/// A structured request for one tabular slice of analytics data.
///
/// `metrics` is never empty; `dimensions` is empty for totals-only queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDescriptor {
    pub section: Section,
    pub target_id: String,
    pub date_ranges: Vec<DateRange>,
    pub metrics: Vec<MetricSpec>,
    pub dimensions: Vec<DimensionSpec>,
}

// Backend metric and dimension identifiers.
mod ga {
    pub const SESSIONS: &str = "ga:sessions";
    pub const BOUNCE_RATE: &str = "ga:bounceRate";
    pub const AVG_SESSION_DURATION: &str = "ga:avgSessionDuration";
    pub const PAGEVIEWS: &str = "ga:pageviews";
    pub const USERS: &str = "ga:users";
    pub const PAGEVIEWS_PER_SESSION: &str = "ga:pageviewsPerSession";
    pub const EXITS: &str = "ga:exits";

    pub const DEVICE_CATEGORY: &str = "ga:deviceCategory";
    pub const BROWSER: &str = "ga:browser";
    pub const COUNTRY: &str = "ga:country";
    pub const PAGE_PATH: &str = "ga:pagePath";
    pub const PAGE_TITLE: &str = "ga:pageTitle";
    pub const SOURCE: &str = "ga:source";
    pub const HAS_SOCIAL_SOURCE_REFERRAL: &str = "ga:hasSocialSourceReferral";
}

fn sessions() -> MetricSpec {
    MetricSpec::aliased(ga::SESSIONS, "sessions")
}

fn pageviews() -> MetricSpec {
    MetricSpec::aliased(ga::PAGEVIEWS, "pageviews")
}

fn avg_session_duration() -> MetricSpec {
    MetricSpec::aliased(ga::AVG_SESSION_DURATION, "avgSessionDuration")
}

/// Builds the descriptors for a report kind against one analytics property.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    target_id: String,
}

impl RequestBuilder {
    pub fn new(target_id: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
        }
    }

    /// Build the descriptors for `kind`, in the order the formatter emits them.
    pub fn build(&self, kind: ReportKind) -> Vec<QueryDescriptor> {
        match kind {
            ReportKind::SingleDay => vec![self.visitors(DateRange::yesterday())],
            ReportKind::MultiMetricWindow => {
                let range = DateRange::last_seven_days();
                Section::BREAKDOWN
                    .iter()
                    .map(|section| self.breakdown(*section, range))
                    .collect()
            }
        }
    }

    fn descriptor(
        &self,
        section: Section,
        range: DateRange,
        metrics: Vec<MetricSpec>,
        dimensions: Vec<DimensionSpec>,
    ) -> QueryDescriptor {
        QueryDescriptor {
            section,
            target_id: self.target_id.clone(),
            date_ranges: vec![range],
            metrics,
            dimensions,
        }
    }

    fn visitors(&self, range: DateRange) -> QueryDescriptor {
        self.descriptor(
            Section::Visitors,
            range,
            vec![
                sessions(),
                MetricSpec::aliased(ga::BOUNCE_RATE, "bounceRate"),
                avg_session_duration(),
            ],
            vec![],
        )
    }

    fn breakdown(&self, section: Section, range: DateRange) -> QueryDescriptor {
        let (metrics, dimensions) = match section {
            Section::Devices => (vec![sessions()], vec![DimensionSpec::named(ga::DEVICE_CATEGORY)]),
            Section::Browsers => (vec![sessions()], vec![DimensionSpec::named(ga::BROWSER)]),
            Section::Countries => (vec![sessions()], vec![DimensionSpec::named(ga::COUNTRY)]),
            Section::TopPages => (
                vec![pageviews()],
                vec![
                    DimensionSpec::named(ga::PAGE_PATH),
                    DimensionSpec::named(ga::PAGE_TITLE),
                ],
            ),
            Section::TrafficSources => (
                vec![
                    sessions(),
                    pageviews(),
                    MetricSpec::aliased(ga::USERS, "users"),
                    MetricSpec::aliased(ga::PAGEVIEWS_PER_SESSION, "pageviewsPerSession"),
                    avg_session_duration(),
                    MetricSpec::aliased(ga::EXITS, "exits"),
                ],
                vec![
                    DimensionSpec::named(ga::SOURCE),
                    DimensionSpec::named(ga::HAS_SOCIAL_SOURCE_REFERRAL),
                ],
            ),
            Section::Visitors => return self.visitors(range),
        };

        self.descriptor(section, range, metrics, dimensions)
    }
}

/// Build the descriptors for `kind` against `target_id`.
pub fn build_requests(kind: ReportKind, target_id: &str) -> Vec<QueryDescriptor> {
    RequestBuilder::new(target_id).build(kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::kind::DateToken;

    fn expressions(descriptor: &QueryDescriptor) -> Vec<&str> {
        descriptor
            .metrics
            .iter()
            .map(|m| m.expression.as_str())
            .collect()
    }

    fn dimension_names(descriptor: &QueryDescriptor) -> Vec<&str> {
        descriptor
            .dimensions
            .iter()
            .map(|d| d.name.as_str())
            .collect()
    }

    #[test]
    fn test_single_day_builds_one_totals_query() {
        let descriptors = build_requests(ReportKind::SingleDay, "12345");

        assert_eq!(descriptors.len(), 1);
        let visitors = &descriptors[0];
        assert_eq!(visitors.section, Section::Visitors);
        assert_eq!(visitors.target_id, "12345");
        assert_eq!(
            expressions(visitors),
            vec!["ga:sessions", "ga:bounceRate", "ga:avgSessionDuration"]
        );
        assert!(visitors.dimensions.is_empty());
        assert_eq!(visitors.date_ranges, vec![DateRange::yesterday()]);
    }

    #[test]
    fn test_window_builds_five_sections_in_order() {
        let descriptors = build_requests(ReportKind::MultiMetricWindow, "12345");

        let sections: Vec<Section> = descriptors.iter().map(|d| d.section).collect();
        assert_eq!(sections, Section::BREAKDOWN.to_vec());

        for descriptor in &descriptors {
            assert_eq!(
                descriptor.date_ranges,
                vec![DateRange::new(DateToken::DaysAgo(7), DateToken::Yesterday)]
            );
            assert!(!descriptor.metrics.is_empty());
            assert!(!descriptor.dimensions.is_empty());
        }

        assert_eq!(dimension_names(&descriptors[0]), vec!["ga:deviceCategory"]);
        assert_eq!(dimension_names(&descriptors[1]), vec!["ga:browser"]);
        assert_eq!(dimension_names(&descriptors[2]), vec!["ga:country"]);
        assert_eq!(
            dimension_names(&descriptors[3]),
            vec!["ga:pagePath", "ga:pageTitle"]
        );
        assert_eq!(
            dimension_names(&descriptors[4]),
            vec!["ga:source", "ga:hasSocialSourceReferral"]
        );
    }

    #[test]
    fn test_window_metric_bundles() {
        let descriptors = build_requests(ReportKind::MultiMetricWindow, "1");

        for descriptor in &descriptors[..3] {
            assert_eq!(expressions(descriptor), vec!["ga:sessions"]);
        }
        assert_eq!(expressions(&descriptors[3]), vec!["ga:pageviews"]);
        assert_eq!(
            expressions(&descriptors[4]),
            vec![
                "ga:sessions",
                "ga:pageviews",
                "ga:users",
                "ga:pageviewsPerSession",
                "ga:avgSessionDuration",
                "ga:exits",
            ]
        );
    }

    #[test]
    fn test_descriptor_count_matches_kind() {
        let builder = RequestBuilder::new("1");
        for kind in ReportKind::ALL {
            assert_eq!(builder.build(kind).len(), kind.expected_queries());
        }
    }
}
