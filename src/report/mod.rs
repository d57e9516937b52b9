//! Report construction and rendering.
//!
//! ```text
//! ReportKind ──[RequestBuilder]──▶ QueryDescriptor (tagged by Section)
//!                                        │
//!                                        ▼ executor
//!                                  QueryResult (echoes Section)
//!                                        │
//!                                        ▼ [ReportFormatter]
//!                                    ReportText
//! ```

pub mod error;
pub mod format;
pub mod kind;
pub mod request;
pub mod result;

pub use error::{ReportError, ReportResult};
pub use format::{format_report, ReportFormatter, ReportText, DEFAULT_LABEL};
pub use kind::{DateRange, DateToken, ReportKind};
pub use request::{
    build_requests, DimensionSpec, MetricSpec, QueryDescriptor, RequestBuilder, Section,
};
pub use result::{QueryResult, Row};
