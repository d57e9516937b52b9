//! # Beacon
//!
//! Scheduled web-analytics digests delivered to a chat channel.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │              Scheduler (daily UTC fire times)            │
//! └─────────────────────────────────────────────────────────┘
//!                          │ run(kinds)
//!                          ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │  RequestBuilder → QueryDescriptor (tagged by Section)    │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [dyn QueryExecutor]
//! ┌─────────────────────────────────────────────────────────┐
//! │  QueryResult (echoes Section) → ReportFormatter          │
//! └─────────────────────────────────────────────────────────┘
//!                          │ ReportText
//!                          ▼ [chunk]
//! ┌─────────────────────────────────────────────────────────┐
//! │  MessageSegment × N → dyn DeliverySink                   │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Request building, formatting and chunking are pure. The executor and the
//! sink are injected, so tests swap in fakes.

pub mod chunk;
pub mod config;
pub mod delivery;
pub mod logging;
pub mod pipeline;
pub mod query;
pub mod report;
pub mod schedule;

pub use chunk::{chunk, MessageSegment};
pub use pipeline::{Pipeline, PipelineError, RunReport};
pub use report::{ReportKind, ReportText};
