//! Query execution against the analytics backend.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                   Pipeline                   │
//! └──────────────────────────────────────────────┘
//!                       │ &[QueryDescriptor]
//!                       ▼
//! ┌──────────────────────────────────────────────┐
//! │        dyn QueryExecutor (async trait)       │
//! │  HttpQueryExecutor: reports:batchGet + JSON  │
//! └──────────────────────────────────────────────┘
//!                       │ Vec<QueryResult> (tagged)
//!                       ▼
//! ```

mod error;
mod executor;
mod http;
pub mod protocol;

pub use error::{ExecutorResult, QueryError};
pub use executor::QueryExecutor;
pub use http::HttpQueryExecutor;
