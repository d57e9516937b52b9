//! The QueryExecutor seam.
//!
//! The pipeline only sees this trait. Transport and authentication live in
//! implementations such as [`super::HttpQueryExecutor`]; tests inject fakes.

use async_trait::async_trait;

use super::error::ExecutorResult;
use crate::report::{QueryDescriptor, QueryResult};

/// Runs a batch of query descriptors against an analytics backend.
///
/// Implementations return one result per descriptor, each tagged with the
/// descriptor's section. A call is a single attempt: no retries.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, descriptors: &[QueryDescriptor]) -> ExecutorResult<Vec<QueryResult>>;
}
