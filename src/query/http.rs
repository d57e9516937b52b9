//! HTTP executor for the Analytics Reporting v4 API.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::error::{ExecutorResult, QueryError};
use super::executor::QueryExecutor;
use super::protocol::{error_message, BatchGetRequest, BatchGetResponse};
use crate::config::AnalyticsSettings;
use crate::report::{QueryDescriptor, QueryResult};

/// Default timeout for requests (30 seconds).
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Executes descriptors with one `reports:batchGet` call.
///
/// Authentication is a pre-issued bearer token; obtaining and refreshing it is
/// left to whatever provisions the configuration.
pub struct HttpQueryExecutor {
    client: reqwest::Client,
    endpoint: String,
    access_token: String,
    timeout: Duration,
}

impl HttpQueryExecutor {
    /// Create an executor with the default timeout.
    pub fn new(
        endpoint: impl Into<String>,
        access_token: impl Into<String>,
    ) -> ExecutorResult<Self> {
        Self::with_timeout(
            endpoint,
            access_token,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create an executor with a custom request timeout.
    pub fn with_timeout(
        endpoint: impl Into<String>,
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> ExecutorResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(QueryError::Transport)?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            access_token: access_token.into(),
            timeout,
        })
    }

    /// Create an executor from resolved analytics settings.
    pub fn from_settings(settings: &AnalyticsSettings, access_token: String) -> ExecutorResult<Self> {
        Self::with_timeout(
            settings.endpoint.clone(),
            access_token,
            Duration::from_secs(settings.timeout_secs),
        )
    }

    fn classify_transport(&self, err: reqwest::Error) -> QueryError {
        if err.is_timeout() {
            QueryError::Timeout(self.timeout.as_secs())
        } else {
            QueryError::Transport(err)
        }
    }
}

#[async_trait]
impl QueryExecutor for HttpQueryExecutor {
    async fn execute(&self, descriptors: &[QueryDescriptor]) -> ExecutorResult<Vec<QueryResult>> {
        let body = BatchGetRequest::from_descriptors(descriptors);
        debug!(
            endpoint = %self.endpoint,
            requests = body.report_requests.len(),
            "sending batchGet"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify_transport(e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.classify_transport(e))?;

        if !status.is_success() {
            return Err(QueryError::from_status(status.as_u16(), error_message(&text)));
        }

        let parsed: BatchGetResponse = serde_json::from_str(&text)?;
        parsed.into_results(descriptors)
    }
}
