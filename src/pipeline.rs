//! End-to-end digest generation and delivery.
//!
//! ```text
//! kinds → Build requests → Execute → Validate → Format → Join → Chunk → Deliver
//! ```
//!
//! Any failure before delivery collapses into a single fallback message: the
//! channel receives either the full digest or one error line, never both.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use beacon::pipeline::Pipeline;
//! use beacon::report::{ReportKind, RequestBuilder};
//! use beacon::delivery::ChannelId;
//!
//! let pipeline = Pipeline::new(
//!     RequestBuilder::new("123456789"),
//!     Arc::new(executor),
//!     Arc::new(sink),
//!     ChannelId::new("702871548872228994"),
//! );
//! let report = pipeline.run(&ReportKind::ALL).await;
//! ```

use std::sync::Arc;

use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::chunk::{chunk, truncate, MessageSegment};
use crate::config::DEFAULT_ERROR_PREFIX;
use crate::delivery::{ChannelId, DeliverySink};
use crate::query::{QueryError, QueryExecutor};
use crate::report::{
    QueryDescriptor, QueryResult, ReportError, ReportFormatter, ReportKind, ReportText,
    RequestBuilder,
};

// ============================================================================
// Error Types
// ============================================================================

/// Errors that stop a digest from being generated.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("malformed analytics result: {0}")]
    Malformed(#[from] ReportError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

// ============================================================================
// Result Types
// ============================================================================

/// What one invocation of [`Pipeline::run`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Correlates the run's log lines.
    pub run_id: Uuid,
    /// Whether the digest was generated (false means the fallback was sent).
    pub generated: bool,
    pub segments_sent: usize,
    pub segments_failed: usize,
}

// ============================================================================
// Pipeline
// ============================================================================

/// Builds, formats and delivers digests through injected collaborators.
///
/// Holds no mutable state, so concurrent runs are safe.
pub struct Pipeline {
    builder: RequestBuilder,
    formatter: ReportFormatter,
    executor: Arc<dyn QueryExecutor>,
    sink: Arc<dyn DeliverySink>,
    channel: ChannelId,
    error_prefix: String,
}

impl Pipeline {
    pub fn new(
        builder: RequestBuilder,
        executor: Arc<dyn QueryExecutor>,
        sink: Arc<dyn DeliverySink>,
        channel: ChannelId,
    ) -> Self {
        Self {
            builder,
            formatter: ReportFormatter::default(),
            executor,
            sink,
            channel,
            error_prefix: DEFAULT_ERROR_PREFIX.to_string(),
        }
    }

    /// Set the formatter (and with it the title label).
    pub fn with_formatter(mut self, formatter: ReportFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Set the prefix of the fallback message.
    pub fn with_error_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.error_prefix = prefix.into();
        self
    }

    /// Generate the digest for `kinds` without delivering it.
    ///
    /// Documents are joined in the order given, separated by a line break.
    pub async fn generate(&self, kinds: &[ReportKind]) -> PipelineResult<ReportText> {
        let mut documents = Vec::with_capacity(kinds.len());
        for kind in kinds {
            documents.push(self.generate_one(*kind).await?);
        }
        Ok(ReportText::join(&documents))
    }

    async fn generate_one(&self, kind: ReportKind) -> PipelineResult<ReportText> {
        let descriptors = self.builder.build(kind);
        debug!(kind = %kind, queries = descriptors.len(), "executing report queries");

        let results = self
            .executor
            .execute(&descriptors)
            .await
            .map_err(|err| match err {
                QueryError::ResultCount { expected, actual } => {
                    PipelineError::Malformed(ReportError::ResultCount {
                        kind: kind.as_str(),
                        expected,
                        actual,
                    })
                }
                other => PipelineError::Query(other),
            })?;
        validate_shapes(&descriptors, &results)?;

        Ok(self.formatter.format(kind, &results)?)
    }

    /// Generate and deliver the digest for `kinds`.
    ///
    /// Never fails: a generation error is delivered as exactly one fallback
    /// message, cut to the sink's limit, and delivery errors are logged and
    /// counted.
    pub async fn run(&self, kinds: &[ReportKind]) -> RunReport {
        let run_id = Uuid::new_v4();
        let span = info_span!("report_run", %run_id, channel = %self.channel);

        async {
            info!(kinds = ?kinds, "generating report");
            let limit = self.sink.message_limit();
            let (generated, segments) = match self.generate(kinds).await {
                Ok(text) => (true, chunk(text.as_str(), limit)),
                Err(err) => {
                    let retriable = matches!(&err, PipelineError::Query(q) if q.is_retriable());
                    error!(error = %err, retriable, "report generation failed");
                    let message = format!("{}{}", self.error_prefix, err);
                    (false, vec![truncate(&message, limit)])
                }
            };

            let (segments_sent, segments_failed) = self.deliver(segments).await;
            info!(generated, segments_sent, segments_failed, "report run finished");

            RunReport {
                run_id,
                generated,
                segments_sent,
                segments_failed,
            }
        }
        .instrument(span)
        .await
    }

    /// Deliver segments in order; later segments are attempted after a failure.
    async fn deliver(&self, segments: Vec<MessageSegment>) -> (usize, usize) {
        let total = segments.len();
        let mut sent = 0;
        let mut failed = 0;

        for segment in segments {
            match self.sink.send(&self.channel, &segment.text).await {
                Ok(()) => sent += 1,
                Err(err) => {
                    failed += 1;
                    warn!(segment = segment.index, total, error = %err, "segment delivery failed");
                }
            }
        }

        (sent, failed)
    }
}

/// Check each result against the descriptor carrying the same section.
///
/// Missing or surplus results are left to the formatter's count and lookup
/// checks.
fn validate_shapes(descriptors: &[QueryDescriptor], results: &[QueryResult]) -> PipelineResult<()> {
    for descriptor in descriptors {
        if let Some(result) = results.iter().find(|r| r.section == descriptor.section) {
            result.validate_against(descriptor)?;
        }
    }
    Ok(())
}
