//! Fake collaborators shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use beacon::delivery::{ChannelId, DeliveryError, DeliveryResult, DeliverySink};
use beacon::query::{ExecutorResult, QueryError, QueryExecutor};
use beacon::report::{QueryDescriptor, QueryResult, Row, Section};

/// Canned result for a section, shaped like the real backend's answer.
pub fn canned_result(section: Section) -> QueryResult {
    match section {
        Section::Visitors => QueryResult::new(section, vec![], vec![Row::totals(["10", "0.5", "125"])]),
        Section::Devices => QueryResult::new(
            section,
            vec![Row::new(["desktop"], ["42"]), Row::new(["mobile"], ["58"])],
            vec![Row::totals(["100"])],
        ),
        Section::Browsers => QueryResult::new(
            section,
            vec![Row::new(["Chrome"], ["60"]), Row::new(["Firefox"], ["40"])],
            vec![Row::totals(["100"])],
        ),
        Section::Countries => QueryResult::new(
            section,
            vec![Row::new(["Germany"], ["70"]), Row::new(["Austria"], ["30"])],
            vec![Row::totals(["100"])],
        ),
        Section::TopPages => QueryResult::new(
            section,
            vec![
                Row::new(["/", "Home"], ["120"]),
                Row::new(["/blog", "Blog"], ["80"]),
            ],
            vec![Row::totals(["200"])],
        ),
        Section::TrafficSources => QueryResult::new(
            section,
            vec![Row::new(
                ["(direct)", "No"],
                ["55", "130", "50", "2.36", "95.2", "55"],
            )],
            vec![Row::totals(["55", "130", "50", "2.36", "95.2", "55"])],
        ),
    }
}

/// Answers every descriptor with [`canned_result`] and counts calls.
#[derive(Default)]
pub struct FakeExecutor {
    pub calls: AtomicUsize,
    /// Extra rows appended to the device section.
    pub extra_device_rows: usize,
}

impl FakeExecutor {
    pub fn with_device_rows(rows: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            extra_device_rows: rows,
        }
    }
}

#[async_trait]
impl QueryExecutor for FakeExecutor {
    async fn execute(&self, descriptors: &[QueryDescriptor]) -> ExecutorResult<Vec<QueryResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(descriptors
            .iter()
            .map(|d| {
                let mut result = canned_result(d.section);
                if d.section == Section::Devices {
                    for i in 0..self.extra_device_rows {
                        result
                            .rows
                            .push(Row::new([format!("device-{}", i)], [i.to_string()]));
                    }
                }
                result
            })
            .collect())
    }
}

/// Fails every call with a remote error.
pub struct FailingExecutor;

#[async_trait]
impl QueryExecutor for FailingExecutor {
    async fn execute(&self, _descriptors: &[QueryDescriptor]) -> ExecutorResult<Vec<QueryResult>> {
        Err(QueryError::remote(503, "backend unavailable"))
    }
}

/// Returns one result fewer than requested.
pub struct ShortExecutor;

#[async_trait]
impl QueryExecutor for ShortExecutor {
    async fn execute(&self, descriptors: &[QueryDescriptor]) -> ExecutorResult<Vec<QueryResult>> {
        Ok(descriptors
            .iter()
            .skip(1)
            .map(|d| canned_result(d.section))
            .collect())
    }
}

/// Records every segment; optionally fails chosen call indexes.
pub struct RecordingSink {
    limit: NonZeroUsize,
    fail_on: HashSet<usize>,
    attempts: AtomicUsize,
    pub sent: Mutex<Vec<(ChannelId, String)>>,
}

impl RecordingSink {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: NonZeroUsize::new(limit).expect("limit must be non-zero"),
            fail_on: HashSet::new(),
            attempts: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(limit: usize, fail_on: &[usize]) -> Self {
        Self {
            fail_on: fail_on.iter().copied().collect(),
            ..Self::new(limit)
        }
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeliverySink for RecordingSink {
    fn message_limit(&self) -> NonZeroUsize {
        self.limit
    }

    async fn send(&self, channel: &ChannelId, text: &str) -> DeliveryResult<()> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_on.contains(&attempt) {
            return Err(DeliveryError::rejected(500, "sink refused"));
        }
        self.sent
            .lock()
            .unwrap()
            .push((channel.clone(), text.to_string()));
        Ok(())
    }
}
