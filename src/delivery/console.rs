//! Sink that writes segments to stdout instead of a chat service.

use std::io::Write;
use std::num::NonZeroUsize;

use async_trait::async_trait;

use super::error::DeliveryResult;
use super::sink::{ChannelId, DeliverySink};

/// Prints each segment, framed with its channel, for previews.
pub struct ConsoleSink {
    limit: NonZeroUsize,
}

impl ConsoleSink {
    pub fn new(limit: NonZeroUsize) -> Self {
        Self { limit }
    }
}

#[async_trait]
impl DeliverySink for ConsoleSink {
    fn message_limit(&self) -> NonZeroUsize {
        self.limit
    }

    async fn send(&self, channel: &ChannelId, text: &str) -> DeliveryResult<()> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        writeln!(out, "----- #{} ({} chars) -----", channel, text.chars().count())?;
        write!(out, "{}", text)?;
        if !text.ends_with('\n') {
            writeln!(out)?;
        }
        out.flush()?;
        Ok(())
    }
}
