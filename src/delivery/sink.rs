//! The DeliverySink seam.

use std::fmt;
use std::num::NonZeroUsize;

use async_trait::async_trait;

use super::error::DeliveryResult;

/// Per-message character limit of Discord channels.
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;

/// Identifier of the channel a sink posts to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelId(String);

impl ChannelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accepts single text segments addressed to a channel.
///
/// Each call is one fire-and-forget attempt. Callers keep segments within
/// [`DeliverySink::message_limit`].
#[async_trait]
pub trait DeliverySink: Send + Sync {
    /// Maximum number of characters one message may hold.
    fn message_limit(&self) -> NonZeroUsize;

    /// Post `text` to `channel`.
    async fn send(&self, channel: &ChannelId, text: &str) -> DeliveryResult<()>;
}
