//! Discord REST sink.

use std::num::NonZeroUsize;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{DeliveryError, DeliveryResult};
use super::sink::{ChannelId, DeliverySink, DISCORD_MESSAGE_LIMIT};
use crate::config::ChatSettings;

/// Default Discord REST base URL.
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

#[derive(Debug, Serialize)]
struct CreateMessage<'a> {
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

/// Posts messages with a bot token through the channel messages endpoint.
pub struct DiscordSink {
    client: reqwest::Client,
    api_base: String,
    bot_token: String,
    limit: NonZeroUsize,
}

impl DiscordSink {
    /// Create a sink with Discord's message limit.
    pub fn new(
        api_base: impl Into<String>,
        bot_token: impl Into<String>,
        timeout: Duration,
    ) -> DeliveryResult<Self> {
        let limit = NonZeroUsize::new(DISCORD_MESSAGE_LIMIT).unwrap_or(NonZeroUsize::MIN);
        Self::with_limit(api_base, bot_token, timeout, limit)
    }

    /// Create a sink with a custom message limit.
    pub fn with_limit(
        api_base: impl Into<String>,
        bot_token: impl Into<String>,
        timeout: Duration,
        limit: NonZeroUsize,
    ) -> DeliveryResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(DeliveryError::Transport)?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
            limit,
        })
    }

    /// Create a sink from resolved chat settings.
    pub fn from_settings(settings: &ChatSettings, bot_token: String) -> DeliveryResult<Self> {
        Self::with_limit(
            settings.api_base.clone(),
            bot_token,
            Duration::from_secs(settings.timeout_secs),
            settings.limit(),
        )
    }

    fn messages_url(&self, channel: &ChannelId) -> String {
        format!("{}/channels/{}/messages", self.api_base, channel)
    }
}

#[async_trait]
impl DeliverySink for DiscordSink {
    fn message_limit(&self) -> NonZeroUsize {
        self.limit
    }

    async fn send(&self, channel: &ChannelId, text: &str) -> DeliveryResult<()> {
        let length = text.chars().count();
        if length > self.limit.get() {
            return Err(DeliveryError::SegmentTooLong {
                length,
                limit: self.limit.get(),
            });
        }

        debug!(channel = %channel, chars = length, "posting message");
        let response = self
            .client
            .post(self.messages_url(channel))
            .header("Authorization", format!("Bot {}", self.bot_token))
            .json(&CreateMessage { content: text })
            .send()
            .await
            .map_err(DeliveryError::Transport)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiError>(&body)
            .map(|e| e.message)
            .unwrap_or_else(|_| body.trim().to_string());
        Err(DeliveryError::rejected(status.as_u16(), message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_url_trims_trailing_slash() {
        let sink = DiscordSink::new("https://example.test/api/", "t", Duration::from_secs(1)).unwrap();
        assert_eq!(
            sink.messages_url(&ChannelId::new("42")),
            "https://example.test/api/channels/42/messages"
        );
        assert_eq!(sink.message_limit().get(), DISCORD_MESSAGE_LIMIT);
    }

    #[tokio::test]
    async fn test_oversized_segment_is_rejected_locally() {
        let limit = NonZeroUsize::new(3).unwrap();
        let sink = DiscordSink::with_limit("http://127.0.0.1:9", "t", Duration::from_secs(1), limit)
            .unwrap();

        let err = sink.send(&ChannelId::new("1"), "abcd").await.unwrap_err();
        assert!(matches!(
            err,
            DeliveryError::SegmentTooLong {
                length: 4,
                limit: 3
            }
        ));
    }
}
