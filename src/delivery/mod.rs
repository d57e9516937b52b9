//! Delivery of message segments to a chat channel.

mod console;
mod discord;
mod error;
mod sink;

pub use console::ConsoleSink;
pub use discord::{DiscordSink, DEFAULT_API_BASE};
pub use error::{DeliveryError, DeliveryResult};
pub use sink::{ChannelId, DeliverySink, DISCORD_MESSAGE_LIMIT};
