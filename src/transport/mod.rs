//! Chat transport: inbound message model and outbound delivery.
//!
//! The bot core only needs two things from a chat platform: a stream of
//! [`InboundMessage`]s and a way to send text to a chat. [`Transport`] covers
//! the sending side; each implementation feeds inbound messages into the
//! dispatch channel in its own way.

mod error;
mod memory;
mod telegram;
mod types;

pub use error::TransportError;
pub use memory::{MemoryTransport, OutboundLog, OutboundMessage};
pub use telegram::{TelegramTransport, split_message};
pub use types::{BotIdentity, ChatId, ChatKind, InboundMessage, Participant, UserId};

use async_trait::async_trait;

/// Outbound side of a chat platform.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Identity of the bot on this platform.
    fn identity(&self) -> &BotIdentity;

    /// Sends a plain text message to a chat.
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<(), TransportError>;
}
