//! Platform-neutral message types.

use derive_getters::Getters;
use derive_new::new;

/// Opaque user identifier assigned by the transport.
pub type UserId = i64;

/// Opaque chat identifier assigned by the transport.
pub type ChatId = i64;

/// Kind of chat a message arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatKind {
    /// One-to-one chat between a user and the bot.
    Private,
    /// Group chat with several members.
    Group,
}

/// A chat user as seen by the bot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Getters, new)]
pub struct Participant {
    /// User ID.
    id: UserId,
    /// Name used when announcing results.
    display_name: String,
}

/// One inbound message from the transport.
#[derive(Debug, Clone, PartialEq, Eq, Getters, new)]
pub struct InboundMessage {
    /// Transport message ID, used only for logging.
    message_id: i64,
    /// Sender.
    from: Participant,
    /// Chat the message was posted in.
    chat: ChatId,
    /// Private or group chat.
    kind: ChatKind,
    /// Text content; `None` for stickers, photos and other non-text messages.
    text: Option<String>,
}

impl InboundMessage {
    /// Returns `true` if the message arrived in a private chat.
    pub fn is_private(&self) -> bool {
        self.kind == ChatKind::Private
    }
}

/// Identity of the bot account.
#[derive(Debug, Clone, PartialEq, Eq, Getters, new)]
pub struct BotIdentity {
    /// Bot user ID.
    id: UserId,
    /// Bot username without the leading `@`.
    username: String,
}
