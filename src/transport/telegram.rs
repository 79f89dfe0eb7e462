//! Telegram transport built on `teloxide`.
//!
//! Receives messages through a long-polling dispatcher and sends with
//! `sendMessage`. Only `message` updates are consumed.

use super::{
    BotIdentity, ChatId, ChatKind, InboundMessage, Participant, Transport, TransportError,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use teloxide::dispatching::{Dispatcher, UpdateFilterExt};
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::requests::Requester;
use teloxide::types::{AllowedUpdate, Chat, Message, Update, User};
use teloxide::update_listeners::Polling;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Telegram's maximum message length in characters.
const MAX_MESSAGE_LEN: usize = 4096;

/// Maps a Telegram chat onto the two kinds the bot plays in.
fn chat_kind(chat: &Chat) -> Option<ChatKind> {
    if chat.is_private() {
        Some(ChatKind::Private)
    } else if chat.is_group() || chat.is_supergroup() {
        Some(ChatKind::Group)
    } else {
        None
    }
}

/// The sender as a participant: first name plus last name when present.
fn participant(user: &User) -> Participant {
    Participant::new(user.id.0 as i64, user.full_name())
}

/// Converts into the platform-neutral form.
///
/// Channel posts and messages without a sender are dropped.
fn to_inbound(msg: &Message) -> Option<InboundMessage> {
    let kind = chat_kind(&msg.chat)?;
    let from = msg.from.as_ref()?;
    Some(InboundMessage::new(
        i64::from(msg.id.0),
        participant(from),
        msg.chat.id.0,
        kind,
        msg.text().map(str::to_string),
    ))
}

/// Bot API client implementing [`Transport`].
#[derive(Debug, Clone)]
pub struct TelegramTransport {
    bot: teloxide::Bot,
    identity: BotIdentity,
    poll_timeout: Duration,
}

impl TelegramTransport {
    /// Connects to the Bot API and fetches the bot identity with `getMe`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the API URL is invalid, the API is
    /// unreachable, it rejects the token, or the bot account has no username.
    #[instrument(skip(token))]
    pub async fn connect(
        api_url: &str,
        token: &str,
        poll_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let url = reqwest::Url::parse(api_url)
            .map_err(|e| TransportError::new(format!("Invalid API URL {}: {}", api_url, e)))?;
        let bot = teloxide::Bot::new(token).set_api_url(url);

        let me = bot.get_me().await?;
        let username = me
            .user
            .username
            .clone()
            .ok_or_else(|| TransportError::new("Bot account has no username"))?;
        let id = me.user.id.0 as i64;

        info!(bot_id = id, username = %username, "Connected to Telegram");
        Ok(Self {
            bot,
            identity: BotIdentity::new(id, username),
            poll_timeout,
        })
    }

    /// Spawns the polling dispatcher feeding `inbound` until `shutdown` fires.
    #[instrument(skip_all)]
    pub fn spawn_poller(
        self: Arc<Self>,
        inbound: mpsc::Sender<InboundMessage>,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        let handler = Update::filter_message().endpoint(move |msg: Message| {
            let inbound = inbound.clone();
            async move {
                match to_inbound(&msg) {
                    Some(message) => {
                        if inbound.send(message).await.is_err() {
                            debug!("Dispatch channel closed, dropping message");
                        }
                    }
                    None => debug!(message_id = msg.id.0, "Ignoring message"),
                }
                Ok::<(), TransportError>(())
            }
        });

        let listener = Polling::builder(self.bot.clone())
            .timeout(self.poll_timeout)
            .allowed_updates(vec![AllowedUpdate::Message])
            .build();

        tokio::spawn(async move {
            let mut dispatcher = Dispatcher::builder(self.bot.clone(), handler).build();

            let shutdown_token = dispatcher.shutdown_token();
            let watcher = tokio::spawn(async move {
                shutdown.cancelled().await;
                if let Err(e) = shutdown_token.shutdown() {
                    warn!(error = ?e, "Update dispatcher was not running");
                }
            });

            info!("Update poller started");
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("Telegram update listener error"),
                )
                .await;
            watcher.abort();
            info!("Update poller stopped");
        })
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    fn identity(&self) -> &BotIdentity {
        &self.identity
    }

    #[instrument(skip(self, text), fields(len = text.len()))]
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<(), TransportError> {
        for chunk in split_message(text, MAX_MESSAGE_LEN) {
            self.bot
                .send_message(teloxide::types::ChatId(chat), chunk)
                .await?;
        }
        debug!(chat, "Message sent");
        Ok(())
    }
}

/// Splits text into chunks of at most `max_len` characters, preferring line
/// boundaries.
pub fn split_message(text: &str, max_len: usize) -> Vec<String> {
    if text.chars().count() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.lines() {
        let line_len = line.chars().count();
        if current_len > 0 && current_len + 1 + line_len > max_len {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if line_len > max_len {
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(max_len) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }
        if current_len > 0 {
            current.push('\n');
            current_len += 1;
        }
        current.push_str(line);
        current_len += line_len;
    }

    if current_len > 0 {
        chunks.push(current);
    }
    chunks
}
