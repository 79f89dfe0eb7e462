//! In-process transport that records outbound messages.
//!
//! Used by the test suite and for driving the bot without a network.

use super::{BotIdentity, ChatId, Transport, TransportError};
use async_trait::async_trait;
use derive_getters::Getters;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, instrument};

/// A message the bot sent.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct OutboundMessage {
    /// Destination chat.
    chat: ChatId,
    /// Message text.
    text: String,
}

/// Transport that delivers every outbound message to an [`OutboundLog`].
#[derive(Debug)]
pub struct MemoryTransport {
    identity: BotIdentity,
    outbound: mpsc::UnboundedSender<OutboundMessage>,
    fail_sends: AtomicBool,
}

impl MemoryTransport {
    /// Creates a transport and the log receiving its messages.
    #[instrument]
    pub fn new(identity: BotIdentity) -> (Self, OutboundLog) {
        let (outbound, rx) = mpsc::unbounded_channel();
        let transport = Self {
            identity,
            outbound,
            fail_sends: AtomicBool::new(false),
        };
        (transport, OutboundLog { rx })
    }

    /// Makes every subsequent send fail (or succeed again).
    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    fn identity(&self) -> &BotIdentity {
        &self.identity
    }

    #[instrument(skip(self, text))]
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<(), TransportError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(TransportError::new("sends disabled"));
        }
        debug!(chat, text, "Recording outbound message");
        self.outbound
            .send(OutboundMessage {
                chat,
                text: text.to_string(),
            })
            .map_err(|_| TransportError::new("outbound log dropped"))
    }
}

/// Receiving end of a [`MemoryTransport`], in send order.
#[derive(Debug)]
pub struct OutboundLog {
    rx: mpsc::UnboundedReceiver<OutboundMessage>,
}

impl OutboundLog {
    /// Waits up to `limit` for the next message.
    pub async fn next_within(&mut self, limit: Duration) -> Option<OutboundMessage> {
        tokio::time::timeout(limit, self.rx.recv()).await.ok().flatten()
    }

    /// Returns all messages already sent without waiting.
    pub fn drain(&mut self) -> Vec<OutboundMessage> {
        let mut messages = Vec::new();
        while let Ok(message) = self.rx.try_recv() {
            messages.push(message);
        }
        messages
    }
}
