//! Serialized form of the directory.

use crate::transport::{ChatId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{instrument, warn};

/// External representation: `{ "chats": { "<user-id>": <chat-id>, ... } }`.
///
/// Keys are stringified user IDs because JSON object keys are text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorySnapshot {
    /// User ID (as text) to private chat ID.
    pub chats: BTreeMap<String, ChatId>,
}

impl DirectorySnapshot {
    /// Builds a snapshot from typed entries.
    pub fn from_entries(entries: impl IntoIterator<Item = (UserId, ChatId)>) -> Self {
        Self {
            chats: entries
                .into_iter()
                .map(|(user, chat)| (user.to_string(), chat))
                .collect(),
        }
    }

    /// Typed entries; keys that are not integers are skipped with a warning.
    #[instrument(skip(self), fields(count = self.chats.len()))]
    pub fn entries(&self) -> Vec<(UserId, ChatId)> {
        self.chats
            .iter()
            .filter_map(|(key, chat)| match key.parse::<UserId>() {
                Ok(user) => Some((user, *chat)),
                Err(e) => {
                    warn!(key = %key, error = %e, "Skipping malformed directory key");
                    None
                }
            })
            .collect()
    }
}
