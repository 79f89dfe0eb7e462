//! Concurrent user-to-private-chat mapping.

use super::{DirectoryError, DirectorySnapshot};
use crate::transport::{ChatId, UserId};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info, instrument};

/// Read-mostly directory of users' private chats.
///
/// Entries are never evicted; a stale entry at worst makes one send fail.
#[derive(Debug, Default)]
pub struct Directory {
    chats: RwLock<HashMap<UserId, ChatId>>,
}

impl Directory {
    /// Creates an empty directory.
    #[instrument]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `user`'s private chat, replacing any previous one.
    #[instrument(skip(self))]
    pub fn put(&self, user: UserId, chat: ChatId) {
        let previous = self
            .chats
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user, chat);
        if previous != Some(chat) {
            debug!(user, chat, "Private chat recorded");
        }
    }

    /// Looks up `user`'s private chat.
    #[instrument(skip(self))]
    pub fn get(&self, user: UserId) -> Option<ChatId> {
        self.chats
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&user)
            .copied()
    }

    /// Returns `true` if `user`'s private chat is known.
    #[instrument(skip(self))]
    pub fn contains(&self, user: UserId) -> bool {
        self.chats
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&user)
    }

    /// Number of known users.
    pub fn len(&self) -> usize {
        self.chats.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` if no users are known.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies the directory under a read lock.
    #[instrument(skip(self))]
    pub fn snapshot(&self) -> DirectorySnapshot {
        let entries: Vec<(UserId, ChatId)> = self
            .chats
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(user, chat)| (*user, *chat))
            .collect();
        DirectorySnapshot::from_entries(entries)
    }

    /// Merges `snapshot` into the live map; colliding keys take the snapshot's
    /// value. Returns the number of entries merged.
    #[instrument(skip(self, snapshot), fields(count = snapshot.chats.len()))]
    pub fn restore(&self, snapshot: &DirectorySnapshot) -> usize {
        let entries = snapshot.entries();
        let merged = entries.len();
        self.chats
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(entries);
        info!(merged, "Directory restored");
        merged
    }

    /// Restores from a JSON file. A missing file is an empty directory.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] if the file exists but cannot be read or parsed.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<usize, DirectoryError> {
        let content = match std::fs::read_to_string(path.as_ref()) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No directory file yet, starting empty");
                return Ok(0);
            }
            Err(e) => return Err(e.into()),
        };
        let snapshot: DirectorySnapshot = serde_json::from_str(&content)?;
        Ok(self.restore(&snapshot))
    }

    /// Writes a snapshot to `path`, replacing it atomically via a sibling
    /// temporary file.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] if serialization or any file operation fails.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn save_file(&self, path: impl AsRef<Path>) -> Result<usize, DirectoryError> {
        let path = path.as_ref();
        let snapshot = self.snapshot();
        let json = serde_json::to_string(&snapshot)?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;

        info!(count = snapshot.chats.len(), "Directory saved");
        Ok(snapshot.chats.len())
    }
}
