//! Strictly RPS library - rock-paper-scissors over chat
//!
//! Matches players, collects one move from each over private chats, and
//! announces the result.
//!
//! # Architecture
//!
//! - **Games**: choice parsing and outcome evaluation
//! - **Session**: race-free registry of pending moves and recruiting groups
//! - **Directory**: user to private chat mapping with JSON snapshots
//! - **Coordinator**: one task per game, solo or group
//! - **Dispatcher**: routes each inbound message
//! - **Transport**: Telegram Bot API client and an in-memory test transport
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use strictly_rps::{Bot, BotConfig, BotIdentity, MemoryTransport};
//! use tokio::sync::mpsc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() {
//! let (transport, _log) = MemoryTransport::new(BotIdentity::new(1, "rps_bot".to_string()));
//! let bot = Bot::new(&BotConfig::default(), Arc::new(transport));
//! let (_tx, rx) = mpsc::channel(16);
//! bot.run(rx, CancellationToken::new()).await;
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod bot;
mod command;
mod config;
mod coordinator;
mod directory;
mod dispatcher;
mod games;
mod session;
mod transport;

pub mod messages;

// Crate-level exports - Process wiring
pub use bot::{Bot, run_telegram};

// Crate-level exports - Commands
pub use command::{Command, CommandParser, HELP_TEXT, ParsedText};

// Crate-level exports - Configuration
pub use config::{BotConfig, ConfigError, ConfigOverrides, TOKEN_ENV};

// Crate-level exports - Game coordination
pub use coordinator::{CoordinatorSettings, GameCoordinator, StartRejection};
pub use dispatcher::{Dispatch, Dispatcher};

// Crate-level exports - Directory
pub use directory::{Directory, DirectoryError, DirectorySnapshot};

// Crate-level exports - Game types
pub use games::rps::{Choice, Outcome, evaluate, format_result, format_solo_result};

// Crate-level exports - Session registry
pub use session::{
    AlreadyClaimed, AlreadyOpen, AwaitSlot, Delivery, Forward, GroupInbox, PairConflict,
    SessionRegistry, SlotClosed,
};

// Crate-level exports - Transport
pub use transport::{
    BotIdentity, ChatId, ChatKind, InboundMessage, MemoryTransport, OutboundLog,
    OutboundMessage, Participant, TelegramTransport, Transport, TransportError, UserId,
    split_message,
};
