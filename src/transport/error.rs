//! Transport error types.

use derive_more::{Display, Error};
use tracing::instrument;

/// Transport error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Transport error: {} at {}:{}", message, file, line)]
pub struct TransportError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl TransportError {
    /// Creates a new transport error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<teloxide::RequestError> for TransportError {
    #[track_caller]
    fn from(err: teloxide::RequestError) -> Self {
        Self::new(format!("Bot API error: {}", err))
    }
}
