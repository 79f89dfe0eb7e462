//! Directory of private chats, keyed by user, with file snapshots.

mod error;
mod snapshot;
mod store;

pub use error::DirectoryError;
pub use snapshot::DirectorySnapshot;
pub use store::Directory;
