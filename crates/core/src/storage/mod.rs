//! Key-value persistence for session state.
//!
//! The session never touches a storage medium directly. It reads and writes
//! JSON strings through a [`KeyValueStore`] handed to it by the host.

mod error;
mod file;
mod memory;

pub use error::StorageError;
pub use file::FileStore;
pub use memory::MemoryStore;

/// String store addressed by key.
pub trait KeyValueStore {
    /// Loads the value saved under `key`, if any.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Saves `value` under `key`, replacing any previous value.
    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}
