//! Durable key-value settings storage
//!
//! Both sides persist their settings through this capability: the timer side
//! keeps the two thresholds, the editing side additionally keeps the
//! confirmed-sync watermark.

pub mod json_file;
pub mod memory;

use thiserror::Error;

// Re-export main types
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// Store keys shared by both sides
pub mod keys {
    pub const FIRST_ROTATION: &str = "firstRotation";
    pub const REPEAT_INTERVAL: &str = "repeatInterval";
    /// Editing side only: last values the channel confirmed it accepted
    pub const SYNCED_FIRST_ROTATION: &str = "syncedFirstRotation";
    pub const SYNCED_REPEAT_INTERVAL: &str = "syncedRepeatInterval";
}

/// Storage failure
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read settings store: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("settings store lock poisoned")]
    Poisoned,
}

/// Durable integer key-value capability
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<i64>, StoreError>;
    fn set(&self, key: &str, value: i64) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}
