//! Pizza Coach - a cooking timer with rotation alerts and settings sync
//!
//! This library implements both halves of the system: the timer side (a
//! stopwatch engine that fires periodic rotation haptics) and the editing
//! side (a debounced settings editor that syncs its two thresholds across an
//! unreliable channel).

pub mod api;
pub mod channel;
pub mod clock;
pub mod commands;
pub mod config;
pub mod haptics;
pub mod state;
pub mod storage;
pub mod sync;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::{create_router, ApiContext};
pub use channel::{ChannelError, Delivery, SyncChannel};
pub use clock::{Clock, SystemClock};
pub use commands::TimerCommand;
pub use config::Config;
pub use haptics::{AlertDispatcher, Haptics, LogHaptics};
pub use state::{AppState, SyncSettings, SyncStatus, TimerState};
pub use storage::{JsonFileStore, KvStore, MemoryStore};
pub use sync::{SettingsEditor, SettingsReceiver};
pub use utils::shutdown_signal;
