//! State management module
//!
//! This module contains the timer engine state, the settings value type, and
//! the shared application state for the timer-side process.

pub mod app_state;
pub mod settings;
pub mod sync_status;
pub mod timer_state;

// Re-export main types
pub use app_state::{AppState, TimerSnapshot};
pub use settings::{SettingsError, SyncSettings};
pub use sync_status::SyncStatus;
pub use timer_state::{
    AlertEvent, TimerState, DEFAULT_FIRST_ROTATION_SECS, DEFAULT_REPEAT_INTERVAL_SECS,
};
