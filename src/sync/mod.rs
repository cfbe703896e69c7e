//! Settings sync coordinators
//!
//! The editing side debounces user edits and pushes settings across the
//! channel; the timer side validates inbound payloads and applies them to
//! the running timer.

pub mod editor;
pub mod receiver;

// Re-export main types
pub use editor::{SettingsEditor, DEBOUNCE_DELAY};
pub use receiver::SettingsReceiver;
