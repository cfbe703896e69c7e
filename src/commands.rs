//! Timer control commands
//!
//! The intent boundary (HTTP endpoints, Unix signals) never touches the
//! engine directly; it sends one of these commands over an mpsc channel to
//! the tick task. The mapping is fixed: `StartNewTimer` always performs a
//! reset-and-start (a running timer is restarted from zero), `StopTimer`
//! stops and clears.

/// Closed set of commands accepted by the timer tick task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    /// Reset-and-start: always yields a running timer with fresh state
    StartNewTimer,
    /// Stop and clear back to 0:00
    StopTimer,
}
