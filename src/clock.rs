//! Wall-clock capability
//!
//! The timer derives elapsed time from a wall-clock anchor rather than
//! accumulating ticks, so a missed or delayed tick never loses time. The
//! clock is injected so tests can drive the engine with explicit instants.

use chrono::{DateTime, Utc};

/// Source of the current wall-clock time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
