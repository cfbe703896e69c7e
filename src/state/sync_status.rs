//! Editing-side sync status

/// Derived, user-visible sync state on the editing side
///
/// `sync_error` is only ever true after a transmission attempt failed while
/// the channel reported itself reachable; an unreachable channel is an
/// expected deferred state, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncStatus {
    /// A debounce timer is outstanding
    pub pending: bool,
    /// The most recent transmission attempt failed while reachable
    pub sync_error: bool,
    /// The channel currently reports the low-latency tier usable
    pub reachable: bool,
}
