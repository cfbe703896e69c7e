//! Sync channel abstraction
//!
//! Models the unreliable phone-to-watch transport as two named delivery
//! tiers: an immediate low-latency send that needs momentary reachability,
//! and a durable context update that is eventually delivered but not
//! ordered against immediate sends.

pub mod in_process;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::watch;

// Re-export main types
pub use in_process::{in_process_pair, InProcessChannel};

/// How a payload arrived on the receiving side
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Tier 1: immediate message
    Message(Value),
    /// Tier 2: durable context snapshot
    Context(Value),
}

impl Delivery {
    /// The payload, regardless of tier
    pub fn payload(&self) -> &Value {
        match self {
            Delivery::Message(payload) | Delivery::Context(payload) => payload,
        }
    }
}

/// Transport failure
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The transport never became ready; permanent for this session
    #[error("sync channel is not activated")]
    NotActivated,

    /// The low-latency tier needs momentary reachability
    #[error("counterpart is not reachable")]
    Unreachable,

    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Point-to-point delivery to the paired device
///
/// Sends report only whether the transport accepted the payload, not
/// end-to-end receipt. Reachability describes the low-latency tier; the
/// durable tier may succeed regardless.
pub trait SyncChannel: Send + Sync {
    /// Whether the low-latency tier is momentarily usable
    fn reachable(&self) -> bool;

    /// Observe reachability transitions
    fn subscribe_reachability(&self) -> watch::Receiver<bool>;

    /// Tier 1: immediate, best-effort send
    fn send_message(&self, payload: &Value) -> Result<(), ChannelError>;

    /// Tier 2: durable, eventually-delivered context update
    fn update_context(&self, payload: &Value) -> Result<(), ChannelError>;
}
