//! In-process loopback transport
//!
//! Pairs a sending half with an mpsc receiver in the same process. Used to
//! wire both coordinators together in one process and to exercise the sync
//! protocol in tests; reachability and per-tier failures are controllable.

use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tracing::debug;

use super::{ChannelError, Delivery, SyncChannel};

/// Sending half of the loopback pair
pub struct InProcessChannel {
    delivery_tx: mpsc::UnboundedSender<Delivery>,
    reachable_tx: watch::Sender<bool>,
    activated: AtomicBool,
    fail_next_message: AtomicBool,
    fail_next_context: AtomicBool,
}

/// Create a connected channel pair: the sending half and the inbound
/// delivery stream for the receiving side
pub fn in_process_pair() -> (InProcessChannel, mpsc::UnboundedReceiver<Delivery>) {
    let (delivery_tx, delivery_rx) = mpsc::unbounded_channel();
    let (reachable_tx, _) = watch::channel(true);

    (
        InProcessChannel {
            delivery_tx,
            reachable_tx,
            activated: AtomicBool::new(true),
            fail_next_message: AtomicBool::new(false),
            fail_next_context: AtomicBool::new(false),
        },
        delivery_rx,
    )
}

impl InProcessChannel {
    /// Flip reachability, notifying subscribers on transitions
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable_tx.send_if_modified(|current| {
            let changed = *current != reachable;
            *current = reachable;
            changed
        });
        debug!("Loopback reachability set to {}", reachable);
    }

    /// Simulate transport activation failure for the rest of the session
    pub fn deactivate(&self) {
        self.activated.store(false, Ordering::SeqCst);
    }

    /// Make the next immediate send fail
    pub fn fail_next_message(&self) {
        self.fail_next_message.store(true, Ordering::SeqCst);
    }

    /// Make the next context update fail
    pub fn fail_next_context(&self) {
        self.fail_next_context.store(true, Ordering::SeqCst);
    }

    fn check_activated(&self) -> Result<(), ChannelError> {
        if self.activated.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ChannelError::NotActivated)
        }
    }

    fn deliver(&self, delivery: Delivery) -> Result<(), ChannelError> {
        self.delivery_tx
            .send(delivery)
            .map_err(|_| ChannelError::SendFailed("receiving side is gone".to_string()))
    }
}

impl SyncChannel for InProcessChannel {
    fn reachable(&self) -> bool {
        *self.reachable_tx.borrow()
    }

    fn subscribe_reachability(&self) -> watch::Receiver<bool> {
        self.reachable_tx.subscribe()
    }

    fn send_message(&self, payload: &Value) -> Result<(), ChannelError> {
        self.check_activated()?;
        if !self.reachable() {
            return Err(ChannelError::Unreachable);
        }
        if self.fail_next_message.swap(false, Ordering::SeqCst) {
            return Err(ChannelError::SendFailed("injected message failure".to_string()));
        }
        self.deliver(Delivery::Message(payload.clone()))
    }

    fn update_context(&self, payload: &Value) -> Result<(), ChannelError> {
        self.check_activated()?;
        if self.fail_next_context.swap(false, Ordering::SeqCst) {
            return Err(ChannelError::SendFailed("injected context failure".to_string()));
        }
        self.deliver(Delivery::Context(payload.clone()))
    }
}
