//! Timer-side settings coordinator
//!
//! Both delivery tiers funnel into one handler: validate, apply to the
//! running timer, persist. Malformed payloads are logged and dropped, and
//! the previous settings stay authoritative.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, info, warn};

use crate::{
    channel::Delivery,
    state::{AppState, SettingsError, SyncSettings},
    storage::{keys, KvStore},
};

/// Inbound settings handler for the timer side
#[derive(Clone)]
pub struct SettingsReceiver {
    state: Arc<AppState>,
    store: Arc<dyn KvStore>,
}

impl SettingsReceiver {
    pub fn new(state: Arc<AppState>, store: Arc<dyn KvStore>) -> Self {
        Self { state, store }
    }

    /// Validate and apply one inbound payload
    ///
    /// Safe while the timer is running: the new thresholds take effect on
    /// the next tick without resetting elapsed time.
    pub fn handle_payload(&self, payload: &Value) -> Result<SyncSettings, SettingsError> {
        let settings = match SyncSettings::from_payload(payload) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Dropping malformed settings payload: {}", e);
                return Err(e);
            }
        };

        if let Err(e) = self.state.apply_settings(settings) {
            error!("Failed to apply settings: {}", e);
            return Ok(settings);
        }
        self.persist(settings);

        info!(
            "Received settings from counterpart: first={}s, repeat={}s",
            settings.first_rotation, settings.repeat_interval
        );
        Ok(settings)
    }

    /// Funnel an inbound delivery stream into the payload handler
    pub async fn run(self, mut deliveries: UnboundedReceiver<Delivery>) {
        info!("Starting settings receiver task");

        while let Some(delivery) = deliveries.recv().await {
            match &delivery {
                Delivery::Message(_) => debug!("Received immediate settings message"),
                Delivery::Context(_) => debug!("Received durable settings context"),
            }
            let _ = self.handle_payload(delivery.payload());
        }

        debug!("Delivery stream closed, settings receiver exiting");
    }

    fn persist(&self, settings: SyncSettings) {
        let result = self
            .store
            .set(keys::FIRST_ROTATION, i64::from(settings.first_rotation))
            .and_then(|_| {
                self.store
                    .set(keys::REPEAT_INTERVAL, i64::from(settings.repeat_interval))
            });
        if let Err(e) = result {
            warn!("Failed to persist received settings: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::in_process_pair;
    use crate::channel::SyncChannel;
    use crate::clock::SystemClock;
    use crate::haptics::LogHaptics;
    use crate::state::TimerState;
    use crate::storage::MemoryStore;
    use serde_json::json;
    use tokio::sync::mpsc;

    fn receiver_fixture() -> (SettingsReceiver, Arc<AppState>, Arc<MemoryStore>) {
        let (command_tx, _command_rx) = mpsc::channel(8);
        let state = Arc::new(AppState::new(
            TimerState::new(),
            Arc::new(SystemClock),
            Arc::new(LogHaptics),
            command_tx,
            0,
            "localhost".to_string(),
        ));
        let store = Arc::new(MemoryStore::new());
        (
            SettingsReceiver::new(state.clone(), store.clone()),
            state,
            store,
        )
    }

    #[tokio::test]
    async fn valid_payload_is_applied_and_persisted() {
        let (receiver, state, store) = receiver_fixture();

        let settings = receiver
            .handle_payload(&json!({"firstRotation": 40, "repeatInterval": 10}))
            .unwrap();
        assert_eq!(settings.first_rotation, 40);

        assert_eq!(state.settings().unwrap().first_rotation, 40);
        assert_eq!(store.get(keys::FIRST_ROTATION).unwrap(), Some(40));
        assert_eq!(store.get(keys::REPEAT_INTERVAL).unwrap(), Some(10));
    }

    #[tokio::test]
    async fn malformed_payload_is_dropped_and_settings_survive() {
        let (receiver, state, store) = receiver_fixture();

        for payload in [
            json!({"firstRotation": "x"}),
            json!({"repeatInterval": 15}),
            json!({"firstRotation": 0, "repeatInterval": 15}),
            json!([1, 2, 3]),
        ] {
            assert!(receiver.handle_payload(&payload).is_err());
        }

        let settings = state.settings().unwrap();
        assert_eq!(settings.first_rotation, 30);
        assert_eq!(settings.repeat_interval, 15);
        assert_eq!(store.get(keys::FIRST_ROTATION).unwrap(), None);
    }

    #[tokio::test]
    async fn message_and_context_deliveries_apply_identically() {
        let (receiver, state, _store) = receiver_fixture();
        let (channel, delivery_rx) = in_process_pair();
        let task = tokio::spawn(receiver.run(delivery_rx));

        let payload = json!({"firstRotation": 25, "repeatInterval": 5});
        channel.send_message(&payload).unwrap();
        channel.update_context(&payload).unwrap();
        drop(channel);
        task.await.unwrap();

        let settings = state.settings().unwrap();
        assert_eq!(settings.first_rotation, 25);
        assert_eq!(settings.repeat_interval, 5);
    }
}
