//! Editing-side settings coordinator
//!
//! Debounces field edits, persists valid values, and decides when a sync to
//! the timer side is actually necessary. The confirmed-sync watermark means
//! "the channel accepted these values", not end-to-end receipt; it is what
//! suppresses redundant transmissions.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::sleep,
};
use tracing::{debug, info, warn};

use crate::{
    channel::{ChannelError, SyncChannel},
    state::{SyncSettings, SyncStatus},
    storage::{keys, KvStore},
};

/// Trailing-debounce delay after the last keystroke
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Default, Clone)]
struct Drafts {
    first_rotation: String,
    repeat_interval: String,
}

impl Drafts {
    /// Both fields as positive integers, or nothing
    fn parse(&self) -> Option<SyncSettings> {
        let first_rotation: u32 = self.first_rotation.trim().parse().ok()?;
        let repeat_interval: u32 = self.repeat_interval.trim().parse().ok()?;
        if first_rotation == 0 || repeat_interval == 0 {
            return None;
        }
        Some(SyncSettings {
            first_rotation,
            repeat_interval,
        })
    }
}

/// Editing-side coordinator
pub struct SettingsEditor {
    store: Arc<dyn KvStore>,
    channel: Arc<dyn SyncChannel>,
    drafts: Mutex<Drafts>,
    /// Outstanding debounce task; replaced (aborted) on every new edit
    debounce: Mutex<Option<JoinHandle<()>>>,
    status_tx: watch::Sender<SyncStatus>,
}

impl SettingsEditor {
    /// Create an editor over the given store and channel
    ///
    /// Draft fields are seeded from the persisted values so an untouched
    /// field keeps its stored value through the next commit.
    pub fn new(store: Arc<dyn KvStore>, channel: Arc<dyn SyncChannel>) -> Arc<Self> {
        let drafts = Drafts {
            first_rotation: stored_text(&store, keys::FIRST_ROTATION),
            repeat_interval: stored_text(&store, keys::REPEAT_INTERVAL),
        };
        let (status_tx, _) = watch::channel(SyncStatus {
            pending: false,
            sync_error: false,
            reachable: channel.reachable(),
        });

        Arc::new(Self {
            store,
            channel,
            drafts: Mutex::new(drafts),
            debounce: Mutex::new(None),
            status_tx,
        })
    }

    /// Record an edit to the first-rotation field and restart the debounce
    pub fn set_first_input(self: &Arc<Self>, text: impl Into<String>) {
        if let Ok(mut drafts) = self.drafts.lock() {
            drafts.first_rotation = text.into();
        }
        self.schedule_commit();
    }

    /// Record an edit to the repeat-interval field and restart the debounce
    pub fn set_repeat_input(self: &Arc<Self>, text: impl Into<String>) {
        if let Ok(mut drafts) = self.drafts.lock() {
            drafts.repeat_interval = text.into();
        }
        self.schedule_commit();
    }

    /// Manual retry: re-evaluate and transmit without a new edit
    pub fn retry_sync(&self) {
        self.sync_if_needed();
    }

    /// Current user-visible sync status
    pub fn status(&self) -> SyncStatus {
        *self.status_tx.borrow()
    }

    /// Watch sync status updates
    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatus> {
        self.status_tx.subscribe()
    }

    /// Watch the channel and re-evaluate sync when the timer side connects
    ///
    /// A false-to-true transition retries any deferred sync using the same
    /// watermark rule, with no new edit required. Going unreachable clears
    /// any visible error: an unreachable channel is not a failure.
    pub fn spawn_reachability_watcher(self: &Arc<Self>) -> JoinHandle<()> {
        let editor = Arc::clone(self);
        let mut reachability = editor.channel.subscribe_reachability();

        tokio::spawn(async move {
            while reachability.changed().await.is_ok() {
                let reachable = *reachability.borrow_and_update();
                debug!("Counterpart reachability changed: {}", reachable);

                if reachable {
                    editor.update_status(|status| status.reachable = true);
                    editor.sync_if_needed();
                } else {
                    editor.update_status(|status| {
                        status.reachable = false;
                        status.sync_error = false;
                    });
                }
            }
        })
    }

    /// Cancel any outstanding debounce and start a fresh one
    fn schedule_commit(self: &Arc<Self>) {
        let editor = Arc::clone(self);
        let task = tokio::spawn(async move {
            sleep(DEBOUNCE_DELAY).await;
            editor.commit();
        });

        self.update_status(|status| status.pending = true);

        if let Ok(mut debounce) = self.debounce.lock() {
            if let Some(previous) = debounce.replace(task) {
                previous.abort();
            }
        }
    }

    /// Debounce expiry: validate, persist, then sync if needed
    ///
    /// Unparseable or non-positive input is skipped silently so that
    /// half-typed values never corrupt the stored state.
    fn commit(&self) {
        self.update_status(|status| status.pending = false);

        let settings = {
            let Ok(drafts) = self.drafts.lock() else {
                return;
            };
            drafts.parse()
        };
        let Some(settings) = settings else {
            debug!("Skipping commit of invalid settings input");
            return;
        };

        if let Err(e) = self.persist(settings) {
            warn!("Failed to persist settings: {}", e);
            return;
        }

        self.sync_if_needed();
    }

    fn persist(&self, settings: SyncSettings) -> Result<(), crate::storage::StoreError> {
        self.store
            .set(keys::FIRST_ROTATION, i64::from(settings.first_rotation))?;
        self.store
            .set(keys::REPEAT_INTERVAL, i64::from(settings.repeat_interval))?;
        Ok(())
    }

    /// Transmit the persisted settings unless the watermark says the channel
    /// already has them
    fn sync_if_needed(&self) {
        let Some(settings) = self.persisted_settings() else {
            return;
        };

        if !self.needs_sync(settings) {
            debug!("Settings already synced, skipping transmission");
            return;
        }

        if !self.channel.reachable() {
            // Not an error: sync happens lazily when the counterpart shows up.
            debug!("Counterpart unreachable, deferring sync");
            return;
        }

        match self.transmit(settings) {
            Ok(()) => {
                self.record_watermark(settings);
                self.update_status(|status| status.sync_error = false);
                info!(
                    "Settings synced: first={}s, repeat={}s",
                    settings.first_rotation, settings.repeat_interval
                );
            }
            Err(ChannelError::NotActivated) => {
                // Permanent for this session; sync degrades to a no-op.
                warn!("Sync channel never activated, skipping sync");
            }
            Err(e) => {
                warn!("Failed to sync settings: {}", e);
                let reachable = self.channel.reachable();
                self.update_status(|status| status.sync_error = reachable);
            }
        }
    }

    /// Two-tier send policy: immediate when momentarily reachable, falling
    /// back to the durable context update within the same attempt
    fn transmit(&self, settings: SyncSettings) -> Result<(), ChannelError> {
        let payload = settings.to_payload();

        if self.channel.reachable() {
            match self.channel.send_message(&payload) {
                Ok(()) => Ok(()),
                Err(ChannelError::NotActivated) => Err(ChannelError::NotActivated),
                Err(e) => {
                    // Tier-1 failure is never surfaced; only the fallback
                    // result counts.
                    debug!("Immediate send failed ({}), using context update", e);
                    self.channel.update_context(&payload)
                }
            }
        } else {
            self.channel.update_context(&payload)
        }
    }

    fn persisted_settings(&self) -> Option<SyncSettings> {
        let first_rotation = self.stored_u32(keys::FIRST_ROTATION)?;
        let repeat_interval = self.stored_u32(keys::REPEAT_INTERVAL)?;
        Some(SyncSettings {
            first_rotation,
            repeat_interval,
        })
    }

    fn needs_sync(&self, settings: SyncSettings) -> bool {
        let synced_first = self.stored_u32(keys::SYNCED_FIRST_ROTATION);
        let synced_repeat = self.stored_u32(keys::SYNCED_REPEAT_INTERVAL);
        synced_first != Some(settings.first_rotation)
            || synced_repeat != Some(settings.repeat_interval)
    }

    fn record_watermark(&self, settings: SyncSettings) {
        let result = self
            .store
            .set(
                keys::SYNCED_FIRST_ROTATION,
                i64::from(settings.first_rotation),
            )
            .and_then(|_| {
                self.store.set(
                    keys::SYNCED_REPEAT_INTERVAL,
                    i64::from(settings.repeat_interval),
                )
            });
        if let Err(e) = result {
            warn!("Failed to record sync watermark: {}", e);
        }
    }

    fn stored_u32(&self, key: &str) -> Option<u32> {
        match self.store.get(key) {
            Ok(value) => value.and_then(|v| u32::try_from(v).ok()),
            Err(e) => {
                warn!("Failed to read '{}' from store: {}", key, e);
                None
            }
        }
    }

    fn update_status(&self, update: impl FnOnce(&mut SyncStatus)) {
        self.status_tx.send_modify(update);
    }
}

fn stored_text(store: &Arc<dyn KvStore>, key: &str) -> String {
    match store.get(key) {
        Ok(Some(value)) => value.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{in_process_pair, Delivery, InProcessChannel};
    use crate::storage::MemoryStore;
    use serde_json::json;
    use tokio::sync::mpsc::{error::TryRecvError, UnboundedReceiver};
    use tokio::time::{advance, sleep};

    fn editor_fixture() -> (
        Arc<SettingsEditor>,
        Arc<MemoryStore>,
        Arc<InProcessChannel>,
        UnboundedReceiver<Delivery>,
    ) {
        let store = Arc::new(MemoryStore::new());
        let (channel, delivery_rx) = in_process_pair();
        let channel = Arc::new(channel);
        let editor = SettingsEditor::new(store.clone(), channel.clone());
        (editor, store, channel, delivery_rx)
    }

    async fn settle() {
        // Enough paused-clock time for any outstanding debounce to expire.
        sleep(DEBOUNCE_DELAY * 2).await;
    }

    #[tokio::test(start_paused = true)]
    async fn debounce_commits_only_the_final_value() {
        let (editor, store, _channel, mut rx) = editor_fixture();

        editor.set_first_input("4");
        editor.set_first_input("45");
        editor.set_repeat_input("2");
        editor.set_repeat_input("20");
        assert!(editor.status().pending);

        settle().await;

        assert_eq!(store.get(keys::FIRST_ROTATION).unwrap(), Some(45));
        assert_eq!(store.get(keys::REPEAT_INTERVAL).unwrap(), Some(20));
        assert!(!editor.status().pending);

        // A burst of edits yields exactly one transmission.
        assert_eq!(
            rx.recv().await.unwrap(),
            Delivery::Message(json!({"firstRotation": 45, "repeatInterval": 20}))
        );
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test(start_paused = true)]
    async fn an_edit_restarts_the_debounce_window() {
        let (editor, store, _channel, _rx) = editor_fixture();

        editor.set_first_input("45");
        editor.set_repeat_input("20");
        advance(Duration::from_millis(400)).await;

        // Still inside the window; the commit must not have happened yet.
        assert_eq!(store.get(keys::FIRST_ROTATION).unwrap(), None);

        editor.set_first_input("50");
        settle().await;
        assert_eq!(store.get(keys::FIRST_ROTATION).unwrap(), Some(50));
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_input_is_skipped_silently() {
        let (editor, store, _channel, mut rx) = editor_fixture();

        editor.set_first_input("abc");
        editor.set_repeat_input("15");
        settle().await;

        assert_eq!(store.get(keys::FIRST_ROTATION).unwrap(), None);
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
        assert!(!editor.status().sync_error);

        editor.set_first_input("0");
        settle().await;
        assert_eq!(store.get(keys::FIRST_ROTATION).unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn unchanged_settings_are_not_retransmitted() {
        let (editor, _store, _channel, mut rx) = editor_fixture();

        editor.set_first_input("30");
        editor.set_repeat_input("15");
        settle().await;
        assert!(rx.recv().await.is_some());

        // Same values again: watermark says the channel already has them.
        editor.set_first_input("30");
        editor.set_repeat_input("15");
        settle().await;
        editor.retry_sync();

        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test(start_paused = true)]
    async fn unreachable_edit_defers_then_syncs_on_reconnect() {
        let (editor, store, channel, mut rx) = editor_fixture();
        let _watcher = editor.spawn_reachability_watcher();
        channel.set_reachable(false);
        sleep(Duration::from_millis(10)).await;

        editor.set_first_input("40");
        editor.set_repeat_input("10");
        settle().await;

        // Persisted locally, nothing sent, and no error surfaced.
        assert_eq!(store.get(keys::FIRST_ROTATION).unwrap(), Some(40));
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
        assert!(!editor.status().sync_error);
        assert_eq!(store.get(keys::SYNCED_FIRST_ROTATION).unwrap(), None);

        // Counterpart connects: the deferred sync happens with no new edit.
        channel.set_reachable(true);
        let delivery = rx.recv().await.unwrap();
        assert_eq!(
            delivery.payload(),
            &json!({"firstRotation": 40, "repeatInterval": 10})
        );
        sleep(Duration::from_millis(10)).await;
        assert_eq!(store.get(keys::SYNCED_FIRST_ROTATION).unwrap(), Some(40));
    }

    #[tokio::test(start_paused = true)]
    async fn tier_one_failure_falls_back_to_context_silently() {
        let (editor, store, channel, mut rx) = editor_fixture();
        channel.fail_next_message();

        editor.set_first_input("35");
        editor.set_repeat_input("12");
        settle().await;

        // The fallback succeeded, so the attempt as a whole succeeded.
        assert!(matches!(rx.recv().await.unwrap(), Delivery::Context(_)));
        assert!(!editor.status().sync_error);
        assert_eq!(store.get(keys::SYNCED_FIRST_ROTATION).unwrap(), Some(35));
    }

    #[tokio::test(start_paused = true)]
    async fn both_tiers_failing_sets_error_and_retry_clears_it() {
        let (editor, store, channel, mut rx) = editor_fixture();
        channel.fail_next_message();
        channel.fail_next_context();

        editor.set_first_input("35");
        editor.set_repeat_input("12");
        settle().await;

        assert!(editor.status().sync_error);
        assert_eq!(store.get(keys::SYNCED_FIRST_ROTATION).unwrap(), None);
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

        editor.retry_sync();
        assert!(rx.recv().await.is_some());
        assert!(!editor.status().sync_error);
        assert_eq!(store.get(keys::SYNCED_FIRST_ROTATION).unwrap(), Some(35));
    }

    #[tokio::test(start_paused = true)]
    async fn unactivated_channel_degrades_to_a_noop() {
        let (editor, store, channel, mut rx) = editor_fixture();
        channel.deactivate();

        editor.set_first_input("35");
        editor.set_repeat_input("12");
        settle().await;

        // Logged, not surfaced: no error, no watermark, nothing delivered.
        assert!(!editor.status().sync_error);
        assert_eq!(store.get(keys::SYNCED_FIRST_ROTATION).unwrap(), None);
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test(start_paused = true)]
    async fn going_unreachable_clears_the_error_flag() {
        let (editor, _store, channel, _rx) = editor_fixture();
        let _watcher = editor.spawn_reachability_watcher();
        channel.fail_next_message();
        channel.fail_next_context();

        editor.set_first_input("35");
        editor.set_repeat_input("12");
        settle().await;
        assert!(editor.status().sync_error);

        channel.set_reachable(false);
        sleep(Duration::from_millis(10)).await;
        let status = editor.status();
        assert!(!status.sync_error);
        assert!(!status.reachable);
    }
}
