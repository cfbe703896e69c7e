//! Timer-side application state

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};

use tokio::sync::{mpsc, watch};
use tracing::warn;

use super::{AlertEvent, SyncSettings, TimerState};
use crate::{clock::Clock, commands::TimerCommand, haptics::Haptics};

/// Observable timer state exposed to the presentation boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerSnapshot {
    pub running: bool,
    pub elapsed_formatted: String,
}

impl TimerSnapshot {
    fn stopped() -> Self {
        Self {
            running: false,
            elapsed_formatted: "0:00".to_string(),
        }
    }
}

/// Shared state for the timer-side process
///
/// All timer mutation funnels through the state mutex, so a tick evaluation
/// and an inbound settings update can never interleave.
pub struct AppState {
    timer: Mutex<TimerState>,
    clock: Arc<dyn Clock>,
    haptics: Arc<dyn Haptics>,
    /// Command channel into the tick task
    command_tx: mpsc::Sender<TimerCommand>,
    /// Snapshot channel for presentation-side watchers
    snapshot_tx: watch::Sender<TimerSnapshot>,
    /// Keep one receiver alive to prevent channel closure
    _snapshot_rx: watch::Receiver<TimerSnapshot>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
}

impl AppState {
    pub fn new(
        timer: TimerState,
        clock: Arc<dyn Clock>,
        haptics: Arc<dyn Haptics>,
        command_tx: mpsc::Sender<TimerCommand>,
        port: u16,
        host: String,
    ) -> Self {
        let (snapshot_tx, snapshot_rx) = watch::channel(TimerSnapshot::stopped());

        Self {
            timer: Mutex::new(timer),
            clock,
            haptics,
            command_tx,
            snapshot_tx,
            _snapshot_rx: snapshot_rx,
            start_time: Instant::now(),
            port,
            host,
        }
    }

    /// Queue a control command for the tick task
    pub async fn send_command(&self, command: TimerCommand) -> Result<(), String> {
        self.command_tx
            .send(command)
            .await
            .map_err(|e| format!("Timer task is not running: {}", e))
    }

    /// Run one tick evaluation against the current wall clock
    pub fn tick(&self) -> Result<Option<AlertEvent>, String> {
        let now = self.clock.now();
        let event = self
            .timer
            .lock()
            .map_err(|e| format!("Failed to lock timer state: {}", e))?
            .tick(now);
        self.publish_snapshot();
        Ok(event)
    }

    /// Reset-and-start the timer with a fresh state, playing the start haptic
    pub fn start_new_timer(&self) -> Result<(), String> {
        self.haptics.play_start();
        let now = self.clock.now();
        self.timer
            .lock()
            .map_err(|e| format!("Failed to lock timer state: {}", e))?
            .reset_and_start(now);
        self.publish_snapshot();
        Ok(())
    }

    /// Stop and clear the timer, playing the stop haptic
    pub fn stop_timer(&self) -> Result<(), String> {
        self.haptics.play_stop();
        self.timer
            .lock()
            .map_err(|e| format!("Failed to lock timer state: {}", e))?
            .stop();
        self.publish_snapshot();
        Ok(())
    }

    /// Apply inbound settings; safe to call while the timer is running
    pub fn apply_settings(&self, settings: SyncSettings) -> Result<(), String> {
        self.timer
            .lock()
            .map_err(|e| format!("Failed to lock timer state: {}", e))?
            .update_settings(settings);
        Ok(())
    }

    /// Current thresholds
    pub fn settings(&self) -> Result<SyncSettings, String> {
        self.timer
            .lock()
            .map(|timer| timer.settings())
            .map_err(|e| format!("Failed to lock timer state: {}", e))
    }

    /// Current observable timer state
    pub fn timer_snapshot(&self) -> Result<TimerSnapshot, String> {
        self.timer
            .lock()
            .map(|timer| TimerSnapshot {
                running: timer.is_running(),
                elapsed_formatted: timer.formatted_elapsed(),
            })
            .map_err(|e| format!("Failed to lock timer state: {}", e))
    }

    /// Watch timer snapshots as they are published
    pub fn subscribe_snapshots(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Calculate server uptime as a formatted string
    pub fn uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    fn publish_snapshot(&self) {
        let snapshot = match self.timer_snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Failed to build timer snapshot: {}", e);
                return;
            }
        };
        if let Err(e) = self.snapshot_tx.send(snapshot) {
            warn!("Failed to send timer snapshot: {}", e);
        }
    }
}
