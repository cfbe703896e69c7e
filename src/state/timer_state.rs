//! Stopwatch timer state and rotation alert thresholds

use std::time::Duration;

use chrono::{DateTime, Utc};

use super::SyncSettings;

/// Default first-rotation threshold in seconds
pub const DEFAULT_FIRST_ROTATION_SECS: u32 = 30;
/// Default repeat interval in seconds
pub const DEFAULT_REPEAT_INTERVAL_SECS: u32 = 15;

/// Threshold-crossing alert emitted by a tick evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertEvent {
    /// Elapsed time first reached the first-rotation threshold
    FirstRotation,
    /// A repeat interval elapsed since the previous alert
    RepeatRotation,
}

/// Stopwatch state for the rotation timer
///
/// Elapsed time is always derived as `now - anchor`, never accumulated by
/// counting ticks, so delayed ticks cannot lose time. Alerts are detected by
/// level-crossing comparison against the derived elapsed value.
#[derive(Debug, Clone)]
pub struct TimerState {
    running: bool,
    /// Wall-clock instant the current run started; `Some` iff running
    anchor: Option<DateTime<Utc>>,
    /// Derived elapsed time, recomputed on each tick
    elapsed: Duration,
    first_rotation_secs: u32,
    repeat_interval_secs: u32,
    /// Latches true once the first threshold fires, until the next reset
    first_rotation_fired: bool,
    /// Elapsed value at the moment the most recent alert fired
    last_alert_elapsed: Duration,
}

impl TimerState {
    /// Create a stopped timer with the default thresholds (30s / 15s)
    pub fn new() -> Self {
        Self::with_settings(DEFAULT_FIRST_ROTATION_SECS, DEFAULT_REPEAT_INTERVAL_SECS)
    }

    /// Create a stopped timer with explicit thresholds
    ///
    /// Non-positive values fall back to the defaults, matching how settings
    /// are seeded from the store at process start.
    pub fn with_settings(first_rotation_secs: u32, repeat_interval_secs: u32) -> Self {
        Self {
            running: false,
            anchor: None,
            elapsed: Duration::ZERO,
            first_rotation_secs: if first_rotation_secs > 0 {
                first_rotation_secs
            } else {
                DEFAULT_FIRST_ROTATION_SECS
            },
            repeat_interval_secs: if repeat_interval_secs > 0 {
                repeat_interval_secs
            } else {
                DEFAULT_REPEAT_INTERVAL_SECS
            },
            first_rotation_fired: false,
            last_alert_elapsed: Duration::ZERO,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn settings(&self) -> SyncSettings {
        SyncSettings {
            first_rotation: self.first_rotation_secs,
            repeat_interval: self.repeat_interval_secs,
        }
    }

    /// Start the stopwatch; no-op if it is already running
    pub fn start(&mut self, now: DateTime<Utc>) {
        if self.running {
            return;
        }

        self.running = true;
        self.anchor = Some(now);
        self.elapsed = Duration::ZERO;
        self.first_rotation_fired = false;
        self.last_alert_elapsed = Duration::ZERO;
    }

    /// Stop and clear back to 0:00 (this is stop-and-clear, not pause)
    pub fn stop(&mut self) {
        self.running = false;
        self.anchor = None;
        self.clear_progress();
    }

    /// Zero the elapsed count and alert schedule
    ///
    /// A running timer stays running: the anchor moves to `now` and the
    /// alert schedule restarts from zero.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.clear_progress();
        if self.running {
            self.anchor = Some(now);
        }
    }

    /// Stop then start: always yields a running timer with fresh state
    pub fn reset_and_start(&mut self, now: DateTime<Utc>) {
        self.stop();
        self.start(now);
    }

    /// Replace the alert thresholds
    ///
    /// Elapsed time and fired flags are untouched; the next tick evaluates
    /// against the new values, so a mid-run update takes effect immediately.
    pub fn update_settings(&mut self, settings: SyncSettings) {
        self.first_rotation_secs = settings.first_rotation;
        self.repeat_interval_secs = settings.repeat_interval;
    }

    /// Recompute elapsed time and evaluate the alert thresholds
    ///
    /// At most one alert fires per tick evaluation. Returns `None` while
    /// stopped or when no threshold was crossed.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<AlertEvent> {
        let anchor = self.anchor?;

        // Clock skew can make now < anchor; clamp instead of going negative.
        self.elapsed = (now - anchor).to_std().unwrap_or(Duration::ZERO);

        let first_threshold = Duration::from_secs(u64::from(self.first_rotation_secs));
        let repeat_interval = Duration::from_secs(u64::from(self.repeat_interval_secs));

        if !self.first_rotation_fired && self.elapsed >= first_threshold {
            self.first_rotation_fired = true;
            self.last_alert_elapsed = self.elapsed;
            Some(AlertEvent::FirstRotation)
        } else if self.first_rotation_fired
            && self.elapsed.saturating_sub(self.last_alert_elapsed) >= repeat_interval
        {
            self.last_alert_elapsed = self.elapsed;
            Some(AlertEvent::RepeatRotation)
        } else {
            None
        }
    }

    /// Format the elapsed time as `m:ss` with truncated seconds
    ///
    /// Minutes are unpadded, seconds zero-padded: 0:00, 1:05, 12:03.
    pub fn formatted_elapsed(&self) -> String {
        let total = self.elapsed.as_secs();
        format!("{}:{:02}", total / 60, total % 60)
    }

    fn clear_progress(&mut self) {
        self.elapsed = Duration::ZERO;
        self.first_rotation_fired = false;
        self.last_alert_elapsed = Duration::ZERO;
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 1, 18, 0, 0).unwrap()
    }

    fn at(millis: i64) -> DateTime<Utc> {
        t0() + chrono::Duration::milliseconds(millis)
    }

    #[test]
    fn no_alert_before_first_threshold() {
        let mut timer = TimerState::new();
        timer.start(t0());

        for millis in [100, 5_000, 15_000, 29_900] {
            assert_eq!(timer.tick(at(millis)), None, "at {}ms", millis);
        }
    }

    #[test]
    fn rotation_schedule_30_15() {
        let mut timer = TimerState::new();
        timer.start(t0());

        assert_eq!(timer.tick(at(29_900)), None);
        assert_eq!(timer.tick(at(30_000)), Some(AlertEvent::FirstRotation));
        assert_eq!(timer.tick(at(30_100)), None);
        assert_eq!(timer.tick(at(44_900)), None);
        assert_eq!(timer.tick(at(45_000)), Some(AlertEvent::RepeatRotation));
        assert_eq!(timer.tick(at(59_900)), None);
        assert_eq!(timer.tick(at(60_000)), Some(AlertEvent::RepeatRotation));
    }

    #[test]
    fn first_threshold_fires_exactly_once() {
        let mut timer = TimerState::new();
        timer.start(t0());

        assert_eq!(timer.tick(at(30_000)), Some(AlertEvent::FirstRotation));
        // Staying past the threshold must not re-fire the first alert.
        assert_eq!(timer.tick(at(31_000)), None);
        assert_eq!(timer.tick(at(32_000)), None);
    }

    #[test]
    fn missed_ticks_do_not_miss_the_crossing() {
        let mut timer = TimerState::new();
        timer.start(t0());

        // A long gap straddling two thresholds still yields one alert per
        // tick: level crossing, not tick counting.
        assert_eq!(timer.tick(at(47_000)), Some(AlertEvent::FirstRotation));
        assert_eq!(timer.tick(at(62_100)), Some(AlertEvent::RepeatRotation));
    }

    #[test]
    fn start_is_idempotent_while_running() {
        let mut timer = TimerState::new();
        timer.start(t0());
        timer.tick(at(10_000));

        timer.start(at(10_000));
        timer.tick(at(12_000));
        assert_eq!(timer.elapsed(), Duration::from_secs(12));
    }

    #[test]
    fn stop_clears_everything() {
        let mut timer = TimerState::new();
        timer.start(t0());
        timer.tick(at(35_000));

        timer.stop();
        assert!(!timer.is_running());
        assert_eq!(timer.elapsed(), Duration::ZERO);
        assert_eq!(timer.formatted_elapsed(), "0:00");

        // Stopped timers never tick.
        assert_eq!(timer.tick(at(99_000)), None);
    }

    #[test]
    fn reset_while_running_keeps_running_and_restarts_schedule() {
        let mut timer = TimerState::new();
        timer.start(t0());
        assert_eq!(timer.tick(at(30_000)), Some(AlertEvent::FirstRotation));

        timer.reset(at(40_000));
        assert!(timer.is_running());
        assert_eq!(timer.elapsed(), Duration::ZERO);

        // Schedule restarted from the new anchor: first alert at +30s again.
        assert_eq!(timer.tick(at(40_000)), None);
        assert_eq!(timer.tick(at(69_900)), None);
        assert_eq!(timer.tick(at(70_000)), Some(AlertEvent::FirstRotation));
    }

    #[test]
    fn reset_then_immediate_tick_is_silent() {
        let mut timer = TimerState::new();
        timer.start(t0());
        assert_eq!(timer.tick(at(30_000)), Some(AlertEvent::FirstRotation));

        timer.reset(at(30_000));
        assert_eq!(timer.tick(at(30_000)), None);
    }

    #[test]
    fn reset_and_start_from_any_state() {
        let mut timer = TimerState::new();
        timer.reset_and_start(t0());
        assert!(timer.is_running());

        timer.tick(at(20_000));
        timer.reset_and_start(at(20_000));
        assert!(timer.is_running());
        assert_eq!(timer.elapsed(), Duration::ZERO);
        assert_eq!(timer.tick(at(50_000)), Some(AlertEvent::FirstRotation));
    }

    #[test]
    fn update_settings_mid_run_keeps_elapsed_and_flags() {
        let mut timer = TimerState::new();
        timer.start(t0());
        timer.tick(at(20_000));

        timer.update_settings(SyncSettings {
            first_rotation: 60,
            repeat_interval: 10,
        });

        assert_eq!(timer.elapsed(), Duration::from_secs(20));
        // Raised threshold now exceeds elapsed: alerts suppressed until
        // elapsed catches up.
        assert_eq!(timer.tick(at(30_000)), None);
        assert_eq!(timer.tick(at(59_900)), None);
        assert_eq!(timer.tick(at(60_000)), Some(AlertEvent::FirstRotation));
        assert_eq!(timer.tick(at(70_000)), Some(AlertEvent::RepeatRotation));
    }

    #[test]
    fn shrinking_interval_mid_run_takes_effect_next_tick() {
        let mut timer = TimerState::new();
        timer.start(t0());
        assert_eq!(timer.tick(at(30_000)), Some(AlertEvent::FirstRotation));

        timer.update_settings(SyncSettings {
            first_rotation: 30,
            repeat_interval: 5,
        });
        assert_eq!(timer.tick(at(35_000)), Some(AlertEvent::RepeatRotation));
    }

    #[test]
    fn non_positive_settings_fall_back_to_defaults() {
        let timer = TimerState::with_settings(0, 0);
        let settings = timer.settings();
        assert_eq!(settings.first_rotation, DEFAULT_FIRST_ROTATION_SECS);
        assert_eq!(settings.repeat_interval, DEFAULT_REPEAT_INTERVAL_SECS);
    }

    #[test]
    fn formats_truncated_minutes_and_seconds() {
        let mut timer = TimerState::new();
        assert_eq!(timer.formatted_elapsed(), "0:00");

        timer.start(t0());
        timer.tick(at(65_900));
        assert_eq!(timer.formatted_elapsed(), "1:05");

        timer.tick(at(723_400));
        assert_eq!(timer.formatted_elapsed(), "12:03");
    }

    #[test]
    fn clock_skew_clamps_to_zero() {
        let mut timer = TimerState::new();
        timer.start(t0());
        assert_eq!(timer.tick(at(-5_000)), None);
        assert_eq!(timer.elapsed(), Duration::ZERO);
    }
}
