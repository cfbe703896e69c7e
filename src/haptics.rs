//! Haptic feedback capability and alert dispatch

use std::sync::Arc;
use tracing::info;

use crate::state::AlertEvent;

/// Haptic playback capability
///
/// The engine itself never calls this; rotation alerts go through the
/// [`AlertDispatcher`] and start/stop effects are played by the control
/// surface that handles commands.
pub trait Haptics: Send + Sync {
    /// Rotation alert effect
    fn play_rotation(&self);
    /// Subtle effect when the timer starts
    fn play_start(&self);
    /// Subtle effect when the timer stops
    fn play_stop(&self);
}

/// Default haptics backend that logs each effect
///
/// Stands in for the platform's tactile engine; a real deployment would
/// swap in a device-backed implementation.
#[derive(Debug, Default)]
pub struct LogHaptics;

impl Haptics for LogHaptics {
    fn play_rotation(&self) {
        info!("Haptic played: time to rotate!");
    }

    fn play_start(&self) {
        info!("Haptic played: timer started");
    }

    fn play_stop(&self) {
        info!("Haptic played: timer stopped");
    }
}

/// Stateless relay from engine alert events to the haptic capability
#[derive(Clone)]
pub struct AlertDispatcher {
    haptics: Arc<dyn Haptics>,
}

impl AlertDispatcher {
    pub fn new(haptics: Arc<dyn Haptics>) -> Self {
        Self { haptics }
    }

    /// Forward one threshold-crossing event to the haptic capability
    pub fn dispatch(&self, event: AlertEvent) {
        match event {
            AlertEvent::FirstRotation | AlertEvent::RepeatRotation => {
                self.haptics.play_rotation();
            }
        }
    }
}
