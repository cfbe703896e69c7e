//! Rotation settings value type and wire payload validation

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// The two tunable thresholds exchanged between the editing side and the
/// timer side, verbatim in both directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Seconds until the first rotation alert
    #[serde(rename = "firstRotation")]
    pub first_rotation: u32,
    /// Seconds between subsequent rotation alerts
    #[serde(rename = "repeatInterval")]
    pub repeat_interval: u32,
}

/// Why an inbound settings payload was rejected
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("payload is not a valid settings object: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("{field} must be a positive integer, got {value}")]
    NonPositive { field: &'static str, value: u32 },
}

impl SyncSettings {
    /// Parse and validate a wire payload
    ///
    /// Both keys are required integers; unknown keys are ignored. A missing
    /// key, a non-integer value, or a non-positive value rejects the whole
    /// payload and the caller keeps its previous settings.
    pub fn from_payload(payload: &Value) -> Result<Self, SettingsError> {
        let settings: SyncSettings = serde_json::from_value(payload.clone())?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check the positivity requirement on both fields
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.first_rotation == 0 {
            return Err(SettingsError::NonPositive {
                field: "firstRotation",
                value: self.first_rotation,
            });
        }
        if self.repeat_interval == 0 {
            return Err(SettingsError::NonPositive {
                field: "repeatInterval",
                value: self.repeat_interval,
            });
        }
        Ok(())
    }

    /// Serialize to the wire payload shape
    pub fn to_payload(&self) -> Value {
        serde_json::json!({
            "firstRotation": self.first_rotation,
            "repeatInterval": self.repeat_interval,
        })
    }
}
