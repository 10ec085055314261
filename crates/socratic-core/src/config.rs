#![forbid(unsafe_code)]

//! Policy-as-data configuration for the follow machinery.
//!
//! Every tunable of the coordination core lives in one [`FollowConfig`] that
//! can be loaded from TOML or JSON at startup. Missing sections and fields
//! fall back to their defaults.
//!
//! # Loading
//!
//! ```toml
//! # socratic.toml
//! [ownership]
//! bottom_tolerance_px = 5.0
//! intent_window_ms = 200
//!
//! [settle]
//! settle_ms = 150
//!
//! [autoscroll]
//! duration_ms = 700
//! deterministic = false
//! ```
//!
//! ```rust,ignore
//! let config = FollowConfig::from_toml_file("socratic.toml")?;
//! let config = FollowConfig::from_json_str(json)?;
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::autoscroll::AutoScrollConfig;
use crate::dialogue::DialogueLimits;
use crate::error::ConfigError;
use crate::gradient::GradientConfig;
use crate::ownership::OwnershipConfig;
use crate::pacing::ReplayPacingConfig;
use crate::settle::SettleConfig;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowConfig {
    /// Ownership arbiter.
    pub ownership: OwnershipConfig,
    /// Layout stability detector.
    pub settle: SettleConfig,
    /// Auto-scroll actuator.
    pub autoscroll: AutoScrollConfig,
    /// Background gradient.
    pub gradient: GradientConfig,
    /// Replay pacing.
    pub replay: ReplayPacingConfig,
    /// Dialogue schema bounds.
    pub schema: DialogueLimits,
}

impl FollowConfig {
    /// Parse TOML.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Parse JSON.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Load by extension (`.json` is JSON, anything else TOML) and validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_file(path)?,
            _ => Self::from_toml_file(path)?,
        };
        config.validated()
    }

    /// Return `self` if [`validate`](Self::validate) finds no problems.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !(self.ownership.bottom_tolerance_px >= 0.0) {
            errors.push(format!(
                "ownership.bottom_tolerance_px must be >= 0, got {}",
                self.ownership.bottom_tolerance_px
            ));
        }
        if !(self.ownership.min_upward_px >= 0.0) {
            errors.push(format!(
                "ownership.min_upward_px must be >= 0, got {}",
                self.ownership.min_upward_px
            ));
        }
        if self.ownership.require_intent && self.ownership.intent_window_ms == 0 {
            errors.push("ownership.intent_window_ms must be > 0 when require_intent is set".into());
        }

        if self.settle.settle_ms == 0 {
            errors.push("settle.settle_ms must be > 0".into());
        }

        if !self.autoscroll.deterministic && self.autoscroll.duration_ms == 0 {
            errors.push("autoscroll.duration_ms must be > 0 unless deterministic".into());
        }
        if !(self.autoscroll.min_distance_px >= 0.0) {
            errors.push(format!(
                "autoscroll.min_distance_px must be >= 0, got {}",
                self.autoscroll.min_distance_px
            ));
        }

        if !(0.0..=1.0).contains(&self.gradient.max_intensity) {
            errors.push(format!(
                "gradient.max_intensity must be in [0, 1], got {}",
                self.gradient.max_intensity
            ));
        }
        if !(self.gradient.max_distance_px > 0.0) {
            errors.push(format!(
                "gradient.max_distance_px must be > 0, got {}",
                self.gradient.max_distance_px
            ));
        }
        if !(self.gradient.max_step > 0.0 && self.gradient.max_step <= 1.0) {
            errors.push(format!(
                "gradient.max_step must be in (0, 1], got {}",
                self.gradient.max_step
            ));
        }

        errors.extend(self.replay.validate());
        errors.extend(self.schema.validate());
        errors
    }

    /// Serialize the key parameters as a single JSONL line for logging.
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        format!(
            r#"{{"schema":"follow-config-v1","bottom_tolerance_px":{},"intent_window_ms":{},"grace_ms":{},"settle_ms":{},"autoscroll_duration_ms":{},"defer_frames":{},"deterministic":{},"gradient_max_step":{},"replay_speed":{},"min_turns":{},"max_turns":{}}}"#,
            self.ownership.bottom_tolerance_px,
            self.ownership.intent_window_ms,
            self.ownership.grace_ms,
            self.settle.settle_ms,
            self.autoscroll.duration_ms,
            self.autoscroll.defer_frames,
            self.autoscroll.deterministic,
            self.gradient.max_step,
            self.replay.speed,
            self.schema.min_turns,
            self.schema.max_turns,
        )
    }
}
