//! Engine configuration supplied once by the host at construction.
//!
//! ```rust
//! use editor_engine::{EditorConfig, WrapMode};
//!
//! let config = EditorConfig::from_json(r#"{
//!     "touch": { "touch_slop": 8.0, "double_tap_timeout_ms": 250 },
//!     "layout": { "wrap_mode": "none" }
//! }"#).unwrap();
//!
//! assert_eq!(config.touch.touch_slop, 8.0);
//! assert_eq!(config.touch.long_press_timeout_ms, 500);
//! assert_eq!(config.layout.wrap_mode, WrapMode::None);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::layout::LayoutOptions;

/// Gesture recognition thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TouchConfig {
    /// Pointer displacement (host coordinate units) below which movement is still a tap.
    pub touch_slop: f32,
    /// Maximum time between two taps of a double tap.
    pub double_tap_timeout_ms: i64,
    /// Hold time after which a stationary press becomes a long press.
    pub long_press_timeout_ms: i64,
    /// Per-frame velocity (units per millisecond) above which a scroll is a fast scroll.
    pub fast_scroll_velocity: f32,
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            touch_slop: 10.0,
            double_tap_timeout_ms: 300,
            long_press_timeout_ms: 500,
            fast_scroll_velocity: 3.0,
        }
    }
}

impl TouchConfig {
    /// Build a config from the two values every host supplies, keeping defaults for the rest.
    pub fn new(touch_slop: f32, double_tap_timeout_ms: i64) -> Self {
        Self {
            touch_slop,
            double_tap_timeout_ms,
            ..Self::default()
        }
    }

    /// Reject values the recognizer cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.touch_slop.is_finite() || self.touch_slop < 0.0 {
            return Err(ConfigError::Invalid {
                field: "touch.touch_slop",
                reason: "must be a finite, non-negative distance",
            });
        }
        if self.double_tap_timeout_ms < 0 {
            return Err(ConfigError::Invalid {
                field: "touch.double_tap_timeout_ms",
                reason: "must not be negative",
            });
        }
        if self.long_press_timeout_ms < 0 {
            return Err(ConfigError::Invalid {
                field: "touch.long_press_timeout_ms",
                reason: "must not be negative",
            });
        }
        if !self.fast_scroll_velocity.is_finite() || self.fast_scroll_velocity < 0.0 {
            return Err(ConfigError::Invalid {
                field: "touch.fast_scroll_velocity",
                reason: "must be a finite, non-negative velocity",
            });
        }
        Ok(())
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Gesture thresholds.
    pub touch: TouchConfig,
    /// Layout options.
    pub layout: LayoutOptions,
}

impl EditorConfig {
    /// Parse and validate a JSON configuration. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.touch.validate()?;
        if self.layout.tab_size == 0 {
            return Err(ConfigError::Invalid {
                field: "layout.tab_size",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}
