//! Configuration types for paperline.
//!
//! This module defines the layout options recognized by the engine and the
//! persisted user preferences (the ordering mode and catalog reload interval).

use crate::calendar::months_between;
use crate::item::{ItemKind, OrderingMode, TimelineItem};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration for paperline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Preferred ordering mode.
    #[serde(default)]
    pub mode: OrderingMode,

    /// Seconds between automatic reloads of a catalog file (0 disables).
    #[serde(default = "default_reload_interval_secs")]
    pub reload_interval_secs: u64,

    /// Layout engine options.
    #[serde(default)]
    pub layout: LayoutConfig,
}

fn default_reload_interval_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: OrderingMode::default(),
            reload_interval_secs: default_reload_interval_secs(),
            layout: LayoutConfig::default(),
        }
    }
}

impl Config {
    /// Interval between automatic catalog reloads, if enabled.
    pub fn reload_interval(&self) -> Option<Duration> {
        (self.reload_interval_secs > 0).then(|| Duration::from_secs(self.reload_interval_secs))
    }
}

/// Options for the timeline layout engine.
///
/// Lengths are in abstract layout units; the presentation layer decides how
/// many rows (or rems, or pixels) a unit is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Minimum distance between consecutive items.
    #[serde(default = "default_minimum_gap")]
    pub minimum_gap: f64,

    /// Units per elapsed month in chronological mode.
    #[serde(default = "default_months_scale")]
    pub months_scale: f64,

    /// Shortest rendered length of a spanning event.
    #[serde(default = "default_min_duration_length")]
    pub min_duration_length: f64,

    /// Quiet period before an active-item change is reported.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Trigger line position as a fraction of viewport height from the top.
    #[serde(default = "default_trigger_line_offset")]
    pub trigger_line_offset: f64,

    /// Terminal rows per layout unit.
    #[serde(default = "default_rows_per_unit")]
    pub rows_per_unit: f64,
}

fn default_minimum_gap() -> f64 {
    15.0
}

fn default_months_scale() -> f64 {
    1.0
}

fn default_min_duration_length() -> f64 {
    2.0
}

fn default_debounce_ms() -> u64 {
    50
}

fn default_trigger_line_offset() -> f64 {
    0.1
}

fn default_rows_per_unit() -> f64 {
    0.5
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            minimum_gap: default_minimum_gap(),
            months_scale: default_months_scale(),
            min_duration_length: default_min_duration_length(),
            debounce_ms: default_debounce_ms(),
            trigger_line_offset: default_trigger_line_offset(),
            rows_per_unit: default_rows_per_unit(),
        }
    }
}

/// Rendered length of a spanning event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationSpan {
    /// Length in layout units, never below the configured minimum.
    pub length: f64,
    /// Elapsed months between start and end (may be negative for bad input).
    pub months: f64,
    /// The end did not strictly follow the start and the length was clamped.
    pub invalid_range: bool,
}

impl LayoutConfig {
    /// Check the options, rejecting values that indicate a caller bug.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.minimum_gap.is_finite() || self.minimum_gap < 0.0 {
            return Err(ConfigError::InvalidMinimumGap(self.minimum_gap));
        }
        if !self.months_scale.is_finite() || self.months_scale <= 0.0 {
            return Err(ConfigError::InvalidMonthsScale(self.months_scale));
        }
        if !self.min_duration_length.is_finite() || self.min_duration_length <= 0.0 {
            return Err(ConfigError::InvalidMinDurationLength(self.min_duration_length));
        }
        if !(0.0..=1.0).contains(&self.trigger_line_offset) {
            return Err(ConfigError::InvalidTriggerLine(self.trigger_line_offset));
        }
        if !self.rows_per_unit.is_finite() || self.rows_per_unit <= 0.0 {
            return Err(ConfigError::InvalidRowsPerUnit(self.rows_per_unit));
        }
        Ok(())
    }

    /// Debounce window as a `Duration`.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Rendered length of a spanning event, or `None` for point items.
    ///
    /// Only events carry a duration. An end that does not strictly follow
    /// the start (or a missing start) is an invalid range: the length clamps
    /// to `min_duration_length` instead of going negative.
    pub fn duration_length(&self, item: &TimelineItem) -> Option<DurationSpan> {
        if item.kind != ItemKind::Event {
            return None;
        }
        let end = item.duration_end?;
        let Some(start) = item.date else {
            return Some(DurationSpan {
                length: self.min_duration_length,
                months: 0.0,
                invalid_range: true,
            });
        };

        let months = months_between(start, end);
        let invalid_range = end <= start;
        let length = if invalid_range {
            self.min_duration_length
        } else {
            (self.months_scale * months).max(self.min_duration_length)
        };

        Some(DurationSpan {
            length,
            months,
            invalid_range,
        })
    }
}

impl Config {
    /// Load configuration from a file, falling back to defaults if it is missing.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        let config: Self = serde_json::from_str(&content).map_err(ConfigError::Parse)?;
        config.layout.validate()?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        std::fs::write(path, content).map_err(ConfigError::Io)
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `minimum_gap` is negative or not finite.
    #[error("invalid minimum_gap: {0} (must be a finite, non-negative length)")]
    InvalidMinimumGap(f64),

    /// `months_scale` is not positive.
    #[error("invalid months_scale: {0} (must be positive)")]
    InvalidMonthsScale(f64),

    /// `min_duration_length` is not positive.
    #[error("invalid min_duration_length: {0} (must be positive)")]
    InvalidMinDurationLength(f64),

    /// `trigger_line_offset` is outside the viewport.
    #[error("invalid trigger_line_offset: {0} (must be within 0.0..=1.0)")]
    InvalidTriggerLine(f64),

    /// `rows_per_unit` is not positive.
    #[error("invalid rows_per_unit: {0} (must be positive)")]
    InvalidRowsPerUnit(f64),

    /// I/O error reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing config JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Error serializing config to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),
}
