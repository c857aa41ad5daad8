//! Configuration data structures and TOML parsing.
//!
//! The config file uses TOML format. Example:
//!
//! ```toml
//! [global]
//! log_level = "info"
//!
//! [global.thresholds]
//! tap_slop = 20.0
//! multi_tap_timeout_ms = 300
//! long_press_duration_ms = 500
//! long_press_repeat_interval_ms = 100
//! pan_distance = 5.0
//! axis_pan_distance = 1.0
//! pinch_distance = 5.0
//! rotation_angle = 1.0
//! swipe_speed = 100.0
//! swipe_angle_tolerance_deg = 45.0
//! swipe_repeat_tolerance_deg = 15.0
//! velocity_window_ms = 100
//! sequence_timeout_ms = 300
//!
//! [source.mouse.thresholds]
//! pan_distance = 1.0
//! ```
//!
//! `[global.thresholds]` is optional; when present it must be complete.
//! `[source.<type>.thresholds]` sections may be partial and fall back to
//! the global values.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, warn};
use serde::Deserialize;
use thiserror::Error;

use crate::event::SourceType;

/// Top-level error type used throughout the crate.
#[derive(Debug, Error)]
pub enum GestrefError {
    #[error("Failed to read config file {path}: {source}")]
    ConfigReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    #[error("Config validation error for section '{section}': missing threshold(s): {missing}")]
    MissingThresholds { section: String, missing: String },

    #[error("Invalid threshold '{name}' in section '{section}': {value}")]
    InvalidThreshold {
        section: String,
        name: &'static str,
        value: f64,
    },

    #[error("Unknown input source '{0}' in config")]
    UnknownSource(String),

    #[error("Invalid gesture description: {0}")]
    InvalidGesture(String),

    #[error("Failed to read scene file {path}: {source}")]
    SceneReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse scene file {path}: {message}")]
    SceneParseError { path: PathBuf, message: String },

    #[error("Scene references unknown node {0}")]
    UnknownNode(u64),
}

/// Root of the TOML config file.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawConfig {
    global: RawGlobal,
    #[serde(default)]
    source: HashMap<String, RawSource>,
}

/// The `[global]` section.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawGlobal {
    log_level: Option<String>,
    log_file: Option<String>,
    thresholds: Option<RawThresholds>,
}

/// A `[source.<type>]` section.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawSource {
    #[serde(default)]
    thresholds: RawThresholds,
}

/// Threshold values - all optional so source sections can partially override.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
struct RawThresholds {
    tap_slop: Option<f64>,
    multi_tap_timeout_ms: Option<f64>,
    long_press_duration_ms: Option<f64>,
    long_press_repeat_interval_ms: Option<f64>,
    pan_distance: Option<f64>,
    axis_pan_distance: Option<f64>,
    pinch_distance: Option<f64>,
    rotation_angle: Option<f64>,
    swipe_speed: Option<f64>,
    swipe_angle_tolerance_deg: Option<f64>,
    swipe_repeat_tolerance_deg: Option<f64>,
    velocity_window_ms: Option<f64>,
    sequence_timeout_ms: Option<f64>,
}

/// Fully validated thresholds - all values guaranteed to be present.
#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds {
    /// Max finger travel for a tap, and max distance between taps of a
    /// multi-tap sequence.
    pub tap_slop: f64,
    pub multi_tap_timeout_ms: f64,
    pub long_press_duration_ms: f64,
    pub long_press_repeat_interval_ms: f64,
    pub pan_distance: f64,
    /// Pan threshold for wheel/trackpad scroll deltas.
    pub axis_pan_distance: f64,
    pub pinch_distance: f64,
    /// Degrees.
    pub rotation_angle: f64,
    /// Pixels per second.
    pub swipe_speed: f64,
    pub swipe_angle_tolerance_deg: f64,
    pub swipe_repeat_tolerance_deg: f64,
    pub velocity_window_ms: f64,
    pub sequence_timeout_ms: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            tap_slop: 20.0,
            multi_tap_timeout_ms: 300.0,
            long_press_duration_ms: 500.0,
            long_press_repeat_interval_ms: 100.0,
            pan_distance: 5.0,
            axis_pan_distance: 1.0,
            pinch_distance: 5.0,
            rotation_angle: 1.0,
            swipe_speed: 100.0,
            swipe_angle_tolerance_deg: 45.0,
            swipe_repeat_tolerance_deg: 15.0,
            velocity_window_ms: 100.0,
            sequence_timeout_ms: 300.0,
        }
    }
}

impl Thresholds {
    pub fn multi_tap_timeout(&self) -> Duration {
        ms(self.multi_tap_timeout_ms)
    }

    pub fn long_press_duration(&self) -> Duration {
        ms(self.long_press_duration_ms)
    }

    pub fn long_press_repeat_interval(&self) -> Duration {
        ms(self.long_press_repeat_interval_ms)
    }

    pub fn velocity_window(&self) -> Duration {
        ms(self.velocity_window_ms)
    }

    pub fn sequence_timeout(&self) -> Duration {
        ms(self.sequence_timeout_ms)
    }
}

fn ms(value: f64) -> Duration {
    Duration::from_secs_f64(value.max(0.0) / 1000.0)
}

/// Thresholds for every input source, with a global fallback.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GestureSettings {
    pub global: Thresholds,
    pub per_source: HashMap<SourceType, Thresholds>,
}

impl GestureSettings {
    pub fn thresholds(&self, source: SourceType) -> &Thresholds {
        self.per_source.get(&source).unwrap_or(&self.global)
    }
}

/// Top-level parsed configuration.
#[derive(Debug)]
pub struct AppConfig {
    pub log_level: String,
    pub log_file: Option<String>,
    pub settings: GestureSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: None,
            settings: GestureSettings::default(),
        }
    }
}

/// Generate merge, lift, validate, and into_validated for threshold fields.
macro_rules! threshold_fields {
    ($($field:ident),+ $(,)?) => {
        impl RawThresholds {
            fn merge_with_fallback(&self, fallback: &RawThresholds) -> RawThresholds {
                RawThresholds {
                    $($field: self.$field.or(fallback.$field),)+
                }
            }

            fn from_validated(th: &Thresholds) -> RawThresholds {
                RawThresholds {
                    $($field: Some(th.$field),)+
                }
            }

            fn into_validated(self) -> Result<Thresholds, Vec<&'static str>> {
                let missing: Vec<&str> = [$(
                    if self.$field.is_none() { Some(stringify!($field)) } else { None },
                )+].into_iter().flatten().collect();

                if !missing.is_empty() {
                    return Err(missing);
                }

                Ok(Thresholds {
                    $($field: self.$field.unwrap_or_default(),)+
                })
            }
        }

        impl Thresholds {
            /// First field that is negative or not finite.
            fn first_invalid(&self) -> Option<(&'static str, f64)> {
                [$((stringify!($field), self.$field),)+]
                    .into_iter()
                    .find(|(_, v)| !v.is_finite() || *v < 0.0)
            }
        }
    };
}

threshold_fields!(
    tap_slop,
    multi_tap_timeout_ms,
    long_press_duration_ms,
    long_press_repeat_interval_ms,
    pan_distance,
    axis_pan_distance,
    pinch_distance,
    rotation_angle,
    swipe_speed,
    swipe_angle_tolerance_deg,
    swipe_repeat_tolerance_deg,
    velocity_window_ms,
    sequence_timeout_ms,
);

fn validate(section: &str, raw: RawThresholds) -> Result<Thresholds, GestrefError> {
    let th = raw
        .into_validated()
        .map_err(|missing| GestrefError::MissingThresholds {
            section: section.to_string(),
            missing: missing.join(", "),
        })?;
    if let Some((name, value)) = th.first_invalid() {
        return Err(GestrefError::InvalidThreshold {
            section: section.to_string(),
            name,
            value,
        });
    }
    Ok(th)
}

/// Parse TOML config text. `path` is only used for error messages.
pub fn parse_config_str(text: &str, path: &Path) -> Result<AppConfig, GestrefError> {
    let raw: RawConfig = toml::from_str(text).map_err(|e| GestrefError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let global = match raw.global.thresholds {
        Some(th) => validate("global", th)?,
        None => {
            debug!("No [global.thresholds] section, using built-in defaults.");
            Thresholds::default()
        }
    };
    let global_raw = RawThresholds::from_validated(&global);

    let mut per_source = HashMap::new();
    for (name, raw_src) in &raw.source {
        let source: SourceType = name
            .parse()
            .map_err(|_| GestrefError::UnknownSource(name.clone()))?;
        if source == SourceType::Keyboard {
            warn!("Thresholds for source 'keyboard' have no effect - gestures never arm from keys.");
        }
        let merged = raw_src.thresholds.merge_with_fallback(&global_raw);
        per_source.insert(source, validate(&format!("source.{name}"), merged)?);
    }

    Ok(AppConfig {
        log_level: raw.global.log_level.unwrap_or_else(|| "info".to_string()),
        log_file: raw.global.log_file,
        settings: GestureSettings { global, per_source },
    })
}

/// Parse a TOML config file and return the fully resolved `AppConfig`.
pub fn parse_config_file(path: &Path) -> Result<AppConfig, GestrefError> {
    let text = fs::read_to_string(path).map_err(|e| GestrefError::ConfigReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_config_str(&text, path)
}
