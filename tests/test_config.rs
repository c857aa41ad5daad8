//! Tests for `gestref::config` - TOML parsing, threshold merging,
//! per-source overrides, and error handling.

use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

use gestref::config::{AppConfig, Thresholds, parse_config_file, parse_config_str};
use gestref::event::SourceType;

// ── Helpers ──────────────────────────────────────────────────

/// All thresholds as a TOML snippet for embedding in test configs.
const ALL_THRESHOLDS: &str = r#"
[global.thresholds]
tap_slop = 10.0
multi_tap_timeout_ms = 250
long_press_duration_ms = 600
long_press_repeat_interval_ms = 50
pan_distance = 8.0
axis_pan_distance = 2.0
pinch_distance = 6.0
rotation_angle = 3.0
swipe_speed = 200.0
swipe_angle_tolerance_deg = 30.0
swipe_repeat_tolerance_deg = 10.0
velocity_window_ms = 80
sequence_timeout_ms = 400
"#;

/// Write TOML to a temp file and parse it. Optionally prepends global thresholds.
fn load(toml_content: &str, with_thresholds: bool) -> AppConfig {
    let full = if with_thresholds {
        format!("{ALL_THRESHOLDS}\n{toml_content}")
    } else {
        toml_content.to_string()
    };
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(full.as_bytes()).unwrap();
    f.flush().unwrap();
    parse_config_file(f.path()).unwrap()
}

/// Parse raw TOML that is expected to fail.
fn load_err(toml_content: &str) -> String {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(toml_content.as_bytes()).unwrap();
    f.flush().unwrap();
    parse_config_file(f.path()).unwrap_err().to_string()
}

// ── Error handling ───────────────────────────────────────────

#[test]
fn test_file_not_found() {
    let msg = parse_config_file(std::path::Path::new("/no/such/file.toml"))
        .unwrap_err()
        .to_string();
    assert!(msg.contains("Failed to read config file"));
    assert!(msg.contains("/no/such/file.toml"));
}

#[test]
fn test_invalid_toml() {
    let msg = load_err("this is not valid toml [[[");
    assert!(msg.contains("Failed to parse config file"));
}

#[test]
fn test_missing_thresholds_lists_field_names() {
    let msg = load_err(
        r#"
[global.thresholds]
tap_slop = 10.0
pan_distance = 4.0
"#,
    );
    assert!(msg.contains("global"));
    assert!(msg.contains("long_press_duration_ms"));
    assert!(msg.contains("sequence_timeout_ms"));
    assert!(!msg.contains("tap_slop,"));
}

#[test]
fn test_negative_threshold_rejected() {
    let msg = load_err(&format!(
        "{}\n[source.mouse.thresholds]\npan_distance = -1.0\n",
        ALL_THRESHOLDS
    ));
    assert!(msg.contains("pan_distance"));
    assert!(msg.contains("source.mouse"));
}

#[test]
fn test_unknown_source_rejected() {
    let msg = load_err("[source.joystick.thresholds]\npan_distance = 1.0\n");
    assert!(msg.contains("joystick"));
}

// ── Empty / minimal configs ──────────────────────────────────

#[test]
fn test_empty_config_uses_defaults() {
    let config = load("", false);
    assert_eq!(config.log_level, "info");
    assert!(config.log_file.is_none());
    assert_eq!(config.settings.global, Thresholds::default());
    assert!(config.settings.per_source.is_empty());
}

#[test]
fn test_default_values() {
    let th = Thresholds::default();
    assert_eq!(th.tap_slop, 20.0);
    assert_eq!(th.long_press_duration(), Duration::from_millis(500));
    assert_eq!(th.multi_tap_timeout(), Duration::from_millis(300));
    assert_eq!(th.sequence_timeout(), Duration::from_millis(300));
}

#[test]
fn test_global_section() {
    let config = load(
        r#"
[global]
log_level = "debug"
log_file = "/tmp/gestref.log"
"#,
        true,
    );
    assert_eq!(config.log_level, "debug");
    assert_eq!(config.log_file.as_deref(), Some("/tmp/gestref.log"));
    assert_eq!(config.settings.global.tap_slop, 10.0);
    assert_eq!(
        config.settings.global.long_press_duration(),
        Duration::from_millis(600)
    );
}

// ── Per-source merging ───────────────────────────────────────

#[test]
fn test_source_override_merges_over_global() {
    let config = load(
        r#"
[source.mouse.thresholds]
pan_distance = 1.0
"#,
        true,
    );
    let mouse = config.settings.thresholds(SourceType::Mouse);
    assert_eq!(mouse.pan_distance, 1.0);
    assert_eq!(mouse.tap_slop, 10.0);
    assert_eq!(mouse.swipe_speed, 200.0);

    let touch = config.settings.thresholds(SourceType::Touch);
    assert_eq!(touch.pan_distance, 8.0);
}

#[test]
fn test_source_override_without_global_uses_builtin_defaults() {
    let config = load(
        r#"
[source.touch_pad.thresholds]
swipe_speed = 50.0
"#,
        false,
    );
    let pad = config.settings.thresholds(SourceType::TouchPad);
    assert_eq!(pad.swipe_speed, 50.0);
    assert_eq!(pad.pan_distance, Thresholds::default().pan_distance);
}

#[test]
fn test_parse_str_reports_given_path() {
    let msg = parse_config_str("[[[", std::path::Path::new("inline.toml"))
        .unwrap_err()
        .to_string();
    assert!(msg.contains("inline.toml"));
}
