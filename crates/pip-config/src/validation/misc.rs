//! Validation for activation, coordinator, badge, and command sections.

use crate::schema::PipConfig;

use super::helpers::{is_hex_color, validate_range};

pub(crate) fn validate_activation(errors: &mut Vec<String>, config: &PipConfig) {
    validate_range(
        errors,
        "activation.play_wait_ms",
        config.activation.play_wait_ms,
        100,
        10_000,
    );
}

pub(crate) fn validate_coordinator(errors: &mut Vec<String>, config: &PipConfig) {
    validate_range(
        errors,
        "coordinator.query_timeout_ms",
        config.coordinator.query_timeout_ms,
        100,
        30_000,
    );
}

pub(crate) fn validate_badge(errors: &mut Vec<String>, config: &PipConfig) {
    validate_range(errors, "badge.ttl_ms", config.badge.ttl_ms, 0, 60_000);
    if !is_hex_color(&config.badge.color) {
        errors.push(format!(
            "badge.color = {:?} is not a #rrggbb color",
            config.badge.color
        ));
    }
    // Browsers only render about four characters in a badge.
    for (name, text) in [
        ("badge.gesture_text", &config.badge.gesture_text),
        ("badge.no_video_text", &config.badge.no_video_text),
    ] {
        if text.chars().count() > 4 {
            errors.push(format!("{name} = {text:?} is longer than 4 characters"));
        }
    }
}

pub(crate) fn validate_commands(errors: &mut Vec<String>, config: &PipConfig) {
    if config.commands.toggle.trim().is_empty() {
        errors.push("commands.toggle must not be empty".into());
    }
}
