//! Configuration schema types for pipkeeper.
//!
//! All structs use `serde(default)` so partial configs work correctly.
//! Missing fields are filled with the defaults below.

mod activation;
mod badge;
mod commands;
mod coordinator;
mod selection;
mod system;

pub use activation::*;
pub use badge::*;
pub use commands::*;
pub use coordinator::*;
pub use selection::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PipConfig {
    pub selection: SelectionConfig,
    pub activation: ActivationConfig,
    pub coordinator: CoordinatorConfig,
    pub badge: BadgeConfig,
    pub commands: CommandsConfig,
    pub logging: LoggingConfig,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_selection_weights() {
        let config = PipConfig::default();
        assert_eq!(config.selection.visible_weight, 4.0);
        assert_eq!(config.selection.playing_weight, 2.0);
        assert_eq!(config.selection.area_scale_px, 250_000.0);
        assert!(config.selection.include_frames);
    }

    #[test]
    fn default_activation() {
        let config = PipConfig::default();
        assert_eq!(config.activation.play_wait_ms, 1000);
        assert!(config.activation.muted_autoplay_recovery);
    }

    #[test]
    fn default_coordinator() {
        let config = PipConfig::default();
        assert!(config.coordinator.verify_owner);
        assert!(config.coordinator.scan_when_idle);
        assert_eq!(config.coordinator.query_timeout_ms, 1500);
        assert!(config.coordinator.auto_pip_on_switch);
        assert!(config.coordinator.persist_owner);
    }

    #[test]
    fn default_badge_and_commands() {
        let config = PipConfig::default();
        assert_eq!(config.badge.color, "#F44336");
        assert_eq!(config.badge.ttl_ms, 2000);
        assert_eq!(config.commands.toggle, "toggle-pip");
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let toml_str = r#"
[activation]
play_wait_ms = 500

[coordinator]
auto_pip_on_switch = false
"#;
        let config: PipConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.activation.play_wait_ms, 500);
        assert!(config.activation.muted_autoplay_recovery);
        assert!(!config.coordinator.auto_pip_on_switch);
        assert!(config.coordinator.verify_owner);
        assert_eq!(config.selection.visible_weight, 4.0);
    }

    #[test]
    fn empty_toml_is_default() {
        let config: PipConfig = toml::from_str("").unwrap();
        assert_eq!(config.commands.toggle, "toggle-pip");
        assert_eq!(config.badge.ttl_ms, 2000);
    }

    #[test]
    fn log_level_parses_uppercase() {
        let config: PipConfig = toml::from_str("[logging]\nlevel = \"DEBUG\"\n").unwrap();
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.level.directive(), "pip=debug");
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        let result: Result<PipConfig, _> = toml::from_str("[logging]\nlevel = \"LOUD\"\n");
        assert!(result.is_err());
    }
}
