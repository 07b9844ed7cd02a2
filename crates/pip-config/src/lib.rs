//! pipkeeper configuration.
//!
//! TOML-based configuration with full validation. Every section uses
//! defaults so partial configs work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pip_config::{load_config, config_to_json};
//!
//! let config = load_config(None).expect("failed to load config");
//! println!("{}", config_to_json(&config));
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{PipConfig, CONFIG_SCHEMA_VERSION};

use pip_common::ConfigError;
use std::path::Path;

/// Load and validate config.
///
/// With `path`, that file must exist. Without it, `config.toml` is read from
/// the OS config directory and created from the template if missing.
pub fn load_config(path: Option<&Path>) -> Result<PipConfig, ConfigError> {
    let config = match path {
        Some(path) => toml_loader::load_from_path(path)?,
        None => toml_loader::load_default()?,
    };

    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &PipConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
