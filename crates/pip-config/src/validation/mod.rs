//! Full configuration validation.
//!
//! Each section has its own validator; this orchestrator calls them all
//! and collects errors into a single `ConfigError`.

mod helpers;
mod misc;
mod selection;


use crate::schema::PipConfig;
use pip_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &PipConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    selection::validate_selection(&mut errors, config);
    misc::validate_activation(&mut errors, config);
    misc::validate_coordinator(&mut errors, config);
    misc::validate_badge(&mut errors, config);
    misc::validate_commands(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
