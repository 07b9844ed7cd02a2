//! Keyboard command names delivered by the host.

use serde::{Deserialize, Serialize};

/// Names of the host's global keyboard commands this app reacts to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
    pub toggle: String,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            toggle: "toggle-pip".into(),
        }
    }
}
