//! Tab agent activation settings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivationConfig {
    /// Upper bound on waiting for playback to start during recovery (ms).
    pub play_wait_ms: u32,
    /// Try mute + play + retry when the browser refuses a PiP request.
    pub muted_autoplay_recovery: bool,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            play_wait_ms: 1000,
            muted_autoplay_recovery: true,
        }
    }
}
