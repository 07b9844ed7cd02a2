//! Toolbar badge appearance.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BadgeConfig {
    pub gesture_text: String,
    pub no_video_text: String,
    /// Badge background, `#rrggbb`.
    pub color: String,
    pub ttl_ms: u32,
}

impl Default for BadgeConfig {
    fn default() -> Self {
        Self {
            gesture_text: "\u{1F446}".into(),
            no_video_text: "0".into(),
            color: "#F44336".into(),
            ttl_ms: 2000,
        }
    }
}
