use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Why the toolbar badge is being shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BadgeKind {
    /// The page refused PiP; the user has to interact with it first.
    GestureNeeded,
    /// No playable video in the target tab.
    NoVideo,
}

/// A transient toolbar badge. The coordinator clears it once `ttl` elapses.
#[derive(Debug, Clone, PartialEq)]
pub struct Badge {
    pub kind: BadgeKind,
    pub text: String,
    /// Background color, `#rrggbb`.
    pub color: String,
    pub ttl: Duration,
}

impl Badge {
    pub fn new(
        kind: BadgeKind,
        text: impl Into<String>,
        color: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            kind,
            text: text.into(),
            color: color.into(),
            ttl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_keeps_text_and_ttl() {
        let badge = Badge::new(
            BadgeKind::GestureNeeded,
            "!",
            "#F44336",
            Duration::from_secs(60),
        );
        assert_eq!(badge.kind, BadgeKind::GestureNeeded);
        assert_eq!(badge.text, "!");
        assert_eq!(badge.color, "#F44336");
        assert_eq!(badge.ttl, Duration::from_secs(60));
    }

    #[test]
    fn kind_serializes_kebab_case() {
        let json = serde_json::to_string(&BadgeKind::GestureNeeded).unwrap();
        assert_eq!(json, "\"gesture-needed\"");
    }
}
