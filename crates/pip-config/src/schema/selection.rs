//! Video-candidate ranking policy.

use serde::{Deserialize, Serialize};

/// Weights used to rank media elements when picking a PiP target.
///
/// Only the resulting order is a contract: visible and playing beats
/// visible only, which beats playing only, which beats neither. Area
/// contributes a saturating term in `[0, 1)` so it can only break ties
/// inside one of those classes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub visible_weight: f64,
    pub playing_weight: f64,
    /// Area (px²) at which the area term reaches one half.
    pub area_scale_px: f64,
    /// Also look at media inside nested frames when the host exposes them.
    pub include_frames: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            visible_weight: 4.0,
            playing_weight: 2.0,
            area_scale_px: 250_000.0,
            include_frames: true,
        }
    }
}
