//! Ranking weights must keep visibility above playing state above area.

use crate::schema::PipConfig;

use super::helpers::validate_min_f64;

/// The area term is below 1, so each weight needs at least 1 of headroom
/// over everything ranked beneath it.
pub(crate) fn validate_selection(errors: &mut Vec<String>, config: &PipConfig) {
    let selection = &config.selection;
    validate_min_f64(errors, "selection.playing_weight", selection.playing_weight, 1.0);
    validate_min_f64(
        errors,
        "selection.visible_weight",
        selection.visible_weight,
        selection.playing_weight + 1.0,
    );
    if !selection.area_scale_px.is_finite() || selection.area_scale_px <= 0.0 {
        errors.push(format!(
            "selection.area_scale_px = {} must be positive",
            selection.area_scale_px
        ));
    }
}
