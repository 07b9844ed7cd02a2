//! Shared range-validation helpers used by all section validators.

/// Push an error if `value` is outside `[min, max]` (integer).
pub(crate) fn validate_range(errors: &mut Vec<String>, name: &str, value: u32, min: u32, max: u32) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}

/// Push an error unless `value` is a finite number of at least `min`.
pub(crate) fn validate_min_f64(errors: &mut Vec<String>, name: &str, value: f64, min: f64) {
    if !value.is_finite() || value < min {
        errors.push(format!("{name} = {value} must be at least {min}"));
    }
}

/// `#rgb` or `#rrggbb`.
pub(crate) fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}
