/// Color utilities for projects, clients and UI.
use rand::RngExt;

use crate::error::ValidationError;

/// Validate if a string is a valid hex color (e.g., #RRGGBB).
pub fn is_valid_hex(s: &str) -> bool {
    s.starts_with('#') && s.len() == 7 && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Generate a random color from a predefined palette.
pub fn random_color() -> String {
    const PALETTE: &[&str] = &[
        "#3B82F6", "#10B981", "#F59E0B", "#EF4444", "#8B5CF6", "#EC4899", "#06B6D4",
        "#84CC16", "#F97316", "#6366F1", "#14B8A6", "#E11D48",
    ];
    let mut rng = rand::rng();
    PALETTE[rng.random_range(0..PALETTE.len())].to_string()
}

/// Accepts `RRGGBB` or `#rrggbb` and returns the canonical `#RRGGBB` form.
pub fn normalize_hex(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    let with_hash = if trimmed.starts_with('#') {
        trimmed.to_string()
    } else {
        format!("#{trimmed}")
    };
    if is_valid_hex(&with_hash) {
        Ok(with_hash.to_ascii_uppercase())
    } else {
        Err(ValidationError::InvalidColor(value.to_string()))
    }
}

/// Uses the given color when present, otherwise picks one from the palette.
pub fn color_or_random(value: Option<&str>) -> Result<String, ValidationError> {
    match value {
        Some(color) if !color.trim().is_empty() => normalize_hex(color),
        _ => Ok(random_color()),
    }
}
