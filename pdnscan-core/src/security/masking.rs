//! Masking of sampled values for persisted reports.
//!
//! Reports carry both the raw sample and its masked form. Masking counts
//! characters, not bytes, so Cyrillic values are cut on character
//! boundaries.

use crate::models::NOT_AVAILABLE;

const MASK: &str = "****";
const VISIBLE_CHARS: usize = 4;
const MIN_PARTIAL_LEN: usize = 8;

/// Masks a sampled value.
///
/// Values longer than eight characters keep their first and last four
/// characters; shorter values are fully masked. The `N/A` sentinel passes
/// through unchanged.
///
/// # Example
/// ```rust
/// use pdnscan_core::security::mask_sample_value;
///
/// assert_eq!(mask_sample_value("name@example.com"), "name****.com");
/// assert_eq!(mask_sample_value("abc"), "****");
/// assert_eq!(mask_sample_value("N/A"), "N/A");
/// ```
pub fn mask_sample_value(value: &str) -> String {
    if value == NOT_AVAILABLE {
        return value.to_string();
    }

    let char_count = value.chars().count();
    if char_count <= MIN_PARTIAL_LEN {
        return MASK.to_string();
    }

    let head: String = value.chars().take(VISIBLE_CHARS).collect();
    let tail: String = value
        .chars()
        .skip(char_count.saturating_sub(VISIBLE_CHARS))
        .collect();
    format!("{head}{MASK}{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_long_value() {
        assert_eq!(mask_sample_value("name@example.com"), "name****.com");
        assert_eq!(mask_sample_value("123456789"), "1234****6789");
    }

    #[test]
    fn test_mask_short_value() {
        assert_eq!(mask_sample_value("abc"), "****");
        assert_eq!(mask_sample_value("12345678"), "****");
        assert_eq!(mask_sample_value(""), "****");
    }

    #[test]
    fn test_mask_not_available_sentinel() {
        assert_eq!(mask_sample_value(NOT_AVAILABLE), "N/A");
    }

    #[test]
    fn test_mask_cyrillic_on_char_boundaries() {
        assert_eq!(mask_sample_value("Иванов Иван"), "Иван****Иван");
    }
}
