//! Structural abstraction of sampled values.
//!
//! A value's pattern replaces every letter with `A`, every ASCII digit with
//! `9` and everything else with `#`. Values sharing a pattern are treated as
//! structurally equivalent, so only the first one seen is passed on to the
//! classifier.

use crate::models::SampleValue;
use std::collections::HashSet;

/// Maps a raw value to its letter/digit/symbol shape.
///
/// The output has exactly as many characters as the input.
///
/// # Example
/// ```rust
/// use pdnscan_core::abstraction::value_pattern;
///
/// assert_eq!(value_pattern("Ivanov-12"), "AAAAAA#99");
/// assert_eq!(value_pattern("ул. Мира"), "AA##AAAA");
/// ```
pub fn value_pattern(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_alphabetic() {
                'A'
            } else if c.is_ascii_digit() {
                '9'
            } else {
                '#'
            }
        })
        .collect()
}

/// Keeps the first value for each distinct pattern, in first-seen order.
pub fn dedup_samples<I>(values: I) -> Vec<SampleValue>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    let mut samples = Vec::new();

    for value in values {
        let pattern = value_pattern(&value);
        if seen.insert(pattern.clone()) {
            samples.push(SampleValue { value, pattern });
        }
    }

    samples
}
