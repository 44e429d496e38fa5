//! Table-level address suppression.
//!
//! Address keywords are broad ("дом", "addr", "location") and fire on many
//! columns that hold no personal data. An `Address` finding only stands when
//! the same table also shows some other personal data category.

use crate::models::{PdnCategory, PdnResult};

/// Downgrades every `Address` record of a table to `None` unless another
/// personal data category was found in the same table.
///
/// Only the category changes; evidence, samples and patterns are kept.
/// `None` and `Unprocessed` records never keep an address alive.
pub fn apply_address_suppression(results: &mut [PdnResult]) {
    let has_other_category = results.iter().any(|result| {
        !matches!(
            result.category,
            PdnCategory::Address | PdnCategory::None | PdnCategory::Unprocessed
        )
    });

    if has_other_category {
        return;
    }

    for result in results
        .iter_mut()
        .filter(|result| result.category == PdnCategory::Address)
    {
        result.category = PdnCategory::None;
    }
}
