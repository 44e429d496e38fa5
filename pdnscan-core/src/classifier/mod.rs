//! Rule-based personal data classifier.
//!
//! [`classify`] is a pure function: the same text always yields the same
//! categories, and letter case never matters. It is applied to column names
//! and to deduplicated sample values, never to declared types or table names.

pub mod rules;

use crate::models::PdnCategory;
use rules::{ADDRESS_TOKENS, BIRTH_TOKENS, KEYWORD_RULES, VALUE_RULES};
use std::collections::BTreeSet;

/// Returns every category whose rules match `text`.
///
/// An empty set means nothing matched; it is not an error.
///
/// # Example
/// ```rust
/// use pdnscan_core::classifier::classify;
/// use pdnscan_core::models::PdnCategory;
///
/// let categories = classify("IVANOV@MAIL.RU");
/// assert!(categories.contains(&PdnCategory::Email));
/// assert!(classify("quantity").is_empty());
/// ```
pub fn classify(text: &str) -> BTreeSet<PdnCategory> {
    // Upper then lower folds letters like dotless i onto their ASCII form
    let input = text.to_uppercase().to_lowercase();
    let mut found = BTreeSet::new();

    for rule in &VALUE_RULES {
        if let Some(re) = rule.regex.as_ref()
            && re.is_match(&input)
        {
            found.insert(rule.category);
        }
    }

    for (category, keywords) in KEYWORD_RULES {
        if contains_any(&input, keywords) {
            found.insert(*category);
        }
    }

    if contains_any(&input, ADDRESS_TOKENS) {
        found.insert(PdnCategory::Address);
    }

    if contains_any(&input, BIRTH_TOKENS) {
        found.insert(PdnCategory::BirthDate);
    }

    found
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn only(category: PdnCategory) -> BTreeSet<PdnCategory> {
        BTreeSet::from([category])
    }

    #[test]
    fn test_email_value() {
        assert_eq!(classify("ivanov@mail.ru"), only(PdnCategory::Email));
        assert!(!classify("ivanov@localhost").contains(&PdnCategory::Email));
    }

    #[test]
    fn test_phone_value() {
        assert!(classify("+7 (912) 345-67-89").contains(&PdnCategory::PhoneRu));
        assert!(classify("8-912-345-67-89").contains(&PdnCategory::PhoneRu));
        assert!(!classify("+1 415 555 0100").contains(&PdnCategory::PhoneRu));
    }

    #[test]
    fn test_passport_value() {
        assert!(classify("4509 123456").contains(&PdnCategory::PassportRu));
        assert!(classify("45 09 123456").contains(&PdnCategory::PassportRu));
        assert!(classify("4509123456").contains(&PdnCategory::PassportRu));
        assert!(classify("серия 4509 номер 123456").contains(&PdnCategory::PassportRu));
    }

    #[test]
    fn test_snils_value() {
        assert!(classify("112-233-445 95").contains(&PdnCategory::Snils));
        assert!(classify("112-233-445-95").contains(&PdnCategory::Snils));
    }

    #[test]
    fn test_individual_tax_id_requires_exact_run() {
        assert!(classify("500100732259").contains(&PdnCategory::IndividualTaxId));
        assert!(classify("inn: 500100732259;").contains(&PdnCategory::IndividualTaxId));
        assert!(!classify("5001007322591").contains(&PdnCategory::IndividualTaxId));
        assert!(!classify("50010073225").contains(&PdnCategory::IndividualTaxId));
    }

    #[test]
    fn test_credit_card_value() {
        assert!(classify("4276 3800 1234 5678").contains(&PdnCategory::CreditCard));
        assert!(classify("4276-3800-1234-5678").contains(&PdnCategory::CreditCard));
    }

    #[test]
    fn test_header_keywords() {
        assert!(classify("LastName").contains(&PdnCategory::FullName));
        assert!(classify("ФИО").contains(&PdnCategory::FullName));
        assert!(classify("employee_id").contains(&PdnCategory::PersonalData));
        assert!(classify("Телефон").contains(&PdnCategory::PhoneRu));
        assert!(classify("snils").contains(&PdnCategory::SnilsOrTaxId));
        assert!(classify("DateOfBirth").contains(&PdnCategory::BirthDate));
        assert!(classify("ТабельныйНомер").contains(&PdnCategory::PersonnelNumber));
        assert!(classify("photo_url").contains(&PdnCategory::Photo));
    }

    #[test]
    fn test_address_tokens() {
        assert_eq!(classify("ул. Ленина, 5"), only(PdnCategory::Address));
        assert!(classify("квартира 12").contains(&PdnCategory::Address));
    }

    #[test]
    fn test_birth_tokens() {
        assert!(classify("birthday").contains(&PdnCategory::BirthDate));
        assert!(classify("рождения").contains(&PdnCategory::BirthDate));
    }

    #[test]
    fn test_email_address_header_matches_both_families() {
        let categories = classify("email_address");
        assert!(categories.contains(&PdnCategory::Email));
        assert!(categories.contains(&PdnCategory::Address));
    }

    #[test]
    fn test_dotless_i_folds_like_ascii() {
        assert_eq!(classify("maıl"), classify("MAIL"));
        assert!(classify("e-maıl").contains(&PdnCategory::Email));
    }

    #[test]
    fn test_no_match_is_empty() {
        assert!(classify("col1").is_empty());
        assert!(classify("").is_empty());
        assert!(classify("quantity").is_empty());
    }

    proptest! {
        #[test]
        fn classify_ignores_case(text in ".{0,40}") {
            prop_assert_eq!(classify(&text), classify(&text.to_uppercase()));
        }

        #[test]
        fn classify_is_deterministic(text in ".{0,64}") {
            prop_assert_eq!(classify(&text), classify(&text));
        }
    }
}
