//! Rule tables for personal data detection.
//!
//! All tables are immutable and built once per process. Keywords and
//! patterns are written in lower case; the classifier lower-cases its input
//! before matching.

use crate::models::PdnCategory;
use regex::Regex;
use std::sync::LazyLock;

/// A compiled value-shape rule.
pub struct ValueRule {
    pub category: PdnCategory,
    pub regex: &'static LazyLock<Option<Regex>>,
}

macro_rules! value_pattern {
    ($name:ident, $regex_str:expr) => {
        static $name: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new($regex_str).ok());
    };
}

value_pattern!(RE_EMAIL, r"[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,}");

value_pattern!(
    RE_PHONE_RU,
    r"(?:\+7|8)[\s\-]?\(?[0-9]{3}\)?[\s\-]?[0-9]{3}[\s\-]?[0-9]{2}[\s\-]?[0-9]{2}"
);

value_pattern!(
    RE_PASSPORT_RU,
    r"\b(?:[0-9]{2}\s?[0-9]{2}\s?[0-9]{6}|[0-9]{10})\b|(?:паспорт|серия|номер)[^0-9]*[0-9]{4}[^0-9]*[0-9]{6}"
);

value_pattern!(RE_SNILS, r"\b[0-9]{3}-?[0-9]{3}-?[0-9]{3}[\-\s]?[0-9]{2}\b");

// Exactly twelve digits: the run may not continue on either side.
value_pattern!(RE_INDIVIDUAL_TAX_ID, r"(?:^|[^0-9])[0-9]{12}(?:[^0-9]|$)");

value_pattern!(
    RE_CREDIT_CARD,
    r"[0-9]{4}[\s\-]?[0-9]{4}[\s\-]?[0-9]{4}[\s\-]?[0-9]{4}"
);

/// Value-shape rules in evaluation order.
pub static VALUE_RULES: [ValueRule; 6] = [
    ValueRule {
        category: PdnCategory::Email,
        regex: &RE_EMAIL,
    },
    ValueRule {
        category: PdnCategory::PhoneRu,
        regex: &RE_PHONE_RU,
    },
    ValueRule {
        category: PdnCategory::PassportRu,
        regex: &RE_PASSPORT_RU,
    },
    ValueRule {
        category: PdnCategory::Snils,
        regex: &RE_SNILS,
    },
    ValueRule {
        category: PdnCategory::IndividualTaxId,
        regex: &RE_INDIVIDUAL_TAX_ID,
    },
    ValueRule {
        category: PdnCategory::CreditCard,
        regex: &RE_CREDIT_CARD,
    },
];

/// Header keyword rules: a category applies when any keyword is a substring.
pub static KEYWORD_RULES: &[(PdnCategory, &[&str])] = &[
    (
        PdnCategory::FullName,
        &[
            "фамил",
            "fami",
            "surn",
            "lastname",
            "last name",
            "имя",
            "name",
            "firstname",
            "first name",
            "отчест",
            "middlename",
            "middle name",
            "patronym",
            "фам",
            "fio",
            "фио",
            "fullname",
            "full name",
        ],
    ),
    (
        PdnCategory::PersonalData,
        &["сотруд", "руковод", "manag", "физи", "персон", "person", "empl"],
    ),
    (
        PdnCategory::Address,
        &["адрес", "address", "addr", "location", "место"],
    ),
    (
        PdnCategory::Email,
        &["эп", "mail", "адресэп", "адрес эп", "email"],
    ),
    (
        PdnCategory::PhoneRu,
        &["телефон", "phone", "tel", "мобильн", "mobile", "contactno"],
    ),
    (
        PdnCategory::Passport,
        &["паспорт", "passport", "серия", "series", "номер", "number"],
    ),
    (
        PdnCategory::SnilsOrTaxId,
        &["снилс", "snils", "инн", "taxid", "tax id"],
    ),
    (
        PdnCategory::BirthDate,
        &[
            "рожд",
            "birth",
            "dateofbirth",
            "birthdate",
            "датарожд",
            "дата рожд",
        ],
    ),
    (PdnCategory::PersonnelNumber, &["таб", "табель"]),
    (PdnCategory::Photo, &["фото", "foto", "photo"]),
];

/// Street and dwelling tokens that always mean an address.
pub static ADDRESS_TOKENS: &[&str] = &["ул.", "улица", "дом", "кв.", "квартира"];

/// Birth-related tokens that always mean a birth date.
pub static BIRTH_TOKENS: &[&str] = &["рожден", "birthday"];
