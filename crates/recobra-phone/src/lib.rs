// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Brazilian mobile number normalization and validation.
//!
//! Pure functions, no I/O. Malformed input never panics: `normalize`
//! always produces a digit string and [`is_valid_mobile`] returns `false`
//! for anything implausible, so callers can always branch on a boolean.

/// Country calling code for the serviced region.
pub const COUNTRY_CODE: &str = "55";

/// Area codes (DDDs) currently assigned in the Brazilian numbering plan.
const VALID_AREA_CODES: &[u8] = &[
    11, 12, 13, 14, 15, 16, 17, 18, 19, // SP
    21, 22, 24, // RJ
    27, 28, // ES
    31, 32, 33, 34, 35, 37, 38, // MG
    41, 42, 43, 44, 45, 46, // PR
    47, 48, 49, // SC
    51, 53, 54, 55, // RS
    61, // DF
    62, 64, // GO
    63, // TO
    65, 66, // MT
    67, // MS
    68, // AC
    69, // RO
    71, 73, 74, 75, 77, // BA
    79, // SE
    81, 87, // PE
    82, // AL
    83, // PB
    84, // RN
    85, 88, // CE
    86, 89, // PI
    91, 93, 94, // PA
    92, 97, // AM
    95, // RR
    96, // AP
    98, 99, // MA
];

/// Canonicalizes a raw phone string to a country-prefixed digit string.
///
/// Strips every non-digit character and prepends the country code unless
/// the digits already start with it.
pub fn normalize(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.starts_with(COUNTRY_CODE) {
        digits
    } else {
        format!("{COUNTRY_CODE}{digits}")
    }
}

/// Strips the country prefix, leaving the national (DDD + subscriber) part.
pub fn strip_country_code(phone: &str) -> &str {
    phone.strip_prefix(COUNTRY_CODE).unwrap_or(phone)
}

/// Checks that a (possibly country-prefixed) number is a plausible Brazilian
/// mobile: 10-11 national digits, a DDD from the assignment table, and a
/// subscriber number starting with 9.
pub fn is_valid_mobile(phone: &str) -> bool {
    let national = strip_country_code(phone);

    if !national.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    if national.len() < 10 || national.len() > 11 {
        return false;
    }

    let Ok(area_code) = national[..2].parse::<u8>() else {
        return false;
    };
    if !VALID_AREA_CODES.contains(&area_code) {
        return false;
    }

    // Mobile numbering convention: subscriber number leads with 9.
    national.as_bytes()[2] == b'9'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_formatting_and_prefixes_country_code() {
        assert_eq!(normalize("(11) 98888-7777"), "5511988887777");
        assert_eq!(normalize("11 98888 7777"), "5511988887777");
        assert_eq!(normalize("+55 11 98888-7777"), "5511988887777");
    }

    #[test]
    fn normalize_keeps_existing_country_code() {
        assert_eq!(normalize("5511988887777"), "5511988887777");
    }

    #[test]
    fn normalize_is_stable_under_repetition() {
        for raw in ["(11) 98888-7777", "5547999112233", "47 9 9911-2233", ""] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "normalize must be idempotent for {raw:?}");
        }
    }

    #[test]
    fn normalize_of_empty_input_is_invalid_not_a_panic() {
        let normalized = normalize("");
        assert_eq!(normalized, "55");
        assert!(!is_valid_mobile(&normalized));
    }

    #[test]
    fn strip_country_code_removes_leading_55_only() {
        assert_eq!(strip_country_code("5511988887777"), "11988887777");
        assert_eq!(strip_country_code("11988887777"), "11988887777");
    }

    #[test]
    fn valid_mobiles_accepted() {
        assert!(is_valid_mobile("5511988887777")); // 11 digits, prefixed
        assert!(is_valid_mobile("11988887777")); // 11 digits, bare
        assert!(is_valid_mobile("4799112233")); // 10 digits, leading 9
    }

    #[test]
    fn invalid_area_code_rejected() {
        assert!(!is_valid_mobile("5510988887777")); // DDD 10 unassigned
        assert!(!is_valid_mobile("5520988887777")); // DDD 20 unassigned
    }

    #[test]
    fn landline_shape_rejected() {
        // Subscriber number must lead with 9.
        assert!(!is_valid_mobile("551133334444"));
    }

    #[test]
    fn wrong_length_rejected() {
        assert!(!is_valid_mobile("55119888877")); // 9 national digits
        assert!(!is_valid_mobile("551198888777712")); // 12 national digits
        assert!(!is_valid_mobile(""));
    }

    #[test]
    fn non_numeric_rejected() {
        assert!(!is_valid_mobile("11abcde9999"));
    }
}
