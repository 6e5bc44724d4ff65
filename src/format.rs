//! Pure formatting rules for affiliate capture.
//!
//! Everything here is deterministic and side-effect free: promotional code
//! derivation, the national phone mask, the tracking link template, and the
//! registration-date display string.

use chrono::{DateTime, Utc};
use url::Url;

/// Base URL of the event page every tracking link points at.
const SALES_BASE_URL: &str = "https://www.sympla.com.br/evento/habity-fight/3089949";

/// Constant `utm_source` for every affiliate link.
const UTM_SOURCE: &str = "afiliado";

/// Constant `utm_campaign` for every affiliate link.
const UTM_CAMPAIGN: &str = "habity-fight";

/// Maximum number of significant digits a phone number keeps.
const PHONE_MAX_DIGITS: usize = 11;

/// Shown whenever a stored registration timestamp is missing or undecodable.
pub const DATE_UNAVAILABLE: &str = "Data não disponível";

/// Derive the promotional code from name and description.
///
/// Both inputs are lower-cased, trimmed, and stripped of every character
/// outside `[a-z0-9]`; the cleaned name is concatenated with the cleaned
/// description, no separator. Phone and city never participate.
///
/// Identical inputs always yield the identical code, and inputs that only
/// differ in case or punctuation collapse to the same code. The result may
/// be empty when neither input contains an ASCII letter or digit; callers
/// must reject that before using it as a record key.
pub fn generate_code(nome: &str, descricao: &str) -> String {
    let mut code = clean(nome);
    code.push_str(&clean(descricao));
    code
}

fn clean(input: &str) -> String {
    input
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Build the tracking link for a code.
///
/// Fixed event URL with `utm_source` and `utm_campaign` constants; the code
/// only ever appears as the `utm_medium` query parameter.
pub fn sales_link(codigo: &str) -> String {
    let mut url = Url::parse(SALES_BASE_URL).expect("sales base URL is valid");
    url.query_pairs_mut()
        .append_pair("utm_source", UTM_SOURCE)
        .append_pair("utm_medium", codigo)
        .append_pair("utm_campaign", UTM_CAMPAIGN);
    url.into()
}

/// Apply the national display mask to a phone number.
///
/// Non-digit characters are stripped first, the digit sequence is truncated
/// to 11 significant digits, then regrouped:
///
/// - up to 2 digits: unformatted (`"34"`)
/// - 3 to 7 digits: `"(34) 9999"`
/// - 8 to 11 digits: `"(34) 99999-8888"`
///
/// The output is the display string that gets stored; digits are never
/// persisted unmasked.
pub fn mask_phone(input: &str) -> String {
    let digits: String = input
        .chars()
        .filter(char::is_ascii_digit)
        .take(PHONE_MAX_DIGITS)
        .collect();

    match digits.len() {
        0..=2 => digits,
        3..=7 => format!("({}) {}", &digits[..2], &digits[2..]),
        _ => format!("({}) {}-{}", &digits[..2], &digits[2..7], &digits[7..]),
    }
}

/// Format a registration instant for display, `dd/mm/yyyy hh:mm`.
///
/// Total over its input: a missing timestamp (the store returned no value,
/// or the stored value did not decode) yields [`DATE_UNAVAILABLE`] instead
/// of failing.
pub fn format_registration_date(instant: Option<DateTime<Utc>>) -> String {
    match instant {
        Some(t) => t.format("%d/%m/%Y %H:%M").to_string(),
        None => DATE_UNAVAILABLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn should_generate_code_from_name_and_description() {
        assert_eq!(generate_code("Marcos Silva", "VIP"), "marcossilvavip");
    }

    #[test]
    fn should_collapse_case_and_punctuation_differences() {
        // Inputs that only differ in case/punctuation derive the same code.
        assert_eq!(
            generate_code("Ana Silva", "VIP!"),
            generate_code("ANA-SILVA", "vip")
        );
        assert_eq!(generate_code("Ana Silva", "VIP!"), "anasilvavip");
    }

    #[test]
    fn should_be_deterministic() {
        let a = generate_code("João  Pereira", "lote 2 - 50%");
        let b = generate_code("João  Pereira", "lote 2 - 50%");
        assert_eq!(a, b);
    }

    #[test]
    fn should_emit_only_lowercase_ascii_alphanumerics() {
        let code = generate_code("Ána çilva 42!", "Lote #2, VIP?");
        assert!(!code.is_empty());
        assert!(
            code.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()),
            "unexpected character in {code:?}"
        );
    }

    #[test]
    fn should_strip_accented_characters_entirely() {
        // Accented letters are outside [a-z0-9] even after lower-casing.
        assert_eq!(generate_code("ção", ""), "co");
    }

    #[test]
    fn should_generate_empty_code_when_nothing_survives_cleaning() {
        assert_eq!(generate_code("!!!", "???"), "");
        assert_eq!(generate_code("", ""), "");
    }

    #[test]
    fn should_mask_full_eleven_digit_number() {
        assert_eq!(mask_phone("34999998888"), "(34) 99999-8888");
    }

    #[test]
    fn should_mask_partial_six_digit_number() {
        assert_eq!(mask_phone("349999"), "(34) 9999");
    }

    #[test]
    fn should_leave_two_or_fewer_digits_unformatted() {
        assert_eq!(mask_phone(""), "");
        assert_eq!(mask_phone("3"), "3");
        assert_eq!(mask_phone("34"), "34");
    }

    #[test]
    fn should_mask_eight_digit_number_with_short_tail() {
        assert_eq!(mask_phone("34999998"), "(34) 99999-8");
    }

    #[test]
    fn should_truncate_beyond_eleven_digits_before_formatting() {
        assert_eq!(mask_phone("349999988887777"), "(34) 99999-8888");
    }

    #[test]
    fn should_strip_non_digits_before_masking() {
        assert_eq!(mask_phone("(34) 99999-8888"), "(34) 99999-8888");
        assert_eq!(mask_phone("+55 34 9999-888"), "(55) 34999-9888");
    }

    #[test]
    fn should_put_code_only_in_utm_medium() {
        let link = sales_link("marcossilvavip");
        assert!(link.contains("utm_medium=marcossilvavip"));
        assert!(link.contains("utm_source=afiliado"));
        assert!(link.contains("utm_campaign=habity-fight"));
        // The code appears exactly once, as the utm_medium parameter.
        assert_eq!(link.matches("marcossilvavip").count(), 1);
    }

    #[test]
    fn should_format_registration_date_for_display() {
        let instant = Utc.with_ymd_and_hms(2025, 8, 7, 14, 5, 0).unwrap();
        assert_eq!(format_registration_date(Some(instant)), "07/08/2025 14:05");
    }

    #[test]
    fn should_fall_back_when_timestamp_is_missing() {
        assert_eq!(format_registration_date(None), DATE_UNAVAILABLE);
    }
}
