//! Dated place lines and receipt timestamps.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use log::warn;

const MONTHS_PT: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

/// Date format typed into the forms: `DD/MM/YYYY`.
pub const BR_DATE_FORMAT: &str = "%d/%m/%Y";

/// `D/M/YYYY` shape check: one or two digit day and month, four digit year.
fn has_br_date_shape(date: &str) -> bool {
    fn digits(part: &str, len: std::ops::RangeInclusive<usize>) -> bool {
        len.contains(&part.len()) && part.bytes().all(|b| b.is_ascii_digit())
    }

    let mut parts = date.split('/');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(day), Some(month), Some(year), None) => {
            digits(day, 1..=2) && digits(month, 1..=2) && digits(year, 4..=4)
        }
        _ => false,
    }
}

/// Renders the dated place line of a document:
/// `"Manaus - AM, 15 de março de 2024."`.
///
/// A date that does not parse as `DD/MM/YYYY` degrades to `"Manaus - AM"`.
pub fn spell_date(date: &str, locality: &str, region_code: &str) -> String {
    let parsed = if has_br_date_shape(date) {
        NaiveDate::parse_from_str(date, BR_DATE_FORMAT).ok()
    } else {
        None
    };
    match parsed {
        Some(parsed) => spell_naive_date(parsed, locality, region_code),
        None => {
            warn!(
                "Could not parse date '{}', writing place without date",
                date
            );
            format!("{} - {}", locality, region_code)
        }
    }
}

pub fn spell_naive_date(date: NaiveDate, locality: &str, region_code: &str) -> String {
    // month() is always 1..=12
    let month = MONTHS_PT[date.month0() as usize];
    format!(
        "{} - {}, {:02} de {} de {}.",
        locality,
        region_code,
        date.day(),
        month,
        date.year()
    )
}

/// `(DD/MM/YYYY, HH:MM)` for stamping a receipt.
pub fn format_br_timestamp(at: NaiveDateTime) -> (String, String) {
    (
        at.format(BR_DATE_FORMAT).to_string(),
        at.format("%H:%M").to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spell_date() {
        assert_eq!(
            spell_date("15/03/2024", "Manaus", "AM"),
            "Manaus - AM, 15 de março de 2024."
        );
        assert_eq!(
            spell_date("01/12/2023", "Parintins", "AM"),
            "Parintins - AM, 01 de dezembro de 2023."
        );
    }

    #[test]
    fn test_malformed_date_falls_back_to_place() {
        assert_eq!(spell_date("2024-03-15", "Manaus", "AM"), "Manaus - AM");
        assert_eq!(spell_date("", "Manaus", "AM"), "Manaus - AM");
        assert_eq!(spell_date("31/02/2024", "Manaus", "AM"), "Manaus - AM");
        assert_eq!(spell_date("15/03/24", "Manaus", "AM"), "Manaus - AM");
        assert_eq!(spell_date("15/03/+2024", "Manaus", "AM"), "Manaus - AM");
        assert_eq!(spell_date("15/03/02024", "Manaus", "AM"), "Manaus - AM");
        assert_eq!(spell_date(" 15/03/2024", "Manaus", "AM"), "Manaus - AM");
    }

    #[test]
    fn test_single_digit_day_and_month() {
        assert_eq!(
            spell_date("5/3/2024", "Manaus", "AM"),
            "Manaus - AM, 05 de março de 2024."
        );
    }

    #[test]
    fn test_format_br_timestamp() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(9, 7, 0)
            .unwrap();
        assert_eq!(
            format_br_timestamp(at),
            ("05/03/2024".to_string(), "09:07".to_string())
        );
    }
}
