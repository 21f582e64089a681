// src/utils/date.rs

//! Date helpers shared by both sources.
//!
//! Both sources ultimately present publication dates in the Norwegian display
//! format `dd.mm.yyyy`. The display string is kept on the record as-is; only
//! the filter pipeline decides whether it names a real calendar date.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

/// Display format used on notice records.
pub const DISPLAY_FORMAT: &str = "%d.%m.%Y";

fn display_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{2})\.(\d{2})\.(\d{4})").expect("display date pattern"))
}

/// Parse a `dd.mm.yyyy` date out of free text into a calendar date.
///
/// The regex accepts shapes like `31.02.2024`; `NaiveDate` construction
/// rejects them, so calendar-invalid values come back as `None` rather than
/// as a bogus date or a panic.
pub fn parse_display_date(text: &str) -> Option<NaiveDate> {
    let caps = display_date_re().captures(text)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Extract the first `dd.mm.yyyy`-shaped substring from free text.
///
/// No calendar validation happens here: the raw source value stays on the
/// record even when it is nonsense, and the filter excludes it later.
pub fn extract_display_date(text: &str) -> Option<String> {
    display_date_re()
        .find(text)
        .map(|m| m.as_str().to_string())
}

/// Format a calendar date in the display format.
pub fn to_display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

/// Re-format an ISO `yyyy-mm-dd` (optionally with a time suffix) into the
/// display format. Returns `None` when the input is not ISO-shaped, in which
/// case callers keep the raw value.
pub fn reformat_iso_date(text: &str) -> Option<String> {
    let date_part = text.split('T').next()?.trim();
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .ok()
        .map(to_display_date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_display_date_valid() {
        assert_eq!(
            parse_display_date("15.01.2024"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
    }

    #[test]
    fn test_parse_display_date_embedded_in_text() {
        assert_eq!(
            parse_display_date("Publisert 03.06.2024 kl. 12:00"),
            NaiveDate::from_ymd_opt(2024, 6, 3)
        );
    }

    #[test]
    fn test_parse_display_date_calendar_invalid() {
        // Regex-valid but no such day in February.
        assert_eq!(parse_display_date("31.02.2024"), None);
    }

    #[test]
    fn test_parse_display_date_garbage() {
        assert_eq!(parse_display_date("yesterday"), None);
        assert_eq!(parse_display_date(""), None);
    }

    #[test]
    fn test_extract_keeps_invalid_values() {
        assert_eq!(
            extract_display_date("Frist: 31.02.2024"),
            Some("31.02.2024".to_string())
        );
    }

    #[test]
    fn test_reformat_iso_date() {
        assert_eq!(
            reformat_iso_date("2024-01-15"),
            Some("15.01.2024".to_string())
        );
        assert_eq!(
            reformat_iso_date("2024-01-15T09:30:00Z"),
            Some("15.01.2024".to_string())
        );
        assert_eq!(reformat_iso_date("15.01.2024"), None);
    }

    #[test]
    fn test_display_round_trip() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(parse_display_date(&to_display_date(date)), Some(date));
    }
}
