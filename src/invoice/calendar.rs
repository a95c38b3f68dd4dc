//! Calendar helpers for invoice dates.
//!
//! Month arithmetic, ordinal suffixes, and the two date renderings the form
//! deals with: ISO (`2026-02-01`) for state and long (`February 1, 2026`)
//! for the rendered invoice.

use chrono::{Datelike, Month, Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serializer};

const ISO_FORMAT: &str = "%Y-%m-%d";

/// Long English month name of a date (e.g. "February").
pub fn month_name(date: NaiveDate) -> &'static str {
    u8::try_from(date.month())
        .ok()
        .and_then(|month| Month::try_from(month).ok())
        .map(|month| month.name())
        .unwrap_or_default()
}

/// First day of the month after `date`, rolling the year over after December.
pub fn first_of_next_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .unwrap_or(date)
}

/// Number of days in the month containing `date`.
pub fn last_day_of_month(date: NaiveDate) -> u32 {
    first_of_next_month(date)
        .pred_opt()
        .map(|last| last.day())
        .unwrap_or(31)
}

/// English ordinal suffix for a day of the month.
pub fn day_suffix(day: u32) -> &'static str {
    if (11..=13).contains(&day) {
        return "th";
    }

    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// `2026-02-01`
pub fn format_iso(date: NaiveDate) -> String {
    date.format(ISO_FORMAT).to_string()
}

/// `February 1, 2026`
pub fn format_long(date: NaiveDate) -> String {
    format!("{} {}, {}", month_name(date), date.day(), date.year())
}

/// Serde helper for optional form dates where `""` and `null` both mean unset.
pub fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, ISO_FORMAT)
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid date '{}': {}", value, e))),
    }
}

/// Writes an optional date as ISO text, or `null` when unset.
pub fn serialize_optional_date<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match date {
        Some(date) => serializer.serialize_str(&format_iso(*date)),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_first_of_next_month() {
        assert_eq!(first_of_next_month(ymd(2026, 1, 15)), ymd(2026, 2, 1));
        assert_eq!(first_of_next_month(ymd(2026, 12, 20)), ymd(2027, 1, 1));
        assert_eq!(first_of_next_month(ymd(2026, 1, 31)), ymd(2026, 2, 1));
        assert_eq!(first_of_next_month(ymd(2028, 2, 29)), ymd(2028, 3, 1));
    }

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(ymd(2026, 1, 31)), "January");
        assert_eq!(month_name(ymd(2026, 9, 1)), "September");
        assert_eq!(month_name(ymd(2026, 12, 25)), "December");
    }

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(last_day_of_month(ymd(2026, 2, 1)), 28);
        assert_eq!(last_day_of_month(ymd(2028, 2, 1)), 29);
        assert_eq!(last_day_of_month(ymd(2100, 2, 10)), 28);
        assert_eq!(last_day_of_month(ymd(2000, 2, 10)), 29);
        assert_eq!(last_day_of_month(ymd(2026, 4, 30)), 30);
        assert_eq!(last_day_of_month(ymd(2026, 12, 31)), 31);
    }

    #[test]
    fn test_day_suffix() {
        let days = [1, 2, 3, 4, 11, 12, 13, 21, 22, 23, 31];
        let expected = ["st", "nd", "rd", "th", "th", "th", "th", "st", "nd", "rd", "st"];
        for (day, suffix) in days.iter().zip(expected) {
            assert_eq!(day_suffix(*day), suffix, "day {}", day);
        }
    }

    #[test]
    fn test_formats() {
        assert_eq!(format_iso(ymd(2026, 2, 1)), "2026-02-01");
        assert_eq!(format_long(ymd(2026, 2, 1)), "February 1, 2026");
        assert_eq!(format_long(ymd(2025, 12, 24)), "December 24, 2025");
    }
}
