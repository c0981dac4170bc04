//! Date helper functions

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;

/// Fallback when a configured format cannot be rendered
const ISO_FORMAT: &str = "%Y-%m-%d";

/// Format a date using a Moment.js-compatible format string
///
/// # Examples
/// ```ignore
/// format_date(date, "YYYY-MM-DD") // -> "2024-01-15"
/// format_date(date, "MMMM D, YYYY") // -> "January 15, 2024"
/// ```
pub fn format_date(date: NaiveDate, format: &str) -> String {
    let chrono_format = moment_to_chrono_format(format);
    if StrftimeItems::new(&chrono_format).any(|item| matches!(item, Item::Error)) {
        tracing::warn!("Invalid date format {:?}, using ISO dates", format);
        return date_iso(date);
    }
    date.format(&chrono_format).to_string()
}

/// Format a date in ISO 8601 form, for `<time datetime>` attributes
pub fn date_iso(date: NaiveDate) -> String {
    date.format(ISO_FORMAT).to_string()
}

/// Convert Moment.js format to chrono format
fn moment_to_chrono_format(format: &str) -> String {
    // Longest tokens first within each unit so shorter ones don't eat them.
    // Weekday names go before `D`, whose output contains a lowercase `d`.
    let replacements = [
        ("YYYY", "%Y"),
        ("YY", "%y"),
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        ("dddd", "%A"),
        ("ddd", "%a"),
        ("DDDD", "%j"),
        ("DD", "%d"),
        ("D", "%-d"),
    ];

    // Literal percent signs
    let mut result = format.replace('%', "%%");

    for (from, to) in replacements {
        result = result.replace(from, to);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(date(), "YYYY-MM-DD"), "2024-01-05");
        assert_eq!(format_date(date(), "YYYY/MM/DD"), "2024/01/05");
        assert_eq!(format_date(date(), "MMMM D, YYYY"), "January 5, 2024");
        assert_eq!(format_date(date(), "ddd, MMM DD YY"), "Fri, Jan 05 24");
    }

    #[test]
    fn test_format_date_literal_percent() {
        assert_eq!(format_date(date(), "YYYY 100%"), "2024 100%");
        assert_eq!(format_date(date(), "%Y"), "%Y");
    }

    #[test]
    fn test_format_date_adjacent_tokens() {
        assert_eq!(format_date(date(), "Ddddd"), "5Friday");
    }

    #[test]
    fn test_date_iso() {
        assert_eq!(date_iso(date()), "2024-01-05");
    }

    #[test]
    fn test_moment_to_chrono() {
        assert_eq!(moment_to_chrono_format("YYYY-MM-DD"), "%Y-%m-%d");
        assert_eq!(moment_to_chrono_format("MMMM D"), "%B %-d");
    }
}
