//! Canonical forms for free-form event and booking input.
//!
//! Everything here is pure: the same input always yields the same output and
//! nothing touches the store.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};

static NON_ALNUM_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("slug separator pattern"));
static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern"));
static MERIDIEM_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})(?::(\d{2}))?\s*([ap]m)$").expect("meridiem time pattern")
});
static COLON_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("colon time pattern"));
static HOUR_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})$").expect("bare hour pattern"));
static YEAR_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})(?:-(\d{2}))?$").expect("reduced ISO date pattern"));
static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

// Naive shapes are read as UTC.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%A, %B %d, %Y",
    "%a, %b %d, %Y",
    "%A %B %d %Y",
    "%a %b %d %Y",
];
// ISO date-times carrying an offset, basic (`+0530`) or extended (`+05:30`)
const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%b %d %Y %H:%M",
    "%b %d %Y %H:%M:%S",
    "%B %d, %Y %H:%M",
    "%m/%d/%Y %H:%M",
];

/// URL-safe identifier for a title: lowercase, quotes dropped, every other
/// non-alphanumeric run folded into a single hyphen.
pub fn slugify(title: &str) -> String {
    let lowered = title.trim().to_lowercase().replace(['\'', '"'], "");
    NON_ALNUM_RUN
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Parses a date-like string and renders it as `YYYY-MM-DD` in UTC.
pub fn normalize_date(input: &str) -> Result<String> {
    let s = input.trim();
    parse_date_utc(s)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .ok_or_else(|| Error::invalid_format(format!("unrecognised date '{}'", input)))
}

fn parse_date_utc(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Some(dt) = OFFSET_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    // Reduced ISO forms: `YYYY` is January 1st, `YYYY-MM` the first of the month
    if let Some(caps) = YEAR_MONTH.captures(s) {
        let year = caps[1].parse().ok()?;
        let month = match caps.get(2) {
            Some(m) => m.as_str().parse().ok()?,
            None => 1,
        };
        return NaiveDate::from_ymd_opt(year, month, 1);
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt.and_utc().date_naive());
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Renders a time as zero-padded 24-hour `HH:MM`.
///
/// Accepted shapes, tried in this order: `9pm` / `9:30 PM`, `21:30`, `9`.
pub fn normalize_time(input: &str) -> Result<String> {
    let lowered = input.trim().to_lowercase();
    let s = WHITESPACE_RUN.replace_all(&lowered, " ");
    let invalid = || Error::invalid_format(format!("unrecognised time '{}'", input));

    let (hour, minute) = if let Some(caps) = MERIDIEM_TIME.captures(&s) {
        let hour = parse_component(&caps[1]).ok_or_else(invalid)?;
        let minute = match caps.get(2) {
            Some(m) => parse_component(m.as_str()).ok_or_else(invalid)?,
            None => 0,
        };
        let is_pm = caps[3].starts_with('p');
        let hour = match (hour, is_pm) {
            (12, true) => 12,
            (12, false) => 0,
            (h, true) => h + 12,
            (h, false) => h,
        };
        (hour, minute)
    } else if let Some(caps) = COLON_TIME.captures(&s) {
        (
            parse_component(&caps[1]).ok_or_else(invalid)?,
            parse_component(&caps[2]).ok_or_else(invalid)?,
        )
    } else if let Some(caps) = HOUR_ONLY.captures(&s) {
        (parse_component(&caps[1]).ok_or_else(invalid)?, 0)
    } else {
        return Err(invalid());
    };

    if hour > 23 || minute > 59 {
        return Err(invalid());
    }
    Ok(format!("{:02}:{:02}", hour, minute))
}

fn parse_component(digits: &str) -> Option<u32> {
    digits.parse().ok()
}

/// Trims and lowercases an address, then checks it looks like `local@domain.tld`.
pub fn normalize_email(input: &str) -> Result<String> {
    let email = input.trim().to_lowercase();
    if EMAIL.is_match(&email) {
        Ok(email)
    } else {
        Err(Error::validation("email", "Invalid email format"))
    }
}

/// True when the value still has content once surrounding whitespace is gone.
pub fn is_non_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

/// True for a non-empty list whose every entry is non-blank.
pub fn is_non_blank_list(values: &[String]) -> bool {
    !values.is_empty() && values.iter().all(|v| is_non_blank(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn slug_from_conference_title() {
        assert_eq!(slugify("React Conf 2024!"), "react-conf-2024");
        assert_eq!(slugify("  Next.js Summit  "), "next-js-summit");
        assert_eq!(slugify("Don't \"Panic\" -- Rust Meetup"), "dont-panic-rust-meetup");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn date_shapes_map_to_iso() {
        assert_eq!(normalize_date("2024-03-15").unwrap(), "2024-03-15");
        assert_eq!(normalize_date("March 15, 2024").unwrap(), "2024-03-15");
        assert_eq!(normalize_date("Apr 22, 2024").unwrap(), "2024-04-22");
        assert_eq!(normalize_date("05/08/2024").unwrap(), "2024-05-08");
        assert_eq!(normalize_date("2024-06-14T10:00:00Z").unwrap(), "2024-06-14");
        assert_eq!(normalize_date("2024-06-14T23:30:00-05:00").unwrap(), "2024-06-15");
        assert_eq!(normalize_date("Fri, 14 Jun 2024 09:00:00 +0000").unwrap(), "2024-06-14");
        assert_eq!(normalize_date("2024").unwrap(), "2024-01-01");
        assert_eq!(normalize_date("2024-03").unwrap(), "2024-03-01");
        assert_eq!(normalize_date("2024-03-15T10:00:00.000+0530").unwrap(), "2024-03-15");
        assert_eq!(normalize_date("2024-03-15T02:00:00+05:30").unwrap(), "2024-03-14");
        assert_eq!(normalize_date("Friday, March 15, 2024").unwrap(), "2024-03-15");
        assert_eq!(normalize_date("Mar 15 2024 10:00").unwrap(), "2024-03-15");
    }

    #[test]
    fn unparseable_date_is_invalid_format() {
        assert!(matches!(normalize_date("someday"), Err(Error::InvalidFormat(_))));
        assert!(matches!(normalize_date(""), Err(Error::InvalidFormat(_))));
        assert!(matches!(normalize_date("2024-02-30"), Err(Error::InvalidFormat(_))));
        assert!(matches!(normalize_date("2024-13"), Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn time_shapes_map_to_24h() {
        assert_eq!(normalize_time("9pm").unwrap(), "21:00");
        assert_eq!(normalize_time("9:30 PM").unwrap(), "21:30");
        assert_eq!(normalize_time("21:30").unwrap(), "21:30");
        assert_eq!(normalize_time("9").unwrap(), "09:00");
        assert_eq!(normalize_time("12am").unwrap(), "00:00");
        assert_eq!(normalize_time("12 pm").unwrap(), "12:00");
        assert_eq!(normalize_time("  7:05   am ").unwrap(), "07:05");
    }

    #[test]
    fn out_of_range_time_is_invalid_format() {
        for input in ["25:00", "13pm", "10:60", "24", "noon", "9:5", ""] {
            assert!(
                matches!(normalize_time(input), Err(Error::InvalidFormat(_))),
                "expected {:?} to be rejected",
                input
            );
        }
    }

    #[test]
    fn email_is_trimmed_and_lowercased() {
        assert_eq!(normalize_email(" Foo@Bar.COM ").unwrap(), "foo@bar.com");
        let err = normalize_email("not-an-email").unwrap_err();
        assert_eq!(err.field(), Some("email"));
        assert!(normalize_email("a b@c.io").is_err());
        assert!(normalize_email("a@b").is_err());
    }

    #[test]
    fn non_blank_lists() {
        assert!(is_non_blank_list(&["Keynote".to_string()]));
        assert!(!is_non_blank_list(&[]));
        assert!(!is_non_blank_list(&["Keynote".to_string(), "  ".to_string()]));
    }

    proptest! {
        #[test]
        fn slug_is_url_safe_and_idempotent(title in "\\PC{0,64}") {
            let slug = slugify(&title);
            prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            prop_assert!(!slug.starts_with('-') && !slug.ends_with('-'));
            prop_assert!(!slug.contains("--"));
            prop_assert_eq!(slugify(&slug), slug);
        }

        #[test]
        fn canonical_date_is_fixed_point(y in 1970i32..2100, m in 1u32..=12, d in 1u32..=28) {
            let canonical = format!("{:04}-{:02}-{:02}", y, m, d);
            prop_assert_eq!(normalize_date(&canonical).unwrap(), canonical);
        }

        #[test]
        fn canonical_time_is_fixed_point(h in 0u32..24, m in 0u32..60) {
            let canonical = format!("{:02}:{:02}", h, m);
            prop_assert_eq!(normalize_time(&canonical).unwrap(), canonical);
        }
    }
}
