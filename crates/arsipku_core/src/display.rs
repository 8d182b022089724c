//! crates/arsipku_core/src/display.rs
//!
//! Presentation helpers: publish dates in Indonesian, version labels and
//! splitting content around a highlighted annotation span.

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, Timelike, Utc};

/// Asia/Jakarta has no daylight saving; it is always UTC+7.
const JAKARTA_OFFSET_HOURS: i64 = 7;

const MONTHS: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

fn jakarta(instant: DateTime<Utc>) -> NaiveDateTime {
    instant.naive_utc() + Duration::hours(JAKARTA_OFFSET_HOURS)
}

/// `16 Oktober 2026 pukul 09.34.00`, in Jakarta time.
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    let local = jakarta(instant);
    format!(
        "{} {} {} pukul {:02}.{:02}.{:02}",
        local.day(),
        MONTHS[local.month0() as usize],
        local.year(),
        local.hour(),
        local.minute(),
        local.second()
    )
}

/// Whole calendar days (in Jakarta) between `instant` and `now`, never negative.
pub fn days_ago(instant: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let days = (jakarta(now).date() - jakarta(instant).date()).num_days();
    days.max(0)
}

/// `Hari ini, …` for today, otherwise `N hari yang lalu, …`.
pub fn format_published(instant: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let stamp = format_timestamp(instant);
    match days_ago(instant, now) {
        0 => format!("Hari ini, {stamp}"),
        days => format!("{days} hari yang lalu, {stamp}"),
    }
}

pub fn version_label(version: i32, subversion: i32) -> String {
    format!("Version {version}.{subversion}")
}

/// Content split around a highlighted span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight<'a> {
    pub before: &'a str,
    pub highlighted: &'a str,
    pub after: &'a str,
}

impl<'a> Highlight<'a> {
    pub fn segments(&self) -> [&'a str; 3] {
        [self.before, self.highlighted, self.after]
    }
}

/// Splits `text` at character offsets `start..end`. Returns `None` when the
/// offsets do not describe a span of `text`; the caller then shows it plain.
pub fn highlight(text: &str, start: usize, end: usize) -> Option<Highlight<'_>> {
    if start > end {
        return None;
    }
    let start_byte = char_to_byte(text, start)?;
    let end_byte = char_to_byte(text, end)?;
    Some(Highlight {
        before: &text[..start_byte],
        highlighted: &text[start_byte..end_byte],
        after: &text[end_byte..],
    })
}

fn char_to_byte(text: &str, chars: usize) -> Option<usize> {
    text.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .nth(chars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn timestamp_is_rendered_in_jakarta_time() {
        assert_eq!(
            format_timestamp(utc(2026, 10, 16, 2, 34)),
            "16 Oktober 2026 pukul 09.34.00"
        );
        // 20:00 UTC is already the next day in Jakarta.
        assert_eq!(
            format_timestamp(utc(2026, 12, 31, 20, 0)),
            "1 Januari 2027 pukul 03.00.00"
        );
    }

    #[test]
    fn same_jakarta_day_is_today() {
        let now = utc(2026, 10, 16, 10, 0);
        assert!(format_published(utc(2026, 10, 16, 1, 0), now).starts_with("Hari ini, "));
    }

    #[test]
    fn earlier_days_count_calendar_days() {
        let now = utc(2026, 10, 16, 1, 0); // 08:00 in Jakarta
        let created = utc(2026, 10, 14, 16, 59); // 23:59 on the 14th in Jakarta
        assert_eq!(days_ago(created, now), 2);
        assert!(format_published(created, now).starts_with("2 hari yang lalu, "));
    }

    #[test]
    fn future_timestamps_count_as_today() {
        let now = utc(2026, 10, 16, 1, 0);
        assert_eq!(days_ago(utc(2026, 10, 20, 1, 0), now), 0);
    }

    #[test]
    fn version_label_formats_both_numbers() {
        assert_eq!(version_label(2, 0), "Version 2.0");
    }

    #[test]
    fn highlight_splits_on_characters() {
        let text = "Kopi ☕ enak";
        let h = highlight(text, 5, 6).expect("valid span");
        assert_eq!(h.segments(), ["Kopi ", "☕", " enak"]);
        assert_eq!(h.segments().concat(), text);
    }

    #[test]
    fn invalid_spans_are_rejected() {
        assert!(highlight("abc", 2, 1).is_none());
        assert!(highlight("abc", 0, 4).is_none());
        assert_eq!(
            highlight("abc", 3, 3),
            Some(Highlight { before: "abc", highlighted: "", after: "" })
        );
    }
}
