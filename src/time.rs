//! Time-of-day parsing for spreadsheet values.
//!
//! Everything is expressed in whole minutes since midnight.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

/// Minutes in one day.
pub const MINUTES_PER_DAY: u32 = 1440;

static CLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2}):(\d{2})(?::\d{2})?$").expect("valid clock regex"));

/// A raw time cell: spreadsheet number or text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeValue<'a> {
    Number(f64),
    Text(&'a str),
}

impl From<f64> for TimeValue<'_> {
    fn from(value: f64) -> Self {
        TimeValue::Number(value)
    }
}

impl<'a> From<&'a str> for TimeValue<'a> {
    fn from(value: &'a str) -> Self {
        TimeValue::Text(value)
    }
}

/// Parse a time value into minutes since midnight.
///
/// Numbers in `[0, 1)` are fractions of a day, larger numbers are already
/// minutes. Text is either `H:MM[:SS]` (seconds ignored) or a bare number.
pub fn parse_to_minutes<'a>(value: impl Into<TimeValue<'a>>) -> Option<u32> {
    match value.into() {
        TimeValue::Number(n) => number_to_minutes(n),
        TimeValue::Text(text) => {
            let text = text.trim();
            if let Some(caps) = CLOCK_RE.captures(text) {
                let hours: u32 = caps[1].parse().ok()?;
                let minutes: u32 = caps[2].parse().ok()?;
                return Some(hours * 60 + minutes);
            }
            text.parse::<f64>().ok().and_then(number_to_minutes)
        }
    }
}

fn number_to_minutes(n: f64) -> Option<u32> {
    if !n.is_finite() || n < 0.0 {
        return None;
    }
    let minutes = if n < 1.0 { n * f64::from(MINUTES_PER_DAY) } else { n };
    Some(minutes.round() as u32)
}

/// Length of an interval, wrapping past midnight when `end < start`.
pub fn duration(start: u32, end: u32) -> u32 {
    if end >= start {
        end - start
    } else {
        MINUTES_PER_DAY.saturating_sub(start) + end
    }
}

/// Whether `[s1, e1)` and `[s2, e2)` overlap. Missing bounds never overlap.
pub fn intervals_overlap(s1: Option<u32>, e1: Option<u32>, s2: Option<u32>, e2: Option<u32>) -> bool {
    match (s1, e1, s2, e2) {
        (Some(s1), Some(e1), Some(s2), Some(e2)) => s1 < e2 && e1 > s2,
        _ => false,
    }
}

/// Format minutes as `HH:MM` (wrapped into one day).
pub fn format_minutes(minutes: u32) -> String {
    let minutes = minutes % MINUTES_PER_DAY;
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Parse a `DD.MM.YYYY` schedule date.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%d.%m.%Y").ok()
}

/// Sort key for `DD.MM.YYYY` strings; unparseable dates sort last.
pub fn date_sort_key(text: &str) -> (bool, Option<NaiveDate>, String) {
    let parsed = parse_date(text);
    (parsed.is_none(), parsed, text.to_string())
}
