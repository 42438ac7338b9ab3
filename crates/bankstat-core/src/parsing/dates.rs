use chrono::{Datelike, Days, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

pub const MIN_YEAR: i32 = 1990;
pub const MAX_YEAR: i32 = 2100;

/// Field order assumed for bare numeric dates like `03/04/2024`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateOrder {
    #[default]
    DayFirst,
    MonthFirst,
}

static WEEKDAY_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(mon|tue|wed|thu|fri|sat|sun)[a-z]*[,.]?\s+").unwrap());
static TIME_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[,\s]+\d{1,2}:\d{2}(:\d{2})?(\s*[ap]\.?m\.?)?$").unwrap()
});
static ORDINAL_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").unwrap());

static ISO_YMD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").unwrap());
static DAY_MON_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})[-\s/]([A-Za-z]{3,9})[-\s/,]+(\d{2,4})$").unwrap());
static MON_DAY_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]{3,9})\s+(\d{1,2})[,\s]+(\d{2,4})$").unwrap());
static SLASH_Y4: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").unwrap());
static SLASH_Y2: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{2})$").unwrap());
static DOT_YMD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})\.(\d{1,2})\.(\d{1,2})$").unwrap());
static DOT_DMY4: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})\.(\d{1,2})\.(\d{4})$").unwrap());
static DOT_DMY2: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})\.(\d{1,2})\.(\d{2})$").unwrap());
static COMPACT_YMD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})(\d{2})(\d{2})$").unwrap());

/// Bare numeric date shape used for batch field-order detection.
static BARE_NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})[/\-.](\d{1,2})[/\-.](\d{2,4})$").unwrap());

/// Patterns tried in order when hunting for a date embedded in free text.
static EMBEDDED_DATES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\d{4}-\d{1,2}-\d{1,2}",
        r"\d{1,2}[-/]\d{1,2}[-/]\d{2,4}",
        r"(?i)\d{1,2}[-\s][A-Za-z]{3,9}[-\s,]\s?\d{2,4}",
        r"(?i)[A-Za-z]{3,9}\s+\d{1,2},?\s+\d{2,4}",
        r"\d{4}\.\d{1,2}\.\d{1,2}",
        r"\d{1,2}\.\d{1,2}\.\d{2,4}",
        r"\b\d{8}\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

fn month_from_name(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    if lower.len() < 3 {
        return None;
    }
    MONTH_NAMES
        .iter()
        .position(|m| m.starts_with(&lower))
        .map(|i| i as u32 + 1)
}

fn expand_two_digit_year(y: i32) -> i32 {
    if y < 50 {
        2000 + y
    } else {
        1900 + y
    }
}

/// Build a date from candidate fields, enforcing the supported window.
///
/// `from_ymd_opt` doubles as the round-trip check: day-overflow candidates
/// such as Feb 30 come back as `None` and the caller moves on to the next
/// pattern.
fn build_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) || !(1..=12).contains(&month) || !(1..=31).contains(&day)
    {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn strip_noise(raw: &str) -> String {
    let s = raw.trim();
    let s = WEEKDAY_PREFIX.replace(s, "");
    let s = TIME_SUFFIX.replace(&s, "");
    let s = ORDINAL_SUFFIX.replace_all(&s, "$1");
    s.trim().to_string()
}

/// Parse a free-form date string assuming day-first numeric order.
pub fn parse(raw: &str) -> Option<NaiveDate> {
    parse_with_order(raw, DateOrder::default())
}

/// Parse a free-form date string. Never panics; unparseable input is `None`.
pub fn parse_with_order(raw: &str, order: DateOrder) -> Option<NaiveDate> {
    let s = strip_noise(raw);
    if s.is_empty() {
        return None;
    }

    if let Some(c) = ISO_YMD.captures(&s) {
        if let Some(d) = build_date(num(&c, 1), num(&c, 2) as u32, num(&c, 3) as u32) {
            return Some(d);
        }
    }
    if let Some(c) = DAY_MON_YEAR.captures(&s) {
        if let Some(month) = month_from_name(&c[2]) {
            let year = maybe_expand(num(&c, 3), &c[3]);
            if let Some(d) = build_date(year, month, num(&c, 1) as u32) {
                return Some(d);
            }
        }
    }
    if let Some(c) = MON_DAY_YEAR.captures(&s) {
        if let Some(month) = month_from_name(&c[1]) {
            let year = maybe_expand(num(&c, 3), &c[3]);
            if let Some(d) = build_date(year, month, num(&c, 2) as u32) {
                return Some(d);
            }
        }
    }
    if let Some(c) = SLASH_Y4.captures(&s) {
        let (day, month) = ordered_fields(num(&c, 1) as u32, num(&c, 2) as u32, order);
        if let Some(d) = build_date(num(&c, 3), month, day) {
            return Some(d);
        }
    }
    if let Some(c) = SLASH_Y2.captures(&s) {
        let (day, month) = ordered_fields(num(&c, 1) as u32, num(&c, 2) as u32, order);
        if let Some(d) = build_date(expand_two_digit_year(num(&c, 3)), month, day) {
            return Some(d);
        }
    }
    if let Some(c) = DOT_YMD.captures(&s) {
        if let Some(d) = build_date(num(&c, 1), num(&c, 2) as u32, num(&c, 3) as u32) {
            return Some(d);
        }
    }
    if let Some(c) = DOT_DMY4.captures(&s) {
        if let Some(d) = build_date(num(&c, 3), num(&c, 2) as u32, num(&c, 1) as u32) {
            return Some(d);
        }
    }
    if let Some(c) = DOT_DMY2.captures(&s) {
        if let Some(d) = build_date(
            expand_two_digit_year(num(&c, 3)),
            num(&c, 2) as u32,
            num(&c, 1) as u32,
        ) {
            return Some(d);
        }
    }
    if let Some(c) = COMPACT_YMD.captures(&s) {
        if let Some(d) = build_date(num(&c, 1), num(&c, 2) as u32, num(&c, 3) as u32) {
            return Some(d);
        }
    }

    generic_parse(&s)
}

/// Last-resort attempt with a few looser chrono formats.
fn generic_parse(s: &str) -> Option<NaiveDate> {
    const FORMATS: [&str; 5] = ["%d %B %Y", "%B %d %Y", "%d %b %Y", "%b %d %Y", "%Y/%m/%d"];
    for fmt in FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            if (MIN_YEAR..=MAX_YEAR).contains(&d.year()) {
                return Some(d);
            }
        }
    }
    None
}

fn num(c: &regex::Captures<'_>, i: usize) -> i32 {
    c[i].parse().unwrap_or(0)
}

fn maybe_expand(y: i32, raw: &str) -> i32 {
    if raw.len() <= 2 {
        expand_two_digit_year(y)
    } else {
        y
    }
}

fn ordered_fields(first: u32, second: u32, order: DateOrder) -> (u32, u32) {
    match order {
        DateOrder::DayFirst => (first, second),
        DateOrder::MonthFirst => (second, first),
    }
}

/// Look for a date embedded anywhere in `text`: the whole string is tried
/// first, then each embedded pattern in a fixed order.
pub fn extract_date_from_text(text: &str, order: DateOrder) -> Option<NaiveDate> {
    if let Some(d) = parse_with_order(text, order) {
        return Some(d);
    }
    for re in EMBEDDED_DATES.iter() {
        if let Some(m) = re.find(text) {
            if let Some(d) = parse_with_order(m.as_str(), order) {
                return Some(d);
            }
        }
    }
    None
}

/// True when the string is shaped like a bare numeric date (`3/4/24` etc).
pub fn looks_like_numeric_date(s: &str) -> bool {
    BARE_NUMERIC.is_match(s.trim())
}

/// Decide day-first vs month-first from a batch of samples.
///
/// A first field above 12 can only be a day (+5 day-first); a second field
/// above 12 can only be a day in month-first order (+5 month-first). Ties
/// and empty input default to day-first.
pub fn detect_date_order<S: AsRef<str>>(samples: &[S]) -> DateOrder {
    let mut day_first = 0u32;
    let mut month_first = 0u32;
    for sample in samples {
        if let Some(c) = BARE_NUMERIC.captures(sample.as_ref().trim()) {
            let first: u32 = c[1].parse().unwrap_or(0);
            let second: u32 = c[2].parse().unwrap_or(0);
            if first > 12 {
                day_first += 5;
            }
            if second > 12 {
                month_first += 5;
            }
        }
    }
    if month_first > day_first {
        DateOrder::MonthFirst
    } else {
        DateOrder::DayFirst
    }
}

/// Convert a spreadsheet serial number to a date.
///
/// Day 0 is 1899-12-30, which reproduces the historical 1900 leap-year
/// quirk so serials from real workbooks land on the printed date.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !(serial > 0.0 && serial <= 100_000.0) {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let date = base.checked_add_days(Days::new(serial.trunc() as u64))?;
    if (MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
        Some(date)
    } else {
        None
    }
}

/// Blank out every embedded date substring, for description scrubbing.
pub fn strip_dates(text: &str) -> String {
    let mut s = text.to_string();
    for re in EMBEDDED_DATES.iter() {
        s = re.replace_all(&s, " ").into_owned();
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_iso() {
        assert_eq!(parse("2024-01-05"), Some(d(2024, 1, 5)));
    }

    #[test]
    fn test_day_month_name() {
        assert_eq!(parse("01-Jan-2024"), Some(d(2024, 1, 1)));
        assert_eq!(parse("5 March 2021"), Some(d(2021, 3, 5)));
        assert_eq!(parse("01-Jan-24"), Some(d(2024, 1, 1)));
    }

    #[test]
    fn test_month_name_day() {
        assert_eq!(parse("Jan 5, 2024"), Some(d(2024, 1, 5)));
        assert_eq!(parse("January 5 2024"), Some(d(2024, 1, 5)));
    }

    #[test]
    fn test_numeric_orders() {
        assert_eq!(parse("25/01/2024"), Some(d(2024, 1, 25)));
        assert_eq!(
            parse_with_order("01/25/2024", DateOrder::MonthFirst),
            Some(d(2024, 1, 25))
        );
        assert_eq!(parse("25/01/24"), Some(d(2024, 1, 25)));
    }

    #[test]
    fn test_dotted_and_compact() {
        assert_eq!(parse("2024.01.25"), Some(d(2024, 1, 25)));
        assert_eq!(parse("25.01.2024"), Some(d(2024, 1, 25)));
        assert_eq!(parse("25.01.24"), Some(d(2024, 1, 25)));
        assert_eq!(parse("20240125"), Some(d(2024, 1, 25)));
    }

    #[test]
    fn test_noise_stripping() {
        assert_eq!(parse("Mon, 1st Jan 2024"), Some(d(2024, 1, 1)));
        assert_eq!(parse("Monday 01/02/2024"), Some(d(2024, 2, 1)));
        assert_eq!(parse("01/02/2024 10:33"), Some(d(2024, 2, 1)));
        assert_eq!(parse("Jan 5, 2024 9:05 AM"), Some(d(2024, 1, 5)));
    }

    #[test]
    fn test_two_digit_pivot() {
        assert_eq!(parse("01/01/49"), Some(d(2049, 1, 1)));
        assert_eq!(parse("01/01/95"), Some(d(1995, 1, 1)));
    }

    #[test]
    fn test_feb_30_rejected() {
        assert_eq!(parse("30/02/2024"), None);
        assert_eq!(parse("2024-02-30"), None);
    }

    #[test]
    fn test_year_window() {
        assert_eq!(parse("1989-06-01"), None);
        assert_eq!(parse("2101-06-01"), None);
    }

    #[test]
    fn test_total_on_garbage() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("not a date"), None);
        assert_eq!(parse("12345"), None);
        assert_eq!(parse("--"), None);
    }

    #[test]
    fn test_extract_from_text() {
        assert_eq!(
            extract_date_from_text("UPI payment on 25/01/2024 ref 9981", DateOrder::DayFirst),
            Some(d(2024, 1, 25))
        );
        assert_eq!(
            extract_date_from_text("Value date: 2024-03-02", DateOrder::DayFirst),
            Some(d(2024, 3, 2))
        );
        assert_eq!(
            extract_date_from_text("no dates here", DateOrder::DayFirst),
            None
        );
    }

    #[test]
    fn test_detect_order() {
        assert_eq!(
            detect_date_order(&["25/01/2024", "13/02/2024"]),
            DateOrder::DayFirst
        );
        assert_eq!(
            detect_date_order(&["01/25/2024", "02/13/2024"]),
            DateOrder::MonthFirst
        );
        // Ambiguous and empty batches default to day-first.
        assert_eq!(
            detect_date_order(&["01/02/2024", "03/04/2024"]),
            DateOrder::DayFirst
        );
        assert_eq!(detect_date_order::<&str>(&[]), DateOrder::DayFirst);
    }

    #[test]
    fn test_excel_serial() {
        // 45292 = 2024-01-01
        assert_eq!(excel_serial_to_date(45292.0), Some(d(2024, 1, 1)));
        assert_eq!(excel_serial_to_date(45292.75), Some(d(2024, 1, 1)));
        assert_eq!(excel_serial_to_date(0.0), None);
        assert_eq!(excel_serial_to_date(-3.0), None);
        assert_eq!(excel_serial_to_date(100_001.0), None);
        // Serial inside range but before the supported year window.
        assert_eq!(excel_serial_to_date(100.0), None);
    }

    #[test]
    fn test_strip_dates() {
        let scrubbed = strip_dates("Salary 25/01/2024 credited");
        assert!(!scrubbed.contains("25/01/2024"));
        assert!(scrubbed.contains("Salary"));
    }
}
