use chrono::{DateTime, NaiveDate, NaiveDateTime, Weekday};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m-%d-%Y %H:%M:%S",
    "%m-%d-%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %B %Y",
];

/// Tolerant date-time parsing for export cells.
///
/// Accepts RFC 3339 plus the common spreadsheet layouts; date-only values land on
/// midnight. Month-first is tried before day-first, so day-first only
/// matches when the first field cannot be a month. Bare numbers are not dates.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() || value.parse::<f64>().is_ok() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}

/// Parses a numeric cell. Returns `None` for anything that is not a finite number.
pub fn coerce_number(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// `total / num_days`, or 0 when there are no days.
pub fn per_day(total: f64, num_days: usize) -> f64 {
    if num_days == 0 {
        0.0
    } else {
        total / num_days as f64
    }
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Monday through Sunday.
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Rounds to a whole number and groups thousands with commas: `12345.6` -> `12,346`.
pub fn format_grouped_integer(value: f64) -> String {
    let digits = format!("{:.0}", value.abs());
    let negative = value < 0.0 && digits != "0";

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

pub fn format_currency(value: f64, symbol: &str) -> String {
    let grouped = format_grouped_integer(value);
    match grouped.strip_prefix('-') {
        Some(rest) => format!("-{}{}", symbol, rest),
        None => format!("{}{}", symbol, grouped),
    }
}

/// A ratio rendered as a percentage with one decimal: `0.1234` -> `12.3%`.
pub fn format_percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

pub fn format_signed_percent(ratio: f64) -> String {
    format!("{:+.1}%", ratio * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_datetime_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();

        for raw in [
            "2024-03-07 14:05:00",
            "2024-03-07T14:05:00",
            "2024-03-07T14:05:00+05:30",
            "2024-03-07",
            " 03/07/2024 ",
            "03-07-2024 09:15",
            "03/07/2024 6:30 PM",
            "07-Mar-2024",
            "Mar 07, 2024",
        ] {
            let parsed = parse_datetime(raw).unwrap_or_else(|| panic!("failed on {}", raw));
            assert_eq!(parsed.date(), expected, "input {}", raw);
        }

        assert_eq!(parse_datetime("2024-03-07 14:05:00").unwrap().hour(), 14);
    }

    #[test]
    fn test_ambiguous_dates_read_month_first() {
        let march_7 = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(parse_datetime("03/07/2024").unwrap().date(), march_7);
        assert_eq!(parse_datetime("03-07-2024").unwrap().date(), march_7);

        // 13 cannot be a month
        let march_13 = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
        assert_eq!(parse_datetime("13/03/2024").unwrap().date(), march_13);
        assert_eq!(parse_datetime("13-03-2024 08:00").unwrap().date(), march_13);
    }

    #[test]
    fn test_parse_datetime_rejects_garbage() {
        assert!(parse_datetime("").is_none());
        assert!(parse_datetime("not a date").is_none());
        assert!(parse_datetime("45000").is_none());
        assert!(parse_datetime("2024-13-40").is_none());
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(" 12.5 "), Some(12.5));
        assert_eq!(coerce_number("-3"), Some(-3.0));
        assert_eq!(coerce_number("1,200"), None);
        assert_eq!(coerce_number("NaN"), None);
        assert_eq!(coerce_number("inf"), None);
        assert_eq!(coerce_number(""), None);
    }

    #[test]
    fn test_per_day_zero_days() {
        assert_eq!(per_day(100.0, 0), 0.0);
        assert_eq!(per_day(100.0, 4), 25.0);
    }

    #[test]
    fn test_grouped_integer() {
        assert_eq!(format_grouped_integer(0.0), "0");
        assert_eq!(format_grouped_integer(999.4), "999");
        assert_eq!(format_grouped_integer(1000.0), "1,000");
        assert_eq!(format_grouped_integer(1234567.0), "1,234,567");
        assert_eq!(format_grouped_integer(-4321.0), "-4,321");
        assert_eq!(format_grouped_integer(-0.2), "0");
    }

    #[test]
    fn test_currency_and_percent() {
        assert_eq!(format_currency(15250.0, "₹"), "₹15,250");
        assert_eq!(format_currency(-250.0, "₹"), "-₹250");
        assert_eq!(format_percent(0.1234), "12.3%");
        assert_eq!(format_percent(-0.5), "-50.0%");
        assert_eq!(format_signed_percent(0.25), "+25.0%");
        assert_eq!(format_signed_percent(-0.25), "-25.0%");
    }
}
