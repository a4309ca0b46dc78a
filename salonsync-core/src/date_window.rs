//! Date window for task queries.

use std::fmt;

use chrono::{DateTime, Duration, Local, NaiveDate, SecondsFormat, Utc};

/// Inclusive range of calendar days a task query covers.
///
/// The query bounds start at 23:59 of the day before `first` and end at
/// 23:59 of `last`, which absorbs timezone skew at the day boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateWindow {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

impl DateWindow {
    pub fn for_date(date: NaiveDate) -> Self {
        DateWindow {
            first: date,
            last: date,
        }
    }

    /// Window spanning `first..=last`. The bounds are swapped if reversed.
    pub fn span(first: NaiveDate, last: NaiveDate) -> Self {
        if first <= last {
            DateWindow { first, last }
        } else {
            DateWindow {
                first: last,
                last: first,
            }
        }
    }

    pub fn today() -> Self {
        Self::for_date(Local::now().date_naive())
    }

    /// Parse optional YYYY-MM-DD arguments; `from` defaults to today and
    /// `to` defaults to `from`.
    pub fn from_args(from: Option<&str>, to: Option<&str>) -> Result<Self, String> {
        let first = match from {
            Some(s) => parse_date(s)?,
            None => Local::now().date_naive(),
        };
        let last = match to {
            Some(s) => parse_date(s)?,
            None => first,
        };
        Ok(Self::span(first, last))
    }

    pub fn scheduled_after(&self) -> DateTime<Utc> {
        end_of_day(self.first - Duration::days(1))
    }

    pub fn scheduled_before(&self) -> DateTime<Utc> {
        end_of_day(self.last)
    }

    pub fn scheduled_after_rfc3339(&self) -> String {
        self.scheduled_after()
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn scheduled_before_rfc3339(&self) -> String {
        self.scheduled_before()
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first <= date && date <= self.last
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.first == self.last {
            write!(f, "{}", self.first)
        } else {
            write!(f, "{}..{}", self.first, self.last)
        }
    }
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    // 23:59:00 always exists
    date.and_hms_opt(23, 59, 0).unwrap_or_default().and_utc()
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date format '{}'. Expected YYYY-MM-DD", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_single_day_bounds() {
        let window = DateWindow::for_date(date(2025, 1, 1));

        assert_eq!(window.scheduled_after_rfc3339(), "2024-12-31T23:59:00.000Z");
        assert_eq!(window.scheduled_before_rfc3339(), "2025-01-01T23:59:00.000Z");
    }

    #[test]
    fn test_span_is_normalized() {
        let window = DateWindow::span(date(2025, 3, 10), date(2025, 3, 1));

        assert_eq!(window.first, date(2025, 3, 1));
        assert_eq!(window.last, date(2025, 3, 10));
        assert!(window.contains(date(2025, 3, 5)));
        assert!(!window.contains(date(2025, 3, 11)));
        assert_eq!(window.to_string(), "2025-03-01..2025-03-10");
    }

    #[test]
    fn test_from_args() {
        let window = DateWindow::from_args(Some("2025-02-14"), None).unwrap();
        assert_eq!(window, DateWindow::for_date(date(2025, 2, 14)));

        assert!(DateWindow::from_args(Some("14/02/2025"), None).is_err());
    }
}
