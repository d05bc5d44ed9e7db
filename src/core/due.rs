use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::DateError;

/// Time of day used when a stored due date carries only a calendar date.
pub const MIDNIGHT: &str = "00:00";

/// A stored `dueDate` string split into its calendar date and the raw time-of-day
/// text that followed the `T`, if any.
///
/// The time text is kept verbatim so a projected occurrence carries exactly the
/// same time-of-day the stored record had.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueDate {
    date: NaiveDate,
    time: Option<String>,
}

impl DueDate {
    /// Parse "YYYY-MM-DD" or "YYYY-MM-DDTHH:MM[:SS[.fff]][Z|±HH:MM]".
    pub fn parse(s: &str) -> Result<Self, DateError> {
        let s = s.trim();
        let (date_part, time_part) = match s.split_once('T') {
            Some((d, t)) => (d, Some(t)),
            None => (s, None),
        };

        let date = parse_date_only(date_part).ok_or_else(|| DateError::new(s))?;

        let time = match time_part {
            Some(t) if !t.is_empty() => {
                parse_time(t).ok_or_else(|| DateError::new(s))?;
                Some(t.to_string())
            }
            _ => None,
        };

        Ok(Self { date, time })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Raw time-of-day text, `00:00` when the stored value had none.
    pub fn time_of_day(&self) -> &str {
        self.time.as_deref().unwrap_or(MIDNIGHT)
    }

    pub fn has_time(&self) -> bool {
        self.time.is_some()
    }

    /// Date and time combined, for ordering.
    pub fn sort_key(&self) -> NaiveDateTime {
        let time = self
            .time
            .as_deref()
            .and_then(parse_time)
            .unwrap_or(NaiveTime::MIN);
        self.date.and_time(time)
    }

    /// The due string for the same time of day on another calendar day.
    pub fn on(&self, day: NaiveDate) -> String {
        format!("{}T{}", format_date(day), self.time_of_day())
    }
}

/// Parse the calendar-date part of a stored date or date-time string.
pub fn parse_date(s: &str) -> Result<NaiveDate, DateError> {
    let s = s.trim();
    let date_part = s.split_once('T').map(|(d, _)| d).unwrap_or(s);
    parse_date_only(date_part).ok_or_else(|| DateError::new(s))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn parse_date_only(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    let s = strip_zone(s);
    ["%H:%M", "%H:%M:%S", "%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
}

// "09:00:00.000Z" -> "09:00:00.000", "09:00+05:30" -> "09:00"
fn strip_zone(s: &str) -> &str {
    let s = s.strip_suffix('Z').unwrap_or(s);
    match s.find(['+', '-']) {
        Some(pos) => &s[..pos],
        None => s,
    }
}
