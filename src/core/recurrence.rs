use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How often a task repeats.
///
/// - `Daily`: every day
/// - `Weekly`: every 7 days counted from the due date
/// - `Monthly`: on the due date's day of month
/// - `DateWise`: every day from a separate repeat date onwards
///
/// Stored as a plain string; missing, empty or unknown values read as `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum Frequency {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    DateWise,
}

/// Whether monthly recurrence fires in the anchor's own month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthlyRule {
    /// Fires on the anchor's day of month in every month, the anchor month included.
    #[default]
    EveryMonth,
    /// Fires on the anchor's day of month except in the anchor's own month.
    SkipAnchorMonth,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::DateWise => "date-wise",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Self::Daily,
            "weekly" => Self::Weekly,
            "monthly" => Self::Monthly,
            "date-wise" => Self::DateWise,
            _ => Self::None,
        }
    }

    pub fn is_recurring(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Whether `today` is an occurrence.
    ///
    /// - `anchor`: the stored due date
    /// - `repeat_from`: the repeat date, only consulted for `DateWise`
    ///
    /// Weekly arithmetic counts whole calendar days between two zone-less dates.
    /// Days before the anchor that fall on a 7-day multiple count as occurrences.
    pub fn recurs_on(
        &self,
        anchor: NaiveDate,
        repeat_from: Option<NaiveDate>,
        today: NaiveDate,
        rule: MonthlyRule,
    ) -> bool {
        match self {
            Self::None => false,
            Self::Daily => true,
            Self::Weekly => (today - anchor).num_days().rem_euclid(7) == 0,
            Self::Monthly => {
                let same_day = today.day() == anchor.day();
                match rule {
                    MonthlyRule::EveryMonth => same_day,
                    MonthlyRule::SkipAnchorMonth => {
                        same_day
                            && (today.year(), today.month()) != (anchor.year(), anchor.month())
                    }
                }
            }
            Self::DateWise => repeat_from.is_some_and(|from| today >= from),
        }
    }
}

impl From<Option<String>> for Frequency {
    fn from(value: Option<String>) -> Self {
        value.as_deref().map(Self::parse).unwrap_or_default()
    }
}

impl From<Frequency> for String {
    fn from(value: Frequency) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

/// Display-only refinement of a frequency ("morning", "friday", "end", ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencySubdivision {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly: Option<String>,
}

impl FrequencySubdivision {
    /// The refinement matching `frequency`, if one was recorded.
    pub fn label(&self, frequency: Frequency) -> Option<&str> {
        match frequency {
            Frequency::Daily => self.daily.as_deref(),
            Frequency::Weekly => self.weekly.as_deref(),
            Frequency::Monthly => self.monthly.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_known_and_unknown() {
        assert_eq!(Frequency::parse("daily"), Frequency::Daily);
        assert_eq!(Frequency::parse(" Weekly "), Frequency::Weekly);
        assert_eq!(Frequency::parse("date-wise"), Frequency::DateWise);
        assert_eq!(Frequency::parse(""), Frequency::None);
        assert_eq!(Frequency::parse("fortnightly"), Frequency::None);
    }

    #[test]
    fn serde_is_lenient() {
        let f: Frequency = serde_json::from_str("\"monthly\"").unwrap();
        assert_eq!(f, Frequency::Monthly);
        let f: Frequency = serde_json::from_str("null").unwrap();
        assert_eq!(f, Frequency::None);
        let f: Frequency = serde_json::from_str("\"yearly\"").unwrap();
        assert_eq!(f, Frequency::None);
        assert_eq!(serde_json::to_string(&Frequency::DateWise).unwrap(), "\"date-wise\"");
    }

    #[test]
    fn daily_always_recurs() {
        let anchor = date(2024, 3, 1);
        for offset in [-3, 0, 1, 40] {
            let today = anchor + chrono::Duration::days(offset);
            assert!(Frequency::Daily.recurs_on(anchor, None, today, MonthlyRule::default()));
        }
    }

    #[test]
    fn weekly_on_multiples_of_seven() {
        let anchor = date(2024, 3, 1);
        let rule = MonthlyRule::default();
        assert!(Frequency::Weekly.recurs_on(anchor, None, date(2024, 3, 15), rule));
        assert!(!Frequency::Weekly.recurs_on(anchor, None, date(2024, 3, 10), rule));
        assert!(Frequency::Weekly.recurs_on(anchor, None, anchor, rule));
        assert!(Frequency::Weekly.recurs_on(anchor, None, date(2024, 2, 23), rule));
        // spans the March DST change in most zones; dates carry no zone
        assert!(Frequency::Weekly.recurs_on(anchor, None, date(2024, 4, 5), rule));
    }

    #[test]
    fn monthly_every_month_includes_anchor_month() {
        let anchor = date(2024, 3, 15);
        let rule = MonthlyRule::EveryMonth;
        assert!(Frequency::Monthly.recurs_on(anchor, None, anchor, rule));
        assert!(Frequency::Monthly.recurs_on(anchor, None, date(2024, 4, 15), rule));
        assert!(!Frequency::Monthly.recurs_on(anchor, None, date(2024, 4, 16), rule));
    }

    #[test]
    fn monthly_skip_anchor_month() {
        let anchor = date(2024, 3, 15);
        let rule = MonthlyRule::SkipAnchorMonth;
        assert!(!Frequency::Monthly.recurs_on(anchor, None, anchor, rule));
        assert!(Frequency::Monthly.recurs_on(anchor, None, date(2024, 4, 15), rule));
        assert!(Frequency::Monthly.recurs_on(anchor, None, date(2025, 3, 15), rule));
    }

    #[test]
    fn monthly_on_31st_skips_short_months() {
        let anchor = date(2024, 1, 31);
        let rule = MonthlyRule::EveryMonth;
        assert!(!Frequency::Monthly.recurs_on(anchor, None, date(2024, 2, 29), rule));
        assert!(Frequency::Monthly.recurs_on(anchor, None, date(2024, 3, 31), rule));
    }

    #[test]
    fn date_wise_from_repeat_date() {
        let anchor = date(2023, 6, 1);
        let from = Some(date(2024, 1, 1));
        let rule = MonthlyRule::default();
        assert!(!Frequency::DateWise.recurs_on(anchor, from, date(2023, 12, 31), rule));
        assert!(Frequency::DateWise.recurs_on(anchor, from, date(2024, 1, 1), rule));
        assert!(Frequency::DateWise.recurs_on(anchor, from, date(2026, 7, 9), rule));
        assert!(!Frequency::DateWise.recurs_on(anchor, None, date(2026, 7, 9), rule));
    }

    #[test]
    fn none_never_recurs() {
        let anchor = date(2024, 3, 1);
        assert!(!Frequency::None.recurs_on(anchor, None, anchor, MonthlyRule::default()));
    }

    #[test]
    fn subdivision_label_matches_frequency() {
        let sub = FrequencySubdivision {
            daily: Some("morning".into()),
            weekly: None,
            monthly: Some("end".into()),
        };
        assert_eq!(sub.label(Frequency::Daily), Some("morning"));
        assert_eq!(sub.label(Frequency::Weekly), None);
        assert_eq!(sub.label(Frequency::Monthly), Some("end"));
        assert_eq!(sub.label(Frequency::DateWise), None);
    }
}
