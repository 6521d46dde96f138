use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};

/// Reporting window selected by the client's `timeRange` field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    All,
}

impl TimeRange {
    /// Unknown or missing values fall back to the full history.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("daily") => TimeRange::Daily,
            Some("weekly") => TimeRange::Weekly,
            Some("monthly") => TimeRange::Monthly,
            Some("yearly") => TimeRange::Yearly,
            _ => TimeRange::All,
        }
    }

    /// Inclusive lower bound on `created_at`, or `None` for no filter.
    /// Weeks start on Monday.
    pub fn start(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let today = now.date_naive();
        let start = match self {
            TimeRange::Daily => today,
            TimeRange::Weekly => {
                today - Duration::days(today.weekday().num_days_from_monday() as i64)
            }
            TimeRange::Monthly => NaiveDate::from_ymd_opt(today.year(), today.month(), 1)?,
            TimeRange::Yearly => NaiveDate::from_ymd_opt(today.year(), 1, 1)?,
            TimeRange::All => return None,
        };
        Some(Utc.from_utc_datetime(&start.and_hms_opt(0, 0, 0)?))
    }
}
