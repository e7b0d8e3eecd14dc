//! Timestamp parsing in the dashboard's local calendar

use super::duration::{hrs_to_minutes, minutes_to_hm};
use chrono::{
    DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};

const NAIVE_DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y, %H:%M",
    "%d-%m-%Y, %H:%M",
    "%d/%m/%Y %H:%M",
];

/// Fixed-offset calendar used for day boundaries and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalCalendar {
    offset: FixedOffset,
}

impl Default for LocalCalendar {
    fn default() -> Self {
        Self::utc()
    }
}

impl LocalCalendar {
    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    /// Out-of-range offsets fall back to UTC.
    pub fn from_offset_minutes(minutes: i32) -> Self {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(|offset| Self { offset })
            .unwrap_or_else(Self::utc)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Parse an upstream timestamp. Zoned forms keep their own offset,
    /// naive forms are read in this calendar.
    pub fn parse(&self, raw: &str) -> Option<DateTime<FixedOffset>> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(dt);
        }
        if let Ok(dt) = DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f%z") {
            return Some(dt);
        }

        let naive = NAIVE_DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(text, "%Y-%m-%d")
                    .ok()
                    .map(|d| d.and_time(NaiveTime::MIN))
            })?;

        self.offset.from_local_datetime(&naive).single()
    }

    pub fn start_of_day(&self, date: NaiveDate) -> Option<DateTime<FixedOffset>> {
        self.offset.from_local_datetime(&date.and_time(NaiveTime::MIN)).single()
    }

    pub fn end_of_day(&self, date: NaiveDate) -> Option<DateTime<FixedOffset>> {
        let end = NaiveTime::from_hms_opt(23, 59, 59)?;
        self.offset.from_local_datetime(&date.and_time(end)).single()
    }

    /// `dd/mm/yyyy, hh:mm` in this calendar; unparseable input is echoed.
    pub fn format_local(&self, raw: &str) -> String {
        match self.parse(raw) {
            Some(dt) => self.format_instant(&dt),
            None => raw.to_string(),
        }
    }

    pub fn format_instant(&self, dt: &DateTime<FixedOffset>) -> String {
        dt.with_timezone(&self.offset).format("%d/%m/%Y, %H:%M").to_string()
    }

    /// Elapsed time since `start` as `("H:MM", "<d> Days")`.
    pub fn elapsed_hm_and_days(&self, start: Option<&str>, now: DateTime<Utc>) -> (String, String) {
        let Some(start) = start.and_then(|s| self.parse(s)) else {
            return (String::new(), String::new());
        };
        let elapsed = now.signed_duration_since(start);
        if elapsed < Duration::zero() {
            return ("0:00".to_string(), "0 Days".to_string());
        }
        let total_minutes = elapsed.num_minutes() as u64;
        (
            minutes_to_hm(total_minutes % (24 * 60)),
            format!("{} Days", elapsed.num_days()),
        )
    }

    /// Moment of the first response: created time plus the strict minutes of
    /// the first response duration. Responses under a minute yield `None`.
    pub fn first_response_at(&self, created: Option<&str>, first_response: Option<&str>) -> Option<String> {
        let minutes = hrs_to_minutes(first_response).filter(|m| *m >= 1)?;
        let base = self.parse(created?)?;
        let delta = Duration::try_minutes(i64::try_from(minutes).ok()?)?;
        let at = base.checked_add_signed(delta)?;
        Some(self.format_instant(&at))
    }
}

/// Whole days between `created` and `now`, floored and clamped at zero.
pub fn age_in_days(created: &DateTime<FixedOffset>, now: DateTime<Utc>) -> u64 {
    now.signed_duration_since(*created).num_days().max(0) as u64
}
