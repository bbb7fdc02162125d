//! Display periods and buckets
//!
//! A bucket is a local calendar unit (day, ISO week or month) identified by
//! its first date. Windows are the matching half-open UTC intervals.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};

use crate::consts::{DATE_FORMAT, MONTH_FORMAT};
use crate::core::types::Session;
use crate::utils::Timezone;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum PeriodUnit {
    Day,
    Week,
    Month,
}

/// Which period the viewer is looking at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ViewMode {
    Day,
    Week,
    Month,
}

impl ViewMode {
    pub(crate) fn unit(self) -> PeriodUnit {
        match self {
            ViewMode::Day => PeriodUnit::Day,
            ViewMode::Week => PeriodUnit::Week,
            ViewMode::Month => PeriodUnit::Month,
        }
    }

    /// Granularity sessions are stacked at within this view
    pub(crate) fn bucket_unit(self) -> PeriodUnit {
        match self {
            ViewMode::Day | ViewMode::Week => PeriodUnit::Day,
            ViewMode::Month => PeriodUnit::Week,
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            ViewMode::Day => "day",
            ViewMode::Week => "week",
            ViewMode::Month => "month",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct Bucket {
    pub(crate) start: NaiveDate,
    pub(crate) unit: PeriodUnit,
}

pub(crate) fn week_start(date: NaiveDate) -> NaiveDate {
    let weekday = date.weekday().num_days_from_monday();
    date - Duration::days(i64::from(weekday))
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

impl Bucket {
    pub(crate) fn containing(unit: PeriodUnit, date: NaiveDate) -> Self {
        let start = match unit {
            PeriodUnit::Day => date,
            PeriodUnit::Week => week_start(date),
            PeriodUnit::Month => month_start(date),
        };
        Bucket { start, unit }
    }

    /// First date after the bucket
    pub(crate) fn end_exclusive(self) -> NaiveDate {
        match self.unit {
            PeriodUnit::Day => self.start + Duration::days(1),
            PeriodUnit::Week => self.start + Duration::days(7),
            PeriodUnit::Month => self
                .start
                .checked_add_months(Months::new(1))
                .unwrap_or(self.start + Duration::days(31)),
        }
    }

    pub(crate) fn last_date(self) -> NaiveDate {
        self.end_exclusive() - Duration::days(1)
    }

    pub(crate) fn next(self) -> Self {
        Bucket {
            start: self.end_exclusive(),
            unit: self.unit,
        }
    }

    /// `YYYY-MM-DD` for days and weeks (Monday), `YYYY-MM` for months
    pub(crate) fn key(self) -> String {
        match self.unit {
            PeriodUnit::Day | PeriodUnit::Week => self.start.format(DATE_FORMAT).to_string(),
            PeriodUnit::Month => self.start.format(MONTH_FORMAT).to_string(),
        }
    }

    pub(crate) fn window(self, tz: Timezone) -> PeriodWindow {
        PeriodWindow {
            start: tz.start_of_day(self.start),
            end: tz.start_of_day(self.end_exclusive()),
        }
    }

    /// All buckets of `unit` touching the inclusive date range
    pub(crate) fn range(unit: PeriodUnit, first: NaiveDate, last: NaiveDate) -> Vec<Bucket> {
        let mut buckets = Vec::new();
        let mut current = Bucket::containing(unit, first);
        while current.start <= last {
            buckets.push(current);
            current = current.next();
        }
        buckets
    }
}

/// Half-open UTC interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PeriodWindow {
    pub(crate) start: DateTime<Utc>,
    pub(crate) end: DateTime<Utc>,
}

impl PeriodWindow {
    /// The day, ISO week or month containing `anchor`
    pub(crate) fn for_view(view: ViewMode, anchor: NaiveDate, tz: Timezone) -> Self {
        Bucket::containing(view.unit(), anchor).window(tz)
    }

    pub(crate) fn intersect(&self, other: &PeriodWindow) -> Option<PeriodWindow> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(PeriodWindow { start, end })
    }

    /// Whether `[start, end)` overlaps the window. A zero-length interval
    /// overlaps when its instant lies inside the window.
    pub(crate) fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        if start >= self.end {
            return false;
        }
        if end > start {
            end > self.start
        } else {
            start >= self.start
        }
    }

    /// Seconds of `[start, end)` inside the window
    pub(crate) fn clip_seconds(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
        let lo = start.max(self.start);
        let hi = end.min(self.end);
        (hi - lo).num_seconds().max(0)
    }

    /// Local dates covered by the window (inclusive)
    pub(crate) fn local_dates(&self, tz: Timezone) -> (NaiveDate, NaiveDate) {
        let first = tz.local_date(self.start);
        let last = tz.local_date(self.end - Duration::nanoseconds(1));
        (first, last.max(first))
    }
}

/// Local dates a session touches: its start date through the date of its
/// last instant. A session ending exactly at midnight does not touch the
/// following day.
pub(crate) fn session_dates(
    session: &Session,
    tz: Timezone,
    now: DateTime<Utc>,
) -> (NaiveDate, NaiveDate) {
    let first = tz.local_date(session.start_time);
    let end = session.effective_end(now);
    if end <= session.start_time {
        return (first, first);
    }
    let last = tz.local_date(end - Duration::nanoseconds(1));
    (first, last.max(first))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::fixtures::{session, ts};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn utc() -> Timezone {
        Timezone::Named(chrono_tz::UTC)
    }

    #[test]
    fn week_start_returns_monday() {
        // 2025-01-08 is a Wednesday
        assert_eq!(week_start(d(2025, 1, 8)), d(2025, 1, 6));
        assert_eq!(week_start(d(2025, 1, 6)), d(2025, 1, 6));
        // Sunday belongs to the week that started the previous Monday
        assert_eq!(week_start(d(2025, 1, 12)), d(2025, 1, 6));
    }

    #[test]
    fn week_start_cross_year_boundary() {
        assert_eq!(week_start(d(2025, 1, 1)), d(2024, 12, 30));
    }

    #[test]
    fn bucket_keys() {
        assert_eq!(Bucket::containing(PeriodUnit::Day, d(2025, 1, 15)).key(), "2025-01-15");
        assert_eq!(Bucket::containing(PeriodUnit::Week, d(2025, 1, 15)).key(), "2025-01-13");
        assert_eq!(Bucket::containing(PeriodUnit::Month, d(2025, 1, 15)).key(), "2025-01");
    }

    #[test]
    fn month_bucket_handles_december() {
        let b = Bucket::containing(PeriodUnit::Month, d(2024, 12, 31));
        assert_eq!(b.end_exclusive(), d(2025, 1, 1));
        assert_eq!(b.last_date(), d(2024, 12, 31));
    }

    #[test]
    fn bucket_range_weeks_across_month() {
        let weeks = Bucket::range(PeriodUnit::Week, d(2025, 1, 1), d(2025, 1, 31));
        let keys: Vec<_> = weeks.iter().map(|b| b.key()).collect();
        assert_eq!(
            keys,
            vec!["2024-12-30", "2025-01-06", "2025-01-13", "2025-01-20", "2025-01-27"]
        );
    }

    #[test]
    fn window_for_week_view_is_iso_week() {
        let w = PeriodWindow::for_view(ViewMode::Week, d(2025, 1, 8), utc());
        assert_eq!(w.start, ts("2025-01-06T00:00:00Z"));
        assert_eq!(w.end, ts("2025-01-13T00:00:00Z"));
    }

    #[test]
    fn window_in_named_timezone() {
        let tz = Timezone::parse(Some("Asia/Ho_Chi_Minh")).unwrap();
        let w = PeriodWindow::for_view(ViewMode::Day, d(2025, 1, 8), tz);
        assert_eq!(w.start, ts("2025-01-07T17:00:00Z"));
        assert_eq!(w.end, ts("2025-01-08T17:00:00Z"));
        assert_eq!(w.local_dates(tz), (d(2025, 1, 8), d(2025, 1, 8)));
    }

    #[test]
    fn clip_seconds_intersects() {
        let w = PeriodWindow {
            start: ts("2025-01-06T00:00:00Z"),
            end: ts("2025-01-07T00:00:00Z"),
        };
        assert_eq!(
            w.clip_seconds(ts("2025-01-05T23:00:00Z"), ts("2025-01-06T01:00:00Z")),
            3600
        );
        assert_eq!(
            w.clip_seconds(ts("2025-01-07T01:00:00Z"), ts("2025-01-07T02:00:00Z")),
            0
        );
    }

    #[test]
    fn overlaps_is_half_open() {
        let w = PeriodWindow {
            start: ts("2025-01-06T00:00:00Z"),
            end: ts("2025-01-07T00:00:00Z"),
        };
        // ends exactly at window start
        assert!(!w.overlaps(ts("2025-01-05T22:00:00Z"), ts("2025-01-06T00:00:00Z")));
        // starts exactly at window end
        assert!(!w.overlaps(ts("2025-01-07T00:00:00Z"), ts("2025-01-07T01:00:00Z")));
        // zero-length inside
        assert!(w.overlaps(ts("2025-01-06T12:00:00Z"), ts("2025-01-06T12:00:00Z")));
        assert!(w.overlaps(ts("2025-01-05T23:00:00Z"), ts("2025-01-06T00:30:00Z")));
    }

    #[test]
    fn intersect_disjoint_is_none() {
        let a = PeriodWindow {
            start: ts("2025-01-06T00:00:00Z"),
            end: ts("2025-01-07T00:00:00Z"),
        };
        let b = PeriodWindow {
            start: ts("2025-01-07T00:00:00Z"),
            end: ts("2025-01-08T00:00:00Z"),
        };
        assert!(a.intersect(&b).is_none());
    }

    #[test]
    fn session_dates_across_midnight() {
        let s = session("a", "Late", "2025-01-06T22:00:00Z", Some("2025-01-07T02:00:00Z"));
        let now = ts("2025-01-08T00:00:00Z");
        assert_eq!(session_dates(&s, utc(), now), (d(2025, 1, 6), d(2025, 1, 7)));
    }

    #[test]
    fn session_dates_ending_at_midnight_stays_on_day() {
        let s = session("a", "Evening", "2025-01-06T20:00:00Z", Some("2025-01-07T00:00:00Z"));
        let now = ts("2025-01-08T00:00:00Z");
        assert_eq!(session_dates(&s, utc(), now), (d(2025, 1, 6), d(2025, 1, 6)));
    }

    #[test]
    fn session_dates_running_extend_to_now() {
        let s = session("a", "Running", "2025-01-06T20:00:00Z", None);
        let now = ts("2025-01-08T09:00:00Z");
        assert_eq!(session_dates(&s, utc(), now), (d(2025, 1, 6), d(2025, 1, 8)));
    }
}
