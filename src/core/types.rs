//! Core data types shared across all session sources
//!
//! Every source converts its native rows to `Session`; every report is built
//! from these types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::consts::NONE_KEY;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct CategoryRef {
    #[serde(default)]
    pub(crate) id: Option<String>,
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct TaskRef {
    #[serde(default)]
    pub(crate) id: Option<String>,
    pub(crate) name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct UserRef {
    #[serde(default)]
    pub(crate) display_name: Option<String>,
    #[serde(default)]
    pub(crate) avatar_url: Option<String>,
}

/// A single time-tracking session row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct Session {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) category_id: Option<String>,
    pub(crate) task_id: Option<String>,
    pub(crate) user_id: Option<String>,
    pub(crate) start_time: DateTime<Utc>,
    /// `None` while the session is still running
    pub(crate) end_time: Option<DateTime<Utc>>,
    /// Recorded duration; may exclude paused time, `None` while running
    pub(crate) duration_seconds: Option<i64>,
    pub(crate) is_running: bool,
    pub(crate) created_at: Option<DateTime<Utc>>,
    pub(crate) category: Option<CategoryRef>,
    pub(crate) task: Option<TaskRef>,
    pub(crate) user: Option<UserRef>,
}

impl Session {
    /// End of the session's interval; running sessions extend to `now`
    pub(crate) fn effective_end(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.end_time.unwrap_or(now).max(self.start_time)
    }

    pub(crate) fn elapsed_seconds(&self, now: DateTime<Utc>) -> i64 {
        (self.effective_end(now) - self.start_time).num_seconds().max(0)
    }

    /// Recorded duration for completed sessions, elapsed wall time otherwise
    pub(crate) fn effective_duration(&self, now: DateTime<Utc>) -> i64 {
        match self.duration_seconds {
            Some(d) if !self.is_running => d.max(0),
            _ => self.elapsed_seconds(now),
        }
    }

    /// Stopped without an end time: the timer is on a break
    pub(crate) fn is_paused(&self) -> bool {
        !self.is_running && self.end_time.is_none()
    }

    pub(crate) fn category_key(&self) -> &str {
        self.category_id.as_deref().unwrap_or(NONE_KEY)
    }

    pub(crate) fn task_key(&self) -> &str {
        self.task_id.as_deref().unwrap_or(NONE_KEY)
    }

    pub(crate) fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }

    pub(crate) fn user_name(&self) -> Option<&str> {
        self.user.as_ref().and_then(|u| u.display_name.as_deref())
    }
}

/// Classification of the space between two consecutive stacked sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum GapKind {
    Overlap,
    Minimal,
    Short,
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) struct SessionGap {
    /// Index (into `StackedSession::sessions`) of the session after the gap
    pub(crate) before_index: usize,
    pub(crate) seconds: i64,
    pub(crate) kind: GapKind,
}

/// Sessions sharing title, category and task within one display bucket
#[derive(Debug, Clone, Serialize)]
pub(crate) struct StackedSession {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) category_id: Option<String>,
    pub(crate) category: Option<CategoryRef>,
    pub(crate) task_id: Option<String>,
    pub(crate) task: Option<TaskRef>,
    /// Ordered by start time ascending
    pub(crate) sessions: Vec<Session>,
    pub(crate) total_duration: i64,
    pub(crate) period_duration: i64,
    pub(crate) first_start_time: DateTime<Utc>,
    pub(crate) last_end_time: Option<DateTime<Utc>>,
    pub(crate) display_date: NaiveDate,
}

impl StackedSession {
    pub(crate) fn is_running(&self) -> bool {
        self.sessions.iter().any(|s| s.is_running)
    }

    pub(crate) fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }

    pub(crate) fn task_name(&self) -> Option<&str> {
        self.task.as_ref().map(|t| t.name.as_str())
    }
}

/// Date filter for queries (inclusive, local dates)
#[derive(Debug, Clone, Default)]
pub(crate) struct DateFilter {
    pub(crate) since: Option<NaiveDate>,
    pub(crate) until: Option<NaiveDate>,
}

impl DateFilter {
    pub(crate) fn new(since: Option<NaiveDate>, until: Option<NaiveDate>) -> Self {
        Self { since, until }
    }

    pub(crate) fn is_unbounded(&self) -> bool {
        self.since.is_none() && self.until.is_none()
    }

    pub(crate) fn contains(&self, date: NaiveDate) -> bool {
        if let Some(s) = self.since
            && date < s
        {
            return false;
        }
        if let Some(u) = self.until
            && date > u
        {
            return false;
        }
        true
    }

    /// Whether the inclusive range `first..=last` touches the filter
    pub(crate) fn overlaps(&self, first: NaiveDate, last: NaiveDate) -> bool {
        if let Some(s) = self.since
            && last < s
        {
            return false;
        }
        if let Some(u) = self.until
            && first > u
        {
            return false;
        }
        true
    }
}

/// Loading result with statistics
#[derive(Debug, Default)]
pub(crate) struct LoadResult {
    pub(crate) sessions: Vec<Session>,
    /// Rows dropped as unparseable or duplicate
    pub(crate) skipped: i64,
    pub(crate) valid: i64,
    /// Processing time in milliseconds
    pub(crate) elapsed_ms: f64,
}


#[cfg(test)]
mod tests {
    use super::fixtures::{session, ts};
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    // --- Session ---

    #[test]
    fn effective_end_uses_now_for_running() {
        let s = session("a", "Focus", "2025-01-06T09:00:00Z", None);
        let now = ts("2025-01-06T10:30:00Z");
        assert_eq!(s.effective_end(now), now);
        assert_eq!(s.effective_duration(now), 5400);
    }

    #[test]
    fn effective_duration_prefers_recorded_for_completed() {
        let mut s = session(
            "a",
            "Focus",
            "2025-01-06T09:00:00Z",
            Some("2025-01-06T11:00:00Z"),
        );
        s.duration_seconds = Some(3600); // one hour paused
        let now = ts("2025-01-07T00:00:00Z");
        assert_eq!(s.effective_duration(now), 3600);
        assert_eq!(s.elapsed_seconds(now), 7200);
    }

    #[test]
    fn effective_duration_falls_back_to_elapsed_without_record() {
        let mut s = session(
            "a",
            "Focus",
            "2025-01-06T09:00:00Z",
            Some("2025-01-06T09:20:00Z"),
        );
        s.duration_seconds = None;
        assert_eq!(s.effective_duration(ts("2025-01-07T00:00:00Z")), 1200);
    }

    #[test]
    fn end_before_start_clamps_to_zero() {
        let s = session(
            "a",
            "Broken",
            "2025-01-06T09:00:00Z",
            Some("2025-01-06T08:00:00Z"),
        );
        assert_eq!(s.elapsed_seconds(ts("2025-01-07T00:00:00Z")), 0);
        assert_eq!(s.effective_duration(ts("2025-01-07T00:00:00Z")), 0);
    }

    #[test]
    fn keys_default_to_none() {
        let s = session("a", "Focus", "2025-01-06T09:00:00Z", None);
        assert_eq!(s.category_key(), "none");
        assert_eq!(s.task_key(), "none");
    }

    // --- DateFilter ---

    #[test]
    fn date_filter_no_bounds() {
        let f = DateFilter::new(None, None);
        assert!(f.is_unbounded());
        assert!(f.contains(d(2020, 1, 1)));
        assert!(f.contains(d(2099, 12, 31)));
    }

    #[test]
    fn date_filter_both_bounds_inclusive() {
        let f = DateFilter::new(Some(d(2025, 3, 1)), Some(d(2025, 3, 31)));
        assert!(!f.contains(d(2025, 2, 28)));
        assert!(f.contains(d(2025, 3, 1)));
        assert!(f.contains(d(2025, 3, 31)));
        assert!(!f.contains(d(2025, 4, 1)));
    }

    #[test]
    fn date_filter_overlaps_spanning_range() {
        let f = DateFilter::new(Some(d(2025, 3, 10)), Some(d(2025, 3, 12)));
        assert!(f.overlaps(d(2025, 3, 1), d(2025, 3, 31)));
        assert!(f.overlaps(d(2025, 3, 12), d(2025, 3, 13)));
        assert!(!f.overlaps(d(2025, 3, 1), d(2025, 3, 9)));
        assert!(!f.overlaps(d(2025, 3, 13), d(2025, 3, 20)));
    }
}
