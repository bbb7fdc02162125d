//! Period and tracker statistics

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::consts::UNCATEGORIZED;
use crate::core::filter::TimeOfDay;
use crate::core::period::{Bucket, PeriodUnit, PeriodWindow, session_dates};
use crate::core::types::Session;
use crate::utils::Timezone;

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CategoryBreakdown {
    pub(crate) name: String,
    pub(crate) color: Option<String>,
    pub(crate) duration: i64,
    pub(crate) sessions: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct DayBreakdown {
    pub(crate) date: NaiveDate,
    pub(crate) duration: i64,
    pub(crate) sessions: usize,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct LongestSession {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) duration: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub(crate) struct PeriodStats {
    pub(crate) total_duration: i64,
    pub(crate) session_count: usize,
    pub(crate) average_duration: i64,
    pub(crate) longest: Option<LongestSession>,
    pub(crate) categories: Vec<CategoryBreakdown>,
    pub(crate) days: Vec<DayBreakdown>,
    pub(crate) best_time_of_day: Option<TimeOfDay>,
}

/// Statistics for the sessions overlapping `period`. Durations are the
/// shares clipped to the period; the longest session uses full durations.
pub(crate) fn period_stats(
    sessions: &[Session],
    period: PeriodWindow,
    tz: Timezone,
    now: DateTime<Utc>,
) -> PeriodStats {
    let mut stats = PeriodStats::default();
    let mut categories: HashMap<String, CategoryBreakdown> = HashMap::new();
    let mut days: BTreeMap<NaiveDate, DayBreakdown> = BTreeMap::new();
    let mut slots: BTreeMap<TimeOfDay, i64> = BTreeMap::new();
    let (period_first, period_last) = period.local_dates(tz);

    for session in sessions {
        let end = session.effective_end(now);
        if !period.overlaps(session.start_time, end) {
            continue;
        }
        let total = session.effective_duration(now);
        let clipped = period.clip_seconds(session.start_time, end).min(total);

        stats.session_count += 1;
        stats.total_duration += clipped;

        if stats.longest.as_ref().is_none_or(|l| total > l.duration) {
            stats.longest = Some(LongestSession {
                id: session.id.clone(),
                title: session.title.clone(),
                duration: total,
            });
        }

        let name = session.category_name().unwrap_or(UNCATEGORIZED).to_string();
        let entry = categories.entry(name.clone()).or_insert_with(|| CategoryBreakdown {
            name,
            color: session.category.as_ref().and_then(|c| c.color.clone()),
            duration: 0,
            sessions: 0,
        });
        entry.duration += clipped;
        entry.sessions += 1;

        *slots
            .entry(TimeOfDay::of_instant(session.start_time, tz))
            .or_default() += clipped;

        let (first, last) = session_dates(session, tz, now);
        for bucket in Bucket::range(PeriodUnit::Day, first.max(period_first), last.min(period_last)) {
            let Some(window) = bucket.window(tz).intersect(&period) else {
                continue;
            };
            if !window.overlaps(session.start_time, end) {
                continue;
            }
            let day = days.entry(bucket.start).or_insert_with(|| DayBreakdown {
                date: bucket.start,
                duration: 0,
                sessions: 0,
            });
            day.duration += window.clip_seconds(session.start_time, end).min(total);
            day.sessions += 1;
        }
    }

    if stats.session_count > 0 {
        stats.average_duration = stats.total_duration / stats.session_count as i64;
    }

    let mut categories: Vec<_> = categories.into_values().collect();
    categories.sort_by(|a, b| b.duration.cmp(&a.duration).then_with(|| a.name.cmp(&b.name)));
    stats.categories = categories;
    stats.days = days.into_values().collect();

    // Ties go to the earlier slot in the day
    stats.best_time_of_day = slots
        .into_iter()
        .filter(|(_, secs)| *secs > 0)
        .fold(None, |best: Option<(TimeOfDay, i64)>, (slot, secs)| match best {
            Some((_, best_secs)) if best_secs >= secs => best,
            _ => Some((slot, secs)),
        })
        .map(|(slot, _)| slot);

    stats
}

/// Seconds per category id (`none` for uncategorized) in each summary period
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub(crate) struct CategoryTime {
    pub(crate) today: BTreeMap<String, i64>,
    pub(crate) week: BTreeMap<String, i64>,
    pub(crate) month: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub(crate) struct TrackerSummary {
    pub(crate) today_time: i64,
    pub(crate) week_time: i64,
    pub(crate) month_time: i64,
    pub(crate) streak: u32,
    pub(crate) daily_activity: Vec<DayBreakdown>,
    pub(crate) category_breakdown: CategoryTime,
}

/// Headline numbers for the tracker: time started today, this ISO week and
/// this month (overall and per category), the current streak and per-day
/// activity.
///
/// Only sessions with a recorded duration count. A streak ends today, or
/// yesterday when nothing has been tracked yet today.
pub(crate) fn tracker_summary(sessions: &[Session], tz: Timezone, now: DateTime<Utc>) -> TrackerSummary {
    let today = tz.local_date(now);
    let today_start = tz.start_of_day(today);
    let week_start = tz.start_of_day(Bucket::containing(PeriodUnit::Week, today).start);
    let month_start = tz.start_of_day(Bucket::containing(PeriodUnit::Month, today).start);

    let mut summary = TrackerSummary::default();
    let mut active_days: BTreeSet<NaiveDate> = BTreeSet::new();
    let mut daily: BTreeMap<NaiveDate, DayBreakdown> = BTreeMap::new();

    for session in sessions {
        let duration = match session.duration_seconds {
            Some(d) if d > 0 && !session.is_running => d,
            _ => continue,
        };
        let category = session.category_key();
        let breakdown = &mut summary.category_breakdown;
        if session.start_time >= today_start {
            summary.today_time += duration;
            *breakdown.today.entry(category.to_string()).or_default() += duration;
        }
        if session.start_time >= week_start {
            summary.week_time += duration;
            *breakdown.week.entry(category.to_string()).or_default() += duration;
        }
        if session.start_time >= month_start {
            summary.month_time += duration;
            *breakdown.month.entry(category.to_string()).or_default() += duration;
        }

        let date = tz.local_date(session.start_time);
        active_days.insert(date);
        let day = daily.entry(date).or_insert_with(|| DayBreakdown {
            date,
            duration: 0,
            sessions: 0,
        });
        day.duration += duration;
        day.sessions += 1;
    }

    let mut cursor = if active_days.contains(&today) {
        today
    } else {
        today - Duration::days(1)
    };
    while active_days.contains(&cursor) {
        summary.streak += 1;
        cursor -= Duration::days(1);
    }

    summary.daily_activity = daily.into_values().collect();
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::period::ViewMode;
    use crate::core::types::CategoryRef;
    use crate::core::types::fixtures::{session, ts};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn utc() -> Timezone {
        Timezone::Named(chrono_tz::UTC)
    }

    fn categorized(id: &str, start: &str, end: &str, category: &str) -> Session {
        let mut s = session(id, "Work", start, Some(end));
        s.category_id = Some(category.to_lowercase());
        s.category = Some(CategoryRef {
            id: Some(category.to_lowercase()),
            name: category.to_string(),
            color: None,
        });
        s
    }

    #[test]
    fn period_stats_empty() {
        let period = PeriodWindow::for_view(ViewMode::Week, d(2025, 1, 6), utc());
        let stats = period_stats(&[], period, utc(), ts("2025-01-10T00:00:00Z"));
        assert_eq!(stats.session_count, 0);
        assert_eq!(stats.average_duration, 0);
        assert!(stats.longest.is_none());
        assert!(stats.best_time_of_day.is_none());
    }

    #[test]
    fn period_stats_totals_and_breakdowns() {
        let sessions = vec![
            categorized("a", "2025-01-06T09:00:00Z", "2025-01-06T11:00:00Z", "Coding"),
            categorized("b", "2025-01-06T14:00:00Z", "2025-01-06T15:00:00Z", "Meetings"),
            categorized("c", "2025-01-07T08:00:00Z", "2025-01-07T09:00:00Z", "Coding"),
        ];
        let period = PeriodWindow::for_view(ViewMode::Week, d(2025, 1, 6), utc());
        let stats = period_stats(&sessions, period, utc(), ts("2025-01-10T00:00:00Z"));

        assert_eq!(stats.session_count, 3);
        assert_eq!(stats.total_duration, 4 * 3600);
        assert_eq!(stats.average_duration, 4 * 3600 / 3);
        assert_eq!(stats.longest.as_ref().unwrap().id, "a");
        assert_eq!(stats.categories[0].name, "Coding");
        assert_eq!(stats.categories[0].duration, 3 * 3600);
        assert_eq!(stats.categories[0].sessions, 2);
        assert_eq!(
            stats.days,
            vec![
                DayBreakdown { date: d(2025, 1, 6), duration: 3 * 3600, sessions: 2 },
                DayBreakdown { date: d(2025, 1, 7), duration: 3600, sessions: 1 },
            ]
        );
        assert_eq!(stats.best_time_of_day, Some(TimeOfDay::Morning));
    }

    #[test]
    fn period_stats_clips_sessions_entering_period() {
        let sessions = vec![session(
            "a",
            "Late",
            "2025-01-05T22:00:00Z",
            Some("2025-01-06T02:00:00Z"),
        )];
        let period = PeriodWindow::for_view(ViewMode::Week, d(2025, 1, 6), utc());
        let stats = period_stats(&sessions, period, utc(), ts("2025-01-10T00:00:00Z"));
        assert_eq!(stats.total_duration, 2 * 3600);
        assert_eq!(stats.longest.unwrap().duration, 4 * 3600);
        assert_eq!(stats.categories[0].name, UNCATEGORIZED);
        assert_eq!(stats.days.len(), 1);
    }

    #[test]
    fn tracker_summary_today_week_month() {
        let now = ts("2025-01-15T18:00:00Z"); // Wednesday
        let sessions = vec![
            session("a", "Today", "2025-01-15T09:00:00Z", Some("2025-01-15T10:00:00Z")),
            session("b", "Monday", "2025-01-13T09:00:00Z", Some("2025-01-13T11:00:00Z")),
            session("c", "Early month", "2025-01-02T09:00:00Z", Some("2025-01-02T12:00:00Z")),
            session("d", "Last year", "2024-12-31T09:00:00Z", Some("2024-12-31T10:00:00Z")),
            session("e", "Running", "2025-01-15T17:00:00Z", None),
        ];
        let summary = tracker_summary(&sessions, utc(), now);
        assert_eq!(summary.today_time, 3600);
        assert_eq!(summary.week_time, 3 * 3600);
        assert_eq!(summary.month_time, 6 * 3600);
        assert_eq!(summary.daily_activity.len(), 4);
        assert_eq!(summary.daily_activity[0].date, d(2024, 12, 31));
    }

    #[test]
    fn tracker_summary_breaks_time_down_by_category() {
        let now = ts("2025-01-15T18:00:00Z");
        let sessions = vec![
            categorized("a", "2025-01-15T09:00:00Z", "2025-01-15T10:00:00Z", "Coding"),
            categorized("b", "2025-01-13T09:00:00Z", "2025-01-13T11:00:00Z", "Coding"),
            categorized("c", "2025-01-14T09:00:00Z", "2025-01-14T09:30:00Z", "Meetings"),
            session("d", "Loose", "2025-01-15T12:00:00Z", Some("2025-01-15T12:15:00Z")),
        ];
        let breakdown = tracker_summary(&sessions, utc(), now).category_breakdown;
        assert_eq!(breakdown.today.get("coding"), Some(&3600));
        assert_eq!(breakdown.today.get("none"), Some(&900));
        assert_eq!(breakdown.today.get("meetings"), None);
        assert_eq!(breakdown.week.get("coding"), Some(&(3 * 3600)));
        assert_eq!(breakdown.week.get("meetings"), Some(&1800));
        assert_eq!(breakdown.month.values().sum::<i64>(), 3600 + 2 * 3600 + 1800 + 900);
    }

    #[test]
    fn streak_counts_back_from_today() {
        let now = ts("2025-01-15T18:00:00Z");
        let sessions = vec![
            session("a", "x", "2025-01-15T09:00:00Z", Some("2025-01-15T10:00:00Z")),
            session("b", "x", "2025-01-14T09:00:00Z", Some("2025-01-14T10:00:00Z")),
            session("c", "x", "2025-01-13T09:00:00Z", Some("2025-01-13T10:00:00Z")),
            session("d", "x", "2025-01-11T09:00:00Z", Some("2025-01-11T10:00:00Z")),
        ];
        assert_eq!(tracker_summary(&sessions, utc(), now).streak, 3);
    }

    #[test]
    fn streak_starts_yesterday_when_today_is_empty() {
        let now = ts("2025-01-15T08:00:00Z");
        let sessions = vec![
            session("a", "x", "2025-01-14T09:00:00Z", Some("2025-01-14T10:00:00Z")),
            session("b", "x", "2025-01-13T09:00:00Z", Some("2025-01-13T10:00:00Z")),
        ];
        assert_eq!(tracker_summary(&sessions, utc(), now).streak, 2);
    }

    #[test]
    fn streak_zero_after_a_missed_day() {
        let now = ts("2025-01-15T08:00:00Z");
        let sessions = vec![session("a", "x", "2025-01-12T09:00:00Z", Some("2025-01-12T10:00:00Z"))];
        assert_eq!(tracker_summary(&sessions, utc(), now).streak, 0);
    }
}
