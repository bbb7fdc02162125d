//! Session stacking
//!
//! Groups sessions that share a display bucket, title, category and task into
//! one `StackedSession`, tracking both their full recorded duration and the
//! share that falls inside the bucket being rendered.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::core::period::{Bucket, PeriodUnit, PeriodWindow, ViewMode, session_dates};
use crate::core::types::{GapKind, Session, SessionGap, StackedSession};
use crate::utils::Timezone;

/// Gaps shorter than this are noise and not reported
const GAP_MIN_SECONDS: i64 = 30;
/// Gaps of a day or more separate unrelated work and are not reported
const GAP_MAX_SECONDS: i64 = 86_400;
const GAP_MINIMAL_BELOW: i64 = 60;
const GAP_SHORT_BELOW: i64 = 15 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct StackKey {
    bucket: Bucket,
    title: String,
    category: String,
    task: String,
}

impl StackKey {
    fn new(bucket: Bucket, session: &Session) -> Self {
        StackKey {
            bucket,
            title: session.title.clone(),
            category: session.category_key().to_string(),
            task: session.task_key().to_string(),
        }
    }
}

/// Stack accumulator for building one stacked session
#[derive(Debug, Default)]
struct StackAccumulator<'a> {
    sessions: Vec<&'a Session>,
    total_duration: i64,
    period_duration: i64,
}

impl<'a> StackAccumulator<'a> {
    fn add(&mut self, session: &'a Session, total: i64, in_period: i64) {
        self.sessions.push(session);
        self.total_duration += total;
        self.period_duration += in_period;
    }

    fn into_stacked(mut self, bucket: Bucket) -> Option<StackedSession> {
        self.sessions
            .sort_by(|a, b| a.start_time.cmp(&b.start_time).then_with(|| a.id.cmp(&b.id)));
        let first = *self.sessions.first()?;

        let last_end_time = self.sessions.iter().filter_map(|s| s.end_time).max();
        let category = self.sessions.iter().find_map(|s| s.category.clone());
        let task = self.sessions.iter().find_map(|s| s.task.clone());

        Some(StackedSession {
            id: first.id.clone(),
            title: first.title.clone(),
            description: first.description.clone(),
            category_id: first.category_id.clone(),
            category,
            task_id: first.task_id.clone(),
            task,
            first_start_time: first.start_time,
            last_end_time,
            display_date: bucket.start,
            total_duration: self.total_duration,
            period_duration: self.period_duration,
            sessions: self.sessions.into_iter().cloned().collect(),
        })
    }
}

/// Buckets a session is assigned to within the display period.
///
/// Day and week views use every local day the session touches; month view
/// uses the single ISO week in which the session first appears in the period.
fn buckets_for(
    session: &Session,
    view: ViewMode,
    period: &PeriodWindow,
    tz: Timezone,
    now: DateTime<Utc>,
) -> Vec<Bucket> {
    let (first, last) = session_dates(session, tz, now);
    let (period_first, period_last) = period.local_dates(tz);
    let first = first.max(period_first);
    let last = last.min(period_last);
    if first > last {
        return Vec::new();
    }

    match view.bucket_unit() {
        PeriodUnit::Day => Bucket::range(PeriodUnit::Day, first, last),
        unit => vec![Bucket::containing(unit, first)],
    }
}

/// Stack sessions for display.
///
/// `period` is the window being rendered; buckets outside it are never
/// emitted and every duration share is clipped to it. Running sessions are
/// measured up to `now`. Results are ordered by bucket, then first start.
pub(crate) fn stack_sessions(
    sessions: &[Session],
    view: ViewMode,
    period: PeriodWindow,
    tz: Timezone,
    now: DateTime<Utc>,
) -> Vec<StackedSession> {
    let mut groups: HashMap<StackKey, StackAccumulator<'_>> = HashMap::new();

    for session in sessions {
        let end = session.effective_end(now);
        let total = session.effective_duration(now);

        for bucket in buckets_for(session, view, &period, tz, now) {
            let Some(window) = bucket.window(tz).intersect(&period) else {
                continue;
            };
            if !window.overlaps(session.start_time, end) {
                continue;
            }
            // Recorded durations may exclude paused time; never attribute
            // more to a bucket than the session recorded overall.
            let in_period = window.clip_seconds(session.start_time, end).min(total);
            groups
                .entry(StackKey::new(bucket, session))
                .or_default()
                .add(session, total, in_period);
        }
    }

    let mut stacks: Vec<StackedSession> = groups
        .into_iter()
        .filter_map(|(key, acc)| acc.into_stacked(key.bucket))
        .collect();
    stacks.sort_by(|a, b| {
        a.display_date
            .cmp(&b.display_date)
            .then_with(|| a.first_start_time.cmp(&b.first_start_time))
            .then_with(|| a.title.cmp(&b.title))
            .then_with(|| a.id.cmp(&b.id))
    });
    stacks
}

impl StackedSession {
    /// Gaps and overlaps between consecutive sessions in the stack
    pub(crate) fn gaps(&self) -> Vec<SessionGap> {
        let mut gaps = Vec::new();
        for (i, pair) in self.sessions.windows(2).enumerate() {
            let Some(prev_end) = pair[0].end_time else {
                continue;
            };
            let seconds = (pair[1].start_time - prev_end).num_seconds();
            let kind = if seconds < 0 {
                GapKind::Overlap
            } else if seconds <= GAP_MIN_SECONDS || seconds >= GAP_MAX_SECONDS {
                continue;
            } else if seconds < GAP_MINIMAL_BELOW {
                GapKind::Minimal
            } else if seconds < GAP_SHORT_BELOW {
                GapKind::Short
            } else {
                GapKind::Long
            };
            gaps.push(SessionGap {
                before_index: i + 1,
                seconds,
                kind,
            });
        }
        gaps
    }
}
