//! Management groups: sessions per user per day, week or month

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashMap;

use crate::consts::{NONE_KEY, UNKNOWN_USER};
use crate::core::period::{Bucket, PeriodUnit, session_dates};
use crate::core::types::{DateFilter, Session};
use crate::error::AppError;
use crate::utils::Timezone;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum GroupStatus {
    Active,
    Paused,
    Completed,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct GroupUser {
    pub(crate) id: Option<String>,
    pub(crate) display_name: Option<String>,
    pub(crate) avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SessionGroup {
    pub(crate) title: String,
    /// `YYYY-MM-DD` for days and weeks (Monday), `YYYY-MM` for months
    pub(crate) period: String,
    #[serde(skip)]
    pub(crate) bucket: Bucket,
    pub(crate) user: GroupUser,
    pub(crate) sessions: Vec<Session>,
    pub(crate) session_count: usize,
    pub(crate) session_titles: Vec<String>,
    pub(crate) total_duration: i64,
    pub(crate) period_duration: i64,
    pub(crate) first_start_time: DateTime<Utc>,
    pub(crate) last_end_time: Option<DateTime<Utc>>,
    pub(crate) status: GroupStatus,
}

impl SessionGroup {
    fn new(bucket: Bucket, session: &Session) -> Self {
        let display_name = session.user_name().map(str::to_string);
        let title = format!(
            "{} - {}",
            display_name.as_deref().unwrap_or(UNKNOWN_USER),
            bucket.key()
        );
        SessionGroup {
            title,
            period: bucket.key(),
            bucket,
            user: GroupUser {
                id: session.user_id.clone(),
                display_name,
                avatar_url: session.user.as_ref().and_then(|u| u.avatar_url.clone()),
            },
            sessions: Vec::new(),
            session_count: 0,
            session_titles: Vec::new(),
            total_duration: 0,
            period_duration: 0,
            first_start_time: session.start_time,
            last_end_time: session.end_time,
            status: GroupStatus::Completed,
        }
    }

    fn add(&mut self, session: &Session, in_period: i64, now: DateTime<Utc>) {
        // A session spanning several periods is counted once per group
        if !self.sessions.iter().any(|s| s.id == session.id) {
            self.total_duration += session.effective_duration(now);
            self.sessions.push(session.clone());
            self.session_count = self.sessions.len();
        }
        self.period_duration += in_period;

        if !session.title.is_empty() && !self.session_titles.contains(&session.title) {
            self.session_titles.push(session.title.clone());
        }
        self.first_start_time = self.first_start_time.min(session.start_time);
        if let Some(end) = session.end_time
            && self.last_end_time.is_none_or(|last| end > last)
        {
            self.last_end_time = Some(end);
        }
        if session.is_running {
            self.status = GroupStatus::Active;
        } else if session.is_paused() && self.status == GroupStatus::Completed {
            self.status = GroupStatus::Paused;
        }
    }
}

/// Periods a session spans. Day periods follow the local days it touches;
/// week and month periods run from the one containing its start through the
/// one containing its end.
fn session_buckets(
    session: &Session,
    unit: PeriodUnit,
    tz: Timezone,
    now: DateTime<Utc>,
) -> Vec<Bucket> {
    let (first, last) = session_dates(session, tz, now);
    Bucket::range(unit, first, last)
}

/// Group sessions by `(period, user)`. Overnight and multi-period sessions
/// are split; periods a session does not actually overlap are skipped.
/// Groups are ordered newest period first, then by user name.
pub(crate) fn group_by_user(
    sessions: &[Session],
    unit: PeriodUnit,
    tz: Timezone,
    now: DateTime<Utc>,
) -> Vec<SessionGroup> {
    let mut groups: HashMap<(Bucket, String), SessionGroup> = HashMap::new();

    for session in sessions {
        let end = session.effective_end(now);
        let total = session.effective_duration(now);
        for bucket in session_buckets(session, unit, tz, now) {
            let clipped = bucket.window(tz).clip_seconds(session.start_time, end);
            if clipped <= 0 {
                continue;
            }
            // Paused time is not recorded; a period never gets more than the session total
            let in_period = clipped.min(total);
            let user_key = session.user_id.clone().unwrap_or_else(|| NONE_KEY.to_string());
            groups
                .entry((bucket, user_key))
                .or_insert_with(|| SessionGroup::new(bucket, session))
                .add(session, in_period, now);
        }
    }

    let mut result: Vec<SessionGroup> = groups.into_values().collect();
    result.sort_by(|a, b| {
        b.bucket
            .start
            .cmp(&a.bucket.start)
            .then_with(|| a.title.cmp(&b.title))
            .then_with(|| a.user.id.cmp(&b.user.id))
    });
    result
}

/// Keep groups whose period overlaps the inclusive date range
pub(crate) fn filter_groups_by_range(groups: Vec<SessionGroup>, range: &DateFilter) -> Vec<SessionGroup> {
    if range.is_unbounded() {
        return groups;
    }
    groups
        .into_iter()
        .filter(|g| range.overlaps(g.bucket.start, g.bucket.last_date()))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) struct Pagination {
    pub(crate) page: usize,
    pub(crate) limit: usize,
    pub(crate) total: usize,
    pub(crate) pages: usize,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Page<T> {
    pub(crate) data: Vec<T>,
    pub(crate) pagination: Pagination,
}

/// Slice out 1-based page `page` of `limit` items
pub(crate) fn paginate<T>(items: Vec<T>, page: usize, limit: usize) -> Result<Page<T>, AppError> {
    if page == 0 || limit == 0 {
        return Err(AppError::InvalidPage { page });
    }
    let total = items.len();
    let data = items
        .into_iter()
        .skip((page - 1).saturating_mul(limit))
        .take(limit)
        .collect();
    Ok(Page {
        data,
        pagination: Pagination {
            page,
            limit,
            total,
            pages: total.div_ceil(limit),
        },
    })
}

/// First and last local date covered by a group's period
pub(crate) fn period_range(group: &SessionGroup) -> (NaiveDate, NaiveDate) {
    (group.bucket.start, group.bucket.last_date())
}
