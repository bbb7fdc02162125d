//! Session filters applied before any report is built

use chrono::{DateTime, Timelike, Utc};
use serde::Serialize;

use crate::core::period::PeriodWindow;
use crate::core::types::Session;
use crate::utils::Timezone;

const SHORT_BELOW_SECONDS: i64 = 30 * 60;
const MEDIUM_BELOW_SECONDS: i64 = 2 * 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DurationClass {
    Short,
    Medium,
    Long,
}

impl DurationClass {
    pub(crate) fn of(seconds: i64) -> Self {
        if seconds < SHORT_BELOW_SECONDS {
            DurationClass::Short
        } else if seconds < MEDIUM_BELOW_SECONDS {
            DurationClass::Medium
        } else {
            DurationClass::Long
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub(crate) fn of_hour(hour: u32) -> Self {
        match hour {
            6..=11 => TimeOfDay::Morning,
            12..=17 => TimeOfDay::Afternoon,
            18..=23 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    pub(crate) fn of_instant(instant: DateTime<Utc>, tz: Timezone) -> Self {
        Self::of_hour(tz.to_fixed_offset(instant).hour())
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProjectContext {
    ProjectWork,
    Meetings,
    Learning,
    Administrative,
    General,
}

impl ProjectContext {
    pub(crate) fn of(session: &Session) -> Self {
        if session.task_id.is_some() {
            return ProjectContext::ProjectWork;
        }
        let category = session
            .category_name()
            .map(str::to_lowercase)
            .unwrap_or_default();
        if category.contains("meeting") {
            ProjectContext::Meetings
        } else if category.contains("learn") {
            ProjectContext::Learning
        } else if category.contains("admin") {
            ProjectContext::Administrative
        } else {
            ProjectContext::General
        }
    }
}

/// Combined filter; unset criteria match everything
#[derive(Debug, Clone, Default)]
pub(crate) struct SessionFilter {
    pub(crate) search: Option<String>,
    pub(crate) category_id: Option<String>,
    pub(crate) duration: Option<DurationClass>,
    pub(crate) time_of_day: Option<TimeOfDay>,
    pub(crate) context: Option<ProjectContext>,
}

impl SessionFilter {
    pub(crate) fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.category_id.is_none()
            && self.duration.is_none()
            && self.time_of_day.is_none()
            && self.context.is_none()
    }

    pub(crate) fn matches(&self, session: &Session, tz: Timezone, now: DateTime<Utc>) -> bool {
        if let Some(needle) = self.search.as_deref().map(str::to_lowercase)
            && !needle.is_empty()
        {
            let in_title = session.title.to_lowercase().contains(&needle);
            let in_description = session
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle));
            if !in_title && !in_description {
                return false;
            }
        }
        if let Some(category) = &self.category_id
            && session.category_id.as_ref() != Some(category)
        {
            return false;
        }
        if let Some(class) = self.duration
            && DurationClass::of(session.effective_duration(now)) != class
        {
            return false;
        }
        if let Some(slot) = self.time_of_day
            && TimeOfDay::of_instant(session.start_time, tz) != slot
        {
            return false;
        }
        if let Some(context) = self.context
            && ProjectContext::of(session) != context
        {
            return false;
        }
        true
    }

    pub(crate) fn apply(&self, sessions: Vec<Session>, tz: Timezone, now: DateTime<Utc>) -> Vec<Session> {
        if self.is_empty() {
            return sessions;
        }
        sessions
            .into_iter()
            .filter(|s| self.matches(s, tz, now))
            .collect()
    }
}

/// Whether the session's interval (running through `now`) touches the period
pub(crate) fn overlaps_period(session: &Session, period: &PeriodWindow, now: DateTime<Utc>) -> bool {
    period.overlaps(session.start_time, session.effective_end(now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::CategoryRef;
    use crate::core::types::fixtures::{session, ts};

    fn utc() -> Timezone {
        Timezone::Named(chrono_tz::UTC)
    }

    fn now() -> DateTime<Utc> {
        ts("2025-01-10T00:00:00Z")
    }

    fn with_category(name: &str) -> Session {
        let mut s = session("a", "Sync", "2025-01-06T09:00:00Z", Some("2025-01-06T10:00:00Z"));
        s.category_id = Some("c1".into());
        s.category = Some(CategoryRef {
            id: Some("c1".into()),
            name: name.into(),
            color: None,
        });
        s
    }

    #[test]
    fn duration_class_boundaries() {
        assert_eq!(DurationClass::of(29 * 60), DurationClass::Short);
        assert_eq!(DurationClass::of(30 * 60), DurationClass::Medium);
        assert_eq!(DurationClass::of(2 * 3600 - 1), DurationClass::Medium);
        assert_eq!(DurationClass::of(2 * 3600), DurationClass::Long);
    }

    #[test]
    fn time_of_day_boundaries() {
        assert_eq!(TimeOfDay::of_hour(5), TimeOfDay::Night);
        assert_eq!(TimeOfDay::of_hour(6), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::of_hour(12), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::of_hour(18), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::of_hour(0), TimeOfDay::Night);
    }

    #[test]
    fn time_of_day_uses_viewer_timezone() {
        let tokyo = Timezone::parse(Some("Asia/Tokyo")).unwrap();
        // 01:00 UTC is 10:00 in Tokyo
        let instant = ts("2025-01-06T01:00:00Z");
        assert_eq!(TimeOfDay::of_instant(instant, utc()), TimeOfDay::Night);
        assert_eq!(TimeOfDay::of_instant(instant, tokyo), TimeOfDay::Morning);
    }

    #[test]
    fn project_context_from_task_or_category() {
        let mut s = with_category("Team Meetings");
        assert_eq!(ProjectContext::of(&s), ProjectContext::Meetings);
        s.task_id = Some("t1".into());
        assert_eq!(ProjectContext::of(&s), ProjectContext::ProjectWork);
        assert_eq!(ProjectContext::of(&with_category("Learning")), ProjectContext::Learning);
        assert_eq!(ProjectContext::of(&with_category("Admin")), ProjectContext::Administrative);
        assert_eq!(ProjectContext::of(&with_category("Deep work")), ProjectContext::General);
    }

    #[test]
    fn search_matches_title_and_description() {
        let mut s = session("a", "Write report", "2025-01-06T09:00:00Z", None);
        s.description = Some("Quarterly numbers".into());
        let by_title = SessionFilter {
            search: Some("REPORT".into()),
            ..Default::default()
        };
        let by_description = SessionFilter {
            search: Some("quarterly".into()),
            ..Default::default()
        };
        let miss = SessionFilter {
            search: Some("invoice".into()),
            ..Default::default()
        };
        assert!(by_title.matches(&s, utc(), now()));
        assert!(by_description.matches(&s, utc(), now()));
        assert!(!miss.matches(&s, utc(), now()));
    }

    #[test]
    fn criteria_combine() {
        let s = with_category("Meetings");
        let filter = SessionFilter {
            category_id: Some("c1".into()),
            duration: Some(DurationClass::Medium),
            time_of_day: Some(TimeOfDay::Morning),
            ..Default::default()
        };
        assert!(filter.matches(&s, utc(), now()));

        let wrong_category = SessionFilter {
            category_id: Some("c2".into()),
            ..filter.clone()
        };
        assert!(!wrong_category.matches(&s, utc(), now()));
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let sessions = vec![
            session("a", "One", "2025-01-06T09:00:00Z", None),
            session("b", "Two", "2025-01-06T10:00:00Z", None),
        ];
        let filter = SessionFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(sessions, utc(), now()).len(), 2);
    }

    #[test]
    fn overlaps_period_counts_running_session() {
        let period = PeriodWindow {
            start: ts("2025-01-08T00:00:00Z"),
            end: ts("2025-01-09T00:00:00Z"),
        };
        let running = session("a", "Long haul", "2025-01-06T09:00:00Z", None);
        let finished = session("b", "Done", "2025-01-06T09:00:00Z", Some("2025-01-06T10:00:00Z"));
        assert!(overlaps_period(&running, &period, now()));
        assert!(!overlaps_period(&finished, &period, now()));
    }
}
