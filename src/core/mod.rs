//! Core module - session types and the pure transforms every report uses

mod dedup;
mod filter;
mod goal;
mod group;
mod period;
mod stack;
mod stats;
mod types;

pub(crate) use dedup::DedupAccumulator;
pub(crate) use filter::{DurationClass, ProjectContext, SessionFilter, TimeOfDay, overlaps_period};
pub(crate) use goal::{Goal, GoalProgress, active_goals, goal_progress};
pub(crate) use group::{
    GroupStatus, Page, SessionGroup, filter_groups_by_range, group_by_user, paginate, period_range,
};
pub(crate) use period::{PeriodUnit, PeriodWindow, ViewMode, session_dates, week_start};
pub(crate) use stack::stack_sessions;
pub(crate) use stats::{DayBreakdown, PeriodStats, TrackerSummary, period_stats, tracker_summary};
pub(crate) use types::{
    CategoryRef, DateFilter, GapKind, LoadResult, Session, StackedSession, TaskRef, UserRef,
};

#[cfg(test)]
pub(crate) use types::fixtures;
