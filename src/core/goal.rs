//! Daily and weekly time goals
//!
//! Goals come from the config file and from sources that store them. A goal
//! with a category only counts time tracked in that category; one without
//! counts everything. Progress is whole minutes tracked over the goal, capped
//! at 100%.

use serde::{Deserialize, Serialize};

use crate::core::stats::TrackerSummary;
use crate::core::types::{CategoryRef, Session};

/// Daily goal used when no active goal is configured
pub(crate) const DEFAULT_DAILY_GOAL_MINUTES: i64 = 8 * 60;

/// Working days a default weekly goal spans
const DEFAULT_WORK_DAYS: i64 = 5;

fn active_by_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Goal {
    #[serde(default)]
    pub(crate) id: Option<String>,
    #[serde(default)]
    pub(crate) category_id: Option<String>,
    #[serde(default)]
    pub(crate) category: Option<CategoryRef>,
    pub(crate) daily_goal_minutes: i64,
    #[serde(default)]
    pub(crate) weekly_goal_minutes: Option<i64>,
    #[serde(default = "active_by_default")]
    pub(crate) is_active: bool,
}

impl Goal {
    /// The all-categories goal shown when nothing else is set
    fn fallback() -> Self {
        Goal {
            id: None,
            category_id: None,
            category: None,
            daily_goal_minutes: DEFAULT_DAILY_GOAL_MINUTES,
            weekly_goal_minutes: Some(DEFAULT_DAILY_GOAL_MINUTES * DEFAULT_WORK_DAYS),
            is_active: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct GoalProgress {
    pub(crate) category_id: Option<String>,
    /// Category name, `None` for an all-categories goal
    pub(crate) category: Option<String>,
    pub(crate) daily_goal_minutes: i64,
    pub(crate) weekly_goal_minutes: Option<i64>,
    pub(crate) today_seconds: i64,
    pub(crate) week_seconds: i64,
    pub(crate) daily_progress: f64,
    pub(crate) weekly_progress: Option<f64>,
}

/// Percent of `goal_minutes` reached, counting whole minutes only
pub(crate) fn progress_percent(actual_seconds: i64, goal_minutes: i64) -> f64 {
    if goal_minutes <= 0 {
        return 0.0;
    }
    let actual_minutes = actual_seconds.max(0) / 60;
    (actual_minutes as f64 / goal_minutes as f64 * 100.0).min(100.0)
}

/// Active goals with a positive daily target, or the fallback goal when none
/// qualify. Goals missing a category name borrow it from a session in that
/// category.
pub(crate) fn active_goals(goals: Vec<Goal>, sessions: &[Session]) -> Vec<Goal> {
    let mut active: Vec<Goal> = goals
        .into_iter()
        .filter(|g| g.is_active && g.daily_goal_minutes > 0)
        .collect();
    if active.is_empty() {
        return vec![Goal::fallback()];
    }

    for goal in &mut active {
        if goal.category.is_some() {
            continue;
        }
        let Some(category_id) = goal.category_id.as_deref() else {
            continue;
        };
        goal.category = sessions
            .iter()
            .find(|s| s.category_id.as_deref() == Some(category_id))
            .and_then(|s| s.category.clone());
    }
    active
}

/// Progress of each goal against today's and this week's tracked time
pub(crate) fn goal_progress(goals: &[Goal], summary: &TrackerSummary) -> Vec<GoalProgress> {
    let breakdown = &summary.category_breakdown;
    goals
        .iter()
        .map(|goal| {
            let (today, week) = match goal.category_id.as_deref() {
                Some(id) => (
                    breakdown.today.get(id).copied().unwrap_or(0),
                    breakdown.week.get(id).copied().unwrap_or(0),
                ),
                None => (summary.today_time, summary.week_time),
            };
            let weekly = goal.weekly_goal_minutes.filter(|m| *m > 0);
            GoalProgress {
                category_id: goal.category_id.clone(),
                category: goal
                    .category
                    .as_ref()
                    .map(|c| c.name.clone())
                    .or_else(|| goal.category_id.clone()),
                daily_goal_minutes: goal.daily_goal_minutes,
                weekly_goal_minutes: weekly,
                today_seconds: today,
                week_seconds: week,
                daily_progress: progress_percent(today, goal.daily_goal_minutes),
                weekly_progress: weekly.map(|m| progress_percent(week, m)),
            }
        })
        .collect()
}
