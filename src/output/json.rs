use chrono::NaiveDate;
use serde::Serialize;

use crate::cli::SortOrder;
use crate::core::{
    GoalProgress, Page, PeriodStats, PeriodWindow, SessionGroup, StackedSession, TrackerSummary,
    ViewMode,
};
use crate::output::stack::build_sections;
use crate::utils::Timezone;

fn to_pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Failed to serialize JSON output: {e}");
        "{}".to_string()
    })
}

fn stack_value(stack: &StackedSession) -> serde_json::Value {
    serde_json::json!({
        "id": stack.id,
        "title": stack.title,
        "description": stack.description,
        "category": stack.category,
        "task": stack.task,
        "display_date": stack.display_date,
        "session_count": stack.sessions.len(),
        "total_duration": stack.total_duration,
        "period_duration": stack.period_duration,
        "first_start_time": stack.first_start_time,
        "last_end_time": stack.last_end_time,
        "is_running": stack.is_running(),
        "sessions": stack.sessions,
        "gaps": stack.gaps(),
    })
}

pub(crate) fn output_stack_json(
    stacks: &[StackedSession],
    view: ViewMode,
    anchor: NaiveDate,
    period: PeriodWindow,
    order: SortOrder,
    tz: Timezone,
) -> String {
    let sections: Vec<serde_json::Value> = build_sections(stacks, view, anchor, order)
        .into_iter()
        .map(|section| {
            serde_json::json!({
                "label": section.label,
                "date": section.date,
                "total_duration": section.total,
                "stacks": section.stacks.iter().map(|s| stack_value(s)).collect::<Vec<_>>(),
            })
        })
        .collect();
    let total: i64 = stacks.iter().map(|s| s.period_duration).sum();

    let output = serde_json::json!({
        "view": view.label(),
        "date": anchor,
        "timezone": tz.label(),
        "period": {
            "start": period.start,
            "end": period.end,
        },
        "total_duration": total,
        "sections": sections,
    });
    to_pretty(&output)
}

pub(crate) fn output_stats_json(stats: &PeriodStats, view: ViewMode, period: PeriodWindow) -> String {
    let output = serde_json::json!({
        "view": view.label(),
        "period": {
            "start": period.start,
            "end": period.end,
        },
        "stats": stats,
    });
    to_pretty(&output)
}

#[derive(Serialize)]
struct SummaryReport<'a> {
    #[serde(flatten)]
    summary: &'a TrackerSummary,
    goals: &'a [GoalProgress],
}

pub(crate) fn output_summary_json(summary: &TrackerSummary, goals: &[GoalProgress]) -> String {
    to_pretty(&SummaryReport { summary, goals })
}

pub(crate) fn output_groups_json(page: &Page<SessionGroup>) -> String {
    to_pretty(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures::session;

    fn utc() -> Timezone {
        Timezone::Named(chrono_tz::UTC)
    }

    #[test]
    fn stack_json_has_sections_and_gaps() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let a = session("a", "Focus", "2025-01-06T09:00:00Z", Some("2025-01-06T10:00:00Z"));
        let b = session("b", "Focus", "2025-01-06T10:10:00Z", Some("2025-01-06T11:00:00Z"));
        let stacks = vec![StackedSession {
            id: "a".into(),
            title: "Focus".into(),
            description: None,
            category_id: None,
            category: None,
            task_id: None,
            task: None,
            total_duration: 6600,
            period_duration: 6600,
            first_start_time: a.start_time,
            last_end_time: b.end_time,
            display_date: day,
            sessions: vec![a, b],
        }];
        let period = PeriodWindow::for_view(ViewMode::Day, day, utc());
        let json = output_stack_json(&stacks, ViewMode::Day, day, period, SortOrder::Asc, utc());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["view"], "day");
        assert_eq!(value["total_duration"], 6600);
        let section = &value["sections"][0];
        assert_eq!(section["label"], "Sessions");
        assert_eq!(section["stacks"][0]["session_count"], 2);
        assert_eq!(section["stacks"][0]["gaps"][0]["kind"], "short");
        assert_eq!(section["stacks"][0]["gaps"][0]["seconds"], 600);
    }

    #[test]
    fn summary_json_fields() {
        let goals = vec![GoalProgress {
            category_id: None,
            category: None,
            daily_goal_minutes: 4,
            weekly_goal_minutes: None,
            today_seconds: 60,
            week_seconds: 60,
            daily_progress: 25.0,
            weekly_progress: None,
        }];
        let json = output_summary_json(
            &TrackerSummary {
                today_time: 60,
                streak: 2,
                ..Default::default()
            },
            &goals,
        );
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["today_time"], 60);
        assert_eq!(value["streak"], 2);
        assert!(value["daily_activity"].as_array().unwrap().is_empty());
        assert!(value["category_breakdown"]["today"].as_object().unwrap().is_empty());
        assert_eq!(value["goals"][0]["daily_progress"], 25.0);
        assert!(value["goals"][0]["weekly_progress"].is_null());
    }
}
