use std::fmt::Write;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::cli::SortOrder;
use crate::consts::DATE_FORMAT;
use crate::core::{
    GroupStatus, Page, PeriodStats, SessionGroup, StackedSession, TrackerSummary, ViewMode,
    period_range,
};
use crate::output::stack::build_sections;
use crate::utils::hours;

fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

fn date(d: NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

pub(crate) fn output_stack_csv(
    stacks: &[StackedSession],
    view: ViewMode,
    anchor: NaiveDate,
    order: SortOrder,
) -> String {
    let mut out = String::from(
        "section,date,title,category,task,sessions,first_start,last_end,period_seconds,total_seconds,period_hours,running\n",
    );
    for section in build_sections(stacks, view, anchor, order) {
        for stack in &section.stacks {
            let _ = write!(
                out,
                "{},{},{},{},{},{},{},{},{},{},{},{}",
                csv_escape(&section.label),
                date(stack.display_date),
                csv_escape(&stack.title),
                csv_escape(stack.category_name().unwrap_or("")),
                csv_escape(stack.task_name().unwrap_or("")),
                stack.sessions.len(),
                timestamp(Some(stack.first_start_time)),
                timestamp(stack.last_end_time),
                stack.period_duration,
                stack.total_duration,
                hours(stack.period_duration),
                stack.is_running(),
            );
            out.push('\n');
        }
    }
    out
}

/// One row per total, category and day, distinguished by `kind`
pub(crate) fn output_stats_csv(stats: &PeriodStats, order: SortOrder) -> String {
    let mut out = String::from("kind,key,sessions,duration_seconds,hours\n");
    let _ = writeln!(
        out,
        "total,,{},{},{}",
        stats.session_count,
        stats.total_duration,
        hours(stats.total_duration)
    );
    for category in &stats.categories {
        let _ = writeln!(
            out,
            "category,{},{},{},{}",
            csv_escape(&category.name),
            category.sessions,
            category.duration,
            hours(category.duration)
        );
    }
    let mut days: Vec<_> = stats.days.iter().collect();
    if order == SortOrder::Desc {
        days.reverse();
    }
    for day in days {
        let _ = writeln!(
            out,
            "day,{},{},{},{}",
            date(day.date),
            day.sessions,
            day.duration,
            hours(day.duration)
        );
    }
    out
}

pub(crate) fn output_summary_csv(summary: &TrackerSummary, order: SortOrder) -> String {
    let mut out = String::from("date,sessions,duration_seconds,hours\n");
    let mut days: Vec<_> = summary.daily_activity.iter().collect();
    if order == SortOrder::Desc {
        days.reverse();
    }
    for day in days {
        let _ = writeln!(
            out,
            "{},{},{},{}",
            date(day.date),
            day.sessions,
            day.duration,
            hours(day.duration)
        );
    }
    out
}

pub(crate) fn output_groups_csv(page: &Page<SessionGroup>) -> String {
    let mut out = String::from(
        "period,period_start,period_end,user_id,user,title,sessions,first_start,last_end,period_seconds,total_seconds,status\n",
    );
    for group in &page.data {
        let (first, last) = period_range(group);
        let status = match group.status {
            GroupStatus::Active => "active",
            GroupStatus::Paused => "paused",
            GroupStatus::Completed => "completed",
        };
        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{},{},{},{},{},{}",
            group.period,
            date(first),
            date(last),
            csv_escape(group.user.id.as_deref().unwrap_or("")),
            csv_escape(group.user.display_name.as_deref().unwrap_or("")),
            csv_escape(&group.title),
            group.session_count,
            timestamp(Some(group.first_start_time)),
            timestamp(group.last_end_time),
            group.period_duration,
            group.total_duration,
            status,
        );
    }
    out
}
