use comfy_table::{Cell, Color};

use crate::cli::SortOrder;
use crate::consts::DATE_FORMAT;
use crate::core::{GoalProgress, TrackerSummary};
use crate::output::format::{
    ReportOptions, SummaryOptions, color_if, create_styled_table, header_cell, print_summary_line,
    right_cell, styled_cell,
};
use crate::utils::format_duration;

/// `25%`, rounded down so an unfinished goal never reads 100%
fn percent_text(progress: f64) -> String {
    format!("{}%", progress.floor() as i64)
}

/// `1h 00m / 4h 00m`
fn against_goal(seconds: i64, goal_minutes: i64) -> String {
    format!(
        "{} / {}",
        format_duration(seconds),
        format_duration(goal_minutes * 60)
    )
}

fn print_goals(goals: &[GoalProgress], use_color: bool) {
    let green = color_if(use_color, Color::Green);
    let done = |progress: f64| if progress >= 100.0 { green } else { None };

    let mut table = create_styled_table();
    table.set_header(vec![
        header_cell("Goal", use_color),
        header_cell("Today", use_color),
        header_cell("Daily", use_color),
        header_cell("This week", use_color),
        header_cell("Weekly", use_color),
    ]);
    for goal in goals {
        let (week, weekly) = match (goal.weekly_goal_minutes, goal.weekly_progress) {
            (Some(minutes), Some(progress)) => (
                right_cell(&against_goal(goal.week_seconds, minutes), None, false),
                right_cell(&percent_text(progress), done(progress), progress >= 100.0),
            ),
            _ => (
                right_cell(&format_duration(goal.week_seconds), None, false),
                right_cell("-", None, false),
            ),
        };
        table.add_row(vec![
            Cell::new(goal.category.as_deref().unwrap_or("All categories")),
            right_cell(
                &against_goal(goal.today_seconds, goal.daily_goal_minutes),
                None,
                false,
            ),
            right_cell(
                &percent_text(goal.daily_progress),
                done(goal.daily_progress),
                goal.daily_progress >= 100.0,
            ),
            week,
            weekly,
        ]);
    }
    println!("\n  Goals\n");
    println!("{table}");
}

fn streak_text(days: u32) -> String {
    match days {
        1 => "1 day".to_string(),
        n => format!("{n} days"),
    }
}

pub(crate) fn print_tracker_summary(
    summary: &TrackerSummary,
    goals: &[GoalProgress],
    load: SummaryOptions,
    options: ReportOptions,
) {
    let ReportOptions {
        order,
        use_color,
        compact,
    } = options;
    let cyan = color_if(use_color, Color::Cyan);
    let green = color_if(use_color, Color::Green);

    let mut table = create_styled_table();
    table.set_header(vec![header_cell("Period", use_color), header_cell("Time", use_color)]);
    table.add_row(vec![
        Cell::new("Today"),
        right_cell(&format_duration(summary.today_time), cyan, true),
    ]);
    table.add_row(vec![
        Cell::new("This week"),
        right_cell(&format_duration(summary.week_time), None, false),
    ]);
    table.add_row(vec![
        Cell::new("This month"),
        right_cell(&format_duration(summary.month_time), None, false),
    ]);
    table.add_row(vec![
        styled_cell("Streak", green, true),
        right_cell(&streak_text(summary.streak), green, true),
    ]);

    println!("\n  Tracker summary\n");
    println!("{table}");

    if !goals.is_empty() {
        print_goals(goals, use_color);
    }

    if !compact && !summary.daily_activity.is_empty() {
        let mut days: Vec<_> = summary.daily_activity.iter().collect();
        if order == SortOrder::Desc {
            days.reverse();
        }
        let mut activity = create_styled_table();
        activity.set_header(vec![
            header_cell("Date", use_color),
            header_cell("Sessions", use_color),
            header_cell("Duration", use_color),
        ]);
        for day in days {
            activity.add_row(vec![
                Cell::new(day.date.format(DATE_FORMAT)),
                right_cell(&day.sessions.to_string(), None, false),
                right_cell(&format_duration(day.duration), None, false),
            ]);
        }
        println!("\n  Daily activity\n");
        println!("{activity}");
    }

    print_summary_line(load, use_color);
}
