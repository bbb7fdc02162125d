use comfy_table::{Cell, Color};

use crate::cli::SortOrder;
use crate::consts::DATE_FORMAT;
use crate::core::PeriodStats;
use crate::output::format::{
    ReportOptions, SummaryOptions, category_color, color_if, create_styled_table, header_cell,
    print_summary_line, right_cell, styled_cell,
};
use crate::utils::format_duration;

/// Share of `part` in `total` as a whole percentage
fn percent(part: i64, total: i64) -> String {
    if total <= 0 {
        return "0%".to_string();
    }
    format!("{:.0}%", part as f64 / total as f64 * 100.0)
}

pub(crate) fn print_period_stats(
    stats: &PeriodStats,
    title: &str,
    load: SummaryOptions,
    options: ReportOptions,
) {
    let ReportOptions {
        order,
        use_color,
        compact,
    } = options;
    let cyan = color_if(use_color, Color::Cyan);

    let mut overview = create_styled_table();
    overview.set_header(vec![header_cell("Metric", use_color), header_cell("Value", use_color)]);
    overview.add_row(vec![
        Cell::new("Total time"),
        right_cell(&format_duration(stats.total_duration), cyan, true),
    ]);
    overview.add_row(vec![
        Cell::new("Sessions"),
        right_cell(&stats.session_count.to_string(), None, false),
    ]);
    overview.add_row(vec![
        Cell::new("Average"),
        right_cell(&format_duration(stats.average_duration), None, false),
    ]);
    if let Some(longest) = &stats.longest {
        overview.add_row(vec![
            Cell::new("Longest"),
            right_cell(
                &format!("{} ({})", longest.title, format_duration(longest.duration)),
                None,
                false,
            ),
        ]);
    }
    if let Some(best) = stats.best_time_of_day {
        overview.add_row(vec![Cell::new("Best time of day"), right_cell(best.label(), None, false)]);
    }

    println!("\n  {title}\n");
    println!("{overview}");

    if !compact && !stats.categories.is_empty() {
        let mut table = create_styled_table();
        table.set_header(vec![
            header_cell("Category", use_color),
            header_cell("Sessions", use_color),
            header_cell("Duration", use_color),
            header_cell("Share", use_color),
        ]);
        for category in &stats.categories {
            table.add_row(vec![
                styled_cell(
                    &category.name,
                    category_color(category.color.as_deref(), use_color),
                    false,
                ),
                right_cell(&category.sessions.to_string(), None, false),
                right_cell(&format_duration(category.duration), None, false),
                right_cell(&percent(category.duration, stats.total_duration), None, false),
            ]);
        }
        println!("\n  By category\n");
        println!("{table}");
    }

    if !compact && !stats.days.is_empty() {
        let mut days: Vec<_> = stats.days.iter().collect();
        if order == SortOrder::Desc {
            days.reverse();
        }
        let mut table = create_styled_table();
        table.set_header(vec![
            header_cell("Date", use_color),
            header_cell("Sessions", use_color),
            header_cell("Duration", use_color),
        ]);
        for day in days {
            table.add_row(vec![
                Cell::new(day.date.format(DATE_FORMAT)),
                right_cell(&day.sessions.to_string(), None, false),
                right_cell(&format_duration(day.duration), None, false),
            ]);
        }
        println!("\n  By day\n");
        println!("{table}");
    }

    print_summary_line(load, use_color);
}
