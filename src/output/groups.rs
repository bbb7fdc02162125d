use comfy_table::{Cell, Color};

use crate::core::{GroupStatus, Page, SessionGroup};
use crate::output::format::{
    SummaryOptions, color_if, create_styled_table, header_cell, print_summary_line, right_cell,
    styled_cell,
};
use crate::utils::format_duration;

/// Session titles joined for one cell, eliding past `max`
fn titles_text(titles: &[String], max: usize) -> String {
    if titles.len() <= max {
        return titles.join(", ");
    }
    format!("{}, +{} more", titles[..max].join(", "), titles.len() - max)
}

pub(crate) fn print_group_table(
    page: &Page<SessionGroup>,
    load: SummaryOptions,
    use_color: bool,
    compact: bool,
) {
    let green = color_if(use_color, Color::Green);
    let yellow = color_if(use_color, Color::Yellow);

    let mut table = create_styled_table();
    let mut header = vec![
        header_cell("Group", use_color),
        header_cell("Sessions", use_color),
        header_cell("Period", use_color),
        header_cell("Total", use_color),
        header_cell("Status", use_color),
    ];
    if !compact {
        header.insert(2, header_cell("Titles", use_color));
    }
    table.set_header(header);

    for group in &page.data {
        let status = match group.status {
            GroupStatus::Active => styled_cell("active", green, true),
            GroupStatus::Paused => styled_cell("paused", yellow, false),
            GroupStatus::Completed => Cell::new("completed"),
        };
        let mut row = vec![
            Cell::new(&group.title),
            right_cell(&group.session_count.to_string(), None, false),
            right_cell(&format_duration(group.period_duration), None, false),
            right_cell(&format_duration(group.total_duration), None, false),
            status,
        ];
        if !compact {
            row.insert(2, Cell::new(titles_text(&group.session_titles, 3)));
        }
        table.add_row(row);
    }

    let p = &page.pagination;
    println!("\n  Groups (page {} of {}, {} total)\n", p.page, p.pages.max(1), p.total);
    println!("{table}");
    print_summary_line(load, use_color);
}
