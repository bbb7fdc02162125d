//! Stacked session report
//!
//! Stacks are grouped into sections: one for the day view, one per day for
//! the week view and one per ISO week for the month view.

use chrono::{Duration, NaiveDate};
use comfy_table::{Cell, Color, Table};

use crate::cli::SortOrder;
use crate::core::{GapKind, StackedSession, ViewMode, week_start};
use crate::output::format::{
    SummaryOptions, category_color, color_if, create_styled_table, header_cell, print_summary_line,
    right_cell, styled_cell, time_range,
};
use crate::utils::{Timezone, format_duration, format_gap};

/// Stacks sharing one section heading
pub(crate) struct StackSection<'a> {
    pub(crate) label: String,
    pub(crate) date: NaiveDate,
    pub(crate) stacks: Vec<&'a StackedSession>,
    pub(crate) total: i64,
}

/// Heading for the section starting at `date`
pub(crate) fn section_label(view: ViewMode, date: NaiveDate) -> String {
    match view {
        ViewMode::Day => "Sessions".to_string(),
        ViewMode::Week => date.format("%A, %B %-d, %Y").to_string(),
        ViewMode::Month => {
            let start = week_start(date);
            let end = start + Duration::days(6);
            format!("Week {} - {}", start.format("%b %-d"), end.format("%b %-d"))
        }
    }
}

fn section_date(view: ViewMode, stack: &StackedSession, anchor: NaiveDate) -> NaiveDate {
    match view {
        ViewMode::Day => anchor,
        ViewMode::Week => stack.display_date,
        ViewMode::Month => week_start(stack.display_date),
    }
}

/// Group stacks into sections, ordered by `order` both between sections and
/// within each one.
pub(crate) fn build_sections<'a>(
    stacks: &'a [StackedSession],
    view: ViewMode,
    anchor: NaiveDate,
    order: SortOrder,
) -> Vec<StackSection<'a>> {
    let mut sections: Vec<StackSection<'a>> = Vec::new();
    for stack in stacks {
        let date = section_date(view, stack, anchor);
        match sections.iter_mut().find(|s| s.date == date) {
            Some(section) => {
                section.total += stack.period_duration;
                section.stacks.push(stack);
            }
            None => sections.push(StackSection {
                label: section_label(view, date),
                date,
                stacks: vec![stack],
                total: stack.period_duration,
            }),
        }
    }

    sections.sort_by_key(|s| s.date);
    for section in &mut sections {
        section
            .stacks
            .sort_by(|a, b| a.first_start_time.cmp(&b.first_start_time).then_with(|| a.id.cmp(&b.id)));
    }
    if order == SortOrder::Desc {
        sections.reverse();
        for section in &mut sections {
            section.stacks.reverse();
        }
    }
    sections
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct StackTableOptions {
    pub(crate) view: ViewMode,
    pub(crate) anchor: NaiveDate,
    pub(crate) order: SortOrder,
    pub(crate) use_color: bool,
    pub(crate) compact: bool,
    pub(crate) expand: bool,
    pub(crate) timezone: Timezone,
}

fn column_count(compact: bool) -> usize {
    if compact { 3 } else { 6 }
}

fn build_header(options: &StackTableOptions) -> Vec<Cell> {
    let names: &[&str] = if options.compact {
        &["Time", "Title", "Duration"]
    } else {
        &["Time", "Title", "Category", "Task", "Sessions", "Duration"]
    };
    names.iter().map(|n| header_cell(n, options.use_color)).collect()
}

/// Fill a detail row out to the table width
fn padded(mut row: Vec<Cell>, width: usize) -> Vec<Cell> {
    while row.len() < width {
        row.push(Cell::new(""));
    }
    row
}

fn add_stack_row(table: &mut Table, stack: &StackedSession, options: &StackTableOptions) {
    let time = time_range(stack.first_start_time, stack.last_end_time, options.timezone);
    let running = color_if(options.use_color, Color::Green);
    let time_cell = if stack.is_running() {
        styled_cell(&time, running, true)
    } else {
        Cell::new(&time)
    };
    let duration = right_cell(&format_duration(stack.period_duration), None, false);

    if options.compact {
        table.add_row(vec![time_cell, Cell::new(&stack.title), duration]);
        return;
    }

    let category_cell = match &stack.category {
        Some(category) => styled_cell(
            &category.name,
            category_color(category.color.as_deref(), options.use_color),
            false,
        ),
        None => Cell::new(""),
    };
    table.add_row(vec![
        time_cell,
        Cell::new(&stack.title),
        category_cell,
        Cell::new(stack.task_name().unwrap_or("")),
        right_cell(&stack.sessions.len().to_string(), None, false),
        duration,
    ]);
}

fn add_detail_rows(table: &mut Table, stack: &StackedSession, options: &StackTableOptions) {
    let width = column_count(options.compact);
    let dim = color_if(options.use_color, Color::DarkGrey);
    let warn = color_if(options.use_color, Color::Yellow);
    let gaps = stack.gaps();

    for (index, session) in stack.sessions.iter().enumerate() {
        if let Some(gap) = gaps.iter().find(|g| g.before_index == index) {
            let text = match gap.kind {
                GapKind::Overlap => format!("  ! {} overlap", format_gap(-gap.seconds)),
                _ => format!("  · {} gap", format_gap(gap.seconds)),
            };
            let color = if gap.kind == GapKind::Overlap { warn } else { dim };
            table.add_row(padded(vec![styled_cell(&text, color, false)], width));
        }

        let time = time_range(session.start_time, session.end_time, options.timezone);
        let mut row = vec![
            styled_cell(&format!("  ↳ {time}"), dim, false),
            styled_cell(session.description.as_deref().unwrap_or(""), dim, false),
        ];
        row = padded(row, width - 1);
        let duration = session.duration_seconds.map(format_duration).unwrap_or_default();
        row.push(right_cell(&duration, dim, false));
        table.add_row(row);
    }
}

fn add_total_row(table: &mut Table, total: i64, options: &StackTableOptions) {
    let cyan = color_if(options.use_color, Color::Cyan);
    let width = column_count(options.compact);
    let mut row = padded(vec![styled_cell("TOTAL", cyan, true)], width - 1);
    row.push(right_cell(&format_duration(total), cyan, true));
    table.add_row(row);
}

pub(crate) fn print_stack_table(
    stacks: &[StackedSession],
    load: SummaryOptions,
    options: StackTableOptions,
) {
    let sections = build_sections(stacks, options.view, options.anchor, options.order);
    if sections.is_empty() {
        println!("\n  No sessions in this {}\n", options.view.label());
    }

    for section in &sections {
        let mut table = create_styled_table();
        table.set_header(build_header(&options));
        for stack in &section.stacks {
            add_stack_row(&mut table, stack, &options);
            if options.expand {
                add_detail_rows(&mut table, stack, &options);
            }
        }
        add_total_row(&mut table, section.total, &options);

        println!("\n  {}\n", section.label);
        println!("{table}");
    }

    print_summary_line(load, options.use_color);
}
