use chrono::{DateTime, Utc};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ContentArrangement, Table, TableComponent,
    modifiers::UTF8_SOLID_INNER_BORDERS, presets::UTF8_FULL,
};

use crate::cli::SortOrder;
use crate::utils::Timezone;

/// Load counters shown under every table report
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SummaryOptions {
    pub(crate) valid: i64,
    pub(crate) skipped: i64,
    pub(crate) elapsed_ms: Option<f64>,
}

/// Presentation flags shared by the table reports
#[derive(Debug, Clone, Copy)]
pub(crate) struct ReportOptions {
    pub(crate) order: SortOrder,
    pub(crate) use_color: bool,
    pub(crate) compact: bool,
}

pub(super) fn styled_cell(text: &str, color: Option<Color>, bold: bool) -> Cell {
    let mut cell = Cell::new(text);
    if let Some(c) = color {
        cell = cell.fg(c);
    }
    if bold {
        cell = cell.add_attribute(Attribute::Bold);
    }
    cell
}

pub(super) fn header_cell(text: &str, use_color: bool) -> Cell {
    let mut cell = Cell::new(text).add_attribute(Attribute::Bold);
    if use_color {
        cell = cell.fg(Color::Cyan);
    }
    cell
}

/// Replace the double-line header separator (╞═╪═╡) with single-line (├─┼─┤)
fn normalize_header_separator(table: &mut Table) {
    table.set_style(TableComponent::HeaderLines, '─');
    table.set_style(TableComponent::LeftHeaderIntersection, '├');
    table.set_style(TableComponent::MiddleHeaderIntersections, '┼');
    table.set_style(TableComponent::RightHeaderIntersection, '┤');
}

/// Create a table with the standard preset, inner borders, and normalized header separator.
pub(super) fn create_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    normalize_header_separator(&mut table);
    table
}

pub(super) fn right_cell(text: &str, color: Option<Color>, bold: bool) -> Cell {
    let mut cell = Cell::new(text).set_alignment(CellAlignment::Right);
    if let Some(c) = color {
        cell = cell.fg(c);
    }
    if bold {
        cell = cell.add_attribute(Attribute::Bold);
    }
    cell
}

pub(super) fn color_if(use_color: bool, color: Color) -> Option<Color> {
    use_color.then_some(color)
}

/// Local wall-clock time, `HH:MM`
pub(super) fn clock(ts: DateTime<Utc>, tz: Timezone) -> String {
    tz.to_fixed_offset(ts).format("%H:%M").to_string()
}

/// `09:00 - 10:30`, or `09:00 - now` for a running session
pub(super) fn time_range(start: DateTime<Utc>, end: Option<DateTime<Utc>>, tz: Timezone) -> String {
    match end {
        Some(end) => format!("{} - {}", clock(start, tz), clock(end, tz)),
        None => format!("{} - now", clock(start, tz)),
    }
}

/// Render a `#RRGGBB` category color as a terminal color
pub(super) fn category_color(color: Option<&str>, use_color: bool) -> Option<Color> {
    if !use_color {
        return None;
    }
    let hex = color?.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color::Rgb {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}

/// Footer printed under every table report
pub(super) fn print_summary_line(summary: SummaryOptions, use_color: bool) {
    let stats_text = format!(
        "{} sessions ({} rows skipped)",
        summary.valid, summary.skipped
    );

    if let Some(ms) = summary.elapsed_ms {
        if use_color {
            println!("\n  {} | \x1b[36m{:.0}ms\x1b[0m\n", stats_text, ms);
        } else {
            println!("\n  {} | {:.0}ms\n", stats_text, ms);
        }
    } else {
        println!("\n  {}\n", stats_text);
    }
}
