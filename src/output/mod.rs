mod csv;
mod format;
mod groups;
mod json;
mod stack;
mod statusline;
mod stats;
mod summary;

pub(crate) use csv::{output_groups_csv, output_stack_csv, output_stats_csv, output_summary_csv};
pub(crate) use format::{ReportOptions, SummaryOptions};
pub(crate) use groups::print_group_table;
pub(crate) use json::{output_groups_json, output_stack_json, output_stats_json, output_summary_json};
pub(crate) use stack::{StackTableOptions, print_stack_table};
pub(crate) use statusline::{current_session, format_statusline, statusline_json};
pub(crate) use stats::print_period_stats;
pub(crate) use summary::print_tracker_summary;
