//! CLI argument definitions
//!
//! Global CLI options and configuration merging logic.

use std::io::IsTerminal;

use clap::{Parser, ValueEnum};

use crate::config::{Config, ConfigColorMode, ConfigSortOrder, ConfigView};
use crate::core::{DurationClass, PeriodUnit, ProjectContext, TimeOfDay, ViewMode};

use super::commands::Commands;

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub(crate) enum SortOrder {
    /// Oldest first (default)
    #[default]
    Asc,
    /// Newest first
    Desc,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq)]
pub(crate) enum ColorMode {
    /// Auto-detect based on terminal (default)
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Calendar unit selectable on the command line
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub(crate) enum PeriodArg {
    Day,
    /// ISO week, Monday first (default)
    #[default]
    Week,
    Month,
}

impl PeriodArg {
    pub(crate) fn view(self) -> ViewMode {
        match self {
            PeriodArg::Day => ViewMode::Day,
            PeriodArg::Week => ViewMode::Week,
            PeriodArg::Month => ViewMode::Month,
        }
    }

    pub(crate) fn unit(self) -> PeriodUnit {
        self.view().unit()
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub(crate) enum DurationArg {
    /// Under 30 minutes
    Short,
    /// 30 minutes to 2 hours
    Medium,
    /// 2 hours or more
    Long,
}

impl From<DurationArg> for DurationClass {
    fn from(arg: DurationArg) -> Self {
        match arg {
            DurationArg::Short => DurationClass::Short,
            DurationArg::Medium => DurationClass::Medium,
            DurationArg::Long => DurationClass::Long,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub(crate) enum TimeOfDayArg {
    /// 06:00-12:00
    Morning,
    /// 12:00-18:00
    Afternoon,
    /// 18:00-24:00
    Evening,
    /// 00:00-06:00
    Night,
}

impl From<TimeOfDayArg> for TimeOfDay {
    fn from(arg: TimeOfDayArg) -> Self {
        match arg {
            TimeOfDayArg::Morning => TimeOfDay::Morning,
            TimeOfDayArg::Afternoon => TimeOfDay::Afternoon,
            TimeOfDayArg::Evening => TimeOfDay::Evening,
            TimeOfDayArg::Night => TimeOfDay::Night,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub(crate) enum ContextArg {
    /// Linked to a task
    ProjectWork,
    /// Category name mentions meetings
    Meetings,
    /// Category name mentions learning
    Learning,
    /// Category name mentions admin
    Administrative,
    /// Everything else
    General,
}

impl From<ContextArg> for ProjectContext {
    fn from(arg: ContextArg) -> Self {
        match arg {
            ContextArg::ProjectWork => ProjectContext::ProjectWork,
            ContextArg::Meetings => ProjectContext::Meetings,
            ContextArg::Learning => ProjectContext::Learning,
            ContextArg::Administrative => ProjectContext::Administrative,
            ContextArg::General => ProjectContext::General,
        }
    }
}

#[derive(Parser)]
#[command(name = "sessionstack")]
#[command(about = "Stacked time-tracking session reports", version)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Option<Commands>,

    /// Session source: json, sqlite or remote (aliases: file, db, supabase)
    #[arg(long, global = true, value_name = "NAME")]
    pub(crate) source: Option<String>,

    /// Glob of JSON/JSONL exports for the json source
    #[arg(long, global = true, value_name = "GLOB")]
    pub(crate) input: Option<String>,

    /// SQLite database for the sqlite source
    #[arg(long, global = true, value_name = "PATH")]
    pub(crate) db: Option<String>,

    /// Base URL of the remote REST endpoint
    #[arg(long, global = true, value_name = "URL")]
    pub(crate) url: Option<String>,

    /// API key for the remote endpoint
    #[arg(long, global = true, value_name = "KEY")]
    pub(crate) api_key: Option<String>,

    /// Workspace whose sessions the remote source reads
    #[arg(long, global = true, value_name = "ID")]
    pub(crate) workspace: Option<String>,

    /// Use cached remote sessions only (never fetch)
    #[arg(short = 'O', long, global = true)]
    pub(crate) offline: bool,

    /// Period shown by stack and stats
    #[arg(long, global = true, value_enum)]
    pub(crate) view: Option<PeriodArg>,

    /// Anchor date of the period (YYYYMMDD or YYYY-MM-DD, default today)
    #[arg(long, global = true, value_name = "DATE")]
    pub(crate) date: Option<String>,

    /// Timezone for day boundaries and display (e.g., "Europe/Berlin", "UTC")
    #[arg(long, global = true, value_name = "TZ")]
    pub(crate) timezone: Option<String>,

    /// Filter from date (YYYYMMDD or YYYY-MM-DD)
    #[arg(short, long, global = true)]
    pub(crate) since: Option<String>,

    /// Filter until date (YYYYMMDD or YYYY-MM-DD)
    #[arg(short, long, global = true)]
    pub(crate) until: Option<String>,

    /// Case-insensitive search in titles and descriptions
    #[arg(long, global = true, value_name = "TEXT")]
    pub(crate) search: Option<String>,

    /// Only sessions in this category id
    #[arg(long, global = true, value_name = "ID")]
    pub(crate) category: Option<String>,

    /// Only sessions of this length class
    #[arg(long, global = true, value_enum)]
    pub(crate) duration: Option<DurationArg>,

    /// Only sessions starting in this part of the day
    #[arg(long, global = true, value_enum)]
    pub(crate) time_of_day: Option<TimeOfDayArg>,

    /// Only sessions in this project context
    #[arg(long, global = true, value_enum)]
    pub(crate) context: Option<ContextArg>,

    /// Output as JSON
    #[arg(short, long, global = true, conflicts_with = "csv")]
    pub(crate) json: bool,

    /// Output as CSV
    #[arg(long, global = true)]
    pub(crate) csv: bool,

    /// Sort order for results [default: asc]
    #[arg(short, long, global = true, value_enum)]
    pub(crate) order: Option<SortOrder>,

    /// Color output mode [default: auto]
    #[arg(long, global = true, value_enum)]
    pub(crate) color: Option<ColorMode>,

    /// Disable colored output (shorthand for --color=never)
    #[arg(long, global = true)]
    pub(crate) no_color: bool,

    /// Compact output (fewer columns, no breakdown tables)
    #[arg(short = 'c', long, global = true)]
    pub(crate) compact: bool,

    /// Enable debug output (show processing details)
    #[arg(long, global = true)]
    pub(crate) debug: bool,
}

impl Cli {
    /// Merge config file values into CLI (CLI args take precedence)
    pub(crate) fn with_config(mut self, config: &Config) -> Self {
        // For boolean flags, config only applies if CLI is false (default)
        if !self.offline && config.offline {
            self.offline = true;
        }
        if !self.compact && config.compact {
            self.compact = true;
        }
        if !self.no_color && config.no_color {
            self.no_color = true;
        }
        if !self.debug && config.debug {
            self.debug = true;
        }

        // Enum values only apply when the flag was not given
        if self.order.is_none() {
            self.order = config.order.map(|order| match order {
                ConfigSortOrder::Asc => SortOrder::Asc,
                ConfigSortOrder::Desc => SortOrder::Desc,
            });
        }
        if self.color.is_none() {
            self.color = config.color.map(|color| match color {
                ConfigColorMode::Auto => ColorMode::Auto,
                ConfigColorMode::Always => ColorMode::Always,
                ConfigColorMode::Never => ColorMode::Never,
            });
        }
        if self.view.is_none() {
            self.view = config.view.map(|view| match view {
                ConfigView::Day => PeriodArg::Day,
                ConfigView::Week => PeriodArg::Week,
                ConfigView::Month => PeriodArg::Month,
            });
        }

        // String options: only apply if CLI didn't set them
        fill(&mut self.source, &config.source);
        fill(&mut self.input, &config.input);
        fill(&mut self.db, &config.db);
        fill(&mut self.url, &config.url);
        fill(&mut self.api_key, &config.api_key);
        fill(&mut self.workspace, &config.workspace);
        fill(&mut self.timezone, &config.timezone);

        self
    }

    pub(crate) fn use_color(&self) -> bool {
        if self.no_color {
            return false;
        }
        match self.color.unwrap_or_default() {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => std::io::stdout().is_terminal(),
        }
    }

    pub(crate) fn order(&self) -> SortOrder {
        self.order.unwrap_or_default()
    }

    pub(crate) fn view(&self) -> ViewMode {
        self.view.unwrap_or_default().view()
    }
}

fn fill(target: &mut Option<String>, fallback: &Option<String>) {
    if target.is_none() {
        target.clone_from(fallback);
    }
}
