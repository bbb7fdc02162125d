//! CLI subcommand definitions

use clap::Subcommand;

use super::args::PeriodArg;

/// Main CLI commands
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum Commands {
    /// Stack sessions by title, category and task for the selected period (default)
    Stack {
        /// List the sessions inside each stack, with gaps and overlaps
        #[arg(short, long)]
        expand: bool,
    },
    /// Today, week and month totals, streak and daily activity
    Summary,
    /// Sessions grouped per user and period, paginated
    Groups {
        /// Grouping period
        #[arg(long, value_enum, default_value = "day")]
        period: PeriodArg,
        /// Page number (1-based)
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Groups per page
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Statistics for the selected period
    Stats,
    /// Output single line for statusline/tmux integration
    Statusline,
    /// Refresh the remote session cache
    Sync,
}

impl Commands {
    /// Check if this is a statusline command (requires quiet mode)
    pub(crate) fn is_statusline(&self) -> bool {
        matches!(self, Commands::Statusline)
    }
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Stack { expand: false }
    }
}
