mod app;
mod cli;
mod config;
mod consts;
mod core;
mod error;
mod logging;
mod output;
mod source;
mod utils;

use clap::Parser;
use tracing::debug;

use app::{
    CommandContext, anchor_date, date_filter, now, run_command, session_filter, source_name,
    source_settings,
};
use cli::{Cli, Commands};
use config::Config;
use error::AppError;
use source::build_source;
use utils::Timezone;

fn run(cli: Cli, config: &Config) -> Result<(), AppError> {
    let command = cli.command.clone().unwrap_or_default();
    let timezone = Timezone::parse(cli.timezone.as_deref())?;
    let now = now();
    let filter = date_filter(&cli)?;
    let session_filter = session_filter(&cli);
    let anchor = anchor_date(&cli, timezone, now)?;

    let force_refresh = matches!(command, Commands::Sync);
    let settings = source_settings(&cli, config.cache_ttl_secs, force_refresh);
    let source = build_source(source_name(&cli), &settings)?;
    debug!(
        source = source.name(),
        timezone = %timezone.label(),
        anchor = %anchor,
        "resolved settings"
    );

    let ctx = CommandContext {
        cli: &cli,
        filter: &filter,
        session_filter: &session_filter,
        timezone,
        anchor,
        now,
        goals: &config.goals,
    };
    run_command(source.as_ref(), &command, &ctx)
}

fn main() {
    let cli = Cli::parse();
    let (config, notes) = Config::load();
    let cli = cli.with_config(&config);

    logging::init_logging(cli.debug);
    let quiet = cli.command.as_ref().is_some_and(Commands::is_statusline);
    if !quiet {
        for note in &notes {
            note.log();
        }
    }

    if let Err(e) = run(cli, &config) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
