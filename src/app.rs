use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};

use crate::cli::args::PeriodArg;
use crate::cli::{Cli, Commands};
use crate::consts::DATE_FORMAT;
use crate::core::{
    DateFilter, Goal, LoadResult, PeriodWindow, SessionFilter, ViewMode, active_goals,
    filter_groups_by_range, goal_progress, group_by_user, overlaps_period, paginate, period_stats,
    stack_sessions, tracker_summary,
};
use crate::error::AppError;
use crate::output::{
    ReportOptions, StackTableOptions, SummaryOptions, current_session, format_statusline,
    output_groups_csv, output_groups_json, output_stack_csv, output_stack_json, output_stats_csv,
    output_stats_json, output_summary_csv, output_summary_json, print_group_table,
    print_period_stats, print_stack_table, print_tracker_summary, statusline_json,
};
use crate::source::remote::DEFAULT_CACHE_TTL_SECS;
use crate::source::{Source, SourceSettings, load_sessions};
use crate::utils::{Timezone, parse_date, parse_timestamp};

const DEFAULT_SOURCE: &str = "json";
const HOME_ENV: &str = "SESSIONSTACK_HOME";
const CACHE_DIR_ENV: &str = "SESSIONSTACK_CACHE_DIR";
/// Pins "now" (RFC 3339) for reproducible reports
const NOW_ENV: &str = "SESSIONSTACK_NOW";

pub(crate) struct CommandContext<'a> {
    pub(crate) cli: &'a Cli,
    pub(crate) filter: &'a DateFilter,
    pub(crate) session_filter: &'a SessionFilter,
    pub(crate) timezone: Timezone,
    pub(crate) anchor: NaiveDate,
    pub(crate) now: DateTime<Utc>,
    /// Goals from the config file
    pub(crate) goals: &'a [Goal],
}

impl CommandContext<'_> {
    fn report_options(&self) -> ReportOptions {
        ReportOptions {
            order: self.cli.order(),
            use_color: self.cli.use_color(),
            compact: self.cli.compact,
        }
    }

    fn period(&self, view: ViewMode) -> PeriodWindow {
        PeriodWindow::for_view(view, self.anchor, self.timezone)
    }
}

fn env_dir(var: &str) -> Option<PathBuf> {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// `$SESSIONSTACK_HOME`, else `~/.local/share/sessionstack`
fn data_dir() -> PathBuf {
    env_dir(HOME_ENV)
        .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share").join("sessionstack")))
        .unwrap_or_else(|| PathBuf::from(".sessionstack"))
}

/// `$SESSIONSTACK_CACHE_DIR`, else `~/.cache/sessionstack`
fn cache_dir() -> PathBuf {
    env_dir(CACHE_DIR_ENV)
        .or_else(|| dirs::home_dir().map(|h| h.join(".cache").join("sessionstack")))
        .unwrap_or_else(|| PathBuf::from(".sessionstack-cache"))
}

pub(crate) fn now() -> DateTime<Utc> {
    std::env::var(NOW_ENV)
        .ok()
        .and_then(|raw| parse_timestamp(&raw))
        .unwrap_or_else(Utc::now)
}

pub(crate) fn source_settings(cli: &Cli, cache_ttl_secs: Option<u64>, force_refresh: bool) -> SourceSettings {
    SourceSettings {
        input: cli.input.clone(),
        db: cli.db.as_ref().map(PathBuf::from),
        url: cli.url.clone(),
        api_key: cli.api_key.clone(),
        workspace: cli.workspace.clone(),
        data_dir: data_dir(),
        cache_dir: cache_dir(),
        cache_ttl_secs: cache_ttl_secs.unwrap_or(DEFAULT_CACHE_TTL_SECS),
        offline: cli.offline,
        force_refresh,
    }
}

pub(crate) fn source_name(cli: &Cli) -> &str {
    cli.source.as_deref().unwrap_or(DEFAULT_SOURCE)
}

/// Date range from `--since`/`--until`
pub(crate) fn date_filter(cli: &Cli) -> Result<DateFilter, AppError> {
    let since = cli.since.as_deref().map(parse_date).transpose()?;
    let until = cli.until.as_deref().map(parse_date).transpose()?;
    Ok(DateFilter::new(since, until))
}

pub(crate) fn session_filter(cli: &Cli) -> SessionFilter {
    SessionFilter {
        search: cli.search.clone().filter(|s| !s.trim().is_empty()),
        category_id: cli.category.clone(),
        duration: cli.duration.map(Into::into),
        time_of_day: cli.time_of_day.map(Into::into),
        context: cli.context.map(Into::into),
    }
}

/// `--date`, or today in the viewer's timezone
pub(crate) fn anchor_date(cli: &Cli, tz: Timezone, now: DateTime<Utc>) -> Result<NaiveDate, AppError> {
    match cli.date.as_deref() {
        Some(raw) => parse_date(raw),
        None => Ok(tz.local_date(now)),
    }
}

/// Load from the source, then apply the session filters
fn load(source: &dyn Source, ctx: &CommandContext<'_>) -> Result<LoadResult, AppError> {
    let mut result = load_sessions(source, ctx.filter, ctx.timezone, ctx.now)?;
    if !ctx.session_filter.is_empty() {
        let before = result.sessions.len();
        result.sessions = ctx.session_filter.apply(result.sessions, ctx.timezone, ctx.now);
        debug!("Session filters kept {} of {}", result.sessions.len(), before);
    }
    result.valid = result.sessions.len() as i64;
    Ok(result)
}

fn summary_options(result: &LoadResult) -> SummaryOptions {
    SummaryOptions {
        valid: result.valid,
        skipped: result.skipped,
        elapsed_ms: Some(result.elapsed_ms),
    }
}

fn stats_title(view: ViewMode, period: PeriodWindow, tz: Timezone) -> String {
    let (first, last) = period.local_dates(tz);
    match view {
        ViewMode::Day => first.format("%A, %B %-d, %Y").to_string(),
        ViewMode::Week => format!(
            "Week {} - {}",
            first.format(DATE_FORMAT),
            last.format(DATE_FORMAT)
        ),
        ViewMode::Month => first.format("%B %Y").to_string(),
    }
}

fn handle_stack(source: &dyn Source, ctx: &CommandContext<'_>, expand: bool) -> Result<(), AppError> {
    let result = load(source, ctx)?;
    let view = ctx.cli.view();
    let period = ctx.period(view);
    let stacks = stack_sessions(&result.sessions, view, period, ctx.timezone, ctx.now);
    debug!("Built {} stacks for the {} view", stacks.len(), view.label());

    if ctx.cli.json {
        println!(
            "{}",
            output_stack_json(&stacks, view, ctx.anchor, period, ctx.cli.order(), ctx.timezone)
        );
    } else if ctx.cli.csv {
        print!("{}", output_stack_csv(&stacks, view, ctx.anchor, ctx.cli.order()));
    } else {
        print_stack_table(
            &stacks,
            summary_options(&result),
            StackTableOptions {
                view,
                anchor: ctx.anchor,
                order: ctx.cli.order(),
                use_color: ctx.cli.use_color(),
                compact: ctx.cli.compact,
                expand,
                timezone: ctx.timezone,
            },
        );
    }
    Ok(())
}

fn handle_summary(source: &dyn Source, ctx: &CommandContext<'_>) -> Result<(), AppError> {
    let result = load(source, ctx)?;
    let summary = tracker_summary(&result.sessions, ctx.timezone, ctx.now);

    let mut goals = ctx.goals.to_vec();
    goals.extend(source.load_goals()?);
    let goals = goal_progress(&active_goals(goals, &result.sessions), &summary);
    debug!("Tracking {} goals", goals.len());

    if ctx.cli.json {
        println!("{}", output_summary_json(&summary, &goals));
    } else if ctx.cli.csv {
        print!("{}", output_summary_csv(&summary, ctx.cli.order()));
    } else {
        print_tracker_summary(&summary, &goals, summary_options(&result), ctx.report_options());
    }
    Ok(())
}

fn handle_groups(
    source: &dyn Source,
    ctx: &CommandContext<'_>,
    period: PeriodArg,
    page: usize,
    limit: usize,
) -> Result<(), AppError> {
    let result = load(source, ctx)?;
    let groups = group_by_user(&result.sessions, period.unit(), ctx.timezone, ctx.now);
    let groups = filter_groups_by_range(groups, ctx.filter);
    let page = paginate(groups, page, limit)?;

    if ctx.cli.json {
        println!("{}", output_groups_json(&page));
    } else if ctx.cli.csv {
        print!("{}", output_groups_csv(&page));
    } else {
        print_group_table(
            &page,
            summary_options(&result),
            ctx.cli.use_color(),
            ctx.cli.compact,
        );
    }
    Ok(())
}

fn handle_stats(source: &dyn Source, ctx: &CommandContext<'_>) -> Result<(), AppError> {
    let result = load(source, ctx)?;
    let view = ctx.cli.view();
    let period = ctx.period(view);
    let sessions: Vec<_> = result
        .sessions
        .iter()
        .filter(|s| overlaps_period(s, &period, ctx.now))
        .cloned()
        .collect();
    let stats = period_stats(&sessions, period, ctx.timezone, ctx.now);

    if ctx.cli.json {
        println!("{}", output_stats_json(&stats, view, period));
    } else if ctx.cli.csv {
        print!("{}", output_stats_csv(&stats, ctx.cli.order()));
    } else {
        print_period_stats(
            &stats,
            &stats_title(view, period, ctx.timezone),
            summary_options(&result),
            ctx.report_options(),
        );
    }
    Ok(())
}

fn handle_statusline(source: &dyn Source, ctx: &CommandContext<'_>) -> Result<(), AppError> {
    let result = load(source, ctx)?;
    let summary = tracker_summary(&result.sessions, ctx.timezone, ctx.now);
    let running = current_session(&result.sessions);

    if ctx.cli.json {
        println!("{}", statusline_json(&summary, running, ctx.now));
    } else {
        println!("{}", format_statusline(&summary, running, ctx.now));
    }
    Ok(())
}

/// Refresh the remote cache and report how many rows it holds
fn handle_sync(source: &dyn Source) -> Result<(), AppError> {
    if source.name() != "remote" {
        return Err(AppError::SyncUnsupported {
            source_name: source.name(),
        });
    }
    let mut synced = 0;
    let mut skipped = 0;
    for path in source.find_files()? {
        let parsed = source.parse_file(&path)?;
        synced += parsed.sessions.len();
        skipped += parsed.skipped;
        info!("Cache at {}", path.display());
    }
    println!("Synced {synced} sessions ({skipped} rows skipped)");
    Ok(())
}

/// Run a command against a source
pub(crate) fn run_command(
    source: &dyn Source,
    command: &Commands,
    ctx: &CommandContext<'_>,
) -> Result<(), AppError> {
    match command {
        Commands::Stack { expand } => handle_stack(source, ctx, *expand),
        Commands::Summary => handle_summary(source, ctx),
        Commands::Groups {
            period,
            page,
            limit,
        } => handle_groups(source, ctx, *period, *page, *limit),
        Commands::Stats => handle_stats(source, ctx),
        Commands::Statusline => handle_statusline(source, ctx),
        Commands::Sync => handle_sync(source),
    }
}
