//! Unified session loader for all sources

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info};

use crate::core::{DateFilter, DedupAccumulator, LoadResult, Session, session_dates};
use crate::error::AppError;
use crate::source::Source;
use crate::utils::Timezone;

/// Per-file partial result merged across rayon workers
#[derive(Default)]
struct Partial {
    sessions: DedupAccumulator<Session>,
    unparseable: i64,
}

impl Partial {
    fn merge(mut self, other: Partial) -> Partial {
        self.sessions.merge(other.sessions);
        self.unparseable += other.unparseable;
        self
    }
}

/// Load sessions from a source
struct DataLoader<'a> {
    source: &'a dyn Source,
}

impl<'a> DataLoader<'a> {
    fn new(source: &'a dyn Source) -> Self {
        Self { source }
    }

    /// Parallel pipeline: discover, parse, dedup per file, then merge.
    fn par_process(&self) -> Result<Option<(Partial, usize)>, AppError> {
        let discovery_start = Instant::now();
        let files = self.source.find_files()?;
        let discovery_ms = discovery_start.elapsed().as_secs_f64() * 1000.0;

        if files.is_empty() {
            info!("No {} files found", self.source.display_name());
            return Ok(None);
        }

        info!(
            "Scanning {} {} files... ({:.2}ms)",
            files.len(),
            self.source.display_name(),
            discovery_ms
        );

        let file_count = files.len();
        let parse_start = Instant::now();
        let merged = files
            .par_iter()
            .map(|path| {
                let parsed = self.source.parse_file(path)?;
                debug!(
                    file = %path.display(),
                    sessions = parsed.sessions.len(),
                    skipped = parsed.skipped,
                    "parsed"
                );
                let mut partial = Partial::default();
                partial.sessions.extend(parsed.sessions);
                partial.unparseable = parsed.skipped;
                Ok::<_, AppError>(partial)
            })
            .try_reduce(Partial::default, |acc, partial| Ok(acc.merge(partial)))?;

        info!(
            "Parsed {} files ({:.2}ms)",
            file_count,
            parse_start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(Some((merged, file_count)))
    }

    fn load(&self, filter: &DateFilter, tz: Timezone, now: DateTime<Utc>) -> Result<LoadResult, AppError> {
        let load_start = Instant::now();
        let Some((partial, _)) = self.par_process()? else {
            return Ok(LoadResult::default());
        };

        let (unique, duplicates) = partial.sessions.finalize();
        let mut sessions: Vec<Session> = if filter.is_unbounded() {
            unique
        } else {
            unique
                .into_iter()
                .filter(|s| {
                    let (first, last) = session_dates(s, tz, now);
                    filter.overlaps(first, last)
                })
                .collect()
        };
        sessions.sort_by(|a, b| a.start_time.cmp(&b.start_time).then_with(|| a.id.cmp(&b.id)));

        let skipped = partial.unparseable + duplicates;
        if duplicates > 0 {
            info!("Deduplicated {} session rows", duplicates);
        }
        debug!("Processed {} sessions, {} skipped", sessions.len(), skipped);

        Ok(LoadResult {
            valid: sessions.len() as i64,
            sessions,
            skipped,
            elapsed_ms: load_start.elapsed().as_secs_f64() * 1000.0,
        })
    }
}

/// Load, deduplicate and date-filter the sessions of a source.
///
/// Sessions are kept when any local day they touch lies in `filter`; they
/// come back ordered by start time.
pub(crate) fn load_sessions(
    source: &dyn Source,
    filter: &DateFilter,
    tz: Timezone,
    now: DateTime<Utc>,
) -> Result<LoadResult, AppError> {
    DataLoader::new(source).load(filter, tz, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::json::JsonSource;
    use chrono::NaiveDate;
    use std::fs;

    fn utc() -> Timezone {
        Timezone::Named(chrono_tz::UTC)
    }

    fn now() -> DateTime<Utc> {
        "2025-01-10T00:00:00Z".parse().unwrap()
    }

    fn fixture_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.jsonl"),
            concat!(
                r#"{"id":"s1","title":"A","start_time":"2025-01-06T09:00:00Z"}"#, "\n",
                r#"{"id":"s2","title":"B","start_time":"2025-01-07T09:00:00Z","end_time":"2025-01-07T10:00:00Z","duration_seconds":3600}"#, "\n",
                "garbage\n",
            ),
        )
        .unwrap();
        fs::write(
            dir.path().join("b.json"),
            r#"[{"id":"s1","title":"A","start_time":"2025-01-06T09:00:00Z","end_time":"2025-01-06T09:30:00Z","duration_seconds":1800,"is_running":false}]"#,
        )
        .unwrap();
        dir
    }

    #[test]
    fn loads_dedups_and_counts_skips() {
        let dir = fixture_dir();
        let source = JsonSource::new(format!("{}/*.json*", dir.path().display()));
        let result = load_sessions(&source, &DateFilter::default(), utc(), now()).unwrap();

        assert_eq!(result.valid, 2);
        // one garbage line + one duplicate
        assert_eq!(result.skipped, 2);
        let s1 = &result.sessions[0];
        assert_eq!(s1.id, "s1");
        assert!(!s1.is_running, "completed row wins over running row");
    }

    #[test]
    fn date_filter_uses_local_days() {
        let dir = fixture_dir();
        let source = JsonSource::new(format!("{}/*.json*", dir.path().display()));
        let day = NaiveDate::from_ymd_opt(2025, 1, 7).unwrap();
        let filter = DateFilter::new(Some(day), Some(day));
        let result = load_sessions(&source, &filter, utc(), now()).unwrap();
        assert_eq!(result.sessions.len(), 1);
        assert_eq!(result.sessions[0].id, "s2");
    }

    #[test]
    fn empty_source_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonSource::new(format!("{}/*.jsonl", dir.path().display()));
        let result = load_sessions(&source, &DateFilter::default(), utc(), now()).unwrap();
        assert!(result.sessions.is_empty());
    }
}
