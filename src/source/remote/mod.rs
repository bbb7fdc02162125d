//! Remote REST source
//!
//! Pulls a workspace's sessions from a PostgREST-style endpoint and keeps the
//! last good response on disk. Reports always parse the cached file.

mod cache;
mod fetcher;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::error::{AppError, FetchError};
use crate::source::json::parse_json_file;
use crate::source::{ParsedFile, Source};

use cache::RemoteCache;
use fetcher::fetch_sessions_raw;

/// Seconds a cached response is reused before refetching
pub(crate) const DEFAULT_CACHE_TTL_SECS: u64 = 300;

pub(crate) struct RemoteSource {
    url: String,
    api_key: String,
    workspace: String,
    cache: RemoteCache,
    ttl: Duration,
    offline: bool,
    force_refresh: bool,
}

impl RemoteSource {
    pub(crate) fn new(
        url: String,
        api_key: String,
        workspace: String,
        cache_dir: &Path,
        ttl: Duration,
    ) -> Self {
        let cache = RemoteCache::new(cache_dir, &workspace);
        Self {
            url,
            api_key,
            workspace,
            cache,
            ttl,
            offline: false,
            force_refresh: false,
        }
    }

    pub(crate) fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub(crate) fn force_refresh(mut self, force: bool) -> Self {
        self.force_refresh = force;
        self
    }

    fn no_cache(&self) -> AppError {
        AppError::Fetch(FetchError::NoCache {
            path: self.cache.path().display().to_string(),
        })
    }

    /// Make sure the cache holds usable rows, fetching when needed.
    ///
    /// A failed fetch falls back to a stale cache when one exists.
    pub(crate) fn refresh(&self) -> Result<PathBuf, AppError> {
        let start = Instant::now();
        let path = self.cache.path().to_path_buf();

        if self.offline {
            if self.cache.exists() {
                info!("Using cached sessions (offline)");
                return Ok(path);
            }
            return Err(self.no_cache());
        }

        if !self.force_refresh
            && let Some(age) = self.cache.fresh_age(self.ttl)
        {
            info!("Using cached sessions ({}s old)", age.as_secs());
            return Ok(path);
        }

        info!(workspace = %self.workspace, "Fetching sessions from {}", self.url);
        match fetch_sessions_raw(&self.url, &self.api_key, &self.workspace) {
            Ok(rows) => {
                let count = rows.as_array().map_or(0, Vec::len);
                self.cache.save(&rows)?;
                info!(
                    "Fetched {} sessions ({:.2}ms)",
                    count,
                    start.elapsed().as_secs_f64() * 1000.0
                );
                Ok(path)
            }
            Err(err) if self.cache.exists() => {
                warn!("{err}; using stale cache");
                Ok(path)
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl Source for RemoteSource {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn display_name(&self) -> &'static str {
        "remote"
    }

    fn find_files(&self) -> Result<Vec<PathBuf>, AppError> {
        Ok(vec![self.refresh()?])
    }

    fn parse_file(&self, path: &Path) -> Result<ParsedFile, AppError> {
        Ok(parse_json_file(path))
    }
}
