use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::error::AppError;

/// On-disk copy of the last successful fetch for one workspace
#[derive(Debug, Clone)]
pub(super) struct RemoteCache {
    path: PathBuf,
}

impl RemoteCache {
    pub(super) fn new(cache_dir: &Path, workspace: &str) -> Self {
        let safe: String = workspace
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        Self {
            path: cache_dir.join(format!("sessions-{safe}.json")),
        }
    }

    pub(super) fn path(&self) -> &Path {
        &self.path
    }

    pub(super) fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Age of the cache when it is younger than `ttl`
    pub(super) fn fresh_age(&self, ttl: Duration) -> Option<Duration> {
        let modified = std::fs::metadata(&self.path).ok()?.modified().ok()?;
        let age = SystemTime::now().duration_since(modified).ok()?;
        (age <= ttl).then_some(age)
    }

    pub(super) fn save(&self, rows: &serde_json::Value) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer(&mut writer, rows)?;
        writer.flush()?;
        Ok(())
    }
}
