//! Session source abstraction layer
//!
//! Each backend (JSON exports, a SQLite database, a REST endpoint) implements
//! the Source trait so reports never care where rows came from.

pub(crate) mod json;
pub(crate) mod loader;
pub(crate) mod record;
pub(crate) mod registry;
pub(crate) mod remote;
pub(crate) mod sqlite;

use std::path::{Path, PathBuf};

use crate::core::{Goal, Session};
use crate::error::AppError;

/// Sessions parsed from one file, plus how many rows were unusable
#[derive(Debug, Default)]
pub(crate) struct ParsedFile {
    pub(crate) sessions: Vec<Session>,
    pub(crate) skipped: i64,
}

impl ParsedFile {
    /// Normalize records, counting the ones that fail
    pub(crate) fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = record::SessionRecord>,
    {
        let mut parsed = ParsedFile::default();
        for record in records {
            match record.into_session() {
                Some(session) => parsed.sessions.push(session),
                None => parsed.skipped += 1,
            }
        }
        parsed
    }
}

/// Session source trait - implemented by each backend
pub(crate) trait Source: Send + Sync {
    /// Unique name for this source (used by `--source`)
    fn name(&self) -> &'static str;

    /// Display name for progress output
    fn display_name(&self) -> &'static str {
        self.name()
    }

    /// Locate the files to parse. Remote sources refresh their cache here.
    fn find_files(&self) -> Result<Vec<PathBuf>, AppError>;

    /// Parse a single file into sessions
    fn parse_file(&self, path: &Path) -> Result<ParsedFile, AppError>;

    /// Time goals stored alongside the sessions, if the backend has any
    fn load_goals(&self) -> Result<Vec<Goal>, AppError> {
        Ok(Vec::new())
    }
}

/// Box type for dynamic dispatch
pub(crate) type BoxedSource = Box<dyn Source>;

pub(crate) use loader::load_sessions;
pub(crate) use registry::{SourceSettings, build_source};
