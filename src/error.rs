use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("Invalid date \"{input}\" (expected YYYYMMDD or YYYY-MM-DD)")]
    InvalidDate { input: String },

    #[error("Invalid timezone: {input}")]
    InvalidTimezone { input: String },

    #[error("Unknown source \"{input}\" (expected json, sqlite or remote)")]
    UnknownSource { input: String },

    #[error("Source {source_name} requires {setting}")]
    MissingSetting {
        source_name: &'static str,
        setting: &'static str,
    },

    #[error("The {source_name} source has no cache to sync (use --source remote)")]
    SyncUnsupported { source_name: &'static str },

    #[error("Invalid page {page} (pages start at 1, limit must be positive)")]
    InvalidPage { page: usize },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("{0}")]
    Fetch(#[from] FetchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub(crate) enum FetchError {
    #[error("Remote request failed after {attempts} attempts: {message}")]
    Exhausted { attempts: usize, message: String },

    #[error("No cached sessions at {path} (run without --offline or `sessionstack sync`)")]
    NoCache { path: String },
}
