//! Session source registry
//!
//! Maps `--source` names and aliases to constructors.

use std::path::PathBuf;
use std::time::Duration;

use super::json::JsonSource;
use super::remote::RemoteSource;
use super::sqlite::SqliteSource;
use super::BoxedSource;
use crate::error::AppError;

/// Everything a source may need, resolved from CLI, config and environment
#[derive(Debug, Clone, Default)]
pub(crate) struct SourceSettings {
    pub(crate) input: Option<String>,
    pub(crate) db: Option<PathBuf>,
    pub(crate) url: Option<String>,
    pub(crate) api_key: Option<String>,
    pub(crate) workspace: Option<String>,
    pub(crate) data_dir: PathBuf,
    pub(crate) cache_dir: PathBuf,
    pub(crate) cache_ttl_secs: u64,
    pub(crate) offline: bool,
    pub(crate) force_refresh: bool,
}

struct SourceSpec {
    name: &'static str,
    aliases: &'static [&'static str],
    build: fn(&SourceSettings) -> Result<BoxedSource, AppError>,
}

/// All registered sources
static SOURCES: &[SourceSpec] = &[
    SourceSpec {
        name: "json",
        aliases: &["file"],
        build: build_json,
    },
    SourceSpec {
        name: "sqlite",
        aliases: &["db"],
        build: build_sqlite,
    },
    SourceSpec {
        name: "remote",
        aliases: &["supabase"],
        build: build_remote,
    },
];

fn build_json(settings: &SourceSettings) -> Result<BoxedSource, AppError> {
    let pattern = settings
        .input
        .clone()
        .unwrap_or_else(|| JsonSource::default_pattern(&settings.data_dir));
    Ok(Box::new(JsonSource::new(pattern)))
}

fn build_sqlite(settings: &SourceSettings) -> Result<BoxedSource, AppError> {
    let path = settings.db.clone().ok_or(AppError::MissingSetting {
        source_name: "sqlite",
        setting: "--db <PATH>",
    })?;
    Ok(Box::new(SqliteSource::new(path)))
}

fn build_remote(settings: &SourceSettings) -> Result<BoxedSource, AppError> {
    let missing = |setting| AppError::MissingSetting {
        source_name: "remote",
        setting,
    };
    let workspace = settings.workspace.clone().ok_or_else(|| missing("--workspace <ID>"))?;
    // Offline runs only read the cache and need no endpoint
    let (url, api_key) = if settings.offline {
        (
            settings.url.clone().unwrap_or_default(),
            settings.api_key.clone().unwrap_or_default(),
        )
    } else {
        (
            settings.url.clone().ok_or_else(|| missing("--url <URL>"))?,
            settings.api_key.clone().ok_or_else(|| missing("--api-key <KEY>"))?,
        )
    };
    let source = RemoteSource::new(
        url,
        api_key,
        workspace,
        &settings.cache_dir,
        Duration::from_secs(settings.cache_ttl_secs),
    )
    .offline(settings.offline)
    .force_refresh(settings.force_refresh);
    Ok(Box::new(source))
}

fn find_spec(name: &str) -> Option<&'static SourceSpec> {
    let name_lower = name.trim().to_lowercase();
    SOURCES
        .iter()
        .find(|s| s.name == name_lower || s.aliases.contains(&name_lower.as_str()))
}

/// Build a source by name or alias
pub(crate) fn build_source(name: &str, settings: &SourceSettings) -> Result<BoxedSource, AppError> {
    let spec = find_spec(name).ok_or_else(|| AppError::UnknownSource {
        input: name.to_string(),
    })?;
    (spec.build)(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::source::Source;

    #[test]
    fn lookup_by_name_and_alias() {
        let settings = SourceSettings {
            db: Some(PathBuf::from("tracker.db")),
            workspace: Some("ws".into()),
            offline: true,
            ..Default::default()
        };
        for (name, expected) in [
            ("json", "json"),
            ("FILE", "json"),
            ("db", "sqlite"),
            ("sqlite", "sqlite"),
            ("supabase", "remote"),
        ] {
            assert_eq!(build_source(name, &settings).unwrap().name(), expected);
        }
    }

    #[test]
    fn unknown_source_is_an_error() {
        let err = build_source("csv", &SourceSettings::default()).err().unwrap();
        assert!(matches!(err, AppError::UnknownSource { .. }));
    }

    #[test]
    fn sqlite_requires_db_path() {
        let err = build_source("sqlite", &SourceSettings::default()).err().unwrap();
        assert_eq!(err.to_string(), "Source sqlite requires --db <PATH>");
    }

    #[test]
    fn remote_requires_endpoint_unless_offline() {
        let mut settings = SourceSettings {
            workspace: Some("ws".into()),
            ..Default::default()
        };
        let err = build_source("remote", &settings).err().unwrap();
        assert!(err.to_string().contains("--url"));

        settings.offline = true;
        let source = build_source("remote", &settings).unwrap();
        assert_eq!(source.name(), "remote");
    }

    #[test]
    fn json_is_the_default_shape() {
        let source = build_source("file", &SourceSettings::default()).unwrap();
        assert_eq!(source.name(), "json");
    }
}
