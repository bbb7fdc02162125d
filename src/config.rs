use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::core::Goal;

const APP_NAME: &str = "sessionstack";

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ConfigSortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ConfigColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ConfigView {
    Day,
    Week,
    Month,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Config {
    #[serde(default)]
    pub(crate) source: Option<String>,
    #[serde(default)]
    pub(crate) input: Option<String>,
    #[serde(default)]
    pub(crate) db: Option<String>,
    #[serde(default)]
    pub(crate) url: Option<String>,
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    #[serde(default)]
    pub(crate) workspace: Option<String>,
    #[serde(default)]
    pub(crate) timezone: Option<String>,
    #[serde(default)]
    pub(crate) view: Option<ConfigView>,
    #[serde(default)]
    pub(crate) order: Option<ConfigSortOrder>,
    #[serde(default)]
    pub(crate) color: Option<ConfigColorMode>,
    #[serde(default)]
    pub(crate) no_color: bool,
    #[serde(default)]
    pub(crate) compact: bool,
    #[serde(default)]
    pub(crate) offline: bool,
    #[serde(default)]
    pub(crate) debug: bool,
    /// Seconds a cached remote response stays fresh
    #[serde(default)]
    pub(crate) cache_ttl_secs: Option<u64>,
    /// `[[goals]]` tables, merged with goals stored by the source
    #[serde(default)]
    pub(crate) goals: Vec<Goal>,
}

impl Config {
    /// Load the first config file that parses. Logging is installed after
    /// the config is read, so the returned notes are emitted by the caller.
    pub(crate) fn load() -> (Self, Vec<ConfigNote>) {
        let mut notes = Vec::new();
        for path in Self::get_config_paths() {
            if !path.exists() {
                continue;
            }
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    notes.push(ConfigNote::Failed(path, e.to_string()));
                    continue;
                }
            };
            match toml::from_str::<Config>(&content) {
                Ok(config) => {
                    notes.push(ConfigNote::Loaded(path));
                    return (config, notes);
                }
                Err(e) => notes.push(ConfigNote::Failed(path, e.to_string())),
            }
        }
        (Self::default(), notes)
    }

    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. XDG config: ~/.config/sessionstack/config.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config").join(APP_NAME).join("config.toml"));
        }

        // 2. Platform config dir (macOS Application Support)
        if let Some(config_dir) = dirs::config_dir() {
            let platform_path = config_dir.join(APP_NAME).join("config.toml");
            if !paths.contains(&platform_path) {
                paths.push(platform_path);
            }
        }

        // 3. Home directory: ~/.sessionstack.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(format!(".{APP_NAME}.toml")));
        }

        paths
    }
}

/// What happened while looking for a config file
#[derive(Debug)]
pub(crate) enum ConfigNote {
    Loaded(PathBuf),
    Failed(PathBuf, String),
}

impl ConfigNote {
    pub(crate) fn log(&self) {
        match self {
            ConfigNote::Loaded(path) => info!("Loaded config from {}", path.display()),
            ConfigNote::Failed(path, e) => warn!("Failed to parse {}: {}", path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_paths_end_with_home_dotfile() {
        let paths = Config::get_config_paths();
        if let Some(last) = paths.last() {
            assert!(last.ends_with(".sessionstack.toml"));
        }
    }

    #[test]
    fn parses_full_config() {
        let config: Config = toml::from_str(
            r#"
            source = "remote"
            url = "https://example.supabase.co"
            api_key = "anon"
            workspace = "ws-1"
            timezone = "Europe/Berlin"
            view = "day"
            order = "desc"
            color = "never"
            offline = true
            cache_ttl_secs = 60
            "#,
        )
        .unwrap();
        assert_eq!(config.source.as_deref(), Some("remote"));
        assert!(matches!(config.view, Some(ConfigView::Day)));
        assert!(matches!(config.order, Some(ConfigSortOrder::Desc)));
        assert!(matches!(config.color, Some(ConfigColorMode::Never)));
        assert!(config.offline);
        assert_eq!(config.cache_ttl_secs, Some(60));
    }

    #[test]
    fn parses_goal_tables() {
        let config: Config = toml::from_str(
            r#"
            [[goals]]
            daily_goal_minutes = 240
            weekly_goal_minutes = 1200

            [[goals]]
            category_id = "c1"
            daily_goal_minutes = 60
            "#,
        )
        .unwrap();
        assert_eq!(config.goals.len(), 2);
        assert_eq!(config.goals[0].weekly_goal_minutes, Some(1200));
        assert_eq!(config.goals[1].category_id.as_deref(), Some("c1"));
        assert!(config.goals[1].is_active);
    }

    #[test]
    fn rejects_unknown_view() {
        assert!(toml::from_str::<Config>(r#"view = "year""#).is_err());
    }
}
