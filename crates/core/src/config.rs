use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::model::Strategy;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

static SETTINGS_FILE_NAME: &str = "settings.json";
static ENV_API_URL: &str = "TASKRANK_API_URL";
static ENV_CONFIG_DIR: &str = "TASKRANK_CONFIG_DIR";

static PROJECT_DIRS: Lazy<Option<ProjectDirs>> =
    Lazy::new(|| ProjectDirs::from("dev", "taskrank", "taskrank"));

/// Optional on-disk overrides. Every field may be omitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct Settings {
    api_url: Option<String>,
    default_strategy: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    api_base_url: String,
    default_strategy: Strategy,
    timeout: Duration,
    settings_path: Option<PathBuf>,
}

impl AppConfig {
    /// Resolve configuration from the provided override, `TASKRANK_API_URL`,
    /// the settings file in the platform config directory, and built-in defaults.
    pub fn discover(api_url_override: Option<String>) -> Result<Self> {
        let settings_path = resolve_settings_path();
        let settings = match settings_path.as_deref() {
            Some(path) if path.exists() => load_settings(path)?,
            _ => Settings::default(),
        };
        let env_url = env::var(ENV_API_URL).ok();
        Ok(Self::resolve(api_url_override, env_url, settings, settings_path))
    }

    /// Construct [`AppConfig`] for an explicit service URL with default settings.
    pub fn for_api_url<T: Into<String>>(api_base_url: T) -> Self {
        Self::resolve(Some(api_base_url.into()), None, Settings::default(), None)
    }

    fn resolve(
        api_url_override: Option<String>,
        env_url: Option<String>,
        settings: Settings,
        settings_path: Option<PathBuf>,
    ) -> Self {
        let api_base_url = [api_url_override, env_url, settings.api_url]
            .into_iter()
            .flatten()
            .map(|url| url.trim().to_string())
            .find(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let default_strategy = settings
            .default_strategy
            .filter(|value| !value.trim().is_empty())
            .map(|value| Strategy::new(value.trim()))
            .unwrap_or_default();

        let timeout = settings
            .timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        Self {
            api_base_url: trim_trailing_slashes(&api_base_url),
            default_strategy,
            timeout,
            settings_path,
        }
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn default_strategy(&self) -> &Strategy {
        &self.default_strategy
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn settings_path(&self) -> Option<&Path> {
        self.settings_path.as_deref()
    }
}

fn trim_trailing_slashes(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

fn load_settings(path: &Path) -> Result<Settings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings at {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Invalid settings file at {}", path.display()))
}

fn resolve_settings_path() -> Option<PathBuf> {
    if let Ok(dir) = env::var(ENV_CONFIG_DIR) {
        return Some(PathBuf::from(dir).join(SETTINGS_FILE_NAME));
    }

    PROJECT_DIRS
        .as_ref()
        .map(|project| project.config_dir().join(SETTINGS_FILE_NAME))
}
