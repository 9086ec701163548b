// Configuration loading: reads a JSON or YAML file (picked by extension)
// into typed structs, applies environment overrides and validates the
// result before anything talks to the network.

use crate::error::{DstnError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config path used when `--config` is not given.
pub const DEFAULT_CONFIG: &str = "configs/config.json";

/// Sub-directory of the user's config directory searched as a fallback.
const APP_CONFIG_DIR: &str = "dstn-check";
const FALLBACK_NAMES: [&str; 3] = ["config.json", "config.yaml", "config.yml"];

const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const ENV_API_URL: &str = "DSTN_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "DSTN_TIMEOUT_SECS";

/// Everything needed to build an `ApiClient`. Constructed once per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub api_url: String,
    /// Static headers sent with every request (e.g. a User-Agent the
    /// upstream site expects).
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    pub results: ResultParams,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Result-shaping parameters. They are passed through untouched and stay
/// the same for every query of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultParams {
    pub rows: u32,
    pub page: u32,
    pub sord: String,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "json" => Ok(ConfigFormat::Json),
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            _ => Err(DstnError::UnsupportedConfigFormat(path.display().to_string())),
        }
    }
}

impl Config {
    /// Load, override from the process environment, then validate.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// `load` with the override source supplied by the caller.
    pub fn load_with<F>(path: &Path, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|source| DstnError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::parse(&content, format)?;
        config.apply_overrides(lookup)?;
        config.validate()?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse without touching the environment or validating.
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        let config: Config = match format {
            ConfigFormat::Json => serde_json::from_str(content)?,
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
        };
        Ok(config)
    }

    /// Apply `DSTN_*` overrides. The lookup is injected so callers (and
    /// tests) decide where values come from.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL) {
            log::debug!("{} overrides api_url", ENV_API_URL);
            self.api_url = url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout_secs = raw.trim().parse().map_err(|_| {
                DstnError::Config(format!("{} must be a whole number of seconds, got '{}'", ENV_TIMEOUT_SECS, raw))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.api_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(DstnError::Config(format!(
                "api_url must be an http(s) URL, got '{}'",
                self.api_url
            )));
        }
        if self.results.rows == 0 {
            return Err(DstnError::Config("results.rows must be positive".into()));
        }
        if self.results.page == 0 {
            return Err(DstnError::Config("results.page must be positive".into()));
        }
        let sord = self.results.sord.to_ascii_lowercase();
        if sord != "asc" && sord != "desc" {
            return Err(DstnError::Config(format!(
                "results.sord must be 'asc' or 'desc', got '{}'",
                self.results.sord
            )));
        }
        if self.timeout_secs == 0 {
            return Err(DstnError::Config("timeout_secs must be positive".into()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Pick the config file to load. An explicit path always wins; otherwise
/// the default path, then the user's config directory.
pub fn resolve_config_path(requested: Option<&Path>) -> PathBuf {
    discover_config(requested, Path::new(DEFAULT_CONFIG), dirs::config_dir())
}

/// Lookup order behind `resolve_config_path`, with the default path and
/// the user config directory passed in. Falls back to `default` even when
/// it does not exist so the load error names a sensible path.
pub fn discover_config(requested: Option<&Path>, default: &Path, config_dir: Option<PathBuf>) -> PathBuf {
    if let Some(path) = requested {
        return path.to_path_buf();
    }
    if default.exists() {
        return default.to_path_buf();
    }
    config_dir
        .map(|dir| dir.join(APP_CONFIG_DIR))
        .and_then(|dir| {
            FALLBACK_NAMES
                .iter()
                .map(|name| dir.join(name))
                .find(|candidate| candidate.exists())
        })
        .unwrap_or_else(|| default.to_path_buf())
}
