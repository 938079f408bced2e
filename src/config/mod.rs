//! Configuration management for reelcache.
//!
//! Configuration is read from `~/.config/reelcache/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.
//! The API key may also come from the `REELCACHE_API_KEY` environment variable,
//! which wins over the file.

pub mod interval;

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::app::CatalogError;
use crate::fetcher::http_fetcher::DEFAULT_TIMEOUT_SECS;

pub use interval::{format_interval, parse_interval};

pub const API_KEY_ENV: &str = "REELCACHE_API_KEY";

/// Main configuration struct.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub remote: RemoteConfig,
    pub store: StoreConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub base_url: String,
    pub api_key: String,
    /// Prefix joined with a movie's poster path
    pub image_base_url: String,
    pub request_timeout_secs: u64,
    /// List pages fetched per category on each sync
    pub pages: u32,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.themoviedb.org/3".to_string(),
            api_key: String::new(),
            image_base_url: "https://image.tmdb.org/t/p/w185".to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            pages: 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database file; the platform data directory when unset
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub detail_workers: usize,
    pub update_on_start: bool,
    pub interval: String,
    pub jitter: String,
    /// Per-target overrides keyed by target tag
    pub schedule: BTreeMap<String, ScheduleOverride>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            detail_workers: 4,
            update_on_start: true,
            interval: "1d".to_string(),
            jitter: "12h".to_string(),
            schedule: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScheduleOverride {
    pub interval: Option<String>,
    pub jitter: Option<String>,
}

impl SyncConfig {
    pub fn interval_for(&self, tag: &str) -> Result<Duration, ConfigError> {
        let text = self
            .schedule
            .get(tag)
            .and_then(|o| o.interval.as_deref())
            .unwrap_or(&self.interval);
        let secs = parse_field(&format!("sync interval for {}", tag), text)?;
        if secs == 0 {
            return Err(ConfigError::Invalid {
                field: format!("sync interval for {}", tag),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(Duration::from_secs(secs))
    }

    pub fn jitter_for(&self, tag: &str) -> Result<Duration, ConfigError> {
        let text = self
            .schedule
            .get(tag)
            .and_then(|o| o.jitter.as_deref())
            .unwrap_or(&self.jitter);
        parse_field(&format!("sync jitter for {}", tag), text).map(Duration::from_secs)
    }
}

fn parse_field(field: &str, text: &str) -> Result<u64, ConfigError> {
    parse_interval(text).map_err(|message| ConfigError::Invalid {
        field: field.to_string(),
        message,
    })
}

impl Config {
    /// Load configuration from the default path and apply the environment
    /// override.
    pub fn load() -> Result<Self, ConfigError> {
        let config = Self::load_from(&Self::default_config_path()?)?;
        Ok(config.with_api_key_override(std::env::var(API_KEY_ENV).ok()))
    }

    /// Load from `path`, writing the commented default first if it is missing.
    /// Missing fields use default values.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            Self::create_default_config(path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config = Self::from_toml_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn with_api_key_override(mut self, api_key: Option<String>) -> Self {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.remote.api_key = key.trim().to_string();
        }
        self
    }

    /// Catch bad values at startup instead of at the first scheduled sync.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.remote.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "remote.base_url".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.sync.detail_workers == 0 {
            return Err(ConfigError::Invalid {
                field: "sync.detail_workers".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        self.sync.interval_for("default")?;
        self.sync.jitter_for("default")?;
        for tag in self.sync.schedule.keys() {
            self.sync.interval_for(tag)?;
            self.sync.jitter_for(tag)?;
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.remote.request_timeout_secs.max(1))
    }

    /// Get the default config file path: `~/.config/reelcache/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("reelcache").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        tracing::info!("Wrote default configuration to {}", path.display());
        Ok(())
    }

    fn default_config_content() -> &'static str {
        r##"# reelcache configuration
#
# Intervals accept a number followed by s, m, h or d ("30m", "12h", "1d").
# A bare number is read as seconds.

[remote]
base_url = "https://api.themoviedb.org/3"
# Leave empty and set REELCACHE_API_KEY instead to keep the key out of this file
api_key = ""
image_base_url = "https://image.tmdb.org/t/p/w185"
request_timeout_secs = 10
# List pages fetched per category on each sync
pages = 1

[store]
# Defaults to the platform data directory when unset
# path = "/path/to/catalog.db"

[sync]
# Concurrent detail requests during a sync
detail_workers = 4
# Sync every category when the daemon starts
update_on_start = true
interval = "1d"
# Random extra delay added to each scheduled sync
jitter = "12h"

# Per-category overrides
# [sync.schedule.popular]
# interval = "6h"
# jitter = "1h"
"##
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid {field}: {message}")]
    Invalid { field: String, message: String },
}

impl From<ConfigError> for CatalogError {
    fn from(e: ConfigError) -> Self {
        CatalogError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_deserializes() {
        let config = Config::from_toml_str(Config::default_config_content())
            .expect("Default config should be valid TOML");

        assert_eq!(config, Config::default());
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_config() {
        let content = r#"
[remote]
api_key = "abc"

[sync]
detail_workers = 8
"#;
        let config = Config::from_toml_str(content).expect("Partial config should work");

        assert_eq!(config.remote.api_key, "abc");
        assert_eq!(config.sync.detail_workers, 8);
        assert_eq!(config.remote.base_url, "https://api.themoviedb.org/3");
        assert_eq!(config.sync.interval, "1d");
        assert!(config.store.path.is_none());
    }

    #[test]
    fn test_empty_config() {
        let config = Config::from_toml_str("").expect("Empty config should work");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_schedule_overrides() {
        let content = r#"
[sync]
interval = "1d"
jitter = "12h"

[sync.schedule.popular]
interval = "6h"
"#;
        let config = Config::from_toml_str(content).unwrap();

        assert_eq!(
            config.sync.interval_for("popular").unwrap(),
            Duration::from_secs(6 * 3600)
        );
        assert_eq!(
            config.sync.jitter_for("popular").unwrap(),
            Duration::from_secs(12 * 3600)
        );
        assert_eq!(
            config.sync.interval_for("top_rated").unwrap(),
            Duration::from_secs(86400)
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.sync.interval = "often".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));

        let mut config = Config::default();
        config.sync.interval = "0s".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.sync.detail_workers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_api_key_override() {
        let config = Config::default().with_api_key_override(Some(" from-env ".into()));
        assert_eq!(config.remote.api_key, "from-env");

        let mut base = Config::default();
        base.remote.api_key = "from-file".into();
        assert_eq!(
            base.clone().with_api_key_override(Some("".into())).remote.api_key,
            "from-file"
        );
        assert_eq!(base.with_api_key_override(None).remote.api_key, "from-file");
    }

    #[test]
    fn test_load_from_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config, Config::default());
        assert!(path.exists());
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[sync\ninterval = ").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
