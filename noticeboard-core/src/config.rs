//! Global notice board configuration.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{NoticeBoardError, NoticeBoardResult};
use crate::source::SourceLocation;
use crate::storage::DEFAULT_STORAGE_KEY;

static DEFAULT_DATA_PATH: &str = "~/.local/share/noticeboard";

fn default_data_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_PATH)
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_request_timeout() -> u64 {
    10
}

/// Configuration at ~/.config/noticeboard/config.toml
///
/// Every key can be overridden with a `NOTICEBOARD_<KEY>` environment variable.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct NoticeBoardConfig {
    /// Where user events are persisted.
    #[serde(default = "default_data_path")]
    pub data_dir: PathBuf,

    /// URL or file path of the default event list. Unset means the bundled list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_source: Option<String>,

    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for NoticeBoardConfig {
    fn default() -> Self {
        NoticeBoardConfig {
            data_dir: default_data_path(),
            base_source: None,
            storage_key: default_storage_key(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl NoticeBoardConfig {
    pub fn config_path() -> NoticeBoardResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| NoticeBoardError::Config("Could not determine config directory".into()))?
            .join("noticeboard");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default config path, writing a commented template first if none exists.
    pub fn load() -> NoticeBoardResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> NoticeBoardResult<Self> {
        Self::load_with_env(path, None)
    }

    /// Load from `path`, taking `NOTICEBOARD_*` overrides from `env` instead of
    /// the process environment when given.
    pub fn load_with_env(
        path: &Path,
        env: Option<HashMap<String, String>>,
    ) -> NoticeBoardResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("NOTICEBOARD").source(env))
            .build()
            .map_err(|e| NoticeBoardError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| NoticeBoardError::Config(e.to_string()))
    }

    /// `data_dir` with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned();
        PathBuf::from(full_path_str)
    }

    pub fn source_location(&self) -> SourceLocation {
        self.base_source
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(SourceLocation::parse)
            .unwrap_or(SourceLocation::Bundled)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn save_to(&self, path: &Path) -> NoticeBoardResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| NoticeBoardError::Config(e.to_string()))?;

        std::fs::write(path, content)
            .map_err(|e| NoticeBoardError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> NoticeBoardResult<()> {
        let contents = format!(
            "\
# noticeboard configuration

# Where your own events are stored:
# data_dir = \"{}\"

# Default event list, as a URL or a file path (the bundled list if unset):
# base_source = \"https://example.org/events.json\"

# Name of the saved user event collection:
# storage_key = \"{}\"

# Seconds to wait for the default event list:
# request_timeout_secs = {}
",
            DEFAULT_DATA_PATH,
            DEFAULT_STORAGE_KEY,
            default_request_timeout()
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                NoticeBoardError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| NoticeBoardError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
