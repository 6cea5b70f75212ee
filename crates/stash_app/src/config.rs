use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use stash_engine::SyncSettings;
use stash_logging::stash_info;

pub const CONFIG_FILENAME: &str = "stash.ron";

/// Optional overrides for [`SyncSettings`], read from a RON file.
///
/// The bearer token is deliberately not configurable here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub api_base_url: Option<String>,
    pub user_agent: Option<String>,
    pub page_limit: Option<u32>,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub max_bytes: Option<u64>,
    pub default_retry_after_secs: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

impl AppConfig {
    pub fn apply(&self, settings: SyncSettings) -> SyncSettings {
        SyncSettings {
            api_base_url: self.api_base_url.clone().unwrap_or(settings.api_base_url),
            user_agent: self.user_agent.clone().unwrap_or(settings.user_agent),
            page_limit: self.page_limit.unwrap_or(settings.page_limit),
            connect_timeout: self
                .connect_timeout_secs
                .map_or(settings.connect_timeout, Duration::from_secs),
            request_timeout: self
                .request_timeout_secs
                .map_or(settings.request_timeout, Duration::from_secs),
            max_bytes: self.max_bytes.unwrap_or(settings.max_bytes),
            default_retry_after: self
                .default_retry_after_secs
                .map_or(settings.default_retry_after, Duration::from_secs),
        }
    }
}

/// Loads `explicit`, or `./stash.ron` if present, or defaults.
///
/// A missing explicit path is an error; a missing default file is not.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(CONFIG_FILENAME), false),
    };

    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound && !required => {
            return Ok(AppConfig::default());
        }
        Err(source) => return Err(ConfigError::Read { path, source }),
    };

    let config = ron::from_str(&content).map_err(|err| ConfigError::Parse {
        path: path.clone(),
        message: err.to_string(),
    })?;
    stash_info!("Loaded config from {:?}", path);
    Ok(config)
}
