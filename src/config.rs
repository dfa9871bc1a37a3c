// Configuration
//
// Loads the JSON config file (Plex + NiceHash endpoints, credentials,
// device/process names and timing) and validates it before startup.

use crate::error::{MonitorError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE_NAME: &str = "config.json";
const APP_DIR_NAME: &str = "rigpause";

const DEFAULT_POLL_SECS: u64 = 20; // How often to check Plex
const DEFAULT_PAUSE_SECS: u64 = 180; // How long to pause the rig
const DEFAULT_RIG_CHECK_SECS: u64 = 300; // How often to check for a hung rig
const MAX_DURATION_SECS: u64 = 24 * 60 * 60;
const DEFAULT_NICEHASH_URL: &str = "https://api2.nicehash.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub plex: PlexConfig,
    pub nicehash: NiceHashConfig,
    #[serde(default)]
    pub timing: TimingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlexConfig {
    pub api_url: String,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NiceHashConfig {
    #[serde(default = "default_nicehash_url")]
    pub api_url: String,
    pub organisation_id: String,
    pub api_key: String,
    pub api_secret: String,
    /// Device name to pause, as shown in the rig's device list
    pub card_name: String,
    /// Local process killed when the rig reports UNKNOWN. Matched against
    /// the process name or its executable's file name.
    pub process_name: String,
    /// Rig to manage; the first rig on the account when absent
    #[serde(default)]
    pub rig_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_poll_secs")]
    pub poll_secs: u64,
    #[serde(default = "default_pause_secs")]
    pub pause_secs: u64,
    #[serde(default = "default_rig_check_secs")]
    pub rig_check_secs: u64,
}

fn default_nicehash_url() -> String {
    DEFAULT_NICEHASH_URL.to_string()
}

fn default_poll_secs() -> u64 {
    DEFAULT_POLL_SECS
}

fn default_pause_secs() -> u64 {
    DEFAULT_PAUSE_SECS
}

fn default_rig_check_secs() -> u64 {
    DEFAULT_RIG_CHECK_SECS
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_secs: DEFAULT_POLL_SECS,
            pause_secs: DEFAULT_PAUSE_SECS,
            rig_check_secs: DEFAULT_RIG_CHECK_SECS,
        }
    }
}

impl TimingConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_secs)
    }

    pub fn pause_duration(&self) -> Duration {
        Duration::from_secs(self.pause_secs)
    }

    pub fn rig_check_interval(&self) -> Duration {
        Duration::from_secs(self.rig_check_secs)
    }
}

impl AppConfig {
    /// Load and validate the config from `path`, or from the default location
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => default_config_path().ok_or_else(|| {
                MonitorError::ConfigInvalid(format!(
                    "no {} in the working directory or the user config directory",
                    CONFIG_FILE_NAME
                ))
            })?,
        };

        tracing::debug!("[Config] Loading {}", path.display());

        let content = fs::read_to_string(&path).map_err(|e| {
            MonitorError::ConfigInvalid(format!("cannot read {}: {}", path.display(), e))
        })?;

        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(content)
            .map_err(|e| MonitorError::ConfigInvalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        check_url("plex.api_url", &self.plex.api_url)?;
        check_url("nicehash.api_url", &self.nicehash.api_url)?;

        let required = [
            ("plex.token", &self.plex.token),
            ("nicehash.organisation_id", &self.nicehash.organisation_id),
            ("nicehash.api_key", &self.nicehash.api_key),
            ("nicehash.api_secret", &self.nicehash.api_secret),
            ("nicehash.card_name", &self.nicehash.card_name),
            ("nicehash.process_name", &self.nicehash.process_name),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(MonitorError::ConfigInvalid(format!("{} is empty", field)));
            }
        }

        if let Some(rig_id) = &self.nicehash.rig_id {
            if rig_id.trim().is_empty() {
                return Err(MonitorError::ConfigInvalid("nicehash.rig_id is empty".to_string()));
            }
        }

        let durations = [
            ("timing.poll_secs", self.timing.poll_secs),
            ("timing.pause_secs", self.timing.pause_secs),
            ("timing.rig_check_secs", self.timing.rig_check_secs),
        ];
        for (field, secs) in durations {
            if secs == 0 {
                return Err(MonitorError::ConfigInvalid(format!("{} must be > 0", field)));
            }
            if secs > MAX_DURATION_SECS {
                return Err(MonitorError::ConfigInvalid(format!(
                    "{} must be at most {} (one day), got {}",
                    field, MAX_DURATION_SECS, secs
                )));
            }
        }

        Ok(())
    }
}

fn check_url(field: &str, url: &str) -> Result<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(MonitorError::ConfigInvalid(format!(
            "{} must be an http(s) URL, got '{}'",
            field, url
        )))
    }
}

/// `./config.json` if present, else `<config dir>/rigpause/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
        .filter(|path| path.exists())
}
