//! Client configuration at ~/.config/salonsync/config.toml
//!
//! Every key can be overridden from the environment with a `SALONSYNC_`
//! prefix, e.g. `SALONSYNC_BRANCH_ID=12`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CLIENT_FALLBACK_NAME, DEFAULT_FETCH_TIMEOUT, DEFAULT_POLL_INTERVAL,
    DEFAULT_RESTART_SETTLE, DEFAULT_ROSTER_TTL, DEFAULT_WORK_END, DEFAULT_WORK_START,
};
use crate::error::{SyncError, SyncResult};
use crate::polling::PollingConfig;
use crate::working_dates::WorkingHours;

static DEFAULT_API_URL: &str = "http://localhost:3000/api";

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_poll_interval() -> Duration {
    DEFAULT_POLL_INTERVAL
}

fn default_fetch_timeout() -> Duration {
    DEFAULT_FETCH_TIMEOUT
}

fn default_roster_ttl() -> Duration {
    DEFAULT_ROSTER_TTL
}

fn default_client_fallback_name() -> String {
    DEFAULT_CLIENT_FALLBACK_NAME.to_string()
}

fn default_start_time() -> String {
    DEFAULT_WORK_START.to_string()
}

fn default_end_time() -> String {
    DEFAULT_WORK_END.to_string()
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SalonConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Bearer token issued by the auth service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_role: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_master_id: Option<String>,

    #[serde(default = "default_poll_interval", with = "humantime_str")]
    pub poll_interval: Duration,

    #[serde(default = "default_fetch_timeout", with = "humantime_str")]
    pub fetch_timeout: Duration,

    #[serde(default = "default_roster_ttl", with = "humantime_str")]
    pub roster_ttl: Duration,

    #[serde(default = "default_client_fallback_name")]
    pub client_fallback_name: String,

    #[serde(default = "default_start_time")]
    pub default_start_time: String,

    #[serde(default = "default_end_time")]
    pub default_end_time: String,
}

impl Default for SalonConfig {
    fn default() -> Self {
        SalonConfig {
            api_url: default_api_url(),
            token: None,
            branch_id: None,
            user_role: None,
            user_master_id: None,
            poll_interval: default_poll_interval(),
            fetch_timeout: default_fetch_timeout(),
            roster_ttl: default_roster_ttl(),
            client_fallback_name: default_client_fallback_name(),
            default_start_time: default_start_time(),
            default_end_time: default_end_time(),
        }
    }
}

impl SalonConfig {
    pub fn config_path() -> SyncResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SyncError::Config("Could not determine config directory".into()))?
            .join("salonsync");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the config file (creating a commented default on first run) and
    /// apply environment overrides.
    pub fn load() -> SyncResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> SyncResult<Self> {
        Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix("SALONSYNC"))
            .build()
            .map_err(|e| SyncError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| SyncError::Config(e.to_string()))
    }

    /// Save the current config to ~/.config/salonsync/config.toml
    pub fn save(&self) -> SyncResult<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> SyncResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| SyncError::Config(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SyncError::Config(format!("Could not create config directory: {e}")))?;
        }
        std::fs::write(path, content)
            .map_err(|e| SyncError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> SyncResult<()> {
        let contents = format!(
            "\
# salonsync configuration

# Base URL of the CRM API:
# api_url = \"{DEFAULT_API_URL}\"

# Bearer token and the branch to work with:
# token = \"...\"
# branch_id = \"1\"

# Narrow task queries to one role or master:
# user_role = \"master\"
# user_master_id = \"3\"

# Timing:
# poll_interval = \"1m\"
# fetch_timeout = \"30s\"
# roster_ttl = \"30s\"

# Shown when a client has no name on record:
# client_fallback_name = \"{DEFAULT_CLIENT_FALLBACK_NAME}\"

# Hours used for newly added working dates:
# default_start_time = \"{DEFAULT_WORK_START}\"
# default_end_time = \"{DEFAULT_WORK_END}\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SyncError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| SyncError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// The configured branch, or a configuration error naming the key.
    pub fn require_branch(&self) -> SyncResult<&str> {
        self.branch_id
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .ok_or_else(|| SyncError::Config("branch_id is not set".into()))
    }

    pub fn polling_config(&self) -> PollingConfig {
        PollingConfig {
            branch_id: self.branch_id.clone(),
            user_role: self.user_role.clone(),
            user_master_id: self.user_master_id.clone(),
            sort: None,
            interval: self.poll_interval,
            fetch_timeout: self.fetch_timeout,
            restart_settle: DEFAULT_RESTART_SETTLE,
        }
    }

    pub fn default_hours(&self) -> SyncResult<WorkingHours> {
        WorkingHours::parse(&self.default_start_time, &self.default_end_time)
    }
}

/// Durations written as humantime strings ("1m", "30s").
mod humantime_str {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(D::Error::custom)
    }
}
