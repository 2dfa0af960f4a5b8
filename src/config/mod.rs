use std::time::Duration;

use tracing::warn;

use crate::errors::{StarfieldError, StarfieldResult};
use crate::services::StoreSettings;

pub const DEFAULT_BASE_URL: &str = "https://api.nytimes.com/svc";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub newswire_source: String,
    pub poll_interval_secs: u64,
    pub notification_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            newswire_source: "all".to_string(),
            poll_interval_secs: 5,
            notification_secs: 5,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Get the directory where the executable is located
    fn exe_dir() -> Option<std::path::PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    pub fn from_env() -> StarfieldResult<Self> {
        // Try to load .env from executable's directory first
        if let Some(dir) = Self::exe_dir() {
            let env_path = dir.join(".env");
            if env_path.exists() {
                dotenvy::from_path(&env_path).ok();
            }
        }
        // Fall back to current directory
        dotenvy::dotenv().ok();

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> StarfieldResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_key = lookup("NYT_API_KEY").filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            warn!("NYT_API_KEY is not set; requests will be rejected by the API");
        }

        let base_url = lookup("NYT_BASE_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(defaults.base_url);

        let newswire_source = lookup("NYT_NEWSWIRE_SOURCE")
            .filter(|source| !source.trim().is_empty())
            .unwrap_or(defaults.newswire_source);

        let poll_interval_secs =
            parse_secs(&lookup, "STARFIELD_POLL_SECS", defaults.poll_interval_secs)?;
        let notification_secs =
            parse_secs(&lookup, "STARFIELD_NOTIFY_SECS", defaults.notification_secs)?;
        let request_timeout_secs =
            parse_secs(&lookup, "STARFIELD_TIMEOUT_SECS", defaults.request_timeout_secs)?;

        Ok(Self {
            api_key,
            base_url,
            newswire_source,
            poll_interval_secs,
            notification_secs,
            request_timeout_secs,
        })
    }

    pub fn store_settings(&self) -> StoreSettings {
        StoreSettings {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            notification_ttl: Duration::from_secs(self.notification_secs),
            ..StoreSettings::default()
        }
    }
}

fn parse_secs<F>(lookup: &F, name: &str, default: u64) -> StarfieldResult<u64>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(0) | Err(_) => Err(StarfieldError::Config(format!(
                "{} must be a positive number of seconds, got {:?}",
                name, raw
            ))),
            Ok(secs) => Ok(secs),
        },
    }
}
