use crate::error::{Error, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://qa-internship.avito.com";
pub const ENV_BASE_URL: &str = "ADPROBE_BASE_URL";
pub const ENV_TIMEOUT: &str = "ADPROBE_TIMEOUT";

/// Runtime configuration resolved from environment and optional config file.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    /// `None` leaves the HTTP client's own defaults in place.
    pub timeout: Option<Duration>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct ConfigFile {
    base_url: Option<String>,
    timeout: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigDoctor {
    pub base_url: String,
    pub timeout: Option<String>,
    pub config_file: Option<String>,
    pub source: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

impl Config {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
        }
    }

    pub fn load() -> Result<Self> {
        let file_config = config_path()
            .as_ref()
            .and_then(|path| fs::read_to_string(path).ok())
            .map(|contents| parse_file(&contents))
            .transpose()?;

        resolve(
            std::env::var(ENV_BASE_URL).ok(),
            std::env::var(ENV_TIMEOUT).ok(),
            file_config.as_ref(),
        )
    }

    pub fn doctor(&self) -> ConfigDoctor {
        let source = if std::env::var(ENV_BASE_URL).is_ok() || std::env::var(ENV_TIMEOUT).is_ok() {
            "environment".to_string()
        } else {
            "config file / defaults".to_string()
        };
        ConfigDoctor {
            base_url: self.base_url.clone(),
            timeout: self
                .timeout
                .map(|t| humantime::format_duration(t).to_string()),
            config_file: config_path().map(|p| p.display().to_string()),
            source,
        }
    }
}

fn parse_file(contents: &str) -> Result<ConfigFile> {
    toml::from_str::<ConfigFile>(contents)
        .map_err(|err| Error::InvalidConfig(format!("config parse error: {err}")))
}

fn resolve(
    env_base_url: Option<String>,
    env_timeout: Option<String>,
    file_config: Option<&ConfigFile>,
) -> Result<Config> {
    let base_url = env_base_url
        .or_else(|| file_config.and_then(|c| c.base_url.clone()))
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let timeout = env_timeout
        .or_else(|| file_config.and_then(|c| c.timeout.clone()))
        .filter(|v| !v.trim().is_empty())
        .map(|raw| {
            humantime::parse_duration(raw.trim())
                .map_err(|err| Error::InvalidConfig(format!("invalid timeout {raw:?}: {err}")))
        })
        .transpose()?;

    Ok(Config { base_url, timeout })
}

fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("adprobe").join("config.toml"))
}
