use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const TOKEN_VAR: &str = "BOT_TOKEN";
pub const OWNER_VAR: &str = "OWNER_ID";
pub const CONFIG_PATH_VAR: &str = "FBGET_CONFIG";
pub const PORT_VAR: &str = "PORT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    MissingVar(&'static str),
    #[error("OWNER_ID must be a numeric Telegram user id, got {0:?}")]
    InvalidOwnerId(String),
    #[error("PORT must be a port number, got {0:?}")]
    InvalidPort(String),
    #[error("Invalid liveness address {0:?}")]
    InvalidAddr(String),
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Tunables read from `config.yml`. Secrets never live here.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_download_dir")]
    pub download_dir: String,
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_caption")]
    pub caption: String,
    #[serde(default = "default_ytdlp_path")]
    pub ytdlp_path: String,
    #[serde(default = "default_liveness_addr")]
    pub liveness_addr: String,
    #[serde(default = "default_redirect_timeout_secs")]
    pub redirect_timeout_secs: u64,
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,
}

fn default_download_dir() -> String {
    "downloads".to_string()
}

fn default_format() -> String {
    "mp4".to_string()
}

fn default_caption() -> String {
    "✅ Video processed by Streamify-FB".to_string()
}

fn default_ytdlp_path() -> String {
    "yt-dlp".to_string()
}

fn default_liveness_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_redirect_timeout_secs() -> u64 {
    10
}

fn default_progress_interval_ms() -> u64 {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            format: default_format(),
            caption: default_caption(),
            ytdlp_path: default_ytdlp_path(),
            liveness_addr: default_liveness_addr(),
            redirect_timeout_secs: default_redirect_timeout_secs(),
            progress_interval_ms: default_progress_interval_ms(),
        }
    }
}

impl Config {
    pub fn redirect_timeout(&self) -> Duration {
        Duration::from_secs(self.redirect_timeout_secs)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    pub fn download_dir(&self) -> PathBuf {
        PathBuf::from(&self.download_dir)
    }

    /// Liveness address, with the port replaced by `port` when given.
    pub fn liveness_addr(&self, port: Option<&str>) -> Result<SocketAddr, ConfigError> {
        let mut addr: SocketAddr = self
            .liveness_addr
            .parse()
            .map_err(|_| ConfigError::InvalidAddr(self.liveness_addr.clone()))?;
        if let Some(port) = port {
            let port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.to_string()))?;
            addr.set_port(port);
        }
        Ok(addr)
    }
}

/// Values that must come from the environment.
#[derive(Clone)]
pub struct Secrets {
    pub bot_token: String,
    pub owner_id: u64,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("bot_token", &"<redacted>")
            .field("owner_id", &self.owner_id)
            .finish()
    }
}

impl Secrets {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bot_token = lookup(TOKEN_VAR)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingVar(TOKEN_VAR))?;
        let owner = lookup(OWNER_VAR)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingVar(OWNER_VAR))?;
        let owner_id = owner
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidOwnerId(owner.clone()))?;

        Ok(Self {
            bot_token: bot_token.trim().to_string(),
            owner_id,
        })
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("fbget")
}

pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_PATH_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| config_dir().join("config.yml"))
}

pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    } else {
        Ok(Config::default())
    }
}

pub fn get_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}
