//! Configuration management
//!
//! Settings are read from a TOML file and then overridden by the environment
//! variables the Swift command-line tools use (`ST_AUTH`, `ST_USER`, `ST_KEY`,
//! `OS_STORAGE_URL`, `OS_AUTH_TOKEN`).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "SWC_CONFIG_DIR";

const CONFIG_FILE: &str = "config.toml";

/// Tunables shared by every handle of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Maximum number of paths sent in one bulk-delete request
    pub bulk_delete_batch_size: usize,

    /// Number of chunks buffered between an upload writer and the request body
    pub writer_channel_capacity: usize,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            bulk_delete_batch_size: 10_000,
            writer_channel_capacity: 16,
        }
    }
}

/// Client configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Swift v1 auth endpoint, e.g. `https://swift.example.com/auth/v1.0`
    pub auth_url: Option<String>,
    pub user: Option<String>,
    pub key: Option<String>,

    /// Preauthenticated storage URL, used together with `token`
    pub storage_url: Option<String>,
    pub token: Option<String>,

    pub user_agent: Option<String>,

    /// Per-request timeout enforced by the transport
    pub request_timeout_secs: Option<u64>,

    pub settings: ClientSettings,
}

/// How to obtain a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Swift v1 handshake with user name and key
    Swauth {
        auth_url: String,
        user: String,
        key: String,
    },
    /// A storage URL and token obtained elsewhere
    Token { storage_url: String, token: String },
}

impl Config {
    /// Apply environment overrides using the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    /// Apply environment overrides from an arbitrary lookup function.
    ///
    /// Empty values are ignored.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());
        if let Some(v) = get("ST_AUTH") {
            self.auth_url = Some(v);
        }
        if let Some(v) = get("ST_USER") {
            self.user = Some(v);
        }
        if let Some(v) = get("ST_KEY") {
            self.key = Some(v);
        }
        if let Some(v) = get("OS_STORAGE_URL") {
            self.storage_url = Some(v);
        }
        if let Some(v) = get("OS_AUTH_TOKEN") {
            self.token = Some(v);
        }
    }

    /// Pick the credential mode. A storage URL with token takes precedence
    /// over user and key.
    pub fn credentials(&self) -> Result<Credentials> {
        if let (Some(storage_url), Some(token)) = (&self.storage_url, &self.token) {
            return Ok(Credentials::Token {
                storage_url: storage_url.clone(),
                token: token.clone(),
            });
        }
        match (&self.auth_url, &self.user, &self.key) {
            (Some(auth_url), Some(user), Some(key)) => Ok(Credentials::Swauth {
                auth_url: auth_url.clone(),
                user: user.clone(),
                key: key.clone(),
            }),
            (None, None, None) if self.storage_url.is_some() || self.token.is_some() => Err(
                Error::Config("storage_url and token must be given together".to_string()),
            ),
            (None, None, None) => Err(Error::Config(
                "no credentials configured (need auth_url, user and key, or storage_url and token)"
                    .to_string(),
            )),
            _ => Err(Error::Config(
                "auth_url, user and key must be given together".to_string(),
            )),
        }
    }

    /// Check that the configuration can be used to connect
    pub fn validate(&self) -> Result<()> {
        self.credentials()?;
        if self.settings.bulk_delete_batch_size == 0 {
            return Err(Error::Config(
                "bulk_delete_batch_size must be positive".to_string(),
            ));
        }
        if self.settings.writer_channel_capacity == 0 {
            return Err(Error::Config(
                "writer_channel_capacity must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Loads and saves the configuration file
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    /// Manager for the default location: `$SWC_CONFIG_DIR/config.toml`, or
    /// `swc/config.toml` under the platform configuration directory.
    pub fn new() -> Result<Self> {
        let dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .ok_or_else(|| Error::Config("cannot determine config directory".to_string()))?
                .join("swc"),
        };
        Ok(Self::with_path(dir.join(CONFIG_FILE)))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file. A missing file yields the default configuration.
    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "Config file not found, using defaults");
            return Ok(Config::default());
        }
        let data = std::fs::read_to_string(&self.path)?;
        toml::from_str(&data)
            .map_err(|e| Error::Config(format!("{}: {e}", self.path.display())))
    }

    /// Read the file, then apply environment overrides
    pub fn load_with_env(&self) -> Result<Config> {
        let mut config = self.load()?;
        config.apply_env();
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = toml::to_string_pretty(config)
            .map_err(|e| Error::Config(format!("cannot serialize config: {e}")))?;
        std::fs::write(&self.path, data)?;
        Ok(())
    }
}
