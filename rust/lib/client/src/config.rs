//! Client configuration.
//!
//! Read from `~/.artshare/config.toml` or from `ARTSHARE_*` environment
//! variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const ENV_API_URL: &str = "ARTSHARE_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "ARTSHARE_TIMEOUT_SECS";
pub const ENV_TOKEN_FILE: &str = "ARTSHARE_TOKEN_FILE";

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config encode: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("invalid {name}: {value}")]
    InvalidVar { name: &'static str, value: String },
}

/// API paths. Defaults follow the `/auth/*` layout; deployments using
/// dj-rest-auth style routes override them in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub login: String,
    pub register: String,
    pub refresh: String,
    pub me: String,
    pub change_password: String,
    pub posts: String,
    pub comments: String,
    pub likes: String,
    pub bookmarks: String,
    pub followers: String,
    pub profiles: String,
    /// Append `/` to item paths (`/posts/7/`), as Django routes expect.
    pub trailing_slash: bool,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            login: "/auth/login".into(),
            register: "/auth/register".into(),
            refresh: "/auth/refresh".into(),
            me: "/auth/me".into(),
            change_password: "/auth/change-password".into(),
            posts: "/posts".into(),
            comments: "/comments".into(),
            likes: "/likes".into(),
            bookmarks: "/bookmarks".into(),
            followers: "/followers".into(),
            profiles: "/profiles".into(),
            trailing_slash: false,
        }
    }
}

impl Endpoints {
    /// Endpoints that never carry a bearer token and are never retried
    /// after a refresh.
    pub fn is_public(&self, path: &str) -> bool {
        let path = strip_origin(path);
        let path = path.split('?').next().unwrap_or(path);
        [&self.login, &self.register, &self.refresh]
            .iter()
            .any(|p| p.trim_end_matches('/') == path.trim_end_matches('/'))
    }

    /// Path of one item in a collection: `item(&e.posts, 7)` → `/posts/7`.
    pub fn item(&self, collection: &str, id: u64) -> String {
        let base = collection.trim_end_matches('/');
        if self.trailing_slash {
            format!("{base}/{id}/")
        } else {
            format!("{base}/{id}")
        }
    }

    /// `path` with a query string. Pairs with an empty value are dropped.
    pub fn with_query(path: &str, params: &[(&str, &str)]) -> String {
        let query: Vec<String> = params
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect();
        if query.is_empty() {
            path.to_string()
        } else if path.contains('?') {
            format!("{path}&{}", query.join("&"))
        } else {
            format!("{path}?{}", query.join("&"))
        }
    }
}

fn strip_origin(path: &str) -> &str {
    for scheme in ["http://", "https://"] {
        if let Some(rest) = path.strip_prefix(scheme) {
            return rest.find('/').map_or("/", |i| &rest[i..]);
        }
    }
    path
}

/// Client configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API root, e.g. `https://api.artshare.example`.
    pub base_url: String,

    /// Transport timeout per request.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub endpoints: Endpoints,

    /// Where tokens are persisted. `None` keeps them in memory only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_file: Option<PathBuf>,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            endpoints: Endpoints::default(),
            token_file: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Default config file path: ~/.artshare/config.toml.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }

    /// Default token file path: ~/.artshare/tokens.toml.
    pub fn default_token_path() -> PathBuf {
        dirs_path().join("tokens.toml")
    }

    /// Defaults overridden by `ARTSHARE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.is_empty()) {
            config.base_url = url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS).filter(|v| !v.is_empty()) {
            config.timeout_secs = raw.trim().parse().map_err(|_| ConfigError::InvalidVar {
                name: ENV_TIMEOUT_SECS,
                value: raw.clone(),
            })?;
        }
        if let Some(file) = lookup(ENV_TOKEN_FILE).filter(|v| !v.is_empty()) {
            config.token_file = Some(PathBuf::from(file));
        }
        Ok(config)
    }

    /// Load config from disk, or return the default if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save config to disk.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// The artshare config directory (~/.artshare).
fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".artshare")
}
