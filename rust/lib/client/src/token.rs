//! Token persistence across restarts.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

/// Access/refresh pair as persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTokens {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl StoredTokens {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenStorageError {
    #[error("token file io: {0}")]
    Io(#[from] std::io::Error),

    #[error("token file parse: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("token file encode: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Where the session keeps its tokens between runs.
pub trait TokenStorage: Send + Sync + 'static {
    /// Persisted tokens; empty when nothing was saved.
    fn load(&self) -> Result<StoredTokens, TokenStorageError>;

    fn save(&self, tokens: &StoredTokens) -> Result<(), TokenStorageError>;

    fn clear(&self) -> Result<(), TokenStorageError>;
}

/// In-process storage. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryTokenStorage {
    tokens: Mutex<StoredTokens>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: StoredTokens) -> Self {
        Self {
            tokens: Mutex::new(tokens),
        }
    }

    /// What is stored right now.
    pub fn current(&self) -> StoredTokens {
        self.tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Result<StoredTokens, TokenStorageError> {
        Ok(self.current())
    }

    fn save(&self, tokens: &StoredTokens) -> Result<(), TokenStorageError> {
        *self.tokens.lock().unwrap_or_else(PoisonError::into_inner) = tokens.clone();
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStorageError> {
        self.save(&StoredTokens::default())
    }
}

/// TOML file storage, e.g. `~/.artshare/tokens.toml`.
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Result<StoredTokens, TokenStorageError> {
        if !self.path.exists() {
            return Ok(StoredTokens::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&content)?)
    }

    fn save(&self, tokens: &StoredTokens) -> Result<(), TokenStorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(tokens)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
