use std::path::PathBuf;

use thiserror::Error;
use tokio::task::JoinError;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage error: could not access [{path}]: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error
    },
    #[error("Storage error: could not serialize [{key}]: {source}")]
    Serialize {
        key: String,
        source: serde_json::Error
    },
    #[error("Storage error: invalid key [{0}]")]
    InvalidKey(String),
    #[error("Storage error: write did not complete: {0}")]
    Interrupted(#[from] JoinError)
}

impl StorageError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub fn serialize(key: &str, source: serde_json::Error) -> Self {
        Self::Serialize { key: key.to_string(), source }
    }
}
