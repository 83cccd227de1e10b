use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::trace;

use crate::storage::{KeyValueStore, StorageError};

/// One `<key>.json` file per key inside a data directory.
pub struct FileStorage {
    root: PathBuf
}

impl FileStorage {
    /// The directory is created lazily on the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[cfg(test)]
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let is_valid = !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

        if !is_valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        Ok(self.root.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;

        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(StorageError::io(path, error))
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;

        fs::create_dir_all(&self.root).map_err(|error| StorageError::io(&self.root, error))?;

        // staged write, then rename into place
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value).map_err(|error| StorageError::io(&staging, error))?;
        fs::rename(&staging, &path).map_err(|error| StorageError::io(&path, error))?;

        trace!("Wrote [{key}] to {}", path.display());

        Ok(())
    }
}
