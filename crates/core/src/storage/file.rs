//! Directory-backed store.
//!
//! Each key is one `{key}.json` file under the data directory. Writes go to
//! a temporary file that is then renamed over the target.

use std::fs;
use std::path::{Path, PathBuf};

use caisse_shared::config::StorageConfig;
use tracing::debug;

use super::error::StorageError;
use super::KeyValueStore;

/// Store writing one file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `root`. The directory is created on first save.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates a store rooted at the configured data directory.
    #[must_use]
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.data_dir)
    }

    /// Data directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let value = fs::read_to_string(&path).map_err(|e| StorageError::io(key, e))?;
        debug!(key, path = %path.display(), "Loaded value");
        Ok(Some(value))
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root).map_err(|e| StorageError::io(key, e))?;

        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, value).map_err(|e| StorageError::io(key, e))?;
        fs::rename(&temp_path, &path).map_err(|e| StorageError::io(key, e))?;

        debug!(key, path = %path.display(), "Saved value");
        Ok(())
    }
}
