//! Atomic file operations for small serde documents.
//!
//! Writes go to a temporary sibling file which is fsynced and renamed over the
//! target, under an exclusive lock file.

use humor_core::error::{HumorError, Result};
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// On-disk encoding of an [`AtomicFile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Toml,
    Json,
}

impl FileFormat {
    fn encode<T: Serialize>(self, data: &T) -> Result<String> {
        match self {
            FileFormat::Toml => Ok(toml::to_string_pretty(data)?),
            FileFormat::Json => Ok(serde_json::to_string_pretty(data)?),
        }
    }

    fn decode<T: DeserializeOwned>(self, content: &str) -> Result<T> {
        match self {
            FileFormat::Toml => Ok(toml::from_str(content)?),
            FileFormat::Json => Ok(serde_json::from_str(content)?),
        }
    }
}

/// A handle to a serde document stored with atomic replace semantics.
pub struct AtomicFile<T> {
    path: PathBuf,
    format: FileFormat,
    private: bool,
    _phantom: PhantomData<T>,
}

impl<T> AtomicFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf, format: FileFormat) -> Self {
        Self {
            path,
            format,
            private: false,
            _phantom: PhantomData,
        }
    }

    /// Restricts the file to its owner (0600) on Unix.
    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and deserializes the file.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(T))`: Successfully loaded and deserialized
    /// - `Ok(None)`: File doesn't exist or is empty
    /// - `Err`: Failed to read or parse the file
    pub fn load(&self) -> Result<Option<T>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(self.format.decode(&content)?))
    }

    /// Saves data atomically.
    pub fn save(&self, data: &T) -> Result<()> {
        let _lock = FileLock::acquire(&self.path)?;

        let encoded = self.format.encode(data)?;

        let tmp_path = self.temp_path()?;
        // A leftover temp file would keep its old mode.
        let _ = fs::remove_file(&tmp_path);
        let mut tmp_file = self.open_temp(&tmp_path)?;
        tmp_file.write_all(encoded.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Removes the file. Missing files are not an error.
    pub fn remove(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Creates the temp file, owner-only from the start when private.
    fn open_temp(&self, tmp_path: &Path) -> Result<File> {
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        if self.private {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        Ok(options.open(tmp_path)?)
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| HumorError::io("Path has no parent directory"))?;
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| HumorError::io("Path has no file name"))?;

        Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
    }
}

/// Exclusive lock held for the duration of a write.
struct FileLock {
    #[allow(dead_code)]
    file: File,
    lock_path: PathBuf,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive()
                .map_err(|e| HumorError::io(format!("Failed to acquire lock: {}", e)))?;
        }

        Ok(FileLock { file, lock_path })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn test_load_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicFile::<Sample>::new(temp_dir.path().join("missing.toml"), FileFormat::Toml);
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_save_leaves_no_temp_or_lock_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("data.json");
        let file = AtomicFile::<Sample>::new(path.clone(), FileFormat::Json);

        file.save(&Sample {
            name: "json".to_string(),
            count: 3,
        })
        .unwrap();

        assert!(path.exists());
        assert!(!temp_dir.path().join("nested").join(".data.json.tmp").exists());
        assert!(!temp_dir.path().join("nested").join("data.lock").exists());
        assert_eq!(file.load().unwrap().unwrap().count, 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_private_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("secret.json");
        let file = AtomicFile::<Sample>::new(path.clone(), FileFormat::Json).private();
        file.save(&Sample {
            name: "s".to_string(),
            count: 1,
        })
        .unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_private_temp_file_is_owner_only_before_write() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        let file = AtomicFile::<Sample>::new(path, FileFormat::Json).private();
        let tmp_path = file.temp_path().unwrap();

        let handle = file.open_temp(&tmp_path).unwrap();
        let mode = handle.metadata().unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_stale_temp_file_does_not_leak_its_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        let stale = temp_dir.path().join(".session.json.tmp");
        fs::write(&stale, "{}").unwrap();
        fs::set_permissions(&stale, fs::Permissions::from_mode(0o644)).unwrap();

        let file = AtomicFile::<Sample>::new(path.clone(), FileFormat::Json).private();
        file.save(&Sample {
            name: "s".to_string(),
            count: 2,
        })
        .unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(file.load().unwrap().unwrap().count, 2);
    }

    #[test]
    fn test_remove_missing_file_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicFile::<Sample>::new(temp_dir.path().join("gone.json"), FileFormat::Json);
        file.remove().unwrap();
    }

    #[test]
    fn test_corrupt_file_is_serialization_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.toml");
        fs::write(&path, "name = [unterminated").unwrap();

        let err = AtomicFile::<Sample>::new(path, FileFormat::Toml).load().unwrap_err();
        assert!(matches!(err, HumorError::Serialization { .. }));
    }
}
