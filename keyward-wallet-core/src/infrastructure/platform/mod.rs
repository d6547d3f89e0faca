//! Wallet document storage backends
//!
//! SECURITY: documents hold only encrypted key material. File backed
//! documents are still written with owner-only permissions on Unix.

use crate::shared::constants::WALLET_FILE_EXTENSION;
use crate::shared::error::WalletError;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Key/value persistence for serialized wallet documents
pub trait WalletStore: Send + Sync {
    /// Store data under `key`, replacing any previous content
    fn store(&self, key: &str, data: &[u8]) -> Result<(), WalletError>;

    /// Retrieve data; a missing key is `WalletNotFound`
    fn retrieve(&self, key: &str) -> Result<Vec<u8>, WalletError>;

    fn delete(&self, key: &str) -> Result<(), WalletError>;

    fn exists(&self, key: &str) -> Result<bool, WalletError>;

    /// List all stored keys
    fn list_keys(&self) -> Result<Vec<String>, WalletError>;
}

/// One JSON document per wallet under a base directory
pub struct FileStorage {
    base_dir: PathBuf,
}

impl FileStorage {
    /// Open storage rooted at `base_dir`, creating the directory if needed
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self, WalletError> {
        let base_dir = base_dir.into();
        if base_dir.as_os_str().is_empty() {
            return Err(WalletError::config("Storage base directory is empty"));
        }
        fs::create_dir_all(&base_dir)?;
        #[cfg(unix)]
        fs::set_permissions(&base_dir, fs::Permissions::from_mode(0o700))?;
        log::debug!("Using wallet storage at {}", base_dir.display());
        Ok(Self { base_dir })
    }

    // Keys map straight to file names, so anything that could escape the
    // base directory is refused
    fn file_path(&self, key: &str) -> Result<PathBuf, WalletError> {
        if key.is_empty()
            || key.starts_with('.')
            || key.contains(['/', '\\', '\0'])
        {
            return Err(WalletError::validation(format!("Invalid storage key: {:?}", key)));
        }
        Ok(self.base_dir.join(format!("{}.{}", key, WALLET_FILE_EXTENSION)))
    }
}

fn write_staged(staging: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(staging)?;
    #[cfg(unix)]
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(data)?;
    file.sync_all()
}

impl WalletStore for FileStorage {
    fn store(&self, key: &str, data: &[u8]) -> Result<(), WalletError> {
        let path = self.file_path(key)?;
        let staging = path.with_extension(format!("{}.tmp", WALLET_FILE_EXTENSION));

        let written = write_staged(&staging, data).and_then(|()| fs::rename(&staging, &path));
        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&staging) {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Could not remove staging file {}: {}", staging.display(), cleanup);
                }
            }
            return Err(e.into());
        }
        Ok(())
    }

    fn retrieve(&self, key: &str) -> Result<Vec<u8>, WalletError> {
        let path = self.file_path(key)?;
        let mut file = File::open(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => WalletError::wallet_not_found(key.to_string()),
            _ => WalletError::from(e),
        })?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    fn delete(&self, key: &str) -> Result<(), WalletError> {
        match fs::remove_file(self.file_path(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self, key: &str) -> Result<bool, WalletError> {
        Ok(self.file_path(key)?.exists())
    }

    fn list_keys(&self) -> Result<Vec<String>, WalletError> {
        let mut keys = vec![];
        for entry in fs::read_dir(&self.base_dir)?.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(WALLET_FILE_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_stem().and_then(|n| n.to_str()) {
                keys.push(name.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// Process-local storage for tests and embedders that persist elsewhere
#[derive(Default)]
pub struct MemoryStorage {
    data: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>>, WalletError> {
        self.data
            .lock()
            .map_err(|_| WalletError::internal("Memory storage lock poisoned"))
    }
}

impl WalletStore for MemoryStorage {
    fn store(&self, key: &str, data: &[u8]) -> Result<(), WalletError> {
        self.entries()?.insert(key.to_string(), data.to_vec());
        Ok(())
    }

    fn retrieve(&self, key: &str) -> Result<Vec<u8>, WalletError> {
        self.entries()?
            .get(key)
            .cloned()
            .ok_or_else(|| WalletError::wallet_not_found(key.to_string()))
    }

    fn delete(&self, key: &str) -> Result<(), WalletError> {
        self.entries()?.remove(key);
        Ok(())
    }

    fn exists(&self, key: &str) -> Result<bool, WalletError> {
        Ok(self.entries()?.contains_key(key))
    }

    fn list_keys(&self) -> Result<Vec<String>, WalletError> {
        let mut keys: Vec<String> = self.entries()?.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::error::ErrorKind;

    fn exercise(storage: &dyn WalletStore) {
        storage.store("Personal", b"{\"a\":1}").expect("store");
        assert!(storage.exists("Personal").expect("exists"));
        assert_eq!(storage.retrieve("Personal").expect("retrieve"), b"{\"a\":1}");

        storage.store("Personal", b"{}").expect("overwrite");
        assert_eq!(storage.retrieve("Personal").expect("retrieve"), b"{}");

        storage.store("Business", b"{}").expect("store");
        assert_eq!(storage.list_keys().expect("list"), vec!["Business", "Personal"]);

        storage.delete("Personal").expect("delete");
        assert!(!storage.exists("Personal").expect("exists"));
        assert_eq!(
            storage.retrieve("Personal").expect_err("deleted").kind(),
            ErrorKind::WalletNotFound
        );
    }

    #[test]
    fn test_memory_storage() {
        exercise(&MemoryStorage::new());
    }

    #[test]
    fn test_file_storage() {
        let dir = tempfile::tempdir().expect("tempdir");
        exercise(&FileStorage::new(dir.path()).expect("file storage"));
    }

    #[test]
    fn test_file_storage_rejects_path_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path()).expect("file storage");
        for key in ["", "../escape", "a/b", ".hidden"] {
            assert_eq!(
                storage.store(key, b"x").expect_err("bad key").kind(),
                ErrorKind::Validation
            );
        }
    }

    #[test]
    fn test_failed_store_leaves_no_staging_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path()).expect("file storage");
        // A non-empty directory in the way makes the final rename fail
        fs::create_dir_all(dir.path().join("Personal.json").join("occupied")).expect("blocker");

        assert!(storage.store("Personal", b"{}").is_err());
        assert!(!dir.path().join("Personal.json.tmp").exists());
        assert!(dir.path().join("Personal.json").is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_file_storage_permissions() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path().join("wallets")).expect("file storage");
        storage.store("Personal", b"{}").expect("store");
        let mode = fs::metadata(dir.path().join("wallets").join("Personal.json"))
            .expect("metadata")
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
