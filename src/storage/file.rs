//! File-backed record store — one file per record under a data
//! directory.
//!
//! Writes go to a temp file in the same directory followed by a rename,
//! so readers never see a half-written record.  On Unix the files are
//! created with owner-only permissions.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::errors::{Result, VaultKeeperError};

use super::RecordStore;

/// Stores each record as `<data_dir>/<key>` on disk.
pub struct FileRecordStore {
    data_dir: PathBuf,
}

impl FileRecordStore {
    /// Open a store rooted at `data_dir`, creating the directory if
    /// needed.
    pub fn open(data_dir: &Path) -> Result<Self> {
        if !data_dir.exists() {
            fs::create_dir_all(data_dir)?;
        }
        Ok(Self {
            data_dir: data_dir.to_path_buf(),
        })
    }

    /// Returns the directory this store writes into.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn record_path(&self, key: &str) -> Result<PathBuf> {
        // Record names are fixed constants, but guard against anything
        // that would escape the data directory.
        if key.is_empty() || !key.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
            return Err(VaultKeeperError::InvalidFormat(format!(
                "record name '{key}' is invalid"
            )));
        }
        Ok(self.data_dir.join(key))
    }
}

impl RecordStore for FileRecordStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.record_path(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.record_path(key)?;

        // Atomic write: temp file in the same directory, then rename.
        let tmp_path = self.data_dir.join(format!(".{key}.tmp"));
        fs::write(&tmp_path, value)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            let _ = fs::set_permissions(&tmp_path, perms);
        }

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        let path = self.record_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn set_get_delete_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut store = FileRecordStore::open(dir.path()).unwrap();

        assert!(store.get("master_salt").unwrap().is_none());

        store.set("master_salt", b"0123456789abcdef").unwrap();
        assert_eq!(
            store.get("master_salt").unwrap().unwrap(),
            b"0123456789abcdef"
        );

        store.delete("master_salt").unwrap();
        assert!(store.get("master_salt").unwrap().is_none());
    }

    #[test]
    fn delete_absent_record_is_ok() {
        let dir = TempDir::new().unwrap();
        let mut store = FileRecordStore::open(dir.path()).unwrap();
        assert!(store.delete("never_written").is_ok());
    }

    #[test]
    fn overwrite_replaces_value() {
        let dir = TempDir::new().unwrap();
        let mut store = FileRecordStore::open(dir.path()).unwrap();

        store.set("username", b"alice").unwrap();
        store.set("username", b"bob").unwrap();
        assert_eq!(store.get("username").unwrap().unwrap(), b"bob");
    }

    #[test]
    fn rejects_path_escaping_names() {
        let dir = TempDir::new().unwrap();
        let store = FileRecordStore::open(dir.path()).unwrap();
        assert!(store.get("../outside").is_err());
        assert!(store.get("").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn records_have_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let mut store = FileRecordStore::open(dir.path()).unwrap();
        store.set("entries_envelope", b"{}").unwrap();

        let perms = std::fs::metadata(dir.path().join("entries_envelope"))
            .unwrap()
            .permissions();
        assert_eq!(perms.mode() & 0o777, 0o600);
    }
}
