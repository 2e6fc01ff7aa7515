//! In-memory record store, used by tests and embedders that manage
//! persistence themselves.

use std::collections::HashMap;

use crate::errors::Result;

use super::RecordStore;

/// `HashMap`-backed store with no persistence.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: HashMap<String, Vec<u8>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no records are stored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Direct access to a raw record, for corruption tests.
    pub fn raw(&self, key: &str) -> Option<&Vec<u8>> {
        self.records.get(key)
    }

    /// Overwrite a raw record without going through the vault, for
    /// corruption tests.
    pub fn set_raw(&mut self, key: &str, value: Vec<u8>) {
        self.records.insert(key.to_string(), value);
    }
}

impl RecordStore for MemoryRecordStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.records.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.records.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        self.records.remove(key);
        Ok(())
    }
}
