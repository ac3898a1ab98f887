//! Persistence layer for the Generation Record Store

use crate::error::StorageError;
use crate::store::{GenerationRecord, GenerationStatus, RecordStore};
use crate::types::InputItem;
use bincode;
use sled;
use std::path::Path;
use tracing::debug;

/// Sled-based implementation of RecordStore
///
/// Keys are the UTF-8 bytes of the keyword; values are bincode-encoded
/// records. Every write is a single-key insert, so a crash never leaves a
/// half-written record behind.
pub struct SledRecordStore {
    db: sled::Db,
}

impl SledRecordStore {
    /// Open (or create) a store at the given directory
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let db = sled::open(path).map_err(|e| StorageError::Open {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { db })
    }

    /// Wrap an already opened database
    pub fn from_db(db: sled::Db) -> Self {
        Self { db }
    }

    /// In-memory store that is discarded on drop
    pub fn temporary() -> Result<Self, StorageError> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    /// Get the underlying sled database (for advanced operations)
    pub fn db(&self) -> &sled::Db {
        &self.db
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    /// Flush all pending writes to disk
    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }

    fn encode(record: &GenerationRecord) -> Result<Vec<u8>, StorageError> {
        bincode::serialize(record).map_err(|e| StorageError::Encode {
            keyword: record.keyword.clone(),
            message: e.to_string(),
        })
    }

    fn decode(key: &[u8], value: &[u8]) -> Result<GenerationRecord, StorageError> {
        bincode::deserialize(value).map_err(|e| StorageError::Corrupt {
            keyword: String::from_utf8_lossy(key).into_owned(),
            message: e.to_string(),
        })
    }
}

impl RecordStore for SledRecordStore {
    fn get(&self, keyword: &str) -> Result<Option<GenerationRecord>, StorageError> {
        match self.db.get(keyword.as_bytes())? {
            Some(value) => Ok(Some(Self::decode(keyword.as_bytes(), &value)?)),
            None => Ok(None),
        }
    }

    fn upsert(&self, record: &GenerationRecord) -> Result<(), StorageError> {
        let value = Self::encode(record)?;
        self.db.insert(record.keyword.as_bytes(), value)?;
        self.db.flush()?;
        debug!(keyword = %record.keyword, status = %record.status, "Stored generation record");
        Ok(())
    }

    fn register_pending(&self, items: &[InputItem]) -> Result<usize, StorageError> {
        let mut added = 0;
        for item in items {
            let value = Self::encode(&GenerationRecord::pending(item))?;
            let swapped = self.db.compare_and_swap(
                item.keyword.as_bytes(),
                None as Option<&[u8]>,
                Some(value),
            )?;
            if swapped.is_ok() {
                added += 1;
            }
        }
        if added > 0 {
            self.db.flush()?;
        }
        Ok(added)
    }

    fn list_pending_or_failed(&self) -> Result<Vec<InputItem>, StorageError> {
        let mut items = Vec::new();
        for entry in self.db.iter() {
            let (key, value) = entry?;
            let record = Self::decode(&key, &value)?;
            if record.status != GenerationStatus::Succeeded {
                items.push(record.input_item());
            }
        }
        Ok(items)
    }

    fn get_all(&self) -> Result<Vec<GenerationRecord>, StorageError> {
        let mut records = Vec::new();
        for entry in self.db.iter() {
            let (key, value) = entry?;
            records.push(Self::decode(&key, &value)?);
        }
        Ok(records)
    }
}
