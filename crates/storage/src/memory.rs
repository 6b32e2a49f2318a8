//! In-memory storage backend implementation.
//!
//! [`MemoryBackend`] keeps entries in a [`BTreeMap`] behind a
//! [`parking_lot::RwLock`]. It is intended for tests and local development;
//! nothing is persisted.
//!
//! # Example
//!
//! ```
//! use sshca_storage::{MemoryBackend, StorageBackend};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = MemoryBackend::new();
//!
//!     backend.set(b"config/ca_bundle".to_vec(), b"-----BEGIN".to_vec()).await.unwrap();
//!     let value = backend.get(b"config/ca_bundle").await.unwrap();
//!
//!     assert_eq!(value.unwrap().as_ref(), b"-----BEGIN");
//! }
//! ```

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;

use crate::{
    backend::StorageBackend,
    error::{StorageError, StorageResult},
    types::StorageEntry,
};

/// In-memory storage backend using [`BTreeMap`].
///
/// # Cloning
///
/// `MemoryBackend` is cheaply cloneable via [`Arc`]. All clones share the
/// same underlying data.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    data: Arc<RwLock<BTreeMap<Vec<u8>, Bytes>>>,
}

impl MemoryBackend {
    /// Creates a new, empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of every stored entry in key order.
    ///
    /// Keys that are not valid UTF-8 are rendered lossily.
    #[must_use]
    pub fn entries(&self) -> Vec<StorageEntry> {
        self.data
            .read()
            .iter()
            .map(|(k, v)| StorageEntry::new(String::from_utf8_lossy(k), v.clone()))
            .collect()
    }

    /// Returns the number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    #[tracing::instrument(skip_all, fields(key = %String::from_utf8_lossy(key)))]
    async fn get(&self, key: &[u8]) -> StorageResult<Option<Bytes>> {
        let data = self.data.read();
        Ok(data.get(key).cloned())
    }

    #[tracing::instrument(skip_all, fields(key = %String::from_utf8_lossy(&key)))]
    async fn set(&self, key: Vec<u8>, value: Vec<u8>) -> StorageResult<()> {
        let mut data = self.data.write();
        data.insert(key, Bytes::from(value));
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(key = %String::from_utf8_lossy(key)))]
    async fn compare_and_set(
        &self,
        key: &[u8],
        expected: Option<&[u8]>,
        new_value: Vec<u8>,
    ) -> StorageResult<()> {
        let mut data = self.data.write();

        let matches = match (expected, data.get(key)) {
            (None, None) => true,
            (Some(exp), Some(cur)) => exp == &cur[..],
            _ => false,
        };

        if !matches {
            return Err(StorageError::conflict(String::from_utf8_lossy(key)));
        }

        data.insert(key.to_vec(), Bytes::from(new_value));
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(key = %String::from_utf8_lossy(key)))]
    async fn delete(&self, key: &[u8]) -> StorageResult<()> {
        let mut data = self.data.write();
        data.remove(key);
        Ok(())
    }
}
