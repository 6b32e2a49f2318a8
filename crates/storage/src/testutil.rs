//! Shared test utilities for storage-backed code.
//!
//! Feature-gated behind `testutil` to keep fault injection out of
//! production builds.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! sshca-storage = { path = "../storage", features = ["testutil"] }
//! ```
//!
//! ```no_run
//! // Requires the `testutil` feature to be enabled.
//! use sshca_storage::testutil::{FailingBackend, Operation};
//! ```

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;

use crate::{
    StorageBackend,
    error::{StorageError, StorageResult},
    memory::MemoryBackend,
};

/// A storage operation kind, used to target injected faults and to record
/// the order in which a caller touched the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// [`StorageBackend::get`].
    Get,
    /// [`StorageBackend::set`].
    Set,
    /// [`StorageBackend::compare_and_set`].
    CompareAndSet,
    /// [`StorageBackend::delete`].
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Get => "get",
            Self::Set => "set",
            Self::CompareAndSet => "compare_and_set",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// One recorded call against a [`FailingBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Which operation was invoked.
    pub operation: Operation,
    /// The key it targeted.
    pub key: String,
    /// Whether an injected fault made it fail.
    pub failed: bool,
}

/// A wrapper around [`MemoryBackend`] that fails chosen `(operation, key)`
/// pairs with [`StorageError::Connection`] and records every call.
///
/// A failing call never reaches the inner backend, so its state is exactly
/// what a real backend would hold after rejecting the write.
#[derive(Clone, Default)]
pub struct FailingBackend {
    inner: MemoryBackend,
    faults: Arc<Mutex<Vec<(Operation, String)>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl FailingBackend {
    /// Wraps an existing backend; clones share the inner data.
    #[must_use]
    pub fn new(inner: MemoryBackend) -> Self {
        Self { inner, ..Self::default() }
    }

    /// Makes every future `operation` on `key` fail.
    pub fn fail_on(&self, operation: Operation, key: impl Into<String>) {
        self.faults.lock().push((operation, key.into()));
    }

    /// Removes all injected faults.
    pub fn clear_faults(&self) {
        self.faults.lock().clear();
    }

    /// Returns the wrapped backend for direct inspection.
    #[must_use]
    pub fn inner(&self) -> &MemoryBackend {
        &self.inner
    }

    /// Returns every call seen so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Returns the calls of one operation kind, in order.
    #[must_use]
    pub fn calls_of(&self, operation: Operation) -> Vec<RecordedCall> {
        self.calls.lock().iter().filter(|c| c.operation == operation).cloned().collect()
    }

    /// Returns `true` if no write (`set`, `compare_and_set`, `delete`) was attempted.
    #[must_use]
    pub fn no_writes_attempted(&self) -> bool {
        self.calls.lock().iter().all(|c| c.operation == Operation::Get)
    }

    fn check(&self, operation: Operation, key: &[u8]) -> StorageResult<()> {
        let key = String::from_utf8_lossy(key).into_owned();
        let failed = self.faults.lock().iter().any(|(op, k)| *op == operation && *k == key);
        self.calls.lock().push(RecordedCall { operation, key: key.clone(), failed });

        if failed {
            return Err(StorageError::connection(format!("injected {operation} failure on {key}")));
        }
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for FailingBackend {
    async fn get(&self, key: &[u8]) -> StorageResult<Option<Bytes>> {
        self.check(Operation::Get, key)?;
        self.inner.get(key).await
    }

    async fn set(&self, key: Vec<u8>, value: Vec<u8>) -> StorageResult<()> {
        self.check(Operation::Set, &key)?;
        self.inner.set(key, value).await
    }

    async fn compare_and_set(
        &self,
        key: &[u8],
        expected: Option<&[u8]>,
        new_value: Vec<u8>,
    ) -> StorageResult<()> {
        self.check(Operation::CompareAndSet, key)?;
        self.inner.compare_and_set(key, expected, new_value).await
    }

    async fn delete(&self, key: &[u8]) -> StorageResult<()> {
        self.check(Operation::Delete, key)?;
        self.inner.delete(key).await
    }
}

/// Creates a [`MemoryBackend`] holding the given `(path, value)` entries.
///
/// # Panics
///
/// Panics if any `set` fails (should not happen with `MemoryBackend`).
pub async fn seeded_backend(entries: &[(&str, &str)]) -> MemoryBackend {
    let backend = MemoryBackend::new();
    for (key, value) in entries {
        backend
            .set(key.as_bytes().to_vec(), value.as_bytes().to_vec())
            .await
            .expect("seed set failed");
    }
    backend
}

/// Reads `key` from `backend` as UTF-8 text.
///
/// # Panics
///
/// Panics if the read fails or the value is not valid UTF-8.
pub async fn read_text(backend: &dyn StorageBackend, key: &str) -> Option<String> {
    backend
        .get(key.as_bytes())
        .await
        .expect("read failed")
        .map(|value| String::from_utf8(value.to_vec()).expect("value is not UTF-8"))
}
