//! Storage backend trait definition.
//!
//! [`StorageBackend`] is the minimal key/value contract the CA layer needs:
//! single-key reads, writes and deletes, plus an insert-if-absent primitive.
//! Backends guarantee per-key atomicity only. There is no multi-key
//! transaction, so callers that write several keys must compensate on
//! partial failure themselves.
//!
//! # Implementing a Backend
//!
//! 1. Implement the [`StorageBackend`] trait
//! 2. Map backend-specific errors to [`StorageError`](crate::StorageError)
//!
//! See [`MemoryBackend`](crate::MemoryBackend) for a reference implementation.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StorageResult;

/// Abstract storage backend for key/value operations.
///
/// Backends are expected to be thread-safe (`Send + Sync`). Values are
/// copied in and out; nothing returned by a backend aliases its internal
/// state.
///
/// | Method | Description |
/// |--------|-------------|
/// | [`get`](StorageBackend::get) | Retrieve a single value by key |
/// | [`set`](StorageBackend::set) | Store a key/value pair |
/// | [`compare_and_set`](StorageBackend::compare_and_set) | Atomic compare-and-swap |
/// | [`delete`](StorageBackend::delete) | Remove a key |
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use sshca_storage::{MemoryBackend, StorageBackend};
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let backend = MemoryBackend::new();
///
/// backend.set(b"config/ca_public_key".to_vec(), b"ssh-rsa AAAA".to_vec()).await.unwrap();
/// let value = backend.get(b"config/ca_public_key").await.unwrap();
/// assert_eq!(value, Some(Bytes::from("ssh-rsa AAAA")));
/// # });
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Retrieves a value by key.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(bytes))` if the key exists
    /// - `Ok(None)` if the key doesn't exist
    /// - `Err(...)` on storage errors
    #[must_use = "storage operations may fail and errors must be handled"]
    async fn get(&self, key: &[u8]) -> StorageResult<Option<Bytes>>;

    /// Stores a key/value pair, overwriting any existing value.
    #[must_use = "storage operations may fail and errors must be handled"]
    async fn set(&self, key: Vec<u8>, value: Vec<u8>) -> StorageResult<()>;

    /// Atomically sets a key's value if it matches the expected current value.
    ///
    /// - **`expected: None`** — insert-if-absent. Fails with
    ///   [`Conflict`](crate::StorageError::Conflict) if any value is present.
    /// - **`expected: Some(value)`** — update-if-unchanged. Fails with
    ///   [`Conflict`](crate::StorageError::Conflict) if the key is absent or holds a different
    ///   value.
    ///
    /// The comparison is exact, length-sensitive byte equality.
    ///
    /// # Example
    ///
    /// ```
    /// use sshca_storage::{MemoryBackend, StorageBackend};
    ///
    /// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
    /// let backend = MemoryBackend::new();
    ///
    /// backend.compare_and_set(b"lock", None, b"holder-1".to_vec()).await.unwrap();
    ///
    /// let second = backend.compare_and_set(b"lock", None, b"holder-2".to_vec()).await;
    /// assert!(second.unwrap_err().is_conflict());
    /// # });
    /// ```
    #[must_use = "compare-and-set may fail with a conflict and errors must be handled"]
    async fn compare_and_set(
        &self,
        key: &[u8],
        expected: Option<&[u8]>,
        new_value: Vec<u8>,
    ) -> StorageResult<()>;

    /// Deletes a key.
    ///
    /// If the key doesn't exist, this is a no-op (returns `Ok(())`).
    #[must_use = "storage operations may fail and errors must be handled"]
    async fn delete(&self, key: &[u8]) -> StorageResult<()>;
}
