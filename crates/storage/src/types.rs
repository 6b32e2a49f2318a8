//! Common types used across storage operations.

use bytes::Bytes;

/// A single stored entry: a hierarchical path and its opaque value.
///
/// Entries are snapshots. Mutating one never affects the backend it came
/// from.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use sshca_storage::StorageEntry;
///
/// let entry = StorageEntry::new("config/ca_public_key", Bytes::from("ssh-rsa AAAA"));
/// assert_eq!(entry.key, "config/ca_public_key");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEntry {
    /// Path identifying this entry, e.g. `config/ca_public_key`.
    pub key: String,

    /// The value stored at this path.
    pub value: Bytes,
}

impl StorageEntry {
    /// Creates a new entry.
    pub fn new(key: impl Into<String>, value: Bytes) -> Self {
        Self { key: key.into(), value }
    }

    /// Returns the value as UTF-8 text, replacing invalid sequences.
    #[must_use]
    pub fn value_lossy(&self) -> String {
        String::from_utf8_lossy(&self.value).into_owned()
    }
}
