//! Role-addressed CA key storage with legacy path migration.
//!
//! Each half of the CA key pair lives at a fixed storage path. Older
//! deployments wrote them elsewhere; reads fall back to those deprecated
//! paths and promote whatever they find:
//!
//! | Role | Current path | Deprecated path |
//! |------|--------------|-----------------|
//! | [`KeyRole::Public`] | `config/ca_public_key` | `public_key` |
//! | [`KeyRole::Private`] | `config/ca_private_key` | `config/ca_bundle` |
//!
//! Promotion is write-then-delete with no transaction around it. If the
//! delete fails the legacy entry is left behind as an orphan; the current
//! path already holds the authoritative copy.

use std::{fmt, sync::Arc};

use bytes::Bytes;
use sshca_storage::{StorageBackend, StorageError, StorageResult};

/// Current storage path of the CA public key.
pub const CA_PUBLIC_KEY_PATH: &str = "config/ca_public_key";
/// Legacy storage path of the CA public key.
pub const CA_PUBLIC_KEY_PATH_DEPRECATED: &str = "public_key";
/// Current storage path of the CA private key.
pub const CA_PRIVATE_KEY_PATH: &str = "config/ca_private_key";
/// Legacy storage path of the CA private key.
pub const CA_PRIVATE_KEY_PATH_DEPRECATED: &str = "config/ca_bundle";

/// Which half of the CA key pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyRole {
    /// The authorized-key public half.
    Public,
    /// The PEM private half.
    Private,
}

impl KeyRole {
    /// Where this role is stored now and where it used to be stored.
    #[must_use]
    pub const fn location(self) -> KeyLocation {
        match self {
            Self::Public => KeyLocation {
                current: CA_PUBLIC_KEY_PATH,
                deprecated: CA_PUBLIC_KEY_PATH_DEPRECATED,
            },
            Self::Private => KeyLocation {
                current: CA_PRIVATE_KEY_PATH,
                deprecated: CA_PRIVATE_KEY_PATH_DEPRECATED,
            },
        }
    }
}

impl fmt::Display for KeyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => f.write_str("ca_public_key"),
            Self::Private => f.write_str("ca_private_key"),
        }
    }
}

/// Current and deprecated storage paths of one [`KeyRole`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyLocation {
    /// Authoritative path.
    pub current: &'static str,
    /// Legacy path, read only as a fallback and removed on promotion.
    pub deprecated: &'static str,
}

/// Reads and writes CA key halves by role over a [`StorageBackend`].
#[derive(Clone)]
pub struct MigratingKeyStore {
    backend: Arc<dyn StorageBackend>,
}

impl MigratingKeyStore {
    /// Wraps a storage backend.
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Reads the key text for `role`, promoting it from the deprecated path
    /// if that is the only place it exists.
    ///
    /// # Returns
    ///
    /// - `Ok(text)` with the stored value
    /// - `Ok(String::new())` if the role is not configured at either path
    ///
    /// # Errors
    ///
    /// Any backend error is returned unchanged. A stored value that is not
    /// UTF-8 is reported as [`StorageError::Internal`].
    #[tracing::instrument(skip(self))]
    pub async fn read_logical(&self, role: KeyRole) -> StorageResult<String> {
        match self.read_promoting(role).await? {
            Some(value) => decode_text(role.location().current, value.to_vec()),
            None => Ok(String::new()),
        }
    }

    /// Returns `true` if a non-empty value is stored for `role`, promoting it
    /// from the deprecated path like [`read_logical`](Self::read_logical).
    ///
    /// Stored values are not decoded, so any bytes count as configured.
    #[tracing::instrument(skip(self))]
    pub async fn is_configured(&self, role: KeyRole) -> StorageResult<bool> {
        Ok(self.read_promoting(role).await?.is_some_and(|value| !value.is_empty()))
    }

    async fn read_promoting(&self, role: KeyRole) -> StorageResult<Option<Bytes>> {
        let location = role.location();

        if let Some(value) = self.backend.get(location.current.as_bytes()).await? {
            return Ok(Some(value));
        }

        let Some(value) = self.backend.get(location.deprecated.as_bytes()).await? else {
            return Ok(None);
        };

        self.backend.set(location.current.as_bytes().to_vec(), value.to_vec()).await?;
        self.backend.delete(location.deprecated.as_bytes()).await?;

        tracing::info!(
            from = location.deprecated,
            to = location.current,
            "promoted CA key from deprecated storage path"
        );

        Ok(Some(value))
    }

    /// Writes `text` at the current path of `role`, overwriting any value.
    #[tracing::instrument(skip(self, text))]
    pub async fn write(&self, role: KeyRole, text: &str) -> StorageResult<()> {
        self.backend.set(role.location().current.as_bytes().to_vec(), text.as_bytes().to_vec()).await
    }

    /// Writes `text` at the current path of `role` only if nothing is stored
    /// there.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Conflict`] if the path is already occupied.
    #[tracing::instrument(skip(self, text))]
    pub async fn write_new(&self, role: KeyRole, text: &str) -> StorageResult<()> {
        self.backend
            .compare_and_set(role.location().current.as_bytes(), None, text.as_bytes().to_vec())
            .await
    }

    /// Deletes the current path of `role`. Deprecated paths are untouched.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, role: KeyRole) -> StorageResult<()> {
        self.backend.delete(role.location().current.as_bytes()).await
    }
}

fn decode_text(path: &str, value: Vec<u8>) -> StorageResult<String> {
    String::from_utf8(value).map_err(|e| {
        StorageError::internal_with_source(format!("value at {path} is not valid UTF-8"), e)
    })
}
