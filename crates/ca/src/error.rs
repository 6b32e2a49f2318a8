//! CA key management error types.
//!
//! Errors fall into three classes (see [`ErrorKind`]): user input errors the
//! caller can fix and retry, the conflict raised when a CA already exists,
//! and internal errors that abort the current call. A failed rollback is an
//! internal error carrying every stage that failed, so operators can tell
//! that a public key was left behind without its private half.

use std::fmt;

use sshca_storage::{ConfigError, StorageError};
use thiserror::Error;

/// Classification of a [`CaError`] at the request boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed field combination or unparsable key text. Correct and retry.
    User,
    /// A CA key pair is already configured. Delete it first.
    Conflict,
    /// Storage or generation failure. Not user-correctable.
    Internal,
}

/// A step of the two-phase persist performed by
/// [`CaKeyManager::configure`](crate::CaKeyManager::configure).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistStage {
    /// Writing the public half at its current path.
    StorePublicKey,
    /// Writing the private half at its current path.
    StorePrivateKey,
    /// Deleting the public half after the private write failed.
    CleanupPublicKey,
}

impl fmt::Display for PersistStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self {
            Self::StorePublicKey => "store CA public key",
            Self::StorePrivateKey => "store CA private key",
            Self::CleanupPublicKey => "cleanup CA public key",
        };
        f.write_str(action)
    }
}

/// One failed persist stage and the storage error behind it.
#[derive(Debug, Error)]
#[error("failed to {stage}: {error}")]
pub struct StageFailure {
    /// The stage that failed.
    pub stage: PersistStage,
    /// The backend error it failed with.
    #[source]
    pub error: StorageError,
}

/// The private-key write failed and so did the compensating delete of the
/// public key. The store now holds a public key with no private counterpart
/// and needs manual cleanup.
#[derive(Debug)]
pub struct RollbackError {
    failures: Vec<StageFailure>,
}

impl RollbackError {
    pub(crate) fn new(failures: Vec<StageFailure>) -> Self {
        Self { failures }
    }

    /// Every stage that failed, in the order they were attempted.
    #[must_use]
    pub fn failures(&self) -> &[StageFailure] {
        &self.failures
    }

    /// Returns `true` if `stage` is among the failures.
    #[must_use]
    pub fn failed_at(&self, stage: PersistStage) -> bool {
        self.failures.iter().any(|f| f.stage == stage)
    }
}

impl fmt::Display for RollbackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} errors occurred:", self.failures.len())?;
        for failure in &self.failures {
            write!(f, "\n\t* {failure}")?;
        }
        Ok(())
    }
}

impl std::error::Error for RollbackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.failures.first().map(|f| f as &(dyn std::error::Error + 'static))
    }
}

/// Errors returned by CA key management operations.
///
/// # Non-exhaustive
///
/// New variants may be added in future minor releases. Downstream match
/// expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CaError {
    /// The request's field combination or key text was rejected.
    ///
    /// The message is meant to be shown to the caller verbatim.
    #[error("{0}")]
    InvalidRequest(String),

    /// A CA key pair (or half of one) is already stored.
    #[error("keys are already configured; delete them before reconfiguring")]
    AlreadyConfigured,

    /// The random source or RSA key construction failed.
    #[error("failed to generate signing key: {0}")]
    KeyGeneration(String),

    /// Neither generation nor validation produced non-empty key text.
    #[error("failed to generate or parse the keys")]
    MissingKeyMaterial,

    /// A storage backend call failed.
    #[error("{context}: {source}")]
    Storage {
        /// What was being attempted, e.g. `failed to read CA public key`.
        context: &'static str,
        /// The underlying storage error.
        #[source]
        source: StorageError,
    },

    /// Storing the private key failed and the public key could not be removed.
    #[error(transparent)]
    Rollback(#[from] RollbackError),

    /// A [`CaConfig`](crate::CaConfig) value was out of range.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl CaError {
    pub(crate) fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub(crate) fn storage(context: &'static str, source: StorageError) -> Self {
        Self::Storage { context, source }
    }

    /// Classifies this error for the request boundary.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRequest(_) => ErrorKind::User,
            Self::AlreadyConfigured => ErrorKind::Conflict,
            Self::KeyGeneration(_)
            | Self::MissingKeyMaterial
            | Self::Storage { .. }
            | Self::Rollback(_)
            | Self::Config(_) => ErrorKind::Internal,
        }
    }

    /// Returns `true` for errors the caller can fix by changing the request.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        self.kind() == ErrorKind::User
    }

    /// Returns `true` if a CA key pair already exists.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }
}

/// Result type alias for CA operations.
pub type Result<T> = std::result::Result<T, CaError>;
