//! The CA key manager: configure, delete and read the CA signing key.
//!
//! # Configure flow
//!
//! ```text
//! request ──► resolve_key_source ──► generate │ parse provided
//!                                        │
//!                                        ▼
//!                 is_configured(public), is_configured(private)
//!                                        │ any non-empty ──► AlreadyConfigured
//!                                        ▼
//!                       write_new(public) ──► write(private)
//!                                                  │ failed
//!                                                  ▼
//!                                           delete(public)
//! ```
//!
//! The backend has no multi-key transaction, so a failed private-key write
//! is compensated by deleting the public key just written. If that delete
//! fails too, both failures are returned as a [`RollbackError`].
//!
//! The public half is written insert-if-absent. Two first-time configure
//! calls racing past the existence check cannot both succeed: the loser
//! gets [`CaError::AlreadyConfigured`] before writing anything.

use std::sync::Arc;

use fail::fail_point;
use sshca_storage::{StorageBackend, StorageResult};

use crate::{
    config::CaConfig,
    error::{CaError, PersistStage, Result, RollbackError, StageFailure},
    generator::{self, SigningKeyPair},
    key_store::{KeyRole, MigratingKeyStore},
    request::{CaResponse, ConfigureCaRequest, KeySource, resolve_key_source},
};

/// Provisions, deletes and reads the CA signing key of one configuration
/// scope.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use sshca_ca::{CaKeyManager, CaResponse, ConfigureCaRequest};
/// use sshca_storage::MemoryBackend;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let manager = CaKeyManager::new(Arc::new(MemoryBackend::new()));
///
/// // No fields: generate a 4096-bit RSA key pair.
/// let response = manager.update_configuration(&ConfigureCaRequest::default()).await?;
/// assert_eq!(response, CaResponse::Success);
///
/// let public_key = manager.public_key().await?;
/// assert!(public_key.is_some_and(|k| k.starts_with("ssh-rsa ")));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CaKeyManager {
    store: MigratingKeyStore,
    config: CaConfig,
}

impl CaKeyManager {
    /// Creates a manager with the default [`CaConfig`].
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { store: MigratingKeyStore::new(backend), config: CaConfig::default() }
    }

    /// Creates a manager with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CaError::Config`] if `config` fails validation.
    pub fn with_config(backend: Arc<dyn StorageBackend>, config: CaConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { store: MigratingKeyStore::new(backend), config })
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &CaConfig {
        &self.config
    }

    /// Configures the CA key pair from `request`.
    ///
    /// # Errors
    ///
    /// - [`CaError::InvalidRequest`] when the decision table rejects the request
    /// - [`CaError::AlreadyConfigured`] when either half is already stored
    /// - [`CaError::KeyGeneration`], [`CaError::MissingKeyMaterial`] or [`CaError::Storage`] on
    ///   internal failures
    /// - [`CaError::Rollback`] when the private write and the public cleanup both failed
    #[tracing::instrument(
        skip(self, request),
        fields(generate_signing_key = ?request.generate_signing_key)
    )]
    pub async fn configure(&self, request: &ConfigureCaRequest) -> Result<()> {
        let source = resolve_key_source(request).inspect_err(|err| {
            tracing::warn!(error = %err, "rejected CA configuration request");
        })?;

        let pair = match source {
            KeySource::Generate => generator::generate(self.config.key_bits)?,
            KeySource::Provided { public_key, private_key } => {
                SigningKeyPair::new(public_key, private_key)
            },
        };

        if !pair.is_complete() {
            return Err(CaError::MissingKeyMaterial);
        }

        self.ensure_unconfigured().await?;
        self.persist(&pair).await?;

        tracing::info!(generated = matches!(source, KeySource::Generate), "CA signing key configured");
        Ok(())
    }

    /// Deletes both halves of the CA key pair at their current paths.
    ///
    /// Deleting an unconfigured CA succeeds. Stops at the first failure; the
    /// public key is not touched if the private delete fails.
    ///
    /// # Errors
    ///
    /// Returns [`CaError::Storage`] if either delete fails.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self) -> Result<()> {
        self.store
            .delete(KeyRole::Private)
            .await
            .map_err(|e| CaError::storage("failed to delete CA private key", e))?;
        self.store
            .delete(KeyRole::Public)
            .await
            .map_err(|e| CaError::storage("failed to delete CA public key", e))?;

        tracing::info!("CA signing key deleted");
        Ok(())
    }

    /// Reads the configured CA public key, promoting it from its legacy path
    /// if necessary.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(line))` with the stored authorized-key text
    /// - `Ok(None)` if no CA is configured
    ///
    /// # Errors
    ///
    /// Returns [`CaError::Storage`] on backend failure.
    #[tracing::instrument(skip(self))]
    pub async fn public_key(&self) -> Result<Option<String>> {
        let key = self
            .store
            .read_logical(KeyRole::Public)
            .await
            .map_err(|e| CaError::storage("failed to read CA public key", e))?;
        Ok((!key.is_empty()).then_some(key))
    }

    /// Update-configuration entry point for the calling layer.
    ///
    /// # Errors
    ///
    /// Returns only internal errors; rejections and conflicts become
    /// [`CaResponse::UserError`].
    pub async fn update_configuration(&self, request: &ConfigureCaRequest) -> Result<CaResponse> {
        CaResponse::from_result(self.configure(request).await)
    }

    /// Delete-configuration entry point for the calling layer.
    ///
    /// # Errors
    ///
    /// Returns [`CaError::Storage`] if a delete fails.
    pub async fn delete_configuration(&self) -> Result<CaResponse> {
        CaResponse::from_result(self.delete().await)
    }

    async fn ensure_unconfigured(&self) -> Result<()> {
        let public_configured = self
            .store
            .is_configured(KeyRole::Public)
            .await
            .map_err(|e| CaError::storage("failed to read CA public key", e))?;
        let private_configured = self
            .store
            .is_configured(KeyRole::Private)
            .await
            .map_err(|e| CaError::storage("failed to read CA private key", e))?;

        if public_configured || private_configured {
            return Err(CaError::AlreadyConfigured);
        }
        Ok(())
    }

    async fn persist(&self, pair: &SigningKeyPair) -> Result<()> {
        self.store.write_new(KeyRole::Public, pair.public_key()).await.map_err(|e| {
            if e.is_conflict() {
                CaError::AlreadyConfigured
            } else {
                CaError::storage("failed to store CA public key", e)
            }
        })?;

        let Err(write_err) = self.write_private(pair).await else {
            return Ok(());
        };

        tracing::warn!(error = %write_err, "failed to store CA private key, removing CA public key");

        match self.store.delete(KeyRole::Public).await {
            Ok(()) => Err(CaError::storage("failed to store CA private key", write_err)),
            Err(cleanup_err) => {
                tracing::error!(
                    error = %cleanup_err,
                    "failed to cleanup CA public key; a public key is stored without its private key"
                );
                Err(RollbackError::new(vec![
                    StageFailure { stage: PersistStage::StorePrivateKey, error: write_err },
                    StageFailure { stage: PersistStage::CleanupPublicKey, error: cleanup_err },
                ])
                .into())
            },
        }
    }

    async fn write_private(&self, pair: &SigningKeyPair) -> StorageResult<()> {
        fail_point!("ca-before-private-key-write", |_| {
            Err(sshca_storage::StorageError::internal("injected fault: ca-before-private-key-write"))
        });

        self.store.write(KeyRole::Private, pair.private_key()).await
    }
}
