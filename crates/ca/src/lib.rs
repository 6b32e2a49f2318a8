//! # SSH CA signing key management
//!
//! Provisions the key pair an SSH certificate authority signs with, and
//! keeps its at-rest representation consistent.
//!
//! This crate provides:
//! - **Configuration**: generate an RSA key pair, or validate and store caller-supplied key text
//! - **Write-once semantics**: an existing CA is never overwritten; delete it first
//! - **Rollback**: a failed private-key write removes the public key written before it
//! - **Migration**: keys stored at legacy paths are promoted on first read
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use sshca_ca::{CaConfig, CaKeyManager, ConfigureCaRequest};
//! use sshca_storage::MemoryBackend;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = Arc::new(MemoryBackend::new());
//! let manager = CaKeyManager::with_config(backend, CaConfig::builder().key_bits(4096).build()?)?;
//!
//! let request = ConfigureCaRequest::builder().generate_signing_key(true).build();
//! manager.configure(&request).await?;
//!
//! // Reconfiguring requires an explicit delete.
//! assert!(manager.configure(&request).await.unwrap_err().is_conflict());
//! manager.delete().await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Authorized-key and PEM encoding of key material.
pub mod codec;
/// CA configuration.
pub mod config;
/// Error types.
pub mod error;
/// RSA key pair generation.
pub mod generator;
/// Role-addressed key storage with legacy path migration.
pub mod key_store;
/// Configure, delete and read operations.
pub mod manager;
/// Request decision table and response types.
pub mod request;

// Re-export key types for convenience
pub use codec::{KeyEncodeError, KeyParseError, PrivateKeyHandle};
pub use config::{CaConfig, MIN_KEY_BITS};
pub use error::{CaError, ErrorKind, PersistStage, Result, RollbackError, StageFailure};
pub use generator::{DEFAULT_KEY_BITS, SigningKeyPair};
pub use key_store::{
    CA_PRIVATE_KEY_PATH, CA_PRIVATE_KEY_PATH_DEPRECATED, CA_PUBLIC_KEY_PATH,
    CA_PUBLIC_KEY_PATH_DEPRECATED, KeyLocation, KeyRole, MigratingKeyStore,
};
pub use manager::CaKeyManager;
pub use request::{CaResponse, ConfigureCaRequest, GenerateFlag, KeySource, resolve_key_source};
