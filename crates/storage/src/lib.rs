//! Storage backend abstraction for the SSH CA key manager.
//!
//! This crate provides the [`StorageBackend`] trait that the CA layer
//! persists key material through, an in-memory implementation, and the
//! shared error types.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Calling layer (routing)                    │
//! ├─────────────────────────────────────────────────────────────┤
//! │                        sshca-ca                             │
//! │   CaKeyManager │ MigratingKeyStore │ codec │ generator      │
//! ├─────────────────────────────────────────────────────────────┤
//! │                     sshca-storage                           │
//! │        StorageBackend trait (get, set, cas, delete)         │
//! ├─────────────────────────────────────────────────────────────┤
//! │   MemoryBackend (testing)   │   host-provided backends      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use sshca_storage::{MemoryBackend, StorageBackend};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = MemoryBackend::new();
//!
//!     backend.set(b"config/ca_public_key".to_vec(), b"ssh-rsa AAAA".to_vec()).await?;
//!     let value = backend.get(b"config/ca_public_key").await?;
//!     assert!(value.is_some());
//!
//!     backend.delete(b"config/ca_public_key").await?;
//!     Ok(())
//! }
//! ```
//!
//! # Feature Flags
//!
//! - **`testutil`**: Enables the `testutil` module with a fault-injecting backend and seeding
//!   helpers. Enable this in `[dev-dependencies]` for integration tests.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod error;
pub mod memory;
#[cfg(any(test, feature = "testutil"))]
#[allow(clippy::expect_used)]
pub mod testutil;
pub mod types;

// Re-export primary types at crate root for convenience
pub use backend::StorageBackend;
pub use error::{BoxError, ConfigError, StorageError, StorageResult};
pub use memory::MemoryBackend;
pub use types::StorageEntry;
