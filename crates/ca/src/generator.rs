//! CA key pair generation.
//!
//! Keys come straight from the operating system's CSPRNG; there is no
//! seeding hook and no pool of pre-generated pairs. Generation is CPU-bound
//! (hundreds of milliseconds to seconds at 4096 bits) and runs inline on the
//! calling task.

use std::fmt;

use fail::fail_point;
use rand_core::OsRng;
use rsa::RsaPrivateKey;
use zeroize::Zeroizing;

use crate::{
    codec,
    error::{CaError, Result},
};

/// Default RSA modulus size for generated CA keys.
pub const DEFAULT_KEY_BITS: usize = 4096;

/// An encoded CA key pair.
///
/// The private half is scrubbed from memory on drop and never appears in
/// `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKeyPair {
    public_key: String,
    private_key: Zeroizing<String>,
}

impl SigningKeyPair {
    /// Pairs already-encoded key text.
    pub fn new(public_key: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self { public_key: public_key.into(), private_key: Zeroizing::new(private_key.into()) }
    }

    /// Authorized-key line of the public half.
    #[must_use]
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// PEM block of the private half.
    #[must_use]
    pub fn private_key(&self) -> &str {
        &self.private_key
    }

    /// Returns `true` if both halves hold text.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.public_key.is_empty() && !self.private_key.is_empty()
    }
}

impl fmt::Debug for SigningKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKeyPair")
            .field("public_key", &self.public_key)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

/// Generates a fresh RSA key pair of `bits` bits and encodes it through
/// [`codec`].
///
/// # Errors
///
/// Returns [`CaError::KeyGeneration`] if the random source, key construction
/// or encoding fails.
#[tracing::instrument]
pub fn generate(bits: usize) -> Result<SigningKeyPair> {
    fail_point!("ca-before-key-generation", |_| {
        Err(CaError::KeyGeneration("injected fault: ca-before-key-generation".into()))
    });

    let private = RsaPrivateKey::new(&mut OsRng, bits)
        .map_err(|e| CaError::KeyGeneration(e.to_string()))?;

    let public_key = codec::encode_public_key(&private.to_public_key())
        .map_err(|e| CaError::KeyGeneration(e.to_string()))?;
    let private_key =
        codec::encode_private_key(&private).map_err(|e| CaError::KeyGeneration(e.to_string()))?;

    tracing::debug!(bits, "generated CA signing key pair");

    Ok(SigningKeyPair { public_key, private_key })
}
