//! Configuration for [`CaKeyManager`](crate::CaKeyManager).

use serde::{Deserialize, Serialize};
use sshca_storage::ConfigError;

use crate::generator::DEFAULT_KEY_BITS;

/// Smallest RSA modulus accepted for generated keys.
pub const MIN_KEY_BITS: usize = 1024;

/// Tunables for CA key provisioning.
///
/// # Example
///
/// ```
/// use sshca_ca::CaConfig;
///
/// let config = CaConfig::builder().key_bits(4096).build()?;
/// assert_eq!(config.key_bits(), 4096);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaConfig {
    /// RSA modulus size for generated keys.
    #[serde(default = "default_key_bits")]
    pub(crate) key_bits: usize,
}

fn default_key_bits() -> usize {
    DEFAULT_KEY_BITS
}

impl Default for CaConfig {
    fn default() -> Self {
        Self { key_bits: default_key_bits() }
    }
}

#[bon::bon]
impl CaConfig {
    /// Creates a new configuration, validating every field.
    ///
    /// # Optional Fields
    ///
    /// * `key_bits` - RSA modulus size for generated keys (default: 4096).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BelowMinimum`] if `key_bits` is below
    /// [`MIN_KEY_BITS`].
    #[builder]
    pub fn new(#[builder(default = DEFAULT_KEY_BITS)] key_bits: usize) -> Result<Self, ConfigError> {
        let config = Self { key_bits };
        config.validate()?;
        Ok(config)
    }

    /// Checks field ranges. Deserialized configs should be validated before use.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BelowMinimum`] for an out-of-range field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.key_bits < MIN_KEY_BITS {
            return Err(ConfigError::BelowMinimum {
                field: "key_bits",
                min: MIN_KEY_BITS.to_string(),
                value: self.key_bits.to_string(),
            });
        }
        Ok(())
    }

    /// Returns the RSA modulus size for generated keys.
    #[must_use]
    pub fn key_bits(&self) -> usize {
        self.key_bits
    }
}
