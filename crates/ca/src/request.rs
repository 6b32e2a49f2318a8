//! Request and response types at the calling-layer boundary, and the
//! decision table that turns a request into a key source.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    codec,
    error::{CaError, ErrorKind, Result},
};

/// Whether the caller asked for a generated key pair.
///
/// Absence of the field is kept distinct from an explicit `false`; the two
/// resolve differently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum GenerateFlag {
    /// `generate_signing_key: true`.
    ExplicitTrue,
    /// `generate_signing_key: false`.
    ExplicitFalse,
    /// Field absent (or `null`).
    #[default]
    Unset,
}

impl From<Option<bool>> for GenerateFlag {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Self::ExplicitTrue,
            Some(false) => Self::ExplicitFalse,
            None => Self::Unset,
        }
    }
}

impl From<bool> for GenerateFlag {
    fn from(value: bool) -> Self {
        Some(value).into()
    }
}

impl From<GenerateFlag> for Option<bool> {
    fn from(flag: GenerateFlag) -> Self {
        match flag {
            GenerateFlag::ExplicitTrue => Some(true),
            GenerateFlag::ExplicitFalse => Some(false),
            GenerateFlag::Unset => None,
        }
    }
}

/// Fields of an update-configuration request.
///
/// Deserializes from the calling layer's field map; missing key fields are
/// empty strings and a missing `generate_signing_key` is
/// [`GenerateFlag::Unset`].
///
/// # Example
///
/// ```
/// use sshca_ca::{ConfigureCaRequest, GenerateFlag};
///
/// let request = ConfigureCaRequest::builder().generate_signing_key(true).build();
/// assert_eq!(request.generate_signing_key, GenerateFlag::ExplicitTrue);
/// assert!(request.public_key.is_empty());
/// ```
#[derive(Clone, Default, PartialEq, Eq, Deserialize, bon::Builder)]
pub struct ConfigureCaRequest {
    /// Authorized-key line of the CA public key.
    #[serde(default)]
    #[builder(into, default)]
    pub public_key: String,

    /// PEM block of the CA private key.
    #[serde(default)]
    #[builder(into, default)]
    pub private_key: String,

    /// Generate a key pair instead of using the key fields.
    #[serde(default)]
    #[builder(into, default)]
    pub generate_signing_key: GenerateFlag,
}

impl fmt::Debug for ConfigureCaRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigureCaRequest")
            .field("public_key", &self.public_key)
            .field("private_key", &if self.private_key.is_empty() { "" } else { "[REDACTED]" })
            .field("generate_signing_key", &self.generate_signing_key)
            .finish()
    }
}

/// Where the key pair for a configure request comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource<'a> {
    /// Generate a fresh pair.
    Generate,
    /// Store the caller's text; both halves have already been parsed.
    Provided {
        /// Caller's public key text, byte-for-byte.
        public_key: &'a str,
        /// Caller's private key text, byte-for-byte.
        private_key: &'a str,
    },
}

/// Applies the configure decision table to `request`.
///
/// Rules are evaluated in order; the first match wins:
///
/// | flag | public | private | outcome |
/// |------|--------|---------|---------|
/// | true | any set | | reject |
/// | true | empty | empty | generate |
/// | false, or unset with both set | empty | | reject `missing public_key` |
/// | " | set | empty | reject `missing private_key` |
/// | " | set | set | parse both, then use them |
/// | unset | empty | empty | generate |
/// | unset | one set | | reject |
///
/// # Errors
///
/// Returns [`CaError::InvalidRequest`] for every rejection, including key
/// text that fails to parse.
pub fn resolve_key_source(request: &ConfigureCaRequest) -> Result<KeySource<'_>> {
    let has_public = !request.public_key.is_empty();
    let has_private = !request.private_key.is_empty();

    match request.generate_signing_key {
        GenerateFlag::ExplicitTrue if has_public || has_private => Err(CaError::invalid_request(
            "public_key and private_key must not be set when generate_signing_key is set to true",
        )),
        GenerateFlag::ExplicitTrue => Ok(KeySource::Generate),
        GenerateFlag::ExplicitFalse => validate_provided(request),
        GenerateFlag::Unset if has_public && has_private => validate_provided(request),
        GenerateFlag::Unset if !has_public && !has_private => Ok(KeySource::Generate),
        GenerateFlag::Unset => Err(CaError::invalid_request(
            "only one of public_key and private_key set; both must be set to use, or both must be \
             blank to auto-generate",
        )),
    }
}

fn validate_provided(request: &ConfigureCaRequest) -> Result<KeySource<'_>> {
    if request.public_key.is_empty() {
        return Err(CaError::invalid_request("missing public_key"));
    }
    if request.private_key.is_empty() {
        return Err(CaError::invalid_request("missing private_key"));
    }

    codec::parse_private_key(&request.private_key).map_err(|e| {
        CaError::invalid_request(format!("Unable to parse private_key as an SSH private key: {e}"))
    })?;
    codec::parse_public_key(&request.public_key).map_err(|e| {
        CaError::invalid_request(format!("Unable to parse public_key as an SSH public key: {e}"))
    })?;

    Ok(KeySource::Provided { public_key: &request.public_key, private_key: &request.private_key })
}

/// Outcome of an operation as seen by the calling layer.
///
/// Internal failures are not represented here; they stay `Err` so the
/// calling layer reports them as hard failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CaResponse {
    /// The operation completed. No data is returned.
    Success,
    /// The request was rejected; `message` is safe to show the caller.
    UserError {
        /// Human-readable rejection reason.
        message: String,
    },
}

impl CaResponse {
    /// Splits an operation result into a response or a hard failure.
    ///
    /// User and conflict errors become [`CaResponse::UserError`]; internal
    /// errors are passed through.
    ///
    /// # Errors
    ///
    /// Returns the original error if it is [`ErrorKind::Internal`].
    pub fn from_result(result: Result<()>) -> Result<Self> {
        match result {
            Ok(()) => Ok(Self::Success),
            Err(err) => match err.kind() {
                ErrorKind::User | ErrorKind::Conflict => {
                    Ok(Self::UserError { message: err.to_string() })
                },
                ErrorKind::Internal => Err(err),
            },
        }
    }

    /// Returns `true` for [`CaResponse::UserError`].
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::UserError { .. })
    }
}
