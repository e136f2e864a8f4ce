//! Error taxonomy for keyring loading, format resolution and verification.

use std::io;
use std::path::PathBuf;

/// Errors produced by the verification core.
///
/// Every variant is terminal for a run; callers never retry.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("could not open public keyring at {}: {source}", path.display())]
    KeyringUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error reading public keyring {}: {reason}", path.display())]
    KeyringCorrupt { path: PathBuf, reason: String },

    #[error("problem decoding clearsigned content of {name}: {reason}")]
    MalformedClearsign { name: String, reason: String },

    /// Wrong key, tampered content and unparseable signature bytes all land
    /// here with no further detail.
    #[error("invalid signature or public key not present")]
    SignatureInvalid,

    #[error("key ID must be 8 or 16 hex characters, got {length}")]
    InvalidIdentityLength { length: usize },

    #[error("key ID '{value}' contains non-hex characters")]
    InvalidIdentityDigits { value: String },

    #[error("not signed by the expected key: expected {expected}, got {actual}")]
    IdentityMismatch { expected: String, actual: String },
}

/// Result type for the verification core
pub type Result<T> = std::result::Result<T, Error>;
