//! Run-level error taxonomy

use std::fmt;
use std::io;

use gpget_openpgp::SignatureEncoding;

use crate::config::ConfigError;
use crate::exit::ExitCode;

/// Which resource a fetch was for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// The file the operator asked for
    Artifact,
    /// The companion signature of that file
    Signature(SignatureEncoding),
}

/// A fetched URL and its role in the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTarget {
    pub url: String,
    pub kind: ResourceKind,
}

impl FetchTarget {
    pub fn artifact(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: ResourceKind::Artifact,
        }
    }

    pub fn signature(url: impl Into<String>, encoding: SignatureEncoding) -> Self {
        Self {
            url: url.into(),
            kind: ResourceKind::Signature(encoding),
        }
    }
}

impl fmt::Display for FetchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ResourceKind::Artifact => write!(f, "file {}", self.url),
            ResourceKind::Signature(encoding) => {
                write!(f, "{} signature {}", encoding, self.url)
            }
        }
    }
}

/// Errors that end a run
#[derive(Debug, thiserror::Error)]
pub enum GpgetError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{target} does not exist{}", missing_signature_hint(.target))]
    FetchNotFound { target: FetchTarget },

    #[error("transport error retrieving {target}: {reason}")]
    FetchTransport { target: FetchTarget, reason: String },

    #[error(transparent)]
    Verification(#[from] gpget_openpgp::Error),

    #[error("unable to write verified content to {destination}: {source}")]
    Output {
        destination: String,
        #[source]
        source: io::Error,
    },
}

fn missing_signature_hint(target: &FetchTarget) -> String {
    match target.kind {
        ResourceKind::Artifact => String::new(),
        ResourceKind::Signature(encoding) => {
            format!("; the file must carry a detached {} signature", encoding)
        }
    }
}

/// Result type for run operations
pub type GpgetResult<T> = Result<T, GpgetError>;

impl GpgetError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        use gpget_openpgp::Error as Core;

        match self {
            GpgetError::Config(_) => ExitCode::Config,
            GpgetError::FetchNotFound { target } => match target.kind {
                ResourceKind::Artifact => ExitCode::NotFound,
                ResourceKind::Signature(_) => ExitCode::SignatureRejected,
            },
            GpgetError::FetchTransport { .. } => ExitCode::Transport,
            GpgetError::Verification(err) => match err {
                Core::KeyringUnavailable { .. } | Core::KeyringCorrupt { .. } => {
                    ExitCode::TrustStore
                }
                Core::MalformedClearsign { .. } | Core::SignatureInvalid => {
                    ExitCode::SignatureRejected
                }
                Core::InvalidIdentityLength { .. } | Core::InvalidIdentityDigits { .. } => {
                    ExitCode::Config
                }
                Core::IdentityMismatch { .. } => ExitCode::SignerMismatch,
            },
            GpgetError::Output { .. } => ExitCode::Output,
        }
    }
}
