//! Signature format resolution
//!
//! Turns fetched bytes into the canonical (signed data, signature, form)
//! triple the verifier works on. Binary and armored detached signatures pass
//! through untouched. Clearsigned content is decoded, and the signature
//! extracted from it takes precedence over any detached signature.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clearsign;
use crate::error::{Error, Result};

/// Signature encoding selected by the operator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureEncoding {
    /// Detached binary signature at `<url>.sig`
    Binary,
    /// Detached ASCII-armored signature at `<url>.asc`
    #[default]
    Armored,
    /// Signature embedded in the document itself
    Clearsigned,
}

impl SignatureEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureEncoding::Binary => "binary",
            SignatureEncoding::Armored => "armored",
            SignatureEncoding::Clearsigned => "clearsigned",
        }
    }

    /// URL suffix of the companion signature resource, if there is one
    pub fn companion_suffix(&self) -> Option<&'static str> {
        match self {
            SignatureEncoding::Binary => Some(".sig"),
            SignatureEncoding::Armored => Some(".asc"),
            SignatureEncoding::Clearsigned => None,
        }
    }
}

impl fmt::Display for SignatureEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureEncoding {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "binary" | "sig" => Ok(SignatureEncoding::Binary),
            "armored" | "armor" | "asc" => Ok(SignatureEncoding::Armored),
            "clearsigned" | "clearsign" => Ok(SignatureEncoding::Clearsigned),
            other => Err(format!(
                "unknown signature encoding '{}' (expected binary, armored or clearsigned)",
                other
            )),
        }
    }
}

/// How the verifier must parse signature bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureForm {
    Binary,
    Armored,
}

/// Output of format resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    /// Bytes the signature was computed over
    pub signed_data: Vec<u8>,
    /// Bytes released once verification succeeds
    pub plaintext: Vec<u8>,
    pub signature: Vec<u8>,
    pub form: SignatureForm,
    /// True when the plaintext was rewritten by clearsign decoding
    pub rewritten: bool,
}

/// Resolve fetched content and an optional detached signature into the
/// triple the verifier checks.
///
/// `name` only appears in error messages.
pub fn resolve(
    name: &str,
    content: &[u8],
    detached: Option<&[u8]>,
    encoding: SignatureEncoding,
) -> Result<ResolvedArtifact> {
    let form = match encoding {
        SignatureEncoding::Binary => SignatureForm::Binary,
        SignatureEncoding::Armored => SignatureForm::Armored,
        SignatureEncoding::Clearsigned => return resolve_clearsigned(name, content, detached),
    };

    // A missing signature never degrades to an unsigned release.
    let signature = detached.filter(|sig| !sig.is_empty()).ok_or(Error::SignatureInvalid)?;

    debug!(name, ?form, bytes = content.len(), "resolved detached signature");
    Ok(ResolvedArtifact {
        signed_data: content.to_vec(),
        plaintext: content.to_vec(),
        signature: signature.to_vec(),
        form,
        rewritten: false,
    })
}

fn resolve_clearsigned(
    name: &str,
    content: &[u8],
    detached: Option<&[u8]>,
) -> Result<ResolvedArtifact> {
    let message = clearsign::decode(content).map_err(|e| Error::MalformedClearsign {
        name: name.to_string(),
        reason: e.to_string(),
    })?;

    if detached.is_some_and(|sig| !sig.is_empty()) {
        warn!(name, "ignoring detached signature; the clearsigned signature takes precedence");
    }

    debug!(
        name,
        hashes = ?message.hashes,
        bytes = message.plaintext.len(),
        "decoded clearsigned content"
    );
    Ok(ResolvedArtifact {
        signed_data: message.signed_text,
        plaintext: message.plaintext,
        signature: message.signature,
        form: SignatureForm::Binary,
        rewritten: true,
    })
}
