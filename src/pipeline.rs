//! Fetch, verify and release
//!
//! One run is strictly sequential:
//! - Load the trust store
//! - Fetch the file and its companion signature
//! - Resolve the signature format
//! - Verify and apply the expected-signer constraint
//! - Release the plaintext through the sink
//!
//! Every stage returns early on error, so the sink is reached only from the
//! success path and at most once.

use chrono::{DateTime, Utc};
use gpget_openpgp::{verify_resolved, SignatureEncoding, TrustStore};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::GpgetResult;
use crate::fetch::Fetcher;
use crate::locate::retrieve;
use crate::output::Sink;

/// Summary of a successful run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    /// Artifact name
    pub name: String,
    pub url: String,
    pub encoding: SignatureEncoding,
    /// Long key ID of the signing certificate
    pub signer_key_id: String,
    /// Long key ID of the (sub)key that made the signature
    pub signing_key_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_key_id: Option<String>,
    /// Size of the released content
    pub bytes: usize,
    /// SHA-256 of the released content, lowercase hex
    pub sha256: String,
    /// True when clearsign decoding changed the content
    pub rewritten: bool,
    pub destination: String,
}

impl VerificationReport {
    /// One-line summary for stderr
    pub fn to_human(&self) -> String {
        let mut line = format!(
            "verified {} ({} bytes, sha256 {}) signed by {}",
            self.name, self.bytes, self.sha256, self.signer_key_id
        );
        if self.signing_key_id != self.signer_key_id {
            line.push_str(&format!(" (subkey {})", self.signing_key_id));
        }
        if let Some(at) = self.signed_at {
            line.push_str(&format!(" at {}", at.format("%Y-%m-%dT%H:%M:%SZ")));
        }
        line.push_str(&format!(" -> {}", self.destination));
        line
    }
}

/// Run against the trust store named in `config`
pub fn run(
    config: &Config,
    fetcher: &dyn Fetcher,
    sink: &mut dyn Sink,
) -> GpgetResult<VerificationReport> {
    let store = TrustStore::load(&config.keyring_path)?;
    run_with_store(config, &store, fetcher, sink)
}

/// Run against an already loaded trust store
pub fn run_with_store(
    config: &Config,
    store: &TrustStore,
    fetcher: &dyn Fetcher,
    sink: &mut dyn Sink,
) -> GpgetResult<VerificationReport> {
    let artifact = retrieve(fetcher, &config.url, config.encoding)?;
    debug!(name = %artifact.name, bytes = artifact.content.len(), "retrieved");

    let resolved = artifact.resolve(config.encoding)?;
    let outcome = verify_resolved(store, &resolved, config.expected_identity.as_ref())?;
    outcome.require_verified()?;

    let destination = sink.release(&artifact.name, &resolved.plaintext)?;
    info!(
        name = %artifact.name,
        signer = %outcome.signer_key_id(),
        %destination,
        "released verified content"
    );

    Ok(VerificationReport {
        name: artifact.name,
        url: config.url.to_string(),
        encoding: config.encoding,
        signer_key_id: outcome.signer.key_id,
        signing_key_id: outcome.signer.signing_key_id,
        signed_at: outcome.signer.signed_at,
        expected_key_id: config
            .expected_identity
            .as_ref()
            .map(|id| id.as_str().to_string()),
        bytes: resolved.plaintext.len(),
        sha256: hex::encode(Sha256::digest(&resolved.plaintext)),
        rewritten: resolved.rewritten,
        destination,
    })
}
