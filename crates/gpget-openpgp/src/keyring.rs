//! Trust store loading
//!
//! The trust store is the set of public certificates a signature may be
//! checked against. It is read once per run from a keyring file, either a
//! binary GnuPG `pubring.gpg` or an ASCII-armored public key block, and is
//! never modified afterwards.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use pgp::armor::BlockType;
use pgp::composed::{Deserializable, SignedPublicKey};
use pgp::packet::{Packet, PacketParser};
use pgp::types::KeyTrait;
use tracing::{debug, warn};

use crate::armor;
use crate::error::{Error, Result};

/// Armor header line of a public key block
const PUBLIC_KEY_ARMOR_HEADER: &[u8] = b"-----BEGIN PGP PUBLIC KEY BLOCK-----";

/// Immutable collection of trusted public certificates
#[derive(Debug, Clone)]
pub struct TrustStore {
    path: PathBuf,
    certificates: Vec<SignedPublicKey>,
}

impl TrustStore {
    /// Load the keyring at `path`
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|source| Error::KeyringUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(path, &bytes)
    }

    /// Parse an in-memory keyring. `origin` is only used for diagnostics.
    ///
    /// Every byte must belong to a complete packet; truncated or trailing
    /// garbage makes the whole keyring corrupt.
    pub fn from_bytes(origin: &Path, bytes: &[u8]) -> Result<Self> {
        let corrupt = |reason: String| Error::KeyringCorrupt {
            path: origin.to_path_buf(),
            reason,
        };

        let binary = if is_armored(bytes) {
            let decoded =
                armor::decode(bytes, BlockType::PublicKey).map_err(|e| corrupt(e.to_string()))?;
            Cow::Owned(decoded)
        } else {
            Cow::Borrowed(bytes)
        };

        let packets = PacketParser::new(binary.as_ref())
            .collect::<pgp::errors::Result<Vec<Packet>>>()
            .map_err(|e| corrupt(format!("unreadable packet: {}", e)))?;
        if packets.is_empty() {
            return Err(corrupt("no packets".to_string()));
        }

        let parsed = SignedPublicKey::from_packets(packets.into_iter().peekable())
            .collect::<pgp::errors::Result<Vec<_>>>()
            .map_err(|e| corrupt(e.to_string()))?;

        let mut certificates = Vec::with_capacity(parsed.len());
        for cert in parsed {
            match check_certificate(&cert) {
                Ok(()) => certificates.push(cert),
                Err(reason) => warn!(
                    key_id = %long_key_id(&cert),
                    %reason,
                    "skipping unusable certificate"
                ),
            }
        }

        if certificates.is_empty() {
            return Err(corrupt("no usable public keys".to_string()));
        }

        let store = Self {
            path: origin.to_path_buf(),
            certificates,
        };
        debug!(
            path = %store.path.display(),
            keys = ?store.key_ids(),
            "loaded trust store"
        );
        Ok(store)
    }

    /// Where the keyring was read from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All trusted certificates
    pub fn certificates(&self) -> &[SignedPublicKey] {
        &self.certificates
    }

    /// Long key IDs of the primary keys, in keyring order
    pub fn key_ids(&self) -> Vec<String> {
        self.certificates.iter().map(long_key_id).collect()
    }

    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }
}

/// Upper-case 16 hex digit key ID of any key or subkey
pub fn long_key_id(key: &impl KeyTrait) -> String {
    hex::encode_upper(key.key_id().as_ref())
}

/// A certificate is usable when at least one user ID is bound to the
/// primary key and every self-signature it carries verifies.
fn check_certificate(cert: &SignedPublicKey) -> std::result::Result<(), String> {
    if cert.details.users.is_empty() {
        return Err("no self-signed user ID".to_string());
    }
    cert.verify().map_err(|e| e.to_string())
}

fn is_armored(bytes: &[u8]) -> bool {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    bytes[start..].starts_with(PUBLIC_KEY_ARMOR_HEADER)
}
