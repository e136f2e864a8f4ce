//! Signature verification against the trust store

use chrono::{DateTime, Utc};
use pgp::armor::BlockType;
use pgp::composed::{SignedPublicKey, StandaloneSignature};
use pgp::packet::{KeyFlags, Packet, PacketParser, Signature, SubpacketData};
use pgp::types::{KeyTrait, PublicKeyTrait};
use serde::Serialize;
use tracing::debug;

use crate::armor;
use crate::error::{Error, Result};
use crate::format::{ResolvedArtifact, SignatureForm};
use crate::identity::{ExpectedIdentity, IdentityCheck};
use crate::keyring::{long_key_id, TrustStore};

/// The certificate that validated a signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignerIdentity {
    /// Long key ID of the certificate's primary key
    pub key_id: String,
    /// Long key ID of the key that produced the signature (a subkey when
    /// the certificate signs with one)
    pub signing_key_id: String,
    /// Signature creation time
    pub signed_at: Option<DateTime<Utc>>,
}

/// Result of one verification attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationOutcome {
    /// Cryptographic check passed and the identity constraint, if any, held
    pub verified: bool,
    pub signer: SignerIdentity,
    pub identity: IdentityCheck,
}

impl VerificationOutcome {
    /// Long key ID of the signer, populated even when the identity check failed
    pub fn signer_key_id(&self) -> &str {
        &self.signer.key_id
    }

    /// Turn an identity mismatch into an error
    pub fn require_verified(&self) -> Result<()> {
        match &self.identity {
            IdentityCheck::Mismatch { expected, actual } => Err(Error::IdentityMismatch {
                expected: expected.clone(),
                actual: actual.clone(),
            }),
            IdentityCheck::Unconstrained | IdentityCheck::Matched => Ok(()),
        }
    }
}

/// Check `signature` over `signed_data` against every signing key in the store.
///
/// Unparseable signatures, unknown signers and tampered data all return
/// [`Error::SignatureInvalid`].
pub fn verify(
    store: &TrustStore,
    signed_data: &[u8],
    signature: &[u8],
    form: SignatureForm,
) -> Result<SignerIdentity> {
    let signatures = match form {
        SignatureForm::Binary => parse_binary(signature),
        SignatureForm::Armored => parse_armored(signature),
    }
    .ok_or(Error::SignatureInvalid)?;

    signatures
        .iter()
        .find_map(|sig| check_signature(store, sig, signed_data))
        .ok_or(Error::SignatureInvalid)
}

/// Verify a resolved artifact and apply the optional identity constraint
pub fn verify_resolved(
    store: &TrustStore,
    resolved: &ResolvedArtifact,
    expected: Option<&ExpectedIdentity>,
) -> Result<VerificationOutcome> {
    let signer = verify(store, &resolved.signed_data, &resolved.signature, resolved.form)?;
    let identity = IdentityCheck::evaluate(expected, &signer.key_id);
    debug!(
        signer = %signer.key_id,
        signing_key = %signer.signing_key_id,
        ?identity,
        "signature verified"
    );
    Ok(VerificationOutcome {
        verified: identity.is_accepted(),
        signer,
        identity,
    })
}

/// Every packet must parse and be a signature
fn parse_binary(bytes: &[u8]) -> Option<Vec<StandaloneSignature>> {
    let packets = PacketParser::new(bytes)
        .collect::<pgp::errors::Result<Vec<_>>>()
        .ok()?;
    let signatures = packets
        .into_iter()
        .map(|packet| match packet {
            Packet::Signature(sig) => Some(StandaloneSignature::new(sig)),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    (!signatures.is_empty()).then_some(signatures)
}

fn parse_armored(bytes: &[u8]) -> Option<Vec<StandaloneSignature>> {
    let binary = armor::decode(bytes, BlockType::Signature).ok()?;
    parse_binary(&binary)
}

fn check_signature(
    store: &TrustStore,
    signature: &StandaloneSignature,
    data: &[u8],
) -> Option<SignerIdentity> {
    store.certificates().iter().find_map(|cert| {
        let primary_flags = declared_flags(
            cert.details
                .users
                .iter()
                .flat_map(|user| user.signatures.iter())
                .chain(cert.details.direct_signatures.iter()),
        );
        if may_sign(cert.is_signing_key(), primary_flags) && signature.verify(cert, data).is_ok()
        {
            return Some(identity(cert, cert, signature));
        }
        cert.public_subkeys
            .iter()
            .find(|sub| {
                may_sign(sub.is_signing_key(), declared_flags(sub.signatures.iter()))
                    && signature.verify(*sub, data).is_ok()
            })
            .map(|sub| identity(cert, sub, signature))
    })
}

/// Union of the key flags declared by `signatures`, or `None` when no
/// signature carries a key flags subpacket.
fn declared_flags<'a>(signatures: impl Iterator<Item = &'a Signature>) -> Option<KeyFlags> {
    signatures
        .flat_map(|sig| sig.config.subpackets())
        .filter_map(|subpacket| match &subpacket.data {
            SubpacketData::KeyFlags(raw) => Some(raw.first().copied().unwrap_or(0)),
            _ => None,
        })
        .reduce(|a, b| a | b)
        .map(|bits| KeyFlags::from(&[bits][..]))
}

/// A key may sign when its algorithm can and its flags, if declared, allow it
fn may_sign(algorithm_signs: bool, flags: Option<KeyFlags>) -> bool {
    algorithm_signs && flags.map_or(true, |flags| flags.sign())
}

fn identity(
    cert: &SignedPublicKey,
    signing_key: &impl PublicKeyTrait,
    signature: &StandaloneSignature,
) -> SignerIdentity {
    SignerIdentity {
        key_id: long_key_id(cert),
        signing_key_id: long_key_id(signing_key),
        signed_at: signature.signature.created().map(|t| t.to_owned()),
    }
}
