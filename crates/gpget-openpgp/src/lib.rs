//! gpget OpenPGP core
//!
//! Decides whether fetched bytes may be trusted: loads the trust store,
//! resolves the signature format (binary, armored or clearsigned), verifies
//! the signature and applies the optional expected-signer constraint.

pub mod armor;
pub mod clearsign;
pub mod error;
pub mod format;
pub mod identity;
pub mod keyring;
pub mod verify;

pub use error::{Error, Result};
pub use format::{resolve, ResolvedArtifact, SignatureEncoding, SignatureForm};
pub use identity::{match_identity, short_key_id, ExpectedIdentity, IdentityCheck};
pub use keyring::TrustStore;
pub use verify::{verify, verify_resolved, SignerIdentity, VerificationOutcome};
