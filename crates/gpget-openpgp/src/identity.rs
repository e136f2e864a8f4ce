//! Expected signer identity matching
//!
//! Operators pin the signer with either the short (8 hex digit) or long
//! (16 hex digit) form of a key ID. The comparison is done at the length the
//! operator supplied, case-insensitively.

use crate::error::{Error, Result};

/// Length of a short key ID in hex digits
pub const SHORT_KEY_ID_LEN: usize = 8;

/// Length of a long key ID in hex digits
pub const LONG_KEY_ID_LEN: usize = 16;

/// A validated, upper-cased expected key ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedIdentity(String);

impl ExpectedIdentity {
    /// Validate an operator-supplied key ID. Empty input means no constraint.
    ///
    /// The length is counted in characters, then every character must be a
    /// hex digit.
    pub fn parse(raw: &str) -> Result<Option<Self>> {
        match raw.chars().count() {
            0 => Ok(None),
            SHORT_KEY_ID_LEN | LONG_KEY_ID_LEN => {
                if !raw.chars().all(|c| c.is_ascii_hexdigit()) {
                    return Err(Error::InvalidIdentityDigits {
                        value: raw.to_string(),
                    });
                }
                Ok(Some(Self(raw.to_ascii_uppercase())))
            }
            length => Err(Error::InvalidIdentityLength { length }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_short(&self) -> bool {
        self.0.len() == SHORT_KEY_ID_LEN
    }

    /// Render `signer_key_id` at the same length as this identity
    pub fn project<'a>(&self, signer_key_id: &'a str) -> &'a str {
        if self.is_short() {
            short_key_id(signer_key_id)
        } else {
            signer_key_id
        }
    }

    /// Check a signer's long key ID against this identity
    pub fn check(&self, signer_key_id: &str) -> Result<()> {
        match self.mismatch(signer_key_id) {
            None => Ok(()),
            Some(actual) => Err(Error::IdentityMismatch {
                expected: self.0.clone(),
                actual,
            }),
        }
    }

    /// The signer's key ID at the compared length, when it differs
    fn mismatch(&self, signer_key_id: &str) -> Option<String> {
        let actual = self.project(signer_key_id).to_ascii_uppercase();
        (actual != self.0).then_some(actual)
    }
}

/// Outcome of applying an optional identity constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityCheck {
    /// No expected identity was configured
    Unconstrained,
    Matched,
    Mismatch { expected: String, actual: String },
}

impl IdentityCheck {
    pub fn evaluate(expected: Option<&ExpectedIdentity>, signer_key_id: &str) -> Self {
        match expected {
            None => IdentityCheck::Unconstrained,
            Some(expected) => match expected.mismatch(signer_key_id) {
                None => IdentityCheck::Matched,
                Some(actual) => IdentityCheck::Mismatch {
                    expected: expected.0.clone(),
                    actual,
                },
            },
        }
    }

    pub fn is_accepted(&self) -> bool {
        !matches!(self, IdentityCheck::Mismatch { .. })
    }
}

/// Accept or reject `signer_key_id` against an optional raw expected ID
pub fn match_identity(expected: Option<&str>, signer_key_id: &str) -> Result<()> {
    match ExpectedIdentity::parse(expected.unwrap_or(""))? {
        None => Ok(()),
        Some(expected) => expected.check(signer_key_id),
    }
}

/// Last 8 hex digits of a long key ID
pub fn short_key_id(long: &str) -> &str {
    &long[long.len().saturating_sub(SHORT_KEY_ID_LEN)..]
}
