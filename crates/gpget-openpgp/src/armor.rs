//! ASCII armor decoding
//!
//! Thin layer over rPGP's streaming armor reader. The reader checks the
//! CRC-24 when a checksum line is present but accepts a block that simply
//! stops, so the END line is required here.

use std::io::{Cursor, Read};

use pgp::armor::{BlockType, Dearmor};

/// Errors decoding an armored block
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArmorError {
    #[error("no -----END {0}----- line")]
    MissingFooter(BlockType),

    #[error("expected {expected} armor, found {found}")]
    WrongBlock { expected: BlockType, found: String },

    #[error("invalid armor: {0}")]
    Invalid(String),

    #[error("armored block is empty")]
    Empty,
}

/// Decode the first armored block in `text`, which must be an `expected`
/// block closed by its END line.
pub fn decode(text: &[u8], expected: BlockType) -> Result<Vec<u8>, ArmorError> {
    let footer = format!("-----END {}-----", expected);
    if !text
        .windows(footer.len())
        .any(|w| w == footer.as_bytes())
    {
        return Err(ArmorError::MissingFooter(expected));
    }

    let mut reader = Dearmor::new(Cursor::new(text));
    let mut decoded = Vec::new();
    let mut buf = [0u8; 4096];
    // read_to_end would retry the reader's Interrupted errors forever
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => decoded.extend_from_slice(&buf[..n]),
            Err(e) => return Err(ArmorError::Invalid(e.to_string())),
        }
    }

    match reader.typ {
        Some(typ) if typ == expected => {}
        found => {
            return Err(ArmorError::WrongBlock {
                expected,
                found: found.map_or_else(|| "nothing".to_string(), |t| t.to_string()),
            })
        }
    }
    if decoded.is_empty() {
        return Err(ArmorError::Empty);
    }
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata;

    const SIGNATURE: &str = "-----BEGIN PGP SIGNATURE-----\n\
\n\
MTIzNDU2\n\
Nzg5\n\
=Ic8C\n\
-----END PGP SIGNATURE-----\n";

    #[test]
    fn test_decode_with_checksum() {
        assert_eq!(decode(SIGNATURE.as_bytes(), BlockType::Signature).unwrap(), b"123456789");
    }

    #[test]
    fn test_checksum_is_optional() {
        let input = SIGNATURE.replace("=Ic8C\n", "");
        assert_eq!(decode(input.as_bytes(), BlockType::Signature).unwrap(), b"123456789");
    }

    #[test]
    fn test_checksum_mismatch() {
        let input = SIGNATURE.replace("=Ic8C", "=AAAA");
        assert!(matches!(
            decode(input.as_bytes(), BlockType::Signature),
            Err(ArmorError::Invalid(_))
        ));
    }

    #[test]
    fn test_missing_footer() {
        let input = SIGNATURE.replace("-----END PGP SIGNATURE-----\n", "");
        assert_eq!(
            decode(input.as_bytes(), BlockType::Signature),
            Err(ArmorError::MissingFooter(BlockType::Signature))
        );
    }

    #[test]
    fn test_block_type_must_match() {
        let key = testdata::read_fixture("pubring.asc");
        assert!(matches!(
            decode(&key, BlockType::Signature),
            Err(ArmorError::MissingFooter(_))
        ));
        assert!(decode(&key, BlockType::PublicKey).is_ok());

        let relabeled = SIGNATURE.replace("BEGIN PGP SIGNATURE", "BEGIN PGP MESSAGE");
        assert!(decode(relabeled.as_bytes(), BlockType::Signature).is_err());
    }

    #[test]
    fn test_empty_body() {
        let input = "-----BEGIN PGP SIGNATURE-----\n\n-----END PGP SIGNATURE-----\n";
        assert!(decode(input.as_bytes(), BlockType::Signature).is_err());
    }
}
