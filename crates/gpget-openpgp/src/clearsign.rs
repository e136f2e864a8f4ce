//! Cleartext signature framework (RFC 4880 section 7)
//!
//! A clearsigned document looks like:
//!
//! ```text
//! -----BEGIN PGP SIGNED MESSAGE-----
//! Hash: SHA512
//!
//! text, with lines starting with '-' escaped as "- -"
//! -----BEGIN PGP SIGNATURE-----
//!
//! <radix-64 signature packets>
//! =<crc24>
//! -----END PGP SIGNATURE-----
//! ```
//!
//! Decoding yields two views of the text: the canonical form the signature
//! was computed over and the plaintext handed back to the caller.

use pgp::armor::BlockType;

use crate::armor::{self, ArmorError};

const MESSAGE_HEADER: &[u8] = b"-----BEGIN PGP SIGNED MESSAGE-----";
const SIGNATURE_HEADER: &[u8] = b"-----BEGIN PGP SIGNATURE-----";
const SIGNATURE_FOOTER: &[u8] = b"-----END PGP SIGNATURE-----";
const DASH_ESCAPE: &[u8] = b"- ";

/// Errors decoding a clearsigned document
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClearsignError {
    #[error("no BEGIN PGP SIGNED MESSAGE line")]
    NoMessageHeader,

    #[error("armor headers are not terminated by an empty line")]
    UnterminatedHeaders,

    #[error("unexpected armor header '{0}'")]
    UnknownHeader(String),

    #[error("no BEGIN PGP SIGNATURE section")]
    MissingSignature,

    #[error("signature section is not terminated by END PGP SIGNATURE")]
    UnterminatedSignature,

    #[error("signature section is not ASCII")]
    NonAsciiSignature,

    #[error(transparent)]
    Armor(#[from] ArmorError),
}

/// A decoded clearsigned document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearsignedMessage {
    /// Hash algorithm names from the `Hash:` headers
    pub hashes: Vec<String>,
    /// Canonical text covered by the signature: dash-unescaped, trailing
    /// whitespace removed, CRLF line endings, no final line ending
    pub signed_text: Vec<u8>,
    /// Dash-unescaped text with trailing whitespace removed, every line
    /// terminated by LF
    pub plaintext: Vec<u8>,
    /// Binary signature packets from the signature section
    pub signature: Vec<u8>,
}

/// Decode a clearsigned document
pub fn decode(data: &[u8]) -> Result<ClearsignedMessage, ClearsignError> {
    let mut lines = data
        .split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line));

    // Anything before the message header is ignored.
    loop {
        match lines.next() {
            Some(line) if trim_end(line) == MESSAGE_HEADER => break,
            Some(_) => {}
            None => return Err(ClearsignError::NoMessageHeader),
        }
    }

    let mut hashes = Vec::new();
    loop {
        let line = trim_end(lines.next().ok_or(ClearsignError::UnterminatedHeaders)?);
        if line.is_empty() {
            break;
        }
        hashes.extend(parse_hash_header(line)?);
    }

    let mut signed_text = Vec::new();
    let mut plaintext = Vec::new();
    let mut first = true;
    loop {
        let line = lines.next().ok_or(ClearsignError::MissingSignature)?;
        if line.starts_with(SIGNATURE_HEADER) {
            break;
        }
        let line = trim_end(line.strip_prefix(DASH_ESCAPE).unwrap_or(line));

        // The line ending before the signature header is not signed.
        if !first {
            signed_text.extend_from_slice(b"\r\n");
        }
        first = false;
        signed_text.extend_from_slice(line);
        plaintext.extend_from_slice(line);
        plaintext.push(b'\n');
    }

    let mut armored = SIGNATURE_HEADER.to_vec();
    armored.push(b'\n');
    let mut terminated = false;
    for line in lines {
        let line = trim(line);
        if !line.is_ascii() {
            return Err(ClearsignError::NonAsciiSignature);
        }
        armored.extend_from_slice(line);
        armored.push(b'\n');
        if line.starts_with(SIGNATURE_FOOTER) {
            terminated = true;
            break;
        }
    }
    if !terminated {
        return Err(ClearsignError::UnterminatedSignature);
    }

    let signature = armor::decode(&armored, BlockType::Signature)?;

    Ok(ClearsignedMessage {
        hashes,
        signed_text,
        plaintext,
        signature,
    })
}

fn parse_hash_header(line: &[u8]) -> Result<Vec<String>, ClearsignError> {
    let line = String::from_utf8_lossy(line);
    let (name, value) = line
        .split_once(':')
        .ok_or_else(|| ClearsignError::UnknownHeader(line.to_string()))?;
    if name.trim() != "Hash" {
        return Err(ClearsignError::UnknownHeader(name.trim().to_string()));
    }
    Ok(value
        .split(',')
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .collect())
}

fn trim_end(line: &[u8]) -> &[u8] {
    let end = line
        .iter()
        .rposition(|&b| b != b' ' && b != b'\t')
        .map_or(0, |i| i + 1);
    &line[..end]
}

fn trim(line: &[u8]) -> &[u8] {
    let line = trim_end(line);
    let start = line
        .iter()
        .position(|&b| b != b' ' && b != b'\t')
        .unwrap_or(line.len());
    &line[start..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata;

    const SIMPLE: &str = "-----BEGIN PGP SIGNED MESSAGE-----\n\
Hash: SHA256\n\
\n\
first line   \n\
- -escaped\n\
\n\
last\n\
-----BEGIN PGP SIGNATURE-----\n\
\n\
MTIzNDU2\n\
Nzg5\n\
=Ic8C\n\
-----END PGP SIGNATURE-----\n";

    #[test]
    fn test_decode_simple_message() {
        let msg = decode(SIMPLE.as_bytes()).unwrap();
        assert_eq!(msg.hashes, vec!["SHA256".to_string()]);
        assert_eq!(msg.signed_text, b"first line\r\n-escaped\r\n\r\nlast");
        assert_eq!(msg.plaintext, b"first line\n-escaped\n\nlast\n");
        assert_eq!(msg.signature, b"123456789");
    }

    #[test]
    fn test_decode_crlf_input() {
        let crlf = SIMPLE.replace('\n', "\r\n");
        let msg = decode(crlf.as_bytes()).unwrap();
        assert_eq!(msg.signed_text, b"first line\r\n-escaped\r\n\r\nlast");
        assert_eq!(msg.plaintext, b"first line\n-escaped\n\nlast\n");
    }

    #[test]
    fn test_leading_junk_is_skipped() {
        let input = format!("garbage before\n\n{}", SIMPLE);
        let msg = decode(input.as_bytes()).unwrap();
        assert_eq!(msg.plaintext, b"first line\n-escaped\n\nlast\n");
    }

    #[test]
    fn test_trailing_data_after_footer_ignored() {
        let input = format!("{}trailing junk\n", SIMPLE);
        assert!(decode(input.as_bytes()).is_ok());
    }

    #[test]
    fn test_multiple_hash_headers() {
        let input = SIMPLE.replace("Hash: SHA256\n", "Hash: SHA256, SHA512\nHash: SHA384\n");
        let msg = decode(input.as_bytes()).unwrap();
        assert_eq!(msg.hashes, vec!["SHA256", "SHA512", "SHA384"]);
    }

    #[test]
    fn test_signature_armor_headers_skipped() {
        let input = SIMPLE.replace(
            "-----BEGIN PGP SIGNATURE-----\n\n",
            "-----BEGIN PGP SIGNATURE-----\nVersion: GnuPG v2\n\n",
        );
        let msg = decode(input.as_bytes()).unwrap();
        assert_eq!(msg.signature, b"123456789");
    }

    #[test]
    fn test_plain_text_is_rejected() {
        assert_eq!(
            decode(b"just some text\n").unwrap_err(),
            ClearsignError::NoMessageHeader
        );
    }

    #[test]
    fn test_unknown_header_is_rejected() {
        let input = SIMPLE.replace("Hash: SHA256", "Charset: UTF-8");
        assert_eq!(
            decode(input.as_bytes()).unwrap_err(),
            ClearsignError::UnknownHeader("Charset".to_string())
        );
    }

    #[test]
    fn test_headers_without_blank_line() {
        let input = "-----BEGIN PGP SIGNED MESSAGE-----\nHash: SHA256";
        assert_eq!(
            decode(input.as_bytes()).unwrap_err(),
            ClearsignError::UnterminatedHeaders
        );
    }

    #[test]
    fn test_escaped_signature_header_leaves_no_signature() {
        let input = SIMPLE.replace(
            "-----BEGIN PGP SIGNATURE-----",
            "- -----BEGIN PGP SIGNATURE-----",
        );
        assert_eq!(
            decode(input.as_bytes()).unwrap_err(),
            ClearsignError::MissingSignature
        );
    }

    #[test]
    fn test_missing_footer() {
        let input = SIMPLE.replace("-----END PGP SIGNATURE-----\n", "");
        assert_eq!(
            decode(input.as_bytes()).unwrap_err(),
            ClearsignError::UnterminatedSignature
        );
    }

    #[test]
    fn test_corrupt_checksum() {
        let input = SIMPLE.replace("=Ic8C", "=AAAA");
        assert!(matches!(
            decode(input.as_bytes()).unwrap_err(),
            ClearsignError::Armor(ArmorError::Invalid(_))
        ));
    }

    #[test]
    fn test_signature_section_must_be_signature_armor() {
        let input = SIMPLE.replace("-----END PGP SIGNATURE-----", "-----END PGP MESSAGE-----");
        assert_eq!(
            decode(input.as_bytes()).unwrap_err(),
            ClearsignError::UnterminatedSignature
        );
    }

    #[test]
    fn test_non_ascii_signature_section() {
        let input = SIMPLE.replace("Nzg5", "Nzg\u{e9}");
        assert_eq!(
            decode(input.as_bytes()).unwrap_err(),
            ClearsignError::NonAsciiSignature
        );
    }

    #[test]
    fn test_gnupg_fixture_recovers_original_text() {
        let msg = decode(&testdata::read_fixture("release.txt.clearsigned")).unwrap();
        assert_eq!(msg.hashes, vec!["SHA512".to_string()]);
        assert_eq!(msg.plaintext, testdata::read_fixture("release.txt"));
        assert!(!msg.signed_text.ends_with(b"\r\n"));
        assert!(msg.signed_text.windows(2).any(|w| w == b"\r\n"));
    }
}
