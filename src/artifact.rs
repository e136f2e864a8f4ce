//! The downloaded target and its companion signature

use gpget_openpgp::{ResolvedArtifact, SignatureEncoding};
use reqwest::Url;

/// Fallback name when a URL has neither a final path segment nor a host
pub const DEFAULT_ARTIFACT_NAME: &str = "index";

/// A fetched file, as retrieved and before any decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievedArtifact {
    /// Final path segment of the source URL
    pub name: String,
    pub url: Url,
    pub content: Vec<u8>,
    /// Detached signature bytes; `None` for clearsigned artifacts
    pub signature: Option<Vec<u8>>,
}

impl RetrievedArtifact {
    pub fn new(url: Url, content: Vec<u8>, signature: Option<Vec<u8>>) -> Self {
        Self {
            name: artifact_name(&url),
            url,
            content,
            signature,
        }
    }

    /// Resolve into the triple the verifier checks. `self` is left untouched.
    pub fn resolve(&self, encoding: SignatureEncoding) -> gpget_openpgp::Result<ResolvedArtifact> {
        gpget_openpgp::resolve(
            &self.name,
            &self.content,
            self.signature.as_deref(),
            encoding,
        )
    }
}

/// Name a URL's content is saved under
pub fn artifact_name(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .or_else(|| url.host_str())
        .unwrap_or(DEFAULT_ARTIFACT_NAME)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_name_from_final_segment() {
        assert_eq!(artifact_name(&url("https://example.org/pub/file.txt")), "file.txt");
        assert_eq!(
            artifact_name(&url("https://example.org/pub/file.tar.gz?mirror=1")),
            "file.tar.gz"
        );
    }

    #[test]
    fn test_name_falls_back_to_host() {
        assert_eq!(artifact_name(&url("https://example.org/")), "example.org");
        assert_eq!(artifact_name(&url("https://example.org/dir/")), "example.org");
    }

    #[test]
    fn test_resolve_does_not_mutate() {
        let artifact = RetrievedArtifact::new(
            url("https://example.org/notes.txt"),
            b"content".to_vec(),
            Some(b"sig".to_vec()),
        );
        let before = artifact.clone();
        let resolved = artifact.resolve(SignatureEncoding::Binary).unwrap();
        assert_eq!(resolved.plaintext, b"content");
        assert_eq!(artifact, before);
    }
}
