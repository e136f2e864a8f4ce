//! Signature location and retrieval
//!
//! Detached signatures live next to the file: `<url>.sig` for binary and
//! `<url>.asc` for armored signatures. Clearsigned files carry their own
//! signature. A missing companion is a hard failure; nothing is ever
//! released without the signature the operator asked for.

use gpget_openpgp::SignatureEncoding;
use reqwest::Url;
use tracing::debug;

use crate::artifact::RetrievedArtifact;
use crate::error::{FetchTarget, GpgetError, GpgetResult};
use crate::fetch::{FetchError, Fetcher};

/// Where the signature for a resource is found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureLocation {
    /// A separate resource holds the signature
    Detached(Url),
    /// The resource itself contains the signature
    Inline,
}

/// Determine the companion resource for `resource` under `encoding`
pub fn locate(resource: &Url, encoding: SignatureEncoding) -> SignatureLocation {
    match encoding.companion_suffix() {
        Some(suffix) => {
            let mut companion = resource.clone();
            companion.set_path(&format!("{}{}", resource.path(), suffix));
            SignatureLocation::Detached(companion)
        }
        None => SignatureLocation::Inline,
    }
}

/// Fetch the resource and, when one is located, its companion signature
pub fn retrieve(
    fetcher: &dyn Fetcher,
    resource: &Url,
    encoding: SignatureEncoding,
) -> GpgetResult<RetrievedArtifact> {
    let content = fetch(fetcher, resource, FetchTarget::artifact(resource.as_str()))?;

    let signature = match locate(resource, encoding) {
        SignatureLocation::Detached(companion) => {
            debug!(%companion, %encoding, "fetching detached signature");
            let target = FetchTarget::signature(companion.as_str(), encoding);
            Some(fetch(fetcher, &companion, target)?)
        }
        SignatureLocation::Inline => None,
    };

    Ok(RetrievedArtifact::new(resource.clone(), content, signature))
}

fn fetch(fetcher: &dyn Fetcher, url: &Url, target: FetchTarget) -> GpgetResult<Vec<u8>> {
    fetcher.fetch(url).map_err(|err| match err {
        FetchError::NotFound(_) => GpgetError::FetchNotFound { target },
        FetchError::Transport(reason) => GpgetError::FetchTransport { target, reason },
    })
}
