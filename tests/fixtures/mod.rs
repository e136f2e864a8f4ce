//! Shared fixtures for integration tests
//!
//! Keys and signatures under `tests/fixtures/gpget/` were produced with
//! GnuPG:
//! - `pubring.gpg` / `pubring.asc`: keyring holding only the release signer
//! - `release.txt`: the signed document
//! - `release.txt.sig`, `.asc`, `.clearsigned`: signatures by the release signer
//! - `release.txt.other.*`: signatures by a key that is not in the keyring

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use gpget::{MockFetcher, TrustStore};

/// Long key ID of "Release Signer <release@example.org>"
pub const SIGNER_KEY_ID: &str = "6FC189E01BDE0D8A";

/// Short key ID of the release signer
pub const SIGNER_SHORT_KEY_ID: &str = "1BDE0D8A";

/// Long key ID of the signer that is not trusted
pub const OTHER_KEY_ID: &str = "0532B9504ECA9C9B";

/// URL the fixture document is served at
pub const RELEASE_URL: &str = "https://downloads.example.org/pub/release.txt";

/// Path to a file in the gpget fixture directory
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/gpget")
        .join(name)
}

/// Read a fixture file
pub fn read_fixture(name: &str) -> Vec<u8> {
    std::fs::read(fixture_path(name)).unwrap()
}

/// The keyring holding the release signer
pub fn keyring_path() -> PathBuf {
    fixture_path("pubring.gpg")
}

/// Loaded trust store with the release signer
pub fn trust_store() -> TrustStore {
    TrustStore::load(&keyring_path()).unwrap()
}

/// Companion URL for `RELEASE_URL` with `suffix`
pub fn companion_url(suffix: &str) -> String {
    format!("{}{}", RELEASE_URL, suffix)
}

/// Mock server publishing the document with every signature kind
pub fn publishing_everything() -> MockFetcher {
    MockFetcher::new()
        .with_resource(RELEASE_URL, read_fixture("release.txt"))
        .with_resource(&companion_url(".sig"), read_fixture("release.txt.sig"))
        .with_resource(&companion_url(".asc"), read_fixture("release.txt.asc"))
}
