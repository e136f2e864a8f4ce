//! gpget - retrieve files from hostile storage
//!
//! Fetches a file together with its OpenPGP signature, verifies the
//! signature against a local keyring and only then releases the content.
//! The verification core lives in the `gpget-openpgp` crate; this crate
//! handles configuration, retrieval, output and exit codes.

pub mod artifact;
pub mod config;
pub mod error;
pub mod exit;
pub mod fetch;
pub mod locate;
pub mod logging;
pub mod output;
pub mod pipeline;

pub use artifact::RetrievedArtifact;
pub use config::{CliOverrides, Config, ConfigError, OutputTarget};
pub use error::{FetchTarget, GpgetError, GpgetResult, ResourceKind};
pub use exit::ExitCode;
pub use fetch::{FetchError, Fetcher, HttpConfig, HttpFetcher, MockFetcher};
pub use locate::{locate, retrieve, SignatureLocation};
pub use output::{MemorySink, Sink, TargetSink};
pub use pipeline::{run, run_with_store, VerificationReport};

pub use gpget_openpgp::{SignatureEncoding, TrustStore};
