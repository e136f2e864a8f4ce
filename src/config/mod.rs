//! Run configuration
//!
//! Merges three layers into one immutable [`Config`]:
//! 1. Built-in defaults
//! 2. Config file (~/.config/gpget/config.toml or --config)
//! 3. CLI flags
//!
//! Everything that can be rejected without touching the network is rejected
//! here: the URL, the expected key ID length and the timeout.

mod file;

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use gpget_openpgp::{ExpectedIdentity, SignatureEncoding};
use reqwest::Url;

pub use file::{expand_home, ConfigFile, DEFAULT_CONFIG_FILE};

/// Keyring location relative to `$HOME`
pub const DEFAULT_KEYRING: &str = ".gnupg/pubring.gpg";

/// Default HTTP timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no URL given")]
    MissingUrl,

    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unsupported URL scheme '{scheme}' (expected http or https)")]
    UnsupportedScheme { scheme: String },

    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error(transparent)]
    Identity(#[from] gpget_openpgp::Error),

    #[error("HOME is not set; pass --keyring explicitly")]
    NoHome,
}

/// Where verified content goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Stream to standard output
    Stdout,
    /// Save under the artifact name inside this directory
    Directory(PathBuf),
    /// Save to exactly this path
    File(PathBuf),
}

/// Values taken from the command line. `None` defers to lower layers.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub url: Option<String>,
    pub encoding: Option<SignatureEncoding>,
    pub key_id: Option<String>,
    pub keyring: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub remote_name: bool,
    pub timeout_secs: Option<u64>,
    pub json: bool,
}

/// Merged, validated configuration for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub url: Url,
    pub encoding: SignatureEncoding,
    pub expected_identity: Option<ExpectedIdentity>,
    pub keyring_path: PathBuf,
    pub output: OutputTarget,
    pub timeout: Duration,
    /// Emit the verification report as JSON
    pub json: bool,
}

impl Config {
    /// Build the configuration from CLI values, the config file and `$HOME`
    pub fn load(cli: CliOverrides) -> Result<Self, ConfigError> {
        let home = std::env::var_os("HOME").map(PathBuf::from);
        let file = match &cli.config {
            Some(path) => Some(ConfigFile::load(path)?),
            None => ConfigFile::load_default(home.as_deref())?,
        };
        Self::build(cli, file.unwrap_or_default(), home.as_deref())
    }

    /// Merge layers without touching the environment
    pub fn build(
        cli: CliOverrides,
        file: ConfigFile,
        home: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let url = parse_url(cli.url.as_deref().ok_or(ConfigError::MissingUrl)?)?;

        let encoding = cli.encoding.or(file.encoding).unwrap_or_default();

        let key_id = cli.key_id.or(file.key_id).unwrap_or_default();
        let expected_identity = ExpectedIdentity::parse(&key_id)?;

        let keyring_path = match (cli.keyring, file.keyring) {
            (Some(path), _) => path,
            (None, Some(raw)) => expand_home(&raw, home),
            (None, None) => home.ok_or(ConfigError::NoHome)?.join(DEFAULT_KEYRING),
        };

        let timeout_secs = cli
            .timeout_secs
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "timeout",
                reason: "must be at least one second".to_string(),
            });
        }

        Ok(Self {
            url,
            encoding,
            expected_identity,
            keyring_path,
            output: output_target(cli.output, cli.remote_name),
            timeout: Duration::from_secs(timeout_secs),
            json: cli.json,
        })
    }
}

fn parse_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ConfigError::UnsupportedScheme {
            scheme: scheme.to_string(),
        }),
    }
}

/// `-O` saves under the remote name (in `-o` or the current directory).
/// A bare `-o` names a directory when one exists there, otherwise a file.
fn output_target(output: Option<PathBuf>, remote_name: bool) -> OutputTarget {
    match (output, remote_name) {
        (None, false) => OutputTarget::Stdout,
        (None, true) => OutputTarget::Directory(PathBuf::from(".")),
        (Some(dir), true) => OutputTarget::Directory(dir),
        (Some(path), false) if path.is_dir() => OutputTarget::Directory(path),
        (Some(path), false) => OutputTarget::File(path),
    }
}
