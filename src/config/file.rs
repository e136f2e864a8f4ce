//! Optional TOML config file (layer 2)
//!
//! Read from `~/.config/gpget/config.toml` unless `--config` names another
//! file. A missing default file is not an error; a missing explicit one is.

use std::fs;
use std::path::{Path, PathBuf};

use gpget_openpgp::SignatureEncoding;
use serde::Deserialize;

use super::ConfigError;

/// Config file location relative to `$HOME`
pub const DEFAULT_CONFIG_FILE: &str = ".config/gpget/config.toml";

/// Values accepted in the config file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Keyring path; `~/` is expanded
    pub keyring: Option<String>,

    /// Default signature encoding
    pub encoding: Option<SignatureEncoding>,

    /// Expected signer key ID
    pub key_id: Option<String>,

    /// HTTP timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl ConfigFile {
    /// Parse config file contents
    pub fn parse(path: &Path, content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load an explicitly named config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &content)
    }

    /// Load the default config file if it exists
    pub fn load_default(home: Option<&Path>) -> Result<Option<Self>, ConfigError> {
        let Some(home) = home else {
            return Ok(None);
        };
        let path = home.join(DEFAULT_CONFIG_FILE);
        if !path.exists() {
            return Ok(None);
        }
        Self::load(&path).map(Some)
    }
}

/// Resolve a leading `~/` against `home`
pub fn expand_home(raw: &str, home: Option<&Path>) -> PathBuf {
    if let (Some(rest), Some(home)) = (raw.strip_prefix("~/"), home) {
        return home.join(rest);
    }
    PathBuf::from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_file() {
        let content = r#"
            keyring = "~/.gnupg/release.gpg"
            encoding = "binary"
            key_id = "1BDE0D8A"
            timeout_secs = 5
        "#;
        let file = ConfigFile::parse(Path::new("config.toml"), content).unwrap();
        assert_eq!(file.keyring.as_deref(), Some("~/.gnupg/release.gpg"));
        assert_eq!(file.encoding, Some(SignatureEncoding::Binary));
        assert_eq!(file.key_id.as_deref(), Some("1BDE0D8A"));
        assert_eq!(file.timeout_secs, Some(5));
    }

    #[test]
    fn test_empty_file_is_all_defaults() {
        let file = ConfigFile::parse(Path::new("config.toml"), "").unwrap();
        assert_eq!(file, ConfigFile::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = ConfigFile::parse(Path::new("config.toml"), "mirror = \"x\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_unknown_encoding_rejected() {
        let err =
            ConfigFile::parse(Path::new("config.toml"), "encoding = \"pem\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_default_missing_is_none() {
        let home = TempDir::new().unwrap();
        assert_eq!(ConfigFile::load_default(Some(home.path())).unwrap(), None);
        assert_eq!(ConfigFile::load_default(None).unwrap(), None);
    }

    #[test]
    fn test_load_default_present() {
        let home = TempDir::new().unwrap();
        let dir = home.path().join(".config/gpget");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.toml"), "encoding = \"clearsigned\"\n").unwrap();

        let file = ConfigFile::load_default(Some(home.path())).unwrap().unwrap();
        assert_eq!(file.encoding, Some(SignatureEncoding::Clearsigned));
    }

    #[test]
    fn test_load_explicit_missing_is_error() {
        let home = TempDir::new().unwrap();
        let err = ConfigFile::load(&home.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_expand_home() {
        let home = Path::new("/home/ops");
        assert_eq!(
            expand_home("~/.gnupg/pubring.gpg", Some(home)),
            PathBuf::from("/home/ops/.gnupg/pubring.gpg")
        );
        assert_eq!(
            expand_home("/etc/keys.gpg", Some(home)),
            PathBuf::from("/etc/keys.gpg")
        );
        assert_eq!(expand_home("~/k.gpg", None), PathBuf::from("~/k.gpg"));
    }
}
