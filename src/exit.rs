//! Stable exit codes
//!
//! Scripts distinguish "no such file", "signature absent or invalid" and
//! "wrong signer" by exit status, so these values never change.

/// Process exit status of a gpget run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Content verified and released
    Success = 0,
    /// Invalid flags, configuration file or expected key ID
    Config = 1,
    /// The requested file does not exist
    NotFound = 10,
    /// Network or HTTP failure other than not-found
    Transport = 20,
    /// Trust store missing or unreadable
    TrustStore = 30,
    /// Signature missing, malformed or not valid for any trusted key
    SignatureRejected = 40,
    /// Signature valid but made by a key other than the expected one
    SignerMismatch = 50,
    /// Verified content could not be written
    Output = 60,
}

impl ExitCode {
    /// Get the integer value of the exit code
    pub fn as_i32(&self) -> i32 {
        *self as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::Config.as_i32(), 1);
        assert_eq!(ExitCode::NotFound.as_i32(), 10);
        assert_eq!(ExitCode::Transport.as_i32(), 20);
        assert_eq!(ExitCode::TrustStore.as_i32(), 30);
        assert_eq!(ExitCode::SignatureRejected.as_i32(), 40);
        assert_eq!(ExitCode::SignerMismatch.as_i32(), 50);
        assert_eq!(ExitCode::Output.as_i32(), 60);
    }
}
