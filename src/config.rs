//! Reader configuration and SSH algorithm preferences.
//!
//! The algorithm lists come in two profiles: a strict modern one, and a
//! legacy one that keeps the old Diffie-Hellman groups and CBC ciphers still
//! found on access switches that have not been upgraded in a decade.
//! [`ReaderConfig`] carries everything else a session reader needs and can be
//! loaded from a JSON file.

use std::path::Path;
use std::time::Duration;

use russh::keys::{Algorithm, EcdsaCurve, HashAlg};
use russh::{cipher, compression, kex, mac};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ConnectError;

/// Key exchange algorithms accepted by the secure profile.
pub const SECURE_KEX_ORDER: &[kex::Name] = &[
    kex::CURVE25519,
    kex::CURVE25519_PRE_RFC_8731,
    kex::ECDH_SHA2_NISTP256,
    kex::ECDH_SHA2_NISTP384,
    kex::ECDH_SHA2_NISTP521,
    kex::DH_G16_SHA512,
    kex::DH_G14_SHA256,
];

/// Host key types accepted by the secure profile.
pub const SECURE_KEY_TYPES: &[Algorithm] = &[
    Algorithm::Ed25519,
    Algorithm::Ecdsa {
        curve: EcdsaCurve::NistP256,
    },
    Algorithm::Ecdsa {
        curve: EcdsaCurve::NistP384,
    },
    Algorithm::Rsa {
        hash: Some(HashAlg::Sha512),
    },
    Algorithm::Rsa {
        hash: Some(HashAlg::Sha256),
    },
];

/// Ciphers accepted by the secure profile.
pub static SECURE_CIPHERS: &[cipher::Name] = &[
    cipher::CHACHA20_POLY1305,
    cipher::AES_256_GCM,
    cipher::AES_256_CTR,
    cipher::AES_192_CTR,
    cipher::AES_128_CTR,
];

/// MAC algorithms accepted by the secure profile.
pub const SECURE_MAC_ALGORITHMS: &[mac::Name] = &[
    mac::HMAC_SHA512_ETM,
    mac::HMAC_SHA256_ETM,
    mac::HMAC_SHA512,
    mac::HMAC_SHA256,
];

/// Key exchange algorithms for old IOS images, newest first.
pub const LEGACY_KEX_ORDER: &[kex::Name] = &[
    kex::CURVE25519,
    kex::ECDH_SHA2_NISTP256,
    kex::DH_G14_SHA256,
    kex::DH_GEX_SHA256,
    kex::DH_G14_SHA1,
    kex::DH_GEX_SHA1,
    kex::DH_G1_SHA1,
];

/// Host key types for old IOS images, including DSA and SHA-1 RSA.
pub const LEGACY_KEY_TYPES: &[Algorithm] = &[
    Algorithm::Ed25519,
    Algorithm::Ecdsa {
        curve: EcdsaCurve::NistP256,
    },
    Algorithm::Rsa {
        hash: Some(HashAlg::Sha256),
    },
    Algorithm::Rsa { hash: None },
    Algorithm::Dsa,
];

/// Ciphers for old IOS images; CBC modes are kept last.
pub static LEGACY_CIPHERS: &[cipher::Name] = &[
    cipher::AES_256_GCM,
    cipher::AES_256_CTR,
    cipher::AES_128_CTR,
    cipher::AES_256_CBC,
    cipher::AES_192_CBC,
    cipher::AES_128_CBC,
];

/// MAC algorithms for old IOS images.
pub const LEGACY_MAC_ALGORITHMS: &[mac::Name] = &[
    mac::HMAC_SHA256_ETM,
    mac::HMAC_SHA256,
    mac::HMAC_SHA1_ETM,
    mac::HMAC_SHA1,
];

/// Compression is negotiated the same way in both profiles.
pub const DEFAULT_COMPRESSION_ALGORITHMS: &[compression::Name] = &[compression::NONE];

/// Algorithm policy for the SSH transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SecurityLevel {
    /// Strict modern algorithms (default).
    #[default]
    Secure,
    /// Maximum compatibility with legacy devices.
    LegacyCompatible,
}

/// Settings shared by the SSH and Telnet readers.
///
/// Every field has a default, so a JSON file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ReaderConfig {
    pub ssh_port: u16,
    pub telnet_port: u16,
    /// Seconds allowed for TCP connect plus authentication.
    pub connect_timeout_secs: u64,
    /// Seconds allowed for the command output to arrive in full.
    pub read_timeout_secs: u64,
    pub security_level: SecurityLevel,
    /// Check the server key against `~/.ssh/known_hosts`.
    pub verify_host_key: bool,
    /// Retry over Telnet when SSH fails for a reason other than bad credentials.
    pub telnet_fallback: bool,
    /// The neighbor listing command.
    pub command: String,
    /// Sent before `command` on Telnet to disable paging.
    pub pager_command: String,
    pub username_prompt: String,
    pub password_prompt: String,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            ssh_port: 22,
            telnet_port: 23,
            connect_timeout_secs: 30,
            read_timeout_secs: 60,
            security_level: SecurityLevel::Secure,
            verify_host_key: true,
            telnet_fallback: true,
            command: "show cdp neighbors detail".to_string(),
            pager_command: "terminal length 0".to_string(),
            username_prompt: "Username:".to_string(),
            password_prompt: "Password:".to_string(),
        }
    }
}

impl ReaderConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    /// Parses a configuration from JSON text.
    pub fn from_json_str(content: &str) -> Result<Self, ConnectError> {
        serde_json::from_str(content).map_err(|err| ConnectError::InvalidConfig(err.to_string()))
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConnectError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|err| {
            ConnectError::InvalidConfig(format!("failed to read {}: {err}", path.display()))
        })?;
        Self::from_json_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ReaderConfig::from_json_str(
            r#"{"ssh_port": 2222, "security_level": "legacy_compatible"}"#,
        )
        .expect("config should parse");

        assert_eq!(config.ssh_port, 2222);
        assert_eq!(config.security_level, SecurityLevel::LegacyCompatible);
        assert_eq!(config.telnet_port, 23);
        assert_eq!(config.command, "show cdp neighbors detail");
        assert_eq!(config.read_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = ReaderConfig::from_json_str("{ssh_port: ").expect_err("should fail");
        assert!(matches!(err, ConnectError::InvalidConfig(_)));
    }

    #[test]
    fn missing_file_is_reported_as_config_error() {
        let err = ReaderConfig::from_json_file("/nonexistent/cdpscan.json")
            .expect_err("missing file should fail");
        match err {
            ConnectError::InvalidConfig(msg) => assert!(msg.contains("/nonexistent/cdpscan.json")),
            other => panic!("unexpected error type: {other}"),
        }
    }

    #[test]
    fn secure_profile_excludes_sha1_kex() {
        assert!(!SECURE_KEX_ORDER.contains(&kex::DH_G1_SHA1));
        assert!(LEGACY_KEX_ORDER.contains(&kex::DH_G1_SHA1));
    }
}
