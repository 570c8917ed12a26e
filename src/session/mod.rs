//! Session readers that fetch raw neighbor output from a device.
//!
//! A reader authenticates, runs the neighbor command and returns the whole
//! decoded response as one string. It never parses; hand the result to
//! [`crate::neighbor::parse_neighbors`].
//!
//! # Main Components
//!
//! - [`SessionReader`] - The reader contract
//! - [`SshReader`] - Runs the command on an SSH exec channel
//! - [`TelnetReader`] - Logs in over Telnet and types the command sequence
//! - [`FallbackReader`] - Tries a primary reader, then a fallback one
//! - [`fetch_neighbor_output`] - SSH with optional Telnet fallback, driven by [`ReaderConfig`]

use std::borrow::Cow;
use std::fmt;
use std::future::Future;

use async_ssh2_tokio::ServerCheckMethod;
use async_ssh2_tokio::client::{AuthMethod, Client};
use log::{debug, trace, warn};
use russh::Preferred;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::config::{self, ReaderConfig, SecurityLevel};
use crate::error::ConnectError;

pub use fallback::FallbackReader;
pub use security::ConnectionSecurityOptions;
pub use ssh::SshReader;
pub use telnet::TelnetReader;

/// Fetches the complete output of the neighbor command from one device.
pub trait SessionReader {
    /// Short transport name used in log lines.
    fn transport(&self) -> &'static str;

    /// Authenticates, runs the command sequence and returns the decoded output.
    fn read_neighbors(&self) -> impl Future<Output = Result<String, ConnectError>> + Send;
}

/// Login name and password for a device.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Fetches neighbor output over SSH, falling back to Telnet when
/// `config.telnet_fallback` is set.
pub async fn fetch_neighbor_output(
    host: &str,
    credentials: &Credentials,
    config: &ReaderConfig,
) -> Result<String, ConnectError> {
    let ssh = SshReader::new(host, credentials.clone(), config.clone());
    if config.telnet_fallback {
        let telnet = TelnetReader::new(host, credentials.clone(), config.clone());
        FallbackReader::new(ssh, telnet).read_neighbors().await
    } else {
        ssh.read_neighbors().await
    }
}

mod fallback;
mod security;
mod ssh;
mod telnet;

#[cfg(test)]
mod tests {
    use super::Credentials;

    #[test]
    fn credentials_debug_hides_password() {
        let creds = Credentials::new("admin", "hunter2");
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("hunter2"));
    }
}
