//! Error types for neighbor collection.
//!
//! The parser itself never fails; every variant here belongs to the session
//! layer that fetches raw command output from a device, or to loading its
//! configuration.

use thiserror::Error;

/// Errors that can occur while collecting neighbor output from a device.
#[derive(Error, Debug)]
pub enum ConnectError {
    /// The device rejected the supplied credentials.
    ///
    /// The fallback reader returns this immediately instead of retrying on
    /// the secondary transport.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// A connect or read step did not finish in time.
    ///
    /// The error contains whatever output was received before the deadline.
    #[error("timed out: {0}")]
    Timeout(String),

    /// The peer closed the connection before the expected marker arrived.
    #[error("channel disconnect before end of output")]
    ChannelDisconnectError,

    /// A remotely executed command exited with a non-zero status.
    #[error("command '{command}' exited with status {exit_status}")]
    CommandFailed { command: String, exit_status: u32 },

    /// Both the primary and the fallback transport failed.
    #[error("all transports failed: primary: {primary}; fallback: {fallback}")]
    AllTransportsFailed {
        primary: Box<ConnectError>,
        fallback: Box<ConnectError>,
    },

    /// The reader configuration could not be loaded.
    #[error("invalid reader config: {0}")]
    InvalidConfig(String),

    /// An error occurred in the async-ssh2-tokio library.
    #[error("async ssh2 error: {0}")]
    Ssh2Error(#[from] async_ssh2_tokio::Error),

    /// Socket or file I/O failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConnectError {
    /// Returns true if the error means the credentials were rejected.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            ConnectError::AuthenticationFailed(_)
                | ConnectError::Ssh2Error(async_ssh2_tokio::Error::PasswordWrong)
                | ConnectError::Ssh2Error(async_ssh2_tokio::Error::KeyAuthFailed)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::ConnectError;

    #[test]
    fn combined_failure_names_both_causes() {
        let err = ConnectError::AllTransportsFailed {
            primary: Box::new(ConnectError::Timeout("ssh connect".to_string())),
            fallback: Box::new(ConnectError::ChannelDisconnectError),
        };

        let msg = err.to_string();
        assert!(msg.contains("primary: timed out: ssh connect"));
        assert!(msg.contains("fallback: channel disconnect"));
    }

    #[test]
    fn auth_failures_are_classified() {
        assert!(ConnectError::AuthenticationFailed("bad password".to_string()).is_auth_failure());
        assert!(ConnectError::Ssh2Error(async_ssh2_tokio::Error::PasswordWrong).is_auth_failure());
        assert!(!ConnectError::Timeout(String::new()).is_auth_failure());
    }

    #[test]
    fn ssh_library_errors_convert() {
        let err = ConnectError::from(async_ssh2_tokio::Error::KeyAuthFailed);
        assert!(matches!(err, ConnectError::Ssh2Error(_)));
        assert!(err.is_auth_failure());
    }
}
