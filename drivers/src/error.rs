use std::time::Duration;
use thiserror::Error;

/// Errors returned by driver constructors and [`crate::Driver::update_data`].
///
/// The supervisor treats [`DriverError::Authentication`] and [`DriverError::Connection`] specially,
/// every other variant counts as a transient failure.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Credentials were rejected or the device reports a lock-out.
    #[error("{reason}")]
    Authentication {
        reason: String,
        wait_time: Option<Duration>,
    },
    /// The session is presumed lost.
    #[error("connection lost: {0}")]
    Connection(String),
    #[error("unknown device type: {0}")]
    UnknownDriver(String),
    #[error("invalid host: {0}")]
    InvalidHost(String),
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    /// The credential prompt was cancelled or could not be answered.
    #[error("no {0} entered")]
    Prompt(&'static str),
    #[error("{0}")]
    Other(String),
}

impl DriverError {
    pub fn authentication(reason: impl Into<String>) -> Self {
        Self::Authentication {
            reason: reason.into(),
            wait_time: None,
        }
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Lock-out duration reported by the device, if any.
    pub fn wait_time(&self) -> Option<Duration> {
        match self {
            Self::Authentication { wait_time, .. } => *wait_time,
            _ => None,
        }
    }
}

/// A driver configuration that does not satisfy the driver's descriptor.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown option: {0}")]
    UnknownOption(String),
    #[error("invalid value {value:?} for option {key}")]
    InvalidOptionValue { key: String, value: String },
    #[error("this device type does not take a user name")]
    UserNotSupported,
    #[error("a user name is required for this device type")]
    UserRequired,
    #[error("known hosts are required for this device type")]
    KnownHostsRequired,
    #[error("private key authentication is not supported for this device type")]
    PrivateKeysNotSupported,
    #[error("an encryption passphrase is required for this device type")]
    EncryptionPassphraseRequired,
}
