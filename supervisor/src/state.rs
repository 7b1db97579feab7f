use chrono::{
    DateTime,
    Utc,
};
use dsl_monitor_models::{
    Bins,
    BinsHistory,
    ErrorsHistory,
    Status,
};
use std::sync::Arc;

/// What the supervisor is currently doing. The string form is the wire name used by front ends.
#[derive(Debug, Default, Clone, PartialEq, Eq, strum::AsRefStr)]
pub enum SupervisorState {
    #[default]
    #[strum(serialize = "loading")]
    Loading,
    #[strum(serialize = "password")]
    PasswordRequired,
    /// Waiting for the passphrase of the private key with this fingerprint.
    #[strum(serialize = "passphrase")]
    PassphraseRequired(String),
    #[strum(serialize = "encryption-passphrase")]
    EncryptionPassphraseRequired,
    /// Connecting or acquiring failed with this message.
    #[strum(serialize = "error")]
    Error(String),
    #[strum(serialize = "ready")]
    Ready,
}

impl SupervisorState {
    pub fn name(&self) -> &str {
        self.as_ref()
    }
}

/// One successful observation together with the histories it was folded into.
#[derive(Debug, Clone, PartialEq)]
pub struct LineData {
    pub time: DateTime<Utc>,
    pub raw_data: Vec<u8>,
    pub status: Status,
    pub bins: Bins,
    pub bins_history: BinsHistory,
    pub errors_history: ErrorsHistory,
}

/// A state change as delivered to subscribers.
///
/// `data` is the most recent successful observation, also on non-ready states, so consumers can keep
/// showing it while the supervisor reconnects.
#[derive(Debug, Default, Clone)]
pub struct StateChange {
    pub state: SupervisorState,
    pub data: Option<Arc<LineData>>,
}

impl StateChange {
    pub fn is_ready(&self) -> bool {
        self.state == SupervisorState::Ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn wire_names() {
        assert_eq!(SupervisorState::Loading.name(), "loading");
        assert_eq!(SupervisorState::PasswordRequired.name(), "password");
        assert_eq!(SupervisorState::PassphraseRequired("aa:bb".into()).name(), "passphrase");
        assert_eq!(SupervisorState::EncryptionPassphraseRequired.name(), "encryption-passphrase");
        assert_eq!(SupervisorState::Error("timeout".into()).name(), "error");
        assert_eq!(SupervisorState::Ready.name(), "ready");
    }
}
