use dsl_monitor_history::HistoryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SupervisorError {
    /// The supervisor is not waiting for the credential that was offered.
    #[error("no {0} required")]
    NoCredentialRequired(&'static str),
    #[error("supervisor is closed")]
    Closed,
    #[error("invalid history configuration: {0}")]
    InvalidHistoryConfig(#[from] HistoryError),
}
