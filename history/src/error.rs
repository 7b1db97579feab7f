use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("invalid history configuration: {0}")]
    InvalidConfig(&'static str),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("unsupported snapshot version {0}")]
    Version(u32),
    #[error("snapshot creation time lies in the future")]
    CreationTime,
    #[error("snapshot was written with a different configuration")]
    ConfigMismatch,
    #[error("snapshot contains an invalid period start")]
    PeriodStart,
    #[error("snapshot contains an invalid value")]
    InvalidValue,
    #[error("snapshot contains trailing data")]
    TrailingData,
}
