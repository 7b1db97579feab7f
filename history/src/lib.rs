//! Rolling per-period histories of SNR envelopes and error counter increments, with binary
//! snapshot persistence.

#[macro_use]
extern crate tracing;

mod bins;
mod error;
mod errors;
mod storage;

pub use bins::{
    Bins,
    BinsConfig,
};
pub use error::HistoryError;
pub use errors::{
    counter_diff,
    Errors,
    ErrorsConfig,
};
