//! Value model shared by the drivers, the history engines and the supervisor.
//!
//! Every telemetry field is optional. A field a device does not report is `None`, never zero.

mod bins;
pub mod format;
mod history;
mod inventory;
mod mode;
mod state;
mod status;

pub use bins::{
    is_valid_snr,
    Band,
    Bins,
    BinsBits,
    BinsFloat,
    DownUp,
    HLOG_VALID_RANGE,
    QLN_VALID_RANGE,
    SNR_VALID_RANGE,
};
pub use history::{
    BinsFloatMinMax,
    BinsHistory,
    ErrorsHistory,
    ErrorsPeriod,
};
pub use inventory::Inventory;
pub use mode::{
    Mode,
    ModeSubtype,
    ModeType,
};
pub use state::State;
pub use status::{
    ErrorCounter,
    ErrorCounts,
    OlrValue,
    Status,
    VectoringState,
};
