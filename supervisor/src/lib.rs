//! Acquisition supervisor: keeps a session with one device, polls it periodically, folds every
//! observation into the histories and fans state changes out to subscribers.

#[macro_use]
extern crate tracing;

mod credentials;
mod distributor;
mod error;
mod state;
mod storage;
mod supervisor;
mod updater;

pub use error::SupervisorError;
pub use state::{
    LineData,
    StateChange,
    SupervisorState,
};
pub use supervisor::{
    Subscription,
    Supervisor,
    SupervisorBuilder,
    INTERVAL_DEFAULT,
    INTERVAL_SHORT,
    RECEIVER_CAPACITY,
};
