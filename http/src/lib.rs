//! Web dashboard backend: a server-sent event stream of supervisor state changes, the report
//! download and the endpoints browsers use to answer credential prompts.

#[macro_use]
extern crate tracing;

mod credentials;
mod download;
mod error;
mod events;
mod router;

pub use error::AppError;
pub use router::{
    create_router,
    AppState,
};

#[cfg(test)]
mod testing;
