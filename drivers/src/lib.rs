//! Device drivers: each one logs into a modem, pulls its line data and normalizes it into
//! [`dsl_monitor_models::Status`] and [`dsl_monitor_models::Bins`].

#[macro_use]
extern crate tracing;

mod broadcom;
mod callback;
mod config;
mod driver;
mod error;
pub mod helpers;
mod registry;
mod speedport;
mod telnet;

pub use callback::{
    PassphraseCallback,
    PasswordCallback,
    PrivateKeys,
};
pub use config::{
    parse_bool_option,
    AuthTypes,
    Descriptor,
    DriverConfig,
    OptionDescription,
    OptionType,
    Tristate,
    IGNORE_KNOWN_HOSTS,
};
pub use driver::{
    Constructor,
    Driver,
};
pub use error::{
    ConfigError,
    DriverError,
};
pub use registry::{
    register_all,
    Registry,
};
