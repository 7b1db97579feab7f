//! Telekom Speedport routers, read through the JSON data of the engineer menu.

mod bins;
#[cfg(test)]
mod samples;
mod session;
mod status;

use crate::{
    helpers::normalize_status,
    AuthTypes,
    Descriptor,
    Driver,
    DriverConfig,
    DriverError,
    OptionType,
    Registry,
    Tristate,
};
use async_trait::async_trait;
use dsl_monitor_models::{
    Bins,
    Status,
};
use session::Session;

const TLS_SKIP_VERIFY: &str = "TLSSkipVerify";
const VERSION_PATH: &str = "/engineer/data/Version.json";
const DSL_PATH: &str = "/engineer/data/DSL.json";

pub(crate) fn register(registry: &mut Registry) {
    let descriptor = Descriptor::new("Speedport")
        .requires_user(Tristate::No)
        .auth_types(AuthTypes::PASSWORD)
        .option(TLS_SKIP_VERIFY, "skip verification of TLS certificates", OptionType::Bool);
    registry.register("speedport", descriptor, |config| async move {
        let driver = Speedport::connect(config).await?;
        Ok(Box::new(driver) as Box<dyn Driver>)
    });
}

pub struct Speedport {
    session: Session,
    closed: bool,
    raw_data: Vec<u8>,
    status: Status,
    bins: Bins,
}

impl Speedport {
    pub async fn connect(config: DriverConfig) -> Result<Self, DriverError> {
        let tls_skip_verify = config.bool_option(TLS_SKIP_VERIFY);
        let session = Session::connect(&config.host, config.password.as_ref(), tls_skip_verify).await?;

        Ok(Self {
            session,
            closed: false,
            raw_data: Vec::new(),
            status: Status::default(),
            bins: Bins::default(),
        })
    }
}

#[async_trait]
impl Driver for Speedport {
    fn raw_data(&self) -> &[u8] {
        &self.raw_data
    }

    fn status(&self) -> &Status {
        &self.status
    }

    fn bins(&self) -> &Bins {
        &self.bins
    }

    #[instrument(level = "debug", skip_all)]
    async fn update_data(&mut self) -> Result<(), DriverError> {
        let (raw_version, version) = self.session.load_data(VERSION_PATH).await?;
        let (raw_dsl, dsl) = self.session.load_data(DSL_PATH).await?;

        let mut status = status::parse_status(&version, &dsl);
        let bins = bins::parse_bins(&status, &dsl);
        // the profile is only known after looking at the bit allocation
        status.mode = bins.mode;
        normalize_status(&mut status);

        self.raw_data = format!("{VERSION_PATH}\n{raw_version}\n{DSL_PATH}\n{raw_dsl}\n").into_bytes();
        self.status = status;
        self.bins = bins;
        Ok(())
    }

    async fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.session.close().await;
        }
    }
}
