use crate::{
    DriverConfig,
    DriverError,
};
use async_trait::async_trait;
use dsl_monitor_models::{
    Bins,
    Status,
};
use futures::future::BoxFuture;
use std::sync::Arc;

/// A session with one device.
///
/// After a successful [`Driver::update_data`], [`Driver::status`], [`Driver::bins`] and
/// [`Driver::raw_data`] describe the same observation. Instances are not shared between tasks; the
/// caller serializes all calls.
#[async_trait]
pub trait Driver: Send {
    /// Unparsed device output of the last update, for archival only.
    fn raw_data(&self) -> &[u8];

    fn status(&self) -> &Status;

    fn bins(&self) -> &Bins;

    async fn update_data(&mut self) -> Result<(), DriverError>;

    /// Releases the session. Calling it twice is harmless.
    async fn close(&mut self);
}

/// Connects to a device and returns the established session.
pub type Constructor = Arc<dyn Fn(DriverConfig) -> BoxFuture<'static, Result<Box<dyn Driver>, DriverError>> + Send + Sync>;
