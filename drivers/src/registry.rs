use crate::{
    driver::Constructor,
    Descriptor,
    Driver,
    DriverConfig,
    DriverError,
};
use futures::{
    future::BoxFuture,
    FutureExt as _,
};
use std::{
    collections::HashMap,
    future::Future,
    sync::Arc,
};

#[derive(Clone)]
struct Entry {
    constructor: Constructor,
    descriptor: Descriptor,
}

/// Maps driver identifiers such as `broadcom_telnet` to their constructor and descriptor.
#[derive(Clone, Default)]
pub struct Registry {
    entries: HashMap<String, Entry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in driver.
    pub fn with_all_drivers() -> Self {
        let mut registry = Self::new();
        register_all(&mut registry);
        registry
    }

    /// # Panics
    ///
    /// If `identifier` is already registered.
    pub fn register<F, Fut>(&mut self, identifier: impl Into<String>, descriptor: Descriptor, constructor: F)
    where
        F: Fn(DriverConfig) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Box<dyn Driver>, DriverError>> + Send + 'static,
    {
        let identifier = identifier.into();
        assert!(
            !self.entries.contains_key(&identifier),
            "driver identifier {identifier} registered twice"
        );

        let constructor: Constructor =
            Arc::new(move |config| -> BoxFuture<'static, Result<Box<dyn Driver>, DriverError>> { constructor(config).boxed() });
        self.entries.insert(identifier, Entry { constructor, descriptor });
    }

    pub fn descriptor(&self, identifier: &str) -> Option<&Descriptor> {
        self.entries.get(identifier).map(|entry| &entry.descriptor)
    }

    /// Registered identifiers in lexical order.
    pub fn driver_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    /// Validates `config` against the driver's descriptor and connects.
    pub fn connect(&self, config: DriverConfig) -> BoxFuture<'static, Result<Box<dyn Driver>, DriverError>> {
        let Some(entry) = self.entries.get(&config.driver_type) else {
            let err = DriverError::UnknownDriver(config.driver_type);
            return futures::future::ready(Err(err)).boxed();
        };
        if let Err(err) = config.validate(&entry.descriptor) {
            return futures::future::ready(Err(err.into())).boxed();
        }
        (entry.constructor)(config)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry").field("drivers", &self.driver_types()).finish()
    }
}

/// Registers every built-in driver.
pub fn register_all(registry: &mut Registry) {
    crate::broadcom::register(registry);
    crate::speedport::register(registry);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ConfigError,
        Tristate,
    };
    use pretty_assertions::assert_eq;

    async fn never(_: DriverConfig) -> Result<Box<dyn Driver>, DriverError> {
        Err(DriverError::Other("not connected".into()))
    }

    #[test]
    fn lists_sorted_types() {
        let mut registry = Registry::new();
        registry.register("zyxel", Descriptor::new("Z"), never);
        registry.register("avm", Descriptor::new("A"), never);
        assert_eq!(registry.driver_types(), vec!["avm", "zyxel"]);
    }

    #[test]
    fn builtin_drivers() {
        let registry = Registry::with_all_drivers();
        assert_eq!(registry.driver_types(), vec!["broadcom_telnet", "speedport"]);
        assert_eq!(
            registry.descriptor("speedport").map(|d| d.requires_user),
            Some(Tristate::No)
        );
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn duplicate_registration_panics() {
        let mut registry = Registry::new();
        registry.register("avm", Descriptor::new("A"), never);
        registry.register("avm", Descriptor::new("A"), never);
    }

    #[tokio::test]
    async fn connect_checks_type_and_config() {
        let mut registry = Registry::new();
        registry.register("avm", Descriptor::new("A").requires_user(Tristate::Yes), never);

        let result = registry.connect(DriverConfig::new("unknown", "host")).await;
        assert!(matches!(result, Err(DriverError::UnknownDriver(t)) if t == "unknown"));

        let result = registry.connect(DriverConfig::new("avm", "host")).await;
        assert!(matches!(
            result,
            Err(DriverError::InvalidConfig(ConfigError::UserRequired))
        ));

        let mut config = DriverConfig::new("avm", "host");
        config.user = "admin".into();
        let result = registry.connect(config).await;
        assert!(matches!(result, Err(DriverError::Other(_))));
    }
}
