use crate::DriverError;
use futures::{
    future::BoxFuture,
    FutureExt as _,
};
use std::{
    fmt,
    future::Future,
    sync::Arc,
};

/// Asks for a secret when a driver needs one.
///
/// Drivers invoke a password callback at most once per connect. The callback may block until a user
/// enters the secret. A prompt that is cancelled or cannot be answered fails with
/// [`DriverError::Prompt`], which the driver returns from its constructor.
#[derive(Clone)]
pub struct PasswordCallback(Arc<dyn Fn() -> BoxFuture<'static, Result<String, DriverError>> + Send + Sync>);

impl PasswordCallback {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, DriverError>> + Send + 'static,
    {
        Self(Arc::new(move || f().boxed()))
    }

    /// A callback that always returns the same secret.
    pub fn fixed(secret: impl Into<String>) -> Self {
        let secret: String = secret.into();
        Self::new(move || futures::future::ready(Ok(secret.clone())))
    }

    pub async fn call(&self) -> Result<String, DriverError> {
        (self.0)().await
    }
}

impl fmt::Debug for PasswordCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordCallback")
    }
}

/// Asks for the passphrase of an encrypted private key, identified by its fingerprint.
#[derive(Clone)]
pub struct PassphraseCallback(Arc<dyn Fn(String) -> BoxFuture<'static, Result<String, DriverError>> + Send + Sync>);

impl PassphraseCallback {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, DriverError>> + Send + 'static,
    {
        Self(Arc::new(move |fingerprint| f(fingerprint).boxed()))
    }

    pub async fn call(&self, fingerprint: impl Into<String>) -> Result<String, DriverError> {
        (self.0)(fingerprint.into()).await
    }
}

impl fmt::Debug for PassphraseCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PassphraseCallback")
    }
}

/// PEM encoded private keys plus the callback used to decrypt them.
#[derive(Clone, Debug)]
pub struct PrivateKeys {
    pub keys: Vec<String>,
    pub passphrase: Option<PassphraseCallback>,
}
