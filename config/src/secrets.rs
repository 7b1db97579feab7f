use serde::Deserialize;
use std::{
    fmt,
    path::Path,
};

/// Credentials from `secrets.yaml`, kept apart from the regular configuration so that file can be
/// shared.
#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Secrets {
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub private_key_passphrase: Option<String>,
    #[serde(default)]
    pub encryption_passphrase: Option<String>,
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "***");
        f.debug_struct("Secrets")
            .field("password", &redact(&self.password))
            .field("private_key_passphrase", &redact(&self.private_key_passphrase))
            .field("encryption_passphrase", &redact(&self.encryption_passphrase))
            .finish()
    }
}

impl Secrets {
    /// Reads `secrets.yaml` from `config_dir`. A missing file yields no secrets.
    pub fn load(config_dir: &Path) -> Result<Self, config::ConfigError> {
        let source = config::File::from(config_dir.join("secrets.yaml"))
            .format(config::FileFormat::Yaml)
            .required(false);
        let secrets: Self = config::Config::builder().add_source(source).build()?.try_deserialize()?;

        // empty entries count as absent
        Ok(Self {
            password: secrets.password.filter(|s| !s.is_empty()),
            private_key_passphrase: secrets.private_key_passphrase.filter(|s| !s.is_empty()),
            encryption_passphrase: secrets.encryption_passphrase.filter(|s| !s.is_empty()),
        })
    }
}
