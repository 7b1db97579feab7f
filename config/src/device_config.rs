use crate::{
    app_config::ssh_dir,
    Secrets,
};
use color_eyre::Result;
use dsl_monitor_drivers::{
    AuthTypes,
    Descriptor,
    DriverConfig,
    PassphraseCallback,
    PasswordCallback,
    PrivateKeys,
    Registry,
    IGNORE_KNOWN_HOSTS,
};
use eyre::{
    bail,
    Context as _,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    collections::HashMap,
    io::ErrorKind,
    path::{
        Path,
        MAIN_SEPARATOR,
    },
};

const KEY_FILE_NAMES: [&str; 3] = ["id_ed25519", "id_rsa", "id_ecdsa"];

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceConfig {
    #[serde(default, rename = "type")]
    pub device_type: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub user: String,
    /// Empty for the keys in `~/.ssh`.
    #[serde(default)]
    pub private_key_path: String,
    /// Empty for `~/.ssh/known_hosts`.
    #[serde(default)]
    pub known_hosts_path: String,
    /// `Key=Value` pairs.
    #[serde(default)]
    pub options: Vec<String>,
}

impl DeviceConfig {
    pub fn parse_options(&self) -> Result<HashMap<String, String>> {
        self.options
            .iter()
            .map(|option| match option.split_once('=') {
                Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
                _ => bail!("invalid format for device specific option {option:?}, expected Key=Value"),
            })
            .collect()
    }

    /// Builds the driver configuration, reading key and known hosts files as the device type needs
    /// them. Secrets pre-seed the credential callbacks, everything else is asked for interactively.
    #[instrument(level = "debug", skip_all, fields(device_type = %self.device_type))]
    pub fn driver_config(&self, registry: &Registry, secrets: &Secrets) -> Result<DriverConfig> {
        let descriptor = self.descriptor(registry)?;
        if self.host.is_empty() {
            bail!("no host name specified");
        }

        let mut config = DriverConfig::new(&self.device_type, &self.host);
        config.user = self.user.clone();
        config.options = self.parse_options()?;

        if descriptor.requires_known_hosts {
            config.known_hosts = self.load_known_hosts()?;
        }

        if descriptor.supported_auth_types.contains(AuthTypes::PASSWORD) {
            config.password = secrets.password.as_deref().map(PasswordCallback::fixed);
        }

        if descriptor.supported_auth_types.contains(AuthTypes::PRIVATE_KEYS) {
            let passphrase = secrets.private_key_passphrase.clone().map(|passphrase| {
                PassphraseCallback::new(move |_| std::future::ready(Ok(passphrase.clone())))
            });
            config.private_keys = Some(PrivateKeys {
                keys: self.load_private_keys()?,
                passphrase,
            });
        }

        if descriptor.requires_encryption_passphrase {
            config.encryption_passphrase = secrets.encryption_passphrase.as_deref().map(PasswordCallback::fixed);
        }

        Ok(config)
    }

    pub fn descriptor<'a>(&self, registry: &'a Registry) -> Result<&'a Descriptor> {
        let types = registry.driver_types().join(", ");
        if self.device_type.is_empty() {
            bail!("no device type specified (valid types: {types})");
        }
        match registry.descriptor(&self.device_type) {
            Some(descriptor) => Ok(descriptor),
            None => bail!("invalid device type {:?} (valid types: {types})", self.device_type),
        }
    }

    fn load_known_hosts(&self) -> Result<String> {
        if self.known_hosts_path == IGNORE_KNOWN_HOSTS {
            warn!("Host key validation disabled");
            return Ok(IGNORE_KNOWN_HOSTS.to_string());
        }

        if self.known_hosts_path.is_empty() {
            let Some(path) = ssh_dir().map(|dir| dir.join("known_hosts")) else {
                return Ok(String::new());
            };
            return read_optional(&path).map(Option::unwrap_or_default);
        }

        std::fs::read_to_string(&self.known_hosts_path)
            .wrap_err_with(|| format!("Failed to load known hosts file {:?}", self.known_hosts_path))
    }

    fn load_private_keys(&self) -> Result<Vec<String>> {
        if self.private_key_path.is_empty() {
            let Some(dir) = ssh_dir() else {
                return Ok(Vec::new());
            };
            let mut keys = Vec::new();
            for name in KEY_FILE_NAMES {
                keys.extend(read_optional(&dir.join(name))?);
            }
            return Ok(keys);
        }

        let path = Path::new(&self.private_key_path);
        if self.private_key_path.ends_with(MAIN_SEPARATOR) {
            return KEY_FILE_NAMES
                .iter()
                .map(|name| {
                    let file = path.join(name);
                    std::fs::read_to_string(&file)
                        .wrap_err_with(|| format!("Failed to load private key file {}", file.display()))
                })
                .collect();
        }

        let key = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to load private key file {}", path.display()))?;
        Ok(vec![key])
    }
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err).wrap_err_with(|| format!("Failed to read {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsl_monitor_drivers::{
        DriverError,
        Tristate,
    };
    use pretty_assertions::assert_eq;
    use temp_dir::TempDir;

    async fn never(_: DriverConfig) -> Result<Box<dyn dsl_monitor_drivers::Driver>, DriverError> {
        Err(DriverError::Other("not connected".into()))
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register(
            "web",
            Descriptor::new("Web").requires_user(Tristate::No).auth_types(AuthTypes::PASSWORD),
            never,
        );
        let mut ssh = Descriptor::new("SSH")
            .requires_user(Tristate::Yes)
            .auth_types(AuthTypes::PASSWORD.union(AuthTypes::PRIVATE_KEYS));
        ssh.requires_known_hosts = true;
        registry.register("ssh", ssh, never);
        registry
    }

    fn device(device_type: &str) -> DeviceConfig {
        DeviceConfig {
            device_type: device_type.into(),
            host: "192.168.1.1".into(),
            ..Default::default()
        }
    }

    #[test]
    fn parses_options() {
        let mut device = device("web");
        device.options = vec!["TLSSkipVerify=1".into(), "Path=/a=b".into()];
        let options = device.parse_options().unwrap();
        assert_eq!(options.get("TLSSkipVerify").map(String::as_str), Some("1"));
        assert_eq!(options.get("Path").map(String::as_str), Some("/a=b"));

        device.options = vec!["TLSSkipVerify".into()];
        assert!(device.parse_options().is_err());
    }

    #[test]
    fn rejects_unknown_type_and_missing_host() {
        let err = device("").driver_config(&registry(), &Secrets::default()).unwrap_err();
        assert!(err.to_string().contains("valid types: ssh, web"));

        let err = device("avm").driver_config(&registry(), &Secrets::default()).unwrap_err();
        assert!(err.to_string().contains("invalid device type"));

        let mut device = device("web");
        device.host.clear();
        assert!(device.driver_config(&registry(), &Secrets::default()).is_err());
    }

    #[test]
    fn secrets_seed_password() {
        let secrets = Secrets {
            password: Some("secret".into()),
            ..Default::default()
        };
        let config = device("web").driver_config(&registry(), &secrets).unwrap();
        assert!(config.password.is_some());
        assert!(config.private_keys.is_none());
        assert_eq!(config.known_hosts, "");

        let config = device("web").driver_config(&registry(), &Secrets::default()).unwrap();
        assert!(config.password.is_none());
    }

    #[test]
    fn reads_key_and_known_hosts_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.child("id_test"), "KEY").unwrap();
        std::fs::write(dir.child("hosts"), "modem ssh-ed25519 AAAA").unwrap();

        let mut device = device("ssh");
        device.user = "root".into();
        device.private_key_path = dir.child("id_test").display().to_string();
        device.known_hosts_path = dir.child("hosts").display().to_string();

        let config = device.driver_config(&registry(), &Secrets::default()).unwrap();
        assert_eq!(config.known_hosts, "modem ssh-ed25519 AAAA");
        let keys = config.private_keys.unwrap();
        assert_eq!(keys.keys, vec!["KEY".to_string()]);
        assert!(keys.passphrase.is_none());

        device.known_hosts_path = IGNORE_KNOWN_HOSTS.into();
        let config = device.driver_config(&registry(), &Secrets::default()).unwrap();
        assert_eq!(config.known_hosts, IGNORE_KNOWN_HOSTS);

        device.private_key_path = dir.child("missing").display().to_string();
        assert!(device.driver_config(&registry(), &Secrets::default()).is_err());
    }
}
