use crate::{
    ConfigError,
    PasswordCallback,
    PrivateKeys,
};
use std::collections::{
    BTreeMap,
    HashMap,
};

/// Known-hosts content that disables host key verification.
pub const IGNORE_KNOWN_HOSTS: &str = "IGNORE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tristate {
    Maybe,
    No,
    Yes,
}

/// Set of supported authentication methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthTypes(u8);

impl AuthTypes {
    pub const NONE: Self = Self(0);
    pub const PASSWORD: Self = Self(1);
    pub const PRIVATE_KEYS: Self = Self(1 << 1);

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionType {
    String,
    Bool,
    /// Allowed `(value, title)` pairs.
    Enum(Vec<(&'static str, &'static str)>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDescription {
    pub description: &'static str,
    pub kind: OptionType,
}

/// Static capabilities of a driver, used to validate configurations and to tell front ends which
/// inputs to ask for.
#[derive(Debug, Clone)]
pub struct Descriptor {
    pub title: &'static str,
    pub requires_user: Tristate,
    pub supported_auth_types: AuthTypes,
    pub requires_known_hosts: bool,
    pub requires_encryption_passphrase: bool,
    pub options: BTreeMap<&'static str, OptionDescription>,
}

impl Descriptor {
    pub fn new(title: &'static str) -> Self {
        Self {
            title,
            requires_user: Tristate::Maybe,
            supported_auth_types: AuthTypes::NONE,
            requires_known_hosts: false,
            requires_encryption_passphrase: false,
            options: BTreeMap::new(),
        }
    }

    pub fn requires_user(mut self, requires_user: Tristate) -> Self {
        self.requires_user = requires_user;
        self
    }

    pub fn auth_types(mut self, auth_types: AuthTypes) -> Self {
        self.supported_auth_types = auth_types;
        self
    }

    pub fn option(mut self, key: &'static str, description: &'static str, kind: OptionType) -> Self {
        self.options.insert(key, OptionDescription { description, kind });
        self
    }
}

/// Parses the value of a boolean option.
pub fn parse_bool_option(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Everything needed to connect to one device.
#[derive(Debug, Clone, Default)]
pub struct DriverConfig {
    pub driver_type: String,
    /// `host`, `host:port`, `[v6]` or `[v6]:port`, or a URL for web based drivers.
    pub host: String,
    pub user: String,
    pub password: Option<PasswordCallback>,
    pub private_keys: Option<PrivateKeys>,
    /// Known-hosts file content or [`IGNORE_KNOWN_HOSTS`].
    pub known_hosts: String,
    pub encryption_passphrase: Option<PasswordCallback>,
    pub options: HashMap<String, String>,
}

impl DriverConfig {
    pub fn new(driver_type: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            driver_type: driver_type.into(),
            host: host.into(),
            ..Default::default()
        }
    }

    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    pub fn bool_option(&self, key: &str) -> bool {
        self.option(key).and_then(parse_bool_option).unwrap_or(false)
    }

    pub fn validate(&self, descriptor: &Descriptor) -> Result<(), ConfigError> {
        for (key, value) in &self.options {
            let Some(option) = descriptor.options.get(key.as_str()) else {
                return Err(ConfigError::UnknownOption(key.clone()));
            };
            let valid = match &option.kind {
                OptionType::String => true,
                OptionType::Bool => parse_bool_option(value).is_some(),
                OptionType::Enum(values) => values.iter().any(|(v, _)| v == value),
            };
            if !valid {
                return Err(ConfigError::InvalidOptionValue {
                    key: key.clone(),
                    value: value.clone(),
                });
            }
        }

        match descriptor.requires_user {
            Tristate::No if !self.user.is_empty() => return Err(ConfigError::UserNotSupported),
            Tristate::Yes if self.user.is_empty() => return Err(ConfigError::UserRequired),
            _ => {}
        }

        if self.private_keys.is_some() && !descriptor.supported_auth_types.contains(AuthTypes::PRIVATE_KEYS) {
            return Err(ConfigError::PrivateKeysNotSupported);
        }

        if descriptor.requires_known_hosts && self.known_hosts.is_empty() {
            return Err(ConfigError::KnownHostsRequired);
        }

        if descriptor.requires_encryption_passphrase && self.encryption_passphrase.is_none() {
            return Err(ConfigError::EncryptionPassphraseRequired);
        }

        Ok(())
    }
}
