use clap::{
    Parser,
    Subcommand,
};
use std::path::PathBuf;

/// Read-only DSL line monitor
#[derive(Parser, Debug, Clone)]
#[command(author, version = version(), about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Device type, e.g. `broadcom_telnet` or `speedport`.
    #[clap(long = "device", short = 'd', value_name = "TYPE", global = true)]
    pub device_type: Option<String>,

    /// Host name or address of the device, optionally with port.
    #[clap(long, value_name = "HOST", global = true)]
    pub host: Option<String>,

    /// User name (optional depending on device type).
    #[clap(long, short = 'u', value_name = "USER", global = true)]
    pub user: Option<String>,

    /// Private key file for SSH authentication. A path ending with a separator is searched for the
    /// usual key file names.
    #[clap(long = "private-key", value_name = "PATH", global = true)]
    pub private_key_path: Option<String>,

    /// Known hosts file for SSH host key validation, `IGNORE` skips validation.
    #[clap(long = "known-hosts", value_name = "PATH", global = true)]
    pub known_hosts_path: Option<String>,

    /// Device specific option in the format `Key=Value`, can be repeated.
    #[clap(long = "option", short = 'o', value_name = "KEY=VALUE", global = true)]
    pub options: Vec<String>,

    /// Directory for the persisted histories.
    #[clap(long = "state-dir", value_name = "DIR", global = true)]
    pub state_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Connect once, print the line summary and write the data to files.
    Cli,
    /// Serve a live dashboard.
    Web {
        /// Address to listen on.
        #[clap(long = "listen", value_name = "ADDRESS")]
        listen_address: Option<String>,

        /// Replace error messages shown to browsers by a generic text.
        #[clap(long, action)]
        hide_error_messages: bool,

        /// Do not accept credentials from browsers.
        #[clap(long, action)]
        disable_interactive_auth: bool,

        /// Leave the raw device output out of downloads.
        #[clap(long, action)]
        hide_raw_data: bool,
    },
}

mod config_ext {
    use super::*;
    use config::{
        Map,
        Source,
        Value,
    };
    use std::collections::HashMap;

    impl Source for Args {
        fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
            Box::new((*self).clone())
        }

        fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
            let mut cache = HashMap::<String, Value>::new();
            if let Some(device_type) = &self.device_type {
                cache.insert("device.type".to_string(), device_type.clone().into());
            }
            if let Some(host) = &self.host {
                cache.insert("device.host".to_string(), host.clone().into());
            }
            if let Some(user) = &self.user {
                cache.insert("device.user".to_string(), user.clone().into());
            }
            if let Some(path) = &self.private_key_path {
                cache.insert("device.private_key_path".to_string(), path.clone().into());
            }
            if let Some(path) = &self.known_hosts_path {
                cache.insert("device.known_hosts_path".to_string(), path.clone().into());
            }
            if !self.options.is_empty() {
                cache.insert("device.options".to_string(), self.options.clone().into());
            }
            if let Some(dir) = &self.state_dir {
                cache.insert("state_dir".to_string(), dir.display().to_string().into());
            }

            if let Command::Web {
                listen_address,
                hide_error_messages,
                disable_interactive_auth,
                hide_raw_data,
            } = &self.command
            {
                if let Some(address) = listen_address {
                    cache.insert("web.listen_address".to_string(), address.clone().into());
                }
                // flags only ever switch the file settings on
                for (key, set) in [
                    ("web.hide_error_messages", hide_error_messages),
                    ("web.disable_interactive_auth", disable_interactive_auth),
                    ("web.hide_raw_data", hide_raw_data),
                ] {
                    if *set {
                        cache.insert(key.to_string(), true.into());
                    }
                }
            }
            Ok(cache)
        }
    }
}

pub fn version() -> String {
    let author = clap::crate_authors!();
    let config_dir_path = crate::get_config_dir().display().to_string();
    let data_dir_path = crate::get_data_dir().display().to_string();

    format!(
        "\
{version}

Authors: {author}

Config directory: {config_dir_path}
Data directory: {data_dir_path}",
        version = env!("CARGO_PKG_VERSION"),
    )
}
