//! Configuration: `config.yaml` and `secrets.yaml` in the config directory, overridden by command
//! line arguments.

#[macro_use]
extern crate tracing;

mod app_config;
mod args;
mod device_config;
mod history_config;
mod secrets;
mod web_config;

use app_config::AppConfig;
pub use app_config::{
    get_config_dir,
    get_data_dir,
};
pub use args::{
    Args,
    Command,
};
pub use device_config::DeviceConfig;
pub use history_config::HistoryConfig;
pub use secrets::Secrets;
use serde::{
    Deserialize,
    Serialize,
};
use std::path::{
    Path,
    PathBuf,
};
pub use web_config::WebConfig;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten, skip_serializing)]
    pub(crate) app_config: AppConfig,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,
}

const DEFAULT_CONFIG: &str = include_str!("default-config.yaml");

impl Config {
    pub fn new(args: Args) -> Result<Self, config::ConfigError> {
        Self::from_dirs(args, &get_config_dir(), &get_data_dir())
    }

    fn from_dirs(args: Args, config_dir: &Path, data_dir: &Path) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("data_dir", data_dir.display().to_string())?
            .set_default("config_dir", config_dir.display().to_string())?
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Yaml));

        let config_files = [("config.yaml", config::FileFormat::Yaml)];

        for (file, format) in &config_files {
            let source = config::File::from(config_dir.join(file))
                .format(*format)
                .required(false);
            builder = builder.add_source(source);
        }

        builder = builder.add_source(args);

        let cfg: Self = builder.build()?.try_deserialize()?;
        debug!(device_type = %cfg.device.device_type, host = %cfg.device.host, "Configuration loaded");

        Ok(cfg)
    }

    pub fn data_dir(&self) -> &Path {
        &self.app_config.data_dir
    }

    pub fn config_dir(&self) -> &Path {
        &self.app_config.config_dir
    }

    /// Where the history snapshots are kept.
    pub fn state_dir(&self) -> PathBuf {
        self.state_dir
            .clone()
            .unwrap_or_else(|| self.app_config.data_dir.join("state"))
    }

    pub fn secrets(&self) -> Result<Secrets, config::ConfigError> {
        Secrets::load(self.config_dir())
    }
}
