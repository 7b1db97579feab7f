use chrono::Local;
use color_eyre::Result;
use dsl_monitor_config::Config;
use dsl_monitor_drivers::{
    AuthTypes,
    Descriptor,
    DriverConfig,
    DriverError,
    PassphraseCallback,
    PasswordCallback,
    Registry,
};
use dsl_monitor_models::{
    Bins,
    Status,
};
use eyre::Context as _;
use std::path::{
    Path,
    PathBuf,
};
use tokio::io::{
    AsyncBufReadExt as _,
    BufReader,
};

/// Connects once, prints the line summary and writes the data next to the working directory.
#[instrument(level = "debug", skip_all, fields(device_type = %config.device.device_type))]
pub(crate) async fn run(config: &Config) -> Result<()> {
    let registry = Registry::with_all_drivers();
    let secrets = config.secrets().wrap_err("Failed to load secrets")?;
    let descriptor = config.device.descriptor(&registry)?;
    let mut driver_config = config.device.driver_config(&registry, &secrets)?;
    install_prompts(descriptor, &mut driver_config);

    let mut driver = registry
        .connect(driver_config)
        .await
        .wrap_err("Failed to connect to device")?;

    let result = driver.update_data().await;
    let time = Local::now();
    if let Err(err) = result {
        driver.close().await;
        return Err(err).wrap_err("Failed to load data from device");
    }

    print!("{}", driver.status().summary());

    let base_name = time.format("dsl_%Y%m%d_%H%M%S").to_string();
    let written = write_files(Path::new("."), &base_name, driver.raw_data(), driver.status(), driver.bins());
    driver.close().await;

    for path in written? {
        info!(file = %path.display(), "Data written");
    }
    Ok(())
}

/// Asks on the terminal for every secret the configuration does not provide.
fn install_prompts(descriptor: &Descriptor, config: &mut DriverConfig) {
    if descriptor.supported_auth_types.contains(AuthTypes::PASSWORD) && config.password.is_none() {
        config.password = Some(PasswordCallback::new(|| prompt("Password".to_string(), "password")));
    }

    if let Some(keys) = &mut config.private_keys {
        if keys.passphrase.is_none() {
            keys.passphrase = Some(PassphraseCallback::new(|fingerprint| {
                prompt(format!("Passphrase for private key {fingerprint}"), "passphrase")
            }));
        }
    }

    if descriptor.requires_encryption_passphrase && config.encryption_passphrase.is_none() {
        config.encryption_passphrase = Some(PasswordCallback::new(|| {
            prompt("Encryption passphrase".to_string(), "encryption passphrase")
        }));
    }
}

/// Reads one line from stdin; a closed stdin cancels the prompt.
async fn prompt(label: String, credential: &'static str) -> Result<String, DriverError> {
    eprint!("{label}: ");
    let mut line = String::new();
    match BufReader::new(tokio::io::stdin()).read_line(&mut line).await {
        Ok(0) => Err(DriverError::Prompt(credential)),
        Ok(_) => Ok(line.trim_end_matches(['\r', '\n']).to_string()),
        Err(err) => {
            warn!(%err, "Reading from stdin failed");
            Err(DriverError::Prompt(credential))
        }
    }
}

fn write_files(dir: &Path, base_name: &str, raw_data: &[u8], status: &Status, bins: &Bins) -> Result<Vec<PathBuf>> {
    let summary = dir.join(format!("{base_name}_summary.txt"));
    std::fs::write(&summary, status.summary()).wrap_err_with(|| format!("Failed to write {}", summary.display()))?;

    let raw = dir.join(format!("{base_name}_raw.txt"));
    std::fs::write(&raw, raw_data).wrap_err_with(|| format!("Failed to write {}", raw.display()))?;

    let bins_path = dir.join(format!("{base_name}_bins.json"));
    let json = serde_json::to_vec_pretty(bins)?;
    std::fs::write(&bins_path, json).wrap_err_with(|| format!("Failed to write {}", bins_path.display()))?;

    Ok(vec![summary, raw, bins_path])
}
