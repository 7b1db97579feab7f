//! Broadcom based modems, queried with `xdslctl` over a telnet shell.

mod bins;
#[cfg(test)]
mod samples;
mod status;

use crate::{
    helpers::normalize_status,
    telnet::{
        Prompts,
        TelnetClient,
    },
    AuthTypes,
    Descriptor,
    Driver,
    DriverConfig,
    DriverError,
    OptionType,
    Registry,
};
use async_trait::async_trait;
use dsl_monitor_models::{
    Bins,
    Status,
};
use std::fmt::Write as _;

const DEFAULT_COMMAND: &str = "xdslctl";
const DEFAULT_USER: &str = "root";

const PROMPTS: [Prompts; 3] = [
    Prompts {
        account: "login: ",
        password: "Password: ",
        command: "# ",
    },
    Prompts {
        account: "login: ",
        password: "Password: ",
        command: "$ ",
    },
    // Billion
    Prompts {
        account: "Login: ",
        password: "Password: ",
        command: "> ",
    },
];

pub(crate) fn register(registry: &mut Registry) {
    let descriptor = Descriptor::new("Broadcom (Telnet)")
        .auth_types(AuthTypes::PASSWORD)
        .option("Command", "command used instead of xdslctl", OptionType::String);
    registry.register("broadcom_telnet", descriptor, |config| async move {
        let driver = BroadcomTelnet::connect(config).await?;
        Ok(Box::new(driver) as Box<dyn Driver>)
    });
}

pub struct BroadcomTelnet {
    client: TelnetClient,
    command: String,
    closed: bool,
    raw_data: Vec<u8>,
    status: Status,
    bins: Bins,
}

impl BroadcomTelnet {
    pub async fn connect(config: DriverConfig) -> Result<Self, DriverError> {
        let user = match config.user.as_str() {
            "" => DEFAULT_USER,
            user => user,
        };
        let command = config
            .option("Command")
            .filter(|command| !command.is_empty())
            .unwrap_or(DEFAULT_COMMAND)
            .to_string();

        let client = TelnetClient::connect(&config.host, user, config.password.as_ref(), PROMPTS.to_vec()).await?;

        Ok(Self {
            client,
            command,
            closed: false,
            raw_data: Vec::new(),
            status: Status::default(),
            bins: Bins::default(),
        })
    }

    async fn execute(&mut self, args: &str) -> Result<String, DriverError> {
        self.client.execute(&format!("{} {args}", self.command)).await
    }
}

#[async_trait]
impl Driver for BroadcomTelnet {
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
        let stats = self.execute("info --stats").await?;
        let vectoring = self.execute("info --vectoring").await?;
        let vendor = self.execute("info --vendor").await?;
        let version = self.execute("--version").await?;
        let pb_params = self.execute("info --pbParams").await?;
        let bits = self.execute("info --Bits").await?;
        let snr = self.execute("info --SNR").await?;
        let qln = self.execute("info --QLN").await?;
        let hlog = self.execute("info --Hlog").await?;

        let mut status = status::parse_status(&stats, &vendor, &version);
        normalize_status(&mut status);
        let bins = bins::parse_bins(&status, &pb_params, &bits, &snr, &qln, &hlog);

        let mut raw = String::new();
        for (args, output) in [
            ("info --stats", &stats),
            ("info --vectoring", &vectoring),
            ("info --vendor", &vendor),
            ("--version", &version),
            ("info --pbParams", &pb_params),
            ("info --Bits", &bits),
            ("info --SNR", &snr),
            ("info --QLN", &qln),
            ("info --Hlog", &hlog),
        ] {
            let _ = writeln!(raw, "# {} {args}", self.command);
            let _ = writeln!(raw, "{output}");
        }
        raw.push('\n');

        self.raw_data = raw.into_bytes();
        self.status = status;
        self.bins = bins;
        Ok(())
    }

    async fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.client.close().await;
        }
    }
}
