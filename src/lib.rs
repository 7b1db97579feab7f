#[macro_use]
extern crate tracing;

mod cli;
mod logging;
mod web;

use color_eyre::Result;
pub use dsl_monitor_config::Args;
use dsl_monitor_config::{
    Command,
    Config,
};
use eyre::Context as _;
pub use logging::init_logging;

pub async fn run(args: Args) -> Result<()> {
    let command = args.command.clone();
    let config = Config::new(args).wrap_err("Failed to load the configuration")?;

    match command {
        Command::Cli => cli::run(&config).await,
        Command::Web { .. } => web::run(&config).await,
    }
}
