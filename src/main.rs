use clap::Parser;
use color_eyre::Result;
use dsl_monitor::{
    init_logging,
    run,
    Args,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;
    run(Args::parse()).await
}
