use color_eyre::Result;
use dsl_monitor_config::Config;
use dsl_monitor_drivers::Registry;
use dsl_monitor_http::create_router;
use dsl_monitor_supervisor::Supervisor;
use eyre::Context as _;
use tokio::net::TcpListener;

/// Serves the dashboard until interrupted, then saves the histories.
#[instrument(level = "debug", skip_all, fields(device_type = %config.device.device_type))]
pub(crate) async fn run(config: &Config) -> Result<()> {
    let registry = Registry::with_all_drivers();
    let secrets = config.secrets().wrap_err("Failed to load secrets")?;
    let driver_config = config.device.driver_config(&registry, &secrets)?;

    let supervisor = Supervisor::builder(registry, driver_config)
        .state_dir(config.state_dir())
        .history_configs(config.history.bins(), config.history.errors())
        .spawn()?;

    let listener = TcpListener::bind(&config.web.listen_address)
        .await
        .wrap_err_with(|| format!("Failed to listen on {}", config.web.listen_address))?;
    let address = listener.local_addr()?;
    info!(%address, "Listening");
    println!("Dashboard available at http://{address}/");

    let app = create_router(supervisor.clone(), config.web.clone());
    let shutdown = supervisor.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                error!(%err, "Waiting for the interrupt signal failed");
            }
            info!("Shutting down");
            // ends the event streams so the server can drain
            shutdown.close().await;
        })
        .await?;

    supervisor.close().await;
    Ok(())
}
