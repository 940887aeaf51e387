use telemetry_probe::config::ProbeConfig;
use telemetry_probe::server::wait_for_signal;
use telemetry_probe::ProbeServer;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ProbeConfig::from_env()?;
    info!(port = config.port, "Loaded telemetry configuration");

    let probes = ProbeServer::new();
    probes.start(config.port).await?.signal_ready();

    let signal = wait_for_signal().await?;
    info!(signal = signal, "Initiating graceful shutdown");

    // Divert traffic, then report termination while the listener drains
    probes.signal_not_ready();
    probes.signal_stopped();
    probes.stop().await?;

    info!("Telemetry probe shut down");
    Ok(())
}
