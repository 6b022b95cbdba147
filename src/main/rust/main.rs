use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::sync::oneshot;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use smart_monitor_bluetooth::{serve, BluetoothAudioService, Config, PrometheusReporter};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse configuration
    let config = Config::parse();

    // Initialize logging; RUST_LOG overrides the default level
    let default_level = if config.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    info!("Starting smart-monitor-bluetooth v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: {:?}", config);

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        return Err(e);
    }
    info!("Configuration validated");

    PrometheusReporter::init_metrics()?;
    info!("Metrics initialized");

    // Create infrastructure implementations (dependency injection)
    let timings = config.to_tool_timings()?;
    let control = Arc::new(config.control_plane(timings.clone()));
    let audio = Arc::new(config.audio_router(&timings));
    let metrics_reporter = Arc::new(PrometheusReporter::new());

    let service = Arc::new(BluetoothAudioService::new(
        control,
        audio,
        metrics_reporter,
        timings,
    ));

    match service.check_reachability().await {
        Some(true) => info!("Bluetooth service is active"),
        _ => warn!("Bluetooth service is not active; it will be started on first connect"),
    }

    let monitor = tokio::spawn(
        service
            .clone()
            .run_reachability_monitor(config.status_check_interval()),
    );

    // Handle graceful shutdown
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received (Ctrl+C)");
                shutdown_tx.send(()).ok();
            }
            Err(err) => {
                error!("Failed to listen for shutdown signal: {}", err);
                // Dropping the sender would stop the server
                std::future::pending::<()>().await;
            }
        }
    });

    let addr = config.http_addr();
    info!("-------------------------------------------------------");
    info!("Bluetooth API Ready");
    info!("   API:     http://{}/api/bluetooth", addr);
    info!("   Scan:    http://{}/bluetooth/scan", addr);
    info!("   Metrics: http://{}/metrics", addr);
    info!("   Health:  http://{}/health", addr);
    info!("-------------------------------------------------------");

    serve(service, addr, async move {
        shutdown_rx.await.ok();
    })
    .await?;

    monitor.abort();
    info!("Server stopped gracefully");
    Ok(())
}
