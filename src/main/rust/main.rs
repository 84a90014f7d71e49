use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::sync::oneshot;
use tracing::{error, info};

use pipeline_doorbell::{serve, CameraRegistry, Config, FfmpegLauncher, PrometheusReporter, SimulatedCamera};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse configuration
    let config = Config::parse();

    // Initialize logging
    let filter = if config.verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    info!("Starting Pipeline-Doorbell v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        return Err(e);
    }

    // Initialize metrics
    PrometheusReporter::init_metrics()?;

    // Convert CLI config to domain configs
    let timeouts = config
        .to_session_timeouts()
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    let camera_ids = config.camera_ids().map_err(|e| anyhow::anyhow!("{}", e))?;

    // Create infrastructure implementations (dependency injection)
    let launcher = Arc::new(FfmpegLauncher::new(config.ffmpeg_path.clone()));
    let metrics_reporter = Arc::new(PrometheusReporter::new());

    // Create application service
    let registry = Arc::new(CameraRegistry::new(timeouts, launcher, metrics_reporter));
    for id in camera_ids {
        registry.add_camera(Arc::new(SimulatedCamera::new(id))).await;
    }

    // Log camera events as they happen
    let mut events = registry.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => info!(camera_id = %event.camera_id(), "Camera event: {}", json),
                Err(e) => error!("Failed to encode camera event: {}", e),
            }
        }
    });

    // Set up graceful shutdown
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received shutdown signal"),
            Err(e) => error!("Failed to listen for shutdown signal: {}", e),
        }
        let _ = shutdown_tx.send(());
    });

    info!("-------------------------------------------------------");
    info!("Doorbell Orchestrator Ready");
    info!("   Cameras: {}", config.cameras.join(", "));
    info!("   API:     http://0.0.0.0:{}/cameras", config.http_port);
    info!("   Metrics: http://0.0.0.0:{}/metrics", config.http_port);
    info!("   Health:  http://0.0.0.0:{}/health", config.http_port);
    info!("-------------------------------------------------------");

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    serve(addr, registry.clone(), async move {
        shutdown_rx.await.ok();
    })
    .await?;

    // Graceful shutdown
    registry.shutdown().await;

    info!("Orchestrator stopped gracefully");
    Ok(())
}
