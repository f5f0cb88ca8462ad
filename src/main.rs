// src/main.rs
use anyhow::Result;
use health_actuator::{
    config::{self, Config},
    server::{HealthHandler, ServerBuilder},
    Actuator,
};
use std::sync::Arc;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("health_actuator=debug".parse()?)
                .add_directive("hyper=info".parse()?),
        )
        .init();

    // Load configuration
    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from: {}", path);
            config::load_config(&path).await?
        }
        None => {
            info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    let actuator = Arc::new(build_actuator(&config));

    let handler = HealthHandler::new(actuator, config.health.path.as_str());

    let addr = config.server.addr();
    info!(
        "Serving health on http://{}{}",
        addr, config.health.path
    );

    ServerBuilder::new(addr)
        .with_handler(handler)
        .serve_with_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn build_actuator(config: &Config) -> Actuator {
    let mut actuator = Actuator::new();
    if let Some(timeout) = config.health.timeout() {
        actuator = actuator.with_timeout(timeout);
    }

    for indicator in &config.indicators {
        actuator.register_indicator(indicator.name.clone(), indicator.to_indicator());
    }

    info!(
        "Registered {} health indicators (timeout: {:?})",
        actuator.indicator_count(),
        actuator.timeout()
    );

    actuator
}

// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
