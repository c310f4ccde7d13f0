//! lulld — the lull daemon.
//!
//! Sits between a traffic-routing layer and the Docker daemon: the
//! router calls `GET /?name=<workload>&timeout=<seconds>` for every
//! request it proxies, and lulld keeps the named container running and
//! stops it once the idle window elapses untouched.
//!
//! # Usage
//!
//! ```text
//! lulld --port 10000 --docker-socket /var/run/docker.sock
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use lull_backend::DockerBackend;
use lull_controller::WorkloadRegistry;

#[derive(Parser)]
#[command(name = "lulld", about = "Idle-lifecycle controller for Docker workloads")]
struct Cli {
    /// Port to listen on.
    #[arg(long, default_value = "10000")]
    port: u16,

    /// Path to the Docker daemon socket.
    #[arg(long, default_value = "/var/run/docker.sock")]
    docker_socket: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,lulld=debug,lull=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    // A broken runtime connection at startup is fatal; there is no
    // partial operation mode.
    let backend = DockerBackend::connect(cli.docker_socket.clone())
        .await
        .context("could not connect to the Docker API")?;
    info!(socket = ?cli.docker_socket, "connected to Docker daemon");

    let registry = Arc::new(WorkloadRegistry::new(Arc::new(backend)));
    let router = lull_api::build_router(registry);

    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "touch endpoint listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    info!("lulld stopped");
    Ok(())
}
