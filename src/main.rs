//! REST-to-RPC transcoding gateway (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────┐
//!                      │                    GATEWAY                        │
//!   HTTP Request       │  ┌─────────┐   ┌─────────┐   ┌─────────────┐     │
//!   ───────────────────┼─▶│  http   │──▶│ routing │──▶│   binding   │     │
//!                      │  │ server  │   │  table  │   │ path/query/ │     │
//!                      │  └─────────┘   └─────────┘   │    body     │     │
//!                      │                              └──────┬──────┘     │
//!                      │                                     ▼            │
//!   HTTP Response      │  ┌──────────┐                ┌─────────────┐     │
//!   ◀──────────────────┼──│ response │◀───────────────│ rpc dispatch│◀────┼── Backend
//!                      │  │ / error  │                │             │     │   methods
//!                      │  └──────────┘                └─────────────┘     │
//!                      │                                                  │
//!                      │  config · observability · lifecycle              │
//!                      └──────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use rpc_gateway::config::{load_config, GatewayConfig};
use rpc_gateway::echo::{echo_routes, EchoService};
use rpc_gateway::lifecycle::{wait_for_signal, Shutdown};
use rpc_gateway::observability::{logging, metrics};
use rpc_gateway::GatewayServer;

#[derive(Debug, Parser)]
#[command(name = "rpc-gateway", version, about = "REST-to-RPC transcoding gateway")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability)?;

    tracing::info!("rpc-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        config = ?args.config,
        bind_address = %config.listener.bind_address,
        max_body_size = config.limits.max_body_size,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let routes = echo_routes(Arc::new(EchoService::new()))?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            wait_for_signal().await;
            shutdown.trigger();
        }
    });

    let server = GatewayServer::new(config, routes);
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
