//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use rpc_gateway::echo::{echo_routes, EchoService};
use rpc_gateway::{GatewayConfig, GatewayServer, RouteTable, Shutdown};

/// A gateway running on an ephemeral port.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    handle: tokio::task::JoinHandle<std::io::Result<()>>,
}

#[allow(dead_code)]
impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for the server task to finish.
    pub async fn stop(self) -> std::io::Result<()> {
        self.shutdown.trigger();
        self.handle.await.expect("server task panicked")
    }
}

/// HTTP client that never goes through an environment proxy.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap()
}

/// Start a gateway serving `routes` with `config`.
pub async fn start_gateway_with(config: GatewayConfig, routes: RouteTable) -> TestGateway {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = GatewayServer::new(config, routes);
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    TestGateway {
        addr,
        shutdown,
        handle,
    }
}

/// Start a gateway in front of the echo service.
pub async fn start_echo_gateway() -> TestGateway {
    let routes = echo_routes(Arc::new(EchoService::new())).unwrap();
    start_gateway_with(GatewayConfig::default(), routes).await
}
