//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::request::Parts;
use axum::http::{Method, StatusCode};
use rpc_shim::config::ShimConfig;
use rpc_shim::{HttpServer, Registry, RequestContext, ResponseSink, Shutdown};
use tokio::net::TcpListener;

/// A running server; dropping it does not stop the server, call `stop`.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn stop(self) {
        self.shutdown.trigger();
    }
}

/// Boot a server on an ephemeral port after letting `setup` configure the registry.
pub async fn start_server<F>(config: ShimConfig, setup: F) -> TestServer
where
    F: FnOnce(&mut Registry),
{
    let mut registry = Registry::from_config(&config.routing);
    setup(&mut registry);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config, &mut registry);

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    // Give the accept loop a moment
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestServer { addr, shutdown }
}

/// Config with the given prefix and otherwise defaults.
pub fn config_with_prefix(prefix: &str) -> ShimConfig {
    let mut config = ShimConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.routing.url_prefix = prefix.to_string();
    config
}

/// Pre-callback answering 405 to anything but POST.
#[allow(dead_code)]
pub fn reject_non_post(_: &mut RequestContext, sink: &mut dyn ResponseSink, request: &Parts) -> bool {
    if request.method != Method::POST {
        sink.write_status(StatusCode::METHOD_NOT_ALLOWED);
        return false;
    }
    true
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
