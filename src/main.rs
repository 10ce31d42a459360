//! RPC shim demo server.
//!
//! # Request Flow
//!
//! ```text
//!   POST /api/<message>
//!        │
//!        ▼
//!   ┌─────────────┐   ┌──────────────────────┐   ┌───────────┐   ┌───────────────────────┐
//!   │  body read  │──▶│ pre-chain            │──▶│ procedure │──▶│ post-chain            │──▶ response
//!   │ (417 on err)│   │ 1. reject non-POST   │   │  echo     │   │ 1. Content-Type: json │
//!   └─────────────┘   │ 2. stamp begin time  │   │  status   │   │ 2. log elapsed        │
//!                     └──────────────────────┘   └───────────┘   └───────────────────────┘
//! ```
//!
//! Run with `--config <file>` to load a TOML config; defaults otherwise.
//! A `[listener.tls]` section switches the listener to HTTPS.

use std::path::PathBuf;
use std::time::Instant;

use axum::body::Bytes;
use axum::http::header::{HeaderValue, CONTENT_TYPE};
use axum::http::request::Parts;
use axum::http::{Method, StatusCode};
use clap::Parser;
use tokio::net::TcpListener;

use rpc_shim::config::{load_config, ShimConfig};
use rpc_shim::lifecycle::signals::shutdown_signal;
use rpc_shim::net::tls::load_tls_config;
use rpc_shim::observability::{logging, metrics};
use rpc_shim::{HttpServer, Registry, Reply, RequestContext, ResponseSink, Shutdown};

#[derive(Parser)]
#[command(name = "rpc-shim")]
#[command(about = "Demo server for the RPC-over-HTTP dispatch shim", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the URL prefix messages are exposed under.
    #[arg(short, long)]
    prefix: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => {
            let mut config = ShimConfig::default();
            config.routing.url_prefix = "/api".to_string();
            config
        }
    };
    if let Some(prefix) = cli.prefix {
        config.routing.url_prefix = prefix;
    }

    logging::init_logging(&config.observability);
    tracing::info!("rpc-shim v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        url_prefix = %config.routing.url_prefix,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let mut registry = Registry::from_config(&config.routing);
    register_demo(&mut registry);

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let bind_address = config.listener.bind_address.clone();
    let tls = config.listener.tls.clone();
    let server = HttpServer::new(config, &mut registry);

    tokio::spawn(async move {
        shutdown_signal().await;
        let servers = shutdown.trigger();
        tracing::info!(servers, "Shutdown signal received, draining");
    });

    match tls {
        Some(tls) => {
            let tls_config = load_tls_config(&tls).await?;
            tracing::info!(cert_path = %tls.cert_path, "TLS certificate loaded");
            server.run_tls(bind_address.parse()?, tls_config, server_shutdown).await?;
        }
        None => {
            let listener = TcpListener::bind(&bind_address).await?;
            tracing::info!(address = %listener.local_addr()?, "Listening for connections");
            server.run(listener, server_shutdown).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

fn register_demo(registry: &mut Registry) {
    registry.add_pre_callback(reject_non_post);
    registry.add_pre_callback(stamp_begin);
    registry.add_post_callback(json_content_type);
    registry.add_post_callback(log_elapsed);

    registry.register("echo", echo);
    registry.register("status", |_: &mut RequestContext, _: &Bytes| Reply::<()>::StatusOnly(StatusCode::NOT_FOUND));
}

/// Only POST reaches a procedure.
fn reject_non_post(_: &mut RequestContext, sink: &mut dyn ResponseSink, request: &Parts) -> bool {
    if request.method != Method::POST {
        sink.write_status(StatusCode::METHOD_NOT_ALLOWED);
        return false;
    }
    true
}

fn stamp_begin(ctx: &mut RequestContext, _: &mut dyn ResponseSink, request: &Parts) -> bool {
    ctx.insert("begin", Instant::now());
    ctx.insert("path", request.uri.path().to_string());
    true
}

fn json_content_type(_: &mut RequestContext, sink: &mut dyn ResponseSink, _: &Parts) -> bool {
    sink.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    true
}

fn log_elapsed(ctx: &mut RequestContext, _: &mut dyn ResponseSink, _: &Parts) -> bool {
    if let (Some(begin), Some(path)) = (ctx.get::<Instant>("begin"), ctx.get::<String>("path")) {
        tracing::info!(path = %path, elapsed_us = begin.elapsed().as_micros() as u64, "Request processed");
    }
    true
}

/// Echo the JSON body back, or greet when there is none.
fn echo(_: &mut RequestContext, body: &Bytes) -> Reply {
    if body.is_empty() {
        return Reply::Body(serde_json::json!({"msg": "hi"}));
    }
    match serde_json::from_slice(body) {
        Ok(value) => Reply::Body(value),
        Err(_) => Reply::StatusOnly(StatusCode::BAD_REQUEST),
    }
}
