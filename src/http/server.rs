//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Seal the registry and take its route table
//! - Create the Axum Router with a single catch-all handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Serve plain HTTP or HTTPS until the shutdown signal fires

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::Instrument;

use crate::config::ShimConfig;
use crate::http::dispatcher::dispatch;
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::http::response::BufferedResponse;
use crate::observability::metrics;
use crate::routing::{Registry, RouteTable};

/// Application state injected into the handler.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub max_body_size: usize,
}

/// HTTP front end for a sealed registry.
pub struct HttpServer {
    router: Router,
    config: ShimConfig,
    routes: Arc<RouteTable>,
}

impl HttpServer {
    /// Seal `registry`, switch it to serving mode and build the router.
    ///
    /// # Panics
    /// If the registry has duplicate messages or was already sealed.
    pub fn new(config: ShimConfig, registry: &mut Registry) -> Self {
        let routes = registry.start_serving();

        let state = AppState {
            routes: routes.clone(),
            max_body_size: config.limits.max_body_size,
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            routes,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ShimConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch_handler))
            .route("/", any(dispatch_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server on `listener` until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.routes.len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Serve HTTPS on `addr` until `shutdown` fires.
    ///
    /// In-flight requests get up to one request timeout to finish.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(
            address = %addr,
            routes = self.routes.len(),
            "HTTPS server starting"
        );

        let handle = Handle::new();
        let grace = Duration::from_secs(self.config.timeouts.request_secs);
        let shutdown_handle = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            shutdown_handle.graceful_shutdown(Some(grace));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }

    /// The router, for driving the server without a listener.
    pub fn into_router(self) -> Router {
        self.router
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn config(&self) -> &ShimConfig {
        &self.config
    }
}

/// Looks up the message for the request path and dispatches to it.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let (parts, body) = request.into_parts();

    let Ok(path) = urlencoding::decode(parts.uri.path()) else {
        tracing::debug!(path = %parts.uri.path(), "Path is not valid UTF-8 once decoded");
        return (StatusCode::BAD_REQUEST, "400 Bad Request").into_response();
    };

    let Some(record) = state.routes.lookup(&path).cloned() else {
        tracing::debug!(path = %path, method = %parts.method, "No message for path");
        metrics::record_unknown_message();
        return (StatusCode::NOT_FOUND, "404 page not found").into_response();
    };

    let span = tracing::info_span!(
        "dispatch",
        message = %record.name(),
        request_id = %request_id(&parts),
    );

    let mut sink = BufferedResponse::new();
    let outcome = dispatch(&record, &parts, body, state.max_body_size, &mut sink)
        .instrument(span.clone())
        .await;

    let status = sink.effective_status();
    span.in_scope(|| {
        tracing::debug!(status = %status, outcome = outcome.as_str(), "Dispatch finished");
    });
    metrics::record_dispatch(record.name(), status, outcome, start);

    sink.into_response()
}
