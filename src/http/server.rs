//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Answer retrieval requests with a redirect to the selected server
//! - Expose liveness and a live probe snapshot of the pool
//! - Swap in a rebuilt router when the configuration changes

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use arc_swap::ArcSwap;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::RouterConfig;
use crate::health::http::build_client;
use crate::health::load::probe_all;
use crate::http::request::{client_ip, request_id, UuidRequestId};
use crate::http::response::{redirect, ServerStatus};
use crate::lifecycle::StartupError;
use crate::observability::metrics;
use crate::routing::{RequestRouter, RetrievalRequest};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// The active router. Each request works on one loaded snapshot.
    pub router: Arc<ArcSwap<RequestRouter>>,
}

impl AppState {
    pub fn new(router: RequestRouter) -> Self {
        Self {
            router: Arc::new(ArcSwap::from_pointee(router)),
        }
    }
}

/// HTTP server for the router.
pub struct HttpServer {
    router: Router,
    config: RouterConfig,
    state: AppState,
    client: reqwest::Client,
}

impl HttpServer {
    /// Create a server with real HTTP probes. Fails on an empty pool.
    pub fn new(config: RouterConfig) -> Result<Self, StartupError> {
        let client = build_client()?;
        let request_router = RequestRouter::from_config(&config, client.clone())?;
        Ok(Self::with_router(config, request_router, client))
    }

    /// Create a server around an already built request router.
    pub fn with_router(config: RouterConfig, request_router: RequestRouter, client: reqwest::Client) -> Self {
        metrics::record_pool_size(request_router.pool().len());
        let state = AppState::new(request_router);
        let router = build_router(&config, state.clone());
        Self {
            router,
            config,
            state,
            client,
        }
    }

    /// Run the server until `shutdown` fires, applying config updates as they arrive.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<RouterConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            strategy = self.config.routing.strategy.as_str(),
            servers = self.config.servers.len(),
            "HTTP server starting"
        );

        let state = self.state.clone();
        let client = self.client.clone();
        let mut reload_shutdown = shutdown.resubscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    update = config_updates.recv() => match update {
                        Some(config) => apply_config(&state, &config, client.clone()),
                        None => break,
                    },
                    _ = reload_shutdown.recv() => break,
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Rebuild the request router from a reloaded config and swap it in.
///
/// Only servers and routing settings take effect; listener and timeout
/// changes need a restart.
fn apply_config(state: &AppState, config: &RouterConfig, client: reqwest::Client) {
    match RequestRouter::from_config(config, client) {
        Ok(router) => {
            metrics::record_pool_size(router.pool().len());
            tracing::info!(
                servers = router.pool().len(),
                strategy = router.policy().strategy().as_str(),
                "Server pool reloaded"
            );
            state.router.store(Arc::new(router));
        }
        Err(e) => {
            tracing::error!(error = %e, "Rejected reloaded config, keeping current server pool");
        }
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(config: &RouterConfig, state: AppState) -> Router {
    Router::new()
        .route("/f2", get(retrieve_handler))
        .route("/f2/", get(retrieve_handler))
        .route("/health", get(health_handler))
        .route("/servers", get(servers_handler))
        .with_state(state)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
}

/// Redirect a retrieval request to the selected storage server.
async fn retrieve_handler(
    State(state): State<AppState>,
    Query(request): Query<RetrievalRequest>,
    headers: HeaderMap,
) -> Response {
    let ip = client_ip(&headers);
    let router = state.router.load_full();

    tracing::debug!(
        request_id = %request_id(&headers),
        client_ip = %ip,
        hash = %request.hash,
        "Retrieval request"
    );

    let origin = router.resolve_origin(&ip).await;
    let decision = router.route(&request, &origin).await;

    let response = redirect(&decision.redirect_url);
    metrics::record_request(response.status().as_u16());
    response
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Probe every server once and report what was seen.
async fn servers_handler(State(state): State<AppState>) -> Json<Vec<ServerStatus>> {
    let router = state.router.load_full();
    let policy = router.policy();
    let results = probe_all(policy.load_probe(), router.pool(), policy.probe_timeout()).await;

    Json(
        results
            .iter()
            .map(|result| ServerStatus::from_probe(router.pool(), result))
            .collect(),
    )
}
