//! HTTP Server and Probe Handling
//!
//! This module implements the multi-target exporter HTTP server. Prometheus
//! scrapes `/probe?target=<device>` once per switch, and every request scrapes
//! that switch on demand.
//!
//! # Architecture
//!
//! - **HTTP Server**: Axum-based server, one task per request
//! - **Probe Registry**: a fresh Prometheus registry per probe, so concurrent
//!   probes of different switches never share metric state
//! - **State Management**: config, switch client (with its session cache) and
//!   exporter metrics shared through `Arc`
//!
//! # Endpoints
//!
//! - `GET /` - HTML landing page
//! - `GET /probe?target=<device>` - Scrape one configured switch
//! - `GET /metrics` - Metrics about the exporter itself
//! - `GET /health` - Liveness check
//!
//! # Error Handling
//!
//! A missing or unknown target is rejected with 400 before any request reaches
//! a switch. Failures of individual collectors only turn `zyxel_up` to 0; the
//! probe still answers with whatever was collected.

use crate::collectors;
use crate::config::Config;
use crate::error::ExporterError;
use crate::metrics::{ExporterMetrics, ProbeMetrics};
use crate::probe::{self, ProbeContext, TIMEOUT_HEADER};
use crate::switch::{SessionStore, SwitchClient};
use axum::{
    extract::{Query, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::signal;
use tokio::time::Instant;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    client: SwitchClient,
    metrics: ExporterMetrics,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let sessions = Arc::new(SessionStore::new());
        let client = SwitchClient::new(config.server.insecure, sessions)?;

        Ok(Self {
            config: Arc::new(config),
            client,
            metrics: ExporterMetrics::new()?,
        })
    }

    pub fn client(&self) -> &SwitchClient {
        &self.client
    }
}

#[derive(Debug, Deserialize)]
struct ProbeParams {
    target: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/probe", get(probe_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

pub async fn start(config: Config) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.addr, config.server.port);
    let app = router(AppState::new(config)?);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Exporter listening on {}", addr);
    info!("Probe switches at http://{}/probe?target=<device>", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("Received termination signal, exiting gracefully...");
}

async fn root_handler() -> impl IntoResponse {
    axum::response::Html(
        r#"<html>
<head><title>GS1920 Exporter</title></head>
<body>
<h1>GS1920 Exporter</h1>
<p><a href="/metrics">Metrics</a></p>
<p><a href="/health">Health</a></p>
</body>
</html>"#,
    )
}

async fn probe_handler(
    State(state): State<AppState>,
    Query(params): Query<ProbeParams>,
    headers: HeaderMap,
) -> Response {
    let timeout = headers
        .get(TIMEOUT_HEADER)
        .map(|value| {
            value
                .to_str()
                .map_err(|e| ExporterError::InvalidTimeoutHeader(e.to_string()))
        })
        .transpose()
        .and_then(|header| probe::scrape_timeout(header, state.config.server.timeout_offset));

    let timeout = match timeout {
        Ok(timeout) => timeout,
        Err(e) => {
            state.metrics.count_probe("rejected");
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };
    let deadline = Instant::now() + timeout;

    let (target, device) = match probe::resolve_target(&state.config, params.target.as_deref()) {
        Ok(found) => found,
        Err(e) => {
            state.metrics.count_probe("rejected");
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    let collectors = collectors::for_features(state.config.features_for(device));
    let metrics = match ProbeMetrics::new(&collectors) {
        Ok(metrics) => metrics,
        Err(e) => {
            error!("Failed to build probe registry: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };

    let ctx = ProbeContext {
        client: &state.client,
        target,
        device,
    };
    let outcome = probe::probe_device(&ctx, &collectors, deadline).await;
    metrics.record(&outcome);
    state
        .metrics
        .count_probe(if outcome.up { "success" } else { "failure" });

    info!(
        "Probed {} in {:.3}s (up={})",
        target,
        outcome.duration.as_secs_f64(),
        outcome.up
    );

    match metrics.render() {
        Ok(body) => ([(CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response(),
        Err(e) => {
            error!("Failed to render metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error rendering metrics: {}", e),
            )
                .into_response()
        }
    }
}

async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(metrics) => ([(CONTENT_TYPE, prometheus::TEXT_FORMAT)], metrics).into_response(),
        Err(e) => {
            error!("Failed to render metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error rendering metrics: {}", e),
            )
                .into_response()
        }
    }
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
