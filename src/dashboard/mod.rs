//! # Dashboard — HTTP API Server
//!
//! Runs an Axum HTTP server exposing the XP and objectives API under `/api`,
//! optionally serving the built front-end from a static directory.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | GET | `/api/stats` | current XP record |
//! | POST | `/api/stats` | partial XP update (clamped at zero) |
//! | GET | `/api/objectives` | today's objectives |
//! | POST | `/api/objectives` | add an objective |
//! | POST | `/api/objectives/{id}/toggle` | flip completion |
//! | GET | `/healthz`, `/readyz`, `/metrics` | probes and Prometheus |
//!
//! The [`AppState`] owns the database handle; it is built in [`run`] and torn
//! down with the server. A background task prunes objectives from previous
//! days on a fixed interval.

mod error;
mod routes_health;
mod routes_objectives;
mod routes_stats;

pub use error::ApiError;

use crate::{db, prom_metrics};
use anyhow::Result;
use axum::extract::Request;
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::routing::{get, post};
use axum::Router;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Instrument};

pub struct AppState {
    pub db: db::Database,
    pub prom_metrics: prom_metrics::Metrics,
}

impl AppState {
    pub fn with_db(db: db::Database) -> Arc<Self> {
        Arc::new(AppState {
            db,
            prom_metrics: prom_metrics::Metrics::new(),
        })
    }

    /// Delete objectives from previous UK days and record the count.
    pub async fn prune_objectives(&self) -> Result<u64> {
        let removed = self.db.clear_old_objectives().await?;
        self.prom_metrics.objectives_pruned.inc_by(removed);
        Ok(removed)
    }
}

/// Middleware that records HTTP request duration into the Prometheus histogram,
/// generates (or propagates) a request ID for correlation, and wraps the
/// request in a tracing span.
async fn metrics_middleware(
    axum::extract::State(state): axum::extract::State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> axum::response::Response {
    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let method = req.method().to_string();
    let raw_path = req.uri().path().to_string();
    let norm_path = normalize_path(&raw_path);
    let start = std::time::Instant::now();

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %raw_path,
    );
    let mut response = next.run(req).instrument(span).await;

    state
        .prom_metrics
        .http_request_duration
        .get_or_create(&prom_metrics::HttpLabel {
            method,
            path: norm_path,
        })
        .observe(start.elapsed().as_secs_f64());

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

/// Collapse numeric path segments into `:id` to keep histogram labels bounded.
fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|seg| {
            if !seg.is_empty() && seg.chars().all(|c| c.is_ascii_digit()) {
                ":id"
            } else {
                seg
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

pub fn build_router(state: Arc<AppState>, static_dir: Option<&Path>) -> Router {
    let mut app = Router::new()
        .route(
            "/api/stats",
            get(routes_stats::handler_api_stats_get).post(routes_stats::handler_api_stats_update),
        )
        .route(
            "/api/objectives",
            get(routes_objectives::handler_api_objectives_list)
                .post(routes_objectives::handler_api_objectives_create),
        )
        .route(
            "/api/objectives/{id}/toggle",
            post(routes_objectives::handler_api_objective_toggle),
        )
        .route("/healthz", get(routes_health::handler_healthz))
        .route("/readyz", get(routes_health::handler_readyz))
        .route("/metrics", get(routes_health::handler_metrics));

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true));
    }

    app.layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    )
    .layer(CatchPanicLayer::new())
    .layer(axum::middleware::from_fn_with_state(
        state.clone(),
        metrics_middleware,
    ))
    .layer(TraceLayer::new_for_http())
    .layer(RequestBodyLimitLayer::new(1024 * 1024))
    .layer(TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        Duration::from_secs(30),
    ))
    .with_state(state)
}

/// Spawn the periodic prune of objectives from previous days.
///
/// The first tick fires immediately so a restart after midnight clears
/// yesterday's list straight away.
pub fn spawn_prune_task(state: Arc<AppState>, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            match state.prune_objectives().await {
                Ok(n) if n > 0 => info!(count = n, "pruned objectives from previous days"),
                Ok(_) => {}
                Err(e) => warn!(error = %e, "failed to prune old objectives"),
            }
        }
    })
}

pub async fn run(
    port: u16,
    database_url: &str,
    static_dir: Option<&Path>,
    prune_every: Duration,
) -> Result<()> {
    let database = db::Database::connect(database_url).await?;
    database.migrate().await?;
    let state = AppState::with_db(database);
    let app = build_router(state.clone(), static_dir);

    let prune = spawn_prune_task(Arc::clone(&state), prune_every);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!(port, prune_every_secs = prune_every.as_secs(), "dashboard running");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    prune.abort();
    state.db.pool().close().await;
    info!("dashboard shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("received SIGINT, shutting down"),
                    _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                ctrl_c.await.ok();
                info!("received SIGINT, shutting down");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("received SIGINT, shutting down");
    }
}
