//! # raffle-api — Axum HTTP Service for the Raffle Engine
//!
//! A thin JSON surface over [`raffle_engine::RaffleService`]. Handlers
//! translate requests into engine calls and engine errors into
//! [`error::AppError`] responses; no business rule lives here.
//!
//! ## API Surface
//!
//! | Prefix                               | Module                       |
//! |--------------------------------------|------------------------------|
//! | `/v1/users/*`                        | [`routes::users`]            |
//! | `/v1/raffles/*`                      | [`routes::raffles`]          |
//! | `/v1/raffles/{id}/participations`    | [`routes::participations`]   |
//! | `/v1/metrics`                        | request counters             |
//! | `/health/*`                          | liveness and readiness       |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → Handler
//! ```

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::extract::Extension;
use axum::middleware::from_fn;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

use crate::middleware::metrics::{ApiMetrics, MetricsSnapshot};
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) are mounted outside the metrics layer so
/// orchestrator polling does not skew request counts.
pub fn app(state: AppState) -> Router {
    let metrics = ApiMetrics::new();

    let api = Router::new()
        .merge(routes::users::router())
        .merge(routes::raffles::router())
        .merge(routes::participations::router())
        .route("/v1/metrics", get(metrics_snapshot))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(Extension(metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}

/// GET /v1/metrics — Current request counters.
async fn metrics_snapshot(Extension(metrics): Extension<ApiMetrics>) -> Json<MetricsSnapshot> {
    Json(metrics.snapshot())
}
