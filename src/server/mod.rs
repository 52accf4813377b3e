pub mod rate_limit;
pub mod routes;

use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use crate::estimator::types::ErrorBody;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use portable_atomic::AtomicU64;
use rate_limit::RateLimiter;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

// ── Request counters (lock-free) ──

pub struct ServiceCounters {
    pub requests_served: AtomicU64,
    pub requests_failed: AtomicU64,
    pub requests_limited: AtomicU64,
}

impl ServiceCounters {
    pub fn new() -> Self {
        Self {
            requests_served: AtomicU64::new(0),
            requests_failed: AtomicU64::new(0),
            requests_limited: AtomicU64::new(0),
        }
    }
}

impl Default for ServiceCounters {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ServiceState {
    pub config: AppConfig,
    pub limiter: RateLimiter,
    pub counters: ServiceCounters,
}

impl ServiceState {
    pub fn new(config: AppConfig) -> Arc<Self> {
        Arc::new(Self {
            limiter: RateLimiter::per_minute(config.rate_limit_per_minute),
            config,
            counters: ServiceCounters::new(),
        })
    }
}

/// Errors leave the service as `{"detail": "..."}`.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Calc(_) | AppError::EmptySeries => StatusCode::BAD_REQUEST,
            AppError::InvalidInput(_) | AppError::InvalidLambda(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ErrorBody { detail: self.to_string() })).into_response()
    }
}

pub fn router(state: Arc<ServiceState>) -> Router {
    Router::new()
        .route("/calc/volatility", post(routes::calc_volatility))
        .route(
            "/calc/volatility_from_prices",
            post(routes::calc_volatility_from_prices),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit::enforce,
        ))
        .route("/health", get(routes::health))
        .route("/api/counters", get(routes::get_counters))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Serve the estimation API on an already-bound listener until it fails.
pub async fn serve(listener: tokio::net::TcpListener, config: AppConfig) -> AppResult<()> {
    let app = router(ServiceState::new(config));
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| AppError::Transport(format!("server error: {e}")))
}
