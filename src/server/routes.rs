use super::ServiceState;
use crate::errors::{AppError, AppResult};
use crate::estimator::types::{Estimate, PricesRequest, ReturnsRequest};
use crate::models::volatility;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Json;
use portable_atomic::Ordering;
use std::sync::Arc;

/// POST /calc/volatility -- volatility of a return series
pub async fn calc_volatility(
    State(state): State<Arc<ServiceState>>,
    payload: Result<Json<ReturnsRequest>, JsonRejection>,
) -> AppResult<Json<Estimate>> {
    let Json(req) = payload.map_err(|e| AppError::InvalidInput(e.body_text()))?;
    let result = volatility::estimate_from_returns(&req.returns, req.lambda);
    record(&state, &result, req.returns.len(), req.lambda);
    result.map(Json)
}

/// POST /calc/volatility_from_prices -- log returns derived from prices first
pub async fn calc_volatility_from_prices(
    State(state): State<Arc<ServiceState>>,
    payload: Result<Json<PricesRequest>, JsonRejection>,
) -> AppResult<Json<Estimate>> {
    let Json(req) = payload.map_err(|e| AppError::InvalidInput(e.body_text()))?;
    let result = volatility::estimate_from_prices(&req.prices, req.lambda);
    record(&state, &result, req.prices.len(), req.lambda);
    result.map(Json)
}

fn record(state: &ServiceState, result: &AppResult<Estimate>, n: usize, lambda: f64) {
    match result {
        Ok(est) => {
            state.counters.requests_served.fetch_add(1, Ordering::Relaxed);
            tracing::info!(n, lambda, hist_vol = ?est.hist_vol, ewma_vol = ?est.ewma_vol, "volatility computed");
        }
        Err(e) => {
            state.counters.requests_failed.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(n, lambda, error = %e, "volatility request rejected");
        }
    }
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /api/counters -- request counters (lock-free reads)
pub async fn get_counters(State(state): State<Arc<ServiceState>>) -> Json<serde_json::Value> {
    use portable_atomic::Ordering::Relaxed;
    Json(serde_json::json!({
        "requests_served": state.counters.requests_served.load(Relaxed),
        "requests_failed": state.counters.requests_failed.load(Relaxed),
        "requests_limited": state.counters.requests_limited.load(Relaxed),
    }))
}

#[cfg(test)]
mod tests {
    use crate::config::AppConfig;
    use crate::server::{router, ServiceState};
    use axum::body::Body;
    use axum::extract::connect_info::MockConnectInfo;
    use axum::http::{header, Request, StatusCode};
    use std::net::SocketAddr;
    use tower::ServiceExt;

    fn app(rate_limit_per_minute: u32) -> axum::Router {
        let config = AppConfig {
            rate_limit_per_minute,
            ..AppConfig::default()
        };
        router(ServiceState::new(config)).layer(MockConnectInfo(SocketAddr::from(([10, 0, 0, 1], 4000))))
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: axum::Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_returns_endpoint() {
        let (status, body) = send(
            app(100),
            post_json("/calc/volatility", serde_json::json!({ "returns": [0.01, -0.01], "lambda_": 0.94 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let hist = body["hist_vol"].as_f64().unwrap();
        assert!((hist - 0.0002_f64.sqrt()).abs() < 1e-12);
        assert!(body["ewma_vol"].as_f64().is_some());
        assert!(body.get("n_returns").is_none());
    }

    #[tokio::test]
    async fn test_prices_endpoint_defaults_lambda() {
        let (status, body) = send(
            app(100),
            post_json("/calc/volatility_from_prices", serde_json::json!({ "prices": [100, 101, 102] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["n_returns"], 2);
    }

    #[tokio::test]
    async fn test_single_return_gives_null_hist() {
        let (status, body) = send(
            app(100),
            post_json("/calc/volatility", serde_json::json!({ "returns": [0.01], "lambda_": 0.94 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["hist_vol"].is_null());
    }

    #[tokio::test]
    async fn test_too_few_prices_is_400_with_detail() {
        let (status, body) = send(
            app(100),
            post_json("/calc/volatility_from_prices", serde_json::json!({ "prices": [100], "lambda_": 0.94 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("at least 2 prices"));
    }

    #[tokio::test]
    async fn test_lambda_out_of_range_is_422() {
        let (status, body) = send(
            app(100),
            post_json("/calc/volatility", serde_json::json!({ "returns": [0.01, 0.02], "lambda_": 1.5 })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().contains("lambda_"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_422() {
        let (status, body) = send(
            app(100),
            post_json("/calc/volatility", serde_json::json!({ "prices": [1, 2] })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn test_rate_limit_applies_to_calc_only() {
        let app = app(1);
        let body = serde_json::json!({ "returns": [0.01, 0.02], "lambda_": 0.94 });

        let (status, _) = send(app.clone(), post_json("/calc/volatility", body.clone())).await;
        assert_eq!(status, StatusCode::OK);
        let (status, err) = send(app.clone(), post_json("/calc/volatility", body)).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert!(err["detail"].as_str().unwrap().contains("Rate limit"));

        let health = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, _) = send(app.clone(), health).await;
        assert_eq!(status, StatusCode::OK);

        let counters = Request::builder().uri("/api/counters").body(Body::empty()).unwrap();
        let (_, body) = send(app, counters).await;
        assert_eq!(body["requests_served"], 1);
        assert_eq!(body["requests_limited"], 1);
    }
}
