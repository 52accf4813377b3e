use super::ServiceState;
use crate::estimator::types::ErrorBody;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use portable_atomic::Ordering;
use std::collections::{HashMap, VecDeque};
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Rate check result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateCheck {
    Allowed,
    /// Rejected; the oldest hit in the window expires after this long
    Limited { retry_after: Duration },
}

/// Hit history per client, plus when idle clients were last dropped.
#[derive(Default)]
struct Windows {
    by_ip: HashMap<IpAddr, VecDeque<Instant>>,
    last_sweep: Option<Instant>,
}

/// Sliding-window limiter keyed by client IP.
pub struct RateLimiter {
    limit: usize,
    window: Duration,
    hits: Mutex<Windows>,
}

impl RateLimiter {
    pub fn per_minute(limit: u32) -> Self {
        Self::new(limit, Duration::from_secs(60))
    }

    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit: limit as usize,
            window,
            hits: Mutex::new(Windows::default()),
        }
    }

    /// Record a hit for `ip` at `now` unless the window is already full.
    pub fn check(&self, ip: IpAddr, now: Instant) -> RateCheck {
        let mut hits = self.hits.lock().unwrap_or_else(|e| e.into_inner());
        self.sweep(&mut hits, now);
        let window = hits.by_ip.entry(ip).or_default();

        while window
            .front()
            .is_some_and(|t| now.saturating_duration_since(*t) >= self.window)
        {
            window.pop_front();
        }

        if window.len() >= self.limit {
            let retry_after = window
                .front()
                .map(|t| self.window.saturating_sub(now.saturating_duration_since(*t)))
                .unwrap_or(self.window);
            return RateCheck::Limited { retry_after };
        }

        window.push_back(now);
        RateCheck::Allowed
    }

    /// Forget clients whose newest hit has left the window. Runs at most
    /// once per window length.
    fn sweep(&self, hits: &mut Windows, now: Instant) {
        let due = hits
            .last_sweep
            .is_none_or(|t| now.saturating_duration_since(t) >= self.window);
        if !due {
            return;
        }
        hits.last_sweep = Some(now);

        let before = hits.by_ip.len();
        hits.by_ip.retain(|_, q| {
            q.back()
                .is_some_and(|t| now.saturating_duration_since(*t) < self.window)
        });
        let dropped = before - hits.by_ip.len();
        if dropped > 0 {
            tracing::debug!(dropped, tracked = hits.by_ip.len(), "rate limiter swept idle clients");
        }
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.hits.lock().map(|h| h.by_ip.len()).unwrap_or(0)
    }
}

/// Middleware for the calculation routes.
pub async fn enforce(
    State(state): State<Arc<ServiceState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    match state.limiter.check(addr.ip(), Instant::now()) {
        RateCheck::Allowed => next.run(request).await,
        RateCheck::Limited { retry_after } => {
            state.counters.requests_limited.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(client = %addr.ip(), "rate limit exceeded");
            let secs = retry_after.as_secs().max(1);
            (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, secs.to_string())],
                Json(ErrorBody {
                    detail: format!(
                        "Rate limit exceeded: {} per minute",
                        state.config.rate_limit_per_minute
                    ),
                }),
            )
                .into_response()
        }
    }
}
