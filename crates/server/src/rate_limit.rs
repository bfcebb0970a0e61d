use axum::extract::{ConnectInfo, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use stillframe_core::error::ApiError;
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::AppError;

/// Sliding-window request counter keyed by client.
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<HashMap<String, Vec<Instant>>>>,
    max_requests: u64,
    window: Duration,
    trust_forwarded_for: bool,
}

impl RateLimiter {
    pub fn new(max_requests: u64, window_secs: u64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            max_requests,
            window: Duration::from_secs(window_secs),
            trust_forwarded_for: false,
        }
    }

    /// Key clients on the first `X-Forwarded-For` hop. Only safe behind a
    /// reverse proxy that overwrites the header.
    pub fn trusting_forwarded_for(mut self, trust: bool) -> Self {
        self.trust_forwarded_for = trust;
        self
    }

    /// Record a request for `key`. Returns the remaining allowance, or the
    /// number of seconds to wait.
    pub async fn check(&self, key: &str) -> Result<u64, u64> {
        self.check_at(key, Instant::now()).await
    }

    async fn check_at(&self, key: &str, now: Instant) -> Result<u64, u64> {
        let mut buckets = self.inner.lock().await;

        // Expire old hits and forget clients with none left.
        buckets.retain(|_, hits| {
            hits.retain(|t| now.duration_since(*t) < self.window);
            !hits.is_empty()
        });

        let entries = buckets.entry(key.to_string()).or_default();
        if entries.len() as u64 >= self.max_requests {
            Err(self.window.as_secs())
        } else {
            entries.push(now);
            Ok(self.max_requests - entries.len() as u64)
        }
    }

    #[cfg(test)]
    async fn tracked_clients(&self) -> usize {
        self.inner.lock().await.len()
    }
}

/// Client key: the peer address, or the first `X-Forwarded-For` hop when the
/// limiter trusts it.
fn client_key(request: &Request, trust_forwarded_for: bool) -> String {
    let forwarded = trust_forwarded_for
        .then(|| {
            request
                .headers()
                .get("x-forwarded-for")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|ip| !ip.is_empty())
                .map(|ip| format!("ip:{ip}"))
        })
        .flatten();

    forwarded
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ci| format!("ip:{}", ci.0.ip()))
        })
        .unwrap_or_else(|| "unknown".to_string())
}

/// Rate limiting middleware for write routes. Expects a `RateLimiter`
/// extension; passes requests through when none is installed.
pub async fn rate_limit_middleware(request: Request, next: Next) -> Response {
    let Some(rate_limiter) = request.extensions().get::<RateLimiter>().cloned() else {
        return next.run(request).await;
    };

    let key = client_key(&request, rate_limiter.trust_forwarded_for);
    match rate_limiter.check(&key).await {
        Ok(_remaining) => next.run(request).await,
        Err(retry_after_secs) => {
            warn!(client = %key, "rate limited");
            AppError(ApiError::TooManyRequests { retry_after_secs }).into_response()
        }
    }
}
