use std::sync::Arc;

use sqlx::SqlitePool;
use stillframe_upstream::provider::MediaProvider;

use crate::rate_limit::RateLimiter;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub provider: Arc<dyn MediaProvider>,
    pub email_limiter: RateLimiter,
}
