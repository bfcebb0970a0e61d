use stillframe_upstream::flim::DEFAULT_BASE_URL;

/// Runtime settings, read from `STILLFRAME_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub db_path: String,
    pub bind_addr: String,
    pub upstream_url: String,
    /// `/api/addEmail` requests allowed per client per minute.
    pub email_rate_limit: u64,
    /// Key the email limiter on `X-Forwarded-For`. Enable only behind a
    /// proxy that sets the header itself.
    pub trust_forwarded_for: bool,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            db_path: lookup("STILLFRAME_DB").unwrap_or_else(|| "stillframe.db".to_string()),
            bind_addr: lookup("STILLFRAME_BIND").unwrap_or_else(|| "0.0.0.0:8787".to_string()),
            upstream_url: lookup("STILLFRAME_UPSTREAM_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            email_rate_limit: lookup("STILLFRAME_EMAIL_RATE_LIMIT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            trust_forwarded_for: lookup("STILLFRAME_TRUST_FORWARDED_FOR")
                .is_some_and(|v| matches!(v.trim(), "1" | "true" | "yes")),
        }
    }
}
