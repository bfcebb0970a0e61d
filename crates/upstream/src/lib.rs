pub mod flim;
pub mod provider;
pub mod transform;
pub mod wire;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("network error: {0}")]
    Network(String),
    #[error("{endpoint} API error (status {status})")]
    Status { endpoint: &'static str, status: u16 },
    #[error("{endpoint} API returned an unreadable body: {reason}")]
    Parse {
        endpoint: &'static str,
        reason: String,
    },
}

/// Filters forwarded to the provider's search endpoint. Empty strings mean
/// "not set", which is how the provider expects unset filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SearchFilters {
    pub full_text: String,
    pub director: String,
    pub actor: String,
    pub artist: String,
    pub movie_id: String,
}

/// One page of reshaped search results.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub total_available: u64,
    pub results_count: u64,
    pub images: Vec<stillframe_core::types::SearchResult>,
}
