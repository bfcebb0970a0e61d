use stillframe_core::types::{Metas, MovieSuggestion, SearchPage};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),
    /// Non-2xx status or `success: false`.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("unreadable response: {0}")]
    Parse(String),
}

/// Filters a result page was fetched with. Replayed verbatim when paging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub query: String,
    pub director: String,
    pub movie_id: String,
}

/// The proxy API as seen by the dispatcher.
#[async_trait::async_trait]
pub trait SearchBackend: Send + Sync {
    /// Movie / music-video suggestions for a name fragment.
    async fn suggest(&self, movie_name: &str) -> Result<Vec<MovieSuggestion>, ClientError>;

    async fn search(&self, params: &SearchParams, page: u32) -> Result<SearchPage, ClientError>;

    async fn metas(&self, image_id: &str) -> Result<Metas, ClientError>;

    async fn add_email(&self, email: &str) -> Result<(), ClientError>;
}
