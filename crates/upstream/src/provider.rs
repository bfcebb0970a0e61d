use stillframe_core::types::{Metas, MovieSuggestion};

use crate::{SearchFilters, SearchOutcome, UpstreamError};

/// A media catalog that can suggest entities, search images and describe
/// one image.
#[async_trait::async_trait]
pub trait MediaProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Autocomplete a name fragment. Returns every entity kind the provider
    /// knows; callers filter.
    async fn suggest_entities(&self, fragment: &str)
    -> Result<Vec<MovieSuggestion>, UpstreamError>;

    /// Fetch one zero-based page of images matching `filters`.
    async fn search(
        &self,
        filters: &SearchFilters,
        page: u32,
    ) -> Result<SearchOutcome, UpstreamError>;

    /// Similar images and extra metadata for one image id.
    async fn metas(&self, image_id: &str) -> Result<Metas, UpstreamError>;
}
