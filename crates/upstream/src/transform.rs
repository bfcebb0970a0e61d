//! Reshape provider records into the stable client-facing types.

use stillframe_core::types::{ImageUrls, Metas, MovieSuggestion, SearchResult, SourceInfo};
use tracing::debug;

use crate::SearchOutcome;
use crate::wire::{RawImage, RawMetasResponse, RawSearchResponse};

const MISSING_TITLE: &str = "N/A";

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.is_empty())
}

pub fn reshape_image(raw: RawImage) -> SearchResult {
    SearchResult {
        id: raw.id,
        title: non_empty(raw.title).unwrap_or_else(|| MISSING_TITLE.to_string()),
        year: raw.year,
        category: raw.category,
        caption: raw.caption,
        source_info: SourceInfo {
            directors: raw.directors.unwrap_or_default(),
            artists: raw.artists.unwrap_or_default(),
            production_companies: raw.production_companies.unwrap_or_default(),
            brand: raw.brands.and_then(|b| b.into_iter().next()),
        },
        urls: ImageUrls {
            thumbnail: raw.thumbnail_url.unwrap_or_default(),
            medium_resolution: raw.medium_resolution_url.unwrap_or_default(),
            video_thumbnail: non_empty(raw.video_urls.and_then(|v| v.url_thumbnail)),
        },
        has_video: raw.has_video_urls.unwrap_or(false),
        size: raw.size,
    }
}

pub fn reshape_search(raw: RawSearchResponse) -> SearchOutcome {
    let q = raw.query_response;
    SearchOutcome {
        total_available: q.total_number_of_results,
        results_count: q.number_of_results,
        images: q.images.into_iter().map(reshape_image).collect(),
    }
}

pub fn reshape_metas(raw: RawMetasResponse) -> Metas {
    let d = raw.detailed_image;
    Metas {
        similar_images: d
            .similar_images
            .unwrap_or_default()
            .into_iter()
            .map(reshape_image)
            .collect(),
        associated_searches: d.associated_searches.unwrap_or_default(),
        cinematographers: d.cinematographers.unwrap_or_default(),
        colors: d.colors.unwrap_or_default(),
        imdb_url: d.imdb_url,
    }
}

/// Parse provider suggestions, dropping entries without an id or name.
pub fn parse_suggestions(raw: Vec<serde_json::Value>) -> Vec<MovieSuggestion> {
    raw.into_iter()
        .filter_map(|v| match serde_json::from_value::<MovieSuggestion>(v) {
            Ok(s) => Some(s),
            Err(e) => {
                debug!(error = %e, "skipping unreadable suggestion");
                None
            }
        })
        .collect()
}

/// Keep only movies and music videos, in provider order.
pub fn movie_like(suggestions: Vec<MovieSuggestion>) -> Vec<MovieSuggestion> {
    suggestions
        .into_iter()
        .filter(|s| s.entity_kind().is_some())
        .collect()
}
