//! Request and response bodies of the provider's HTTP API.
//!
//! The provider is loose about types: ids and years arrive as either strings
//! or numbers, and optional lists are sometimes `null`. Everything here is
//! deserialized leniently and normalized in [`crate::transform`].

use serde::{Deserialize, Deserializer, Serialize};
use stillframe_core::types::{ImageSize, PAGE_SIZE};

use crate::SearchFilters;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct SuggestRequest<'a> {
    pub suggest: &'a str,
}

#[derive(Debug, Serialize)]
pub struct MetasRequest<'a> {
    pub id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SearchRequest<'a> {
    pub search: SearchBody<'a>,
    pub page: u32,
    pub number_per_pages: u32,
}

#[derive(Debug, Serialize)]
pub struct SearchBody<'a> {
    pub full_text: &'a str,
    pub director: &'a str,
    pub actor: &'a str,
    pub artist: &'a str,
    pub movie_id: &'a str,
    pub filters: Filters,
    pub negative_filters: NegativeFilters,
}

#[derive(Debug, Default, Serialize)]
pub struct Filters {
    pub genres: Vec<String>,
    pub colors: Vec<String>,
    pub number_of_persons: Vec<String>,
    pub years: Vec<String>,
    pub shot_types: Vec<String>,
    pub movie_types: Vec<String>,
    pub aspect_ratio: Vec<String>,
    pub safety_content: Vec<String>,
    pub has_video_cuts: bool,
    pub camera_motions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct NegativeFilters {
    pub aspect_ratio: Vec<String>,
    pub genres: Vec<String>,
    pub movie_types: Vec<String>,
    pub colors: Vec<String>,
    pub shot_types: Vec<String>,
    pub number_of_persons: Vec<String>,
    pub years: Vec<String>,
    pub safety_content: Vec<String>,
}

impl Default for NegativeFilters {
    /// Animation and unsafe content are always excluded.
    fn default() -> Self {
        Self {
            aspect_ratio: Vec::new(),
            genres: vec!["ANIMATION".to_string()],
            movie_types: Vec::new(),
            colors: Vec::new(),
            shot_types: Vec::new(),
            number_of_persons: Vec::new(),
            years: Vec::new(),
            safety_content: vec!["nudity".to_string(), "violence".to_string()],
        }
    }
}

impl<'a> SearchRequest<'a> {
    pub fn new(filters: &'a SearchFilters, page: u32) -> Self {
        Self {
            search: SearchBody {
                full_text: &filters.full_text,
                director: &filters.director,
                actor: &filters.actor,
                artist: &filters.artist,
                movie_id: &filters.movie_id,
                filters: Filters::default(),
                negative_filters: NegativeFilters::default(),
            },
            page,
            number_per_pages: PAGE_SIZE,
        }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawVideoUrls {
    #[serde(default)]
    pub url_thumbnail: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawImage {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub year: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub directors: Option<Vec<String>>,
    #[serde(default)]
    pub artists: Option<Vec<String>>,
    #[serde(default)]
    pub production_companies: Option<Vec<String>>,
    #[serde(default)]
    pub brands: Option<Vec<String>>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub medium_resolution_url: Option<String>,
    #[serde(default)]
    pub video_urls: Option<RawVideoUrls>,
    #[serde(default)]
    pub has_video_urls: Option<bool>,
    #[serde(default, deserialize_with = "lenient_size")]
    pub size: Option<ImageSize>,
}

#[derive(Debug, Deserialize)]
pub struct RawQueryResponse {
    #[serde(default)]
    pub total_number_of_results: u64,
    #[serde(default)]
    pub number_of_results: u64,
    #[serde(default)]
    pub images: Vec<RawImage>,
}

#[derive(Debug, Deserialize)]
pub struct RawSearchResponse {
    pub query_response: RawQueryResponse,
}

#[derive(Debug, Deserialize)]
pub struct RawSuggestResponse {
    #[serde(default)]
    pub suggestions: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct RawDetailedImage {
    #[serde(default)]
    pub similar_images: Option<Vec<RawImage>>,
    #[serde(default)]
    pub associated_searches: Option<Vec<String>>,
    #[serde(default)]
    pub cinematographers: Option<Vec<String>>,
    #[serde(default)]
    pub colors: Option<Vec<String>>,
    #[serde(default)]
    pub imdb_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawMetasResponse {
    pub detailed_image: RawDetailedImage,
}

fn value_to_string(v: serde_json::Value) -> Option<String> {
    match v {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_or_number<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(d)?;
    value_to_string(v).ok_or_else(|| serde::de::Error::custom("expected string or number"))
}

fn opt_string_or_number<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<serde_json::Value>::deserialize(d)?;
    Ok(v.and_then(value_to_string))
}

/// Image dimensions, rounded to whole pixels. An unreadable size is dropped
/// rather than failing the whole record.
fn lenient_size<'de, D>(d: D) -> Result<Option<ImageSize>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<serde_json::Value>::deserialize(d)?;
    let dim = |v: &serde_json::Value, key: &str| {
        v.get(key)
            .and_then(serde_json::Value::as_f64)
            .filter(|n| n.is_finite() && *n >= 0.0 && *n <= u32::MAX as f64)
            .map(|n| n.round() as u32)
    };
    Ok(v.and_then(|v| {
        Some(ImageSize {
            width: dim(&v, "width")?,
            height: dim(&v, "height")?,
        })
    }))
}
