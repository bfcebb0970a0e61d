use serde::{Deserialize, Serialize};

/// Number of images requested from the provider per page.
pub const PAGE_SIZE: u32 = 50;

/// Number of pages needed to show `total_available` results.
pub fn total_pages(total_available: u64) -> u64 {
    total_available.div_ceil(PAGE_SIZE as u64)
}

/// Provider entity kinds a suggestion can be searched inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Movie,
    MusicVideo,
}

impl EntityKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ENTITY_MOVIE" => Some(Self::Movie),
            "ENTITY_MUSIC_VIDEO" => Some(Self::MusicVideo),
            _ => None,
        }
    }
}

/// Credits attached to an image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub directors: Vec<String>,
    pub artists: Vec<String>,
    pub production_companies: Vec<String>,
    pub brand: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageUrls {
    pub thumbnail: String,
    pub medium_resolution: String,
    pub video_thumbnail: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// An image in the stable shape served to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub year: Option<String>,
    pub category: Option<String>,
    pub caption: Option<String>,
    pub source_info: SourceInfo,
    pub urls: ImageUrls,
    pub has_video: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<ImageSize>,
}

/// A candidate movie (or music video) for a name fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSuggestion {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub hit_score: f64,
    #[serde(default)]
    pub entity: Option<String>,
    /// Provider fields we do not interpret.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Provider ids arrive as strings or numbers.
fn id_string<'de, D>(d: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match serde_json::Value::deserialize(d)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

impl MovieSuggestion {
    pub fn entity_kind(&self) -> Option<EntityKind> {
        self.entity.as_deref().and_then(EntityKind::from_str)
    }
}

/// `GET /api?movieName=…`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionsResponse {
    pub success: bool,
    pub query: String,
    pub results_count: usize,
    pub data: Vec<MovieSuggestion>,
}

/// `GET /api?query=…&page=…`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub success: bool,
    pub query: String,
    #[serde(rename = "currentPage")]
    pub current_page: u32,
    pub total_available: u64,
    pub results_count: u64,
    pub data: Vec<SearchResult>,
}

/// Similar images and extra metadata for one image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metas {
    pub similar_images: Vec<SearchResult>,
    #[serde(default)]
    pub associated_searches: Vec<String>,
    #[serde(default)]
    pub cinematographers: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub imdb_url: Option<String>,
}

/// `POST /api/metas`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetasResponse {
    pub success: bool,
    pub data: Metas,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetasRequest {
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddEmailRequest {
    #[serde(default)]
    pub email: Option<String>,
}

/// `POST /api/addEmail`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddEmailResponse {
    pub success: bool,
    pub message: String,
}

/// Minimal view of any response, used to detect `success: false`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Outcome {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
