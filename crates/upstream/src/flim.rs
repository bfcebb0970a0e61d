//! Client for the Flim media-search API (v2.0.0).
//!
//! Every endpoint is a JSON `POST` sent with the header set the provider's
//! own web app uses.

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, ORIGIN, REFERER, USER_AGENT};
use serde::Serialize;
use serde::de::DeserializeOwned;
use stillframe_core::types::{Metas, MovieSuggestion};
use tracing::{debug, warn};

use crate::provider::MediaProvider;
use crate::wire::{
    MetasRequest, RawMetasResponse, RawSearchResponse, RawSuggestResponse, SearchRequest,
    SuggestRequest,
};
use crate::{SearchFilters, SearchOutcome, UpstreamError, transform};

pub const DEFAULT_BASE_URL: &str = "https://api.flim.ai/2.0.0";

const APP_ORIGIN: &str = "https://app.flim.ai";
const APP_REFERER: &str = "https://app.flim.ai/";
const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/137.0.0.0 Safari/537.36";

pub struct FlimClient {
    base_url: String,
    client: reqwest::Client,
}

impl FlimClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn headers() -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(ACCEPT, HeaderValue::from_static("*/*"));
        h.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        h.insert(ORIGIN, HeaderValue::from_static(APP_ORIGIN));
        h.insert(REFERER, HeaderValue::from_static(APP_REFERER));
        h.insert(USER_AGENT, HeaderValue::from_static(BROWSER_UA));
        h
    }

    async fn post_json<B, T>(
        &self,
        endpoint: &'static str,
        path: &str,
        body: &B,
    ) -> Result<T, UpstreamError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        debug!(url = %url, endpoint, "upstream request");

        let resp = self
            .client
            .post(&url)
            .headers(Self::headers())
            .json(body)
            .send()
            .await
            .map_err(|e| UpstreamError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            warn!(endpoint, status = status.as_u16(), "upstream returned an error status");
            return Err(UpstreamError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        resp.json().await.map_err(|e| UpstreamError::Parse {
            endpoint,
            reason: e.to_string(),
        })
    }
}

impl Default for FlimClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait::async_trait]
impl MediaProvider for FlimClient {
    fn name(&self) -> &str {
        "flim"
    }

    async fn suggest_entities(
        &self,
        fragment: &str,
    ) -> Result<Vec<MovieSuggestion>, UpstreamError> {
        let data: RawSuggestResponse = self
            .post_json("Suggest", "/suggest-entities", &SuggestRequest { suggest: fragment })
            .await?;
        Ok(transform::parse_suggestions(data.suggestions))
    }

    async fn search(
        &self,
        filters: &SearchFilters,
        page: u32,
    ) -> Result<SearchOutcome, UpstreamError> {
        let data: RawSearchResponse = self
            .post_json("Search", "/search", &SearchRequest::new(filters, page))
            .await?;
        Ok(transform::reshape_search(data))
    }

    async fn metas(&self, image_id: &str) -> Result<Metas, UpstreamError> {
        let data: RawMetasResponse = self
            .post_json("Metas", "/metas", &MetasRequest { id: image_id })
            .await?;
        Ok(transform::reshape_metas(data))
    }
}
