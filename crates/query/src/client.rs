//! HTTP client for the proxy API (`/api`, `/api/metas`, `/api/addEmail`).

use serde::de::DeserializeOwned;
use stillframe_core::types::{
    AddEmailRequest, Metas, MetasRequest, MetasResponse, MovieSuggestion, Outcome, SearchPage,
    SuggestionsResponse,
};
use tracing::debug;

use crate::backend::{ClientError, SearchBackend, SearchParams};

pub struct ProxyClient {
    base_url: String,
    client: reqwest::Client,
}

impl ProxyClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Decode a proxy response. A non-2xx status or `success: false` is a
    /// rejection carrying the server's error message, or `fallback` when the
    /// body has none (e.g. an HTML page from a gateway).
    async fn decode<T: DeserializeOwned>(
        resp: reqwest::Response,
        fallback: &str,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        let rejected = |outcome: Outcome| ClientError::Rejected {
            status: status.as_u16(),
            message: outcome
                .error
                .or(outcome.message)
                .unwrap_or_else(|| fallback.to_string()),
        };

        if !status.is_success() {
            let outcome = resp.json::<Outcome>().await.unwrap_or_default();
            return Err(rejected(outcome));
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))?;
        let outcome: Outcome = serde_json::from_value(body.clone()).unwrap_or_default();
        if !outcome.success {
            return Err(rejected(outcome));
        }

        serde_json::from_value(body).map_err(|e| ClientError::Parse(e.to_string()))
    }

    async fn get_api<T: DeserializeOwned>(
        &self,
        params: &[(&str, String)],
        fallback: &str,
    ) -> Result<T, ClientError> {
        let url = self.url("/api");
        debug!(url = %url, ?params, "proxy request");
        let resp = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Self::decode(resp, fallback).await
    }

    async fn post_api<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> Result<T, ClientError> {
        let url = self.url(path);
        debug!(url = %url, "proxy request");
        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Self::decode(resp, fallback).await
    }
}

/// Query string for a search: unset filters are left out, page is always sent.
pub fn search_query(params: &SearchParams, page: u32) -> Vec<(&'static str, String)> {
    let mut q = Vec::new();
    if !params.query.is_empty() {
        q.push(("query", params.query.clone()));
    }
    if !params.director.is_empty() {
        q.push(("director", params.director.clone()));
    }
    if !params.movie_id.is_empty() {
        q.push(("movieId", params.movie_id.clone()));
    }
    q.push(("page", page.to_string()));
    q
}

#[async_trait::async_trait]
impl SearchBackend for ProxyClient {
    async fn suggest(&self, movie_name: &str) -> Result<Vec<MovieSuggestion>, ClientError> {
        let resp: SuggestionsResponse = self
            .get_api(
                &[("movieName", movie_name.to_string())],
                "Failed to fetch movie suggestions",
            )
            .await?;
        Ok(resp.data)
    }

    async fn search(&self, params: &SearchParams, page: u32) -> Result<SearchPage, ClientError> {
        self.get_api(&search_query(params, page), "Failed to fetch results")
            .await
    }

    async fn metas(&self, image_id: &str) -> Result<Metas, ClientError> {
        let resp: MetasResponse = self
            .post_api(
                "/api/metas",
                &MetasRequest {
                    id: Some(image_id.to_string()),
                },
                "Failed to fetch image metadata",
            )
            .await?;
        Ok(resp.data)
    }

    async fn add_email(&self, email: &str) -> Result<(), ClientError> {
        let _: Outcome = self
            .post_api(
                "/api/addEmail",
                &AddEmailRequest {
                    email: Some(email.to_string()),
                },
                "Failed to submit email.",
            )
            .await?;
        Ok(())
    }
}
