#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use stillframe_core::types::{Metas, MovieSuggestion, SearchResult};
use stillframe_server::rate_limit::RateLimiter;
use stillframe_server::state::AppState;
use stillframe_upstream::provider::MediaProvider;
use stillframe_upstream::{SearchFilters, SearchOutcome, UpstreamError};

/// In-process provider that records what it was asked.
#[derive(Default)]
pub struct FakeProvider {
    pub suggestions: Vec<MovieSuggestion>,
    pub total_available: u64,
    pub search_status: Option<u16>,
    pub searches: Mutex<Vec<(SearchFilters, u32)>>,
    pub suggest_calls: Mutex<Vec<String>>,
    pub metas_calls: Mutex<Vec<String>>,
}

pub fn suggestion(id: &str, name: &str, hit_score: f64, entity: &str) -> MovieSuggestion {
    MovieSuggestion {
        id: id.into(),
        name: name.into(),
        hit_score,
        entity: Some(entity.into()),
        extra: Default::default(),
    }
}

pub fn image(id: &str) -> SearchResult {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "title": format!("Still {id}"),
        "year": "1999",
        "category": "movie",
        "caption": null,
        "source_info": { "directors": ["Lana Wachowski"], "artists": [], "production_companies": [], "brand": null },
        "urls": { "thumbnail": "t", "medium_resolution": "m", "video_thumbnail": null },
        "has_video": false
    }))
    .unwrap()
}

#[async_trait::async_trait]
impl MediaProvider for FakeProvider {
    fn name(&self) -> &str {
        "fake"
    }

    async fn suggest_entities(
        &self,
        fragment: &str,
    ) -> Result<Vec<MovieSuggestion>, UpstreamError> {
        self.suggest_calls.lock().unwrap().push(fragment.to_string());
        Ok(self.suggestions.clone())
    }

    async fn search(
        &self,
        filters: &SearchFilters,
        page: u32,
    ) -> Result<SearchOutcome, UpstreamError> {
        self.searches.lock().unwrap().push((filters.clone(), page));
        if let Some(status) = self.search_status {
            return Err(UpstreamError::Status {
                endpoint: "Search",
                status,
            });
        }
        let id = format!("{}-{}-{page}", filters.full_text, filters.movie_id);
        Ok(SearchOutcome {
            total_available: self.total_available,
            results_count: 1,
            images: vec![image(&id)],
        })
    }

    async fn metas(&self, image_id: &str) -> Result<Metas, UpstreamError> {
        self.metas_calls.lock().unwrap().push(image_id.to_string());
        Ok(Metas {
            similar_images: vec![image("similar-1")],
            associated_searches: vec!["neon".into()],
            cinematographers: vec!["Bill Pope".into()],
            colors: vec!["#00ff00".into()],
            imdb_url: Some("https://www.imdb.com/title/tt0133093/".into()),
        })
    }
}

pub async fn state_with(provider: Arc<FakeProvider>, email_limit: u64) -> AppState {
    let pool = stillframe_db::connect(":memory:").await.unwrap();
    stillframe_db::migrate::run(&pool).await.unwrap();
    AppState {
        db: pool,
        provider,
        email_limiter: RateLimiter::new(email_limit, 60),
    }
}
