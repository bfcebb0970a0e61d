//! Debounced movie-name autocomplete.
//!
//! Every keystroke bumps a generation counter. A fetch only starts once the
//! input has been stable for the debounce delay, and its response is dropped
//! unless its generation is still the current one, so a slow response for an
//! old fragment can never overwrite suggestions for newer input.

use std::sync::Arc;
use std::time::Duration;

use stillframe_core::types::MovieSuggestion;
use tokio::sync::Mutex;
use tracing::debug;

use crate::backend::SearchBackend;
use crate::parser::movie_fragment;

pub const DEBOUNCE: Duration = Duration::from_millis(600);

/// Fragments shorter than this clear the list instead of fetching.
pub const MIN_FRAGMENT_CHARS: usize = 2;

/// Identifies the input a fetch was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    pub fragment: String,
}

#[derive(Debug, Default)]
pub struct FeedState {
    generation: u64,
    suggestions: Vec<MovieSuggestion>,
    loading: bool,
    error: Option<String>,
}

impl FeedState {
    /// Register new input. Returns a ticket when the input warrants a fetch;
    /// otherwise clears the list.
    pub fn begin(&mut self, input: &str) -> Option<Ticket> {
        self.generation += 1;
        match movie_fragment(input) {
            Some(fragment) if fragment.chars().count() >= MIN_FRAGMENT_CHARS => Some(Ticket {
                generation: self.generation,
                fragment: fragment.to_string(),
            }),
            _ => {
                self.suggestions.clear();
                self.loading = false;
                None
            }
        }
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.generation == self.generation
    }

    /// Store a response if it is still current. Returns false when stale.
    pub fn accept(&mut self, ticket: &Ticket, suggestions: Vec<MovieSuggestion>) -> bool {
        if !self.is_current(ticket) {
            debug!(fragment = %ticket.fragment, "dropping stale suggestions");
            return false;
        }
        self.suggestions = suggestions;
        self.loading = false;
        self.error = None;
        true
    }

    /// Record a failed fetch if it is still current.
    pub fn fail(&mut self, ticket: &Ticket, error: String) {
        if self.is_current(ticket) {
            self.suggestions.clear();
            self.loading = false;
            self.error = Some(error);
        }
    }

    /// Drop everything and invalidate in-flight fetches.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.suggestions.clear();
        self.loading = false;
    }
}

/// Shared autocomplete handle. Cloning shares the same state.
pub struct Autocomplete<B> {
    backend: Arc<B>,
    state: Arc<Mutex<FeedState>>,
    debounce: Duration,
}

impl<B> Clone for Autocomplete<B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            state: self.state.clone(),
            debounce: self.debounce,
        }
    }
}

impl<B: SearchBackend> Autocomplete<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self::with_debounce(backend, DEBOUNCE)
    }

    pub fn with_debounce(backend: Arc<B>, debounce: Duration) -> Self {
        Self {
            backend,
            state: Arc::new(Mutex::new(FeedState::default())),
            debounce,
        }
    }

    /// Feed the latest search box contents. Resolves to the suggestions this
    /// input produced, or `None` if it was superseded, too short, or failed.
    pub async fn input_changed(&self, input: &str) -> Option<Vec<MovieSuggestion>> {
        let ticket = self.state.lock().await.begin(input)?;

        tokio::time::sleep(self.debounce).await;
        {
            let mut state = self.state.lock().await;
            if !state.is_current(&ticket) {
                return None;
            }
            state.loading = true;
            state.error = None;
        }

        let result = self.backend.suggest(&ticket.fragment).await;

        let mut state = self.state.lock().await;
        match result {
            Ok(suggestions) => {
                if state.accept(&ticket, suggestions) {
                    Some(state.suggestions.clone())
                } else {
                    None
                }
            }
            Err(e) => {
                state.fail(&ticket, e.to_string());
                None
            }
        }
    }

    pub async fn suggestions(&self) -> Vec<MovieSuggestion> {
        self.state.lock().await.suggestions.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.loading
    }

    pub async fn error(&self) -> Option<String> {
        self.state.lock().await.error.clone()
    }

    pub async fn clear(&self) {
        self.state.lock().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ClientError, SearchParams};
    use std::sync::Mutex as StdMutex;
    use stillframe_core::types::{Metas, SearchPage};

    fn suggestion(id: &str, name: &str) -> MovieSuggestion {
        MovieSuggestion {
            id: id.into(),
            name: name.into(),
            hit_score: 1.0,
            entity: Some("ENTITY_MOVIE".into()),
            extra: Default::default(),
        }
    }

    /// Answers each fragment after a per-fragment delay.
    #[derive(Default)]
    struct SlowBackend {
        delays: Vec<(String, Duration)>,
        calls: StdMutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl SearchBackend for SlowBackend {
        async fn suggest(&self, movie_name: &str) -> Result<Vec<MovieSuggestion>, ClientError> {
            self.calls.lock().unwrap().push(movie_name.to_string());
            let delay = self
                .delays
                .iter()
                .find(|(f, _)| f == movie_name)
                .map(|(_, d)| *d)
                .unwrap_or_default();
            tokio::time::sleep(delay).await;
            Ok(vec![suggestion(movie_name, movie_name)])
        }

        async fn search(&self, _: &SearchParams, _: u32) -> Result<SearchPage, ClientError> {
            unreachable!()
        }

        async fn metas(&self, _: &str) -> Result<Metas, ClientError> {
            unreachable!()
        }

        async fn add_email(&self, _: &str) -> Result<(), ClientError> {
            unreachable!()
        }
    }

    #[test]
    fn short_fragment_clears_without_ticket() {
        let mut state = FeedState::default();
        state.suggestions = vec![suggestion("1", "Alien")];
        assert!(state.begin("close up #a").is_none());
        assert!(state.suggestions.is_empty());
        assert!(state.begin("no marker").is_none());
        assert!(state.begin("x #al").is_some());
    }

    #[test]
    fn stale_ticket_is_rejected() {
        let mut state = FeedState::default();
        let old = state.begin("#ali").unwrap();
        let new = state.begin("#alien").unwrap();
        assert!(!state.accept(&old, vec![suggestion("1", "Alien")]));
        assert!(state.suggestions.is_empty());
        assert!(state.accept(&new, vec![suggestion("2", "Aliens")]));
        assert_eq!(state.suggestions[0].id, "2");
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_typing_issues_one_request() {
        let backend = Arc::new(SlowBackend::default());
        let ac = Autocomplete::new(backend.clone());

        let first = {
            let ac = ac.clone();
            tokio::spawn(async move { ac.input_changed("#inc").await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        let second = ac.input_changed("#incep").await;

        assert!(first.await.unwrap().is_none());
        assert_eq!(second.unwrap()[0].id, "incep");
        assert_eq!(*backend.calls.lock().unwrap(), vec!["incep".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_old_response_does_not_overwrite_newer_one() {
        let backend = Arc::new(SlowBackend {
            delays: vec![
                ("ali".to_string(), Duration::from_secs(5)),
                ("alien".to_string(), Duration::from_millis(10)),
            ],
            ..Default::default()
        });
        let ac = Autocomplete::new(backend.clone());

        let slow = {
            let ac = ac.clone();
            tokio::spawn(async move { ac.input_changed("#ali").await })
        };
        // Past the first debounce, so "ali" is in flight.
        tokio::time::sleep(DEBOUNCE + Duration::from_millis(50)).await;
        let fresh = ac.input_changed("#alien").await;

        assert_eq!(fresh.unwrap()[0].id, "alien");
        assert!(slow.await.unwrap().is_none());
        assert_eq!(ac.suggestions().await[0].id, "alien");
        assert_eq!(backend.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_invalidates_in_flight_fetch() {
        let backend = Arc::new(SlowBackend::default());
        let ac = Autocomplete::new(backend.clone());

        let pending = {
            let ac = ac.clone();
            tokio::spawn(async move { ac.input_changed("#matrix").await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        ac.clear().await;

        assert!(pending.await.unwrap().is_none());
        assert!(ac.suggestions().await.is_empty());
        assert!(backend.calls.lock().unwrap().is_empty());
    }
}
