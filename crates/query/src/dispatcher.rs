//! Turns one search box into plain, director-scoped and movie-scoped
//! searches, and keeps the state a front end renders from.
//!
//! ```text
//! Idle -> Parsing -> PlainSearch ----------------------> Rendering -> Idle
//!                 -> DirectorSearch -------------------> Rendering -> Idle
//!                 -> ResolvingMovie -> MovieSearch ----> Rendering -> Idle
//!                    ResolvingMovie -> Idle (no match)
//! ```

use std::sync::Arc;
use std::time::Instant;

use stillframe_core::types::{Metas, MovieSuggestion, SearchPage, total_pages};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::autocomplete::Autocomplete;
use crate::backend::{ClientError, SearchBackend, SearchParams};
use crate::email::is_valid_email;
use crate::parser::{ParseError, ParsedQuery, parse_query};
use crate::prompt::{FlagsError, LocalFlags, PromptTracker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    Parsing,
    PlainSearch,
    DirectorSearch,
    ResolvingMovie,
    MovieSearch,
    Rendering,
}

impl DispatchState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Parsing => "parsing",
            Self::PlainSearch => "plain_search",
            Self::DirectorSearch => "director_search",
            Self::ResolvingMovie => "resolving_movie",
            Self::MovieSearch => "movie_search",
            Self::Rendering => "rendering",
        }
    }

    /// Whether `next` is a legal transition from `self`. Any state may fall
    /// back to Idle on failure.
    pub fn can_transition_to(self, next: DispatchState) -> bool {
        use DispatchState::*;
        matches!(
            (self, next),
            (_, Idle)
                | (Idle, Parsing)
                | (Idle, PlainSearch | DirectorSearch | MovieSearch)
                | (Parsing, PlainSearch | DirectorSearch | ResolvingMovie)
                | (ResolvingMovie, MovieSearch)
                | (PlainSearch | DirectorSearch | MovieSearch, Rendering)
        )
    }
}

impl std::fmt::Display for DispatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(
        "Could not find a movie match for \"{name}\". Please try another name or use the suggestions dropdown."
    )]
    NoMovieMatch { name: String },
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("page {page} is out of range")]
    PageOutOfRange { page: u32 },
    #[error("no results to page through")]
    NoResults,
    #[error(transparent)]
    Backend(#[from] ClientError),
    #[error(transparent)]
    Flags(#[from] FlagsError),
}

/// What the front end shows after a search.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsView {
    pub page: SearchPage,
    pub params: SearchParams,
    pub display_query: String,
}

impl ResultsView {
    pub fn current_page(&self) -> u32 {
        self.page.current_page
    }

    pub fn total_pages(&self) -> u64 {
        total_pages(self.page.total_available)
    }

    pub fn has_previous(&self) -> bool {
        self.current_page() > 0
    }

    pub fn has_next(&self) -> bool {
        (self.current_page() as u64) + 1 < self.total_pages()
    }
}

/// Label for a movie-scoped search.
pub fn movie_display_term(text: &str, movie_name: &str) -> String {
    if text.is_empty() {
        movie_name.to_string()
    } else {
        format!("\"{text}\" from \"{movie_name}\"")
    }
}

/// Best suggestion by hit score; on ties the earliest one wins.
pub fn top_suggestion(suggestions: &[MovieSuggestion]) -> Option<&MovieSuggestion> {
    suggestions.iter().fold(None, |best, s| match best {
        Some(b) if b.hit_score >= s.hit_score => Some(b),
        _ => Some(s),
    })
}

pub struct Dispatcher<B> {
    backend: Arc<B>,
    autocomplete: Autocomplete<B>,
    flags: LocalFlags,
    prompt: PromptTracker,
    state: DispatchState,
    results: Option<ResultsView>,
    error: Option<String>,
}

impl<B: SearchBackend> Dispatcher<B> {
    pub fn new(backend: Arc<B>, flags: LocalFlags) -> Self {
        Self {
            autocomplete: Autocomplete::new(backend.clone()),
            backend,
            flags,
            prompt: PromptTracker::new(Instant::now()),
            state: DispatchState::Idle,
            results: None,
            error: None,
        }
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    pub fn results(&self) -> Option<&ResultsView> {
        self.results.as_ref()
    }

    /// Last error message surfaced to the user.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn prompt_showing(&self) -> bool {
        self.prompt.is_showing()
    }

    pub fn flags(&self) -> &LocalFlags {
        &self.flags
    }

    /// Handle for feeding keystrokes to the autocomplete.
    pub fn autocomplete(&self) -> Autocomplete<B> {
        self.autocomplete.clone()
    }

    fn enter(&mut self, next: DispatchState) {
        // A dropped search future can leave us mid-flight; carry on from there.
        if !self.state.can_transition_to(next) {
            warn!(from = %self.state, to = %next, "unexpected dispatch transition");
        }
        debug!(from = %self.state, to = %next, "dispatch transition");
        self.state = next;
    }

    fn fail(&mut self, err: DispatchError) -> DispatchError {
        self.enter(DispatchState::Idle);
        self.results = None;
        self.error = Some(err.to_string());
        err
    }

    /// Run a search for the raw search box contents. `Ok(None)` means the
    /// query was blank and nothing was searched.
    pub async fn submit(&mut self, raw: &str) -> Result<Option<&ResultsView>, DispatchError> {
        self.autocomplete.clear().await;
        self.error = None;
        self.enter(DispatchState::Parsing);

        let parsed = match parse_query(raw) {
            Ok(p) => p,
            Err(e) => return Err(self.fail(e.into())),
        };

        match parsed {
            ParsedQuery::Empty => {
                self.enter(DispatchState::Idle);
                self.results = None;
                Ok(None)
            }
            ParsedQuery::Plain { text } => {
                self.enter(DispatchState::PlainSearch);
                let params = SearchParams {
                    query: text,
                    ..Default::default()
                };
                self.run_search(params, 0, None, true).await.map(Some)
            }
            ParsedQuery::Director { text, director } => {
                self.enter(DispatchState::DirectorSearch);
                let params = SearchParams {
                    query: text,
                    director,
                    ..Default::default()
                };
                self.run_search(params, 0, None, true).await.map(Some)
            }
            ParsedQuery::Movie { text, movie_name } => {
                self.enter(DispatchState::ResolvingMovie);
                self.results = None;
                let movie = match self.resolve_movie(&movie_name).await {
                    Ok(m) => m,
                    Err(e) => return Err(self.fail(e)),
                };
                info!(fragment = %movie_name, movie = %movie.name, "resolved movie");
                self.enter(DispatchState::MovieSearch);
                let display = movie_display_term(&text, &movie.name);
                let params = SearchParams {
                    query: text,
                    movie_id: movie.id,
                    ..Default::default()
                };
                self.run_search(params, 0, Some(display), true).await.map(Some)
            }
        }
    }

    async fn resolve_movie(&self, movie_name: &str) -> Result<MovieSuggestion, DispatchError> {
        let no_match = || DispatchError::NoMovieMatch {
            name: movie_name.to_string(),
        };
        let suggestions = self.backend.suggest(movie_name).await.map_err(|e| {
            warn!(fragment = %movie_name, error = %e, "movie resolution failed");
            no_match()
        })?;
        top_suggestion(&suggestions).cloned().ok_or_else(no_match)
    }

    /// Search inside a movie picked from the autocomplete list, using the
    /// free text currently in the search box.
    pub async fn pick_suggestion(
        &mut self,
        raw: &str,
        movie: &MovieSuggestion,
    ) -> Result<&ResultsView, DispatchError> {
        self.autocomplete.clear().await;
        self.error = None;
        let text = raw.split('#').next().unwrap_or_default().trim().to_string();
        self.enter(DispatchState::MovieSearch);
        let display = movie_display_term(&text, &movie.name);
        let params = SearchParams {
            query: text,
            movie_id: movie.id.clone(),
            ..Default::default()
        };
        self.run_search(params, 0, Some(display), true).await
    }

    /// Replay the current filters for another page.
    pub async fn change_page(&mut self, page: u32) -> Result<&ResultsView, DispatchError> {
        let Some(current) = self.results.as_ref() else {
            return Err(DispatchError::NoResults);
        };
        if page > 0 && (page as u64) >= current.total_pages() {
            return Err(DispatchError::PageOutOfRange { page });
        }
        let params = current.params.clone();
        let display = current.display_query.clone();
        let mode = if !params.movie_id.is_empty() {
            DispatchState::MovieSearch
        } else if !params.director.is_empty() {
            DispatchState::DirectorSearch
        } else {
            DispatchState::PlainSearch
        };
        self.error = None;
        self.enter(mode);
        self.run_search(params, page, Some(display), false).await
    }

    async fn run_search(
        &mut self,
        params: SearchParams,
        page: u32,
        display: Option<String>,
        counts_for_prompt: bool,
    ) -> Result<&ResultsView, DispatchError> {
        let result = self.backend.search(&params, page).await;
        let page_data = match result {
            Ok(p) => p,
            Err(e) => return Err(self.fail(e.into())),
        };

        self.enter(DispatchState::Rendering);
        let display_query = display.unwrap_or_else(|| page_data.query.clone());
        if counts_for_prompt {
            self.prompt.record_search(&self.flags);
        }
        self.enter(DispatchState::Idle);
        let view = self.results.insert(ResultsView {
            page: page_data,
            params,
            display_query,
        });
        Ok(&*view)
    }

    /// Related images for one image. Failures are logged and yield an empty
    /// list.
    pub async fn related(&self, image_id: &str) -> Metas {
        match self.backend.metas(image_id).await {
            Ok(m) => m,
            Err(e) => {
                warn!(image_id, error = %e, "failed to fetch similar images");
                Metas::default()
            }
        }
    }

    /// Raise the prompt if the idle timer ran out.
    pub fn poll_prompt(&mut self, now: Instant) -> bool {
        self.prompt.poll_idle(&self.flags, now)
    }

    pub fn dismiss_prompt(&mut self) {
        self.prompt.dismiss(Instant::now());
    }

    /// Validate locally, store remotely, then silence the prompt for good.
    pub async fn submit_email(&mut self, email: &str) -> Result<(), DispatchError> {
        if !is_valid_email(email) {
            return Err(DispatchError::InvalidEmail);
        }
        self.backend.add_email(email).await?;
        self.flags.mark_email_submitted()?;
        self.prompt.dismiss(Instant::now());
        info!("email submitted, prompt disabled");
        Ok(())
    }
}
