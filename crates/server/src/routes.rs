use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::{Method, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use stillframe_core::error::ApiError;
use stillframe_core::types::{
    AddEmailRequest, AddEmailResponse, MetasRequest, MetasResponse, SearchPage,
    SuggestionsResponse,
};
use stillframe_upstream::{SearchFilters, UpstreamError, transform};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::error::AppError;
use crate::state::AppState;
use crate::validation::{is_valid_email, parse_page, present};

const SEARCH_FAILED: &str = "An internal error occurred while contacting the search service.";
const METAS_FAILED: &str = "An internal error occurred while fetching image metadata.";
const EMAIL_FAILED: &str = "An error occurred while processing the request.";

pub fn build_router(state: AppState) -> Router {
    let email_limiter = state.email_limiter.clone();
    Router::new()
        .route("/health", get(health))
        .route("/api", get(search_or_suggest))
        .route("/api/metas", post(metas))
        .route(
            "/api/addEmail",
            post(add_email)
                .route_layer(axum::middleware::from_fn(
                    crate::rate_limit::rate_limit_middleware,
                ))
                .route_layer(Extension(email_limiter)),
        )
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer()),
        )
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

fn upstream_failure(message: &'static str) -> impl Fn(UpstreamError) -> ApiError {
    move |e| ApiError::Upstream {
        message: message.to_string(),
        details: e.to_string(),
    }
}

/// Body extraction that reports malformed JSON in the failure envelope.
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(b)| b)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e.body_text())).into())
}

async fn not_found(uri: axum::http::Uri) -> AppError {
    ApiError::NotFound(format!("No route for {}", uri.path())).into()
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    sqlx::query("SELECT 1")
        .execute(&state.db)
        .await
        .map_err(|e| ApiError::Internal(format!("database check failed: {e}")))?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
    }))
}

// ---------------------------------------------------------------------------
// Search and suggestions
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ApiQuery {
    pub query: Option<String>,
    pub director: Option<String>,
    pub actor: Option<String>,
    pub artist: Option<String>,
    #[serde(rename = "movieName")]
    pub movie_name: Option<String>,
    #[serde(rename = "movieId")]
    pub movie_id: Option<String>,
    pub page: Option<String>,
}

impl ApiQuery {
    fn has_any_filter(&self) -> bool {
        [
            &self.query,
            &self.director,
            &self.actor,
            &self.artist,
            &self.movie_name,
            &self.movie_id,
        ]
        .into_iter()
        .any(|v| present(v).is_some())
    }

    fn filters(&self) -> SearchFilters {
        let value = |v: &Option<String>| present(v).unwrap_or_default().to_string();
        SearchFilters {
            full_text: value(&self.query),
            director: value(&self.director),
            actor: value(&self.actor),
            artist: value(&self.artist),
            movie_id: value(&self.movie_id),
        }
    }

    /// Label echoed back to the client.
    fn echo(&self) -> String {
        [&self.query, &self.director, &self.artist]
            .into_iter()
            .find_map(present)
            .unwrap_or_default()
            .to_string()
    }
}

/// `GET /api`: movie suggestions when `movieName` is set, otherwise one page
/// of image results.
async fn search_or_suggest(
    State(state): State<AppState>,
    Query(q): Query<ApiQuery>,
) -> Result<Response, AppError> {
    if !q.has_any_filter() {
        return Err(ApiError::BadRequest(
            "Search query or at least one filter is required.".into(),
        )
        .into());
    }

    if let Some(movie_name) = present(&q.movie_name) {
        let suggestions = state
            .provider
            .suggest_entities(movie_name)
            .await
            .map_err(upstream_failure(SEARCH_FAILED))?;
        let data = transform::movie_like(suggestions);
        debug!(fragment = %movie_name, count = data.len(), "suggestions");
        return Ok(Json(SuggestionsResponse {
            success: true,
            query: movie_name.to_string(),
            results_count: data.len(),
            data,
        })
        .into_response());
    }

    let filters = q.filters();
    let page = parse_page(q.page.as_deref());
    let outcome = state
        .provider
        .search(&filters, page)
        .await
        .map_err(upstream_failure(SEARCH_FAILED))?;
    debug!(
        page,
        total = outcome.total_available,
        returned = outcome.results_count,
        "search"
    );

    Ok(Json(SearchPage {
        success: true,
        query: q.echo(),
        current_page: page,
        total_available: outcome.total_available,
        results_count: outcome.results_count,
        data: outcome.images,
    })
    .into_response())
}

// ---------------------------------------------------------------------------
// Related media
// ---------------------------------------------------------------------------

async fn metas(
    State(state): State<AppState>,
    body: Result<Json<MetasRequest>, JsonRejection>,
) -> Result<Json<MetasResponse>, AppError> {
    let body = json_body(body)?;
    let Some(id) = present(&body.id) else {
        return Err(ApiError::BadRequest("Image ID is required.".into()).into());
    };

    let data = state
        .provider
        .metas(id)
        .await
        .map_err(upstream_failure(METAS_FAILED))?;

    Ok(Json(MetasResponse {
        success: true,
        data,
    }))
}

// ---------------------------------------------------------------------------
// Email capture
// ---------------------------------------------------------------------------

async fn add_email(
    State(state): State<AppState>,
    body: Result<Json<AddEmailRequest>, JsonRejection>,
) -> Result<Json<AddEmailResponse>, AppError> {
    let body = json_body(body)?;
    let Some(email) = present(&body.email) else {
        return Err(ApiError::BadRequest("Email is required.".into()).into());
    };
    if !is_valid_email(email) {
        return Err(ApiError::BadRequest("Invalid email format.".into()).into());
    }

    stillframe_db::repo::emails::record(&state.db, email, chrono::Utc::now())
        .await
        .map_err(|e| {
            error!(error = %e, "failed to record email");
            ApiError::Internal(EMAIL_FAILED.to_string())
        })?;
    info!("email recorded");

    Ok(Json(AddEmailResponse {
        success: true,
        message: "Email added successfully.".to_string(),
    }))
}
