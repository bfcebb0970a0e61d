mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};
use stillframe_server::routes::build_router;

use common::{FakeProvider, state_with, suggestion};

async fn test_app(provider: FakeProvider) -> (TestServer, Arc<FakeProvider>) {
    let provider = Arc::new(provider);
    let state = state_with(provider.clone(), 100).await;
    (TestServer::new(build_router(state)).unwrap(), provider)
}

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let (server, _) = test_app(FakeProvider::default()).await;
    let resp = server.get("/health").await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn search_without_filters_is_rejected() {
    let (server, provider) = test_app(FakeProvider::default()).await;
    let resp = server.get("/api").add_query_param("page", "2").await;

    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = resp.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Search query or at least one filter is required.");
    assert!(provider.searches.lock().unwrap().is_empty());
}

#[tokio::test]
async fn search_returns_reshaped_page() {
    let (server, provider) = test_app(FakeProvider {
        total_available: 240,
        ..Default::default()
    })
    .await;

    let resp = server
        .get("/api")
        .add_query_param("query", "rain")
        .add_query_param("director", "Wong Kar-wai")
        .add_query_param("page", "3")
        .await;
    resp.assert_status_ok();

    let body: Value = resp.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["query"], "rain");
    assert_eq!(body["currentPage"], 3);
    assert_eq!(body["total_available"], 240);
    assert_eq!(body["results_count"], 1);
    assert_eq!(body["data"][0]["source_info"]["directors"][0], "Lana Wachowski");

    let searches = provider.searches.lock().unwrap();
    assert_eq!(searches[0].0.full_text, "rain");
    assert_eq!(searches[0].0.director, "Wong Kar-wai");
    assert_eq!(searches[0].1, 3);
}

#[tokio::test]
async fn echo_falls_back_to_director_then_artist() {
    let (server, _) = test_app(FakeProvider::default()).await;

    let body: Value = server
        .get("/api")
        .add_query_param("director", "Agnès Varda")
        .await
        .json();
    assert_eq!(body["query"], "Agnès Varda");

    let body: Value = server
        .get("/api")
        .add_query_param("artist", "Björk")
        .await
        .json();
    assert_eq!(body["query"], "Björk");
}

#[tokio::test]
async fn bad_page_defaults_to_zero() {
    let (server, provider) = test_app(FakeProvider::default()).await;
    let body: Value = server
        .get("/api")
        .add_query_param("query", "car")
        .add_query_param("page", "next")
        .await
        .json();
    assert_eq!(body["currentPage"], 0);
    assert_eq!(provider.searches.lock().unwrap()[0].1, 0);
}

#[tokio::test]
async fn movie_name_returns_movie_like_suggestions() {
    let (server, provider) = test_app(FakeProvider {
        suggestions: vec![
            suggestion("m1", "Heat", 0.9, "ENTITY_MOVIE"),
            suggestion("d1", "Michael Mann", 0.99, "ENTITY_DIRECTOR"),
            suggestion("v1", "Heat Wave", 0.4, "ENTITY_MUSIC_VIDEO"),
        ],
        ..Default::default()
    })
    .await;

    let resp = server
        .get("/api")
        .add_query_param("movieName", "heat")
        .add_query_param("query", "ignored")
        .await;
    resp.assert_status_ok();

    let body: Value = resp.json();
    assert_eq!(body["query"], "heat");
    assert_eq!(body["results_count"], 2);
    assert_eq!(body["data"][0]["id"], "m1");
    assert_eq!(body["data"][1]["id"], "v1");
    assert!(provider.searches.lock().unwrap().is_empty());
    assert_eq!(*provider.suggest_calls.lock().unwrap(), vec!["heat".to_string()]);
}

#[tokio::test]
async fn upstream_500_becomes_failure_envelope() {
    let (server, _) = test_app(FakeProvider {
        search_status: Some(500),
        ..Default::default()
    })
    .await;

    let resp = server.get("/api").add_query_param("query", "car").await;
    resp.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = resp.json();
    assert_eq!(body["success"], false);
    assert!(body.get("data").is_none());
    assert_eq!(
        body["error"],
        "An internal error occurred while contacting the search service."
    );
    assert!(body["details"].as_str().unwrap().contains("500"));
}

#[tokio::test]
async fn metas_returns_similar_images_and_passthrough() {
    let (server, provider) = test_app(FakeProvider::default()).await;
    let resp = server.post("/api/metas").json(&json!({ "id": "img-7" })).await;
    resp.assert_status_ok();

    let body: Value = resp.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["similar_images"][0]["id"], "similar-1");
    assert_eq!(body["data"]["associated_searches"][0], "neon");
    assert_eq!(body["data"]["cinematographers"][0], "Bill Pope");
    assert_eq!(body["data"]["colors"][0], "#00ff00");
    assert_eq!(
        body["data"]["imdb_url"],
        "https://www.imdb.com/title/tt0133093/"
    );
    assert_eq!(*provider.metas_calls.lock().unwrap(), vec!["img-7".to_string()]);
}

#[tokio::test]
async fn metas_requires_id() {
    let (server, provider) = test_app(FakeProvider::default()).await;
    let resp = server.post("/api/metas").json(&json!({})).await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = resp.json();
    assert_eq!(body["error"], "Image ID is required.");
    assert!(provider.metas_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_json_is_a_bad_request_envelope() {
    let (server, _) = test_app(FakeProvider::default()).await;
    let resp = server
        .post("/api/metas")
        .content_type("application/json")
        .text("{not json")
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = resp.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "bad_request");
}

#[tokio::test]
async fn add_email_validates_and_persists() {
    let provider = Arc::new(FakeProvider::default());
    let state = state_with(provider, 100).await;
    let db = state.db.clone();
    let server = TestServer::new(build_router(state)).unwrap();

    let resp = server.post("/api/addEmail").json(&json!({})).await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(resp.json::<Value>()["error"], "Email is required.");

    let resp = server
        .post("/api/addEmail")
        .json(&json!({ "email": "nope@nowhere" }))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(resp.json::<Value>()["error"], "Invalid email format.");

    for _ in 0..2 {
        let resp = server
            .post("/api/addEmail")
            .json(&json!({ "email": "fan@example.com" }))
            .await;
        resp.assert_status_ok();
        let body: Value = resp.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Email added successfully.");
    }

    let stored = stillframe_db::repo::emails::submitted_at(&db, "fan@example.com")
        .await
        .unwrap();
    assert!(stored.is_some());
    let count = stillframe_db::repo::kv::count(&db, stillframe_db::repo::emails::NAMESPACE)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn add_email_is_rate_limited() {
    let state = state_with(Arc::new(FakeProvider::default()), 2).await;
    let server = TestServer::new(build_router(state)).unwrap();

    for i in 0..2 {
        server
            .post("/api/addEmail")
            .json(&json!({ "email": format!("user{i}@example.com") }))
            .await
            .assert_status_ok();
    }

    let resp = server
        .post("/api/addEmail")
        .json(&json!({ "email": "late@example.com" }))
        .await;
    resp.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let body: Value = resp.json();
    assert_eq!(body["code"], "too_many_requests");
    assert_eq!(body["details"]["retry_after_seconds"], 60);
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let (server, _) = test_app(FakeProvider::default()).await;
    let resp = server
        .get("/api")
        .add_query_param("query", "car")
        .add_header(
            axum::http::header::ORIGIN,
            "https://someone.example".parse::<axum::http::HeaderValue>().unwrap(),
        )
        .await;
    resp.assert_status_ok();
    assert_eq!(
        resp.header(axum::http::header::ACCESS_CONTROL_ALLOW_ORIGIN),
        "*"
    );
}

#[tokio::test]
async fn forwarded_for_does_not_buy_a_fresh_bucket() {
    let state = state_with(Arc::new(FakeProvider::default()), 2).await;
    let server = TestServer::new(build_router(state)).unwrap();

    let mut accepted = 0;
    for i in 0..10 {
        let resp = server
            .post("/api/addEmail")
            .add_header(
                "x-forwarded-for",
                format!("198.51.100.{i}")
                    .parse::<axum::http::HeaderValue>()
                    .unwrap(),
            )
            .json(&json!({ "email": format!("spoof{i}@example.com") }))
            .await;
        if resp.status_code() == StatusCode::OK {
            accepted += 1;
        }
    }
    assert_eq!(accepted, 2);
}

#[tokio::test]
async fn rate_limit_only_covers_add_email() {
    let state = state_with(Arc::new(FakeProvider::default()), 1).await;
    let server = TestServer::new(build_router(state)).unwrap();

    for _ in 0..3 {
        server
            .get("/api")
            .add_query_param("query", "car")
            .await
            .assert_status_ok();
    }
}

#[tokio::test]
async fn unknown_route_is_a_not_found_envelope() {
    let (server, _) = test_app(FakeProvider::default()).await;
    let resp = server.get("/api/nothing").await;
    resp.assert_status(StatusCode::NOT_FOUND);
    let body: Value = resp.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "not_found");
    assert_eq!(body["error"], "No route for /api/nothing");
}
