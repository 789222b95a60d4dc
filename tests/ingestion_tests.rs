use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cinematch::{
    config::Config,
    routes::{create_router, AppState},
    services::{CatalogProvider, TmdbProvider},
    storage::DatasetStore,
};

fn test_config(dir: &TempDir, api_url: String) -> Config {
    Config {
        tmdb_api_key: Some("test_key".to_string()),
        tmdb_api_url: api_url,
        dataset_path: dir.path().join("movies.csv"),
        request_delay_ms: 0,
        retry_attempts: 1,
        retry_initial_delay_ms: 1,
        ..Config::default()
    }
}

async fn mount_catalog(server: &MockServer, ids: std::ops::RangeInclusive<i64>, missing: i64) {
    let results: Vec<Value> = ids
        .clone()
        .map(|id| {
            json!({
                "id": id,
                "title": format!("Movie {}", id),
                "overview": format!("Plot number {}", id),
                "poster_path": format!("/{}.jpg", id),
                "release_date": "2023-01-01",
                "vote_average": 6.0
            })
        })
        .collect();

    Mock::given(method("GET"))
        .and(path("/movie/popular"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 1,
            "results": results,
            "total_pages": 1,
            "total_results": results.len()
        })))
        .mount(server)
        .await;

    for id in ids {
        let response = if id == missing {
            ResponseTemplate::new(404)
        } else {
            ResponseTemplate::new(200).set_body_json(json!({
                "id": id,
                "genres": [{"id": 18, "name": "Drama"}, {"id": 53, "name": "Thriller"}]
            }))
        };
        Mock::given(method("GET"))
            .and(path(format!("/movie/{}", id)))
            .respond_with(response)
            .mount(server)
            .await;
    }
}

fn create_test_server(config: Config) -> TestServer {
    let provider: Arc<dyn CatalogProvider> = Arc::new(TmdbProvider::from_config(&config).unwrap());
    let state = Arc::new(AppState::new(config, Some(provider)));
    TestServer::new(create_router(state)).unwrap()
}

#[tokio::test]
async fn test_ingest_skips_movie_with_failed_details() {
    let catalog = MockServer::start().await;
    mount_catalog(&catalog, 1..=10, 7).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, catalog.uri());
    let store = DatasetStore::new(config.dataset_path.clone());
    let server = create_test_server(config);

    let response = server
        .post("/api/v1/ingest")
        .json(&json!({ "max_movies": 10 }))
        .await;

    response.assert_status_ok();
    let report: Value = response.json();
    assert_eq!(report["movies"], 9);
    assert_eq!(report["skipped_movies"], 1);

    let dataset = store.read().unwrap();
    assert_eq!(dataset.len(), 9);
    assert!(dataset.movies().iter().all(|m| m.id != 7));
    assert_eq!(dataset.movies()[0].genres, "Drama Thriller");
    assert_eq!(dataset.movies()[0].poster_path, Some("/1.jpg".to_string()));
}

#[tokio::test]
async fn test_ingest_then_recommend() {
    let catalog = MockServer::start().await;
    mount_catalog(&catalog, 1..=4, 0).await;

    let dir = TempDir::new().unwrap();
    let server = create_test_server(test_config(&dir, catalog.uri()));

    server.post("/api/v1/ingest").await.assert_status_ok();

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("title", "movie 2")
        .add_query_param("n", 3)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r["title"] != "Movie 2"));
}

#[tokio::test]
async fn test_zero_max_movies_stores_empty_dataset() {
    let catalog = MockServer::start().await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, catalog.uri());
    let store = DatasetStore::new(config.dataset_path.clone());
    let server = create_test_server(config);

    let response = server
        .post("/api/v1/ingest")
        .json(&json!({ "max_movies": 0 }))
        .await;

    response.assert_status_ok();
    assert!(store.read().unwrap().is_empty());
    assert!(catalog.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_first_page_failure_is_bad_gateway() {
    let catalog = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/popular"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&catalog)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, catalog.uri());
    let store = DatasetStore::new(config.dataset_path.clone());
    let server = create_test_server(config);

    server
        .post("/api/v1/ingest")
        .json(&json!({ "max_movies": 5 }))
        .await
        .assert_status(StatusCode::BAD_GATEWAY);
    assert!(!store.exists());
}

#[tokio::test]
async fn test_invalid_ingest_body_is_rejected_without_touching_dataset() {
    let catalog = MockServer::start().await;
    mount_catalog(&catalog, 1..=2, 0).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, catalog.uri());
    let store = DatasetStore::new(config.dataset_path.clone());
    let server = create_test_server(config);

    server
        .post("/api/v1/ingest")
        .json(&json!({ "max_movies": 1 }))
        .await
        .assert_status_ok();
    let requests_before = catalog.received_requests().await.unwrap().len();

    for body in [json!({ "max_movies": -1 }), json!({ "max_movies": "all" })] {
        let response = server.post("/api/v1/ingest").json(&body).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.json::<Value>()["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid ingest request body"));
    }

    assert_eq!(store.read().unwrap().len(), 1);
    assert_eq!(
        catalog.received_requests().await.unwrap().len(),
        requests_before
    );
}

#[tokio::test]
async fn test_startup_ingestion_failure_leaves_server_usable() {
    let catalog = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/popular"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&catalog)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, catalog.uri());
    let provider: Arc<dyn CatalogProvider> = Arc::new(TmdbProvider::from_config(&config).unwrap());
    let state = Arc::new(AppState::new(config, Some(provider)));

    assert!(state.ensure_dataset().await.is_none());
    assert!(!state.store.exists());

    let server = TestServer::new(create_router(state)).unwrap();
    server.get("/health").await.assert_status_ok();
    server
        .get("/api/v1/recommendations")
        .add_query_param("title", "Movie 1")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_startup_ingestion_runs_only_without_dataset() {
    let catalog = MockServer::start().await;
    mount_catalog(&catalog, 1..=3, 0).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, catalog.uri());
    let provider: Arc<dyn CatalogProvider> = Arc::new(TmdbProvider::from_config(&config).unwrap());
    let state = AppState::new(config, Some(provider));

    let report = state.ensure_dataset().await.unwrap();
    assert_eq!(report.movies, 3);
    assert_eq!(state.store.read().unwrap().len(), 3);

    let requests = catalog.received_requests().await.unwrap().len();
    assert!(state.ensure_dataset().await.is_none());
    assert_eq!(catalog.received_requests().await.unwrap().len(), requests);
}
