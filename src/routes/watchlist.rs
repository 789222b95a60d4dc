use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::{models::RecommendationResult, routes::AppState};

#[derive(Debug, Serialize)]
pub struct AddResponse {
    pub added: bool,
    pub count: usize,
}

/// Get the watchlist
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<RecommendationResult>> {
    let watchlist = state.watchlist.read().await;
    Json(watchlist.entries().to_vec())
}

/// Add a movie; a title already on the list is left alone
pub async fn add(
    State(state): State<Arc<AppState>>,
    Json(movie): Json<RecommendationResult>,
) -> (StatusCode, Json<AddResponse>) {
    let mut watchlist = state.watchlist.write().await;
    let title = movie.title.clone();
    let added = watchlist.add(movie);

    tracing::info!(title = %title, added, "Watchlist updated");

    let status = if added {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    (
        status,
        Json(AddResponse {
            added,
            count: watchlist.len(),
        }),
    )
}

/// Remove every movie from the watchlist
pub async fn clear(State(state): State<Arc<AppState>>) -> StatusCode {
    state.watchlist.write().await.clear();
    StatusCode::NO_CONTENT
}
