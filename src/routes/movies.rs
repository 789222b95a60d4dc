use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{CatalogMovie, MovieRecord},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
}

#[derive(Debug, Serialize)]
pub struct DatasetResponse {
    pub count: usize,
    pub movies: Vec<MovieRecord>,
}

/// Handler listing the stored dataset
pub async fn list(State(state): State<Arc<AppState>>) -> AppResult<Json<DatasetResponse>> {
    let store = state.store.clone();
    let dataset = tokio::task::spawn_blocking(move || store.read()).await??;

    Ok(Json(DatasetResponse {
        count: dataset.len(),
        movies: dataset.into_movies(),
    }))
}

/// Handler for catalog title search
///
/// Offers candidate titles before asking for recommendations.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<CatalogMovie>>> {
    let catalog = state.catalog()?;
    let movies = catalog.search_movies(&params.q).await?;
    Ok(Json(movies))
}
