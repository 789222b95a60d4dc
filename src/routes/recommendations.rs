use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{RecommendationResult, SimilarityQuery},
    routes::AppState,
    services::recommendations,
};

#[derive(Debug, Deserialize)]
pub struct RecommendationParams {
    pub title: String,
    /// Defaults to the configured recommendation count
    pub n: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub query: String,
    pub results: Vec<RecommendationResult>,
}

/// Handler for recommendations endpoint
///
/// The stored dataset is read and the similarity model rebuilt on every request.
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<RecommendationParams>,
) -> AppResult<Json<RecommendationResponse>> {
    let title = params.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::InvalidInput("title cannot be empty".to_string()));
    }

    let n = params.n.unwrap_or(state.config.recommendation_count);

    tracing::info!(
        request_id = %request_id,
        title = %title,
        n,
        "Processing recommendation request"
    );

    let results = recommendations::recommend_from_store(
        state.store.clone(),
        SimilarityQuery::new(title.clone(), n),
        state.config.image_base_url.clone(),
    )
    .await?;

    Ok(Json(RecommendationResponse {
        query: title,
        results,
    }))
}
