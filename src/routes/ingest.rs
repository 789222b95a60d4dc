use axum::{body::Bytes, extract::State, Extension, Json};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::IngestReport,
    routes::AppState,
    services::ingest::run_ingestion,
};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IngestRequest {
    /// Defaults to the configured cap
    pub max_movies: Option<usize>,
}

impl IngestRequest {
    /// An absent or blank body means "use the defaults"; anything else must be valid JSON
    pub fn from_body(body: &[u8]) -> AppResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        serde_json::from_slice(body)
            .map_err(|e| AppError::InvalidInput(format!("Invalid ingest request body: {}", e)))
    }
}

/// Handler that rebuilds the stored dataset from the catalog
///
/// Runs are serialized; a second request waits for the first to finish.
pub async fn ingest(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    body: Bytes,
) -> AppResult<Json<IngestReport>> {
    let request = IngestRequest::from_body(&body)?;
    let catalog = state.catalog()?;
    let max_movies = request.max_movies.unwrap_or(state.config.max_movies);

    let _guard = state.ingest_lock.lock().await;

    tracing::info!(request_id = %request_id, max_movies, "Processing ingestion request");

    let report = run_ingestion(catalog, state.config.pacing(), &state.store, max_movies).await?;

    tracing::info!(
        request_id = %request_id,
        movies = report.movies,
        "Ingestion request completed"
    );

    Ok(Json(report))
}
