use crate::{
    error::{AppError, AppResult},
    models::{Dataset, RecommendationResult, SimilarityQuery},
    services::similarity::SimilarityEngine,
    storage::DatasetStore,
};
use std::time::Instant;

/// Recommends the movies most similar to the query title
///
/// The similarity model is built from `dataset` on every call. Fails with
/// [`AppError::NotFound`] when no dataset title matches the query (case-insensitive,
/// exact), which includes every query against an empty dataset.
pub fn recommend(
    dataset: &Dataset,
    query: &SimilarityQuery,
    image_base_url: &str,
) -> AppResult<Vec<RecommendationResult>> {
    let start = Instant::now();
    let engine = SimilarityEngine::build(dataset);

    let index = engine.find(&query.title).ok_or_else(|| {
        tracing::info!(title = %query.title, movies = dataset.len(), "Query title not in dataset");
        AppError::NotFound(format!(
            "Movie '{}' not found in the database. Try another title!",
            query.title
        ))
    })?;

    let recommendations: Vec<RecommendationResult> = engine
        .rank(index, query.n)
        .into_iter()
        .filter_map(|ranked| {
            dataset
                .get(ranked.index)
                .map(|movie| RecommendationResult::from_record(movie, image_base_url, ranked.score))
        })
        .collect();

    tracing::info!(
        title = %query.title,
        requested = query.n,
        returned = recommendations.len(),
        processing_time_ms = start.elapsed().as_millis() as u64,
        "Recommendations computed"
    );

    Ok(recommendations)
}

/// Reads the stored dataset fresh and recommends against it
///
/// Reading and model building run on the blocking pool.
pub async fn recommend_from_store(
    store: DatasetStore,
    query: SimilarityQuery,
    image_base_url: String,
) -> AppResult<Vec<RecommendationResult>> {
    tokio::task::spawn_blocking(move || {
        let dataset = store.read()?;
        recommend(&dataset, &query, &image_base_url)
    })
    .await?
}
