use serde::{Deserialize, Serialize};

use super::MovieRecord;

/// A "more like this" request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimilarityQuery {
    /// Matched case-insensitively and exactly against dataset titles
    pub title: String,
    pub n: usize,
}

impl SimilarityQuery {
    pub fn new(title: impl Into<String>, n: usize) -> Self {
        Self {
            title: title.into(),
            n,
        }
    }
}

/// Read-only projection of a recommended movie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResult {
    pub title: String,
    pub overview: String,
    pub poster_url: Option<String>,
    pub genres: String,
    pub vote_average: f64,
    /// Cosine similarity to the query movie
    #[serde(default)]
    pub score: f64,
}

impl RecommendationResult {
    pub fn from_record(movie: &MovieRecord, image_base_url: &str, score: f64) -> Self {
        Self {
            title: movie.title.clone(),
            overview: movie.overview.clone(),
            poster_url: movie.poster_url(image_base_url),
            genres: movie.genres.clone(),
            vote_average: movie.vote_average,
            score,
        }
    }
}
