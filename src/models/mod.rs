use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod movie;
pub mod recommendation;
pub mod watchlist;

pub use movie::{Dataset, MovieRecord};
pub use recommendation::{RecommendationResult, SimilarityQuery};
pub use watchlist::Watchlist;

// ============================================================================
// TMDB API Types
// ============================================================================

/// One page of a TMDB listing (`/movie/popular`, `/search/movie`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogPage {
    pub page: u32,
    pub results: Vec<CatalogMovie>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

/// Movie summary as it appears in TMDB listings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogMovie {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
}

/// TMDB `/movie/{id}` document, reduced to the fields we keep
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetails {
    pub id: i64,
    #[serde(default)]
    pub genres: Vec<Genre>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

impl MovieDetails {
    /// Genre names joined with single spaces
    pub fn genre_names(&self) -> String {
        self.genres
            .iter()
            .map(|genre| genre.name.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl MovieRecord {
    /// Merges a listing summary with its resolved genres
    pub fn from_catalog(movie: CatalogMovie, details: &MovieDetails) -> Self {
        Self {
            id: movie.id,
            title: movie.title,
            overview: movie.overview.unwrap_or_default(),
            genres: details.genre_names(),
            poster_path: movie.poster_path.filter(|path| !path.trim().is_empty()),
            release_date: movie.release_date.unwrap_or_default(),
            vote_average: movie.vote_average,
        }
    }
}

// ============================================================================
// Ingestion
// ============================================================================

/// Summary returned to callers once a dataset has been ingested and stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    pub movies: usize,
    pub pages_fetched: u32,
    pub skipped_pages: u32,
    pub skipped_movies: u32,
    /// Paging stopped early because a listing page could not be parsed
    pub truncated: bool,
    pub dataset_path: PathBuf,
    pub completed_at: DateTime<Utc>,
}
