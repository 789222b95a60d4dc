//! Movie catalog abstraction
//!
//! The ingester only needs two read-only lookups from a catalog: a paged listing of
//! popular titles and a per-title detail document carrying genres. Title search backs
//! the "did you mean" lookup in front of recommendations.

use crate::{
    error::AppResult,
    models::{CatalogMovie, CatalogPage, MovieDetails},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Trait for movie catalog providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// One page (1-based) of the popular movies listing
    async fn popular_movies(&self, page: u32) -> AppResult<CatalogPage>;

    /// Detail document for a single movie, including its genres
    async fn movie_details(&self, movie_id: i64) -> AppResult<MovieDetails>;

    /// Titles matching a free-text query, best matches first
    async fn search_movies(&self, query: &str) -> AppResult<Vec<CatalogMovie>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
