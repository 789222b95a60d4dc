//! TMDB catalog provider
//!
//! API Flow:
//! 1. Listing: /movie/popular?page={n} → movie summaries, one page at a time
//! 2. Details: /movie/{id} → genres for a single movie
//! 3. Search: /search/movie?query={q} → title candidates
//!
//! Every request carries the API key as the `api_key` query parameter and goes through
//! the retry wrapper.

use crate::{
    config::Config,
    error::{AppError, AppResult, FetchError},
    models::{CatalogMovie, CatalogPage, MovieDetails},
    services::{
        catalog::CatalogProvider,
        http_retry::{fetch_with_retry, RetryPolicy},
    },
};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Search hits offered back to the user
const SEARCH_RESULT_LIMIT: usize = 5;

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    language: String,
    retry: RetryPolicy,
}

impl TmdbProvider {
    pub fn new(
        api_key: String,
        api_url: String,
        language: String,
        retry: RetryPolicy,
        timeout: Duration,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            language,
            retry,
        })
    }

    /// Builds a provider from configuration
    ///
    /// Fails with [`AppError::CredentialMissing`] when no API key is configured.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let api_key = config.api_key().ok_or(AppError::CredentialMissing)?;

        Self::new(
            api_key.to_string(),
            config.tmdb_api_url.clone(),
            config.tmdb_language.clone(),
            config.retry_policy(),
            config.http_timeout(),
        )
    }

    /// GET `path` and decode the JSON body
    ///
    /// Bodies that do not decode into `T` are reported as malformed data.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);

        let mut params = vec![("api_key", self.api_key.as_str())];
        params.extend_from_slice(query);

        let response = fetch_with_retry(&self.http_client, &url, &params, &self.retry).await?;
        let body = response.text().await.map_err(FetchError::from)?;

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                path = %path,
                provider = "tmdb",
                "Failed to deserialize TMDB response"
            );
            AppError::MalformedData(format!("Failed to parse TMDB response for {}: {}", path, e))
        })
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbProvider {
    async fn popular_movies(&self, page: u32) -> AppResult<CatalogPage> {
        let page_param = page.to_string();
        let listing: CatalogPage = self
            .get_json(
                "/movie/popular",
                &[
                    ("language", self.language.as_str()),
                    ("page", page_param.as_str()),
                ],
            )
            .await?;

        tracing::info!(
            page,
            results = listing.results.len(),
            total_pages = listing.total_pages,
            provider = "tmdb",
            "Popular movies page fetched"
        );

        Ok(listing)
    }

    async fn movie_details(&self, movie_id: i64) -> AppResult<MovieDetails> {
        let details: MovieDetails = self
            .get_json(&format!("/movie/{}", movie_id), &[])
            .await?;

        tracing::debug!(
            movie_id,
            genres = details.genres.len(),
            provider = "tmdb",
            "Movie details fetched"
        );

        Ok(details)
    }

    async fn search_movies(&self, query: &str) -> AppResult<Vec<CatalogMovie>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let listing: CatalogPage = self
            .get_json("/search/movie", &[("query", query.trim())])
            .await?;

        let mut results = listing.results;
        results.truncate(SEARCH_RESULT_LIMIT);

        tracing::info!(
            query = %query,
            results = results.len(),
            provider = "tmdb",
            "Title search completed"
        );

        Ok(results)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
