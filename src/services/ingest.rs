use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{Dataset, IngestReport, MovieRecord},
    services::catalog::{CatalogProvider, TmdbProvider},
    storage::DatasetStore,
};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The catalog never serves listing pages past this one
pub const CATALOG_PAGE_LIMIT: u32 = 500;

/// Largest dataset any caller may request
pub const MAX_DATASET_SIZE: usize = 500;

/// Client-side rate limiting for catalog traffic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Fixed pause between consecutive detail lookups
    pub request_delay: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            request_delay: Duration::from_millis(500),
        }
    }
}

/// What one collection run produced
#[derive(Debug, Clone, PartialEq)]
pub struct IngestOutcome {
    pub dataset: Dataset,
    pub pages_fetched: u32,
    pub skipped_pages: u32,
    pub skipped_movies: u32,
    /// Paging stopped at a listing page that could not be parsed
    pub truncated: bool,
}

/// Walks the popular listing and resolves genres for each movie, strictly sequentially
pub struct Ingester {
    provider: Arc<dyn CatalogProvider>,
    pacing: Pacing,
}

impl Ingester {
    pub fn new(provider: Arc<dyn CatalogProvider>, pacing: Pacing) -> Self {
        Self { provider, pacing }
    }

    /// Collects up to `max_movies` records without persisting them
    ///
    /// Requests above [`MAX_DATASET_SIZE`] are clamped to it.
    ///
    /// Failure policy:
    /// - the first listing page failing in any way fails the run
    /// - a later page that cannot be fetched is skipped
    /// - a later page that cannot be parsed ends paging; what was collected is kept
    /// - a movie whose detail lookup fails is skipped
    pub async fn collect(&self, max_movies: usize) -> AppResult<IngestOutcome> {
        if max_movies > MAX_DATASET_SIZE {
            tracing::warn!(
                requested = max_movies,
                limit = MAX_DATASET_SIZE,
                "Requested dataset size above limit, clamping"
            );
        }
        let max_movies = max_movies.min(MAX_DATASET_SIZE);

        let mut movies: Vec<MovieRecord> = Vec::new();
        let mut seen: HashSet<i64> = HashSet::new();
        let mut pages_fetched = 0;
        let mut skipped_pages = 0;
        let mut skipped_movies = 0;
        let mut truncated = false;
        let mut lookups = 0;

        let mut page = 1;
        let mut last_page = CATALOG_PAGE_LIMIT;

        while movies.len() < max_movies && page <= last_page {
            let listing = match self.provider.popular_movies(page).await {
                Ok(listing) => listing,
                Err(e) if page == 1 => {
                    tracing::error!(error = %e, "First listing page failed, aborting ingestion");
                    return Err(e);
                }
                Err(AppError::MalformedData(msg)) => {
                    tracing::warn!(
                        page,
                        error = %msg,
                        collected = movies.len(),
                        "Malformed listing page, keeping what was collected"
                    );
                    truncated = true;
                    break;
                }
                Err(e) => {
                    tracing::warn!(page, error = %e, "Skipping listing page");
                    skipped_pages += 1;
                    page += 1;
                    continue;
                }
            };
            pages_fetched += 1;

            if listing.total_pages > 0 {
                last_page = listing.total_pages.min(CATALOG_PAGE_LIMIT);
            }
            if listing.results.is_empty() {
                tracing::debug!(page, "Listing exhausted");
                break;
            }

            for movie in listing.results {
                if movies.len() >= max_movies {
                    break;
                }
                if seen.contains(&movie.id) {
                    tracing::debug!(movie_id = movie.id, "Movie already collected");
                    continue;
                }

                if lookups > 0 && !self.pacing.request_delay.is_zero() {
                    tokio::time::sleep(self.pacing.request_delay).await;
                }
                lookups += 1;

                match self.provider.movie_details(movie.id).await {
                    Ok(details) => {
                        seen.insert(movie.id);
                        movies.push(MovieRecord::from_catalog(movie, &details));
                    }
                    Err(e) => {
                        tracing::warn!(
                            movie_id = movie.id,
                            title = %movie.title,
                            error = %e,
                            "Skipping movie, detail lookup failed"
                        );
                        skipped_movies += 1;
                    }
                }
            }

            tracing::info!(page, collected = movies.len(), "Listing page processed");
            page += 1;
        }

        Ok(IngestOutcome {
            dataset: Dataset::new(movies),
            pages_fetched,
            skipped_pages,
            skipped_movies,
            truncated,
        })
    }
}

/// Collects a dataset from `provider` and stores it as a full replacement
pub async fn run_ingestion(
    provider: Arc<dyn CatalogProvider>,
    pacing: Pacing,
    store: &DatasetStore,
    max_movies: usize,
) -> AppResult<IngestReport> {
    let start = Instant::now();

    tracing::info!(
        max_movies,
        provider = provider.name(),
        path = %store.path().display(),
        "Starting ingestion"
    );

    let outcome = Ingester::new(provider, pacing).collect(max_movies).await?;
    let movies = outcome.dataset.len();

    let writer = store.clone();
    let dataset = outcome.dataset;
    tokio::task::spawn_blocking(move || writer.write(&dataset)).await??;

    tracing::info!(
        movies,
        pages = outcome.pages_fetched,
        skipped_pages = outcome.skipped_pages,
        skipped_movies = outcome.skipped_movies,
        truncated = outcome.truncated,
        processing_time_ms = start.elapsed().as_millis() as u64,
        "Ingestion completed"
    );

    Ok(IngestReport {
        movies,
        pages_fetched: outcome.pages_fetched,
        skipped_pages: outcome.skipped_pages,
        skipped_movies: outcome.skipped_movies,
        truncated: outcome.truncated,
        dataset_path: store.path().to_path_buf(),
        completed_at: Utc::now(),
    })
}

/// Ingests from TMDB using `config`
///
/// Fails with [`AppError::CredentialMissing`] before any network call when no API key
/// is configured.
pub async fn ingest(
    config: &Config,
    store: &DatasetStore,
    max_movies: usize,
) -> AppResult<IngestReport> {
    let provider = TmdbProvider::from_config(config)?;
    run_ingestion(Arc::new(provider), config.pacing(), store, max_movies).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::models::{CatalogMovie, CatalogPage, Genre, MovieDetails};
    use crate::services::catalog::MockCatalogProvider;
    use mockall::predicate::eq;
    use tempfile::TempDir;

    fn no_delay() -> Pacing {
        Pacing {
            request_delay: Duration::ZERO,
        }
    }

    fn catalog_movie(id: i64) -> CatalogMovie {
        CatalogMovie {
            id,
            title: format!("Movie {}", id),
            overview: Some(format!("Overview {}", id)),
            poster_path: Some(format!("/{}.jpg", id)),
            release_date: Some("2024-01-01".to_string()),
            vote_average: 7.0,
        }
    }

    fn listing(page: u32, ids: std::ops::RangeInclusive<i64>, total_pages: u32) -> CatalogPage {
        let results: Vec<CatalogMovie> = ids.map(catalog_movie).collect();
        CatalogPage {
            page,
            total_results: results.len() as u32,
            results,
            total_pages,
        }
    }

    fn details(id: i64) -> MovieDetails {
        MovieDetails {
            id,
            genres: vec![
                Genre {
                    id: 28,
                    name: "Action".to_string(),
                },
                Genre {
                    id: 12,
                    name: "Adventure".to_string(),
                },
            ],
        }
    }

    fn not_found(id: i64) -> AppError {
        AppError::Fetch(FetchError::Status {
            status: 404,
            url: format!("/movie/{}", id),
        })
    }

    fn ids(outcome: &IngestOutcome) -> Vec<i64> {
        outcome.dataset.movies().iter().map(|m| m.id).collect()
    }

    #[tokio::test]
    async fn test_zero_max_movies_makes_no_calls() {
        let provider = MockCatalogProvider::new();
        let ingester = Ingester::new(Arc::new(provider), no_delay());

        let outcome = ingester.collect(0).await.unwrap();
        assert!(outcome.dataset.is_empty());
        assert_eq!(outcome.pages_fetched, 0);
    }

    #[tokio::test]
    async fn test_failed_detail_lookup_skips_only_that_movie() {
        let mut provider = MockCatalogProvider::new();
        provider
            .expect_popular_movies()
            .with(eq(1))
            .times(1)
            .returning(|_| Ok(listing(1, 1..=10, 1)));
        provider
            .expect_movie_details()
            .times(10)
            .returning(|id| if id == 4 { Err(not_found(id)) } else { Ok(details(id)) });

        let ingester = Ingester::new(Arc::new(provider), no_delay());
        let outcome = ingester.collect(100).await.unwrap();

        assert_eq!(outcome.dataset.len(), 9);
        assert_eq!(outcome.skipped_movies, 1);
        assert!(!ids(&outcome).contains(&4));
        assert_eq!(outcome.dataset.movies()[0].genres, "Action Adventure");
    }

    #[tokio::test]
    async fn test_stops_at_max_movies() {
        let mut provider = MockCatalogProvider::new();
        provider
            .expect_popular_movies()
            .times(1)
            .returning(|page| Ok(listing(page, 1..=20, 10)));
        provider
            .expect_movie_details()
            .times(3)
            .returning(|id| Ok(details(id)));

        let ingester = Ingester::new(Arc::new(provider), no_delay());
        let outcome = ingester.collect(3).await.unwrap();

        assert_eq!(ids(&outcome), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_oversized_request_is_clamped() {
        let mut provider = MockCatalogProvider::new();
        provider
            .expect_popular_movies()
            .times(25)
            .returning(|page| {
                let first = i64::from(page) * 100;
                Ok(listing(page, first..=first + 19, CATALOG_PAGE_LIMIT))
            });
        provider
            .expect_movie_details()
            .times(MAX_DATASET_SIZE)
            .returning(|id| Ok(details(id)));

        let ingester = Ingester::new(Arc::new(provider), no_delay());
        let outcome = ingester.collect(2000).await.unwrap();

        assert_eq!(outcome.dataset.len(), MAX_DATASET_SIZE);
        assert_eq!(outcome.pages_fetched, 25);
    }

    #[tokio::test]
    async fn test_malformed_detail_lookup_skips_only_that_movie() {
        let mut provider = MockCatalogProvider::new();
        provider
            .expect_popular_movies()
            .with(eq(1))
            .times(1)
            .returning(|_| Ok(listing(1, 1..=3, 1)));
        provider
            .expect_movie_details()
            .times(3)
            .returning(|id| match id {
                2 => Err(AppError::MalformedData("missing genres".to_string())),
                _ => Ok(details(id)),
            });

        let ingester = Ingester::new(Arc::new(provider), no_delay());
        let outcome = ingester.collect(10).await.unwrap();

        assert_eq!(ids(&outcome), vec![1, 3]);
        assert_eq!(outcome.skipped_movies, 1);
        assert!(!outcome.truncated);
    }

    #[tokio::test]
    async fn test_pages_until_total_pages() {
        let mut provider = MockCatalogProvider::new();
        provider
            .expect_popular_movies()
            .times(2)
            .returning(|page| {
                let first = i64::from(page) * 10;
                Ok(listing(page, first..=first + 1, 2))
            });
        provider
            .expect_movie_details()
            .returning(|id| Ok(details(id)));

        let ingester = Ingester::new(Arc::new(provider), no_delay());
        let outcome = ingester.collect(500).await.unwrap();

        assert_eq!(ids(&outcome), vec![10, 11, 20, 21]);
        assert_eq!(outcome.pages_fetched, 2);
    }

    #[tokio::test]
    async fn test_first_page_failure_is_fatal() {
        let mut provider = MockCatalogProvider::new();
        provider.expect_popular_movies().times(1).returning(|_| {
            Err(AppError::Fetch(FetchError::RetriesExhausted {
                attempts: 3,
                last_error: "connection refused".to_string(),
            }))
        });

        let ingester = Ingester::new(Arc::new(provider), no_delay());
        assert!(matches!(
            ingester.collect(10).await,
            Err(AppError::Fetch(FetchError::RetriesExhausted { .. }))
        ));
    }

    #[tokio::test]
    async fn test_later_page_failure_is_skipped() {
        let mut provider = MockCatalogProvider::new();
        provider
            .expect_popular_movies()
            .times(3)
            .returning(|page| match page {
                2 => Err(AppError::Fetch(FetchError::Status {
                    status: 503,
                    url: "/movie/popular".to_string(),
                })),
                _ => {
                    let first = i64::from(page) * 10;
                    Ok(listing(page, first..=first, 3))
                }
            });
        provider
            .expect_movie_details()
            .returning(|id| Ok(details(id)));

        let ingester = Ingester::new(Arc::new(provider), no_delay());
        let outcome = ingester.collect(50).await.unwrap();

        assert_eq!(ids(&outcome), vec![10, 30]);
        assert_eq!(outcome.skipped_pages, 1);
        assert!(!outcome.truncated);
    }

    #[tokio::test]
    async fn test_malformed_later_page_keeps_partial_dataset() {
        let mut provider = MockCatalogProvider::new();
        provider
            .expect_popular_movies()
            .times(2)
            .returning(|page| match page {
                1 => Ok(listing(1, 1..=2, 5)),
                _ => Err(AppError::MalformedData("missing results".to_string())),
            });
        provider
            .expect_movie_details()
            .times(2)
            .returning(|id| Ok(details(id)));

        let ingester = Ingester::new(Arc::new(provider), no_delay());
        let outcome = ingester.collect(50).await.unwrap();

        assert_eq!(ids(&outcome), vec![1, 2]);
        assert!(outcome.truncated);
    }

    #[tokio::test]
    async fn test_empty_page_ends_paging() {
        let mut provider = MockCatalogProvider::new();
        provider
            .expect_popular_movies()
            .times(2)
            .returning(|page| match page {
                1 => Ok(listing(1, 1..=1, 0)),
                _ => Ok(listing(page, 1..=0, 0)),
            });
        provider
            .expect_movie_details()
            .times(1)
            .returning(|id| Ok(details(id)));

        let ingester = Ingester::new(Arc::new(provider), no_delay());
        let outcome = ingester.collect(50).await.unwrap();
        assert_eq!(ids(&outcome), vec![1]);
    }

    #[tokio::test]
    async fn test_duplicate_ids_across_pages_are_collected_once() {
        let mut provider = MockCatalogProvider::new();
        provider
            .expect_popular_movies()
            .times(2)
            .returning(|page| match page {
                1 => Ok(listing(1, 1..=3, 2)),
                _ => Ok(listing(2, 3..=5, 2)),
            });
        provider
            .expect_movie_details()
            .times(5)
            .returning(|id| Ok(details(id)));

        let ingester = Ingester::new(Arc::new(provider), no_delay());
        let outcome = ingester.collect(50).await.unwrap();
        assert_eq!(ids(&outcome), vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_detail_lookups_are_paced() {
        let mut provider = MockCatalogProvider::new();
        provider
            .expect_popular_movies()
            .returning(|_| Ok(listing(1, 1..=3, 1)));
        provider
            .expect_movie_details()
            .returning(|id| Ok(details(id)));

        let pacing = Pacing {
            request_delay: Duration::from_millis(25),
        };
        let ingester = Ingester::new(Arc::new(provider), pacing);

        let start = Instant::now();
        ingester.collect(3).await.unwrap();

        // Three lookups, two pauses between them
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_run_ingestion_persists_dataset() {
        let dir = TempDir::new().unwrap();
        let store = DatasetStore::new(dir.path().join("movies.csv"));

        let mut provider = MockCatalogProvider::new();
        provider.expect_name().return_const("mock");
        provider
            .expect_popular_movies()
            .returning(|_| Ok(listing(1, 1..=2, 1)));
        provider
            .expect_movie_details()
            .returning(|id| Ok(details(id)));

        let report = run_ingestion(Arc::new(provider), no_delay(), &store, 10)
            .await
            .unwrap();

        assert_eq!(report.movies, 2);
        assert_eq!(report.dataset_path, store.path());
        assert_eq!(store.read().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_ingest_without_key_fails_before_network() {
        let dir = TempDir::new().unwrap();
        let store = DatasetStore::new(dir.path().join("movies.csv"));
        let config = Config {
            tmdb_api_url: "http://127.0.0.1:1".to_string(),
            ..Config::default()
        };

        let result = ingest(&config, &store, 10).await;
        assert!(matches!(result, Err(AppError::CredentialMissing)));
        assert!(!store.exists());
    }
}
