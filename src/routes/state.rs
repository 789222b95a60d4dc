use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{IngestReport, Watchlist},
    services::{run_ingestion, CatalogProvider, TmdbProvider},
    storage::DatasetStore,
};

/// Shared application state, owned by whoever builds the router
pub struct AppState {
    pub config: Config,
    pub store: DatasetStore,
    /// Absent when no API key is configured
    pub catalog: Option<Arc<dyn CatalogProvider>>,
    pub watchlist: RwLock<Watchlist>,
    /// Held for the whole of an ingestion run so catalog traffic never overlaps
    pub ingest_lock: Mutex<()>,
}

impl AppState {
    pub fn new(config: Config, catalog: Option<Arc<dyn CatalogProvider>>) -> Self {
        let store = DatasetStore::new(config.dataset_path.clone());
        Self {
            config,
            store,
            catalog,
            watchlist: RwLock::new(Watchlist::new()),
            ingest_lock: Mutex::new(()),
        }
    }

    /// Builds state with a TMDB provider when an API key is configured
    pub fn from_config(config: Config) -> AppResult<Self> {
        let catalog: Option<Arc<dyn CatalogProvider>> = match TmdbProvider::from_config(&config) {
            Ok(provider) => Some(Arc::new(provider)),
            Err(AppError::CredentialMissing) => {
                tracing::warn!("TMDB_API_KEY not set; ingestion and catalog search are disabled");
                None
            }
            Err(e) => return Err(e),
        };

        Ok(Self::new(config, catalog))
    }

    /// The configured catalog, or [`AppError::CredentialMissing`]
    pub fn catalog(&self) -> AppResult<Arc<dyn CatalogProvider>> {
        self.catalog.clone().ok_or(AppError::CredentialMissing)
    }

    /// Ingests a dataset when none is stored and a catalog is configured
    ///
    /// Failures are logged and swallowed so the server can still start; the dataset
    /// can be rebuilt later through the ingest route.
    pub async fn ensure_dataset(&self) -> Option<IngestReport> {
        if self.store.exists() {
            return None;
        }
        let catalog = self.catalog.clone()?;

        tracing::info!(
            path = %self.store.path().display(),
            "No dataset found, ingesting before serving"
        );

        let _guard = self.ingest_lock.lock().await;
        match run_ingestion(
            catalog,
            self.config.pacing(),
            &self.store,
            self.config.max_movies,
        )
        .await
        {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::error!(error = %e, "Startup ingestion failed, serving without a dataset");
                None
            }
        }
    }
}
