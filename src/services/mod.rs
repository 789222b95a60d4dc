pub mod catalog;
pub mod http_retry;
pub mod ingest;
pub mod recommendations;
pub mod similarity;

pub use catalog::{CatalogProvider, TmdbProvider};
pub use ingest::{ingest, run_ingestion, Ingester, Pacing};
pub use recommendations::{recommend, recommend_from_store};
