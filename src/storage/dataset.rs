use std::fs;
use std::path::{Path, PathBuf};

use crate::{
    error::{AppError, AppResult},
    models::{Dataset, MovieRecord},
};

/// Persisted column order
pub const COLUMNS: [&str; 7] = [
    "id",
    "title",
    "overview",
    "genres",
    "poster_path",
    "release_date",
    "vote_average",
];

/// Flat-file home of the dataset
///
/// Writes always replace the whole file: rows go to a sibling temp file which is then
/// renamed over the target, so readers never observe a half-written dataset.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    path: PathBuf,
}

impl DatasetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Replaces any stored dataset with `dataset`
    pub fn write(&self, dataset: &Dataset) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.temp_path();
        {
            // Header is written by hand so an empty dataset still gets one
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_path(&temp_path)?;
            writer.write_record(COLUMNS)?;
            for movie in dataset.movies() {
                if movie.poster_path.as_deref().is_some_and(|p| p.trim().is_empty()) {
                    writer.serialize(MovieRecord {
                        poster_path: None,
                        ..movie.clone()
                    })?;
                } else {
                    writer.serialize(movie)?;
                }
            }
            writer.flush()?;
        }
        fs::rename(&temp_path, &self.path)?;

        tracing::info!(
            path = %self.path.display(),
            movies = dataset.len(),
            "Dataset written"
        );

        Ok(())
    }

    /// Reads the whole stored dataset
    pub fn read(&self) -> AppResult<Dataset> {
        if !self.exists() {
            return Err(AppError::NotFound(format!(
                "No dataset at {}; run ingestion first",
                self.path.display()
            )));
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)?;

        let headers = reader.headers()?;
        if headers.iter().ne(COLUMNS.iter().copied()) {
            return Err(AppError::Storage(format!(
                "Unexpected columns in {}: expected {}, found {}",
                self.path.display(),
                COLUMNS.join(","),
                headers.iter().collect::<Vec<_>>().join(",")
            )));
        }

        let movies = reader
            .deserialize::<MovieRecord>()
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(path = %self.path.display(), movies = movies.len(), "Dataset read");

        Ok(Dataset::new(movies))
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "dataset".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
