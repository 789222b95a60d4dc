use serde::{Deserialize, Serialize};

/// One row of the stored dataset
///
/// Field order matches the persisted column order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieRecord {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    /// Genre names joined with single spaces
    #[serde(default)]
    pub genres: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: String,
    pub vote_average: f64,
}

impl MovieRecord {
    /// Text the similarity model is built from; missing fields contribute nothing
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.overview, self.genres)
    }

    /// Full poster URL, or `None` when no poster path was stored
    pub fn poster_url(&self, image_base_url: &str) -> Option<String> {
        self.poster_path
            .as_deref()
            .filter(|path| !path.trim().is_empty())
            .map(|path| format!("{}{}", image_base_url, path))
    }
}

/// The full collection of ingested movies, in ingestion order
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Dataset {
    movies: Vec<MovieRecord>,
}

impl Dataset {
    pub fn new(movies: Vec<MovieRecord>) -> Self {
        Self { movies }
    }

    pub fn movies(&self) -> &[MovieRecord] {
        &self.movies
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MovieRecord> {
        self.movies.get(index)
    }

    /// Index of the first movie whose title equals `title`, ignoring case
    pub fn position_of_title(&self, title: &str) -> Option<usize> {
        let wanted = title.to_lowercase();
        self.movies
            .iter()
            .position(|movie| movie.title.to_lowercase() == wanted)
    }

    pub fn into_movies(self) -> Vec<MovieRecord> {
        self.movies
    }
}

impl FromIterator<MovieRecord> for Dataset {
    fn from_iter<I: IntoIterator<Item = MovieRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
