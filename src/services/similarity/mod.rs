//! Content-based similarity over the stored dataset
//!
//! Each movie's overview and genres are combined into one document, weighted with
//! TF-IDF, and compared pairwise with cosine similarity. The engine is rebuilt from
//! the dataset on every query and keeps no state between queries.

use crate::models::{Dataset, MovieRecord};

mod stop_words;
pub mod tfidf;

pub use tfidf::{cosine_similarity, tokenize, SparseVector, TfidfModel};

/// Symmetric pairwise cosine similarity matrix
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    scores: Vec<Vec<f64>>,
}

impl SimilarityMatrix {
    /// The diagonal is 1.0 for every non-zero row and 0.0 for zero rows
    pub fn from_model(model: &TfidfModel) -> Self {
        let rows = model.rows();
        let size = rows.len();
        let mut scores = vec![vec![0.0; size]; size];

        for i in 0..size {
            scores[i][i] = if rows[i].is_zero() { 0.0 } else { 1.0 };
            for j in (i + 1)..size {
                let score = cosine_similarity(&rows[i], &rows[j]);
                scores[i][j] = score;
                scores[j][i] = score;
            }
        }

        Self { scores }
    }

    pub fn row(&self, index: usize) -> &[f64] {
        &self.scores[index]
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.scores[i][j]
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// A movie ranked against a query movie
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedMatch {
    /// Position in the dataset
    pub index: usize,
    pub score: f64,
}

pub struct SimilarityEngine<'a> {
    dataset: &'a Dataset,
    matrix: SimilarityMatrix,
}

impl<'a> SimilarityEngine<'a> {
    pub fn build(dataset: &'a Dataset) -> Self {
        let documents: Vec<String> = dataset
            .movies()
            .iter()
            .map(MovieRecord::combined_text)
            .collect();

        let model = TfidfModel::fit(&documents);
        let matrix = SimilarityMatrix::from_model(&model);

        tracing::debug!(
            movies = dataset.len(),
            vocabulary = model.vocabulary().len(),
            "Similarity model built"
        );

        Self { dataset, matrix }
    }

    /// Case-insensitive exact title lookup; the first match in dataset order wins
    pub fn find(&self, title: &str) -> Option<usize> {
        self.dataset.position_of_title(title)
    }

    /// The `n` movies most similar to the movie at `index`, best first
    ///
    /// The query movie itself is never returned. Equal scores keep dataset order.
    pub fn rank(&self, index: usize, n: usize) -> Vec<RankedMatch> {
        let mut ranked: Vec<RankedMatch> = self
            .matrix
            .row(index)
            .iter()
            .enumerate()
            .filter(|(candidate, _)| *candidate != index)
            .map(|(candidate, score)| RankedMatch {
                index: candidate,
                score: *score,
            })
            .collect();

        // `sort_by` is stable, so ties stay in dataset order
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(n);
        ranked
    }

    pub fn matrix(&self) -> &SimilarityMatrix {
        &self.matrix
    }
}
