use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use super::stop_words::is_stop_word;

/// Two or more word characters between word boundaries
static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"));

/// Lowercased tokens of `text`, stop words removed
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_PATTERN
        .find_iter(&lowered)
        .map(|token| token.as_str())
        .filter(|token| !is_stop_word(token))
        .map(str::to_string)
        .collect()
}

/// Sparse vector over the model vocabulary, entries sorted by term index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    fn from_sorted(entries: Vec<(usize, f64)>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn norm(&self) -> f64 {
        self.entries
            .iter()
            .map(|(_, weight)| weight * weight)
            .sum::<f64>()
            .sqrt()
    }

    pub fn is_zero(&self) -> bool {
        self.entries.iter().all(|(_, weight)| *weight == 0.0)
    }

    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (a_term, a_weight) = self.entries[i];
            let (b_term, b_weight) = other.entries[j];
            match a_term.cmp(&b_term) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_weight * b_weight;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    fn normalized(mut self) -> Self {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, weight) in &mut self.entries {
                *weight /= norm;
            }
        }
        self
    }
}

/// Cosine similarity, defined as 0.0 when either vector is zero
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f64 {
    let denominator = a.norm() * b.norm();
    if denominator == 0.0 {
        return 0.0;
    }
    a.dot(b) / denominator
}

/// TF-IDF weighted, L2-normalized document vectors
///
/// Term frequency is the raw count; inverse document frequency is smoothed as
/// `ln((1 + n) / (1 + df)) + 1`.
#[derive(Debug, Clone)]
pub struct TfidfModel {
    vocabulary: Vec<String>,
    idf: Vec<f64>,
    rows: Vec<SparseVector>,
}

impl TfidfModel {
    pub fn fit<S: AsRef<str>>(documents: &[S]) -> Self {
        let tokenized: Vec<Vec<String>> = documents
            .iter()
            .map(|doc| tokenize(doc.as_ref()))
            .collect();

        let term_index: BTreeMap<&str, usize> = {
            let mut terms: Vec<&str> = tokenized.iter().flatten().map(String::as_str).collect();
            terms.sort_unstable();
            terms.dedup();
            terms
                .into_iter()
                .enumerate()
                .map(|(index, term)| (term, index))
                .collect()
        };

        let counts: Vec<BTreeMap<usize, u32>> = tokenized
            .iter()
            .map(|tokens| {
                let mut doc_counts = BTreeMap::new();
                for token in tokens {
                    *doc_counts.entry(term_index[token.as_str()]).or_insert(0) += 1;
                }
                doc_counts
            })
            .collect();

        let mut document_frequency = vec![0u32; term_index.len()];
        for doc_counts in &counts {
            for term in doc_counts.keys() {
                document_frequency[*term] += 1;
            }
        }

        let n = documents.len() as f64;
        let idf: Vec<f64> = document_frequency
            .iter()
            .map(|df| ((1.0 + n) / (1.0 + f64::from(*df))).ln() + 1.0)
            .collect();

        let rows = counts
            .iter()
            .map(|doc_counts| {
                let entries = doc_counts
                    .iter()
                    .map(|(term, count)| (*term, f64::from(*count) * idf[*term]))
                    .collect();
                SparseVector::from_sorted(entries).normalized()
            })
            .collect();

        let vocabulary = term_index.into_keys().map(str::to_string).collect();

        Self {
            vocabulary,
            idf,
            rows,
        }
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn rows(&self) -> &[SparseVector] {
        &self.rows
    }
}
