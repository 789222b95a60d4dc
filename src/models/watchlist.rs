use serde::{Deserialize, Serialize};

use super::RecommendationResult;

/// Movies the user has set aside for later, in the order they were added
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Watchlist {
    entries: Vec<RecommendationResult>,
}

impl Watchlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a movie unless one with the same title is already listed
    ///
    /// Returns `true` when the movie was added.
    pub fn add(&mut self, movie: RecommendationResult) -> bool {
        if self.contains_title(&movie.title) {
            return false;
        }
        self.entries.push(movie);
        true
    }

    pub fn contains_title(&self, title: &str) -> bool {
        self.entries.iter().any(|entry| entry.title == title)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[RecommendationResult] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(title: &str) -> RecommendationResult {
        RecommendationResult {
            title: title.to_string(),
            overview: String::new(),
            poster_url: None,
            genres: "Drama".to_string(),
            vote_average: 7.5,
            score: 0.4,
        }
    }

    #[test]
    fn test_new_watchlist() {
        let watchlist = Watchlist::new();
        assert!(watchlist.is_empty());
    }

    #[test]
    fn test_add_ignores_duplicate_titles() {
        let mut watchlist = Watchlist::new();
        assert!(watchlist.add(movie("Heat")));
        assert!(!watchlist.add(movie("Heat")));
        assert!(watchlist.add(movie("Ronin")));
        assert_eq!(watchlist.len(), 2);
        assert_eq!(watchlist.entries()[0].title, "Heat");
        assert_eq!(watchlist.entries()[1].title, "Ronin");
    }

    #[test]
    fn test_clear() {
        let mut watchlist = Watchlist::new();
        watchlist.add(movie("Heat"));
        watchlist.clear();
        assert!(watchlist.is_empty());
        assert!(!watchlist.contains_title("Heat"));
    }
}
