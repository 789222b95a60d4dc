//! Content-based movie recommendations over a locally stored TMDB dataset.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod storage;
