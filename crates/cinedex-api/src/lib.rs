//! API client library for cinedex.
//!
//! Provides the movie database client used by the state store.

/// TMDB API client.
pub mod tmdb;
