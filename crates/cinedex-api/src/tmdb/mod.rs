//! TMDB API client module.
//!
//! Handles HTTP requests to the TMDB API v3 endpoints used by the
//! movie browser: discover, movie details, genre list, and search.

mod api;
mod client;
mod throttle;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{LocalMovieApi, MovieApi};
#[allow(clippy::module_name_repetitions)]
pub use client::{TmdbClient, TmdbClientBuilder};
pub use types::{Genre, GenreListResponse, Movie, MovieListResponse};
