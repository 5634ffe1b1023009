//! `MovieApi` trait definition.
#![allow(clippy::future_not_send)]

use anyhow::Result;

use super::types::{GenreListResponse, Movie, MovieListResponse};

/// Movie service operations consumed by the state store.
///
/// Abstracts API operations for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(MovieApi: Send)]
pub trait LocalMovieApi {
    /// Lists movies for one page of the discover feed.
    ///
    /// # Errors
    ///
    /// Returns an error if `page` is zero, or if the HTTP request or JSON
    /// parsing fails.
    async fn list_movies(&self, page: u32) -> Result<MovieListResponse>;

    /// Fetches the full record of one movie.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn movie_details(&self, movie_id: u64) -> Result<Movie>;

    /// Lists all movie genres.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn list_genres(&self) -> Result<GenreListResponse>;

    /// Lists movies tagged with the given genre ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn movies_by_genre(&self, genre_id: &str) -> Result<MovieListResponse>;

    /// Searches movies by title.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn search_movies(&self, query: &str) -> Result<MovieListResponse>;
}
