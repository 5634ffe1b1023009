//! `MovieStore` - runs operations against the API and applies their outcomes.
#![allow(clippy::future_not_send)]

use std::future::Future;

use anyhow::Result;
use cinedex_api::tmdb::{Genre, LocalMovieApi, Movie};
use tokio::sync::watch;
use tracing::instrument;

use crate::action::{Action, Operation, Payload};
use crate::error::FetchError;
use crate::reducer::reduce;
use crate::state::ViewState;

/// Owner of the `ViewState`.
///
/// Operations can run concurrently on one store (e.g. under `tokio::join!`).
/// Each lifecycle action is applied in a single `send_modify`, so readers
/// never observe a half-applied transition. Within one operation, the
/// success that resolves last wins.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct MovieStore<A> {
    /// Movie service used by all operations.
    api: A,
    /// Current state; subscribers are notified on every action.
    state: watch::Sender<ViewState>,
}

impl<A: LocalMovieApi> MovieStore<A> {
    /// Creates a store with an empty `ViewState`.
    pub fn new(api: A) -> Self {
        let (state, _) = watch::channel(ViewState::default());
        Self { api, state }
    }

    /// Returns the movie service this store calls.
    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Returns a copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Returns a receiver that observes every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    /// Fetches one page of the movie list into `movies`.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Movies` if the request fails.
    #[instrument(skip(self))]
    pub async fn fetch_all_movies(&self, page: u32) -> Result<Vec<Movie>, FetchError> {
        let call = async { self.api.list_movies(page).await.map(|r| r.results) };
        self.run(Operation::FetchAllMovies, call, Payload::Movies).await
    }

    /// Fetches one movie into `movie_details`.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Movies` if the request fails.
    #[instrument(skip(self))]
    pub async fn fetch_movie_details(&self, movie_id: u64) -> Result<Movie, FetchError> {
        let call = self.api.movie_details(movie_id);
        self.run(Operation::FetchMovieDetails, call, Payload::MovieDetails).await
    }

    /// Fetches the genre list into `genres`.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Genres` if the request fails.
    #[instrument(skip(self))]
    pub async fn fetch_all_genres(&self) -> Result<Vec<Genre>, FetchError> {
        let call = async { self.api.list_genres().await.map(|r| r.genres) };
        self.run(Operation::FetchAllGenres, call, Payload::Genres).await
    }

    /// Fetches movies of one genre into `movies_by_genre`.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Genres` if the request fails.
    #[instrument(skip(self))]
    pub async fn fetch_movies_by_genre(&self, genre_id: &str) -> Result<Vec<Movie>, FetchError> {
        let call = async { self.api.movies_by_genre(genre_id).await.map(|r| r.results) };
        self.run(Operation::FetchMoviesByGenre, call, Payload::MoviesByGenre).await
    }

    /// Searches movies by title into `search_movie`.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Genres` if the request fails.
    #[instrument(skip(self))]
    pub async fn search_movies_by_name(&self, name: &str) -> Result<Vec<Movie>, FetchError> {
        let call = async { self.api.search_movies(name).await.map(|r| r.results) };
        self.run(Operation::SearchMoviesByName, call, Payload::SearchResults).await
    }

    /// Drives one operation through pending and then fulfilled or rejected.
    async fn run<T, F>(
        &self,
        operation: Operation,
        call: F,
        into_payload: fn(T) -> Payload,
    ) -> Result<T, FetchError>
    where
        T: Clone,
        F: Future<Output = Result<T>>,
    {
        self.dispatch(Action::Pending(operation));
        let guard = InFlightGuard::new(&self.state, operation);
        let outcome = call.await;
        guard.disarm();
        match outcome {
            Ok(value) => {
                self.dispatch(Action::Fulfilled(into_payload(value.clone())));
                Ok(value)
            }
            Err(cause) => {
                let error = reject(operation, &cause);
                self.dispatch(Action::Rejected { operation, error });
                Err(error)
            }
        }
    }

    fn dispatch(&self, action: Action) {
        tracing::debug!(action = %action.action_type(), "dispatch");
        self.state.send_modify(|state| reduce(state, action));
    }
}

/// Closes the in-flight count of an operation whose future is dropped
/// before the API call resolves.
///
/// `loading` and the data fields are left as they are.
struct InFlightGuard<'a> {
    state: &'a watch::Sender<ViewState>,
    operation: Option<Operation>,
}

impl<'a> InFlightGuard<'a> {
    const fn new(state: &'a watch::Sender<ViewState>, operation: Operation) -> Self {
        Self {
            state,
            operation: Some(operation),
        }
    }

    /// Hands the count over to the fulfilled or rejected action.
    fn disarm(mut self) {
        self.operation = None;
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if let Some(operation) = self.operation.take() {
            tracing::debug!(operation = operation.name(), "dropped before completion");
            self.state.send_modify(|state| state.in_flight.finish(operation));
        }
    }
}

/// Logs the cause of a failed operation and returns its fixed reason.
pub(crate) fn reject(operation: Operation, cause: &anyhow::Error) -> FetchError {
    let error = operation.failure();
    tracing::warn!(
        operation = operation.name(),
        cause = %format!("{cause:#}"),
        "{error}"
    );
    error
}
