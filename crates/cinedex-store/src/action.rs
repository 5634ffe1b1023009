//! Operations and the lifecycle actions they emit.

use cinedex_api::tmdb::{Genre, Movie};

use crate::error::FetchError;

/// Prefix shared by all action types of this store.
const ACTION_PREFIX: &str = "movies";

/// The five asynchronous operations of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operation {
    /// One page of the full movie list.
    FetchAllMovies,
    /// A single movie record.
    FetchMovieDetails,
    /// The genre list.
    FetchAllGenres,
    /// Movies filtered by one genre.
    FetchMoviesByGenre,
    /// Movies matching a title search.
    SearchMoviesByName,
}

impl Operation {
    /// All operations, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::FetchAllMovies,
        Self::FetchMovieDetails,
        Self::FetchAllGenres,
        Self::FetchMoviesByGenre,
        Self::SearchMoviesByName,
    ];

    /// Operation name as exposed to the UI layer.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FetchAllMovies => "fetchAllMovies",
            Self::FetchMovieDetails => "fetchMovieDetails",
            Self::FetchAllGenres => "fetchAllGenres",
            Self::FetchMoviesByGenre => "fetchMoviesByGenre",
            Self::SearchMoviesByName => "searchMoviesByName",
        }
    }

    /// Action type string for the given lifecycle phase,
    /// e.g. `movies/fetchAllMovies/pending`.
    #[must_use]
    pub fn action_type(self, phase: &str) -> String {
        format!("{ACTION_PREFIX}/{}/{phase}", self.name())
    }

    /// Whether entering pending raises the shared `loading` flag.
    ///
    /// Search never does; its success still clears the flag.
    #[must_use]
    pub const fn sets_loading(self) -> bool {
        !matches!(self, Self::SearchMoviesByName)
    }

    /// Rejection reason reported when this operation fails.
    #[must_use]
    pub const fn failure(self) -> FetchError {
        match self {
            Self::FetchAllMovies | Self::FetchMovieDetails => FetchError::Movies,
            Self::FetchAllGenres | Self::FetchMoviesByGenre | Self::SearchMoviesByName => {
                FetchError::Genres
            }
        }
    }
}

/// Successful result of an operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Result of `fetchAllMovies`.
    Movies(Vec<Movie>),
    /// Result of `fetchMovieDetails`.
    MovieDetails(Movie),
    /// Result of `fetchAllGenres`.
    Genres(Vec<Genre>),
    /// Result of `fetchMoviesByGenre`.
    MoviesByGenre(Vec<Movie>),
    /// Result of `searchMoviesByName`.
    SearchResults(Vec<Movie>),
}

impl Payload {
    /// Operation this payload completes.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::Movies(_) => Operation::FetchAllMovies,
            Self::MovieDetails(_) => Operation::FetchMovieDetails,
            Self::Genres(_) => Operation::FetchAllGenres,
            Self::MoviesByGenre(_) => Operation::FetchMoviesByGenre,
            Self::SearchResults(_) => Operation::SearchMoviesByName,
        }
    }
}

/// Lifecycle action applied by the reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The operation has been issued and is awaiting the network.
    Pending(Operation),
    /// The operation resolved successfully.
    Fulfilled(Payload),
    /// The operation failed.
    Rejected {
        /// Operation that failed.
        operation: Operation,
        /// Reason reported to the caller.
        error: FetchError,
    },
}

impl Action {
    /// Operation this action belongs to.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::Pending(operation) | Self::Rejected { operation, .. } => *operation,
            Self::Fulfilled(payload) => payload.operation(),
        }
    }

    /// Full action type string, e.g. `movies/fetchAllGenres/fulfilled`.
    #[must_use]
    pub fn action_type(&self) -> String {
        let phase = match self {
            Self::Pending(_) => "pending",
            Self::Fulfilled(_) => "fulfilled",
            Self::Rejected { .. } => "rejected",
        };
        self.operation().action_type(phase)
    }
}
