//! `ViewState` and per-operation in-flight tracking.

use std::collections::BTreeMap;

use cinedex_api::tmdb::{Genre, Movie};
use serde::Serialize;

use crate::action::Operation;

/// Movie-related view state rendered by the UI.
///
/// Every data field is replaced wholesale by the success of its operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    /// Last fetched page of the full movie list.
    pub movies: Vec<Movie>,
    /// Last fetched genre list.
    pub genres: Vec<Genre>,
    /// Last genre-filtered movie list.
    pub movies_by_genre: Vec<Movie>,
    /// Last fetched movie record, if any.
    pub movie_details: Option<Movie>,
    /// Last search result list.
    pub search_movie: Vec<Movie>,
    /// Shared loading flag.
    ///
    /// Raised when a non-search operation enters pending and cleared by the
    /// success of any operation. Rejections leave it as is.
    pub loading: bool,
    /// Per-operation in-flight counts.
    #[serde(skip)]
    pub in_flight: InFlight,
}

impl ViewState {
    /// Whether at least one call of `operation` is awaiting a response.
    #[must_use]
    pub fn is_pending(&self, operation: Operation) -> bool {
        self.in_flight.count(operation) > 0
    }

    /// Whether any operation is awaiting a response.
    #[must_use]
    pub fn any_pending(&self) -> bool {
        self.in_flight.total() > 0
    }
}

/// Outstanding calls per operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InFlight {
    counts: BTreeMap<Operation, u32>,
}

impl InFlight {
    /// Number of outstanding calls of `operation`.
    #[must_use]
    pub fn count(&self, operation: Operation) -> u32 {
        self.counts.get(&operation).copied().unwrap_or(0)
    }

    /// Number of outstanding calls across all operations.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.counts
            .values()
            .fold(0u32, |acc, n| acc.saturating_add(*n))
    }

    pub(crate) fn begin(&mut self, operation: Operation) {
        let count = self.counts.entry(operation).or_insert(0);
        *count = count.saturating_add(1);
    }

    pub(crate) fn finish(&mut self, operation: Operation) {
        if let Some(count) = self.counts.get_mut(&operation) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.counts.remove(&operation);
            }
        }
    }
}
