//! Failure outcome of a store operation.

/// Reason an operation was rejected.
///
/// Transport, HTTP status, and decoding failures all collapse into one of
/// these; the underlying cause is only logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// A movie list or movie record could not be fetched.
    #[error("Failed to fetch movies")]
    Movies,
    /// A genre list, genre-filtered list, or search could not be fetched.
    #[error("Failed to fetch genres")]
    Genres,
}
