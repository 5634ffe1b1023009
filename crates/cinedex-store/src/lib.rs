//! View state container for cinedex.
//!
//! Holds fetched movie and genre data for a UI to render. Each of the five
//! operations moves through pending, fulfilled, or rejected, and the
//! reducer maps those lifecycle actions onto `ViewState`.

mod action;
mod error;
mod reducer;
mod state;
mod store;

pub use action::{Action, Operation, Payload};
pub use error::FetchError;
pub use reducer::reduce;
pub use state::{InFlight, ViewState};
#[allow(clippy::module_name_repetitions)]
pub use store::MovieStore;

pub use cinedex_api::tmdb::{Genre, Movie};
