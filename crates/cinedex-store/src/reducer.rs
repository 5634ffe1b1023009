//! Pure transition function for `ViewState`.

use crate::action::{Action, Payload};
use crate::state::ViewState;

/// Applies one lifecycle action to the state.
///
/// This is the only place `ViewState` changes. Fulfilled actions replace
/// their field wholesale and clear `loading`; rejected actions touch nothing
/// but the in-flight count.
pub fn reduce(state: &mut ViewState, action: Action) {
    match action {
        Action::Pending(operation) => {
            state.in_flight.begin(operation);
            if operation.sets_loading() {
                state.loading = true;
            }
        }
        Action::Fulfilled(payload) => {
            state.in_flight.finish(payload.operation());
            match payload {
                Payload::Movies(movies) => state.movies = movies,
                Payload::MovieDetails(movie) => state.movie_details = Some(movie),
                Payload::Genres(genres) => state.genres = genres,
                Payload::MoviesByGenre(movies) => state.movies_by_genre = movies,
                Payload::SearchResults(movies) => state.search_movie = movies,
            }
            state.loading = false;
        }
        Action::Rejected { operation, .. } => {
            state.in_flight.finish(operation);
        }
    }
}
