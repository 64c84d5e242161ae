//! Route definitions for spot pins, including the CSV surface.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{csv, spots};
use crate::state::AppState;

/// Spot routes mounted at `/spots`.
///
/// ```text
/// GET    /               -> list_spots
/// POST   /               -> create_spot
/// GET    /categories     -> list_categories
/// GET    /export.csv     -> export_csv
/// POST   /import.csv     -> import_csv
/// GET    /{id}           -> get_spot
/// PUT    /{id}           -> update_spot
/// DELETE /{id}           -> delete_spot
/// GET    /{id}/content   -> get_spot_content
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(spots::list_spots).post(spots::create_spot))
        .route("/categories", get(spots::list_categories))
        .route("/export.csv", get(csv::export_csv))
        .route("/import.csv", post(csv::import_csv))
        .route(
            "/{id}",
            get(spots::get_spot)
                .put(spots::update_spot)
                .delete(spots::delete_spot),
        )
        .route("/{id}/content", get(spots::get_spot_content))
}
