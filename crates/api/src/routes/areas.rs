//! Route definitions for the area collection.

use axum::routing::get;
use axum::Router;

use crate::handlers::areas;
use crate::state::AppState;

/// Area routes mounted at `/areas`.
///
/// ```text
/// GET    /        -> list_areas
/// POST   /        -> create_area
/// GET    /{id}    -> get_area
/// PUT    /{id}    -> update_area
/// DELETE /{id}    -> delete_area
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(areas::list_areas).post(areas::create_area))
        .route(
            "/{id}",
            get(areas::get_area)
                .put(areas::update_area)
                .delete(areas::delete_area),
        )
}
