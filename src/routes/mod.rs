pub mod trips;

use axum::Router;

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/trips", trips::router())
        .with_state(state)
}
