use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handler::{self, AppState};

/// Build the axum router with all basho endpoints.
pub fn build_router(state: AppState, cors: bool) -> Router {
    let router = Router::new()
        .route("/health", get(handler::health))
        .route("/prefectures", get(handler::list_prefectures))
        .route("/prefectures/:code/cities", get(handler::list_cities))
        .route("/postal_codes/lookup", get(handler::lookup_postal_code))
        .with_state(state)
        .layer(TraceLayer::new_for_http());
    if cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
