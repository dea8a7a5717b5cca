// Export route modules
pub mod chat;

use crate::state::AppState;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

// Function to configure all routes
pub fn configure(state: AppState) -> Router {
    // Any origin may call the relay
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(chat::routes(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
