use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::PROCEDURE_PATH;
use crate::state::SharedState;

pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/health", get(crate::routes::health::health))
        // Profile procedure
        .route(
            PROCEDURE_PATH,
            get(crate::routes::profile::get_profile_query)
                .post(crate::routes::profile::get_profile_mutation),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
