use std::time::Duration;

use axum::http::HeaderValue;
use axum::{Router, routing::get};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::CorsConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(coffee_routes())
        .route("/uploads/{filename}", get(handlers::uploads::serve_upload))
}

fn coffee_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/coffees/",
            get(handlers::coffee::list_coffees).post(handlers::coffee::create_coffee),
        )
        .route(
            "/coffees/{id}",
            get(handlers::coffee::get_coffee)
                .put(handlers::coffee::update_coffee)
                .delete(handlers::coffee::delete_coffee),
        )
        .layer(handlers::coffee::upload_body_limit())
}

/// CORS layer built from configuration.
pub fn cors_layer(cfg: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cfg
        .allow_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(cfg.max_age))
}
