pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;
pub mod utils;

use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Coffee Catalog API",
        version = "1.0.0",
        description = "API for the coffee catalog service"
    ),
    paths(
        handlers::coffee::create_coffee,
        handlers::coffee::list_coffees,
        handlers::coffee::get_coffee,
        handlers::coffee::update_coffee,
        handlers::coffee::delete_coffee,
        handlers::uploads::serve_upload,
    ),
    tags(
        (name = "Coffees", description = "Coffee catalog CRUD operations"),
        (name = "Uploads", description = "Static serving of uploaded images"),
    ),
)]
struct ApiDoc;

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let cors = routes::cors_layer(&state.config.server.cors);
    let api = ApiDoc::openapi();

    routes::routes()
        .with_state(state)
        .layer(cors)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
        .merge(Scalar::with_url("/scalar", api))
}
