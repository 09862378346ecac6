mod error;
mod handlers;
pub mod wire;

pub use error::ApiError;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::db::Database;

pub fn create_router(db: Database) -> Router {
    let cors = cors_layer(db.config().cors_origins.as_deref());

    Router::new()
        // Dashboard
        .route("/", get(handlers::get_state))
        .route("/state", get(handlers::get_state))
        .route("/reset_day", post(handlers::reset_day))
        // Trees
        .route("/trees", get(handlers::list_trees))
        .route("/trees/{index}", get(handlers::get_tree))
        .route("/edit", post(handlers::edit_tree))
        .route("/edit_tree", post(handlers::edit_tree))
        .route("/water_tree", post(handlers::water_tree))
        .route("/plant_tree", post(handlers::plant_tree))
        // Habits
        .route("/habits", get(handlers::list_habits))
        .route("/add_habit", post(handlers::add_habit))
        .route(
            "/edit_habit",
            post(handlers::edit_habit).put(handlers::edit_habit),
        )
        .route(
            "/delete_habit",
            post(handlers::delete_habit).delete(handlers::delete_habit),
        )
        .route("/complete_habit", post(handlers::complete_habit))
        // Health
        .route("/health", get(handlers::health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(db)
}

/// Permissive CORS unless specific origins are configured.
fn cors_layer(origins: Option<&[String]>) -> CorsLayer {
    let Some(origins) = origins else {
        return CorsLayer::permissive();
    };

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}
