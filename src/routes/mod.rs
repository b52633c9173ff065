pub mod auth;
pub mod dashboard;
pub mod logs;
pub mod vehicles;

use axum::routing::{get, post};
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Auth
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route(
            "/api/v1/auth/me",
            get(auth::me)
                .put(auth::update_me)
                .delete(auth::deactivate_me),
        )
        // Vehicles
        .route(
            "/api/v1/vehicles",
            get(vehicles::list).post(vehicles::create),
        )
        .route("/api/v1/vehicles/bulk-delete", post(vehicles::bulk_delete))
        .route(
            "/api/v1/vehicles/{id}",
            get(vehicles::get)
                .put(vehicles::update)
                .delete(vehicles::delete),
        )
        // Audit trail
        .route("/api/v1/logs", get(logs::list))
        .route("/api/v1/logs/user/{id}", get(logs::by_user))
        .route("/api/v1/logs/entity/{type}/{id}", get(logs::by_entity))
        // Dashboard
        .route("/api/v1/dashboard", get(dashboard::index))
}
