pub mod materials;
pub mod messages;
pub mod middleware;
pub mod profiles;
pub mod rest;
pub mod state;
pub mod subjects;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get},
    Router,
};
use state::AppState;
use std::sync::Arc;

/// Builds every API route over `app_state`. CORS and the Swagger UI are
/// layered on by the binary.
pub fn build_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(rest::welcome_handler))
        .route(
            "/api/messages",
            get(messages::list_messages_handler).post(messages::create_message_handler),
        )
        .route("/api/messages/summary", get(messages::message_summary_handler))
        .route(
            "/api/messages/subject/{subject}",
            delete(messages::delete_subject_messages_handler),
        )
        .route("/api/subjects", get(subjects::list_subjects_handler))
        .route("/api/subjects/detect", get(subjects::detect_subject_handler))
        .route(
            "/api/users",
            get(profiles::list_profiles_handler).post(profiles::create_profile_handler),
        )
        .route(
            "/api/users/{id}",
            get(profiles::get_profile_handler)
                .put(profiles::update_profile_handler)
                .delete(profiles::delete_profile_handler),
        )
        .route(
            "/api/materials",
            get(materials::list_materials_handler).post(materials::create_material_handler),
        )
        .layer(axum_middleware::from_fn(middleware::log_requests))
        .with_state(app_state)
}
