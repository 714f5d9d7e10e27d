//! services/api/src/web/rest.rs
//!
//! Shared pieces of the REST API: the OpenAPI master definition, the error
//! body returned by every handler, and the welcome route.

use crate::web::{materials, messages, profiles, subjects};
use axum::{http::StatusCode, response::Json};
use brainbytes_core::ports::StoreError;
use brainbytes_core::Subject;
use serde::Serialize;
use tracing::error;
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        welcome_handler,
        messages::list_messages_handler,
        messages::create_message_handler,
        messages::delete_subject_messages_handler,
        messages::message_summary_handler,
        subjects::list_subjects_handler,
        subjects::detect_subject_handler,
        profiles::create_profile_handler,
        profiles::list_profiles_handler,
        profiles::get_profile_handler,
        profiles::update_profile_handler,
        profiles::delete_profile_handler,
        materials::create_material_handler,
        materials::list_materials_handler,
    ),
    components(
        schemas(
            ErrorBody,
            WelcomeResponse,
            messages::MessageResponse,
            messages::CreateMessageRequest,
            messages::CreateMessageResponse,
            messages::DeleteMessagesResponse,
            messages::SubjectSummaryResponse,
            subjects::DetectSubjectResponse,
            profiles::ProfileRequest,
            profiles::ProfileResponse,
            materials::MaterialRequest,
            materials::MaterialResponse,
        )
    ),
    tags(
        (name = "BrainBytes API", description = "Subject-aware tutoring chat, profiles and learning materials.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Error Responses
//=========================================================================================

/// The JSON body of every error response.
#[derive(Serialize, ToSchema, Debug)]
pub struct ErrorBody {
    pub error: String,
}

pub type HandlerError = (StatusCode, Json<ErrorBody>);

pub fn bad_request(message: impl Into<String>) -> HandlerError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

/// Maps a store failure onto an HTTP status. Unexpected failures are logged
/// and reported with `context` only.
pub fn store_failure(context: &str, e: StoreError) -> HandlerError {
    let (status, message) = match e {
        StoreError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        StoreError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        StoreError::Unexpected(detail) => {
            error!("{}: {}", context, detail);
            (StatusCode::INTERNAL_SERVER_ERROR, context.to_string())
        }
    };
    (status, Json(ErrorBody { error: message }))
}

/// Parses an optional subject filter; unknown names are rejected.
pub fn subject_filter(raw: Option<&str>) -> Result<Option<Subject>, HandlerError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(name) => Subject::parse(name)
            .map(Some)
            .ok_or_else(|| bad_request(format!("Unknown subject '{}'", name))),
    }
}

/// Returns the trimmed value, or a 400 naming `field` when it is absent or blank.
pub fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, HandlerError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| bad_request(format!("{} is required", field)))
}

//=========================================================================================
// Welcome Route
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct WelcomeResponse {
    message: String,
}

/// Service banner.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service banner", body = WelcomeResponse))
)]
pub async fn welcome_handler() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to the BrainBytes API".to_string(),
    })
}
