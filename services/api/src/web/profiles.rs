//! services/api/src/web/profiles.rs
//!
//! CRUD handlers for student profiles.

use crate::web::rest::{required, store_failure, ErrorBody, HandlerError};
use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use brainbytes_core::domain::{ProfileDraft, Subject, UserProfile};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// Request/Response Types
//=========================================================================================

/// Profile fields. `name` and `email` are required on create; on update,
/// omitted fields keep their stored value.
#[derive(Deserialize, ToSchema, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    name: Option<String>,
    email: Option<String>,
    preferred_subjects: Option<Vec<String>>,
}

#[derive(Serialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    id: Uuid,
    name: String,
    email: String,
    preferred_subjects: Vec<String>,
}

impl From<UserProfile> for ProfileResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            name: profile.name,
            email: profile.email,
            preferred_subjects: profile
                .preferred_subjects
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

fn normalize_subjects(names: &[String]) -> Vec<Subject> {
    names.iter().map(|n| Subject::normalize(n)).collect()
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Create a profile.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = ProfileRequest,
    responses(
        (status = 201, description = "Profile created", body = ProfileResponse),
        (status = 400, description = "Missing name or email", body = ErrorBody),
        (status = 409, description = "Email already in use", body = ErrorBody)
    )
)]
pub async fn create_profile_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<ProfileRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let draft = ProfileDraft {
        name: required(req.name.as_deref(), "name")?.to_string(),
        email: required(req.email.as_deref(), "email")?.to_string(),
        preferred_subjects: normalize_subjects(req.preferred_subjects.as_deref().unwrap_or_default()),
    };

    let profile = app_state
        .profiles
        .create_profile(draft)
        .await
        .map_err(|e| store_failure("Failed to create profile", e))?;
    Ok((StatusCode::CREATED, Json(ProfileResponse::from(profile))))
}

/// List every profile.
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All profiles", body = [ProfileResponse]),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn list_profiles_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<ProfileResponse>>, HandlerError> {
    let profiles = app_state
        .profiles
        .list_profiles()
        .await
        .map_err(|e| store_failure("Failed to list profiles", e))?;
    Ok(Json(profiles.into_iter().map(ProfileResponse::from).collect()))
}

/// Fetch one profile.
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "Profile id")),
    responses(
        (status = 200, description = "The profile", body = ProfileResponse),
        (status = 404, description = "No such profile", body = ErrorBody)
    )
)]
pub async fn get_profile_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProfileResponse>, HandlerError> {
    let profile = app_state
        .profiles
        .get_profile(id)
        .await
        .map_err(|e| store_failure("Failed to load profile", e))?;
    Ok(Json(profile.into()))
}

/// Update a profile; omitted fields are left unchanged.
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "Profile id")),
    request_body = ProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Blank name or email", body = ErrorBody),
        (status = 404, description = "No such profile", body = ErrorBody),
        (status = 409, description = "Email already in use", body = ErrorBody)
    )
)]
pub async fn update_profile_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<ProfileRequest>,
) -> Result<Json<ProfileResponse>, HandlerError> {
    let current = app_state
        .profiles
        .get_profile(id)
        .await
        .map_err(|e| store_failure("Failed to load profile", e))?;

    let draft = ProfileDraft {
        name: match req.name.as_deref() {
            Some(name) => required(Some(name), "name")?.to_string(),
            None => current.name,
        },
        email: match req.email.as_deref() {
            Some(email) => required(Some(email), "email")?.to_string(),
            None => current.email,
        },
        preferred_subjects: match req.preferred_subjects.as_deref() {
            Some(names) => normalize_subjects(names),
            None => current.preferred_subjects,
        },
    };

    let profile = app_state
        .profiles
        .update_profile(id, draft)
        .await
        .map_err(|e| store_failure("Failed to update profile", e))?;
    Ok(Json(profile.into()))
}

/// Delete a profile.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "Profile id")),
    responses(
        (status = 204, description = "Profile deleted"),
        (status = 404, description = "No such profile", body = ErrorBody)
    )
)]
pub async fn delete_profile_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HandlerError> {
    app_state
        .profiles
        .delete_profile(id)
        .await
        .map_err(|e| store_failure("Failed to delete profile", e))?;
    Ok(StatusCode::NO_CONTENT)
}
