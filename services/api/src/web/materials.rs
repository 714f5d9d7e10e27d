//! services/api/src/web/materials.rs
//!
//! Handlers for learning materials.

use crate::web::rest::{required, store_failure, subject_filter, ErrorBody, HandlerError};
use crate::web::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use brainbytes_core::domain::{LearningMaterial, MaterialDraft, Subject};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Deserialize, ToSchema, Debug)]
pub struct MaterialRequest {
    /// Unrecognised subjects are filed under General.
    subject: Option<String>,
    topic: Option<String>,
    content: Option<String>,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct MaterialResponse {
    id: Uuid,
    subject: String,
    topic: String,
    content: String,
}

impl From<LearningMaterial> for MaterialResponse {
    fn from(material: LearningMaterial) -> Self {
        Self {
            id: material.id,
            subject: material.subject.to_string(),
            topic: material.topic,
            content: material.content,
        }
    }
}

#[derive(Deserialize, IntoParams, Debug)]
#[into_params(parameter_in = Query)]
pub struct MaterialQuery {
    /// Restrict results to one subject.
    subject: Option<String>,
}

/// Add a learning material.
#[utoipa::path(
    post,
    path = "/api/materials",
    request_body = MaterialRequest,
    responses(
        (status = 201, description = "Material stored", body = MaterialResponse),
        (status = 400, description = "Missing field", body = ErrorBody)
    )
)]
pub async fn create_material_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<MaterialRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let draft = MaterialDraft {
        subject: Subject::normalize(required(req.subject.as_deref(), "subject")?),
        topic: required(req.topic.as_deref(), "topic")?.to_string(),
        content: required(req.content.as_deref(), "content")?.to_string(),
    };

    let material = app_state
        .materials
        .create_material(draft)
        .await
        .map_err(|e| store_failure("Failed to store material", e))?;
    Ok((StatusCode::CREATED, Json(MaterialResponse::from(material))))
}

/// List learning materials, optionally for one subject.
#[utoipa::path(
    get,
    path = "/api/materials",
    params(MaterialQuery),
    responses(
        (status = 200, description = "Materials", body = [MaterialResponse]),
        (status = 400, description = "Unknown subject", body = ErrorBody)
    )
)]
pub async fn list_materials_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<MaterialQuery>,
) -> Result<Json<Vec<MaterialResponse>>, HandlerError> {
    let subject = subject_filter(query.subject.as_deref())?;
    let materials = app_state
        .materials
        .list_materials(subject)
        .await
        .map_err(|e| store_failure("Failed to list materials", e))?;
    Ok(Json(materials.into_iter().map(MaterialResponse::from).collect()))
}
