//! services/api/src/web/subjects.rs
//!
//! Subject listing and detection. Detection goes through the same classifier
//! the message pipeline uses, so the UI's default subject never drifts from
//! what the server would pick.

use axum::{extract::Query, response::Json};
use brainbytes_core::{Subject, SubjectClassifier};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams, Debug)]
#[into_params(parameter_in = Query)]
pub struct DetectSubjectQuery {
    /// Free text to classify. Missing text classifies as General.
    text: Option<String>,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct DetectSubjectResponse {
    subject: String,
}

/// The six subjects, in classification priority order.
#[utoipa::path(
    get,
    path = "/api/subjects",
    responses((status = 200, description = "All subjects", body = [String]))
)]
pub async fn list_subjects_handler() -> Json<Vec<&'static str>> {
    Json(Subject::ALL.iter().map(|s| s.as_str()).collect())
}

/// Detect the subject a question would be filed under.
#[utoipa::path(
    get,
    path = "/api/subjects/detect",
    params(DetectSubjectQuery),
    responses((status = 200, description = "Detected subject", body = DetectSubjectResponse))
)]
pub async fn detect_subject_handler(
    Query(query): Query<DetectSubjectQuery>,
) -> Json<DetectSubjectResponse> {
    let subject = SubjectClassifier::classify(query.text.as_deref().unwrap_or_default());
    Json(DetectSubjectResponse {
        subject: subject.to_string(),
    })
}
