//! services/api/src/web/messages.rs
//!
//! Handlers for the chat message endpoints, including message intake.

use crate::web::rest::{
    bad_request, store_failure, subject_filter, ErrorBody, HandlerError,
};
use crate::web::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use brainbytes_core::domain::{Message, MessageExchange, Subject, SubjectSummary};
use brainbytes_core::PipelineError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// A stored chat message.
#[derive(Serialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    id: Uuid,
    text: String,
    is_user: bool,
    subject: String,
    created_at: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            text: message.text,
            is_user: message.is_user,
            subject: message.subject.to_string(),
            created_at: message.created_at,
        }
    }
}

/// A question submitted by a student.
#[derive(Deserialize, ToSchema, Debug)]
pub struct CreateMessageRequest {
    /// The question text. Required.
    text: Option<String>,
    /// One of the six subjects. When absent or blank the subject is detected from the text.
    subject: Option<String>,
}

#[derive(Serialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageResponse {
    user_message: MessageResponse,
    ai_message: MessageResponse,
}

impl From<MessageExchange> for CreateMessageResponse {
    fn from(exchange: MessageExchange) -> Self {
        Self {
            user_message: exchange.user_message.into(),
            ai_message: exchange.ai_message.into(),
        }
    }
}

#[derive(Serialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMessagesResponse {
    deleted_count: u64,
}

#[derive(Serialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SubjectSummaryResponse {
    subject: String,
    total: usize,
    user_messages: usize,
}

impl From<SubjectSummary> for SubjectSummaryResponse {
    fn from(summary: SubjectSummary) -> Self {
        Self {
            subject: summary.subject.to_string(),
            total: summary.total,
            user_messages: summary.user_messages,
        }
    }
}

#[derive(Deserialize, IntoParams, Debug)]
#[into_params(parameter_in = Query)]
pub struct SubjectQuery {
    /// Restrict results to one subject.
    subject: Option<String>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// List messages oldest first, optionally for a single subject.
#[utoipa::path(
    get,
    path = "/api/messages",
    params(SubjectQuery),
    responses(
        (status = 200, description = "Messages ordered by creation time", body = [MessageResponse]),
        (status = 400, description = "Unknown subject", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn list_messages_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<SubjectQuery>,
) -> Result<Json<Vec<MessageResponse>>, HandlerError> {
    let subject = subject_filter(query.subject.as_deref())?;
    let messages = app_state
        .messages
        .list_messages(subject)
        .await
        .map_err(|e| store_failure("Failed to list messages", e))?;
    Ok(Json(messages.into_iter().map(MessageResponse::from).collect()))
}

/// Submit a question and receive the stored question and tutor answer.
///
/// Generation failures and timeouts still return 201 with an apologetic answer;
/// only storage failures produce an error status.
#[utoipa::path(
    post,
    path = "/api/messages",
    request_body = CreateMessageRequest,
    responses(
        (status = 201, description = "Question and answer stored", body = CreateMessageResponse),
        (status = 400, description = "Missing text or malformed body", body = ErrorBody),
        (status = 500, description = "Messages could not be stored", body = ErrorBody)
    )
)]
pub async fn create_message_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<CreateMessageRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let Json(req) = payload.map_err(|rejection| bad_request(rejection.body_text()))?;
    // Validated on the trimmed value, stored as typed.
    let text = req
        .text
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| bad_request("text is required"))?;

    match app_state.pipeline.handle(text, req.subject.as_deref()).await {
        Ok(exchange) => Ok((
            StatusCode::CREATED,
            Json(CreateMessageResponse::from(exchange)),
        )),
        Err(PipelineError::Store(e)) => Err(store_failure("Failed to save message", e)),
    }
}

/// Delete every message in a subject.
#[utoipa::path(
    delete,
    path = "/api/messages/subject/{subject}",
    params(("subject" = String, Path, description = "One of the six subjects")),
    responses(
        (status = 200, description = "Messages deleted", body = DeleteMessagesResponse),
        (status = 400, description = "Unknown subject", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn delete_subject_messages_handler(
    State(app_state): State<Arc<AppState>>,
    Path(subject): Path<String>,
) -> Result<Json<DeleteMessagesResponse>, HandlerError> {
    let subject = Subject::parse(&subject)
        .ok_or_else(|| bad_request(format!("Unknown subject '{}'", subject)))?;
    let deleted_count = app_state
        .messages
        .delete_messages_by_subject(subject)
        .await
        .map_err(|e| store_failure("Failed to delete messages", e))?;
    Ok(Json(DeleteMessagesResponse { deleted_count }))
}

/// Per-subject message counts, in classification priority order.
#[utoipa::path(
    get,
    path = "/api/messages/summary",
    responses(
        (status = 200, description = "One entry per subject", body = [SubjectSummaryResponse]),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn message_summary_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<SubjectSummaryResponse>>, HandlerError> {
    let messages = app_state
        .messages
        .list_messages(None)
        .await
        .map_err(|e| store_failure("Failed to summarize messages", e))?;
    Ok(Json(
        SubjectSummary::tally(&messages)
            .into_iter()
            .map(SubjectSummaryResponse::from)
            .collect(),
    ))
}
