//! crates/brainbytes_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use crate::domain::{
    LearningMaterial, MaterialDraft, Message, NewMessage, ProfileDraft, Subject, UserProfile,
};
use async_trait::async_trait;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

//=========================================================================================
// Port Error and Result Types
//=========================================================================================

/// The error type for all persistence port operations.
/// This abstracts away the specific errors from the underlying store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflicting record: {0}")]
    Conflict(String),
    #[error("An unexpected store error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;

/// Every way a call to the generation capability can fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("No generation credential is configured")]
    Unconfigured,
    #[error("Generation request failed: {0}")]
    Request(String),
    #[error("Generation response contained no text")]
    EmptyResponse,
    #[error("Generation was cancelled")]
    Cancelled,
    #[error("Generation deadline exceeded")]
    DeadlineExceeded,
}

//=========================================================================================
// Generation Context
//=========================================================================================

/// Deadline and cancellation handle threaded into every generation call.
///
/// Adapters should stop work once `cancellation` fires and should not keep a
/// request open past `deadline`, reporting `ProviderError::DeadlineExceeded`.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    pub deadline: Instant,
    pub cancellation: CancellationToken,
}

impl GenerationContext {
    pub fn new(deadline: Instant, cancellation: CancellationToken) -> Self {
        Self {
            deadline,
            cancellation,
        }
    }

    /// Time left before the deadline, zero once it has passed.
    pub fn remaining(&self) -> std::time::Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Stores a message, assigning its id and creation timestamp.
    /// A message saved after another on the same store never has an earlier `created_at`.
    async fn save_message(&self, message: NewMessage) -> StoreResult<Message>;

    /// Lists messages ordered by `created_at` ascending, optionally restricted to one subject.
    async fn list_messages(&self, subject: Option<Subject>) -> StoreResult<Vec<Message>>;

    /// Deletes every message in `subject`, returning how many were removed.
    async fn delete_messages_by_subject(&self, subject: Subject) -> StoreResult<u64>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn create_profile(&self, draft: ProfileDraft) -> StoreResult<UserProfile>;

    async fn list_profiles(&self) -> StoreResult<Vec<UserProfile>>;

    async fn get_profile(&self, id: Uuid) -> StoreResult<UserProfile>;

    async fn update_profile(&self, id: Uuid, draft: ProfileDraft) -> StoreResult<UserProfile>;

    async fn delete_profile(&self, id: Uuid) -> StoreResult<()>;
}

#[async_trait]
pub trait MaterialStore: Send + Sync {
    async fn create_material(&self, draft: MaterialDraft) -> StoreResult<LearningMaterial>;

    async fn list_materials(&self, subject: Option<Subject>) -> StoreResult<Vec<LearningMaterial>>;
}

#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Produces the text answer for a fully built prompt.
    async fn generate(&self, prompt: &str, ctx: GenerationContext) -> Result<String, ProviderError>;
}
