//! crates/brainbytes_core/src/pipeline.rs
//!
//! The message-ingestion pipeline: resolve the subject, persist the question,
//! generate an answer and persist it alongside.

use crate::classifier::SubjectClassifier;
use crate::domain::{MessageExchange, NewMessage};
use crate::orchestrator::{ResponseOrchestrator, DEFAULT_DEADLINE};
use crate::ports::{MessageStore, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Failures the pipeline reports to its caller. Generation problems are
/// never among them.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Failed to persist message: {0}")]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct MessagePipeline {
    store: Arc<dyn MessageStore>,
    orchestrator: ResponseOrchestrator,
    deadline: Duration,
}

impl MessagePipeline {
    pub fn new(store: Arc<dyn MessageStore>, orchestrator: ResponseOrchestrator) -> Self {
        Self {
            store,
            orchestrator,
            deadline: DEFAULT_DEADLINE,
        }
    }

    /// Overrides the generation deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Handles one incoming question.
    ///
    /// The question is stored before generation starts, so a failed save means
    /// the generator is never called.
    pub async fn handle(
        &self,
        text: &str,
        explicit_subject: Option<&str>,
    ) -> Result<MessageExchange, PipelineError> {
        let subject = SubjectClassifier::resolve(text, explicit_subject);

        let user_message = self
            .store
            .save_message(NewMessage::from_user(text, subject))
            .await
            .inspect_err(|e| error!(%subject, error = %e, "Failed to save user message."))?;
        info!(id = %user_message.id, %subject, "Saved user message.");

        let answer = self.orchestrator.respond(text, subject, self.deadline).await;

        let ai_message = self
            .store
            .save_message(NewMessage::from_tutor(answer, subject))
            .await
            .inspect_err(|e| error!(%subject, error = %e, "Failed to save tutor message."))?;
        info!(id = %ai_message.id, %subject, "Saved tutor message.");

        Ok(MessageExchange {
            user_message,
            ai_message,
        })
    }
}
