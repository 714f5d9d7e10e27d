//! crates/brainbytes_core/src/orchestrator.rs
//!
//! Races a single generation call against a deadline and flattens every
//! failure mode into a fixed apology, so callers always get text back.

use crate::domain::Subject;
use crate::ports::{GenerationContext, GenerationService, ProviderError};
use crate::prompt::PromptBuilder;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Default time allowed for one generation call.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(15);

/// Returned when the deadline elapses before the generator answers.
pub const TIMEOUT_FALLBACK: &str =
    "I'm sorry, but I couldn't process your request in time. Please try again later.";

/// Returned when the generator reports any failure.
pub const PROVIDER_FALLBACK: &str =
    "I'm sorry, I couldn't process your request at the moment. Please try again later.";

//=========================================================================================
// Outcome Types
//=========================================================================================

/// Why a fallback answer was used instead of generated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    Provider(ProviderError),
    Timeout,
}

impl FallbackReason {
    pub fn text(&self) -> &'static str {
        match self {
            FallbackReason::Provider(_) => PROVIDER_FALLBACK,
            FallbackReason::Timeout => TIMEOUT_FALLBACK,
        }
    }
}

/// The result of one generation attempt. Never surfaced as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Success(String),
    Fallback(FallbackReason),
}

impl GenerationOutcome {
    pub fn into_text(self) -> String {
        match self {
            GenerationOutcome::Success(text) => text,
            GenerationOutcome::Fallback(reason) => reason.text().to_string(),
        }
    }
}

//=========================================================================================
// The Orchestrator
//=========================================================================================

#[derive(Clone)]
pub struct ResponseOrchestrator {
    generator: Arc<dyn GenerationService>,
}

impl ResponseOrchestrator {
    pub fn new(generator: Arc<dyn GenerationService>) -> Self {
        Self { generator }
    }

    /// Answers `question`, always returning text within roughly `deadline`.
    pub async fn respond(&self, question: &str, subject: Subject, deadline: Duration) -> String {
        self.attempt(question, subject, deadline).await.into_text()
    }

    /// Runs one generation attempt and reports how it ended.
    pub async fn attempt(
        &self,
        question: &str,
        subject: Subject,
        deadline: Duration,
    ) -> GenerationOutcome {
        let prompt = PromptBuilder::build(question, subject);
        let started = Instant::now();
        let cancellation = CancellationToken::new();
        let ctx = GenerationContext::new(started + deadline, cancellation.clone());

        let raced = tokio::time::timeout(deadline, self.generator.generate(&prompt, ctx)).await;
        let elapsed = started.elapsed();

        match raced {
            Ok(Ok(text)) => {
                info!(%subject, ?elapsed, "Generated tutor answer.");
                GenerationOutcome::Success(text.trim().to_string())
            }
            // The adapter gave up at the same deadline the race enforces.
            Ok(Err(ProviderError::DeadlineExceeded)) => {
                cancellation.cancel();
                warn!(%subject, ?deadline, "Generation timed out; using fallback answer.");
                GenerationOutcome::Fallback(FallbackReason::Timeout)
            }
            Ok(Err(e)) => {
                warn!(%subject, ?elapsed, error = %e, "Generation failed; using fallback answer.");
                GenerationOutcome::Fallback(FallbackReason::Provider(e))
            }
            Err(_) => {
                // The generate future is already dropped; this reaches any work it handed off.
                cancellation.cancel();
                warn!(%subject, ?deadline, "Generation timed out; using fallback answer.");
                GenerationOutcome::Fallback(FallbackReason::Timeout)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Test double whose behaviour is fixed at construction.
    enum Script {
        Reply(&'static str),
        Fail(ProviderError),
        Hang,
        ReplyAfter(Duration, &'static str),
    }

    struct ScriptedGenerator {
        script: Script,
        seen: Mutex<Vec<(String, GenerationContext)>>,
    }

    impl ScriptedGenerator {
        fn new(script: Script) -> Arc<Self> {
            Arc::new(Self {
                script,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl GenerationService for ScriptedGenerator {
        async fn generate(
            &self,
            prompt: &str,
            ctx: GenerationContext,
        ) -> Result<String, ProviderError> {
            self.seen.lock().unwrap().push((prompt.to_string(), ctx));
            match &self.script {
                Script::Reply(text) => Ok(text.to_string()),
                Script::Fail(e) => Err(e.clone()),
                Script::Hang => std::future::pending().await,
                Script::ReplyAfter(delay, text) => {
                    tokio::time::sleep(*delay).await;
                    Ok(text.to_string())
                }
            }
        }
    }

    #[tokio::test]
    async fn success_is_trimmed() {
        let generator = ScriptedGenerator::new(Script::Reply("  42 \n"));
        let orchestrator = ResponseOrchestrator::new(generator.clone());

        let text = orchestrator
            .respond("what is 6 * 7", Subject::Math, DEFAULT_DEADLINE)
            .await;

        assert_eq!(text, "42");
    }

    #[tokio::test]
    async fn prompt_is_built_from_question_and_subject() {
        let generator = ScriptedGenerator::new(Script::Reply("ok"));
        let orchestrator = ResponseOrchestrator::new(generator.clone());

        orchestrator
            .respond("what is an atom", Subject::Science, DEFAULT_DEADLINE)
            .await;

        let seen = generator.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, PromptBuilder::build("what is an atom", Subject::Science));
    }

    #[tokio::test]
    async fn provider_failure_uses_provider_fallback() {
        let generator = ScriptedGenerator::new(Script::Fail(ProviderError::Request("503".into())));
        let orchestrator = ResponseOrchestrator::new(generator);

        let outcome = orchestrator
            .attempt("q", Subject::General, DEFAULT_DEADLINE)
            .await;

        assert_eq!(
            outcome,
            GenerationOutcome::Fallback(FallbackReason::Provider(ProviderError::Request(
                "503".into()
            )))
        );
        assert_eq!(outcome.into_text(), PROVIDER_FALLBACK);
    }

    #[tokio::test]
    async fn whitespace_only_answer_is_returned_trimmed() {
        let generator = ScriptedGenerator::new(Script::Reply("  \n "));
        let orchestrator = ResponseOrchestrator::new(generator);

        let outcome = orchestrator
            .attempt("q", Subject::General, DEFAULT_DEADLINE)
            .await;

        assert_eq!(outcome, GenerationOutcome::Success(String::new()));
        assert_eq!(outcome.into_text(), "");
    }

    #[tokio::test]
    async fn adapter_deadline_counts_as_a_timeout() {
        let generator = ScriptedGenerator::new(Script::Fail(ProviderError::DeadlineExceeded));
        let orchestrator = ResponseOrchestrator::new(generator.clone());

        let outcome = orchestrator
            .attempt("q", Subject::General, DEFAULT_DEADLINE)
            .await;

        assert_eq!(outcome, GenerationOutcome::Fallback(FallbackReason::Timeout));
        assert_eq!(outcome.into_text(), TIMEOUT_FALLBACK);
        assert!(generator.seen.lock().unwrap()[0].1.cancellation.is_cancelled());
    }

    #[tokio::test]
    async fn context_deadline_matches_the_race() {
        let generator = ScriptedGenerator::new(Script::Reply("ok"));
        let orchestrator = ResponseOrchestrator::new(generator.clone());
        let before = Instant::now();

        orchestrator
            .respond("q", Subject::General, Duration::from_secs(3))
            .await;

        let seen = generator.seen.lock().unwrap();
        let deadline = seen[0].1.deadline;
        assert!(deadline >= before + Duration::from_secs(3));
        assert!(deadline <= Instant::now() + Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_generator_times_out_at_the_deadline() {
        let generator = ScriptedGenerator::new(Script::Hang);
        let orchestrator = ResponseOrchestrator::new(generator.clone());
        let started = Instant::now();

        let outcome = orchestrator
            .attempt("q", Subject::History, DEFAULT_DEADLINE)
            .await;

        assert_eq!(outcome, GenerationOutcome::Fallback(FallbackReason::Timeout));
        assert_eq!(outcome.into_text(), TIMEOUT_FALLBACK);
        assert!(started.elapsed() >= DEFAULT_DEADLINE);
        assert!(started.elapsed() < DEFAULT_DEADLINE + Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_cancels_the_generation_context() {
        let generator = ScriptedGenerator::new(Script::Hang);
        let orchestrator = ResponseOrchestrator::new(generator.clone());

        orchestrator
            .respond("q", Subject::General, Duration::from_secs(2))
            .await;

        let seen = generator.seen.lock().unwrap();
        assert!(seen[0].1.cancellation.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn late_answer_is_discarded() {
        let generator =
            ScriptedGenerator::new(Script::ReplyAfter(Duration::from_secs(20), "too late"));
        let orchestrator = ResponseOrchestrator::new(generator);

        let text = orchestrator
            .respond("q", Subject::General, DEFAULT_DEADLINE)
            .await;

        assert_eq!(text, TIMEOUT_FALLBACK);
    }

    #[tokio::test(start_paused = true)]
    async fn answer_inside_the_deadline_wins() {
        let generator = ScriptedGenerator::new(Script::ReplyAfter(Duration::from_secs(14), "made it"));
        let orchestrator = ResponseOrchestrator::new(generator.clone());

        let text = orchestrator
            .respond("q", Subject::General, DEFAULT_DEADLINE)
            .await;

        assert_eq!(text, "made it");
        let seen = generator.seen.lock().unwrap();
        assert!(!seen[0].1.cancellation.is_cancelled());
    }

    #[test]
    fn the_two_fallback_literals_differ() {
        assert_ne!(TIMEOUT_FALLBACK, PROVIDER_FALLBACK);
    }
}
