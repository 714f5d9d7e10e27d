pub mod classifier;
pub mod domain;
pub mod orchestrator;
pub mod pipeline;
pub mod ports;
pub mod prompt;

pub use classifier::SubjectClassifier;
pub use domain::{
    LearningMaterial, MaterialDraft, Message, MessageExchange, NewMessage, ProfileDraft, Subject,
    SubjectSummary, UserProfile,
};
pub use orchestrator::{
    FallbackReason, GenerationOutcome, ResponseOrchestrator, DEFAULT_DEADLINE, PROVIDER_FALLBACK,
    TIMEOUT_FALLBACK,
};
pub use pipeline::{MessagePipeline, PipelineError};
pub use ports::{
    GenerationContext, GenerationService, MaterialStore, MessageStore, ProfileStore,
    ProviderError, StoreError, StoreResult,
};
pub use prompt::PromptBuilder;
