//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use brainbytes_core::pipeline::MessagePipeline;
use brainbytes_core::ports::{GenerationService, MaterialStore, MessageStore, ProfileStore};
use brainbytes_core::ResponseOrchestrator;
use std::sync::Arc;
use std::time::Duration;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub messages: Arc<dyn MessageStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub materials: Arc<dyn MaterialStore>,
    pub pipeline: MessagePipeline,
}

impl AppState {
    /// Wires every port to `store` and builds the message pipeline around `generator`.
    pub fn new<S>(store: Arc<S>, generator: Arc<dyn GenerationService>, deadline: Duration) -> Self
    where
        S: MessageStore + ProfileStore + MaterialStore + 'static,
    {
        let messages: Arc<dyn MessageStore> = store.clone();
        let pipeline = MessagePipeline::new(messages.clone(), ResponseOrchestrator::new(generator))
            .with_deadline(deadline);
        Self {
            messages,
            profiles: store.clone(),
            materials: store,
            pipeline,
        }
    }
}
