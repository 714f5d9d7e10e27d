//! services/api/src/adapters/tutor_llm.rs
//!
//! This module contains the adapter for the tutoring LLM.
//! It implements the `GenerationService` port from the `core` crate against any
//! OpenAI-compatible chat-completions endpoint.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use brainbytes_core::ports::{GenerationContext, GenerationService, ProviderError};
use tracing::{debug, warn};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `GenerationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiTutorAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiTutorAdapter {
    /// Creates a new `OpenAiTutorAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    /// Builds a client for `api_base` authenticated with `api_key`.
    pub fn from_credentials(api_key: &str, api_base: &str, model: String) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base);
        Self::new(Client::with_config(config), model)
    }
}

//=========================================================================================
// `GenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl GenerationService for OpenAiTutorAdapter {
    /// Sends the prompt as a single user turn and returns the first choice's text.
    async fn generate(&self, prompt: &str, ctx: GenerationContext) -> Result<String, ProviderError> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| ProviderError::Request(e.to_string()))?
            .into()];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        if ctx.remaining().is_zero() {
            warn!(model = %self.model, "Tutor deadline passed before the request was sent.");
            return Err(ProviderError::DeadlineExceeded);
        }
        debug!(model = %self.model, remaining = ?ctx.remaining(), "Sending tutor prompt.");

        let chat = self.client.chat();
        let call = chat.create(request);

        // Leaving the select drops `call`, which aborts the HTTP request. The
        // token covers callers that cancel without dropping this future.
        let response = tokio::select! {
            biased;
            _ = ctx.cancellation.cancelled() => {
                warn!(model = %self.model, "Tutor request cancelled before completion.");
                return Err(ProviderError::Cancelled);
            }
            _ = tokio::time::sleep_until(ctx.deadline) => {
                warn!(model = %self.model, "Tutor request hit its deadline.");
                return Err(ProviderError::DeadlineExceeded);
            }
            result = call => result.map_err(|e: OpenAIError| ProviderError::Request(e.to_string()))?,
        };

        // Blank content is still an answer; only a missing one is an error.
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ProviderError::EmptyResponse)
    }
}

//=========================================================================================
// Fallback Generator for a Missing Credential
//=========================================================================================

/// Stands in for the LLM when no credential is configured; every call fails
/// immediately so requests take the provider-failure path.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnconfiguredGenerator;

#[async_trait]
impl GenerationService for UnconfiguredGenerator {
    async fn generate(&self, _prompt: &str, _ctx: GenerationContext) -> Result<String, ProviderError> {
        Err(ProviderError::Unconfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::Instant;
    use tokio_util::sync::CancellationToken;

    fn context() -> GenerationContext {
        GenerationContext::new(Instant::now() + Duration::from_secs(15), CancellationToken::new())
    }

    #[tokio::test]
    async fn unconfigured_generator_fails_fast() {
        let result = UnconfiguredGenerator.generate("hello", context()).await;
        assert_eq!(result, Err(ProviderError::Unconfigured));
    }

    #[tokio::test]
    async fn cancelled_context_short_circuits_the_request() {
        // Unroutable base URL: the call can only finish through cancellation.
        let adapter = OpenAiTutorAdapter::from_credentials(
            "test-key",
            "http://10.255.255.1:9/v1",
            "test-model".to_string(),
        );
        let ctx = context();
        ctx.cancellation.cancel();

        let result = adapter.generate("hello", ctx).await;
        assert_eq!(result, Err(ProviderError::Cancelled));
    }

    #[tokio::test]
    async fn expired_deadline_is_reported_without_sending() {
        let adapter = OpenAiTutorAdapter::from_credentials(
            "test-key",
            "http://10.255.255.1:9/v1",
            "test-model".to_string(),
        );
        let ctx = GenerationContext::new(Instant::now(), CancellationToken::new());

        let result = adapter.generate("hello", ctx).await;
        assert_eq!(result, Err(ProviderError::DeadlineExceeded));
    }

    #[tokio::test]
    async fn in_flight_request_stops_at_the_deadline() {
        // Accepts the connection and never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            std::future::pending::<()>().await;
        });

        let adapter = OpenAiTutorAdapter::from_credentials(
            "test-key",
            &format!("http://{}/v1", addr),
            "test-model".to_string(),
        );
        let started = Instant::now();
        let ctx = GenerationContext::new(
            started + Duration::from_millis(200),
            CancellationToken::new(),
        );

        let result = adapter.generate("hello", ctx).await;
        assert_eq!(result, Err(ProviderError::DeadlineExceeded));
        assert!(started.elapsed() < Duration::from_secs(5));
        server.abort();
    }

    /// Serves one chat completion whose content is `content`, then holds the connection.
    async fn serve_completion(content: &str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let body = serde_json::json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 0,
            "model": "test-model",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }]
        })
        .to_string();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 16 * 1024];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            std::future::pending::<()>().await;
        });
        format!("http://{}/v1", addr)
    }

    #[tokio::test]
    async fn blank_content_is_returned_not_rejected() {
        let base = serve_completion("  \n ").await;
        let adapter = OpenAiTutorAdapter::from_credentials("test-key", &base, "test-model".to_string());

        let result = adapter.generate("hello", context()).await;
        assert_eq!(result, Ok("  \n ".to_string()));
    }
}
