//! Transport trait and normalized request types.
//!
//! The [`Transport`] trait abstracts over the inference endpoint, translating
//! a normalized [`InferenceRequest`] into the endpoint's HTTP API. The
//! production implementation is [`OllamaTransport`]; [`MockTransport`] serves
//! deterministic tests.
//!
//! ```text
//! RequestHandler ──► InferenceClient ──► Transport::complete() ──► Completion
//!                                               │
//!                                    ┌──────────┴──────────┐
//!                               OllamaTransport       MockTransport
//!                               /api/generate         canned replies
//!                               /api/tags
//! ```

pub mod mock;
pub mod ollama;

pub use mock::MockTransport;
pub use ollama::OllamaTransport;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::error::Result;

/// A normalized inference request: one prompt, one model, one attempt.
///
/// Created per call by the [`InferenceClient`](crate::client::InferenceClient)
/// and discarded after use.
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    /// Model identifier (e.g. `"codellama"`, `"llava"`).
    pub model: String,

    /// The fully rendered prompt text.
    pub prompt: String,

    /// Base64-encoded images for vision models. Empty for text-only modes.
    pub images: Vec<String>,

    /// Sampling parameters forwarded in the request body.
    pub params: SamplingParams,
}

/// Sampling parameters for inference requests.
#[derive(Debug, Clone)]
pub struct SamplingParams {
    /// Temperature (0.0 = deterministic, 1.0 = creative).
    pub temperature: f64,

    /// Maximum tokens to generate.
    pub max_tokens: u32,

    /// Custom options merged into the endpoint's options object.
    pub options: Option<Value>,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 2048,
            options: None,
        }
    }
}

impl SamplingParams {
    pub fn with_temperature(mut self, temp: f64) -> Self {
        self.temperature = temp;
        self
    }

    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = tokens;
        self
    }

    pub fn with_options(mut self, options: Value) -> Self {
        self.options = Some(options);
        self
    }
}

/// What a transport hands back from one completed call.
///
/// The [`InferenceClient`](crate::client::InferenceClient) wraps this with
/// timing to produce an [`InferenceResponse`](crate::client::InferenceResponse).
#[derive(Debug)]
pub struct Completion {
    /// The full response body text.
    pub text: String,

    /// Model name echoed by the endpoint, if reported.
    pub model: Option<String>,

    /// HTTP status code of the call.
    pub status: u16,
}

/// Abstraction over the inference endpoint.
///
/// Implementors make exactly one outbound call per `complete` invocation:
/// no streaming, no partial results, no retry. The trait is object-safe and
/// used as `Arc<dyn Transport>`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute a single completion call.
    async fn complete(
        &self,
        client: &Client,
        base_url: &str,
        request: &InferenceRequest,
    ) -> Result<Completion>;

    /// List the model names the endpoint reports as available.
    ///
    /// Used by the health prober; failures are translated by the caller,
    /// never escalated past it.
    async fn list_models(&self, client: &Client, base_url: &str) -> Result<Vec<String>>;

    /// Human-readable name for logging.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampling_params_defaults() {
        let params = SamplingParams::default();
        assert_eq!(params.temperature, 0.7);
        assert_eq!(params.max_tokens, 2048);
        assert!(params.options.is_none());
    }

    #[test]
    fn test_sampling_params_builder() {
        let params = SamplingParams::default()
            .with_temperature(0.2)
            .with_max_tokens(512)
            .with_options(serde_json::json!({"top_p": 0.9}));
        assert_eq!(params.temperature, 0.2);
        assert_eq!(params.max_tokens, 512);
        assert_eq!(params.options.unwrap()["top_p"], 0.9);
    }
}
