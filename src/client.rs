//! The inference client: one timed outbound call per request.
//!
//! [`InferenceClient`] owns the HTTP client, the configuration, and the
//! per-call deadline. Each [`infer`](InferenceClient::infer) makes exactly one
//! attempt against the transport; there is no retry and no streaming. The
//! deadline is enforced here so it applies uniformly to every transport.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Client;

use crate::config::Config;
use crate::error::{OneshotError, Result};
use crate::transport::{InferenceRequest, OllamaTransport, Transport};

/// A completed inference call, as seen by the rest of the library.
#[derive(Debug)]
pub struct InferenceResponse {
    /// The full response body text.
    pub text: String,

    /// The model that produced the response (endpoint echo, or the requested
    /// model when the endpoint does not report one).
    pub model: String,

    /// HTTP status code of the call.
    pub status: u16,

    /// Wall-clock time the call took.
    pub elapsed: Duration,
}

/// Client issuing single-shot calls to the configured inference endpoint.
///
/// Cheap to share: the underlying HTTP client is `Arc`-backed and the
/// transport is held as `Arc<dyn Transport>`.
///
/// # Example
///
/// ```no_run
/// use llm_oneshot::{Config, InferenceClient};
///
/// # async fn run() -> llm_oneshot::Result<()> {
/// let client = InferenceClient::new(Config::new("http://localhost:11434", "codellama"));
/// let response = client.infer("Why is the sky blue?").await?;
/// println!("{}", response.text);
/// # Ok(())
/// # }
/// ```
pub struct InferenceClient {
    http: Client,
    transport: Arc<dyn Transport>,
    config: Config,
}

impl InferenceClient {
    /// Create a client speaking the Ollama native API.
    pub fn new(config: Config) -> Self {
        Self::with_transport(config, Arc::new(OllamaTransport))
    }

    /// Create a client with a custom transport (e.g. a mock for tests).
    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Self {
        Self {
            http: Client::new(),
            transport,
            config,
        }
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    pub(crate) fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Issue a single inference call with the configured model and params.
    pub async fn infer(&self, prompt: &str) -> Result<InferenceResponse> {
        let request = InferenceRequest {
            model: self.config.model.clone(),
            prompt: prompt.to_string(),
            images: Vec::new(),
            params: self.config.params.clone(),
        };
        self.infer_request(&request).await
    }

    /// Issue a single inference call for a fully specified request.
    ///
    /// Exactly one attempt: if the deadline expires the call surfaces
    /// [`OneshotError::Timeout`]; transport failures pass through with their
    /// kind preserved.
    pub async fn infer_request(&self, request: &InferenceRequest) -> Result<InferenceResponse> {
        let started = Instant::now();
        tracing::debug!(
            model = %request.model,
            transport = self.transport.name(),
            prompt_chars = request.prompt.len(),
            "dispatching inference call"
        );

        let call = self
            .transport
            .complete(&self.http, &self.config.endpoint, request);
        let completion = match tokio::time::timeout(self.config.timeout, call).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!(
                    model = %request.model,
                    limit_ms = self.config.timeout.as_millis() as u64,
                    "inference call exceeded deadline"
                );
                return Err(OneshotError::Timeout {
                    limit: self.config.timeout,
                });
            }
        };

        let elapsed = started.elapsed();
        tracing::debug!(
            status = completion.status,
            elapsed_ms = elapsed.as_millis() as u64,
            response_chars = completion.text.len(),
            "inference call completed"
        );

        Ok(InferenceResponse {
            text: completion.text,
            model: completion
                .model
                .unwrap_or_else(|| request.model.clone()),
            status: completion.status,
            elapsed,
        })
    }
}

impl std::fmt::Debug for InferenceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceClient")
            .field("endpoint", &self.config.endpoint)
            .field("model", &self.config.model)
            .field("transport", &self.transport.name())
            .field("timeout", &self.config.timeout)
            .finish()
    }
}
