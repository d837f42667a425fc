//! Request orchestration.
//!
//! [`RequestHandler`] walks each request through a strictly sequential state
//! machine: `Validating → Prompting → Inferring → Interpreting → Done`, with
//! any stage failure moving straight to `Failed` carrying that stage and the
//! stage-specific error kind. There are no retries between stages and no
//! parallel paths; the single transport call inside `Inferring` is the only
//! suspension point.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::client::InferenceClient;
use crate::error::{ErrorKind, OneshotError};
use crate::interpret::{interpret, StructuredResult};
use crate::template::ModeRegistry;
use crate::transport::InferenceRequest;

/// Maximum total input size accepted before prompting.
pub const MAX_INPUT_CHARS: usize = 50_000;

/// The stages a request moves through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Validating,
    Prompting,
    Inferring,
    Interpreting,
    Done,
    Failed,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Validating => "validating",
            Stage::Prompting => "prompting",
            Stage::Inferring => "inferring",
            Stage::Interpreting => "interpreting",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A request that moved to `Failed`, remembering which stage broke.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("request failed while {stage}: {source}")]
pub struct RequestError {
    /// The stage that was executing when the failure occurred.
    pub stage: Stage,
    /// The underlying error, kind preserved.
    #[source]
    pub source: OneshotError,
}

impl RequestError {
    /// The machine-readable kind of the underlying error.
    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }

    /// Whether the failure is the caller's fault (4xx-equivalent).
    pub fn is_client_error(&self) -> bool {
        self.source.is_client_error()
    }
}

/// Basic statistics about the submitted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InputStats {
    pub chars: usize,
    pub words: usize,
    pub lines: usize,
}

impl InputStats {
    fn for_inputs(inputs: &HashMap<String, String>) -> Self {
        let chars = inputs.values().map(|v| v.chars().count()).sum();
        let words = inputs.values().map(|v| v.split_whitespace().count()).sum();
        let lines = inputs
            .values()
            .map(|v| if v.is_empty() { 0 } else { v.lines().count() })
            .sum();
        Self {
            chars,
            words,
            lines,
        }
    }
}

/// A successfully completed request.
#[derive(Debug)]
pub struct RequestOutcome {
    /// The interpreted result (structured fields or raw fallback).
    pub result: StructuredResult,

    /// Model that served the request.
    pub model: String,

    /// Wall-clock time of the inference call.
    pub elapsed: Duration,

    /// Statistics over the submitted inputs.
    pub stats: InputStats,
}

/// Orchestrates one request end to end.
///
/// Holds the mode registry and the inference client; both are constructed
/// explicitly by the caller and immutable afterwards. Requests are handled
/// independently: the handler keeps no per-request state, so one handler
/// can serve any number of concurrent callers.
///
/// # Example
///
/// ```no_run
/// use std::collections::HashMap;
/// use llm_oneshot::{Config, InferenceClient, ModeRegistry, RequestHandler};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let handler = RequestHandler::new(
///     ModeRegistry::builtin(),
///     InferenceClient::new(Config::new("http://localhost:11434", "codellama")),
/// );
///
/// let inputs = HashMap::from([
///     ("code".to_string(), "def f(x): return x/0".to_string()),
///     ("language".to_string(), "python".to_string()),
/// ]);
/// let outcome = handler.handle("bug-detection", &inputs).await?;
/// println!("{:?}", outcome.result);
/// # Ok(())
/// # }
/// ```
pub struct RequestHandler {
    registry: ModeRegistry,
    client: InferenceClient,
}

impl RequestHandler {
    /// Create a handler over a registry and a client.
    pub fn new(registry: ModeRegistry, client: InferenceClient) -> Self {
        Self { registry, client }
    }

    /// The mode registry backing this handler.
    pub fn registry(&self) -> &ModeRegistry {
        &self.registry
    }

    /// The inference client backing this handler.
    pub fn client(&self) -> &InferenceClient {
        &self.client
    }

    /// Handle a text-only request.
    pub async fn handle(
        &self,
        mode: &str,
        inputs: &HashMap<String, String>,
    ) -> Result<RequestOutcome, RequestError> {
        self.handle_with_images(mode, inputs, Vec::new()).await
    }

    /// Handle a request carrying base64 images for vision modes.
    pub async fn handle_with_images(
        &self,
        mode: &str,
        inputs: &HashMap<String, String>,
        images: Vec<String>,
    ) -> Result<RequestOutcome, RequestError> {
        // Validating
        let template = self.registry.get(mode).ok_or_else(|| {
            fail(Stage::Validating, OneshotError::UnknownMode(mode.to_string()))
        })?;
        validate_inputs(template.placeholders(), inputs)
            .map_err(|e| fail(Stage::Validating, e))?;
        let stats = InputStats::for_inputs(inputs);

        // Prompting
        let prompt = template
            .render(inputs)
            .map_err(|e| fail(Stage::Prompting, e))?;
        tracing::debug!(prompt_chars = prompt.len(), "prompt rendered");

        // Inferring: the single suspension point
        let request = InferenceRequest {
            model: self.client.config().model.clone(),
            prompt,
            images,
            params: self.client.config().params.clone(),
        };
        let response = self
            .client
            .infer_request(&request)
            .await
            .map_err(|e| fail(Stage::Inferring, e))?;

        // Interpreting never fails
        let result = interpret(mode, &response.text);
        tracing::info!(
            mode,
            model = %response.model,
            elapsed_ms = response.elapsed.as_millis() as u64,
            structured = result.is_structured(),
            "request done"
        );

        Ok(RequestOutcome {
            result,
            model: response.model,
            elapsed: response.elapsed,
            stats,
        })
    }
}

fn fail(stage: Stage, source: OneshotError) -> RequestError {
    tracing::warn!(%stage, error = %source, "request failed");
    RequestError { stage, source }
}

/// Reject inputs that would reach the template empty or oversized.
///
/// Absent keys are left for rendering to report as `MissingPlaceholder`.
fn validate_inputs(
    required: &std::collections::BTreeSet<String>,
    inputs: &HashMap<String, String>,
) -> Result<(), OneshotError> {
    for key in required {
        if let Some(value) = inputs.get(key) {
            if value.trim().is_empty() {
                return Err(OneshotError::InvalidInput(format!(
                    "input '{}' is empty",
                    key
                )));
            }
        }
    }

    let total: usize = inputs.values().map(|v| v.chars().count()).sum();
    if total > MAX_INPUT_CHARS {
        return Err(OneshotError::InvalidInput(format!(
            "input too long: {} chars (maximum {})",
            total, MAX_INPUT_CHARS
        )));
    }

    Ok(())
}
