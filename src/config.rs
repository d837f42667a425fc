//! Library configuration.
//!
//! [`Config`] is an explicitly constructed value passed to
//! [`InferenceClient::new`](crate::client::InferenceClient::new); there is no
//! process-wide mutable state. It is read once and immutable for the lifetime
//! of the client that holds it.

use std::env;
use std::time::Duration;

use crate::transport::SamplingParams;

/// Default per-call deadline for inference requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Default deadline for the lightweight health probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

const DEFAULT_ENDPOINT: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama3.2:3b";

/// Configuration for an [`InferenceClient`](crate::client::InferenceClient).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use llm_oneshot::Config;
///
/// let config = Config::new("http://localhost:11434", "codellama")
///     .with_timeout(Duration::from_secs(300));
/// assert_eq!(config.endpoint, "http://localhost:11434");
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the inference endpoint (no API path suffix).
    pub endpoint: String,
    /// Model identifier sent with every request (e.g. `"codellama"`).
    pub model: String,
    /// Per-call deadline; the only bound on call duration.
    pub timeout: Duration,
    /// Deadline for the health probe. Kept short so a down endpoint is
    /// reported quickly.
    pub probe_timeout: Duration,
    /// Sampling parameters forwarded to the endpoint.
    pub params: SamplingParams,
}

impl Config {
    /// Create a configuration for the given endpoint and model.
    ///
    /// The endpoint is normalized: trailing slashes and known API path
    /// suffixes (`/api/generate`, `/api/tags`, ...) are stripped so callers
    /// can paste a full request URL without double-pathing.
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: normalize_endpoint(&endpoint.into()),
            model: model.into(),
            timeout: DEFAULT_TIMEOUT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            params: SamplingParams::default(),
        }
    }

    /// Build a configuration from environment variables, with defaults
    /// matching a stock local Ollama install.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `OLLAMA_HOST` | `http://localhost:11434` |
    /// | `OLLAMA_MODEL` | `llama3.2:3b` |
    /// | `REQUEST_TIMEOUT_SECS` | `120` |
    pub fn from_env() -> Self {
        let endpoint = env::var("OLLAMA_HOST").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let model = env::var("OLLAMA_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let mut config = Self::new(endpoint, model);
        if let Some(secs) = env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            config.timeout = Duration::from_secs(secs);
        }
        config
    }

    /// Set the per-call deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the health probe deadline.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Set the sampling parameters.
    pub fn with_params(mut self, params: SamplingParams) -> Self {
        self.params = params;
        self
    }
}

/// Strip known API path suffixes from an endpoint URL.
/// e.g., "http://localhost:11434/api/generate" -> "http://localhost:11434"
fn normalize_endpoint(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    for suffix in &["/api/generate", "/api/chat", "/api/tags", "/api"] {
        if let Some(stripped) = trimmed.strip_suffix(suffix) {
            return stripped.to_string();
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_generate_path() {
        assert_eq!(
            normalize_endpoint("http://localhost:11434/api/generate"),
            "http://localhost:11434"
        );
    }

    #[test]
    fn test_normalize_strips_tags_path() {
        assert_eq!(
            normalize_endpoint("http://localhost:11434/api/tags"),
            "http://localhost:11434"
        );
    }

    #[test]
    fn test_normalize_preserves_clean_url() {
        assert_eq!(
            normalize_endpoint("http://localhost:11434"),
            "http://localhost:11434"
        );
    }

    #[test]
    fn test_normalize_trailing_slash() {
        assert_eq!(
            normalize_endpoint("http://localhost:11434/"),
            "http://localhost:11434"
        );
    }

    #[test]
    fn test_defaults() {
        let config = Config::new("http://localhost:11434", "llava");
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.probe_timeout, DEFAULT_PROBE_TIMEOUT);
        assert_eq!(config.model, "llava");
    }
}
