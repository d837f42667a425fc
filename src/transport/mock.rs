//! Mock transport for testing without a live endpoint.
//!
//! [`MockTransport`] replays a script of canned replies (successful texts or
//! errors) so downstream consumers can write deterministic tests against
//! this crate.
//!
//! # Example
//!
//! ```
//! use llm_oneshot::MockTransport;
//!
//! let mock = MockTransport::fixed("Division by zero risk on line 1");
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{Completion, InferenceRequest, Transport};
use crate::error::{OneshotError, Result};

/// A test transport replaying scripted replies in order.
///
/// Cycles back to the beginning when the script is exhausted. Model listing
/// succeeds with the configured model names unless the transport was built
/// as unreachable.
#[derive(Debug)]
pub struct MockTransport {
    script: Vec<std::result::Result<String, OneshotError>>,
    index: AtomicUsize,
    models: Option<Vec<String>>,
    delay: Option<Duration>,
}

impl MockTransport {
    /// Create a mock replaying the given replies in order.
    pub fn script(replies: Vec<std::result::Result<String, OneshotError>>) -> Self {
        assert!(
            !replies.is_empty(),
            "MockTransport requires at least one scripted reply"
        );
        Self {
            script: replies,
            index: AtomicUsize::new(0),
            models: Some(Vec::new()),
            delay: None,
        }
    }

    /// A mock that always returns the same response text.
    pub fn fixed(text: impl Into<String>) -> Self {
        Self::script(vec![Ok(text.into())])
    }

    /// A mock that always fails with the given error.
    pub fn failing(error: OneshotError) -> Self {
        let mut mock = Self::script(vec![Err(error)]);
        mock.models = None;
        mock
    }

    /// A mock that refuses every connection, including model listing.
    pub fn unreachable() -> Self {
        Self::failing(OneshotError::Unreachable {
            url: "mock://endpoint".into(),
            message: "connection refused".into(),
        })
    }

    /// Set the model names reported by [`Transport::list_models`].
    pub fn with_models(mut self, models: Vec<&str>) -> Self {
        self.models = Some(models.into_iter().map(|s| s.to_string()).collect());
        self
    }

    /// Delay every reply, for exercising deadline handling.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn next_reply(&self) -> std::result::Result<String, OneshotError> {
        let idx = self.index.fetch_add(1, Ordering::Relaxed) % self.script.len();
        self.script[idx].clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn complete(
        &self,
        _client: &Client,
        _base_url: &str,
        request: &InferenceRequest,
    ) -> Result<Completion> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let text = self.next_reply()?;
        Ok(Completion {
            text,
            model: Some(request.model.clone()),
            status: 200,
        })
    }

    async fn list_models(&self, _client: &Client, _base_url: &str) -> Result<Vec<String>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.models {
            Some(models) => Ok(models.clone()),
            None => Err(OneshotError::Unreachable {
                url: "mock://endpoint".into(),
                message: "connection refused".into(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::SamplingParams;

    fn test_request() -> InferenceRequest {
        InferenceRequest {
            model: "test".into(),
            prompt: "test".into(),
            images: Vec::new(),
            params: SamplingParams::default(),
        }
    }

    #[tokio::test]
    async fn test_fixed_reply() {
        let mock = MockTransport::fixed("Hello!");
        let client = Client::new();
        let resp = mock
            .complete(&client, "http://unused", &test_request())
            .await
            .unwrap();
        assert_eq!(resp.text, "Hello!");
        assert_eq!(resp.status, 200);
        assert_eq!(resp.model.as_deref(), Some("test"));
    }

    #[tokio::test]
    async fn test_script_cycles() {
        let mock = MockTransport::script(vec![Ok("first".into()), Ok("second".into())]);
        let client = Client::new();
        let r1 = mock
            .complete(&client, "http://unused", &test_request())
            .await
            .unwrap();
        let r2 = mock
            .complete(&client, "http://unused", &test_request())
            .await
            .unwrap();
        let r3 = mock
            .complete(&client, "http://unused", &test_request())
            .await
            .unwrap();
        assert_eq!(r1.text, "first");
        assert_eq!(r2.text, "second");
        assert_eq!(r3.text, "first"); // cycles
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let mock = MockTransport::script(vec![
            Ok("good".into()),
            Err(OneshotError::ServerError {
                status: 500,
                body: "boom".into(),
            }),
        ]);
        let client = Client::new();
        assert!(mock
            .complete(&client, "http://unused", &test_request())
            .await
            .is_ok());
        let err = mock
            .complete(&client, "http://unused", &test_request())
            .await
            .unwrap_err();
        assert!(matches!(err, OneshotError::ServerError { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_refuses_everything() {
        let mock = MockTransport::unreachable();
        let client = Client::new();
        assert!(matches!(
            mock.complete(&client, "http://unused", &test_request())
                .await,
            Err(OneshotError::Unreachable { .. })
        ));
        assert!(matches!(
            mock.list_models(&client, "http://unused").await,
            Err(OneshotError::Unreachable { .. })
        ));
    }

    #[tokio::test]
    async fn test_with_models() {
        let mock = MockTransport::fixed("ok").with_models(vec!["llama2", "codellama"]);
        let client = Client::new();
        let models = mock.list_models(&client, "http://unused").await.unwrap();
        assert_eq!(models, vec!["llama2", "codellama"]);
    }
}
