//! Endpoint reachability probing.
//!
//! [`InferenceClient::probe`] issues one short-timeout call against the
//! endpoint's model listing. The call failing is not an error condition: it
//! is the answer, reported as `reachable = false`. Status is recomputed on
//! every probe and never cached.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::client::InferenceClient;

/// Result of a single health probe.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Whether the inference endpoint answered.
    pub reachable: bool,

    /// Model names the endpoint reports as available. Empty when
    /// unreachable or when the endpoint hosts no models.
    pub models: Vec<String>,

    /// When this probe ran.
    pub checked_at: DateTime<Utc>,
}

impl InferenceClient {
    /// Probe the inference endpoint. Never fails outward.
    ///
    /// Uses the (short) probe deadline from the configuration, not the
    /// inference deadline.
    pub async fn probe(&self) -> HealthStatus {
        let call = self
            .transport()
            .list_models(self.http(), &self.config().endpoint);

        let outcome = tokio::time::timeout(self.config().probe_timeout, call).await;

        let (reachable, models) = match outcome {
            Ok(Ok(models)) => (true, models),
            Ok(Err(err)) => {
                tracing::warn!(
                    endpoint = %self.config().endpoint,
                    error = %err,
                    "health probe failed"
                );
                (false, Vec::new())
            }
            Err(_) => {
                tracing::warn!(
                    endpoint = %self.config().endpoint,
                    limit_ms = self.config().probe_timeout.as_millis() as u64,
                    "health probe timed out"
                );
                (false, Vec::new())
            }
        };

        HealthStatus {
            reachable,
            models,
            checked_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::config::Config;
    use crate::transport::MockTransport;

    fn test_config() -> Config {
        Config::new("http://localhost:11434", "test-model")
    }

    #[tokio::test]
    async fn test_probe_reports_models() {
        let client = InferenceClient::with_transport(
            test_config(),
            Arc::new(MockTransport::fixed("unused").with_models(vec!["llama2", "llava"])),
        );
        let status = client.probe().await;
        assert!(status.reachable);
        assert_eq!(status.models, vec!["llama2", "llava"]);
    }

    #[tokio::test]
    async fn test_probe_never_propagates_connection_failure() {
        let client =
            InferenceClient::with_transport(test_config(), Arc::new(MockTransport::unreachable()));
        let status = client.probe().await;
        assert!(!status.reachable);
        assert!(status.models.is_empty());
    }

    #[tokio::test]
    async fn test_probe_timeout_is_not_reachable() {
        let config = test_config().with_probe_timeout(Duration::from_millis(20));
        let client = InferenceClient::with_transport(
            config,
            Arc::new(
                MockTransport::fixed("unused")
                    .with_models(vec!["llama2"])
                    .with_delay(Duration::from_secs(5)),
            ),
        );
        let status = client.probe().await;
        assert!(!status.reachable);
    }

    #[tokio::test]
    async fn test_probe_serializes() {
        let client = InferenceClient::with_transport(
            test_config(),
            Arc::new(MockTransport::fixed("unused").with_models(vec!["llama2"])),
        );
        let status = client.probe().await;
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["reachable"], true);
        assert_eq!(json["models"][0], "llama2");
        assert!(json["checked_at"].is_string());
    }
}
