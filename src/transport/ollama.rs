//! Transport for Ollama's native API.
//!
//! [`OllamaTransport`] translates an [`InferenceRequest`] into a single
//! non-streaming `POST /api/generate` call and serves model listing from
//! `GET /api/tags`.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{Completion, InferenceRequest, Transport};
use crate::error::{OneshotError, Result};

/// Transport speaking Ollama's native API.
///
/// One call, one attempt: connection failures surface as
/// [`OneshotError::Unreachable`], non-success statuses as
/// [`OneshotError::ServerError`]. The per-call deadline is owned by the
/// [`InferenceClient`](crate::client::InferenceClient), not by this transport.
#[derive(Debug, Clone, Default)]
pub struct OllamaTransport;

impl OllamaTransport {
    /// Build the JSON body for `/api/generate`.
    fn build_body(request: &InferenceRequest) -> Value {
        let mut options = json!({
            "temperature": request.params.temperature,
            "num_predict": request.params.max_tokens,
        });
        if let Some(ref custom) = request.params.options {
            if let (Some(base), Some(extra)) = (options.as_object_mut(), custom.as_object()) {
                for (k, v) in extra {
                    base.insert(k.clone(), v.clone());
                }
            }
        }

        let mut body = json!({
            "model": request.model,
            "prompt": request.prompt,
            "stream": false,
            "options": options,
        });
        if !request.images.is_empty() {
            body["images"] = json!(request.images);
        }
        body
    }

    /// Map a reqwest transport failure onto the error taxonomy.
    fn map_send_error(url: &str, err: reqwest::Error) -> OneshotError {
        OneshotError::Unreachable {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl Transport for OllamaTransport {
    async fn complete(
        &self,
        client: &Client,
        base_url: &str,
        request: &InferenceRequest,
    ) -> Result<Completion> {
        let url = format!("{}/api/generate", base_url.trim_end_matches('/'));
        let body = Self::build_body(request);

        let resp = client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::map_send_error(&url, e))?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(OneshotError::ServerError { status, body: text });
        }

        let json_resp: Value = resp.json().await.map_err(|e| OneshotError::ServerError {
            status,
            body: format!("invalid response body: {}", e),
        })?;

        let text = json_resp
            .get("response")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        let model = json_resp
            .get("model")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        Ok(Completion {
            text,
            model,
            status,
        })
    }

    async fn list_models(&self, client: &Client, base_url: &str) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", base_url.trim_end_matches('/'));

        let resp = client
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::map_send_error(&url, e))?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(OneshotError::ServerError { status, body: text });
        }

        let json_resp: Value = resp.json().await.map_err(|e| OneshotError::ServerError {
            status,
            body: format!("invalid response body: {}", e),
        })?;

        let models = json_resp
            .get("models")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|m| m.get("name").and_then(|n| n.as_str()))
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default();

        Ok(models)
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::SamplingParams;

    fn test_request() -> InferenceRequest {
        InferenceRequest {
            model: "codellama".into(),
            prompt: "Review this code.".into(),
            images: Vec::new(),
            params: SamplingParams::default(),
        }
    }

    #[test]
    fn test_body_shape() {
        let body = OllamaTransport::build_body(&test_request());
        assert_eq!(body["model"], "codellama");
        assert_eq!(body["prompt"], "Review this code.");
        assert_eq!(body["stream"], false);
        assert_eq!(body["options"]["temperature"], 0.7);
        assert_eq!(body["options"]["num_predict"], 2048);
        // No images field for text-only requests
        assert!(body.get("images").is_none());
    }

    #[test]
    fn test_body_includes_images() {
        let mut request = test_request();
        request.images.push("aGVsbG8=".into());
        let body = OllamaTransport::build_body(&request);
        assert_eq!(body["images"][0], "aGVsbG8=");
    }

    #[test]
    fn test_body_merges_custom_options() {
        let mut request = test_request();
        request.params.options = Some(json!({"top_p": 0.9, "seed": 42}));
        let body = OllamaTransport::build_body(&request);
        assert_eq!(body["options"]["top_p"], 0.9);
        assert_eq!(body["options"]["seed"], 42);
        // Standard options still present
        assert_eq!(body["options"]["temperature"], 0.7);
    }

    #[tokio::test]
    async fn test_connection_refused_maps_to_unreachable() {
        let transport = OllamaTransport;
        let client = Client::new();
        // Port 1 is reliably closed
        let result = transport
            .complete(&client, "http://127.0.0.1:1", &test_request())
            .await;
        match result {
            Err(OneshotError::Unreachable { url, .. }) => {
                assert!(url.contains("/api/generate"));
            }
            other => panic!("expected Unreachable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_models_connection_refused() {
        let transport = OllamaTransport;
        let client = Client::new();
        let result = transport.list_models(&client, "http://127.0.0.1:1").await;
        assert!(matches!(result, Err(OneshotError::Unreachable { .. })));
    }
}
