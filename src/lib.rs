//! # llm-oneshot
//!
//! Mode-driven single-shot LLM calls: prompt templating, one timed call to a
//! locally hosted inference endpoint, defensive response interpretation, and
//! health probing.
//!
//! This crate extracts the pattern that small local-LLM tools keep
//! reimplementing: a code review assistant, a medical notes structurer, a
//! meeting notes generator, an image captioner are all the same program:
//! pick a prompt template by **mode**, substitute the user's input, make one
//! blocking call to the model server, and make sense of whatever text comes
//! back. Here that program is one parameterized library; each tool is a mode
//! table plus a [`Config`].
//!
//! ## Core Concepts
//!
//! - **[`ModeRegistry`]** — maps mode identifiers to fixed prompt templates
//!   with `{placeholder}` substitution. [`ModeRegistry::builtin`] ships the
//!   bundled catalog (code review, symptom extraction, meeting notes,
//!   captions).
//! - **[`InferenceClient`]** — one outbound call per request with a per-call
//!   deadline; no retry, no streaming. Failures map onto a small taxonomy
//!   ([`OneshotError`]): `Unreachable`, `Timeout`, `ServerError`.
//! - **[`interpret`]** — best-effort extraction of a key/value group from the
//!   model's free text into a [`StructuredResult`]; degrades to carrying the
//!   raw text, never fails.
//! - **[`RequestHandler`]** — walks `Validating → Prompting → Inferring →
//!   Interpreting` strictly in order, reporting the failing stage.
//! - **[`InferenceClient::probe`]** — reachability check that never errors:
//!   an unreachable endpoint is an answer, not an exception.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::collections::HashMap;
//! use llm_oneshot::{Config, InferenceClient, ModeRegistry, RequestHandler};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let handler = RequestHandler::new(
//!         ModeRegistry::builtin(),
//!         InferenceClient::new(Config::from_env()),
//!     );
//!
//!     let inputs = HashMap::from([
//!         ("note".to_string(), "Patient has fever and cough.".to_string()),
//!     ]);
//!     let outcome = handler.handle("symptom-extraction", &inputs).await?;
//!
//!     if outcome.result.is_structured() {
//!         for (name, value) in &outcome.result.fields {
//!             println!("{name}: {value:?}");
//!         }
//!     } else {
//!         println!("{}", outcome.result.fallback_text().unwrap_or_default());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Testing without a model server
//!
//! [`MockTransport`] replays scripted replies (including failures), so the
//! whole request path is testable offline:
//!
//! ```
//! use std::sync::Arc;
//! use llm_oneshot::{Config, InferenceClient, MockTransport, ModeRegistry, RequestHandler};
//!
//! let handler = RequestHandler::new(
//!     ModeRegistry::builtin(),
//!     InferenceClient::with_transport(
//!         Config::new("http://localhost:11434", "test-model"),
//!         Arc::new(MockTransport::fixed("Division by zero risk on line 1")),
//!     ),
//! );
//! ```

pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod handler;
pub mod health;
pub mod interpret;
pub mod template;
pub mod transport;

pub use batch::{BatchPolicy, BatchReport, RowOutcome};
pub use client::{InferenceClient, InferenceResponse};
pub use config::Config;
pub use error::{ErrorKind, OneshotError, Result};
pub use handler::{InputStats, RequestError, RequestHandler, RequestOutcome, Stage};
pub use health::HealthStatus;
pub use interpret::{interpret, FieldValue, StructuredResult};
pub use template::{ModeRegistry, PromptTemplate};
pub use transport::{
    Completion, InferenceRequest, MockTransport, OllamaTransport, SamplingParams, Transport,
};
