//! Review a code snippet with a local model.
//!
//! Run with a local Ollama instance:
//! ```sh
//! OLLAMA_MODEL=codellama cargo run --example code_review
//! ```

use std::collections::HashMap;

use llm_oneshot::{Config, InferenceClient, ModeRegistry, RequestHandler};

const SNIPPET: &str = r#"def divide(a, b):
    return a / b

def average(values):
    return sum(values) / len(values)
"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("llm_oneshot=info")),
        )
        .init();

    let handler = RequestHandler::new(
        ModeRegistry::builtin(),
        InferenceClient::new(Config::from_env()),
    );

    let inputs = HashMap::from([
        ("code".to_string(), SNIPPET.to_string()),
        ("language".to_string(), "python".to_string()),
    ]);

    let outcome = handler.handle("bug-detection", &inputs).await?;

    println!(
        "\n--- review ({}, {} ms) ---",
        outcome.model,
        outcome.elapsed.as_millis()
    );
    match outcome.result.fallback_text() {
        Some(text) => println!("{text}"),
        None => println!("{:#?}", outcome.result.fields),
    }

    Ok(())
}
