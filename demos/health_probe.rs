//! Check whether the local inference endpoint is up and what it serves.
//!
//! ```sh
//! cargo run --example health_probe
//! ```

use llm_oneshot::{Config, InferenceClient};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("llm_oneshot=info")),
        )
        .init();

    let client = InferenceClient::new(Config::from_env());
    let status = client.probe().await;

    if status.reachable {
        println!("endpoint up at {}", client.config().endpoint);
        if status.models.is_empty() {
            println!("no models installed");
        } else {
            for model in &status.models {
                println!("  - {model}");
            }
        }
    } else {
        println!(
            "endpoint unreachable at {} (checked {})",
            client.config().endpoint,
            status.checked_at
        );
    }
}
