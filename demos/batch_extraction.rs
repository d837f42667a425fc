//! Structure a batch of medical notes, skipping rows that fail.
//!
//! Run with a local Ollama instance:
//! ```sh
//! OLLAMA_MODEL=llama3.2:3b cargo run --example batch_extraction
//! ```

use std::collections::HashMap;

use llm_oneshot::{BatchPolicy, Config, InferenceClient, ModeRegistry, RequestHandler};

const NOTES: &[&str] = &[
    "Patient presents with severe headache and sensitivity to light. \
     Diagnosis: Migraine. Prescribed Ibuprofen. Follow up in 2 weeks.",
    "Patient has fever and cough. Diagnosis: flu. Rest and fluids advised.",
    "Routine checkup, no complaints. Blood pressure normal.",
];

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

    let rows: Vec<HashMap<String, String>> = NOTES
        .iter()
        .map(|n| HashMap::from([("note".to_string(), n.to_string())]))
        .collect();

    let report = handler
        .handle_batch("symptom-extraction", &rows, BatchPolicy::SkipFailedRows)
        .await;

    println!(
        "\n{} of {} rows succeeded",
        report.succeeded(),
        report.rows.len()
    );
    for row in &report.rows {
        match &row.outcome {
            Ok(outcome) => println!("row {}: {:?}", row.row, outcome.result.fields),
            Err(err) => println!("row {}: FAILED ({})", row.row, err),
        }
    }

    Ok(())
}
