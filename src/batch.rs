//! Batch processing: the same single-request flow, once per row.
//!
//! Rows are handled sequentially, and what happens after a row fails is an
//! explicit [`BatchPolicy`] choice. The default skips the failed row and
//! continues.

use std::collections::HashMap;

use crate::handler::{RequestError, RequestHandler, RequestOutcome};

/// What to do when a row fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPolicy {
    /// Stop at the first failed row; remaining rows are not attempted.
    AbortOnError,
    /// Record the failure and continue with the next row.
    #[default]
    SkipFailedRows,
}

/// Outcome of one batch row.
#[derive(Debug)]
pub struct RowOutcome {
    /// Zero-based index of the row in the submitted batch.
    pub row: usize,
    /// The row's result or its failure.
    pub outcome: Result<RequestOutcome, RequestError>,
}

/// Report for a completed (or aborted) batch run.
#[derive(Debug)]
pub struct BatchReport {
    /// Per-row outcomes, in submission order. Shorter than the input when
    /// the run aborted.
    pub rows: Vec<RowOutcome>,
    /// Whether the run stopped early under [`BatchPolicy::AbortOnError`].
    pub aborted: bool,
}

impl BatchReport {
    /// Number of rows that produced a result.
    pub fn succeeded(&self) -> usize {
        self.rows.iter().filter(|r| r.outcome.is_ok()).count()
    }

    /// Number of rows that failed.
    pub fn failed(&self) -> usize {
        self.rows.len() - self.succeeded()
    }
}

impl RequestHandler {
    /// Run every row through [`handle`](RequestHandler::handle) under the
    /// given policy.
    ///
    /// Rows run sequentially; the deployment target is a single local
    /// user, and the endpoint serializes model execution anyway.
    pub async fn handle_batch(
        &self,
        mode: &str,
        rows: &[HashMap<String, String>],
        policy: BatchPolicy,
    ) -> BatchReport {
        let mut report = BatchReport {
            rows: Vec::with_capacity(rows.len()),
            aborted: false,
        };

        for (row, inputs) in rows.iter().enumerate() {
            let outcome = self.handle(mode, inputs).await;
            let failed = outcome.is_err();
            tracing::debug!(mode, row, ok = !failed, "batch row finished");
            report.rows.push(RowOutcome { row, outcome });

            if failed && policy == BatchPolicy::AbortOnError {
                report.aborted = true;
                break;
            }
        }

        tracing::info!(
            mode,
            total = rows.len(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            aborted = report.aborted,
            "batch finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::client::InferenceClient;
    use crate::config::Config;
    use crate::error::OneshotError;
    use crate::handler::Stage;
    use crate::template::ModeRegistry;
    use crate::transport::MockTransport;

    fn handler_with(transport: MockTransport) -> RequestHandler {
        RequestHandler::new(
            ModeRegistry::builtin(),
            InferenceClient::with_transport(
                Config::new("http://localhost:11434", "test-model"),
                Arc::new(transport),
            ),
        )
    }

    fn note_rows(notes: &[&str]) -> Vec<HashMap<String, String>> {
        notes
            .iter()
            .map(|n| HashMap::from([("note".to_string(), n.to_string())]))
            .collect()
    }

    fn flaky_transport() -> MockTransport {
        MockTransport::script(vec![
            Ok(r#"{"diagnosis": "flu"}"#.into()),
            Err(OneshotError::Unreachable {
                url: "mock://endpoint".into(),
                message: "connection refused".into(),
            }),
            Ok(r#"{"diagnosis": "migraine"}"#.into()),
        ])
    }

    #[tokio::test]
    async fn test_skip_policy_continues_past_failures() {
        let handler = handler_with(flaky_transport());
        let rows = note_rows(&["note one", "note two", "note three"]);

        let report = handler
            .handle_batch("symptom-extraction", &rows, BatchPolicy::SkipFailedRows)
            .await;

        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert!(!report.aborted);
        assert!(report.rows[1].outcome.is_err());
    }

    #[tokio::test]
    async fn test_abort_policy_stops_at_first_failure() {
        let handler = handler_with(flaky_transport());
        let rows = note_rows(&["note one", "note two", "note three"]);

        let report = handler
            .handle_batch("symptom-extraction", &rows, BatchPolicy::AbortOnError)
            .await;

        assert_eq!(report.rows.len(), 2); // third row never attempted
        assert!(report.aborted);
        let failure = report.rows[1].outcome.as_ref().unwrap_err();
        assert_eq!(failure.stage, Stage::Inferring);
    }

    #[tokio::test]
    async fn test_all_rows_succeed() {
        let handler = handler_with(MockTransport::fixed(r#"{"diagnosis": "flu"}"#));
        let rows = note_rows(&["a", "b"]);

        let report = handler
            .handle_batch("symptom-extraction", &rows, BatchPolicy::default())
            .await;

        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 0);
        assert!(!report.aborted);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let handler = handler_with(MockTransport::fixed("unused"));
        let report = handler
            .handle_batch("symptom-extraction", &[], BatchPolicy::default())
            .await;
        assert!(report.rows.is_empty());
        assert!(!report.aborted);
    }
}
