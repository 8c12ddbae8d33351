//! Screening pipeline — orchestrates one batched scoring run.
//!
//! Flow: build_prompt → backend.complete (bounded by timeout) →
//!       extract_array → validate_batch (ranks) → attach submission ids.
//!
//! Stateless across calls. The backend call is the only await point; it is
//! issued once per run regardless of candidate count, and never retried here.

use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::screening::backend::ScoringBackend;
use crate::screening::extractor::{extract_array, ExtractError};
use crate::screening::models::{RankedResult, ScoringRequest};
use crate::screening::prompt_builder::build_prompt;
use crate::screening::validator::validate_batch;

/// Pipeline-level failures. Any of these aborts the run with no ranking.
#[derive(Debug, Error)]
pub enum ScreeningError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("scoring backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Runs the full screening pipeline for one job description.
pub async fn run_screening(
    backend: &dyn ScoringBackend,
    request: &ScoringRequest,
    backend_timeout: Duration,
) -> Result<RankedResult, ScreeningError> {
    let prompt = build_prompt(&request.job_description, &request.submissions)?;
    info!(
        "Scoring {} candidates (prompt {} bytes, timeout {}s)",
        request.submissions.len(),
        prompt.len(),
        backend_timeout.as_secs()
    );

    let started = Instant::now();
    // Dropping the future on timeout releases the underlying connection.
    let reply = match timeout(backend_timeout, backend.complete(&prompt)).await {
        Ok(Ok(reply)) => reply,
        Ok(Err(e)) => return Err(ScreeningError::BackendUnavailable(e.to_string())),
        Err(_) => {
            return Err(ScreeningError::BackendUnavailable(format!(
                "no reply within {}s",
                backend_timeout.as_secs_f64()
            )))
        }
    };
    info!(
        "Backend replied in {}ms ({} bytes)",
        started.elapsed().as_millis(),
        reply.len()
    );

    let payload = extract_array(&reply).map_err(|e| {
        warn!("Backend reply contained no usable array: {e}");
        e
    })?;
    debug!("Extracted payload of {} bytes", payload.len());

    let result = validate_batch(payload, request.submissions.len())
        .with_submission_ids(&request.submissions);

    for failure in &result.failures {
        warn!(
            "Record failure {} for source_index={:?} (submission {:?}): {}",
            failure.reason, failure.source_index, failure.submission_id, failure.detail
        );
    }
    info!(
        "Screening complete: ranked={} failures={}",
        result.ranked.len(),
        result.failures.len()
    );

    Ok(result)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
