//! Axum route handlers for the Screening API.

use std::collections::HashSet;

use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::documents::extract::{extract_text, unique_submission_id, DocumentFormat};
use crate::errors::AppError;
use crate::screening::export::{to_display_rows, write_csv};
use crate::screening::models::{
    CandidateSubmission, ParseFailure, ScoredCandidate, ScoringRequest,
};
use crate::screening::pipeline::run_screening;
use crate::screening::store::{ScreeningRecord, StoredScreening};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateScreeningRequest {
    pub job_description: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    pub submissions: Vec<CandidateSubmission>,
}

/// An uploaded file that never reached the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct DroppedDocument {
    pub file_name: String,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct ScreeningResponse {
    /// `None` when the result could not be persisted.
    pub screening_id: Option<Uuid>,
    pub total_candidates: usize,
    pub ranked: Vec<ScoredCandidate>,
    pub failures: Vec<ParseFailure>,
    pub dropped_documents: Vec<DroppedDocument>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/screenings
///
/// Scores already-extracted résumé text against a job description.
pub async fn handle_create_screening(
    State(state): State<AppState>,
    Json(request): Json<CreateScreeningRequest>,
) -> Result<Json<ScreeningResponse>, AppError> {
    let response = screen_and_persist(
        &state,
        ScreeningRecordInput {
            company_name: request.company_name,
            job_title: request.job_title,
            job_description: request.job_description,
            submissions: request.submissions,
        },
        Vec::new(),
    )
    .await?;
    Ok(Json(response))
}

/// POST /api/v1/screenings/upload
///
/// Multipart form: `job_description`, optional `company_name` / `job_title`,
/// and one `resumes` file field per résumé (PDF, DOCX or TXT).
pub async fn handle_upload_screening(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ScreeningResponse>, AppError> {
    let mut job_description = String::new();
    let mut company_name = None;
    let mut job_title = None;
    let mut submissions = Vec::new();
    let mut dropped = Vec::new();
    let mut taken_ids = HashSet::new();

    while let Some(field) = multipart.next_field().await.map_err(invalid_multipart)? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "job_description" => job_description = field.text().await.map_err(invalid_multipart)?,
            "company_name" => company_name = non_blank(field.text().await.map_err(invalid_multipart)?),
            "job_title" => job_title = non_blank(field.text().await.map_err(invalid_multipart)?),
            "resumes" => {
                let file_name = field.file_name().unwrap_or("resume").to_string();
                let bytes = field.bytes().await.map_err(invalid_multipart)?;

                let Some(format) = DocumentFormat::from_file_name(&file_name) else {
                    warn!("Dropping '{file_name}': unsupported file type");
                    dropped.push(DroppedDocument {
                        file_name,
                        reason: "unsupported file type (use PDF, DOCX or TXT)".to_string(),
                    });
                    continue;
                };

                match extract_text(bytes, format).await {
                    Ok(raw_text) => {
                        let id = unique_submission_id(&file_name, &mut taken_ids);
                        info!("Processed '{file_name}' as submission '{id}'");
                        submissions.push(CandidateSubmission { id, raw_text });
                    }
                    Err(e) => {
                        warn!("Dropping '{file_name}': {e}");
                        dropped.push(DroppedDocument {
                            file_name,
                            reason: e.to_string(),
                        });
                    }
                }
            }
            other => debug!("Ignoring unknown multipart field '{other}'"),
        }
    }

    if submissions.is_empty() && !dropped.is_empty() {
        return Err(AppError::UnprocessableEntity(format!(
            "none of the {} uploaded documents could be read",
            dropped.len()
        )));
    }

    let response = screen_and_persist(
        &state,
        ScreeningRecordInput {
            company_name,
            job_title,
            job_description,
            submissions,
        },
        dropped,
    )
    .await?;
    Ok(Json(response))
}

/// GET /api/v1/screenings/:id
pub async fn handle_get_screening(
    State(state): State<AppState>,
    Path(screening_id): Path<Uuid>,
) -> Result<Json<StoredScreening>, AppError> {
    let screening = load_screening(&state, screening_id).await?;
    Ok(Json(screening))
}

/// GET /api/v1/screenings/:id/export
///
/// Returns the stored ranking as a CSV attachment.
pub async fn handle_export_screening(
    State(state): State<AppState>,
    Path(screening_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let screening = load_screening(&state, screening_id).await?;
    let csv = write_csv(&to_display_rows(&screening.ranked))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to write CSV: {e}")))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"screening_{screening_id}.csv\""),
            ),
        ],
        csv,
    ))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

struct ScreeningRecordInput {
    company_name: Option<String>,
    job_title: Option<String>,
    job_description: String,
    submissions: Vec<CandidateSubmission>,
}

/// Runs the pipeline, then persists. A failed save is logged and the ranking
/// is still returned, with no `screening_id`.
async fn screen_and_persist(
    state: &AppState,
    input: ScreeningRecordInput,
    dropped_documents: Vec<DroppedDocument>,
) -> Result<ScreeningResponse, AppError> {
    let request = ScoringRequest {
        job_description: input.job_description,
        submissions: input.submissions,
    };
    let result = run_screening(
        state.scorer.as_ref(),
        &request,
        state.config.scoring_timeout(),
    )
    .await?;

    let record = ScreeningRecord {
        company_name: input.company_name,
        job_title: input.job_title,
        job_description: request.job_description,
        submissions: request.submissions,
        result,
        created_at: Utc::now(),
    };

    let screening_id = match state.store.save(&record).await {
        Ok(id) => Some(id),
        Err(e) => {
            warn!("Could not persist screening results: {e:#}");
            None
        }
    };

    let ScreeningRecord {
        submissions,
        result,
        ..
    } = record;

    Ok(ScreeningResponse {
        screening_id,
        total_candidates: submissions.len(),
        ranked: result.ranked,
        failures: result.failures,
        dropped_documents,
    })
}

async fn load_screening(state: &AppState, screening_id: Uuid) -> Result<StoredScreening, AppError> {
    state
        .store
        .load(screening_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Screening {screening_id} not found")))
}

fn invalid_multipart(err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("invalid multipart body: {err}"))
}

fn non_blank(text: String) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
