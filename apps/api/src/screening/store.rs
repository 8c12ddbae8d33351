//! Persistence of finished screenings (Postgres rows + raw résumé text in S3).
//!
//! The pipeline never depends on a save succeeding: callers log a failed
//! save and still return the ranking.

use std::future::Future;

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::screening::{ScreeningFailureRow, ScreeningResultRow, ScreeningRow};
use crate::screening::models::{
    CandidateSubmission, FailureReason, ParseFailure, RankedResult, Recommendation,
    ScoredCandidate, YearsOfExperience,
};

/// Everything persisted for one screening run.
#[derive(Debug, Clone)]
pub struct ScreeningRecord {
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    pub job_description: String,
    pub submissions: Vec<CandidateSubmission>,
    pub result: RankedResult,
    pub created_at: DateTime<Utc>,
}

/// A screening read back from storage.
#[derive(Debug, Clone, Serialize)]
pub struct StoredScreening {
    pub id: Uuid,
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    pub job_description: String,
    pub total_candidates: usize,
    pub created_at: DateTime<Utc>,
    pub ranked: Vec<ScoredCandidate>,
    pub failures: Vec<ParseFailure>,
}

#[async_trait]
pub trait ScreeningStore: Send + Sync {
    async fn save(&self, record: &ScreeningRecord) -> Result<Uuid>;
    async fn load(&self, id: Uuid) -> Result<Option<StoredScreening>>;
}

// ────────────────────────────────────────────────────────────────────────────
// SqlScreeningStore
// ────────────────────────────────────────────────────────────────────────────

pub struct SqlScreeningStore {
    pool: PgPool,
    s3: aws_sdk_s3::Client,
    bucket: String,
}

impl SqlScreeningStore {
    pub fn new(pool: PgPool, s3: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { pool, s3, bucket }
    }

    /// Uploads every submission's raw text at once. Returns one object key per
    /// submission, `None` where the upload failed.
    async fn upload_resumes(
        &self,
        screening_id: Uuid,
        submissions: &[CandidateSubmission],
    ) -> Vec<Option<String>> {
        upload_concurrently(submissions, |index, submission| {
            let key = resume_key(screening_id, index, &submission.id);
            let request = self
                .s3
                .put_object()
                .bucket(&self.bucket)
                .key(&key)
                .body(ByteStream::from(submission.raw_text.clone().into_bytes()))
                .content_type("text/plain; charset=utf-8");
            async move {
                request
                    .send()
                    .await
                    .map_err(|e| anyhow::anyhow!("S3 upload failed: {e}"))?;
                Ok(key)
            }
        })
        .await
    }
}

/// Runs one upload task per submission and collects keys in submission order.
async fn upload_concurrently<F, Fut>(
    submissions: &[CandidateSubmission],
    upload: F,
) -> Vec<Option<String>>
where
    F: Fn(usize, &CandidateSubmission) -> Fut,
    Fut: Future<Output = Result<String>> + Send + 'static,
{
    let mut tasks = JoinSet::new();
    for (index, submission) in submissions.iter().enumerate() {
        let id = submission.id.clone();
        let upload = upload(index, submission);
        tasks.spawn(async move { (index, id, upload.await) });
    }

    let mut keys = vec![None; submissions.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, _, Ok(key))) => keys[index] = Some(key),
            // A failed upload only loses the link on the result row.
            Ok((_, id, Err(e))) => warn!("Could not upload resume '{id}': {e:#}"),
            Err(e) => warn!("Resume upload task failed: {e}"),
        }
    }
    keys
}

#[async_trait]
impl ScreeningStore for SqlScreeningStore {
    async fn save(&self, record: &ScreeningRecord) -> Result<Uuid> {
        let screening_id = Uuid::new_v4();

        // 1. Raw résumé text
        let resume_keys = self
            .upload_resumes(screening_id, &record.submissions)
            .await;

        let ranked = &record.result.ranked;
        let failures = &record.result.failures;
        let top = ranked.first();

        // 2. Rows, in one transaction
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO screenings
                (id, company_name, job_title, job_description, total_candidates,
                 failed_records, top_candidate, top_candidate_score, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(screening_id)
        .bind(&record.company_name)
        .bind(&record.job_title)
        .bind(&record.job_description)
        .bind(record.submissions.len() as i32)
        .bind(failures.len() as i32)
        .bind(top.map(|c| c.candidate_name.as_str()))
        .bind(top.map(|c| c.match_score as i16))
        .bind(record.created_at)
        .execute(&mut *tx)
        .await
        .context("Failed to insert screening")?;

        for (position, candidate) in ranked.iter().enumerate() {
            let resume_key = resume_keys
                .get(candidate.source_index)
                .cloned()
                .flatten();

            sqlx::query(
                r#"
                INSERT INTO screening_results
                    (id, screening_id, rank, source_index, submission_id, candidate_name,
                     candidate_email, match_score, score_adjusted, matched_skills,
                     missing_skills, experience_fit, recommendation, recommendation_adjusted,
                     reasoning, years_of_experience, resume_s3_key)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(screening_id)
            .bind((position + 1) as i32)
            .bind(candidate.source_index as i32)
            .bind(&candidate.submission_id)
            .bind(&candidate.candidate_name)
            .bind(&candidate.candidate_email)
            .bind(candidate.match_score as i16)
            .bind(candidate.score_adjusted)
            .bind(candidate.matched_skills.iter().cloned().collect::<Vec<_>>())
            .bind(candidate.missing_skills.iter().cloned().collect::<Vec<_>>())
            .bind(&candidate.experience_fit)
            .bind(candidate.recommendation.as_str())
            .bind(candidate.recommendation_adjusted)
            .bind(&candidate.reasoning)
            .bind(candidate.years_of_experience.as_f64())
            .bind(resume_key)
            .execute(&mut *tx)
            .await
            .context("Failed to insert screening result")?;
        }

        for (position, failure) in failures.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO screening_failures
                    (id, screening_id, position, source_index, submission_id,
                     reason, detail, raw_fragment)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(screening_id)
            .bind(position as i32)
            .bind(failure.source_index.map(|i| i as i32))
            .bind(&failure.submission_id)
            .bind(failure.reason.as_str())
            .bind(&failure.detail)
            .bind(&failure.raw_fragment)
            .execute(&mut *tx)
            .await
            .context("Failed to insert screening failure")?;
        }

        tx.commit().await?;

        info!(
            "Saved screening {} ({} ranked, {} failures)",
            screening_id,
            ranked.len(),
            failures.len()
        );
        Ok(screening_id)
    }

    async fn load(&self, id: Uuid) -> Result<Option<StoredScreening>> {
        let Some(screening) =
            sqlx::query_as::<_, ScreeningRow>("SELECT * FROM screenings WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
        else {
            return Ok(None);
        };

        let results = sqlx::query_as::<_, ScreeningResultRow>(
            "SELECT * FROM screening_results WHERE screening_id = $1 ORDER BY rank",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let failures = sqlx::query_as::<_, ScreeningFailureRow>(
            "SELECT * FROM screening_failures WHERE screening_id = $1 ORDER BY position",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(StoredScreening {
            id: screening.id,
            company_name: screening.company_name,
            job_title: screening.job_title,
            job_description: screening.job_description,
            total_candidates: screening.total_candidates.max(0) as usize,
            created_at: screening.created_at,
            ranked: results.into_iter().map(candidate_from_row).collect(),
            failures: failures.into_iter().map(failure_from_row).collect(),
        }))
    }
}

/// `resumes/{screening_id}/{index}-{id}.txt`, with path-unsafe characters replaced.
fn resume_key(screening_id: Uuid, index: usize, submission_id: &str) -> String {
    let safe_id: String = submission_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("resumes/{screening_id}/{index}-{safe_id}.txt")
}

fn candidate_from_row(row: ScreeningResultRow) -> ScoredCandidate {
    ScoredCandidate {
        candidate_name: row.candidate_name,
        candidate_email: row.candidate_email,
        match_score: row.match_score.clamp(0, 100) as u8,
        matched_skills: row.matched_skills.into_iter().collect(),
        missing_skills: row.missing_skills.into_iter().collect(),
        experience_fit: row.experience_fit,
        recommendation: Recommendation::from_label(&row.recommendation)
            .unwrap_or(Recommendation::WeakMatch),
        reasoning: row.reasoning,
        years_of_experience: YearsOfExperience::from(row.years_of_experience),
        source_index: row.source_index.max(0) as usize,
        score_adjusted: row.score_adjusted,
        recommendation_adjusted: row.recommendation_adjusted,
        submission_id: row.submission_id,
    }
}

fn failure_from_row(row: ScreeningFailureRow) -> ParseFailure {
    ParseFailure {
        source_index: row.source_index.map(|i| i.max(0) as usize),
        raw_fragment: row.raw_fragment,
        reason: FailureReason::from_str_opt(&row.reason).unwrap_or(FailureReason::SchemaViolation),
        detail: row.detail,
        submission_id: row.submission_id,
    }
}
