use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScreeningRow {
    pub id: Uuid,
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    pub job_description: String,
    pub total_candidates: i32,
    pub failed_records: i32,
    pub top_candidate: Option<String>,
    pub top_candidate_score: Option<i16>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScreeningResultRow {
    pub id: Uuid,
    pub screening_id: Uuid,
    pub rank: i32,
    pub source_index: i32,
    pub submission_id: Option<String>,
    pub candidate_name: String,
    pub candidate_email: String,
    pub match_score: i16,
    pub score_adjusted: bool,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub experience_fit: String,
    pub recommendation: String,
    pub recommendation_adjusted: bool,
    pub reasoning: String,
    pub years_of_experience: Option<f64>,
    pub resume_s3_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScreeningFailureRow {
    pub id: Uuid,
    pub screening_id: Uuid,
    pub position: i32,
    pub source_index: Option<i32>,
    pub submission_id: Option<String>,
    pub reason: String,
    pub detail: String,
    pub raw_fragment: String,
}
