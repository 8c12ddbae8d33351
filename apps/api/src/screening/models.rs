//! Screening data model — the interchange format shared by the pipeline,
//! persistence, and export layers.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Placeholder stored when the backend could not find a candidate email.
pub const EMAIL_NOT_PROVIDED: &str = "not_provided";

/// One résumé entering the pipeline. `id` is unique within a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSubmission {
    pub id: String,
    pub raw_text: String,
}

/// A job description plus the ordered submissions to score against it.
/// Built fresh per invocation; nothing here is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringRequest {
    pub job_description: String,
    pub submissions: Vec<CandidateSubmission>,
}

// ────────────────────────────────────────────────────────────────────────────
// Recommendation
// ────────────────────────────────────────────────────────────────────────────

/// Backend verdict for a candidate. Variant order is the ranking order:
/// `StrongMatch < GoodMatch < WeakMatch` (smaller is better).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "Strong Match")]
    StrongMatch,
    #[serde(rename = "Good Match")]
    GoodMatch,
    #[serde(rename = "Weak Match")]
    WeakMatch,
}

impl Recommendation {
    pub const ALL: [Recommendation; 3] = [
        Recommendation::StrongMatch,
        Recommendation::GoodMatch,
        Recommendation::WeakMatch,
    ];

    /// The exact label the backend is instructed to emit.
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::StrongMatch => "Strong Match",
            Recommendation::GoodMatch => "Good Match",
            Recommendation::WeakMatch => "Weak Match",
        }
    }

    /// Maps a loosely-written label to the nearest variant.
    ///
    /// Comparison ignores case, whitespace, `_` and `-`, then matches on the
    /// leading word (`strong…`, `good…`, `weak…`). Returns `None` when nothing
    /// matches.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized: String = label
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        if normalized.starts_with("strong") {
            Some(Recommendation::StrongMatch)
        } else if normalized.starts_with("good") {
            Some(Recommendation::GoodMatch)
        } else if normalized.starts_with("weak") {
            Some(Recommendation::WeakMatch)
        } else {
            None
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Years of experience
// ────────────────────────────────────────────────────────────────────────────

/// Years of experience as reported by the backend: a number, or `"unknown"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum YearsOfExperience {
    Known(f64),
    Unknown,
}

impl YearsOfExperience {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            YearsOfExperience::Known(years) => Some(*years),
            YearsOfExperience::Unknown => None,
        }
    }
}

impl From<Option<f64>> for YearsOfExperience {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(years) if years.is_finite() && years >= 0.0 => YearsOfExperience::Known(years),
            _ => YearsOfExperience::Unknown,
        }
    }
}

impl fmt::Display for YearsOfExperience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearsOfExperience::Known(years) => write!(f, "{years}"),
            YearsOfExperience::Unknown => f.write_str("unknown"),
        }
    }
}

impl Serialize for YearsOfExperience {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            YearsOfExperience::Known(years) => serializer.serialize_f64(*years),
            YearsOfExperience::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

impl<'de> Deserialize<'de> for YearsOfExperience {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(years) => YearsOfExperience::from(Some(years)),
            Raw::Text(text) => YearsOfExperience::from(text.trim().parse::<f64>().ok()),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline output
// ────────────────────────────────────────────────────────────────────────────

/// A validated assessment of one candidate.
///
/// `match_score` is always within 0..=100. `score_adjusted` is set when the
/// backend's value was missing, non-numeric, or clamped;
/// `recommendation_adjusted` when the verdict label had to be defaulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub candidate_name: String,
    pub candidate_email: String,
    pub match_score: u8,
    pub matched_skills: BTreeSet<String>,
    pub missing_skills: BTreeSet<String>,
    pub experience_fit: String,
    pub recommendation: Recommendation,
    pub reasoning: String,
    pub years_of_experience: YearsOfExperience,
    pub source_index: usize,
    #[serde(default)]
    pub score_adjusted: bool,
    #[serde(default)]
    pub recommendation_adjusted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_id: Option<String>,
}

/// Why a record could not become a `ScoredCandidate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    NotJSON,
    SchemaViolation,
    EmptyResponse,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::NotJSON => "NotJSON",
            FailureReason::SchemaViolation => "SchemaViolation",
            FailureReason::EmptyResponse => "EmptyResponse",
        }
    }

    pub fn from_str_opt(value: &str) -> Option<Self> {
        match value {
            "NotJSON" => Some(FailureReason::NotJSON),
            "SchemaViolation" => Some(FailureReason::SchemaViolation),
            "EmptyResponse" => Some(FailureReason::EmptyResponse),
            _ => None,
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record-level failure. `source_index` is `None` when the failure cannot be
/// attributed to any submission (e.g. a whole-batch `NotJSON`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseFailure {
    pub source_index: Option<usize>,
    pub raw_fragment: String,
    pub reason: FailureReason,
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_id: Option<String>,
}

/// Terminal output of the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub ranked: Vec<ScoredCandidate>,
    pub failures: Vec<ParseFailure>,
}

impl RankedResult {
    /// Fills `submission_id` on every candidate and failure whose
    /// `source_index` points into `submissions`.
    pub fn with_submission_ids(mut self, submissions: &[CandidateSubmission]) -> Self {
        for candidate in &mut self.ranked {
            candidate.submission_id = submissions
                .get(candidate.source_index)
                .map(|s| s.id.clone());
        }
        for failure in &mut self.failures {
            failure.submission_id = failure
                .source_index
                .and_then(|i| submissions.get(i))
                .map(|s| s.id.clone());
        }
        self
    }
}
