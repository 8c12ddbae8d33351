//! Record Validator — coerces each extracted record into a `ScoredCandidate`
//! or a `ParseFailure`. Never aborts the batch.
//!
//! Flow:
//! 1. Parse the payload as a JSON array. If that fails, split it into
//!    top-level `{…}` fragments and parse each one on its own, so a single
//!    broken record does not take its siblings down with it.
//! 2. Validate every record field by field, defaulting what can be defaulted.
//! 3. Resolve `source_index` from the `resume_number` label echoed by the
//!    backend, never from array position.
//! 4. Report every submission that received no record as `EmptyResponse`.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::screening::extractor::preview;
use crate::screening::models::{
    FailureReason, ParseFailure, RankedResult, Recommendation, ScoredCandidate,
    YearsOfExperience, EMAIL_NOT_PROVIDED,
};
use crate::screening::ranking::rank;

/// Upper bound on `ParseFailure.raw_fragment`, in characters.
const MAX_FRAGMENT_CHARS: usize = 2000;

/// 1-based label field echoed by the backend (see prompt_builder).
const LABEL_FIELD: &str = "resume_number";
/// 0-based fallback so serialized `ScoredCandidate`s validate back to themselves.
const INDEX_FIELD: &str = "source_index";

/// Validates an extracted payload against `expected_count` submissions.
/// Valid candidates come back ranked; failures in discovery order followed by
/// one `EmptyResponse` per submission nothing was returned for.
pub fn validate_batch(payload: &str, expected_count: usize) -> RankedResult {
    let mut batch = Batch::new(expected_count);

    match serde_json::from_str::<Value>(payload) {
        Ok(Value::Array(records)) => {
            for record in records {
                batch.accept(record);
            }
        }
        Ok(other) => batch.fail(
            None,
            &other.to_string(),
            FailureReason::SchemaViolation,
            "payload is not an array of records".to_string(),
        ),
        Err(err) => {
            let fragments = split_record_fragments(payload);
            if fragments.is_empty() {
                return RankedResult {
                    ranked: vec![],
                    failures: vec![ParseFailure {
                        source_index: None,
                        raw_fragment: preview(payload, MAX_FRAGMENT_CHARS),
                        reason: FailureReason::NotJSON,
                        detail: format!("payload is not valid JSON: {err}"),
                        submission_id: None,
                    }],
                };
            }

            for fragment in fragments {
                let hint = batch.label_hint(fragment.text);
                if !fragment.complete {
                    batch.fail(
                        hint,
                        fragment.text,
                        FailureReason::NotJSON,
                        "record is truncated".to_string(),
                    );
                    continue;
                }
                match serde_json::from_str::<Value>(fragment.text) {
                    Ok(record) => batch.accept(record),
                    Err(e) => batch.fail(
                        hint,
                        fragment.text,
                        FailureReason::NotJSON,
                        format!("record is not valid JSON: {e}"),
                    ),
                }
            }
        }
    }

    batch.finish()
}

// ────────────────────────────────────────────────────────────────────────────
// Batch accumulator
// ────────────────────────────────────────────────────────────────────────────

struct Batch {
    expected_count: usize,
    /// Index already produced a `ScoredCandidate`.
    scored: Vec<bool>,
    /// Index is referenced by a candidate or a failure.
    accounted: Vec<bool>,
    candidates: Vec<ScoredCandidate>,
    failures: Vec<ParseFailure>,
}

impl Batch {
    fn new(expected_count: usize) -> Self {
        Self {
            expected_count,
            scored: vec![false; expected_count],
            accounted: vec![false; expected_count],
            candidates: Vec::with_capacity(expected_count),
            failures: Vec::new(),
        }
    }

    fn accept(&mut self, record: Value) {
        let map = match record {
            Value::Object(map) if !map.is_empty() => map,
            empty @ (Value::Object(_) | Value::Null) => {
                return self.fail(
                    None,
                    &empty.to_string(),
                    FailureReason::EmptyResponse,
                    "record is empty".to_string(),
                );
            }
            other => {
                return self.fail(
                    None,
                    &other.to_string(),
                    FailureReason::SchemaViolation,
                    "record is not an object".to_string(),
                );
            }
        };

        let source_index = match self.resolve_label(&map) {
            Ok(index) => index,
            Err(detail) => {
                return self.fail(
                    None,
                    &Value::Object(map).to_string(),
                    FailureReason::SchemaViolation,
                    detail,
                );
            }
        };

        if self.scored[source_index] {
            return self.fail(
                Some(source_index),
                &Value::Object(map).to_string(),
                FailureReason::SchemaViolation,
                format!("duplicate record for resume {}", source_index + 1),
            );
        }

        match coerce_candidate(&map, source_index) {
            Ok(candidate) => {
                self.scored[source_index] = true;
                self.accounted[source_index] = true;
                self.candidates.push(candidate);
            }
            Err(detail) => self.fail(
                Some(source_index),
                &Value::Object(map).to_string(),
                FailureReason::SchemaViolation,
                detail,
            ),
        }
    }

    fn fail(
        &mut self,
        source_index: Option<usize>,
        fragment: &str,
        reason: FailureReason,
        detail: String,
    ) {
        if let Some(index) = source_index {
            self.accounted[index] = true;
        }
        self.failures.push(ParseFailure {
            source_index,
            raw_fragment: preview(fragment, MAX_FRAGMENT_CHARS),
            reason,
            detail,
            submission_id: None,
        });
    }

    /// Maps the record's label to a 0-based submission index.
    fn resolve_label(&self, map: &Map<String, Value>) -> Result<usize, String> {
        if let Some(value) = map.get(LABEL_FIELD) {
            let label = match value {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => parse_label_text(s),
                _ => None,
            }
            .ok_or_else(|| format!("{LABEL_FIELD} {value} is not a resume number"))?;

            return self.index_for_label(label).ok_or_else(|| {
                format!(
                    "{LABEL_FIELD} {label} does not match any of the {} submissions",
                    self.expected_count
                )
            });
        }

        if let Some(value) = map.get(INDEX_FIELD) {
            return value
                .as_u64()
                .and_then(|i| usize::try_from(i).ok())
                .filter(|i| *i < self.expected_count)
                .ok_or_else(|| {
                    format!(
                        "{INDEX_FIELD} {value} does not match any of the {} submissions",
                        self.expected_count
                    )
                });
        }

        Err(format!("record has no {LABEL_FIELD} label"))
    }

    fn index_for_label(&self, label: u64) -> Option<usize> {
        usize::try_from(label)
            .ok()
            .filter(|l| (1..=self.expected_count).contains(l))
            .map(|l| l - 1)
    }

    /// Best-effort label lookup in text that failed to parse.
    fn label_hint(&self, text: &str) -> Option<usize> {
        let key = format!("\"{LABEL_FIELD}\"");
        let after_key = &text[text.find(&key)? + key.len()..];
        let after_colon = after_key.trim_start().strip_prefix(':')?.trim_start();
        let raw = after_colon
            .split(|c: char| c == ',' || c == '}' || c == '\n')
            .next()?
            .trim()
            .trim_matches('"');
        self.index_for_label(parse_label_text(raw)?)
    }

    fn finish(mut self) -> RankedResult {
        self.attribute_lone_orphan();

        for index in 0..self.expected_count {
            if !self.accounted[index] {
                self.failures.push(ParseFailure {
                    source_index: Some(index),
                    raw_fragment: String::new(),
                    reason: FailureReason::EmptyResponse,
                    detail: format!("no record returned for resume {}", index + 1),
                    submission_id: None,
                });
            }
        }

        RankedResult {
            ranked: rank(self.candidates),
            failures: self.failures,
        }
    }
}

impl Batch {
    /// When exactly one submission is unaccounted for and exactly one
    /// unreadable record carries no label, that record belongs to that
    /// submission. Any other combination stays unattributed, and each missing
    /// submission is reported separately as `EmptyResponse`.
    fn attribute_lone_orphan(&mut self) {
        let mut missing = (0..self.expected_count).filter(|&i| !self.accounted[i]);
        let (Some(index), None) = (missing.next(), missing.next()) else {
            return;
        };

        let mut orphans = self
            .failures
            .iter_mut()
            .filter(|f| f.source_index.is_none() && f.reason == FailureReason::NotJSON);
        if let (Some(orphan), None) = (orphans.next(), orphans.next()) {
            orphan.source_index = Some(index);
            self.accounted[index] = true;
        }
    }
}

/// Accepts `"2"`, `"#2"`, `"RESUME 2"`, `"Resume #2"`.
fn parse_label_text(text: &str) -> Option<u64> {
    let text = text.trim();
    let text = match text.get(..6) {
        Some(prefix) if prefix.eq_ignore_ascii_case("resume") => &text[6..],
        _ => text,
    };
    text.trim().trim_start_matches('#').trim().parse().ok()
}

// ────────────────────────────────────────────────────────────────────────────
// Field coercion
// ────────────────────────────────────────────────────────────────────────────

fn coerce_candidate(
    map: &Map<String, Value>,
    source_index: usize,
) -> Result<ScoredCandidate, String> {
    let candidate_name = non_blank_str(map.get("candidate_name"))
        .ok_or_else(|| "candidate_name is missing or not a string".to_string())?;

    let candidate_email = non_blank_str(map.get("candidate_email"))
        .unwrap_or(EMAIL_NOT_PROVIDED)
        .to_string();

    let (match_score, score_adjusted) = coerce_score(map.get("match_score"));
    let (recommendation, recommendation_adjusted) =
        coerce_recommendation(map.get("recommendation"));

    Ok(ScoredCandidate {
        candidate_name: candidate_name.to_string(),
        candidate_email,
        match_score,
        matched_skills: coerce_skills(map.get("matched_skills")),
        missing_skills: coerce_skills(map.get("missing_skills")),
        experience_fit: text_or_empty(map.get("experience_fit")),
        recommendation,
        reasoning: text_or_empty(map.get("reasoning")),
        years_of_experience: coerce_years(map.get("years_of_experience")),
        source_index,
        score_adjusted,
        recommendation_adjusted,
        submission_id: None,
    })
}

fn non_blank_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn text_or_empty(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

/// Returns the score within 0..=100 and whether it had to be adjusted.
fn coerce_score(value: Option<&Value>) -> (u8, bool) {
    let Some(score) = value.and_then(as_number) else {
        return (0, true);
    };

    // Range is checked on the raw value so 100.4 or -0.3 still count as clamped.
    if score < 0.0 {
        (0, true)
    } else if score > 100.0 {
        (100, true)
    } else {
        (score.round() as u8, false)
    }
}

fn coerce_recommendation(value: Option<&Value>) -> (Recommendation, bool) {
    match value.and_then(Value::as_str).and_then(Recommendation::from_label) {
        Some(recommendation) => (recommendation, false),
        None => (Recommendation::WeakMatch, true),
    }
}

fn coerce_skills(value: Option<&Value>) -> BTreeSet<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn coerce_years(value: Option<&Value>) -> YearsOfExperience {
    YearsOfExperience::from(value.and_then(as_number))
}

// ────────────────────────────────────────────────────────────────────────────
// Fragment recovery
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq)]
struct Fragment<'a> {
    text: &'a str,
    /// False when the payload ended before the object closed.
    complete: bool,
}

/// Where record scanning begins: the first `{` that directly follows a `[`,
/// or the start of the payload when there is none. Prose ahead of the array
/// may hold an unbalanced `"`, which would otherwise flip string tracking for
/// everything after it.
fn record_scan_start(payload: &str) -> usize {
    payload
        .match_indices('{')
        .map(|(i, _)| i)
        .find(|&i| payload[..i].trim_end().ends_with('['))
        .unwrap_or(0)
}

/// Splits a payload into its top-level `{…}` objects. String-aware, so braces
/// inside string values are ignored. Brackets are not tracked.
fn split_record_fragments(payload: &str) -> Vec<Fragment<'_>> {
    let payload = &payload[record_scan_start(payload)..];
    let mut fragments = Vec::new();
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escaped = false;

    // Structural characters are ASCII, so byte offsets are char boundaries.
    for (i, byte) in payload.bytes().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            b'}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(s) = start.take() {
                        fragments.push(Fragment {
                            text: &payload[s..=i],
                            complete: true,
                        });
                    }
                }
            }
            _ => {}
        }
    }

    if let Some(s) = start {
        fragments.push(Fragment {
            text: &payload[s..],
            complete: false,
        });
    }

    fragments
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(label: u64, name: &str, score: Value) -> Value {
        json!({
            "resume_number": label,
            "candidate_name": name,
            "candidate_email": format!("{}@example.com", name.to_lowercase()),
            "match_score": score,
            "matched_skills": ["Rust", "Tokio"],
            "missing_skills": ["Kafka"],
            "experience_fit": "Solid backend background",
            "recommendation": "Good Match",
            "reasoning": "Strong Rust experience, no streaming exposure.",
            "years_of_experience": 4
        })
    }

    fn payload(records: Vec<Value>) -> String {
        serde_json::to_string(&Value::Array(records)).unwrap()
    }

    #[test]
    fn test_valid_record_round_trips_field_for_field() {
        let input = json!([{
            "candidate_name": "Ada Lovelace",
            "candidate_email": "ada@example.com",
            "match_score": 91,
            "matched_skills": ["Rust", "Distributed systems"],
            "missing_skills": ["Kubernetes"],
            "experience_fit": "Exceeds seniority bar",
            "recommendation": "Strong Match",
            "reasoning": "Deep systems work.",
            "years_of_experience": 9.5,
            "source_index": 1
        }]);

        let result = validate_batch(&input.to_string(), 2);
        let ada = result
            .ranked
            .iter()
            .find(|c| c.candidate_name == "Ada Lovelace")
            .unwrap();

        assert_eq!(ada.candidate_email, "ada@example.com");
        assert_eq!(ada.match_score, 91);
        assert_eq!(
            ada.matched_skills,
            BTreeSet::from(["Rust".to_string(), "Distributed systems".to_string()])
        );
        assert_eq!(ada.missing_skills, BTreeSet::from(["Kubernetes".to_string()]));
        assert_eq!(ada.experience_fit, "Exceeds seniority bar");
        assert_eq!(ada.recommendation, Recommendation::StrongMatch);
        assert_eq!(ada.reasoning, "Deep systems work.");
        assert_eq!(ada.years_of_experience, YearsOfExperience::Known(9.5));
        assert_eq!(ada.source_index, 1);
        assert!(!ada.score_adjusted);
        assert!(!ada.recommendation_adjusted);
    }

    #[test]
    fn test_serialized_candidate_validates_back_to_itself() {
        let first = validate_batch(&payload(vec![record(1, "Ada", json!(77))]), 1);
        let serialized = serde_json::to_string(&first.ranked).unwrap();
        let second = validate_batch(&serialized, 1);
        assert_eq!(first, second);
    }

    #[test]
    fn test_non_numeric_score_defaults_to_zero_and_flags() {
        let result = validate_batch(
            &payload(vec![
                record(1, "Ada", json!(90)),
                record(2, "Bob", json!("excellent")),
                record(3, "Cy", json!(70)),
            ]),
            3,
        );

        assert_eq!(result.ranked.len(), 3);
        assert!(result.failures.is_empty());
        let bob = result
            .ranked
            .iter()
            .find(|c| c.candidate_name == "Bob")
            .unwrap();
        assert_eq!(bob.match_score, 0);
        assert!(bob.score_adjusted);
        assert_eq!(bob.source_index, 1);
    }

    #[test]
    fn test_missing_name_is_schema_violation_for_that_record_only() {
        let mut broken = record(2, "Bob", json!(80));
        broken.as_object_mut().unwrap().remove("candidate_name");

        let result = validate_batch(
            &payload(vec![
                record(1, "Ada", json!(90)),
                broken,
                record(3, "Cy", json!(70)),
            ]),
            3,
        );

        assert_eq!(result.ranked.len(), 2);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].reason, FailureReason::SchemaViolation);
        assert_eq!(result.failures[0].source_index, Some(1));
        assert!(result.failures[0].raw_fragment.contains("Good Match"));
    }

    #[test]
    fn test_blank_name_is_schema_violation() {
        let result = validate_batch(&payload(vec![record(1, "   ", json!(50))]), 1);
        assert!(result.ranked.is_empty());
        assert_eq!(result.failures[0].reason, FailureReason::SchemaViolation);
    }

    #[test]
    fn test_out_of_range_scores_are_clamped_and_flagged() {
        let result = validate_batch(
            &payload(vec![
                record(1, "Ada", json!(150)),
                record(2, "Bob", json!(-12)),
                record(3, "Cy", json!(88.6)),
            ]),
            3,
        );

        let score = |name: &str| {
            let c = result
                .ranked
                .iter()
                .find(|c| c.candidate_name == name)
                .unwrap();
            (c.match_score, c.score_adjusted)
        };
        assert_eq!(score("Ada"), (100, true));
        assert_eq!(score("Bob"), (0, true));
        assert_eq!(score("Cy"), (89, false));
    }

    #[test]
    fn test_fractional_scores_just_outside_range_are_flagged() {
        let result = validate_batch(
            &payload(vec![
                record(1, "Ada", json!(100.4)),
                record(2, "Bob", json!(-0.3)),
                record(3, "Cy", json!(99.6)),
            ]),
            3,
        );

        let score = |name: &str| {
            let c = result
                .ranked
                .iter()
                .find(|c| c.candidate_name == name)
                .unwrap();
            (c.match_score, c.score_adjusted)
        };
        assert_eq!(score("Ada"), (100, true));
        assert_eq!(score("Bob"), (0, true));
        assert_eq!(score("Cy"), (100, false));
    }

    #[test]
    fn test_numeric_string_score_is_accepted() {
        let result = validate_batch(&payload(vec![record(1, "Ada", json!("85%"))]), 1);
        assert_eq!(result.ranked[0].match_score, 85);
        assert!(!result.ranked[0].score_adjusted);
    }

    #[test]
    fn test_missing_score_defaults_to_zero_and_flags() {
        let mut r = record(1, "Ada", json!(0));
        r.as_object_mut().unwrap().remove("match_score");
        let result = validate_batch(&payload(vec![r]), 1);
        assert_eq!(result.ranked[0].match_score, 0);
        assert!(result.ranked[0].score_adjusted);
    }

    #[test]
    fn test_optional_fields_get_defaults() {
        let input = json!([{
            "resume_number": 1,
            "candidate_name": "Ada",
            "match_score": 60,
            "matched_skills": "Rust, Go",
            "recommendation": "Good Match",
            "years_of_experience": "a decade or so"
        }]);
        let result = validate_batch(&input.to_string(), 1);
        let ada = &result.ranked[0];

        assert_eq!(ada.candidate_email, EMAIL_NOT_PROVIDED);
        assert!(ada.matched_skills.is_empty());
        assert!(ada.missing_skills.is_empty());
        assert_eq!(ada.experience_fit, "");
        assert_eq!(ada.reasoning, "");
        assert_eq!(ada.years_of_experience, YearsOfExperience::Unknown);
        assert!(!ada.score_adjusted);
    }

    #[test]
    fn test_skills_skip_non_strings_and_blanks() {
        let input = json!([{
            "resume_number": 1,
            "candidate_name": "Ada",
            "match_score": 60,
            "matched_skills": ["Rust", 3, "", "  SQL ", null, "Rust"],
            "recommendation": "Good Match"
        }]);
        let result = validate_batch(&input.to_string(), 1);
        assert_eq!(
            result.ranked[0].matched_skills,
            BTreeSet::from(["Rust".to_string(), "SQL".to_string()])
        );
    }

    #[test]
    fn test_recommendation_maps_by_prefix_or_defaults_weak() {
        let mut strong = record(1, "Ada", json!(80));
        strong["recommendation"] = json!("STRONG_MATCH");
        let mut unknown = record(2, "Bob", json!(80));
        unknown["recommendation"] = json!("Hire immediately");
        let mut missing = record(3, "Cy", json!(80));
        missing.as_object_mut().unwrap().remove("recommendation");

        let result = validate_batch(&payload(vec![strong, unknown, missing]), 3);
        let find = |name: &str| {
            result
                .ranked
                .iter()
                .find(|c| c.candidate_name == name)
                .unwrap()
        };

        assert_eq!(find("Ada").recommendation, Recommendation::StrongMatch);
        assert!(!find("Ada").recommendation_adjusted);
        assert_eq!(find("Bob").recommendation, Recommendation::WeakMatch);
        assert!(find("Bob").recommendation_adjusted);
        assert_eq!(find("Cy").recommendation, Recommendation::WeakMatch);
        assert!(find("Cy").recommendation_adjusted);
    }

    #[test]
    fn test_source_index_comes_from_label_not_position() {
        let result = validate_batch(
            &payload(vec![
                record(3, "Cy", json!(50)),
                record(1, "Ada", json!(50)),
                record(2, "Bob", json!(50)),
            ]),
            3,
        );
        let index_of = |name: &str| {
            result
                .ranked
                .iter()
                .find(|c| c.candidate_name == name)
                .unwrap()
                .source_index
        };
        assert_eq!(index_of("Ada"), 0);
        assert_eq!(index_of("Bob"), 1);
        assert_eq!(index_of("Cy"), 2);
    }

    #[test]
    fn test_label_accepts_string_forms() {
        let mut a = record(0, "Ada", json!(50));
        a["resume_number"] = json!("RESUME 2");
        let mut b = record(0, "Bob", json!(50));
        b["resume_number"] = json!("#1");
        let result = validate_batch(&payload(vec![a, b]), 2);
        assert!(result.failures.is_empty());
        assert_eq!(result.ranked.len(), 2);
    }

    #[test]
    fn test_unmatched_label_is_schema_violation() {
        let mut unlabeled = record(1, "Bob", json!(70));
        unlabeled.as_object_mut().unwrap().remove("resume_number");

        let result = validate_batch(
            &payload(vec![record(1, "Ada", json!(90)), record(7, "Eve", json!(95)), unlabeled]),
            1,
        );

        assert_eq!(result.ranked.len(), 1);
        assert_eq!(result.failures.len(), 2);
        assert!(result
            .failures
            .iter()
            .all(|f| f.reason == FailureReason::SchemaViolation && f.source_index.is_none()));
    }

    #[test]
    fn test_duplicate_label_keeps_first_record() {
        let result = validate_batch(
            &payload(vec![record(1, "Ada", json!(90)), record(1, "Ada Again", json!(40))]),
            1,
        );
        assert_eq!(result.ranked.len(), 1);
        assert_eq!(result.ranked[0].candidate_name, "Ada");
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].source_index, Some(0));
        assert!(result.failures[0].detail.contains("duplicate"));
    }

    #[test]
    fn test_dropped_submission_reported_as_empty_response() {
        let result = validate_batch(
            &payload(vec![record(1, "Ada", json!(90)), record(3, "Cy", json!(70))]),
            3,
        );
        assert_eq!(result.ranked.len(), 2);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].reason, FailureReason::EmptyResponse);
        assert_eq!(result.failures[0].source_index, Some(1));
    }

    #[test]
    fn test_null_and_empty_records_are_empty_response() {
        let result = validate_batch(&payload(vec![json!(null), json!({})]), 0);
        assert_eq!(result.failures.len(), 2);
        assert!(result
            .failures
            .iter()
            .all(|f| f.reason == FailureReason::EmptyResponse));
    }

    #[test]
    fn test_non_object_record_is_schema_violation() {
        let result = validate_batch(r#"["Ada scored 90"]"#, 0);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].reason, FailureReason::SchemaViolation);
    }

    #[test]
    fn test_unrecoverable_payload_is_single_not_json_failure() {
        let result = validate_batch("[this is not json at all]", 3);
        assert!(result.ranked.is_empty());
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].reason, FailureReason::NotJSON);
        assert_eq!(result.failures[0].source_index, None);
        assert_eq!(result.failures[0].raw_fragment, "[this is not json at all]");
    }

    #[test]
    fn test_one_malformed_record_does_not_invalidate_siblings() {
        let raw = r#"[
            {"resume_number": 1, "candidate_name": "Ada", "match_score": 90, "recommendation": "Strong Match"},
            {"resume_number": 2, "candidate_name": "Bob", "match_score": 80,, "recommendation": "Good Match"},
            {"resume_number": 3, "candidate_name": "Cy {the third}", "match_score": 70, "recommendation": "Weak Match"}
        ]"#;

        let result = validate_batch(raw, 3);

        assert_eq!(result.ranked.len(), 2);
        assert_eq!(result.ranked[0].candidate_name, "Ada");
        assert_eq!(result.ranked[1].candidate_name, "Cy {the third}");
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].reason, FailureReason::NotJSON);
        assert_eq!(result.failures[0].source_index, Some(1));
    }

    #[test]
    fn test_truncated_payload_salvages_complete_records() {
        let raw = r#"[{"resume_number": 1, "candidate_name": "Ada", "match_score": 90, "matched_skills": ["Rust"]},
            {"resume_number": 2, "candidate_name": "Bob", "matched_skills": ["Go"]"#;

        let result = validate_batch(raw, 2);

        assert_eq!(result.ranked.len(), 1);
        assert_eq!(result.ranked[0].candidate_name, "Ada");
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].reason, FailureReason::NotJSON);
        assert_eq!(result.failures[0].source_index, Some(1));
        assert!(result.failures[0].detail.contains("truncated"));
    }

    #[test]
    fn test_stray_bracket_prose_is_recovered() {
        let raw = r#"[see notes]: [{"resume_number": 1, "candidate_name": "Ada", "match_score": 64}]"#;
        let result = validate_batch(raw, 1);
        assert_eq!(result.ranked.len(), 1);
        assert!(result.failures.is_empty());
    }

    #[test]
    fn test_unbalanced_quote_in_leading_prose_keeps_records() {
        let raw = r#"[note: 2" monitor] [{"resume_number": 1, "candidate_name": "Ada", "match_score": 80},
            {"resume_number": 2, "candidate_name": "Bob", "match_score": 70}]"#;

        let result = validate_batch(raw, 2);

        assert!(result.failures.is_empty(), "{:?}", result.failures);
        let names: Vec<_> = result
            .ranked
            .iter()
            .map(|c| c.candidate_name.as_str())
            .collect();
        assert_eq!(names, vec!["Ada", "Bob"]);
    }

    #[test]
    fn test_record_scan_starts_at_array_of_objects() {
        assert_eq!(record_scan_start(r#"[a "b] [ {"x": 1}]"#), 9);
        assert_eq!(record_scan_start(r#"{"x": 1}"#), 0);
        assert_eq!(record_scan_start("no records"), 0);
    }

    #[test]
    fn test_unlabeled_truncated_record_is_attributed_to_lone_missing_submission() {
        let raw = r#"[{"resume_number": 1, "candidate_name": "Ada", "match_score": 90},
            {"candidate_name": "Bob", "match_"#;

        let result = validate_batch(raw, 2);

        assert_eq!(result.ranked.len(), 1);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].reason, FailureReason::NotJSON);
        assert_eq!(result.failures[0].source_index, Some(1));
    }

    #[test]
    fn test_unlabeled_truncated_record_stays_unattributed_when_ambiguous() {
        let raw = r#"[{"resume_number": 1, "candidate_name": "Ada", "match_score": 90},
            {"candidate_name": "Bob", "match_"#;

        let result = validate_batch(raw, 3);

        assert_eq!(result.ranked.len(), 1);
        let reasons: Vec<_> = result
            .failures
            .iter()
            .map(|f| (f.reason, f.source_index))
            .collect();
        assert_eq!(
            reasons,
            vec![
                (FailureReason::NotJSON, None),
                (FailureReason::EmptyResponse, Some(1)),
                (FailureReason::EmptyResponse, Some(2)),
            ]
        );
    }

    #[test]
    fn test_non_array_payload_is_schema_violation() {
        let result = validate_batch(r#"{"candidate_name": "Ada"}"#, 0);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].reason, FailureReason::SchemaViolation);
    }

    #[test]
    fn test_result_is_ranked() {
        let result = validate_batch(
            &payload(vec![
                record(1, "Ada", json!(40)),
                record(2, "Bob", json!(95)),
                record(3, "Cy", json!(70)),
            ]),
            3,
        );
        let names: Vec<_> = result
            .ranked
            .iter()
            .map(|c| c.candidate_name.as_str())
            .collect();
        assert_eq!(names, vec!["Bob", "Cy", "Ada"]);
    }

    #[test]
    fn test_validate_batch_is_idempotent() {
        let raw = r#"[{"resume_number": 2, "candidate_name": "Bob", "match_score": "n/a"},
            {"resume_number": 1, "candidate_name": "Ada", "match_score": 70,}]"#;
        assert_eq!(validate_batch(raw, 3), validate_batch(raw, 3));
    }

    #[test]
    fn test_fragment_split_ignores_braces_in_strings() {
        let fragments = split_record_fragments(r#"[{"a": "}{"}, {"b": "\"{"}]"#);
        assert_eq!(
            fragments,
            vec![
                Fragment {
                    text: r#"{"a": "}{"}"#,
                    complete: true
                },
                Fragment {
                    text: r#"{"b": "\"{"}"#,
                    complete: true
                },
            ]
        );
    }

    #[test]
    fn test_parse_label_text_forms() {
        assert_eq!(parse_label_text("3"), Some(3));
        assert_eq!(parse_label_text("RESUME 3"), Some(3));
        assert_eq!(parse_label_text("resume #12"), Some(12));
        assert_eq!(parse_label_text("three"), None);
    }
}
