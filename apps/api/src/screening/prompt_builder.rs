//! Prompt Builder — turns a job description and ordered submissions into the
//! single scoring prompt sent to the backend.
//!
//! Each submission is wrapped in `=== RESUME N (id: …) ===` markers, where `N`
//! is the 1-based position in the submission list. The backend is told to echo
//! `N` as `resume_number`, which the validator uses to recover `source_index`.

use std::collections::HashSet;

use crate::screening::models::{CandidateSubmission, Recommendation};
use crate::screening::pipeline::ScreeningError;
use crate::screening::prompts::{
    RESUMES_HEADING, RESUME_BLOCK_END, RESUME_BLOCK_START, SCORING_OUTPUT_INSTRUCTIONS,
    SCORING_PROMPT_HEADER,
};

/// Builds the scoring prompt. Pure; fails only on invalid input.
pub fn build_prompt(
    job_description: &str,
    submissions: &[CandidateSubmission],
) -> Result<String, ScreeningError> {
    if job_description.trim().is_empty() {
        return Err(ScreeningError::InvalidInput(
            "job description cannot be empty".to_string(),
        ));
    }
    if submissions.is_empty() {
        return Err(ScreeningError::InvalidInput(
            "at least one candidate submission is required".to_string(),
        ));
    }

    let mut seen = HashSet::with_capacity(submissions.len());
    for submission in submissions {
        if !seen.insert(submission.id.as_str()) {
            return Err(ScreeningError::InvalidInput(format!(
                "duplicate submission id '{}'",
                submission.id
            )));
        }
    }

    let resume_count = submissions.len().to_string();
    let body_len: usize = submissions.iter().map(|s| s.raw_text.len() + 64).sum();

    // Pieces are appended rather than substituted so that user text can
    // never be mistaken for a template placeholder.
    let mut prompt = String::with_capacity(
        SCORING_PROMPT_HEADER.len()
            + job_description.len()
            + body_len
            + SCORING_OUTPUT_INSTRUCTIONS.len(),
    );
    prompt.push_str(SCORING_PROMPT_HEADER);
    prompt.push_str(job_description.trim());
    prompt.push_str("\n\n");
    prompt.push_str(&RESUMES_HEADING.replace("{resume_count}", &resume_count));

    for (index, submission) in submissions.iter().enumerate() {
        let label = (index + 1).to_string();
        prompt.push('\n');
        prompt.push_str(
            &RESUME_BLOCK_START
                .replace("{label}", &label)
                .replace("{id}", &submission.id),
        );
        prompt.push('\n');
        prompt.push_str(submission.raw_text.trim());
        prompt.push('\n');
        prompt.push_str(&RESUME_BLOCK_END.replace("{label}", &label));
        prompt.push('\n');
    }

    let recommendations = Recommendation::ALL
        .iter()
        .map(|r| format!("\"{}\"", r.as_str()))
        .collect::<Vec<_>>()
        .join(" / ");

    prompt.push('\n');
    prompt.push_str(
        &SCORING_OUTPUT_INSTRUCTIONS
            .replace("{resume_count}", &resume_count)
            .replace("{recommendations}", &recommendations),
    );

    Ok(prompt)
}
