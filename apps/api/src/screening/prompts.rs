// All LLM prompt constants for the Screening module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Opening of every scoring prompt. The job description follows directly.
pub const SCORING_PROMPT_HEADER: &str = "You are an expert HR recruiter. \
    Analyze the resumes below against the job description and assess every candidate.

JOB DESCRIPTION:
";

/// Heading placed between the job description and the first resume block.
pub const RESUMES_HEADING: &str = "RESUMES ({resume_count} total, each delimited by === markers):\n";

/// Opening delimiter of a resume block. Replace `{label}` and `{id}`.
pub const RESUME_BLOCK_START: &str = "=== RESUME {label} (id: {id}) ===";

/// Closing delimiter of a resume block. Replace `{label}`.
pub const RESUME_BLOCK_END: &str = "=== END RESUME {label} ===";

/// Output schema instruction. Replace `{resume_count}` and `{recommendations}`.
pub const SCORING_OUTPUT_INSTRUCTIONS: &str = r#"For EACH of the {resume_count} resumes, produce one JSON object with EXACTLY these fields:
{
  "resume_number": 1,
  "candidate_name": "Full name",
  "candidate_email": "email address if found, else \"not_provided\"",
  "match_score": 85,
  "matched_skills": ["skills from the job description the candidate has"],
  "missing_skills": ["skills the job description requires that the candidate lacks"],
  "experience_fit": "brief assessment of experience against the role",
  "recommendation": "Strong Match",
  "reasoning": "2-3 sentence explanation",
  "years_of_experience": 5
}

HARD RULES:
1. `resume_number` MUST be the number N from the "=== RESUME N" marker of the resume being assessed
2. `match_score` is an integer from 0 to 100
3. `recommendation` MUST be exactly one of: {recommendations}
4. `years_of_experience` is a number; use "unknown" if it cannot be determined
5. Assess every resume exactly once; never merge or skip resumes

Return ONLY a structured JSON array of these objects, no surrounding prose, no markdown code fences."#;
