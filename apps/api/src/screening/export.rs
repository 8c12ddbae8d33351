//! Tabular view of a ranking for display and CSV download.

use serde::Serialize;

use crate::screening::models::ScoredCandidate;

/// One row of the ranking table. Column names are the CSV header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRow {
    #[serde(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Candidate")]
    pub candidate: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Match %")]
    pub match_percent: u8,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Matched Skills")]
    pub matched_skills: String,
    #[serde(rename = "Missing Skills")]
    pub missing_skills: String,
    #[serde(rename = "Experience")]
    pub experience: String,
    #[serde(rename = "Reasoning")]
    pub reasoning: String,
}

/// Converts an already-ranked list into 1-based display rows.
pub fn to_display_rows(ranked: &[ScoredCandidate]) -> Vec<DisplayRow> {
    ranked
        .iter()
        .enumerate()
        .map(|(i, c)| DisplayRow {
            rank: i + 1,
            candidate: c.candidate_name.clone(),
            email: c.candidate_email.clone(),
            match_percent: c.match_score,
            status: c.recommendation.to_string(),
            matched_skills: join_skills(&c.matched_skills),
            missing_skills: join_skills(&c.missing_skills),
            experience: c.years_of_experience.to_string(),
            reasoning: c.reasoning.clone(),
        })
        .collect()
}

fn join_skills<'a>(skills: impl IntoIterator<Item = &'a String>) -> String {
    skills
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Serializes rows as CSV with a header line (header only when empty).
pub fn write_csv(rows: &[DisplayRow]) -> Result<String, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record([
        "Rank",
        "Candidate",
        "Email",
        "Match %",
        "Status",
        "Matched Skills",
        "Missing Skills",
        "Experience",
        "Reasoning",
    ])?;
    for row in rows {
        writer.serialize(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    // Every field is a Rust `String`, so the output is valid UTF-8.
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
