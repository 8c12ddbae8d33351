//! Ranking Engine — deterministic total order over scored candidates.
//!
//! Keys, in order:
//! 1. `match_score` descending
//! 2. `recommendation` ascending (Strong < Good < Weak)
//! 3. `years_of_experience` descending, `unknown` last
//! 4. `source_index` ascending (submission order)

use std::cmp::Ordering;

use crate::screening::models::{ScoredCandidate, YearsOfExperience};

/// Orders candidates best-first. Empty input yields empty output.
pub fn rank(mut candidates: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
    candidates.sort_by(compare_candidates);
    candidates
}

/// `Ordering::Less` means `a` ranks ahead of `b`.
pub fn compare_candidates(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.match_score
        .cmp(&a.match_score)
        .then_with(|| a.recommendation.cmp(&b.recommendation))
        .then_with(|| compare_years(&a.years_of_experience, &b.years_of_experience))
        .then_with(|| a.source_index.cmp(&b.source_index))
}

fn compare_years(a: &YearsOfExperience, b: &YearsOfExperience) -> Ordering {
    match (a, b) {
        (YearsOfExperience::Known(x), YearsOfExperience::Known(y)) => y.total_cmp(x),
        (YearsOfExperience::Known(_), YearsOfExperience::Unknown) => Ordering::Less,
        (YearsOfExperience::Unknown, YearsOfExperience::Known(_)) => Ordering::Greater,
        (YearsOfExperience::Unknown, YearsOfExperience::Unknown) => Ordering::Equal,
    }
}
