use std::cmp::Ordering;

use crate::recommend::matching::ScoredJob;

pub const DEFAULT_TOP_N: usize = 10;

/// Orders by match percent (descending), then posting date (newest first,
/// sentinel dates last). Remaining ties keep their input order. Keeps at most
/// `top_n` jobs.
pub fn rank(mut scored: Vec<ScoredJob>, top_n: usize) -> Vec<ScoredJob> {
    scored.sort_by(compare);
    scored.truncate(top_n);
    scored
}

fn compare(a: &ScoredJob, b: &ScoredJob) -> Ordering {
    b.match_percent
        .total_cmp(&a.match_percent)
        .then_with(|| b.job.posted_on.cmp(&a.job.posted_on))
}
