//! Similarity scoring between two normalized skill strings, on a 0–100 scale.
//!
//! Two backends sit behind [`SimilarityScorer`]:
//! - `StrictSubstringScorer`: 100 when either string contains the other, else 0.
//! - `FuzzyScorer` (default): the best of partial ratio, token-sort ratio and
//!   token overlap, so typos, reordered words and partial phrases still score.
//!
//! Both return 100 for identical non-empty input and 0 when either side is
//! empty. Both are symmetric: containment is checked in both directions, and
//! every fuzzy component is symmetric in its arguments.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strsim::normalized_levenshtein;

/// Default score a pair must reach to count as matched.
pub const DEFAULT_THRESHOLD: u8 = 55;

/// Below this length the partial ratio degrades to the plain ratio, so that
/// one- and two-letter skills ("r", "c") don't match every longer string.
const MIN_PARTIAL_LEN: usize = 3;

pub trait SimilarityScorer: Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> f64;

    fn strategy(&self) -> MatchStrategy;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    Strict,
    #[default]
    Fuzzy,
}

impl MatchStrategy {
    pub fn scorer(self) -> &'static dyn SimilarityScorer {
        match self {
            MatchStrategy::Strict => &StrictSubstringScorer,
            MatchStrategy::Fuzzy => &FuzzyScorer,
        }
    }
}

impl FromStr for MatchStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" | "substring" => Ok(MatchStrategy::Strict),
            "fuzzy" | "approximate" => Ok(MatchStrategy::Fuzzy),
            other => Err(format!("unknown match strategy '{other}' (expected strict|fuzzy)")),
        }
    }
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStrategy::Strict => f.write_str("strict"),
            MatchStrategy::Fuzzy => f.write_str("fuzzy"),
        }
    }
}

pub struct StrictSubstringScorer;

impl SimilarityScorer for StrictSubstringScorer {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        if a.contains(b) || b.contains(a) {
            100.0
        } else {
            0.0
        }
    }

    fn strategy(&self) -> MatchStrategy {
        MatchStrategy::Strict
    }
}

pub struct FuzzyScorer;

impl SimilarityScorer for FuzzyScorer {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        if a == b {
            return 100.0;
        }
        partial_ratio(a, b)
            .max(token_sort_ratio(a, b))
            .max(token_overlap(a, b))
    }

    fn strategy(&self) -> MatchStrategy {
        MatchStrategy::Fuzzy
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fuzzy components
// ────────────────────────────────────────────────────────────────────────────

/// Normalized Levenshtein similarity scaled to 0–100.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    normalized_levenshtein(a, b) * 100.0
}

/// Best ratio of the shorter string against every equal-length window of the
/// longer one.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let (a_len, b_len) = (a.chars().count(), b.chars().count());
    let (short, long, short_len) = if a_len <= b_len {
        (a, b, a_len)
    } else {
        (b, a, b_len)
    };
    if short_len < MIN_PARTIAL_LEN || a_len == b_len {
        return ratio(a, b);
    }

    let long_chars: Vec<char> = long.chars().collect();
    let mut best = 0.0_f64;
    for window in long_chars.windows(short_len) {
        let candidate: String = window.iter().collect();
        best = best.max(ratio(short, &candidate));
        if best >= 100.0 {
            break;
        }
    }
    best
}

/// Ratio after sorting whitespace-separated tokens alphabetically.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// Shared tokens over all distinct tokens, scaled to 0–100. Monotonic in the
/// number of shared tokens for a fixed token union.
pub fn token_overlap(a: &str, b: &str) -> f64 {
    let ta: HashSet<&str> = a.split_whitespace().collect();
    let tb: HashSet<&str> = b.split_whitespace().collect();
    let union = ta.union(&tb).count();
    if union == 0 {
        return 0.0;
    }
    let shared = ta.intersection(&tb).count();
    shared as f64 / union as f64 * 100.0
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}
