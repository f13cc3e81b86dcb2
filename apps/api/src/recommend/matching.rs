//! Matching & scoring: per-job skill matching, aggregate match percent, fit
//! level, and the matched/missing partition.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::recommend::explain::Language;
use crate::recommend::normalize::{canonical_skill, normalize};
use crate::recommend::query::{JobSkill, JobView};
use crate::recommend::similarity::SimilarityScorer;
use crate::recommend::RecommendError;

/// Tokens marking an education field as technology-related.
pub const EDUCATION_KEYWORDS: &[&str] = &[
    "computer",
    "informatics",
    "it",
    "engineering",
    "data",
    "software",
    "information",
    "science",
];

/// Tokens marking an experience field as technology-related.
pub const EXPERIENCE_KEYWORDS: &[&str] = &[
    "developer",
    "engineer",
    "programmer",
    "data",
    "it",
    "software",
    "analyst",
];

pub const DEFAULT_BONUS: f64 = 0.05;

// ────────────────────────────────────────────────────────────────────────────
// Fit level
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitLevel {
    VerySuitable,
    Suitable,
    ModeratelySuitable,
    LessSuitable,
    NotSuitable,
}

impl FitLevel {
    /// ≥85 very, ≥70 suitable, ≥50 moderate, ≥30 less, else not suitable.
    pub fn from_percent(percent: f64) -> Self {
        match percent {
            p if p >= 85.0 => FitLevel::VerySuitable,
            p if p >= 70.0 => FitLevel::Suitable,
            p if p >= 50.0 => FitLevel::ModeratelySuitable,
            p if p >= 30.0 => FitLevel::LessSuitable,
            _ => FitLevel::NotSuitable,
        }
    }

    pub fn label(self, language: Language) -> &'static str {
        match (self, language) {
            (FitLevel::VerySuitable, Language::English) => "Very Suitable",
            (FitLevel::Suitable, Language::English) => "Suitable",
            (FitLevel::ModeratelySuitable, Language::English) => "Moderately Suitable",
            (FitLevel::LessSuitable, Language::English) => "Less Suitable",
            (FitLevel::NotSuitable, Language::English) => "Not Suitable",
            (FitLevel::VerySuitable, Language::Indonesian) => "Sangat Cocok",
            (FitLevel::Suitable, Language::Indonesian) => "Cocok",
            (FitLevel::ModeratelySuitable, Language::Indonesian) => "Cukup Cocok",
            (FitLevel::LessSuitable, Language::Indonesian) => "Kurang Cocok",
            (FitLevel::NotSuitable, Language::Indonesian) => "Tidak Cocok",
        }
    }

    pub fn is_high(self) -> bool {
        matches!(self, FitLevel::VerySuitable | FitLevel::Suitable)
    }

    pub fn is_low(self) -> bool {
        matches!(self, FitLevel::LessSuitable | FitLevel::NotSuitable)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Bonuses
// ────────────────────────────────────────────────────────────────────────────

/// When an education/experience bonus is granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusRule {
    Disabled,
    /// Flat bonus whenever the field is non-empty.
    #[default]
    WhenPresent,
    /// Field and job title share a token, or one contains the other.
    TitleMatch,
    /// Field contains a technology keyword.
    Keywords,
}

impl FromStr for BonusRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disabled" | "off" | "none" => Ok(BonusRule::Disabled),
            "when_present" | "present" => Ok(BonusRule::WhenPresent),
            "title_match" | "title" => Ok(BonusRule::TitleMatch),
            "keywords" | "keyword" => Ok(BonusRule::Keywords),
            other => Err(format!(
                "unknown bonus rule '{other}' (expected disabled|when_present|title_match|keywords)"
            )),
        }
    }
}

impl fmt::Display for BonusRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BonusRule::Disabled => "disabled",
            BonusRule::WhenPresent => "when_present",
            BonusRule::TitleMatch => "title_match",
            BonusRule::Keywords => "keywords",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BonusConfig {
    pub rule: BonusRule,
    /// Raw-score bonus for a qualifying education field.
    pub education: f64,
    /// Raw-score bonus for a qualifying experience field.
    pub experience: f64,
}

impl Default for BonusConfig {
    fn default() -> Self {
        Self {
            rule: BonusRule::default(),
            education: DEFAULT_BONUS,
            experience: DEFAULT_BONUS,
        }
    }
}

impl BonusConfig {
    fn qualifies(&self, field: Option<&str>, title: &str, keywords: &[&str]) -> bool {
        let Some(field) = field.map(normalize).filter(|f| !f.is_empty()) else {
            return false;
        };
        match self.rule {
            BonusRule::Disabled => false,
            BonusRule::WhenPresent => true,
            BonusRule::TitleMatch => {
                let title = normalize(title);
                if title.is_empty() {
                    return false;
                }
                let title_tokens: HashSet<&str> = title.split(' ').collect();
                title.contains(&field)
                    || field.contains(&title)
                    || field.split(' ').any(|t| title_tokens.contains(t))
            }
            BonusRule::Keywords => has_keyword(&field, keywords),
        }
    }
}

/// True when a normalized text contains one of `keywords` as a whole token.
pub fn has_keyword(normalized: &str, keywords: &[&str]) -> bool {
    normalized.split(' ').any(|t| keywords.contains(&t))
}

// ────────────────────────────────────────────────────────────────────────────
// User profile
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSkill {
    /// As typed by the user, trimmed.
    pub raw: String,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub skills: Vec<UserSkill>,
    pub education: Option<String>,
    pub experience: Option<String>,
}

impl UserProfile {
    /// Normalizes and deduplicates `skills`. Fails when nothing survives
    /// normalization.
    pub fn new<S: AsRef<str>>(
        skills: &[S],
        education: Option<String>,
        experience: Option<String>,
    ) -> Result<Self, RecommendError> {
        let mut seen = HashSet::new();
        let skills: Vec<UserSkill> = skills
            .iter()
            .map(|s| UserSkill {
                raw: s.as_ref().trim().to_string(),
                key: canonical_skill(s.as_ref()),
            })
            .filter(|s| !s.key.is_empty() && seen.insert(s.key.clone()))
            .collect();

        if skills.is_empty() {
            return Err(RecommendError::Input(
                "at least one non-empty skill is required".to_string(),
            ));
        }

        let clean = |field: Option<String>| {
            field
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
        };
        Ok(Self {
            skills,
            education: clean(education),
            experience: clean(experience),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scoring
// ────────────────────────────────────────────────────────────────────────────

/// Everything `score` needs besides the job and the user.
#[derive(Clone, Copy)]
pub struct MatchContext<'a> {
    pub scorer: &'a dyn SimilarityScorer,
    /// Minimum similarity (0–100) for a pair to count as matched.
    pub threshold: f64,
    pub bonus: BonusConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillMatch {
    pub skill: JobSkill,
    /// The user skill that scored best against `skill`.
    pub user_skill: String,
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredJob {
    pub job: JobView,
    pub matched: Vec<SkillMatch>,
    pub missing: Vec<JobSkill>,
    pub raw_score: f64,
    pub match_percent: f64,
    pub fit_level: FitLevel,
    pub education_bonus: bool,
    pub experience_bonus: bool,
}

/// Scores one job against the user's skills.
///
/// Each job skill takes its best similarity across user skills and counts as
/// matched at or above the threshold. `raw_score` is the sum of matched
/// similarities (scaled to 0–1) plus bonuses, and `match_percent` is
/// `raw_score / job skill count` as a percentage with one decimal, clamped to
/// [0, 100]. Jobs with no skills or no matched skill yield `None`.
pub fn score(job: JobView, profile: &UserProfile, ctx: &MatchContext<'_>) -> Option<ScoredJob> {
    if job.skills.is_empty() {
        debug!(job = %job.id, "Job has no skills; skipping");
        return None;
    }

    let mut matched = Vec::new();
    let mut missing = Vec::new();
    for skill in &job.skills {
        let mut best: Option<(&UserSkill, f64)> = None;
        for user_skill in &profile.skills {
            let similarity = ctx.scorer.similarity(&user_skill.key, &skill.key);
            if best.map_or(true, |(_, s)| similarity > s) {
                best = Some((user_skill, similarity));
            }
        }
        match best {
            Some((user_skill, similarity)) if similarity >= ctx.threshold => {
                matched.push(SkillMatch {
                    skill: skill.clone(),
                    user_skill: user_skill.raw.clone(),
                    similarity,
                })
            }
            _ => missing.push(skill.clone()),
        }
    }

    if matched.is_empty() {
        return None;
    }

    let education_bonus =
        ctx.bonus
            .qualifies(profile.education.as_deref(), &job.title, EDUCATION_KEYWORDS);
    let experience_bonus =
        ctx.bonus
            .qualifies(profile.experience.as_deref(), &job.title, EXPERIENCE_KEYWORDS);

    let mut raw_score: f64 = matched.iter().map(|m| m.similarity / 100.0).sum();
    if education_bonus {
        raw_score += ctx.bonus.education;
    }
    if experience_bonus {
        raw_score += ctx.bonus.experience;
    }

    let normalized = raw_score / job.skills.len().max(1) as f64;
    let match_percent = round_one_decimal((normalized * 100.0).clamp(0.0, 100.0));

    Some(ScoredJob {
        fit_level: FitLevel::from_percent(match_percent),
        job,
        matched,
        missing,
        raw_score,
        match_percent,
        education_bonus,
        experience_bonus,
    })
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
