//! Job recommendation engine.
//!
//! Pipeline: user skills → [`normalize`] → [`query`] (job views from the graph)
//! → [`matching`] (per-skill [`similarity`]) → [`explain`] → [`rank`].
//!
//! Everything here is synchronous and works on a borrowed, read-only
//! [`KnowledgeGraph`]. The HTTP layer owns snapshots and randomness.

pub mod dates;
pub mod explain;
pub mod handlers;
pub mod matching;
pub mod normalize;
pub mod query;
pub mod rank;
pub mod similarity;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::graph::KnowledgeGraph;
use dates::{JobStatus, DEFAULT_FRESHNESS_DAYS};
use explain::{explain, Language, PhraseChooser};
use matching::{score, BonusConfig, FitLevel, MatchContext, ScoredJob, UserProfile};
use normalize::{normalize_value, split_skill_list};
use query::{JobFilter, JobView};
use rank::{rank, DEFAULT_TOP_N};
use similarity::{MatchStrategy, DEFAULT_THRESHOLD};

/// Matched skills listed per recommendation.
pub const MAX_MATCHED_SHOWN: usize = 7;
/// Missing skills listed per recommendation.
pub const MAX_MISSING_SHOWN: usize = 5;
/// Jobs returned by location-only browsing when no limit is given.
pub const DEFAULT_BROWSE_LIMIT: usize = 20;

#[derive(Debug, Error, PartialEq)]
pub enum RecommendError {
    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Knowledge graph is not loaded")]
    GraphUnavailable,
}

// ────────────────────────────────────────────────────────────────────────────
// Settings
// ────────────────────────────────────────────────────────────────────────────

/// Service-wide defaults; per-request fields override some of them.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendSettings {
    pub strategy: MatchStrategy,
    pub threshold: f64,
    pub freshness_days: i64,
    pub top_n: usize,
    pub bonus: BonusConfig,
    pub language: Language,
}

impl Default for RecommendSettings {
    fn default() -> Self {
        Self {
            strategy: MatchStrategy::default(),
            threshold: f64::from(DEFAULT_THRESHOLD),
            freshness_days: DEFAULT_FRESHNESS_DAYS,
            top_n: DEFAULT_TOP_N,
            bonus: BonusConfig::default(),
            language: Language::default(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Request / output types
// ────────────────────────────────────────────────────────────────────────────

/// User skills as submitted: a list, or one comma-separated string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SkillsInput {
    One(String),
    Many(Vec<Value>),
}

impl Default for SkillsInput {
    fn default() -> Self {
        SkillsInput::Many(Vec::new())
    }
}

impl SkillsInput {
    /// Raw skill strings. A single string is split on commas; non-string
    /// list entries normalize to nothing and are dropped.
    pub fn to_list(&self) -> Vec<String> {
        match self {
            SkillsInput::One(text) => split_skill_list(text),
            SkillsInput::Many(values) => values
                .iter()
                .filter(|v| !normalize_value(v).is_empty())
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
        }
    }
}

impl From<Vec<&str>> for SkillsInput {
    fn from(skills: Vec<&str>) -> Self {
        SkillsInput::Many(skills.into_iter().map(Value::from).collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub skills: SkillsInput,
    pub country: Option<String>,
    pub city: Option<String>,
    pub education: Option<String>,
    pub experience: Option<String>,
    pub top_n: Option<usize>,
    pub threshold: Option<f64>,
    pub language: Option<Language>,
    /// Evaluation date for freshness; today when absent.
    pub as_of: Option<NaiveDate>,
}

/// One ranked, explained job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub job_id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: String,
    pub job_level: String,
    pub posted: String,
    pub link: String,
    pub status: JobStatus,
    pub match_percent: f64,
    pub fit_level: FitLevel,
    pub fit_label: String,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub explanation: String,
}

impl Recommendation {
    fn build(
        scored: ScoredJob,
        profile: &UserProfile,
        language: Language,
        chooser: &mut dyn PhraseChooser,
    ) -> Self {
        let explanation = explain(&scored, profile, language, chooser);
        let ScoredJob {
            job,
            matched,
            missing,
            match_percent,
            fit_level,
            ..
        } = scored;
        Self {
            job_id: job.id,
            title: job.title,
            company: job.company,
            location: job.location,
            job_type: job.job_type,
            job_level: job.job_level,
            posted: job.posted,
            link: job.link,
            status: job.status,
            match_percent,
            fit_level,
            fit_label: fit_level.label(language).to_string(),
            matched_skills: matched
                .into_iter()
                .take(MAX_MATCHED_SHOWN)
                .map(|m| m.skill.label)
                .collect(),
            missing_skills: missing
                .into_iter()
                .take(MAX_MISSING_SHOWN)
                .map(|s| s.label)
                .collect(),
            explanation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendOutcome {
    pub results: Vec<Recommendation>,
    /// Jobs with at least one matched skill, before truncation.
    pub total_matched: usize,
    /// Jobs that passed location and freshness filters.
    pub jobs_considered: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Entry points
// ────────────────────────────────────────────────────────────────────────────

/// Scores, explains and ranks jobs for one request.
///
/// Input is validated before the graph is consulted, so a malformed request
/// reports `Input` even while no graph is loaded. "No matches" is a successful
/// outcome with empty `results`.
pub fn recommend(
    graph: Option<&KnowledgeGraph>,
    request: &RecommendRequest,
    settings: &RecommendSettings,
    today: NaiveDate,
    chooser: &mut dyn PhraseChooser,
) -> Result<RecommendOutcome, RecommendError> {
    let top_n = request.top_n.unwrap_or(settings.top_n);
    if top_n == 0 {
        return Err(RecommendError::Input("top_n must be at least 1".to_string()));
    }
    let threshold = request.threshold.unwrap_or(settings.threshold);
    if !(0.0..=100.0).contains(&threshold) {
        return Err(RecommendError::Input(format!(
            "threshold must be between 0 and 100, got {threshold}"
        )));
    }
    let skills = request.skills.to_list();
    let profile = UserProfile::new(
        skills.as_slice(),
        request.education.clone(),
        request.experience.clone(),
    )?;

    let graph = graph.ok_or(RecommendError::GraphUnavailable)?;
    let today = request.as_of.unwrap_or(today);
    let language = request.language.unwrap_or(settings.language);

    let filter = JobFilter::for_recommendation(
        request.country.clone(),
        request.city.clone(),
        settings.freshness_days,
    );
    let candidates = query::jobs(graph, &filter, today);
    let jobs_considered = candidates.len();

    let ctx = MatchContext {
        scorer: settings.strategy.scorer(),
        threshold,
        bonus: settings.bonus,
    };
    let scored: Vec<ScoredJob> = candidates
        .into_iter()
        .filter_map(|job| score(job, &profile, &ctx))
        .collect();
    let total_matched = scored.len();

    let results: Vec<Recommendation> = rank(scored, top_n)
        .into_iter()
        .map(|s| Recommendation::build(s, &profile, language, chooser))
        .collect();

    info!(
        skills = profile.skills.len(),
        jobs_considered,
        total_matched,
        returned = results.len(),
        strategy = %settings.strategy,
        "Recommendations computed"
    );

    Ok(RecommendOutcome {
        results,
        total_matched,
        jobs_considered,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BrowseRequest {
    pub country: Option<String>,
    pub city: Option<String>,
    pub limit: Option<usize>,
}

/// Location-only browsing: no skills, no status filtering, newest first.
/// Status is derived with the same freshness window as recommendations.
pub fn browse(
    graph: Option<&KnowledgeGraph>,
    request: &BrowseRequest,
    settings: &RecommendSettings,
    today: NaiveDate,
) -> Result<Vec<JobView>, RecommendError> {
    let limit = request.limit.unwrap_or(DEFAULT_BROWSE_LIMIT);
    if limit == 0 {
        return Err(RecommendError::Input("limit must be at least 1".to_string()));
    }
    let graph = graph.ok_or(RecommendError::GraphUnavailable)?;
    let filter = JobFilter::for_browsing(
        request.country.clone(),
        request.city.clone(),
        settings.freshness_days,
    );
    let found = query::browse(graph, &filter, limit, today);
    debug!(found = found.len(), "Browse by location");
    Ok(found)
}
