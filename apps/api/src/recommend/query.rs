//! Graph query layer. Turns job nodes into flat `JobView`s with resolved
//! skills, display fields and freshness status.
//!
//! Graph producers encode required skills two ways: as adjacent `skill` nodes,
//! or as a comma-separated `skills` attribute on the job node. Both are
//! `SkillSource`s; the layer chains them and deduplicates by canonical key, so
//! scoring code never branches on the encoding.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::graph::{KnowledgeGraph, Node, NodeKind};
use crate::recommend::dates::{derive_status, JobStatus, DEFAULT_FRESHNESS_DAYS};
use crate::recommend::normalize::{canonical_skill, split_skill_list};

pub const UNKNOWN_COMPANY: &str = "Unknown Company";
pub const UNKNOWN_LOCATION: &str = "Unknown Location";
pub const NOT_AVAILABLE: &str = "N/A";

const TITLE_KEYS: &[&str] = &["title", "label"];
const COMPANY_KEYS: &[&str] = &["company"];
const LOCATION_KEYS: &[&str] = &["location", "job_location"];
const DATE_KEYS: &[&str] = &["date", "first_seen", "posted"];
const LINK_KEYS: &[&str] = &["link", "job_link"];

// ────────────────────────────────────────────────────────────────────────────
// Views
// ────────────────────────────────────────────────────────────────────────────

/// One required skill of a job, resolved from either encoding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSkill {
    pub id: String,
    pub label: String,
    /// Canonical comparison key (`canonical_skill(label)`).
    pub key: String,
    pub category: Option<String>,
    pub weight: f64,
}

/// Flat, display-ready projection of a job node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobView {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: String,
    pub job_level: String,
    pub link: String,
    /// Posting date as written in the graph.
    pub posted: String,
    /// Parsed posting date; the sentinel when unparsable.
    pub posted_on: NaiveDate,
    pub status: JobStatus,
    pub skills: Vec<JobSkill>,
}

// ────────────────────────────────────────────────────────────────────────────
// Filters
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFilter {
    pub country: Option<String>,
    pub city: Option<String>,
    /// Age in days after which a posting is expired.
    pub max_age_days: i64,
    /// Drop jobs whose status isn't `Active`.
    pub active_only: bool,
}

impl Default for JobFilter {
    fn default() -> Self {
        Self {
            country: None,
            city: None,
            max_age_days: DEFAULT_FRESHNESS_DAYS,
            active_only: false,
        }
    }
}

impl JobFilter {
    /// Skill-based recommendation: only active postings.
    pub fn for_recommendation(
        country: Option<String>,
        city: Option<String>,
        max_age_days: i64,
    ) -> Self {
        Self {
            country,
            city,
            max_age_days,
            active_only: true,
        }
    }

    /// Location-only browsing: status is still derived with the configured
    /// window, but not filtered on.
    pub fn for_browsing(
        country: Option<String>,
        city: Option<String>,
        max_age_days: i64,
    ) -> Self {
        Self {
            country,
            city,
            max_age_days,
            active_only: false,
        }
    }

    pub fn matches_location(&self, location: &str) -> bool {
        let location = location.to_lowercase();
        [&self.country, &self.city]
            .into_iter()
            .flatten()
            .map(|needle| needle.trim().to_lowercase())
            .filter(|needle| !needle.is_empty())
            .all(|needle| location.contains(&needle))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Skill sources
// ────────────────────────────────────────────────────────────────────────────

/// One way of reading a job's required skills out of the graph.
pub trait SkillSource {
    fn skills(&self, graph: &KnowledgeGraph, job: &Node) -> Vec<JobSkill>;
}

/// Skill-typed neighbours, in edge insertion order.
pub struct AdjacentSkills;

impl SkillSource for AdjacentSkills {
    fn skills(&self, graph: &KnowledgeGraph, job: &Node) -> Vec<JobSkill> {
        graph
            .neighbors(&job.id)
            .into_iter()
            .filter(|(node, _)| node.kind == NodeKind::Skill)
            .map(|(node, relation)| skill_from_node(node, relation.weight))
            .collect()
    }
}

/// Comma-separated `skills` attribute. Entries naming an existing skill node
/// pick up that node's label and category.
pub struct AttributeSkills;

impl SkillSource for AttributeSkills {
    fn skills(&self, graph: &KnowledgeGraph, job: &Node) -> Vec<JobSkill> {
        let Some(raw) = job.attr("skills") else {
            return Vec::new();
        };
        split_skill_list(raw)
            .into_iter()
            .map(|item| match graph.node(&item) {
                Some(node) if node.kind == NodeKind::Skill => skill_from_node(node, 1.0),
                _ => JobSkill {
                    key: canonical_skill(&item),
                    id: item.clone(),
                    label: item,
                    category: None,
                    weight: 1.0,
                },
            })
            .collect()
    }
}

fn skill_from_node(node: &Node, weight: f64) -> JobSkill {
    let label = node.label().to_string();
    JobSkill {
        id: node.id.clone(),
        key: canonical_skill(&label),
        label,
        category: node
            .attr("category")
            .filter(|c| !c.eq_ignore_ascii_case("uncategorized"))
            .map(str::to_string),
        weight,
    }
}

const SKILL_SOURCES: [&dyn SkillSource; 2] = [&AdjacentSkills, &AttributeSkills];

/// All required skills of `job` across encodings, deduplicated by canonical
/// key in first-seen order. Skills that normalize to nothing are dropped.
pub fn resolve_skills(graph: &KnowledgeGraph, job: &Node) -> Vec<JobSkill> {
    let mut seen = HashSet::new();
    SKILL_SOURCES
        .iter()
        .flat_map(|source| source.skills(graph, job))
        .filter(|skill| !skill.key.is_empty() && seen.insert(skill.key.clone()))
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Queries
// ────────────────────────────────────────────────────────────────────────────

/// Builds the view of one job node. Missing attributes fall back to adjacent
/// entity nodes, then to placeholders.
pub fn job_view(graph: &KnowledgeGraph, job: &Node, today: NaiveDate, max_age_days: i64) -> JobView {
    let neighbor_label = |kind: NodeKind| {
        graph
            .neighbors(&job.id)
            .into_iter()
            .find(|(n, _)| n.kind == kind)
            .map(|(n, _)| n.label().to_string())
    };

    let company = job
        .first_attr(COMPANY_KEYS)
        .map(str::to_string)
        .or_else(|| neighbor_label(NodeKind::Company))
        .unwrap_or_else(|| {
            debug!(job = %job.id, "Job has no company; using placeholder");
            UNKNOWN_COMPANY.to_string()
        });
    let location = job
        .first_attr(LOCATION_KEYS)
        .map(str::to_string)
        .or_else(|| neighbor_label(NodeKind::Location))
        .unwrap_or_else(|| {
            debug!(job = %job.id, "Job has no location; using placeholder");
            UNKNOWN_LOCATION.to_string()
        });
    let job_type = job
        .attr("job_type")
        .map(str::to_string)
        .or_else(|| neighbor_label(NodeKind::JobType))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let job_level = job
        .attr("job_level")
        .map(str::to_string)
        .or_else(|| neighbor_label(NodeKind::Level))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let posted = job.first_attr(DATE_KEYS).unwrap_or_default().to_string();
    let (posted_on, status) = derive_status(&posted, today, max_age_days);

    JobView {
        id: job.id.clone(),
        title: job.first_attr(TITLE_KEYS).unwrap_or(&job.id).to_string(),
        company,
        location,
        job_type,
        job_level,
        link: job.first_attr(LINK_KEYS).unwrap_or(&job.id).to_string(),
        posted,
        posted_on,
        status,
        skills: resolve_skills(graph, job),
    }
}

/// Enumerates jobs passing `filter`, in graph insertion order.
pub fn jobs(graph: &KnowledgeGraph, filter: &JobFilter, today: NaiveDate) -> Vec<JobView> {
    graph
        .nodes_of_kind(NodeKind::Job)
        .map(|node| job_view(graph, node, today, filter.max_age_days))
        .filter(|job| filter.matches_location(&job.location))
        .filter(|job| !filter.active_only || job.status == JobStatus::Active)
        .collect()
}

/// Location-only browsing: every job matching the location filters regardless
/// of status, newest first (unparsable dates last), at most `limit`.
pub fn browse(
    graph: &KnowledgeGraph,
    filter: &JobFilter,
    limit: usize,
    today: NaiveDate,
) -> Vec<JobView> {
    let mut found = jobs(graph, &JobFilter { active_only: false, ..filter.clone() }, today);
    found.sort_by(|a, b| b.posted_on.cmp(&a.posted_on));
    found.truncate(limit);
    found
}
