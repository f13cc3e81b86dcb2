//! Shared fixtures for unit tests.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::graph::{KnowledgeGraph, Relation};

pub const DATA_ANALYST: &str = "https://jobs.example/data-analyst";
pub const BACKEND: &str = "https://jobs.example/backend";
pub const ML_ENGINEER: &str = "https://jobs.example/ml-engineer";

pub fn attrs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Evaluation date the fixture graph's posting dates are relative to.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

pub fn add_job(g: &mut KnowledgeGraph, id: &str, fields: &[(&str, &str)]) {
    let mut a = attrs(fields);
    a.insert("type".to_string(), "job".to_string());
    g.upsert_node(id, a);
}

pub fn add_skill(g: &mut KnowledgeGraph, job: &str, skill: &str, category: Option<&str>) {
    let mut a = attrs(&[("type", "skill"), ("label", skill)]);
    if let Some(c) = category {
        a.insert("category".to_string(), c.to_string());
    }
    g.upsert_node(skill, a);
    g.add_edge(job, skill, Relation::requires());
}

/// Three jobs covering both skill encodings:
/// - data analyst: adjacent skill nodes, company/location attributes, fresh
/// - backend: comma-separated `skills` attribute, company via an `offers` edge, fresh
/// - ML engineer: adjacent skill nodes, posted long before `today()`
pub fn sample_graph() -> KnowledgeGraph {
    let mut g = KnowledgeGraph::new();

    add_job(
        &mut g,
        DATA_ANALYST,
        &[
            ("label", "Data Analyst"),
            ("title", "Data Analyst"),
            ("company", "Acme Analytics"),
            ("location", "Jakarta, Indonesia"),
            ("job_type", "Onsite"),
            ("job_level", "Mid senior"),
            ("date", "2024-02-20"),
            ("link", DATA_ANALYST),
        ],
    );
    add_skill(&mut g, DATA_ANALYST, "python", Some("Programming"));
    add_skill(&mut g, DATA_ANALYST, "sql", Some("Data Management"));
    add_skill(&mut g, DATA_ANALYST, "excel", None);

    add_job(
        &mut g,
        BACKEND,
        &[
            ("label", "Backend Engineer"),
            ("job_location", "Singapore, Singapore"),
            ("first_seen", "2024-02-01"),
            ("skills", "Rust, PostgreSQL, Docker"),
        ],
    );
    g.upsert_node("Globex", attrs(&[("type", "company"), ("label", "Globex")]));
    g.add_edge("Globex", BACKEND, Relation::new("offers"));

    add_job(
        &mut g,
        ML_ENGINEER,
        &[
            ("title", "Machine Learning Engineer"),
            ("company", "Initech"),
            ("location", "Bandung, Indonesia"),
            ("date", "2023-06-01"),
        ],
    );
    add_skill(&mut g, ML_ENGINEER, "python", Some("Programming"));
    add_skill(&mut g, ML_ENGINEER, "machine learning", Some("Artificial Intelligence"));

    g
}
