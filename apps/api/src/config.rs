use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

use crate::recommend::dates::DEFAULT_FRESHNESS_DAYS;
use crate::recommend::explain::Language;
use crate::recommend::matching::{BonusConfig, BonusRule, DEFAULT_BONUS};
use crate::recommend::rank::DEFAULT_TOP_N;
use crate::recommend::similarity::{MatchStrategy, DEFAULT_THRESHOLD};
use crate::recommend::RecommendSettings;

/// Application configuration loaded from environment variables.
/// Startup fails if `GRAPH_PATH` is missing or a value doesn't parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub graph_path: PathBuf,
    pub port: u16,
    pub rust_log: String,
    /// Engine defaults; requests may override threshold, top_n and language.
    pub recommend: RecommendSettings,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key → value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let threshold: u8 = parse_or(&lookup, "SIMILARITY_THRESHOLD", DEFAULT_THRESHOLD)?;
        if threshold > 100 {
            return Err(anyhow!("SIMILARITY_THRESHOLD must be between 0 and 100"));
        }
        let top_n: usize = parse_or(&lookup, "DEFAULT_TOP_N", DEFAULT_TOP_N)?;
        if top_n == 0 {
            return Err(anyhow!("DEFAULT_TOP_N must be at least 1"));
        }

        Ok(Config {
            graph_path: lookup("GRAPH_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from)
                .context("Required environment variable 'GRAPH_PATH' is not set")?,
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            recommend: RecommendSettings {
                strategy: parse_or(&lookup, "MATCH_STRATEGY", MatchStrategy::default())?,
                threshold: f64::from(threshold),
                freshness_days: parse_or(&lookup, "FRESHNESS_DAYS", DEFAULT_FRESHNESS_DAYS)?,
                top_n,
                bonus: BonusConfig {
                    rule: parse_or(&lookup, "BONUS_RULE", BonusRule::default())?,
                    education: parse_or(&lookup, "EDUCATION_BONUS", DEFAULT_BONUS)?,
                    experience: parse_or(&lookup, "EXPERIENCE_BONUS", DEFAULT_BONUS)?,
                },
                language: parse_or(&lookup, "DEFAULT_LANGUAGE", Language::default())?,
            },
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("{e}"))
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let c = config(&[("GRAPH_PATH", "data/graph.graphml")]).unwrap();
        assert_eq!(c.graph_path, PathBuf::from("data/graph.graphml"));
        assert_eq!(c.port, 8080);
        assert_eq!(c.rust_log, "info");
        assert_eq!(c.recommend, RecommendSettings::default());
    }

    #[test]
    fn test_graph_path_is_required() {
        assert!(config(&[]).is_err());
        assert!(config(&[("GRAPH_PATH", "  ")]).is_err());
    }

    #[test]
    fn test_overrides() {
        let c = config(&[
            ("GRAPH_PATH", "g.bin"),
            ("PORT", "9000"),
            ("SIMILARITY_THRESHOLD", "70"),
            ("MATCH_STRATEGY", "strict"),
            ("FRESHNESS_DAYS", "30"),
            ("DEFAULT_TOP_N", "5"),
            ("BONUS_RULE", "keywords"),
            ("EDUCATION_BONUS", "0.1"),
            ("DEFAULT_LANGUAGE", "id"),
        ])
        .unwrap();
        assert_eq!(c.port, 9000);
        assert_eq!(c.recommend.threshold, 70.0);
        assert_eq!(c.recommend.strategy, MatchStrategy::Strict);
        assert_eq!(c.recommend.freshness_days, 30);
        assert_eq!(c.recommend.top_n, 5);
        assert_eq!(c.recommend.bonus.rule, BonusRule::Keywords);
        assert_eq!(c.recommend.bonus.education, 0.1);
        assert_eq!(c.recommend.bonus.experience, DEFAULT_BONUS);
        assert_eq!(c.recommend.language, Language::Indonesian);
    }

    #[test]
    fn test_invalid_values_are_reported() {
        for (key, value) in [
            ("PORT", "eighty"),
            ("SIMILARITY_THRESHOLD", "101"),
            ("MATCH_STRATEGY", "psychic"),
            ("DEFAULT_TOP_N", "0"),
            ("DEFAULT_LANGUAGE", "klingon"),
        ] {
            let err = config(&[("GRAPH_PATH", "g.bin"), (key, value)]).unwrap_err();
            assert!(format!("{err:#}").contains(key), "{key}: {err:#}");
        }
    }
}
