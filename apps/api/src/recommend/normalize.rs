//! Text normalization for skill strings.
//!
//! `normalize` is idempotent: `normalize(normalize(x)) == normalize(x)`.
//! `canonical_skill` adds alias expansion and is idempotent as well, since no
//! expansion contains an alias token.

use serde_json::Value;

/// Punctuation kept inside skill tokens ("c++", "c#", "node.js").
const KEPT_PUNCTUATION: &[char] = &['+', '#', '.'];

/// Abbreviation → canonical form, applied per token after normalization.
const ALIASES: &[(&str, &str)] = &[
    ("ai", "artificial intelligence"),
    ("ml", "machine learning"),
    ("dl", "deep learning"),
    ("cv", "computer vision"),
    ("nlp", "natural language processing"),
    ("js", "javascript"),
    ("ts", "typescript"),
    ("py", "python"),
    ("k8s", "kubernetes"),
    ("postgres", "postgresql"),
    ("golang", "go"),
    ("db", "database"),
    ("bi", "business intelligence"),
    ("ui", "user interface"),
    ("ux", "user experience"),
    ("oop", "object oriented programming"),
    ("qa", "quality assurance"),
    ("gcp", "google cloud platform"),
];

/// Lowercases, replaces anything outside `[a-z0-9+#. ]` with a space,
/// collapses whitespace and trims. Trailing dots are dropped from tokens
/// ("python." → "python") but leading ones survive (".net").
pub fn normalize(text: &str) -> String {
    let replaced: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || KEPT_PUNCTUATION.contains(&c) {
                c
            } else {
                ' '
            }
        })
        .collect();

    replaced
        .split_whitespace()
        .map(|token| token.trim_end_matches('.'))
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Non-string JSON values normalize to the empty string.
pub fn normalize_value(value: &Value) -> String {
    match value {
        Value::String(s) => normalize(s),
        _ => String::new(),
    }
}

/// Expands known abbreviations token by token. Expects normalized input.
pub fn resolve_aliases(normalized: &str) -> String {
    normalized
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(|token| {
            ALIASES
                .iter()
                .find(|(alias, _)| *alias == token)
                .map(|(_, canonical)| *canonical)
                .unwrap_or(token)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Comparison key for skills: normalized, then alias-expanded.
pub fn canonical_skill(text: &str) -> String {
    resolve_aliases(&normalize(text))
}

/// Splits a free-text skill list on commas, semicolons and newlines.
pub fn split_skill_list(text: &str) -> Vec<String> {
    text.split([',', ';', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SAMPLES: &[&str] = &[
        "",
        "   ",
        "Python",
        "  Machine   Learning ",
        "C++ / C#",
        "Node.JS",
        "python.",
        "...",
        ".NET Core",
        "SQL (PostgreSQL), Excel!",
        "Ünïcödé Straße",
        "K8s\tDocker\nHelm",
        "a. . b..",
    ];

    #[test]
    fn test_normalize_is_idempotent() {
        for s in SAMPLES {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn test_canonical_skill_is_idempotent() {
        for s in SAMPLES.iter().chain(["ML", "ai cv", "JS/TS"].iter()) {
            let once = canonical_skill(s);
            assert_eq!(canonical_skill(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn test_normalize_keeps_skill_punctuation() {
        assert_eq!(normalize("C++ / C#"), "c++ c#");
        assert_eq!(normalize("Node.JS"), "node.js");
        assert_eq!(normalize(".NET Core"), ".net core");
    }

    #[test]
    fn test_normalize_strips_and_collapses() {
        assert_eq!(normalize("  SQL (PostgreSQL), Excel! "), "sql postgresql excel");
        assert_eq!(normalize("python."), "python");
        assert_eq!(normalize("..."), "");
    }

    #[test]
    fn test_case_variants_normalize_identically() {
        assert_eq!(normalize("PyThOn"), normalize("python"));
        assert_eq!(canonical_skill("Data  Analysis"), canonical_skill("data-analysis"));
    }

    #[test]
    fn test_non_string_values_become_empty() {
        assert_eq!(normalize_value(&json!(42)), "");
        assert_eq!(normalize_value(&json!(null)), "");
        assert_eq!(normalize_value(&json!(["python"])), "");
        assert_eq!(normalize_value(&json!("Python")), "python");
    }

    #[test]
    fn test_aliases_expand_per_token() {
        assert_eq!(canonical_skill("ML"), "machine learning");
        assert_eq!(canonical_skill("AI / CV"), "artificial intelligence computer vision");
        assert_eq!(canonical_skill("ml ops"), "machine learning ops");
        // Unmapped tokens pass through
        assert_eq!(canonical_skill("rust"), "rust");
    }

    #[test]
    fn test_split_skill_list() {
        assert_eq!(
            split_skill_list("Python, SQL ;excel\n\n , "),
            vec!["Python", "SQL", "excel"]
        );
        assert!(split_skill_list("  ").is_empty());
    }
}

/// Property-based checks over arbitrary text.
#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_normalize_is_idempotent_for_any_text(input in "\\PC{0,40}") {
            let once = normalize(&input);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn test_normalize_output_uses_kept_alphabet(input in "\\PC{0,40}") {
            let out = normalize(&input);
            prop_assert!(out.chars().all(|c| c == ' '
                || c.is_ascii_lowercase()
                || c.is_ascii_digit()
                || KEPT_PUNCTUATION.contains(&c)));
            prop_assert!(!out.starts_with(' ') && !out.ends_with(' '));
            prop_assert!(!out.contains("  "));
        }

        #[test]
        fn test_canonical_skill_is_idempotent_for_any_text(input in "\\PC{0,40}") {
            let once = canonical_skill(&input);
            prop_assert_eq!(canonical_skill(&once), once);
        }
    }
}
