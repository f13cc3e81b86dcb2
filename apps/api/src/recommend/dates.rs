//! Posting-date parsing and job freshness.
//!
//! Graph producers store posting dates as free text: ISO dates, day-first and
//! month-first variants, timestamps, or scraped relative phrases ("3 days
//! ago"). Anything unparsable maps to a sentinel date older than any real
//! posting, so it can never be considered active and always sorts last.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default number of days a posting stays active.
pub const DEFAULT_FRESHNESS_DAYS: i64 = 90;

/// Tried in order; the first that parses wins.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%m/%d/%Y", "%d/%m/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Active,
    Expired,
    Unknown,
}

/// 1900-01-01: the "very old" date unparsable postings resolve to.
pub fn sentinel_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Parses posting-date text relative to `today`. `None` when nothing matches.
pub fn parse_posting_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(ts.date());
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.date_naive());
    }

    parse_relative(&text.to_lowercase(), today)
}

/// "today", "yesterday", "N <unit>(s) ago", "a day ago", "30+ days ago".
fn parse_relative(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    match text {
        "today" | "just now" => return Some(today),
        "yesterday" => return today.checked_sub_days(Days::new(1)),
        _ => {}
    }

    let tokens: Vec<&str> = text.split_whitespace().collect();
    let [amount, unit, "ago"] = tokens.as_slice() else {
        return None;
    };
    let amount: u64 = match *amount {
        "a" | "an" | "one" => 1,
        n => n.trim_end_matches('+').parse().ok()?,
    };
    let days_per_unit = match unit.trim_end_matches('s') {
        "second" | "minute" | "hour" => 0,
        "day" => 1,
        "week" => 7,
        "month" => 30,
        "year" => 365,
        _ => return None,
    };
    today.checked_sub_days(Days::new(amount.checked_mul(days_per_unit)?))
}

/// Parsed posting date, or the sentinel when the text is unparsable.
pub fn posting_date_or_sentinel(text: &str, today: NaiveDate) -> NaiveDate {
    match parse_posting_date(text, today) {
        Some(date) => date,
        None => {
            if !text.trim().is_empty() {
                debug!(date = text, "Unparsable posting date; using sentinel");
            }
            sentinel_date()
        }
    }
}

/// Derives the posting date and status for a job.
///
/// - no date text → (sentinel, `Unknown`)
/// - unparsable → (sentinel, `Expired`)
/// - posted within `freshness_days` of `today` (or in the future) → `Active`
/// - otherwise → `Expired`
pub fn derive_status(text: &str, today: NaiveDate, freshness_days: i64) -> (NaiveDate, JobStatus) {
    if text.trim().is_empty() {
        return (sentinel_date(), JobStatus::Unknown);
    }
    let posted = posting_date_or_sentinel(text, today);
    let age_days = (today - posted).num_days();
    let status = if posted != sentinel_date() && age_days <= freshness_days {
        JobStatus::Active
    } else {
        JobStatus::Expired
    };
    (posted, status)
}
