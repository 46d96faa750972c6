use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::schema::v1::{CardKind, Severity};

const FEED_FIELDS: &[&str] = &["schema_version", "site_id", "site_name", "generated_at", "cards"];
const CARD_FIELDS: &[&str] = &["kind", "title", "category", "label", "score", "generated_at"];
const MAX_CLOCK_DRIFT_MIN: i64 = 5;

/// Problems found in a feed document. Only errors make a feed invalid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl FeedReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

fn check_timestamp(value: Option<&Value>, what: &str, now: DateTime<Utc>, report: &mut FeedReport) {
    let parsed = value
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok());
    match parsed {
        None => report
            .warnings
            .push(format!("{what} is missing or not a valid RFC 3339 datetime")),
        Some(ts) if ts.with_timezone(&Utc) > now + Duration::minutes(MAX_CLOCK_DRIFT_MIN) => {
            report.warnings.push(format!(
                "{what} is more than {MAX_CLOCK_DRIFT_MIN} minutes in the future (clock drift?)"
            ))
        }
        Some(_) => {}
    }
}

pub fn validate_value(feed: &Value, now: DateTime<Utc>) -> FeedReport {
    let mut report = FeedReport::default();

    let Some(obj) = feed.as_object() else {
        report.errors.push("feed must be a JSON object".to_string());
        return report;
    };
    for field in FEED_FIELDS {
        if !obj.contains_key(*field) {
            report
                .errors
                .push(format!("missing top-level field: '{field}'"));
        }
    }
    if !report.is_ok() {
        return report;
    }

    let Some(cards) = obj.get("cards").and_then(Value::as_array) else {
        report.errors.push("top-level 'cards' must be a list".to_string());
        return report;
    };
    check_timestamp(obj.get("generated_at"), "feed generated_at", now, &mut report);

    let mut seen: BTreeSet<String> = BTreeSet::new();
    for (i, card) in cards.iter().enumerate() {
        let Some(card) = card.as_object() else {
            report.errors.push(format!("card[{i}] is not an object"));
            continue;
        };
        for field in CARD_FIELDS {
            if !card.contains_key(*field) {
                report.errors.push(format!("card[{i}] missing field: {field}"));
            }
        }

        match card.get("kind").and_then(Value::as_str).map(str::trim) {
            Some(kind) if !kind.is_empty() => {
                if !seen.insert(kind.to_string()) {
                    report
                        .errors
                        .push(format!("duplicate card kind in feed: '{kind}'"));
                }
            }
            _ => report
                .errors
                .push(format!("card[{i}] kind must be a non-empty string")),
        }

        match card.get("label") {
            None => {}
            Some(Value::String(label)) => {
                if !Severity::ALL.iter().any(|s| s.as_str() == label.as_str()) {
                    report.errors.push(format!(
                        "card[{i}] label '{label}' is not one of Normal, Watch, Elevated, Critical"
                    ));
                }
            }
            Some(_) => report
                .errors
                .push(format!("card[{i}] label must be a string")),
        }

        match card.get("score") {
            None => {}
            Some(score) => match score.as_i64() {
                None => report
                    .errors
                    .push(format!("card[{i}] score must be an integer (0–100)")),
                Some(s) if !(0..=100).contains(&s) => report
                    .errors
                    .push(format!("card[{i}] score out of range (0–100): {s}")),
                Some(_) => {}
            },
        }

        check_timestamp(
            card.get("generated_at"),
            &format!("card[{i}] generated_at"),
            now,
            &mut report,
        );
    }

    if cards.is_empty() {
        report.errors.push("feed contains 0 cards".to_string());
    } else {
        for kind in CardKind::ALL {
            if !seen.contains(kind.id()) {
                report
                    .errors
                    .push(format!("feed is missing card kind '{}'", kind.id()));
            }
        }
    }

    report
}

/// Reads and checks a feed file. A missing file is an error; malformed JSON is
/// reported as a validation error.
pub fn validate_feed_file(path: &Path) -> Result<FeedReport> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    match serde_json::from_str::<Value>(&content) {
        Ok(value) => Ok(validate_value(&value, Utc::now())),
        Err(e) => Ok(FeedReport {
            errors: vec![format!("feed is not valid JSON: {e}")],
            warnings: Vec::new(),
        }),
    }
}
