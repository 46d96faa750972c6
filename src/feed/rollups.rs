use std::cmp::Reverse;
use std::collections::HashMap;

use crate::schema::v1::{
    ActionSource, CountsByLevel, RankedAction, RiskCard, Rollups, Severity, SuggestedAction,
    Urgency,
};

pub const TOP_ACTIONS: usize = 3;

const NOW_MARKERS: &[&str] = &[
    "now",
    "immediately",
    "right away",
    "10",
    "15",
    "minutes",
    "minute",
    "shortly before",
    "before reservation",
    "check-in",
    "call",
    "confirm",
];

const NEXT_3H_MARKERS: &[&str] = &[
    "next 3 hours",
    "next 3h",
    "next 2 hours",
    "next 2h",
    "during peak",
    "peak window",
    "tonight",
];

const MONITOR_MARKERS: &[&str] = &["monitor", "keep an eye", "if conditions", "may", "could", "watch"];

const DEFAULT_CATEGORY: &str = "Operations";

fn contains_any(text: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| text.contains(m))
}

/// Infers urgency from the action's timing text, falling back to the card horizon.
pub fn infer_urgency(action: &SuggestedAction, time_horizon: &str) -> Urgency {
    let when = action.when.trim().to_lowercase();
    let why = action.why.trim().to_lowercase();
    let text = action.action.trim().to_lowercase();

    if contains_any(&when, NOW_MARKERS) || text.contains("shortly before") {
        return Urgency::Now;
    }
    if contains_any(&when, NEXT_3H_MARKERS) {
        return Urgency::Next3h;
    }
    let horizon = time_horizon.trim().to_lowercase();
    if horizon.contains("0–3") || horizon.contains("0-3") {
        return Urgency::Next3h;
    }
    if contains_any(&why, MONITOR_MARKERS) || contains_any(&text, MONITOR_MARKERS) {
        return Urgency::Monitor;
    }
    Urgency::Next3h
}

pub fn extract_actions(cards: &[RiskCard]) -> Vec<RankedAction> {
    let mut out = Vec::new();
    for card in cards {
        for suggested in &card.suggested_actions {
            let text = suggested.action.trim();
            if text.is_empty() {
                continue;
            }
            out.push(RankedAction {
                action: text.to_string(),
                when: suggested.when.clone(),
                why: suggested.why.clone(),
                urgency: infer_urgency(suggested, &card.time_horizon),
                effort: suggested.effort,
                tradeoff: suggested.tradeoff.clone(),
                source: ActionSource {
                    kind: card.kind,
                    title: card.title.clone(),
                    category: card.category.clone(),
                    status_level: card.label,
                    score: card.score,
                    generated_at: card.generated_at,
                },
            });
        }
    }
    out
}

// Higher is preferred when two cards suggest the same action.
fn dedup_key(a: &RankedAction) -> (u8, Reverse<u8>, u8) {
    (
        a.source.status_level.rank(),
        Reverse(a.effort.rank()),
        a.source.score,
    )
}

/// Deduplicates by action text and returns the best `top_n` actions.
pub fn rank_actions(actions: Vec<RankedAction>, top_n: usize) -> Vec<RankedAction> {
    let mut order: Vec<String> = Vec::new();
    let mut by_key: HashMap<String, RankedAction> = HashMap::new();
    for action in actions {
        let key = action.action.trim().to_lowercase();
        let replace = match by_key.get(&key) {
            None => {
                order.push(key.clone());
                true
            }
            Some(existing) => dedup_key(&action) > dedup_key(existing),
        };
        if replace {
            by_key.insert(key, action);
        }
    }

    let mut deduped: Vec<RankedAction> = order
        .into_iter()
        .filter_map(|key| by_key.remove(&key))
        .collect();
    deduped.sort_by(|a, b| {
        a.urgency
            .rank()
            .cmp(&b.urgency.rank())
            .then(b.source.status_level.rank().cmp(&a.source.status_level.rank()))
            .then(a.effort.rank().cmp(&b.effort.rank()))
            .then(b.source.score.cmp(&a.source.score))
            .then_with(|| a.action.cmp(&b.action))
    });
    deduped.truncate(top_n);
    deduped
}

pub fn overall_status(cards: &[RiskCard]) -> Severity {
    cards
        .iter()
        .map(|c| c.label)
        .max()
        .unwrap_or(Severity::Normal)
}

pub fn counts_by_level(cards: &[RiskCard]) -> CountsByLevel {
    let mut counts = CountsByLevel::default();
    for card in cards {
        counts.add(card.label);
    }
    counts
}

pub fn urgency_summary(top_actions: &[RankedAction]) -> String {
    let parts: Vec<String> = [Urgency::Now, Urgency::Next3h, Urgency::Monitor]
        .into_iter()
        .filter_map(|u| {
            let n = top_actions.iter().filter(|a| a.urgency == u).count();
            (n > 0).then(|| format!("{n} {}", u.as_str()))
        })
        .collect();
    if parts.is_empty() {
        "No actions".to_string()
    } else {
        parts.join(" • ")
    }
}

/// Most frequent category among the top actions; severity breaks ties.
pub fn top_category(top_actions: &[RankedAction]) -> String {
    let mut tally: HashMap<&str, u32> = HashMap::new();
    let mut best = DEFAULT_CATEGORY;
    let mut best_score: i64 = -1;
    for action in top_actions {
        let category = action.source.category.as_str();
        let count = tally.entry(category).or_insert(0);
        *count += 1;
        let score = i64::from(*count) * 10 + i64::from(action.source.status_level.rank());
        if score > best_score {
            best_score = score;
            best = category;
        }
    }
    best.to_string()
}

pub fn summary_text(overall: Severity, top_actions: &[RankedAction]) -> String {
    let category = top_category(top_actions).to_lowercase();
    match overall {
        Severity::Normal if top_actions.is_empty() => {
            "Conditions look stable; keep normal ops and monitor for changes.".to_string()
        }
        Severity::Normal => {
            format!("Conditions look stable; keep normal ops and monitor {category} for changes.")
        }
        Severity::Watch if category == "delivery" => {
            "Watch conditions tonight: delivery reliability may vary; apply quick buffers and prioritize nearby zones.".to_string()
        }
        Severity::Watch if category == "reservations" => {
            "Watch conditions tonight: arrival timing may vary; use proactive check-ins and small buffers to protect flow.".to_string()
        }
        Severity::Watch => format!(
            "Watch conditions tonight: increased variability likely; take quick steps to protect {category}."
        ),
        Severity::Elevated => format!(
            "Elevated risk tonight: disruptions are likely; prioritize buffers and proactive messaging to protect {category}."
        ),
        Severity::Critical => format!(
            "Critical conditions: significant disruption likely; enact contingency ops and communicate early to protect {category}."
        ),
    }
}

pub fn build_rollups(cards: &[RiskCard]) -> Rollups {
    let top_actions = rank_actions(extract_actions(cards), TOP_ACTIONS);
    let overall = overall_status(cards);
    Rollups {
        overall_status: overall,
        counts_by_level: counts_by_level(cards),
        urgency_summary: urgency_summary(&top_actions),
        summary: summary_text(overall, &top_actions),
        top_actions,
    }
}
