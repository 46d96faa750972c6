use chrono::{DateTime, FixedOffset};
use riskcards::config::load_builtin;
use riskcards::feed::build_feed;
use riskcards::feed::rollups::{
    infer_urgency, rank_actions, summary_text, top_category, urgency_summary,
};
use riskcards::schema::v1::{
    ActionSource, CardKind, Effort, RankedAction, Severity, SuggestedAction, Urgency,
};
use riskcards::scores::compute_cards_at;
use riskcards::signals::{SignalSet, names};

fn ts(s: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(s).unwrap()
}

fn suggested(action: &str, when: &str, why: &str) -> SuggestedAction {
    SuggestedAction {
        action: action.to_string(),
        when: when.to_string(),
        why: why.to_string(),
        effort: Effort::Low,
        tradeoff: String::new(),
    }
}

fn ranked(
    action: &str,
    urgency: Urgency,
    effort: Effort,
    kind: CardKind,
    level: Severity,
    score: u8,
) -> RankedAction {
    RankedAction {
        action: action.to_string(),
        when: String::new(),
        why: String::new(),
        urgency,
        effort,
        tradeoff: String::new(),
        source: ActionSource {
            kind,
            title: kind.title().to_string(),
            category: kind.category().to_string(),
            status_level: level,
            score,
            generated_at: ts("2026-01-06T17:00:00-05:00"),
        },
    }
}

#[test]
fn urgency_inference() {
    let now = suggested("Confirm late arrivals", "10–15 minutes before reservation time", "");
    assert_eq!(infer_urgency(&now, "0–3h"), Urgency::Now);

    let next = suggested("Add a buffer", "Any booking in the next 3 hours", "");
    assert_eq!(infer_urgency(&next, "7–30d"), Urgency::Next3h);

    let horizon = suggested("Add a small buffer", "If score ≥ 45 (Elevated/High)", "");
    assert_eq!(infer_urgency(&horizon, "0–3h"), Urgency::Next3h);

    let monitor = suggested("Track supplier quotes", "Over the coming weeks", "Prices could rise");
    assert_eq!(infer_urgency(&monitor, "7–30d"), Urgency::Monitor);

    let fallback = suggested("Review margins", "If status is Elevated/Critical", "Costs rise");
    assert_eq!(infer_urgency(&fallback, "7–30d"), Urgency::Next3h);
}

#[test]
fn duplicates_keep_more_severe_source() {
    let actions = vec![
        ranked("Add buffer", Urgency::Next3h, Effort::Low, CardKind::ReservationFlowRisk, Severity::Watch, 30),
        ranked("add buffer ", Urgency::Next3h, Effort::Low, CardKind::LateArrivalRisk, Severity::Elevated, 60),
    ];
    let top = rank_actions(actions, 3);
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].source.kind, CardKind::LateArrivalRisk);
}

#[test]
fn ranking_order() {
    let actions = vec![
        ranked("c", Urgency::Monitor, Effort::Low, CardKind::DeliveryRisk, Severity::Critical, 90),
        ranked("b", Urgency::Next3h, Effort::Medium, CardKind::DeliveryRisk, Severity::Critical, 90),
        ranked("a", Urgency::Next3h, Effort::Low, CardKind::DeliveryRisk, Severity::Critical, 90),
        ranked("d", Urgency::Now, Effort::High, CardKind::DeliveryRisk, Severity::Normal, 5),
    ];
    let top = rank_actions(actions, 3);
    let order: Vec<&str> = top.iter().map(|a| a.action.as_str()).collect();
    assert_eq!(order, vec!["d", "a", "b"]);
    assert_eq!(urgency_summary(&top), "1 Now • 2 Next 3h");
    assert_eq!(urgency_summary(&[]), "No actions");
}

#[test]
fn top_category_and_summary() {
    assert_eq!(top_category(&[]), "Operations");
    assert_eq!(
        summary_text(Severity::Normal, &[]),
        "Conditions look stable; keep normal ops and monitor for changes."
    );
    let delivery = vec![ranked("x", Urgency::Now, Effort::Low, CardKind::DeliveryRisk, Severity::Watch, 40)];
    assert_eq!(top_category(&delivery), "Delivery");
    assert!(summary_text(Severity::Watch, &delivery).starts_with("Watch conditions tonight: delivery"));
}

#[test]
fn feed_rollups_for_scenario() {
    let cfg = load_builtin().unwrap();
    let signals = SignalSet::from_pairs([
        (names::LOGISTICS_COST_INDEX, 87.2),
        (names::AVG_DELIVERY_DELAY_MIN, 12.0),
    ]);
    let cards = compute_cards_at(&signals, &cfg, ts("2026-01-06T17:00:00-05:00")).unwrap();
    let feed = build_feed(&cfg, cards, "0.1.0").unwrap();
    let r = &feed.rollups;

    assert_eq!(feed.generated_at, ts("2026-01-06T17:00:00-05:00"));
    assert_eq!(feed.site_name, "13 Monjas");
    assert_eq!(r.overall_status, Severity::Critical);
    assert_eq!(r.counts_by_level.get(Severity::Normal), 2);
    assert_eq!(r.counts_by_level.get(Severity::Watch), 1);
    assert_eq!(r.counts_by_level.get(Severity::Elevated), 0);
    assert_eq!(r.counts_by_level.get(Severity::Critical), 1);
    assert_eq!(r.top_actions.len(), 3);
    assert_eq!(r.urgency_summary, "2 Now • 1 Next 3h");
    assert_eq!(
        r.top_actions[2].action,
        "Avoid locking large forward orders without price confirmation"
    );
    assert_eq!(
        r.summary,
        "Critical conditions: significant disruption likely; enact contingency ops and communicate early to protect reservations."
    );

    let v = serde_json::to_value(&feed).unwrap();
    assert_eq!(v["rollups"]["counts_by_level"]["Normal"], 2);
    assert_eq!(v["rollups"]["top_actions"][0]["urgency"], "Now");
}
