use std::collections::BTreeSet;
use std::fs;

use chrono::{DateTime, FixedOffset};
use riskcards::config::load_builtin;
use riskcards::ctx::Ctx;
use riskcards::error::RiskError;
use riskcards::pipeline::Pipeline;
use riskcards::schema::v1::{CardKind, Severity};
use riskcards::scores::compute_cards_at;
use riskcards::signals::{SignalSet, SignalSource, StaticSignals, names};
use tempfile::TempDir;

fn ts(s: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(s).unwrap()
}

fn scenario() -> SignalSet {
    SignalSet::from_pairs([
        (names::LOGISTICS_COST_INDEX, 87.2),
        (names::AVG_DELIVERY_DELAY_MIN, 12.0),
    ])
}

fn static_ctx(signals: SignalSet, out: &std::path::Path) -> Ctx {
    let sources: Vec<Box<dyn SignalSource>> = vec![Box::new(StaticSignals(signals))];
    let mut ctx = Ctx::new(None, sources, out.to_path_buf(), true, true, "test");
    ctx.generated_at = Some(ts("2026-01-06T17:00:00-05:00"));
    ctx
}

#[test]
fn scenario_yields_four_cards() {
    let cfg = load_builtin().unwrap();
    let cards = compute_cards_at(&scenario(), &cfg, ts("2026-01-06T17:00:00-05:00")).unwrap();
    assert_eq!(cards.len(), 4);
    let kinds: BTreeSet<CardKind> = cards.iter().map(|c| c.kind).collect();
    assert_eq!(kinds, CardKind::ALL.into_iter().collect::<BTreeSet<_>>());

    let delivery = cards.iter().find(|c| c.kind == CardKind::DeliveryRisk).unwrap();
    assert_eq!(delivery.score, 45);
    assert_eq!(delivery.label, Severity::Watch);
    assert_eq!(delivery.icon, "🟡");
    assert!(delivery.inputs.contains_key(names::AVG_DELIVERY_DELAY_MIN));

    let logistics = cards
        .iter()
        .find(|c| c.kind == CardKind::LogisticsCostPressureRisk)
        .unwrap();
    assert_eq!(logistics.score, 87);
    assert_eq!(logistics.label, Severity::Critical);
    assert_eq!(logistics.time_horizon, "7–30d");
    assert_eq!(logistics.inputs.get(names::LOGISTICS_COST_INDEX), Some(&87.2));
}

#[test]
fn removing_index_fails_whole_run() {
    let cfg = load_builtin().unwrap();
    let mut signals = scenario();
    signals.remove(names::LOGISTICS_COST_INDEX);
    let err = compute_cards_at(&signals, &cfg, ts("2026-01-06T17:00:00-05:00")).unwrap_err();
    assert!(matches!(err, RiskError::MissingSignal(ref n) if n == "logistics_cost_index"));
}

#[test]
fn scoring_is_idempotent() {
    let cfg = load_builtin().unwrap();
    let at = ts("2026-01-06T20:30:00-05:00");
    let a = compute_cards_at(&scenario(), &cfg, at).unwrap();
    let b = compute_cards_at(&scenario(), &cfg, at).unwrap();
    for (x, y) in a.iter().zip(&b) {
        assert_eq!(x.kind, y.kind);
        assert_eq!(x.score, y.score);
        assert_eq!(x.label, y.label);
    }
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn extreme_values_stay_in_range() {
    let cfg = load_builtin().unwrap();
    let cases = [1e12, -1e12, 0.0, f64::MAX, f64::MIN_POSITIVE];
    for v in cases {
        let signals = SignalSet::from_pairs([
            (names::LOGISTICS_COST_INDEX, v),
            (names::AVG_DELIVERY_DELAY_MIN, v),
            (names::TRAFFIC_RATIO, v),
            (names::TRAFFIC_BASELINE_RATIO, -v),
            (names::TRAFFIC_VOLATILITY_60M, v),
            (names::RAIN_POP_NEXT_3H, v),
            (names::FOOD_INFLATION_YOY, v),
            (names::TRANSPORT_INFLATION, v),
            (names::FX_VOL_30D, v),
            (names::FX_VOL_180D, -v),
        ]);
        let cards = compute_cards_at(&signals, &cfg, ts("2026-01-06T20:00:00-05:00")).unwrap();
        assert_eq!(cards.len(), 4);
        for card in cards {
            assert!(card.score <= 100, "{:?} scored {}", card.kind, card.score);
        }
    }
}

#[test]
fn infinite_signal_is_rejected() {
    let cfg = load_builtin().unwrap();
    let mut signals = scenario();
    signals.insert(names::TRAFFIC_RATIO, f64::INFINITY);
    let err = compute_cards_at(&signals, &cfg, ts("2026-01-06T20:00:00-05:00")).unwrap_err();
    assert!(matches!(err, RiskError::InvalidSignal { .. }));
}

#[test]
fn pipeline_writes_cards_feed_and_tsv() {
    let tmp = TempDir::new().unwrap();
    let mut ctx = static_ctx(scenario(), tmp.path());
    Pipeline::standard().run(&mut ctx).unwrap();

    assert_eq!(ctx.cards.len(), 4);
    let feed = ctx.feed.as_ref().unwrap();
    assert_eq!(feed.site_id, "13monjas");
    assert_eq!(feed.rollups.overall_status, Severity::Critical);
    assert_eq!(feed.service_window.start, "16:00");

    for kind in CardKind::ALL {
        let path = ctx.output.cards_dir.join(format!("{}.json", kind.id()));
        assert!(path.exists(), "missing {}", path.display());
    }
    let v: serde_json::Value =
        serde_json::from_slice(&fs::read(&ctx.output.feed_path).unwrap()).unwrap();
    assert_eq!(v["schema_version"], "risk-feed-v1");
    assert_eq!(v["cards"].as_array().unwrap().len(), 4);

    let tsv = fs::read_to_string(&ctx.output.tsv_path).unwrap();
    assert_eq!(tsv.lines().count(), 5);
    assert!(tsv.starts_with("kind\tcategory\ttime_horizon\tscore\tlabel"));

    let summary = riskcards::io::summary::format_summary(&ctx).unwrap();
    assert!(summary.contains("Overall: 🔴 Critical"));
}

#[test]
fn missing_signal_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("outputs");
    let mut signals = scenario();
    signals.remove(names::AVG_DELIVERY_DELAY_MIN);
    let mut ctx = static_ctx(signals, &out);

    let err = Pipeline::standard().run(&mut ctx).unwrap_err();
    match err.downcast_ref::<RiskError>() {
        Some(RiskError::MissingSignal(name)) => assert_eq!(name, "avg_delivery_delay_min"),
        other => panic!("unexpected {:?}", other),
    }
    assert!(ctx.cards.is_empty());
    assert!(ctx.feed.is_none());
    assert!(!out.exists());
}

#[test]
fn no_write_keeps_results_in_memory() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("outputs");
    let mut ctx = static_ctx(scenario(), &out);
    ctx.write_outputs = false;
    Pipeline::standard().run(&mut ctx).unwrap();
    assert!(ctx.feed.is_some());
    assert!(!out.exists());
}
