use chrono::DateTime;
use riskcards::config::load_builtin;
use riskcards::error::RiskError;
use riskcards::signals::{
    JsonSignalFile, SignalReader, SignalSet, SignalSource, StaticSignals, collect, names,
};
use std::fs;
use tempfile::TempDir;

#[test]
fn require_reports_missing_name() {
    let set = SignalSet::from_pairs([(names::TRAFFIC_RATIO, 0.8)]);
    assert_eq!(set.require(names::TRAFFIC_RATIO).unwrap(), 0.8);
    match set.require(names::LOGISTICS_COST_INDEX) {
        Err(RiskError::MissingSignal(name)) => assert_eq!(name, "logistics_cost_index"),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn non_finite_values_are_invalid() {
    let mut set = SignalSet::new();
    set.insert(names::AVG_DELIVERY_DELAY_MIN, f64::NAN);
    assert!(matches!(
        set.optional(names::AVG_DELIVERY_DELAY_MIN),
        Err(RiskError::InvalidSignal { .. })
    ));
}

#[test]
fn reader_records_used_inputs() {
    let mut set = SignalSet::from_pairs([(names::RAIN_NOW, 1.0), (names::TRAFFIC_RATIO, 0.7)]);
    set.insert_flag(names::RAIN_LIKELY_NEXT_3H, false);
    let mut reader = SignalReader::new(&set);
    assert_eq!(reader.flag(names::RAIN_NOW).unwrap(), Some(true));
    assert_eq!(reader.flag(names::RAIN_LIKELY_NEXT_3H).unwrap(), Some(false));
    assert_eq!(reader.optional(names::FX_VOL_30D).unwrap(), None);
    let inputs = reader.into_inputs();
    assert_eq!(inputs.len(), 2);
    assert!(!inputs.contains_key(names::TRAFFIC_RATIO));
}

#[test]
fn later_sources_override_earlier() {
    let cfg = load_builtin().unwrap();
    let ts = DateTime::parse_from_rfc3339("2026-01-06T20:00:00-05:00").unwrap();
    let first = SignalSet::from_pairs([(names::TRAFFIC_RATIO, 0.5), (names::RAIN_NOW, 1.0)])
        .with_as_of(ts);
    let second = SignalSet::from_pairs([(names::TRAFFIC_RATIO, 0.9)]);
    let sources: Vec<Box<dyn SignalSource>> =
        vec![Box::new(StaticSignals(first)), Box::new(StaticSignals(second))];

    let merged = collect(&sources, &cfg).unwrap();
    assert_eq!(merged.require(names::TRAFFIC_RATIO).unwrap(), 0.9);
    assert_eq!(merged.require(names::RAIN_NOW).unwrap(), 1.0);
    assert_eq!(merged.as_of, Some(ts));
}

#[test]
fn json_signal_file_reads_as_of_and_values() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("signals.json");
    fs::write(
        &path,
        r#"{"as_of": "2026-01-06T19:30:00-05:00", "signals": {"logistics_cost_index": 87.2, "avg_delivery_delay_min": 12}}"#,
    )
    .unwrap();
    let cfg = load_builtin().unwrap();
    let set = JsonSignalFile::new(&path).fetch_signals(&cfg).unwrap();
    assert_eq!(set.len(), 2);
    assert_eq!(set.require(names::LOGISTICS_COST_INDEX).unwrap(), 87.2);
    assert!(set.as_of.is_some());

    let missing = JsonSignalFile::new(tmp.path().join("nope.json")).fetch_signals(&cfg);
    assert!(missing.is_err());
}
