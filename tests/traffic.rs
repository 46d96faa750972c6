use std::fs;
use std::io::Write;

use chrono::{DateTime, FixedOffset};
use flate2::Compression;
use flate2::write::GzEncoder;
use riskcards::config::load_builtin;
use riskcards::signals::traffic::{TrafficSnapshot, bucket_15min, summarize};
use riskcards::signals::{SignalSource, TrafficSnapshotFile, names};
use tempfile::TempDir;

fn snap(ts: &str, cur: f64, ff: f64) -> TrafficSnapshot {
    TrafficSnapshot {
        ts: DateTime::parse_from_rfc3339(ts).unwrap(),
        current_speed_kmh: Some(cur),
        freeflow_speed_kmh: Some(ff),
    }
}

fn lima() -> FixedOffset {
    FixedOffset::west_opt(5 * 3600).unwrap()
}

fn history() -> Vec<TrafficSnapshot> {
    vec![
        // Same weekday and 15-minute bucket, previous weeks.
        snap("2025-12-23T20:10:00-05:00", 35.0, 50.0),
        snap("2025-12-30T20:05:00-05:00", 45.0, 50.0),
        // Last hour.
        snap("2026-01-06T19:00:00-05:00", 45.0, 50.0),
        snap("2026-01-06T19:20:00-05:00", 40.0, 50.0),
        snap("2026-01-06T19:40:00-05:00", 35.0, 50.0),
        snap("2026-01-06T20:00:00-05:00", 30.0, 50.0),
    ]
}

#[test]
fn summary_uses_latest_snapshot() {
    let summary = summarize(&history(), lima()).unwrap();
    assert_eq!(
        summary.as_of,
        DateTime::parse_from_rfc3339("2026-01-06T20:00:00-05:00").unwrap()
    );
    assert!((summary.ratio.unwrap() - 0.6).abs() < 1e-9);
    assert!((summary.volatility_60m - 0.3).abs() < 1e-9);
    assert!((summary.baseline_ratio.unwrap() - 0.8).abs() < 1e-9);
}

#[test]
fn volatility_needs_four_points() {
    let snaps = vec![
        snap("2026-01-06T19:20:00-05:00", 40.0, 50.0),
        snap("2026-01-06T19:40:00-05:00", 20.0, 50.0),
        snap("2026-01-06T20:00:00-05:00", 30.0, 50.0),
    ];
    let summary = summarize(&snaps, lima()).unwrap();
    assert_eq!(summary.volatility_60m, 0.0);
    assert!(summary.baseline_ratio.is_none());
}

#[test]
fn zero_freeflow_has_no_ratio() {
    let s = snap("2026-01-06T20:00:00-05:00", 30.0, 0.0);
    assert!(s.ratio().is_none());
    assert!(summarize(&[], lima()).is_none());
}

#[test]
fn bucket_is_quarter_hour_of_day() {
    let t = DateTime::parse_from_rfc3339("2026-01-06T20:14:59-05:00").unwrap();
    assert_eq!(bucket_15min(&t), 80);
}

#[test]
fn gzipped_file_source() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("traffic.json.gz");
    let body = serde_json::json!([
        {"ts": "2026-01-06T19:40:00-05:00", "current_speed_kmh": 35.0, "freeflow_speed_kmh": 50.0},
        {"ts": "2026-01-06T20:00:00-05:00", "current_speed_kmh": 30.0, "freeflow_speed_kmh": 50.0}
    ]);
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(body.to_string().as_bytes()).unwrap();
    fs::write(&path, enc.finish().unwrap()).unwrap();

    let cfg = load_builtin().unwrap();
    let set = TrafficSnapshotFile::new(&path).fetch_signals(&cfg).unwrap();
    assert!((set.require(names::TRAFFIC_RATIO).unwrap() - 0.6).abs() < 1e-9);
    assert_eq!(set.require(names::TRAFFIC_VOLATILITY_60M).unwrap(), 0.0);
    assert!(!set.contains(names::TRAFFIC_BASELINE_RATIO));
    assert!(set.as_of.is_some());
}

#[test]
fn empty_file_yields_no_signals() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("traffic.json");
    fs::write(&path, "[]").unwrap();
    let cfg = load_builtin().unwrap();
    let set = TrafficSnapshotFile::new(&path).fetch_signals(&cfg).unwrap();
    assert!(set.is_empty());
}
