use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Duration, FixedOffset, Timelike};
use serde::Deserialize;
use tracing::warn;

use crate::config::SiteConfig;
use crate::io::open_maybe_gz;
use crate::math::stats::{median, range};
use crate::signals::{SignalSet, SignalSource, names};

const VOLATILITY_WINDOW_MIN: i64 = 60;
const VOLATILITY_MIN_POINTS: usize = 4;

#[derive(Debug, Clone, Deserialize)]
pub struct TrafficSnapshot {
    pub ts: DateTime<FixedOffset>,
    #[serde(default)]
    pub current_speed_kmh: Option<f64>,
    #[serde(default)]
    pub freeflow_speed_kmh: Option<f64>,
}

impl TrafficSnapshot {
    /// Current over free-flow speed; lower is worse.
    pub fn ratio(&self) -> Option<f64> {
        let cur = self.current_speed_kmh?;
        let ff = self.freeflow_speed_kmh?;
        if !cur.is_finite() || !ff.is_finite() || ff <= 0.0 {
            return None;
        }
        Some(cur / ff)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrafficSummary {
    pub as_of: DateTime<FixedOffset>,
    pub ratio: Option<f64>,
    pub volatility_60m: f64,
    pub baseline_ratio: Option<f64>,
}

pub fn bucket_15min<T: Timelike>(t: &T) -> u32 {
    (t.hour() * 60 + t.minute()) / 15
}

/// Derives current ratio, 60-minute volatility and the weekday/15-minute
/// baseline from a snapshot history. Returns `None` for an empty history.
pub fn summarize(snapshots: &[TrafficSnapshot], offset: FixedOffset) -> Option<TrafficSummary> {
    let (latest_idx, latest) = snapshots.iter().enumerate().max_by_key(|(_, s)| s.ts)?;

    let window_start = latest.ts - Duration::minutes(VOLATILITY_WINDOW_MIN);
    let mut recent: Vec<(DateTime<FixedOffset>, f64)> = snapshots
        .iter()
        .filter(|s| s.ts >= window_start && s.ts <= latest.ts)
        .filter_map(|s| s.ratio().map(|r| (s.ts, r)))
        .collect();
    recent.sort_by_key(|(ts, _)| *ts);
    let recent_ratios: Vec<f64> = recent.iter().map(|(_, r)| *r).collect();
    let volatility_60m = if recent_ratios.len() >= VOLATILITY_MIN_POINTS {
        range(&recent_ratios)
    } else {
        0.0
    };

    let latest_local = latest.ts.with_timezone(&offset);
    let weekday = latest_local.weekday();
    let bucket = bucket_15min(&latest_local);
    let mut history: Vec<f64> = snapshots
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != latest_idx)
        .filter_map(|(_, s)| {
            let local = s.ts.with_timezone(&offset);
            if local.weekday() != weekday || bucket_15min(&local) != bucket {
                return None;
            }
            s.ratio()
        })
        .collect();

    Some(TrafficSummary {
        as_of: latest.ts,
        ratio: latest.ratio(),
        volatility_60m,
        baseline_ratio: median(&mut history),
    })
}

/// JSON array of flow snapshots, optionally gzip-compressed.
#[derive(Debug, Clone)]
pub struct TrafficSnapshotFile {
    path: PathBuf,
}

impl TrafficSnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SignalSource for TrafficSnapshotFile {
    fn name(&self) -> &'static str {
        "traffic_snapshots"
    }

    fn fetch_signals(&self, config: &SiteConfig) -> Result<SignalSet> {
        let reader = open_maybe_gz(&self.path)
            .with_context(|| format!("failed to open traffic snapshots {}", self.path.display()))?;
        let snapshots: Vec<TrafficSnapshot> = serde_json::from_reader(reader).with_context(|| {
            format!("failed to parse traffic snapshots {}", self.path.display())
        })?;

        let mut set = SignalSet::new();
        let Some(summary) = summarize(&snapshots, config.offset()?) else {
            warn!(path = %self.path.display(), "traffic snapshot file is empty");
            return Ok(set);
        };
        set.as_of = Some(summary.as_of);
        if let Some(ratio) = summary.ratio {
            set.insert(names::TRAFFIC_RATIO, ratio);
        }
        set.insert(names::TRAFFIC_VOLATILITY_60M, summary.volatility_60m);
        if let Some(base) = summary.baseline_ratio {
            set.insert(names::TRAFFIC_BASELINE_RATIO, base);
        }
        Ok(set)
    }
}
