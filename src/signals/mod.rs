pub mod bcrp;
pub mod file;
pub mod traffic;
pub mod weather;

use std::collections::BTreeMap;
use std::fmt;

use anyhow::Result;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::SiteConfig;
use crate::error::RiskError;

pub use bcrp::BcrpSeriesDir;
pub use file::JsonSignalFile;
pub use traffic::TrafficSnapshotFile;
pub use weather::WeatherPayloadFile;

/// Signal names understood by the scorers.
pub mod names {
    pub const AVG_DELIVERY_DELAY_MIN: &str = "avg_delivery_delay_min";
    pub const LOGISTICS_COST_INDEX: &str = "logistics_cost_index";
    pub const TRAFFIC_RATIO: &str = "traffic_ratio";
    pub const TRAFFIC_BASELINE_RATIO: &str = "traffic_baseline_ratio";
    pub const TRAFFIC_VOLATILITY_60M: &str = "traffic_volatility_60m";
    pub const RAIN_NOW: &str = "rain_now";
    pub const RAIN_LIKELY_NEXT_3H: &str = "rain_likely_next_3h";
    pub const RAIN_POP_NEXT_3H: &str = "rain_pop_next_3h";
    pub const FOOD_INFLATION_YOY: &str = "food_inflation_yoy";
    pub const TRANSPORT_INFLATION: &str = "transport_inflation";
    pub const FX_VOL_30D: &str = "fx_vol_30d";
    pub const FX_VOL_180D: &str = "fx_vol_180d";
}

/// External inputs for one run: named numeric signals plus the time they were observed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalSet {
    #[serde(default)]
    pub as_of: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    signals: BTreeMap<String, f64>,
}

impl SignalSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let mut set = Self::new();
        for (name, value) in pairs {
            set.insert(name, value);
        }
        set
    }

    pub fn with_as_of(mut self, as_of: DateTime<FixedOffset>) -> Self {
        self.as_of = Some(as_of);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.signals.insert(name.into(), value);
    }

    pub fn insert_flag(&mut self, name: impl Into<String>, value: bool) {
        self.insert(name, if value { 1.0 } else { 0.0 });
    }

    pub fn remove(&mut self, name: &str) -> Option<f64> {
        self.signals.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.signals.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.signals.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn require(&self, name: &str) -> Result<f64, RiskError> {
        self.optional(name)?
            .ok_or_else(|| RiskError::MissingSignal(name.to_string()))
    }

    pub fn optional(&self, name: &str) -> Result<Option<f64>, RiskError> {
        match self.signals.get(name) {
            None => Ok(None),
            Some(v) if v.is_finite() => Ok(Some(*v)),
            Some(v) => Err(RiskError::InvalidSignal {
                name: name.to_string(),
                value: *v,
            }),
        }
    }

    /// Overlays `other` on top of `self`; values and `as_of` from `other` win.
    pub fn merge_from(&mut self, other: SignalSet) {
        if other.as_of.is_some() {
            self.as_of = other.as_of;
        }
        self.signals.extend(other.signals);
    }
}

/// Reads signals on behalf of one scorer and keeps every value it used.
pub struct SignalReader<'a> {
    signals: &'a SignalSet,
    used: BTreeMap<String, f64>,
}

impl<'a> SignalReader<'a> {
    pub fn new(signals: &'a SignalSet) -> Self {
        Self {
            signals,
            used: BTreeMap::new(),
        }
    }

    pub fn require(&mut self, name: &str) -> Result<f64, RiskError> {
        let value = self.signals.require(name)?;
        self.used.insert(name.to_string(), value);
        Ok(value)
    }

    pub fn optional(&mut self, name: &str) -> Result<Option<f64>, RiskError> {
        let value = self.signals.optional(name)?;
        if let Some(v) = value {
            self.used.insert(name.to_string(), v);
        }
        Ok(value)
    }

    /// 0/1 style flags; anything at or above 0.5 counts as set.
    pub fn flag(&mut self, name: &str) -> Result<Option<bool>, RiskError> {
        Ok(self.optional(name)?.map(|v| v >= 0.5))
    }

    pub fn into_inputs(self) -> BTreeMap<String, f64> {
        self.used
    }
}

/// A supplier of external signals for a site.
pub trait SignalSource: fmt::Debug {
    fn name(&self) -> &'static str;
    fn fetch_signals(&self, config: &SiteConfig) -> Result<SignalSet>;
}

/// In-memory source, used for fixtures and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticSignals(pub SignalSet);

impl SignalSource for StaticSignals {
    fn name(&self) -> &'static str {
        "static"
    }

    fn fetch_signals(&self, _config: &SiteConfig) -> Result<SignalSet> {
        Ok(self.0.clone())
    }
}

/// Fetches every source in order and merges them; later sources override earlier ones.
pub fn collect(sources: &[Box<dyn SignalSource>], config: &SiteConfig) -> Result<SignalSet> {
    let mut merged = SignalSet::new();
    for source in sources {
        let set = source.fetch_signals(config)?;
        info!(source = source.name(), signals = set.len(), "signal source loaded");
        merged.merge_from(set);
    }
    Ok(merged)
}
