use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config::SiteConfig;
use crate::io::open_maybe_gz;
use crate::signals::{SignalSet, SignalSource, names};

const RAIN_MM_THRESHOLD: f64 = 0.2;
const RAIN_POP_THRESHOLD: f64 = 0.5;
const OUTLOOK_HOURS: usize = 3;

/// OpenWeather-style payload: current conditions plus an hourly forecast.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherPayload {
    #[serde(default)]
    pub current: Option<WeatherPoint>,
    #[serde(default)]
    pub hourly: Vec<WeatherPoint>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherPoint {
    #[serde(default)]
    pub pop: Option<f64>,
    #[serde(default)]
    pub rain: Option<RainVolume>,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RainVolume {
    #[serde(rename = "1h", default)]
    pub one_hour: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherCondition {
    #[serde(default)]
    pub main: Option<String>,
}

impl WeatherPoint {
    fn rain_mm(&self) -> f64 {
        self.rain
            .as_ref()
            .and_then(|r| r.one_hour)
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    }

    fn labelled_rain(&self) -> bool {
        self.weather
            .first()
            .and_then(|w| w.main.as_deref())
            .map(|m| m.to_lowercase().contains("rain"))
            .unwrap_or(false)
    }

    fn pop(&self) -> Option<f64> {
        self.pop.filter(|v| v.is_finite())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RainOutlook {
    pub rain_likely: bool,
    /// `None` when no hour in the window carries a numeric `pop`.
    pub max_pop: Option<f64>,
}

pub fn rain_now(payload: &WeatherPayload) -> Option<bool> {
    let cur = payload.current.as_ref()?;
    Some(cur.labelled_rain() || cur.rain_mm() >= RAIN_MM_THRESHOLD)
}

pub fn outlook_next_3h(payload: &WeatherPayload) -> Option<RainOutlook> {
    if payload.hourly.is_empty() {
        return None;
    }
    let mut max_pop: Option<f64> = None;
    let mut rain_likely = false;
    for hour in payload.hourly.iter().take(OUTLOOK_HOURS) {
        let pop = hour.pop();
        if let Some(p) = pop {
            max_pop = Some(max_pop.map_or(p, |m| m.max(p)));
        }
        if pop.is_some_and(|p| p >= RAIN_POP_THRESHOLD)
            || hour.rain_mm() >= RAIN_MM_THRESHOLD
            || hour.labelled_rain()
        {
            rain_likely = true;
        }
    }
    Some(RainOutlook {
        rain_likely,
        max_pop,
    })
}

pub fn weather_signals(payload: &WeatherPayload) -> SignalSet {
    let mut set = SignalSet::new();
    if let Some(now) = rain_now(payload) {
        set.insert_flag(names::RAIN_NOW, now);
    }
    if let Some(out) = outlook_next_3h(payload) {
        if let Some(pop) = out.max_pop {
            set.insert(names::RAIN_POP_NEXT_3H, pop);
        }
        set.insert_flag(names::RAIN_LIKELY_NEXT_3H, out.rain_likely);
    }
    set
}

#[derive(Debug, Clone)]
pub struct WeatherPayloadFile {
    path: PathBuf,
}

impl WeatherPayloadFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SignalSource for WeatherPayloadFile {
    fn name(&self) -> &'static str {
        "weather_payload"
    }

    fn fetch_signals(&self, _config: &SiteConfig) -> Result<SignalSet> {
        let reader = open_maybe_gz(&self.path)
            .with_context(|| format!("failed to open weather payload {}", self.path.display()))?;
        let payload: WeatherPayload = serde_json::from_reader(reader)
            .with_context(|| format!("failed to parse weather payload {}", self.path.display()))?;
        Ok(weather_signals(&payload))
    }
}
