mod loader;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::error::RiskError;

pub use loader::{load_builtin, load_site_config, parse_site_config};

/// Per-site run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub site_id: String,
    #[serde(default)]
    pub site_name: Option<String>,
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default = "HourWindow::default_service")]
    pub service_window: HourWindow,
    #[serde(default = "HourWindow::default_peak")]
    pub peak_window: HourWindow,
    #[serde(default)]
    pub severity_thresholds: SeverityThresholds,
}

/// Same-day window of local hours, `start_hour <= h < end_hour`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourWindow {
    pub start_hour: i32,
    pub end_hour: i32,
}

/// Lower score bound of each tier. Missing bounds keep their default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityThresholds {
    pub watch_min: i32,
    pub elevated_min: i32,
    pub critical_min: i32,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            watch_min: 25,
            elevated_min: 50,
            critical_min: 75,
        }
    }
}

fn default_utc_offset_hours() -> i32 {
    -5
}

impl HourWindow {
    pub fn default_service() -> Self {
        Self {
            start_hour: 16,
            end_hour: 23,
        }
    }

    pub fn default_peak() -> Self {
        Self {
            start_hour: 19,
            end_hour: 22,
        }
    }

    pub fn contains(&self, hour: u32) -> bool {
        let h = hour as i32;
        self.start_hour <= h && h < self.end_hour
    }

    pub fn start_hhmm(&self) -> String {
        format!("{:02}:00", self.start_hour)
    }

    pub fn end_hhmm(&self) -> String {
        format!("{:02}:00", self.end_hour)
    }

    pub fn label(&self) -> String {
        format!("{}–{}", self.start_hhmm(), self.end_hhmm())
    }

    fn validate(&self, field: &str) -> Result<(), RiskError> {
        if !(0..=24).contains(&self.start_hour) {
            return Err(RiskError::config(
                format!("{field}.start_hour"),
                format!("{} is outside 0..=24", self.start_hour),
            ));
        }
        if !(0..=24).contains(&self.end_hour) {
            return Err(RiskError::config(
                format!("{field}.end_hour"),
                format!("{} is outside 0..=24", self.end_hour),
            ));
        }
        if self.start_hour >= self.end_hour {
            return Err(RiskError::config(
                field,
                format!(
                    "start_hour {} must be before end_hour {}",
                    self.start_hour, self.end_hour
                ),
            ));
        }
        Ok(())
    }
}

impl SeverityThresholds {
    fn validate(&self) -> Result<(), RiskError> {
        let ordered = 0 < self.watch_min
            && self.watch_min < self.elevated_min
            && self.elevated_min < self.critical_min
            && self.critical_min <= 100;
        if !ordered {
            return Err(RiskError::config(
                "severity_thresholds",
                format!(
                    "expected 0 < watch_min < elevated_min < critical_min <= 100, got {}/{}/{}",
                    self.watch_min, self.elevated_min, self.critical_min
                ),
            ));
        }
        Ok(())
    }
}

impl SiteConfig {
    pub fn display_name(&self) -> &str {
        match &self.site_name {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.site_id,
        }
    }

    pub fn offset(&self) -> Result<FixedOffset, RiskError> {
        FixedOffset::east_opt(self.utc_offset_hours * 3600).ok_or_else(|| {
            RiskError::config(
                "utc_offset_hours",
                format!("{} is not a valid offset", self.utc_offset_hours),
            )
        })
    }

    pub fn validate(&self) -> Result<(), RiskError> {
        if self.site_id.trim().is_empty() {
            return Err(RiskError::config("site_id", "must be present and non-empty"));
        }
        if !(-12..=14).contains(&self.utc_offset_hours) {
            return Err(RiskError::config(
                "utc_offset_hours",
                format!("{} is outside -12..=14", self.utc_offset_hours),
            ));
        }
        if let Some(lat) = self.lat {
            if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
                return Err(RiskError::config("lat", format!("{} is not a latitude", lat)));
            }
        }
        if let Some(lon) = self.lon {
            if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
                return Err(RiskError::config("lon", format!("{} is not a longitude", lon)));
            }
        }
        self.service_window.validate("service_window")?;
        self.peak_window.validate("peak_window")?;
        self.severity_thresholds.validate()?;
        Ok(())
    }
}
