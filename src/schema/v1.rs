use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

pub const CARD_SCHEMA_VERSION: &str = "risk-card-v1";
pub const FEED_SCHEMA_VERSION: &str = "risk-feed-v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    ReservationFlowRisk,
    LateArrivalRisk,
    DeliveryRisk,
    LogisticsCostPressureRisk,
}

impl CardKind {
    /// Every kind, in emission order.
    pub const ALL: [CardKind; 4] = [
        CardKind::ReservationFlowRisk,
        CardKind::LateArrivalRisk,
        CardKind::DeliveryRisk,
        CardKind::LogisticsCostPressureRisk,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            CardKind::ReservationFlowRisk => "reservation_flow_risk",
            CardKind::LateArrivalRisk => "late_arrival_risk",
            CardKind::DeliveryRisk => "delivery_risk",
            CardKind::LogisticsCostPressureRisk => "logistics_cost_pressure_risk",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.id() == id)
    }

    pub fn title(&self) -> &'static str {
        match self {
            CardKind::ReservationFlowRisk => "Reservation Flow Risk",
            CardKind::LateArrivalRisk => "Late Arrival Risk",
            CardKind::DeliveryRisk => "Delivery Risk",
            CardKind::LogisticsCostPressureRisk => "Logistics Cost Pressure Risk",
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            CardKind::ReservationFlowRisk | CardKind::LateArrivalRisk => "Reservations",
            CardKind::DeliveryRisk => "Delivery",
            CardKind::LogisticsCostPressureRisk => "Logistics",
        }
    }

    pub fn time_horizon(&self) -> &'static str {
        match self {
            CardKind::LogisticsCostPressureRisk => "7–30d",
            _ => "0–3h",
        }
    }

    pub fn trust_note(&self) -> &'static str {
        match self {
            CardKind::ReservationFlowRisk | CardKind::LateArrivalRisk => {
                "This insight is based entirely on external conditions (traffic, weather, timing, location). No internal reservation or customer data is used."
            }
            CardKind::DeliveryRisk => {
                "This insight uses external conditions (traffic/weather) and the observed average delivery delay. No individual order data is used."
            }
            CardKind::LogisticsCostPressureRisk => {
                "This card uses Peru-wide macro indicators (BCRPData) as upstream proxies; it does not use restaurant purchase invoices."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Normal,
    Watch,
    Elevated,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Normal,
        Severity::Watch,
        Severity::Elevated,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Normal => "Normal",
            Severity::Watch => "Watch",
            Severity::Elevated => "Elevated",
            Severity::Critical => "Critical",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Severity::Normal => "🟢",
            Severity::Watch => "🟡",
            Severity::Elevated => "🟠",
            Severity::Critical => "🔴",
        }
    }

    pub fn rank(&self) -> u8 {
        *self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Impact {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Effort {
    Low,
    Medium,
    High,
}

impl Effort {
    pub fn rank(&self) -> u8 {
        *self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Urgency {
    Now,
    #[serde(rename = "Next 3h")]
    Next3h,
    Monitor,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Now => "Now",
            Urgency::Next3h => "Next 3h",
            Urgency::Monitor => "Monitor",
        }
    }

    pub fn rank(&self) -> u8 {
        *self as u8
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub label: String,
    pub impact: Impact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedAction {
    pub action: String,
    pub when: String,
    pub why: String,
    pub effort: Effort,
    pub tradeoff: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskCard {
    pub schema_version: String,
    pub kind: CardKind,
    pub title: String,
    pub category: String,
    pub time_horizon: String,
    pub score: u8,
    pub label: Severity,
    pub icon: String,
    pub subtitle: String,
    pub confidence: Confidence,
    pub confidence_reason: String,
    pub summary: String,
    pub drivers: Vec<Driver>,
    pub implications: Vec<String>,
    pub supported_considerations: Vec<String>,
    pub suggested_actions: Vec<SuggestedAction>,
    pub outlook: Option<String>,
    pub trust_note: String,
    pub inputs: BTreeMap<String, f64>,
    pub generated_at: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceWindowLocal {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSource {
    pub kind: CardKind,
    pub title: String,
    pub category: String,
    pub status_level: Severity,
    pub score: u8,
    pub generated_at: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedAction {
    pub action: String,
    pub when: String,
    pub why: String,
    pub urgency: Urgency,
    pub effort: Effort,
    pub tradeoff: String,
    pub source: ActionSource,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountsByLevel {
    #[serde(rename = "Normal")]
    pub normal: usize,
    #[serde(rename = "Watch")]
    pub watch: usize,
    #[serde(rename = "Elevated")]
    pub elevated: usize,
    #[serde(rename = "Critical")]
    pub critical: usize,
}

impl CountsByLevel {
    pub fn add(&mut self, level: Severity) {
        match level {
            Severity::Normal => self.normal += 1,
            Severity::Watch => self.watch += 1,
            Severity::Elevated => self.elevated += 1,
            Severity::Critical => self.critical += 1,
        }
    }

    pub fn get(&self, level: Severity) -> usize {
        match level {
            Severity::Normal => self.normal,
            Severity::Watch => self.watch,
            Severity::Elevated => self.elevated,
            Severity::Critical => self.critical,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rollups {
    pub overall_status: Severity,
    pub counts_by_level: CountsByLevel,
    pub top_actions: Vec<RankedAction>,
    pub urgency_summary: String,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feed {
    pub schema_version: String,
    pub tool: String,
    pub version: String,
    pub site_id: String,
    pub site_name: String,
    pub generated_at: DateTime<FixedOffset>,
    pub service_window: ServiceWindowLocal,
    pub cards: Vec<RiskCard>,
    pub rollups: Rollups,
}
