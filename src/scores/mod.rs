pub mod delivery;
pub mod late_arrival;
pub mod logistics;
pub mod reservation;
pub mod scale;
pub mod severity;

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Timelike, Utc};

use crate::config::SiteConfig;
use crate::error::RiskError;
use crate::schema::v1::{
    CARD_SCHEMA_VERSION, CardKind, Confidence, Driver, Effort, Impact, RiskCard, Severity,
    SuggestedAction,
};
use crate::signals::SignalSet;

pub use delivery::DeliveryScorer;
pub use late_arrival::LateArrivalScorer;
pub use logistics::LogisticsCostPressureScorer;
pub use reservation::ReservationFlowScorer;

/// Output of one scorer, before card metadata is attached.
#[derive(Debug, Clone)]
pub struct ScoreResult {
    pub score: u8,
    pub label: Severity,
    pub inputs: BTreeMap<String, f64>,
    pub subtitle: String,
    pub confidence: Confidence,
    pub confidence_reason: String,
    pub summary: String,
    pub drivers: Vec<Driver>,
    pub implications: Vec<String>,
    pub considerations: Vec<String>,
    pub actions: Vec<SuggestedAction>,
    pub outlook: Option<String>,
}

pub trait Scorer {
    fn kind(&self) -> CardKind;
    fn required_signals(&self) -> &'static [&'static str];
    fn score(&self, signals: &SignalSet, config: &SiteConfig) -> Result<ScoreResult, RiskError>;
}

/// One scorer per card kind, in emission order.
pub fn default_scorers() -> Vec<Box<dyn Scorer>> {
    vec![
        Box::new(ReservationFlowScorer),
        Box::new(LateArrivalScorer),
        Box::new(DeliveryScorer),
        Box::new(LogisticsCostPressureScorer),
    ]
}

/// Fails on the first required signal that is absent or not finite.
pub fn check_required(signals: &SignalSet, scorers: &[Box<dyn Scorer>]) -> Result<(), RiskError> {
    for scorer in scorers {
        for name in scorer.required_signals() {
            signals.require(name)?;
        }
    }
    Ok(())
}

pub fn assemble_card(
    kind: CardKind,
    result: ScoreResult,
    generated_at: DateTime<FixedOffset>,
) -> RiskCard {
    RiskCard {
        schema_version: CARD_SCHEMA_VERSION.to_string(),
        kind,
        title: kind.title().to_string(),
        category: kind.category().to_string(),
        time_horizon: kind.time_horizon().to_string(),
        score: result.score,
        label: result.label,
        icon: result.label.icon().to_string(),
        subtitle: result.subtitle,
        confidence: result.confidence,
        confidence_reason: result.confidence_reason,
        summary: result.summary,
        drivers: result.drivers,
        implications: result.implications,
        supported_considerations: result.considerations,
        suggested_actions: result.actions,
        outlook: result.outlook,
        trust_note: kind.trust_note().to_string(),
        inputs: result.inputs,
        generated_at,
    }
}

/// Computes all four cards, or none. Signals without `as_of` are evaluated at
/// `generated_at`.
pub fn compute_cards_at(
    signals: &SignalSet,
    config: &SiteConfig,
    generated_at: DateTime<FixedOffset>,
) -> Result<Vec<RiskCard>, RiskError> {
    config.validate()?;
    let scorers = default_scorers();
    check_required(signals, &scorers)?;

    let mut evaluated = signals.clone();
    if evaluated.as_of.is_none() {
        evaluated.as_of = Some(generated_at);
    }

    let mut cards = Vec::with_capacity(scorers.len());
    for scorer in &scorers {
        let result = scorer.score(&evaluated, config)?;
        cards.push(assemble_card(scorer.kind(), result, generated_at));
    }
    Ok(cards)
}

pub fn compute_cards(signals: &SignalSet, config: &SiteConfig) -> Result<Vec<RiskCard>, RiskError> {
    let offset = config.offset()?;
    compute_cards_at(signals, config, Utc::now().with_timezone(&offset))
}

/// Where the evaluation time falls relative to the site's windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub is_peak: bool,
    pub in_service_window: bool,
}

impl Timing {
    /// Without an observation time the run is treated as in service, off peak.
    pub fn evaluate(signals: &SignalSet, config: &SiteConfig) -> Result<Self, RiskError> {
        let Some(as_of) = signals.as_of else {
            return Ok(Self {
                is_peak: false,
                in_service_window: true,
            });
        };
        let hour = as_of.with_timezone(&config.offset()?).hour();
        Ok(Self {
            is_peak: config.peak_window.contains(hour),
            in_service_window: config.service_window.contains(hour),
        })
    }
}

pub(crate) fn off_hours_subtitle(config: &SiteConfig) -> String {
    format!(
        "Off-hours: informational snapshot (service window {})",
        config.service_window.label()
    )
}

pub(crate) fn action(
    action: &str,
    when: impl Into<String>,
    why: &str,
    effort: Effort,
    tradeoff: &str,
) -> SuggestedAction {
    SuggestedAction {
        action: action.to_string(),
        when: when.into(),
        why: why.to_string(),
        effort,
        tradeoff: tradeoff.to_string(),
    }
}

pub(crate) fn driver(label: &str, impact: Impact) -> Driver {
    Driver {
        label: label.to_string(),
        impact,
    }
}

pub(crate) fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
