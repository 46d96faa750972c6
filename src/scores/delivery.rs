use crate::config::SiteConfig;
use crate::error::RiskError;
use crate::schema::v1::{CardKind, Confidence, Effort, Impact, Severity};
use crate::scores::scale::{clamp_score, impact_label};
use crate::scores::severity::classify;
use crate::scores::{ScoreResult, Scorer, Timing, action, driver, off_hours_subtitle, strings};
use crate::signals::{SignalReader, SignalSet, names};

const BASE_SCORE: i64 = 10;

fn delay_points(delay_min: f64) -> i64 {
    if delay_min < 5.0 {
        5
    } else if delay_min < 10.0 {
        15
    } else if delay_min < 20.0 {
        30
    } else {
        45
    }
}

fn traffic_points(ratio: Option<f64>) -> i64 {
    match ratio {
        None => 0,
        Some(r) if r >= 0.90 => 0,
        Some(r) if r >= 0.75 => 5,
        Some(r) if r >= 0.60 => 10,
        Some(_) => 15,
    }
}

// A missing outlook still adds a little uncertainty.
fn rain_points(pop: Option<f64>) -> i64 {
    match pop {
        None => 5,
        Some(p) if p >= 0.60 => 25,
        Some(p) if p >= 0.30 => 15,
        Some(p) if p >= 0.10 => 5,
        Some(_) => 0,
    }
}

/// Delivery timing risk, anchored on the observed average delay and nudged
/// by traffic and the short-term rain outlook.
pub struct DeliveryScorer;

impl Scorer for DeliveryScorer {
    fn kind(&self) -> CardKind {
        CardKind::DeliveryRisk
    }

    fn required_signals(&self) -> &'static [&'static str] {
        &[names::AVG_DELIVERY_DELAY_MIN]
    }

    fn score(&self, signals: &SignalSet, config: &SiteConfig) -> Result<ScoreResult, RiskError> {
        let mut reader = SignalReader::new(signals);
        let delay = reader.require(names::AVG_DELIVERY_DELAY_MIN)?.max(0.0);
        let ratio = reader.optional(names::TRAFFIC_RATIO)?;
        let pop = reader.optional(names::RAIN_POP_NEXT_3H)?;
        let timing = Timing::evaluate(signals, config)?;

        let score = clamp_score(
            BASE_SCORE + delay_points(delay) + traffic_points(ratio) + rain_points(pop),
        );
        let label = classify(score, &config.severity_thresholds);

        let (confidence, confidence_reason) = match (ratio.is_some(), pop.is_some()) {
            (true, true) => (
                Confidence::High,
                "Observed delivery delay, traffic and short-term rain outlook are all available.",
            ),
            (true, false) | (false, true) => (
                Confidence::Medium,
                "One of traffic or weather context is missing; variability may be higher than shown.",
            ),
            (false, false) => (
                Confidence::Low,
                "Only the observed delivery delay is available; traffic and weather context are missing.",
            ),
        };

        let drivers = vec![
            driver("Observed average delivery delay", impact_label(delay, 10.0, 20.0)),
            driver(
                "Traffic vs freeflow",
                if ratio.is_some_and(|r| r < 0.75) {
                    Impact::High
                } else {
                    Impact::Low
                },
            ),
            driver(
                "Rain probability next 3h",
                if pop.is_some_and(|p| p >= 0.30) {
                    Impact::High
                } else {
                    Impact::Low
                },
            ),
            driver("Last-mile variability", Impact::Medium),
        ];

        let summary = if label == Severity::Normal {
            "Delivery timing looks steady; observed delays and external conditions are within a normal range."
        } else {
            "Delivery timing may vary with observed delays, traffic and short-term rain risk."
        };

        let subtitle = if timing.in_service_window {
            "Delivery variability vs typical conditions".to_string()
        } else {
            off_hours_subtitle(config)
        };

        Ok(ScoreResult {
            score,
            label,
            inputs: reader.into_inputs(),
            subtitle,
            confidence,
            confidence_reason: confidence_reason.to_string(),
            summary: summary.to_string(),
            drivers,
            implications: strings(&[
                "Higher delivery ETA variability can increase customer frustration and remake risk.",
                "If conditions worsen, batching deliveries may trade speed for reliability.",
            ]),
            considerations: strings(&[
                "Consider slightly longer quoted ETAs when risk is Elevated/High.",
                "Prioritize closer zones if conditions deteriorate.",
                "If rain probability rises, expect slower rider availability and curbside delays.",
            ]),
            actions: vec![
                action(
                    "Add a small buffer to quoted delivery ETA",
                    "If score ≥ 45 (Elevated/High)",
                    "Reduces late-delivery complaints when external variability is high.",
                    Effort::Low,
                    "Slightly longer ETA shown",
                ),
                action(
                    "Prioritize nearby delivery zones first",
                    "If traffic ratio < 0.75 or rain pop ≥ 0.30",
                    "Shorter distances are less sensitive to external slowdowns.",
                    Effort::Low,
                    "May delay farther zones",
                ),
            ],
            outlook: Some(
                "Outlook (0–3h): Conditions can shift quickly; re-run the pipeline closer to service."
                    .to_string(),
            ),
        })
    }
}
