use crate::config::SiteConfig;
use crate::error::RiskError;
use crate::schema::v1::{CardKind, Confidence, Effort, Impact, Severity};
use crate::scores::scale::{flag_impact, impact_label, score_0_100};
use crate::scores::severity::classify;
use crate::scores::{ScoreResult, Scorer, Timing, action, driver, off_hours_subtitle, strings};
use crate::signals::{SignalReader, SignalSet, names};

const FULL_SCALE: f64 = 2.5;
const W_DEVIATION: f64 = 3.0;
const W_VOLATILITY: f64 = 2.0;
const RAIN_NOW_BUMP: f64 = 0.6;
const PEAK_BUMP: f64 = 0.6;
// Without a baseline, only a fraction of raw congestion counts as deviation.
const NO_BASELINE_FACTOR: f64 = 0.2;

/// Risk that arrivals cluster or slip enough to overlap reservations.
pub struct ReservationFlowScorer;

impl Scorer for ReservationFlowScorer {
    fn kind(&self) -> CardKind {
        CardKind::ReservationFlowRisk
    }

    fn required_signals(&self) -> &'static [&'static str] {
        &[]
    }

    fn score(&self, signals: &SignalSet, config: &SiteConfig) -> Result<ScoreResult, RiskError> {
        let mut reader = SignalReader::new(signals);
        let ratio = reader.optional(names::TRAFFIC_RATIO)?;
        let baseline = reader.optional(names::TRAFFIC_BASELINE_RATIO)?;
        let volatility = reader
            .optional(names::TRAFFIC_VOLATILITY_60M)?
            .unwrap_or(0.0)
            .max(0.0);
        let rain_now = reader.flag(names::RAIN_NOW)?;
        let rain_likely = reader.flag(names::RAIN_LIKELY_NEXT_3H)?;
        let rain_pop = reader.optional(names::RAIN_POP_NEXT_3H)?;
        let timing = Timing::evaluate(signals, config)?;

        // Positive deviation means worse than a normal evening.
        let deviation = match (ratio, baseline) {
            (Some(r), Some(b)) => (b - r).max(0.0),
            (Some(r), None) => NO_BASELINE_FACTOR * (1.0 - r).max(0.0),
            _ => 0.0,
        };

        let raining = rain_now.unwrap_or(false);
        let mut raw = W_DEVIATION * deviation + W_VOLATILITY * volatility;
        if raining {
            raw += RAIN_NOW_BUMP;
        }
        if timing.is_peak {
            raw += PEAK_BUMP;
        }
        let score = score_0_100(raw, FULL_SCALE);
        let label = classify(score, &config.severity_thresholds);

        let have_weather = rain_now.is_some() || rain_likely.is_some() || rain_pop.is_some();
        let outlook_rain = rain_likely.or(rain_pop.map(|p| p >= 0.5));
        let (confidence, confidence_reason) = if ratio.is_none() {
            (
                Confidence::Low,
                "Live traffic is unavailable; the insight reflects timing and weather only.",
            )
        } else if baseline.is_none() && !have_weather {
            (
                Confidence::Low,
                "Traffic baseline is not established yet and weather context is missing; insight is primarily heuristic.",
            )
        } else if baseline.is_none() {
            (
                Confidence::Medium,
                "Traffic baseline is not established yet; comparison is a conservative proxy until more history accumulates.",
            )
        } else if !have_weather {
            (
                Confidence::Medium,
                "Traffic baseline is available but weather context is missing; confidence is reduced.",
            )
        } else if volatility < 0.08 {
            (
                Confidence::High,
                "Traffic baseline and weather context are available; confidence depends on short-term volatility.",
            )
        } else {
            (
                Confidence::Medium,
                "Traffic baseline and weather context are available; confidence depends on short-term volatility.",
            )
        };

        let drivers = vec![
            driver("Traffic vs baseline", impact_label(deviation, 0.02, 0.06)),
            driver(
                "Short-term volatility (60m)",
                impact_label(volatility, 0.06, 0.12),
            ),
            driver(
                "Rain amplification risk",
                flag_impact(raining || outlook_rain.unwrap_or(false)),
            ),
            driver("Peak-hour sensitivity", flag_impact(timing.is_peak)),
            driver("Large-group sensitivity (>=5)", Impact::Medium),
        ];

        let summary = if label == Severity::Normal {
            "Arrival timing risk appears stable, but uncertainty can increase if traffic volatility or rain rises."
        } else {
            "Arrival times are less predictable than usual, increasing the risk of overlapping reservations during peak service hours."
        };

        let outlook = match outlook_rain {
            None => "Outlook (0–3h): No short-term outlook available.",
            Some(true) if label != Severity::Normal => {
                "Outlook (0–3h): Elevated conditions may persist; rain risk could continue to amplify arrival variability."
            }
            Some(true) => {
                "Outlook (0–3h): Conditions look normal, but rain risk could increase arrival variability later."
            }
            Some(false) => "Outlook (0–3h): Conditions are likely to remain similar in the near term.",
        };

        let mut actions = vec![
            action(
                "Add a buffer for groups of 5+ during the next 3 hours",
                "Any booking in the next 3 hours for 5+ guests",
                "Large groups create longer seating/ordering latency and amplify small arrival delays.",
                Effort::Low,
                "Slightly fewer slots, smoother flow",
            ),
            action(
                "Proactively confirm late arrivals with a soft message",
                "10–15 minutes before reservation time",
                "Reduces uncertainty and helps resequence tables if someone is running late.",
                Effort::Low,
                "Adds messaging workload",
            ),
        ];
        if volatility >= 0.08 || deviation >= 0.06 || label >= Severity::Elevated {
            actions.push(action(
                "Avoid tight back-to-back reservations during peak window",
                format!("During peak window ({})", config.peak_window.label()),
                "When arrivals cluster, tighter sequencing increases queue spillover risk.",
                Effort::Medium,
                "May reduce peak throughput, improves experience",
            ));
        }

        let subtitle = if !timing.in_service_window {
            off_hours_subtitle(config)
        } else if baseline.is_some() {
            "Compared to a normal evening".to_string()
        } else {
            "Compared to recent external conditions".to_string()
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
                "Higher likelihood of reservation overlap and queue spillover during peak hours.",
                "Greater sensitivity to delays for larger groups.",
            ]),
            considerations: strings(&[
                "Wider buffers for larger groups may reduce cascading delays.",
                "Greater flexibility during peak windows may be more valuable than usual.",
                "Proactive expectation-setting may reduce frustration if delays occur.",
            ]),
            actions,
            outlook: Some(outlook.to_string()),
        })
    }
}
