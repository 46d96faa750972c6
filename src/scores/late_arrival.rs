use crate::config::SiteConfig;
use crate::error::RiskError;
use crate::schema::v1::{CardKind, Confidence, Effort, Severity};
use crate::scores::scale::{flag_impact, impact_label, score_0_100};
use crate::scores::severity::classify;
use crate::scores::{ScoreResult, Scorer, Timing, action, driver, off_hours_subtitle, strings};
use crate::signals::{SignalReader, SignalSet, names};

const FULL_SCALE: f64 = 2.5;
const W_CONGESTION: f64 = 1.8;
const W_VOLATILITY: f64 = 2.4;
const RAIN_LIKELY_BUMP: f64 = 0.7;
const PEAK_BUMP: f64 = 0.6;

/// Punctuality risk for guests arriving in the next few hours. Weighs
/// volatility and rain more heavily than steady congestion.
pub struct LateArrivalScorer;

impl Scorer for LateArrivalScorer {
    fn kind(&self) -> CardKind {
        CardKind::LateArrivalRisk
    }

    fn required_signals(&self) -> &'static [&'static str] {
        &[]
    }

    fn score(&self, signals: &SignalSet, config: &SiteConfig) -> Result<ScoreResult, RiskError> {
        let mut reader = SignalReader::new(signals);
        let ratio = reader.optional(names::TRAFFIC_RATIO)?;
        let volatility = reader
            .optional(names::TRAFFIC_VOLATILITY_60M)?
            .unwrap_or(0.0)
            .max(0.0);
        let rain_likely_flag = reader.flag(names::RAIN_LIKELY_NEXT_3H)?;
        let rain_pop = reader.optional(names::RAIN_POP_NEXT_3H)?;
        let rain_now = reader.flag(names::RAIN_NOW)?;
        let timing = Timing::evaluate(signals, config)?;

        let congestion = ratio.map(|r| (1.0 - r).max(0.0)).unwrap_or(0.0);
        let outlook = rain_likely_flag.or(rain_pop.map(|p| p >= 0.5));
        let rain_likely = outlook.unwrap_or(false);

        let mut raw = W_CONGESTION * congestion + W_VOLATILITY * volatility;
        if rain_likely {
            raw += RAIN_LIKELY_BUMP;
        }
        if timing.is_peak {
            raw += PEAK_BUMP;
        }
        let score = score_0_100(raw, FULL_SCALE);
        let label = classify(score, &config.severity_thresholds);

        let have_weather = outlook.is_some() || rain_now.is_some();
        let (confidence, confidence_reason) = if ratio.is_none() {
            (
                Confidence::Low,
                "Live traffic is unavailable; punctuality risk reflects timing and weather only.",
            )
        } else if !have_weather {
            (
                Confidence::Medium,
                "Traffic data is available; weather context is missing, so late-arrival amplification is uncertain.",
            )
        } else if volatility < 0.10 {
            (
                Confidence::High,
                "Traffic and weather outlook are available; confidence depends on short-term traffic volatility.",
            )
        } else {
            (
                Confidence::Medium,
                "Traffic and weather outlook are available; confidence depends on short-term traffic volatility.",
            )
        };

        let drivers = vec![
            driver(
                "Short-term traffic volatility (60m)",
                impact_label(volatility, 0.06, 0.12),
            ),
            driver("Traffic congestion proxy", impact_label(congestion, 0.10, 0.25)),
            driver("Rain / precipitation outlook", flag_impact(rain_likely)),
            driver("Peak-hour sensitivity", flag_impact(timing.is_peak)),
        ];

        let summary = if label == Severity::Normal {
            "Arrival punctuality risk appears stable under current external conditions."
        } else {
            "Late arrivals may become more frequent due to volatile traffic and/or weather amplification."
        };

        let mut actions = vec![
            action(
                "Send a soft check-in message shortly before reservation time",
                "10–15 minutes before reservation time",
                "Reduces uncertainty and allows re-sequencing if guests report delays.",
                Effort::Low,
                "Adds messaging workload",
            ),
            action(
                "Use slightly wider buffers for groups of 5+ when volatility is high",
                "When traffic volatility is Medium/High",
                "Large groups amplify the operational cost of late arrivals.",
                Effort::Low,
                "Fewer tightly-packed slots",
            ),
        ];
        if label != Severity::Normal || (timing.is_peak && volatility >= 0.08) {
            actions.push(action(
                "Avoid scheduling back-to-back reservation start times during peak",
                format!("During peak window ({})", config.peak_window.label()),
                "Reduces cascading delays when arrivals cluster or slip.",
                Effort::Medium,
                "May reduce peak throughput, improves experience",
            ));
        }

        let outlook_text = match outlook {
            None => "Outlook (0–3h): Limited weather outlook available.",
            Some(true) => "Outlook (0–3h): Rain risk could increase late-arrival likelihood.",
            Some(false) => "Outlook (0–3h): Conditions are likely to remain similar in the near term.",
        };

        let subtitle = if timing.in_service_window {
            "Arrival punctuality risk for the next 0–3 hours".to_string()
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
                "Higher probability of customers arriving late, causing table-sequencing friction.",
                "Increased variance in seating times can cause knock-on delays during busy periods.",
            ]),
            considerations: strings(&[
                "Traffic volatility affects punctuality more than steady congestion.",
                "Rain risk can increase both travel friction and unpredictability.",
            ]),
            actions,
            outlook: Some(outlook_text.to_string()),
        })
    }
}
