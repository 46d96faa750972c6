use crate::config::SiteConfig;
use crate::error::RiskError;
use crate::math::stats::clamp01;
use crate::schema::v1::{CardKind, Confidence, Effort, Impact, Severity};
use crate::scores::scale::impact_label;
use crate::scores::severity::classify;
use crate::scores::{ScoreResult, Scorer, action, driver, strings};
use crate::signals::{SignalReader, SignalSet, names};

const W_INDEX: f64 = 0.6;
const W_MACRO: f64 = 0.4;
const W_FOOD: f64 = 0.45;
const W_TRANSPORT: f64 = 0.35;
const W_FX: f64 = 0.20;

// Neutral-low stand-ins for absent macro components.
const DEFAULT_FOOD: f64 = 0.25;
const DEFAULT_TRANSPORT: f64 = 0.25;
const DEFAULT_FX: f64 = 0.20;

const MIN_SCORE_WITH_TWO_SIGNALS: u8 = 5;

/// ~2% yoy is calm, ~8% is high.
pub fn food_pressure(food_yoy: f64) -> f64 {
    clamp01((food_yoy - 2.0) / 6.0)
}

/// ~1% is calm, ~7% is high.
pub fn transport_pressure(transport_var: f64) -> f64 {
    clamp01((transport_var - 1.0) / 6.0)
}

/// Rises as 30d volatility moves above the 180d baseline; 1.8x or more saturates.
pub fn fx_pressure(vol_window: f64, vol_baseline: f64) -> f64 {
    if vol_baseline <= 0.0 {
        return if vol_window > 0.0 { 0.25 } else { 0.0 };
    }
    clamp01((vol_window / vol_baseline - 1.0) / 0.8)
}

/// Weekly-to-monthly supplier repricing pressure. Driven by the logistics
/// cost index, blended with BCRP macro proxies when any are present.
pub struct LogisticsCostPressureScorer;

impl Scorer for LogisticsCostPressureScorer {
    fn kind(&self) -> CardKind {
        CardKind::LogisticsCostPressureRisk
    }

    fn required_signals(&self) -> &'static [&'static str] {
        &[names::LOGISTICS_COST_INDEX]
    }

    fn score(&self, signals: &SignalSet, config: &SiteConfig) -> Result<ScoreResult, RiskError> {
        let mut reader = SignalReader::new(signals);
        let index = reader.require(names::LOGISTICS_COST_INDEX)?;
        let food_yoy = reader.optional(names::FOOD_INFLATION_YOY)?;
        let transport = reader.optional(names::TRANSPORT_INFLATION)?;
        let fx_30 = reader.optional(names::FX_VOL_30D)?;
        let fx_180 = reader.optional(names::FX_VOL_180D)?;

        let index_p = clamp01(index / 100.0);
        let food_p = food_yoy.map(food_pressure);
        let transport_p = transport.map(transport_pressure);
        let fx_p = match (fx_30, fx_180) {
            (Some(w), Some(b)) => Some(fx_pressure(w, b)),
            _ => None,
        };

        let mut available = 1;
        let mut reasons = vec!["Logistics cost index available.".to_string()];
        let mut drivers = vec![driver(
            "Logistics cost index",
            impact_label(index_p, 0.50, 0.75),
        )];

        match food_p {
            Some(p) => {
                available += 1;
                reasons.push("Food inflation series available (BCRPData).".to_string());
                if p >= 0.35 {
                    drivers.push(driver(
                        "Food inflation pressure (12m trend)",
                        impact_label(p, 0.35, 0.60),
                    ));
                }
            }
            None => reasons
                .push("Food inflation series missing; pressure estimate is partial.".to_string()),
        }
        match transport_p {
            Some(p) => {
                available += 1;
                reasons.push("Transport cost proxy series available (BCRPData).".to_string());
                if p >= 0.35 {
                    drivers.push(driver(
                        "Transport cost pressure",
                        impact_label(p, 0.35, 0.60),
                    ));
                }
            }
            None => reasons.push(
                "Transport cost proxy missing; transport pressure estimate is partial.".to_string(),
            ),
        }
        match fx_p {
            Some(p) => {
                available += 1;
                reasons.push(
                    "FX series available; volatility computed from recent daily data.".to_string(),
                );
                if p >= 0.35 {
                    drivers.push(driver(
                        "FX volatility vs baseline",
                        impact_label(p, 0.35, 0.60),
                    ));
                }
            }
            None => reasons.push(
                "FX series missing or too short; volatility estimate is partial.".to_string(),
            ),
        }

        let weighted = if food_p.is_none() && transport_p.is_none() && fx_p.is_none() {
            index_p
        } else {
            let macro_p = W_FOOD * food_p.unwrap_or(DEFAULT_FOOD)
                + W_TRANSPORT * transport_p.unwrap_or(DEFAULT_TRANSPORT)
                + W_FX * fx_p.unwrap_or(DEFAULT_FX);
            W_INDEX * index_p + W_MACRO * macro_p
        };
        let mut score = (100.0 * clamp01(weighted)).round() as u8;
        if available >= 2 && score < MIN_SCORE_WITH_TWO_SIGNALS {
            score = MIN_SCORE_WITH_TWO_SIGNALS;
        }
        let label = classify(score, &config.severity_thresholds);

        if drivers.len() == 1 && available >= 2 && label == Severity::Normal {
            drivers.push(driver(
                "Macro cost indicators within normal ranges",
                Impact::Low,
            ));
        }

        let confidence = match available {
            1 => Confidence::Low,
            2 => Confidence::Medium,
            _ => Confidence::High,
        };

        let subtitle = match label {
            Severity::Normal => "External cost signals look stable.",
            Severity::Watch => "Some upstream cost pressure is building.",
            Severity::Elevated => "Upstream logistics costs are rising faster than usual.",
            Severity::Critical => "High cost pressure: expect faster repricing and tighter margins.",
        };

        let mut actions = vec![
            action(
                "Review margin exposure on high-cost dishes",
                "If status is Elevated/Critical",
                "Cost pressure often hits a few key inputs first (proteins, dairy, imported items).",
                Effort::Low,
                "Requires quick menu-cost check",
            ),
            action(
                "Avoid locking large forward orders without price confirmation",
                "If score ≥ 50 (Elevated/Critical)",
                "Higher volatility can shorten supplier quote windows.",
                Effort::Low,
                "More frequent ordering/check-ins",
            ),
        ];
        if fx_p.is_some_and(|p| p >= 0.35) {
            actions.push(action(
                "Delay promotions that rely on imported inputs",
                "While FX volatility stays above baseline",
                "FX-driven repricing can compress margins unexpectedly.",
                Effort::Low,
                "Fewer near-term promo options",
            ));
        }

        Ok(ScoreResult {
            score,
            label,
            inputs: reader.into_inputs(),
            subtitle: subtitle.to_string(),
            confidence,
            confidence_reason: reasons.join(" "),
            summary: "The logistics cost index and external indicators (food inflation, transport cost pressure, FX volatility) suggest how likely suppliers are to reprice or tighten terms in the coming weeks.".to_string(),
            drivers,
            implications: strings(&[
                "Higher cost pressure can reduce price-lock windows and increase quote variability.",
                "Margin sensitivity rises on imported or freight-heavy inputs during Elevated/Critical periods.",
            ]),
            considerations: strings(&[
                "Focus on menu-margin awareness rather than predicting exact ingredient costs.",
                "Be cautious with promo commitments that depend on volatile inputs when risk is Elevated/Critical.",
                "Re-check supplier quotes closer to order time during higher-pressure periods.",
            ]),
            actions,
            outlook: Some(match label {
                Severity::Normal | Severity::Watch => {
                    "Outlook (7–30d): Re-check as new monthly inflation prints arrive.".to_string()
                }
                _ => "Outlook (7–30d): Pressure is likely to persist over the coming weeks.".to_string(),
            }),
        })
    }
}
