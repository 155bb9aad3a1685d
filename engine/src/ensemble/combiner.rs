// Combines the local statistical signal with the external opinion and runs
// the sanity guards. Rejection here routes to the fallback gate; it is a
// quality judgement, not an error.
use shared::models::{Direction, PredictionSignal};
use shared::utils::clamp;

use crate::config::RiskProfile;
use crate::indicators::IndicatorSet;

/// RSI beyond these bounds vetoes a same-direction entry.
const RSI_EXHAUSTION_HIGH: f64 = 80.0;
const RSI_EXHAUSTION_LOW: f64 = 20.0;
/// MACD histogram magnitude, as a fraction of price, above which an opposing
/// histogram vetoes the direction.
const MACD_CONFLICT_THRESHOLD: f64 = 1e-4;
/// Confidence multiplier when proceeding on the statistical signal alone.
const DEGRADED_FACTOR: f64 = 0.9;

#[derive(Debug, Clone)]
pub enum CombineOutcome {
    Valid(PredictionSignal),
    Rejected {
        signal: PredictionSignal,
        reason: String,
    },
}

impl CombineOutcome {
    pub fn signal(&self) -> &PredictionSignal {
        match self {
            CombineOutcome::Valid(signal) => signal,
            CombineOutcome::Rejected { signal, .. } => signal,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, CombineOutcome::Rejected { .. })
    }
}

/// Combine both signals under the risk profile's weights and guards.
/// A missing external opinion degrades to the statistical signal and routes
/// to the fallback gate while keeping its direction.
pub fn combine(
    statistical: &PredictionSignal,
    external: Option<&PredictionSignal>,
    indicators: &IndicatorSet,
    profile: &RiskProfile,
) -> CombineOutcome {
    let Some(external) = external else {
        let confidence = clamp(
            statistical.confidence * DEGRADED_FACTOR,
            profile.confidence_floor,
            profile.confidence_ceiling,
        );
        return CombineOutcome::Rejected {
            signal: PredictionSignal {
                direction: statistical.direction,
                confidence,
                rationale: format!("statistical only: {}", statistical.rationale),
            },
            reason: "no external opinion".to_string(),
        };
    };

    let weighted = profile.external_weight * external.confidence
        + profile.statistical_weight * statistical.confidence;

    let (direction, confidence, rationale) = if external.direction == statistical.direction {
        (
            external.direction,
            weighted + profile.agreement_bonus,
            format!("signals agree: {}", external.rationale),
        )
    } else {
        let winner = if external.confidence >= statistical.confidence {
            external
        } else {
            statistical
        };
        (
            winner.direction,
            weighted * profile.disagreement_penalty,
            format!(
                "signals split ({} vs {}): {}",
                external.direction, statistical.direction, winner.rationale
            ),
        )
    };

    if direction == Direction::Neutral {
        return reject(direction, "no directional signal", profile);
    }
    if let Some(reason) = guard_failure(direction, statistical, external, indicators, profile) {
        return reject(direction, &reason, profile);
    }

    CombineOutcome::Valid(PredictionSignal {
        direction,
        confidence: clamp(confidence, profile.confidence_floor, profile.confidence_ceiling),
        rationale,
    })
}

fn guard_failure(
    direction: Direction,
    statistical: &PredictionSignal,
    external: &PredictionSignal,
    indicators: &IndicatorSet,
    profile: &RiskProfile,
) -> Option<String> {
    if direction == Direction::Up && indicators.rsi > RSI_EXHAUSTION_HIGH {
        return Some(format!("rsi {:.1} exhausted for a long entry", indicators.rsi));
    }
    if direction == Direction::Down && indicators.rsi < RSI_EXHAUSTION_LOW {
        return Some(format!("rsi {:.1} exhausted for a short entry", indicators.rsi));
    }

    if indicators.price > 0.0 {
        let normalized = indicators.macd_histogram / indicators.price;
        if direction == Direction::Up && normalized < -MACD_CONFLICT_THRESHOLD {
            return Some("macd histogram strongly opposes a long entry".to_string());
        }
        if direction == Direction::Down && normalized > MACD_CONFLICT_THRESHOLD {
            return Some("macd histogram strongly opposes a short entry".to_string());
        }
    }

    if statistical.confidence < profile.min_signal_confidence
        && external.confidence < profile.min_signal_confidence
    {
        return Some("both signals below the confidence floor".to_string());
    }
    None
}

fn reject(direction: Direction, reason: &str, profile: &RiskProfile) -> CombineOutcome {
    CombineOutcome::Rejected {
        signal: PredictionSignal {
            direction,
            confidence: profile.confidence_floor,
            rationale: reason.to_string(),
        },
        reason: reason.to_string(),
    }
}
