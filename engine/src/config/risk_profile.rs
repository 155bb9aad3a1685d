use serde::Deserialize;

/// Named set of decision constants for the ensemble combiner and the
/// risk sizer. Profiles are configuration, never duplicated code paths:
/// the strict variant is canonical, the balanced one keeps the older,
/// looser constants selectable.
#[derive(Debug, Deserialize, Clone)]
pub struct RiskProfile {
    pub name: String,
    /// Combined confidence is clamped into [floor, ceiling].
    pub confidence_floor: f64,
    pub confidence_ceiling: f64,
    /// Absolute minimum risk-reward; take-profit is widened to enforce it.
    pub min_risk_reward: f64,
    pub max_risk_reward: f64,
    /// Ensemble weights: external opinion vs locally computed signal.
    pub external_weight: f64,
    pub statistical_weight: f64,
    /// Added when both signals agree on direction.
    pub agreement_bonus: f64,
    /// Multiplier applied to the weighted sum on disagreement.
    pub disagreement_penalty: f64,
    /// Both signals below this individual floor triggers rejection.
    pub min_signal_confidence: f64,
    pub base_position_fraction: f64,
    pub min_position_fraction: f64,
    pub max_position_fraction: f64,
}

impl RiskProfile {
    /// Canonical constants.
    pub fn strict() -> Self {
        RiskProfile {
            name: "strict".to_string(),
            confidence_floor: 0.5,
            confidence_ceiling: 0.85,
            min_risk_reward: 1.5,
            max_risk_reward: 2.5,
            external_weight: 0.6,
            statistical_weight: 0.4,
            agreement_bonus: 0.05,
            disagreement_penalty: 0.7,
            min_signal_confidence: 0.6,
            base_position_fraction: 0.01,
            min_position_fraction: 0.005,
            max_position_fraction: 0.02,
        }
    }

    /// Superseded constants, kept selectable.
    pub fn balanced() -> Self {
        RiskProfile {
            name: "balanced".to_string(),
            confidence_ceiling: 0.95,
            min_risk_reward: 1.2,
            max_position_fraction: 0.05,
            ..RiskProfile::strict()
        }
    }

    /// Risk-reward ratio for a confidence tier, capped at `max_risk_reward`.
    pub fn risk_reward_for_confidence(&self, confidence: f64) -> f64 {
        let tiered = if confidence >= 0.8 {
            2.5
        } else if confidence >= 0.7 {
            2.0
        } else if confidence >= 0.6 {
            1.8
        } else {
            self.min_risk_reward
        };
        tiered.min(self.max_risk_reward).max(self.min_risk_reward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_profile_is_canonical() {
        let p = RiskProfile::strict();
        assert_eq!(p.confidence_ceiling, 0.85);
        assert_eq!(p.min_risk_reward, 1.5);
        assert_eq!(p.max_position_fraction, 0.02);
    }

    #[test]
    fn balanced_profile_keeps_loose_constants() {
        let p = RiskProfile::balanced();
        assert_eq!(p.confidence_ceiling, 0.95);
        assert_eq!(p.min_risk_reward, 1.2);
        // Shared constants stay identical to strict.
        assert_eq!(p.external_weight, 0.6);
    }

    #[test]
    fn risk_reward_tiers() {
        let p = RiskProfile::strict();
        assert_eq!(p.risk_reward_for_confidence(0.55), 1.5);
        assert_eq!(p.risk_reward_for_confidence(0.65), 1.8);
        assert_eq!(p.risk_reward_for_confidence(0.75), 2.0);
        assert_eq!(p.risk_reward_for_confidence(0.85), 2.5);
    }
}
