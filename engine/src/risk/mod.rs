// Risk sizer: stop/target levels, pip distances, and position sizing from
// the validated direction, confidence, and current regime.
use serde::Serialize;
use shared::models::{Direction, TimeFrame};
use shared::utils::clamp;

use crate::config::{RiskProfile, SymbolProfile};
use crate::regime::VolatilityState;

/// Fallback stop distance, fraction of entry.
const FALLBACK_STOP_PCT: f64 = 0.015;
/// Fallback target distance, fraction of entry.
const FALLBACK_TARGET_PCT: f64 = 0.025;
/// Stop tightening for spike-prone symbols in elevated volatility.
const SPIKE_TIGHTENING: f64 = 0.85;

/// Computed trade levels and sizing for one directive.
#[derive(Debug, Clone, Serialize)]
pub struct RiskLevels {
    pub stop_loss: f64,
    pub take_profit: f64,
    pub risk_reward_ratio: f64,
    pub stop_distance_pips: f64,
    pub target_distance_pips: f64,
    pub position_size_fraction: f64,
}

/// Stop distance scaling per timeframe, relative to the 1h base.
fn timeframe_multiplier(timeframe: TimeFrame) -> f64 {
    match timeframe {
        TimeFrame::Minute1 => 0.4,
        TimeFrame::Minute5 => 0.6,
        TimeFrame::Minute15 => 0.8,
        TimeFrame::Hour1 => 1.0,
        TimeFrame::Hour4 => 1.5,
        TimeFrame::Day1 => 2.0,
    }
}

fn volatility_multiplier(state: VolatilityState, spike_prone: bool) -> f64 {
    let base = match state {
        VolatilityState::Low => 0.8,
        VolatilityState::Normal => 1.0,
        VolatilityState::High => 1.3,
        VolatilityState::Extreme => 1.6,
    };
    // Spike instruments keep stops tight when volatility runs hot; a wide
    // stop just sits inside the spike's path.
    if spike_prone && matches!(state, VolatilityState::High | VolatilityState::Extreme) {
        base * SPIKE_TIGHTENING
    } else {
        base
    }
}

/// Compute levels for a directional entry. A neutral direction gets the
/// same shape as a long so the output stays structurally valid.
pub fn compute_levels(
    entry: f64,
    direction: Direction,
    confidence: f64,
    confluence: f64,
    symbol: &SymbolProfile,
    timeframe: TimeFrame,
    volatility: VolatilityState,
    profile: &RiskProfile,
) -> RiskLevels {
    let tf_mult = timeframe_multiplier(timeframe);
    let stop_pct =
        symbol.base_stop_pct * tf_mult * volatility_multiplier(volatility, symbol.spike_prone);

    let ratio = profile.risk_reward_for_confidence(confidence);
    let mut target_pct = stop_pct * ratio;

    // Cap the target at what the symbol realistically moves on this
    // timeframe, but never below the enforced minimum ratio.
    let gain_cap = symbol.max_gain_pct * tf_mult;
    if target_pct > gain_cap {
        target_pct = gain_cap;
    }
    if target_pct < stop_pct * profile.min_risk_reward {
        target_pct = stop_pct * profile.min_risk_reward;
    }

    let (stop_loss, take_profit) = match direction {
        Direction::Down => (entry * (1.0 + stop_pct), entry * (1.0 - target_pct)),
        Direction::Up | Direction::Neutral => {
            (entry * (1.0 - stop_pct), entry * (1.0 + target_pct))
        }
    };

    let pip = symbol.pip_size();
    RiskLevels {
        stop_loss,
        take_profit,
        risk_reward_ratio: target_pct / stop_pct,
        stop_distance_pips: (entry * stop_pct) / pip,
        target_distance_pips: (entry * target_pct) / pip,
        position_size_fraction: position_size(confidence, confluence, profile),
    }
}

/// Conservative default levels for rejected directives: tight symmetric
/// distances and the minimum position size.
pub fn conservative_levels(
    entry: f64,
    direction: Direction,
    symbol: &SymbolProfile,
    profile: &RiskProfile,
) -> RiskLevels {
    let (stop_loss, take_profit) = match direction {
        Direction::Down => (
            entry * (1.0 + FALLBACK_STOP_PCT),
            entry * (1.0 - FALLBACK_TARGET_PCT),
        ),
        Direction::Up | Direction::Neutral => (
            entry * (1.0 - FALLBACK_STOP_PCT),
            entry * (1.0 + FALLBACK_TARGET_PCT),
        ),
    };

    let pip = symbol.pip_size();
    RiskLevels {
        stop_loss,
        take_profit,
        risk_reward_ratio: FALLBACK_TARGET_PCT / FALLBACK_STOP_PCT,
        stop_distance_pips: (entry * FALLBACK_STOP_PCT) / pip,
        target_distance_pips: (entry * FALLBACK_TARGET_PCT) / pip,
        position_size_fraction: profile.min_position_fraction,
    }
}

/// Base allocation scaled up by confidence above the decision floor and by
/// regime confluence, clamped into the profile's band.
fn position_size(confidence: f64, confluence: f64, profile: &RiskProfile) -> f64 {
    let confidence_bonus = clamp((confidence - 0.6) * 2.0, 0.0, 0.5);
    let confluence_bonus = clamp(confluence - 0.5, 0.0, 0.5);
    clamp(
        profile.base_position_fraction * (1.0 + confidence_bonus + confluence_bonus),
        profile.min_position_fraction,
        profile.max_position_fraction,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SymbolProfiles;

    fn symbol(name: &str) -> SymbolProfile {
        SymbolProfiles::default().get(name).unwrap().clone()
    }

    #[test]
    fn long_levels_bracket_entry() {
        let levels = compute_levels(
            100.0,
            Direction::Up,
            0.75,
            0.6,
            &symbol("VOL75"),
            TimeFrame::Hour1,
            VolatilityState::Normal,
            &RiskProfile::strict(),
        );
        assert!(levels.stop_loss < 100.0);
        assert!(levels.take_profit > 100.0);
        assert!(levels.risk_reward_ratio >= 1.5);
        assert!(levels.stop_distance_pips > 0.0);
    }

    #[test]
    fn short_levels_bracket_entry() {
        let levels = compute_levels(
            100.0,
            Direction::Down,
            0.75,
            0.6,
            &symbol("VOL75"),
            TimeFrame::Hour1,
            VolatilityState::Normal,
            &RiskProfile::strict(),
        );
        assert!(levels.stop_loss > 100.0);
        assert!(levels.take_profit < 100.0);
    }

    #[test]
    fn shorter_timeframes_use_tighter_stops() {
        let p = RiskProfile::strict();
        let s = symbol("VOL75");
        let m1 = compute_levels(
            100.0,
            Direction::Up,
            0.7,
            0.5,
            &s,
            TimeFrame::Minute1,
            VolatilityState::Normal,
            &p,
        );
        let d1 = compute_levels(
            100.0,
            Direction::Up,
            0.7,
            0.5,
            &s,
            TimeFrame::Day1,
            VolatilityState::Normal,
            &p,
        );
        assert!(m1.stop_distance_pips < d1.stop_distance_pips);
    }

    #[test]
    fn high_volatility_widens_stops() {
        let p = RiskProfile::strict();
        let s = symbol("VOL75");
        let normal = compute_levels(
            100.0,
            Direction::Up,
            0.7,
            0.5,
            &s,
            TimeFrame::Hour1,
            VolatilityState::Normal,
            &p,
        );
        let extreme = compute_levels(
            100.0,
            Direction::Up,
            0.7,
            0.5,
            &s,
            TimeFrame::Hour1,
            VolatilityState::Extreme,
            &p,
        );
        assert!(extreme.stop_distance_pips > normal.stop_distance_pips);
    }

    #[test]
    fn spike_symbols_tighten_in_hot_regimes() {
        let p = RiskProfile::strict();
        let smooth = compute_levels(
            100.0,
            Direction::Up,
            0.7,
            0.5,
            &symbol("VOL75"),
            TimeFrame::Hour1,
            VolatilityState::Extreme,
            &p,
        );
        let spiky = compute_levels(
            100.0,
            Direction::Up,
            0.7,
            0.5,
            &symbol("CRASH500"),
            TimeFrame::Hour1,
            VolatilityState::Extreme,
            &p,
        );
        // Same multiplier chain, but the spike class applies tightening.
        let smooth_pct = smooth.stop_distance_pips * symbol("VOL75").pip_size() / 100.0
            / symbol("VOL75").base_stop_pct;
        let spiky_pct = spiky.stop_distance_pips * symbol("CRASH500").pip_size() / 100.0
            / symbol("CRASH500").base_stop_pct;
        assert!(spiky_pct < smooth_pct);
    }

    #[test]
    fn minimum_ratio_is_enforced_by_widening() {
        // Day1 doubles the stop; the gain cap would push the ratio below the
        // minimum, so the target widens past the cap instead.
        let levels = compute_levels(
            100.0,
            Direction::Up,
            0.85,
            0.5,
            &symbol("VOL100"),
            TimeFrame::Day1,
            VolatilityState::Extreme,
            &RiskProfile::strict(),
        );
        assert!(levels.risk_reward_ratio >= 1.5 - 1e-9);
    }

    #[test]
    fn position_size_stays_in_band() {
        let p = RiskProfile::strict();
        let small = position_size(0.5, 0.2, &p);
        let large = position_size(0.85, 0.9, &p);
        assert!(small >= p.min_position_fraction);
        assert!(large <= p.max_position_fraction);
        assert!(large > small);
    }

    #[test]
    fn conservative_levels_are_tight_and_minimal() {
        let p = RiskProfile::strict();
        let levels = conservative_levels(100.0, Direction::Up, &symbol("VOL75"), &p);
        assert!((levels.stop_loss - 98.5).abs() < 1e-9);
        assert!((levels.take_profit - 102.5).abs() < 1e-9);
        assert!(levels.risk_reward_ratio >= p.min_risk_reward);
        assert_eq!(levels.position_size_fraction, p.min_position_fraction);
    }
}
