// Market regime classification: volatility, trend, and momentum state
// derived from the indicator snapshot. Stateless, recomputed per request.
use serde::Serialize;
use shared::models::{Candle, Direction};

use crate::indicators::{atr, IndicatorSet, ATR_PERIOD};

/// Trailing window for percentile-ranking the current normalized ATR.
const VOLATILITY_WINDOW: usize = 100;
/// Lookback for the trend efficiency statistic.
const TREND_LOOKBACK: usize = 20;
/// Half of `TREND_LOOKBACK`; the momentum read compares the two halves.
const MOMENTUM_SPAN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VolatilityState {
    Low,
    Normal,
    High,
    Extreme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendState {
    StrongUp,
    WeakUp,
    Sideways,
    WeakDown,
    StrongDown,
}

impl TrendState {
    pub fn direction(&self) -> Direction {
        match self {
            TrendState::StrongUp | TrendState::WeakUp => Direction::Up,
            TrendState::StrongDown | TrendState::WeakDown => Direction::Down,
            TrendState::Sideways => Direction::Neutral,
        }
    }

    pub fn is_strong(&self) -> bool {
        matches!(self, TrendState::StrongUp | TrendState::StrongDown)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MomentumState {
    Accelerating,
    Steady,
    Decelerating,
}

/// Classification of the current market condition.
#[derive(Debug, Clone, Serialize)]
pub struct RegimeState {
    pub volatility_state: VolatilityState,
    pub trend_state: TrendState,
    pub momentum_state: MomentumState,
    /// Agreement of the three reads, in [0, 1].
    pub confluence_score: f64,
}

/// Classify the regime from a candle snapshot and its indicator set.
pub fn classify(candles: &[Candle], indicators: &IndicatorSet) -> RegimeState {
    let volatility_state = volatility_state(candles, indicators.atr_normalized);
    let trend_state = trend_state(candles);
    let momentum_state = momentum_state(candles);
    let confluence_score = confluence(volatility_state, trend_state, momentum_state);

    RegimeState {
        volatility_state,
        trend_state,
        momentum_state,
        confluence_score,
    }
}

fn volatility_state(candles: &[Candle], current_normalized_atr: f64) -> VolatilityState {
    let series = atr::normalized_atr_series(candles, ATR_PERIOD, VOLATILITY_WINDOW);
    if series.len() < 10 {
        return VolatilityState::Normal;
    }
    let below = series
        .iter()
        .filter(|&&v| v <= current_normalized_atr)
        .count();
    let rank = below as f64 / series.len() as f64;

    if rank < 0.25 {
        VolatilityState::Low
    } else if rank < 0.75 {
        VolatilityState::Normal
    } else if rank < 0.90 {
        VolatilityState::High
    } else {
        VolatilityState::Extreme
    }
}

/// Efficiency ratio: net directional move over total absolute move, in
/// [-1, 1]. Zero for flat or insufficient data.
fn efficiency_ratio(closes: &[f64]) -> f64 {
    if closes.len() < 2 {
        return 0.0;
    }
    let net = closes[closes.len() - 1] - closes[0];
    let total: f64 = closes.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
    if total == 0.0 {
        0.0
    } else {
        net / total
    }
}

fn trend_state(candles: &[Candle]) -> TrendState {
    if candles.len() < TREND_LOOKBACK {
        return TrendState::Sideways;
    }
    let closes: Vec<f64> = candles[candles.len() - TREND_LOOKBACK..]
        .iter()
        .map(|c| c.close)
        .collect();
    let er = efficiency_ratio(&closes);

    if er >= 0.6 {
        TrendState::StrongUp
    } else if er >= 0.25 {
        TrendState::WeakUp
    } else if er <= -0.6 {
        TrendState::StrongDown
    } else if er <= -0.25 {
        TrendState::WeakDown
    } else {
        TrendState::Sideways
    }
}

fn momentum_state(candles: &[Candle]) -> MomentumState {
    if candles.len() < MOMENTUM_SPAN * 2 {
        return MomentumState::Steady;
    }
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let n = closes.len();
    let recent = efficiency_ratio(&closes[n - MOMENTUM_SPAN..]);
    let prior = efficiency_ratio(&closes[n - MOMENTUM_SPAN * 2..n - MOMENTUM_SPAN]);

    let delta = recent.abs() - prior.abs();
    if delta > 0.1 {
        MomentumState::Accelerating
    } else if delta < -0.1 {
        MomentumState::Decelerating
    } else {
        MomentumState::Steady
    }
}

fn confluence(
    volatility: VolatilityState,
    trend: TrendState,
    momentum: MomentumState,
) -> f64 {
    let trend_score = match trend {
        TrendState::StrongUp | TrendState::StrongDown => 1.0,
        TrendState::WeakUp | TrendState::WeakDown => 0.6,
        TrendState::Sideways => 0.2,
    };
    let momentum_score = match momentum {
        MomentumState::Accelerating => 1.0,
        MomentumState::Steady => 0.7,
        MomentumState::Decelerating => 0.4,
    };
    // A tradable regime is directional but not chaotic.
    let volatility_score = match volatility {
        VolatilityState::Normal => 1.0,
        VolatilityState::Low => 0.8,
        VolatilityState::High => 0.7,
        VolatilityState::Extreme => 0.4,
    };

    0.5 * trend_score + 0.3 * momentum_score + 0.2 * volatility_score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SymbolProfiles;
    use chrono::{Duration, Utc};

    fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
        let start = Utc::now();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                symbol: "TEST".to_string(),
                timestamp: start + Duration::minutes(i as i64),
                open: close,
                high: close + 0.2,
                low: close - 0.2,
                close,
                volume: 50.0,
            })
            .collect()
    }

    fn classify_closes(closes: &[f64]) -> RegimeState {
        let candles = candles_from_closes(closes);
        let profile = SymbolProfiles::default().get("UNLISTED").unwrap().clone();
        let indicators = IndicatorSet::compute(&candles, &profile);
        classify(&candles, &indicators)
    }

    #[test]
    fn steady_uptrend_is_strong_up() {
        let closes: Vec<f64> = (0..150).map(|i| 100.0 + i as f64).collect();
        let regime = classify_closes(&closes);
        assert_eq!(regime.trend_state, TrendState::StrongUp);
        assert_eq!(regime.trend_state.direction(), Direction::Up);
        assert!(regime.confluence_score > 0.7);
    }

    #[test]
    fn steady_downtrend_is_strong_down() {
        let closes: Vec<f64> = (0..150).map(|i| 300.0 - i as f64).collect();
        let regime = classify_closes(&closes);
        assert_eq!(regime.trend_state, TrendState::StrongDown);
    }

    #[test]
    fn oscillation_is_sideways() {
        let closes: Vec<f64> = (0..150)
            .map(|i| 100.0 + if i % 2 == 0 { 1.0 } else { -1.0 })
            .collect();
        let regime = classify_closes(&closes);
        assert_eq!(regime.trend_state, TrendState::Sideways);
        assert!(regime.confluence_score < 0.7);
    }

    #[test]
    fn short_buffer_defaults_to_neutral_states() {
        let closes: Vec<f64> = (0..5).map(|i| 100.0 + i as f64).collect();
        let regime = classify_closes(&closes);
        assert_eq!(regime.trend_state, TrendState::Sideways);
        assert_eq!(regime.momentum_state, MomentumState::Steady);
        assert_eq!(regime.volatility_state, VolatilityState::Normal);
    }

    #[test]
    fn confluence_is_bounded() {
        let closes: Vec<f64> = (0..150)
            .map(|i| 100.0 + (i as f64 * 0.3).sin() * 4.0)
            .collect();
        let regime = classify_closes(&closes);
        assert!((0.0..=1.0).contains(&regime.confluence_score));
    }
}
