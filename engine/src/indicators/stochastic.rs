// Stochastic oscillator and Williams %R implementations
use shared::models::Candle;

/// %D smoothing length over the %K series.
const D_PERIOD: usize = 3;

/// Stochastic oscillator as `(%K, %D)` over a `lookback` high-low range.
/// %D is a 3-period SMA of %K. Returns the neutral (50, 50) with
/// insufficient data.
pub fn stochastic(candles: &[Candle], lookback: usize) -> (f64, f64) {
    if lookback == 0 || candles.len() < lookback {
        return (50.0, 50.0);
    }

    let k = percent_k(candles, lookback);

    let available = (candles.len() - lookback + 1).min(D_PERIOD);
    let mut k_sum = 0.0;
    for i in 0..available {
        let end = candles.len() - i;
        k_sum += percent_k(&candles[..end], lookback);
    }
    let d = k_sum / available as f64;

    (k, d)
}

/// Williams %R over a `lookback` high-low range, in [-100, 0].
/// Returns -50 with insufficient data.
pub fn williams_r(candles: &[Candle], lookback: usize) -> f64 {
    if lookback == 0 || candles.len() < lookback {
        return -50.0;
    }
    let window = &candles[candles.len() - lookback..];
    let highest = window.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let lowest = window.iter().map(|c| c.low).fold(f64::MAX, f64::min);
    let close = window.last().map(|c| c.close).unwrap_or(0.0);
    if highest == lowest {
        return -50.0;
    }
    (highest - close) / (highest - lowest) * -100.0
}

fn percent_k(candles: &[Candle], lookback: usize) -> f64 {
    let window = &candles[candles.len() - lookback..];
    let highest = window.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let lowest = window.iter().map(|c| c.low).fold(f64::MAX, f64::min);
    let close = window.last().map(|c| c.close).unwrap_or(0.0);
    if highest == lowest {
        return 50.0;
    }
    (close - lowest) / (highest - lowest) * 100.0
}
