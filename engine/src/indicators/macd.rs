// Moving Average Convergence Divergence (MACD) indicator implementation
use super::ema::ema_series;

/// MACD as `(line, signal, histogram)`.
///
/// Line = EMA(fast) − EMA(slow), signal = EMA(signal) of the line,
/// histogram = line − signal. Returns zeros with insufficient data.
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> (f64, f64, f64) {
    if fast == 0 || slow <= fast || signal == 0 || closes.len() < slow + signal {
        return (0.0, 0.0, 0.0);
    }

    let fast_ema = ema_series(closes, fast);
    let slow_ema = ema_series(closes, slow);
    if fast_ema.is_empty() || slow_ema.is_empty() {
        return (0.0, 0.0, 0.0);
    }

    // The slow EMA starts `slow - fast` values later; align the tails.
    let offset = slow - fast;
    let line_series: Vec<f64> = (0..slow_ema.len())
        .map(|i| fast_ema[i + offset] - slow_ema[i])
        .collect();

    let signal_series = ema_series(&line_series, signal);
    let (Some(&line), Some(&signal_value)) = (line_series.last(), signal_series.last()) else {
        return (0.0, 0.0, 0.0);
    };
    (line, signal_value, line - signal_value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macd_insufficient_data() {
        let closes: Vec<f64> = (1..=10).map(|i| i as f64).collect();
        assert_eq!(macd(&closes, 12, 26, 9), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_macd_flat_prices() {
        let closes = vec![100.0; 50];
        let (line, signal, histogram) = macd(&closes, 12, 26, 9);
        assert_eq!(line, 0.0);
        assert_eq!(signal, 0.0);
        assert_eq!(histogram, 0.0);
    }

    #[test]
    fn test_macd_uptrend_positive_line() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let (line, _, _) = macd(&closes, 12, 26, 9);
        assert!(line > 0.0, "uptrend should give positive MACD, got {}", line);
    }

    #[test]
    fn test_macd_downtrend_negative_line() {
        let closes: Vec<f64> = (0..60).map(|i| 200.0 - i as f64).collect();
        let (line, _, _) = macd(&closes, 12, 26, 9);
        assert!(line < 0.0);
    }
}
