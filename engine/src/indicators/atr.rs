// Average True Range (ATR) indicator implementation
use shared::models::Candle;

/// ATR over `period` candles: rolling mean of the true range
/// `max(H−L, |H−prevC|, |L−prevC|)`. Returns 0.0 with insufficient data.
pub fn atr(candles: &[Candle], period: usize) -> f64 {
    if period == 0 || candles.len() < period + 1 {
        return 0.0;
    }
    let window = &candles[candles.len() - period - 1..];
    let mut sum = 0.0;
    for pair in window.windows(2) {
        sum += true_range(&pair[1], &pair[0]);
    }
    sum / period as f64
}

/// ATR as a percentage of the latest close.
pub fn normalized_atr(candles: &[Candle], period: usize) -> f64 {
    let Some(last) = candles.last() else {
        return 0.0;
    };
    if last.close == 0.0 {
        return 0.0;
    }
    atr(candles, period) / last.close * 100.0
}

/// Trailing series of normalized ATR readings, one per bar for up to the last
/// `window` bars. Used for percentile-ranking the current value.
pub fn normalized_atr_series(candles: &[Candle], period: usize, window: usize) -> Vec<f64> {
    let n = candles.len();
    if n < period + 1 {
        return Vec::new();
    }
    let points = window.min(n - period);
    let mut series = Vec::with_capacity(points);
    for i in 0..points {
        let end = n - points + i + 1;
        series.push(normalized_atr(&candles[..end], period));
    }
    series
}

fn true_range(current: &Candle, previous: &Candle) -> f64 {
    let hl = current.high - current.low;
    let hc = (current.high - previous.close).abs();
    let lc = (current.low - previous.close).abs();
    hl.max(hc).max(lc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn candle(high: f64, low: f64, close: f64) -> Candle {
        Candle {
            symbol: "TEST".to_string(),
            timestamp: Utc::now(),
            open: close,
            high,
            low,
            close,
            volume: 0.0,
        }
    }

    #[test]
    fn test_atr_insufficient_data() {
        let candles = vec![candle(10.0, 9.0, 9.5); 5];
        assert_eq!(atr(&candles, 14), 0.0);
    }

    #[test]
    fn test_atr_constant_range() {
        // Every bar spans exactly 2.0 with unchanged closes.
        let candles = vec![candle(101.0, 99.0, 100.0); 20];
        let value = atr(&candles, 14);
        assert!((value - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_atr_gap_uses_previous_close() {
        let mut candles = vec![candle(101.0, 99.0, 100.0); 15];
        // Gap up: high-low is 1.0 but distance from previous close is 9.0.
        candles.push(candle(109.0, 108.0, 108.5));
        let value = atr(&candles, 14);
        assert!(value > 2.0);
    }

    #[test]
    fn test_normalized_atr() {
        let candles = vec![candle(101.0, 99.0, 100.0); 20];
        let value = normalized_atr(&candles, 14);
        assert!((value - 2.0).abs() < 1e-9); // 2.0 / 100 * 100
    }

    #[test]
    fn test_normalized_atr_series_length() {
        let candles = vec![candle(101.0, 99.0, 100.0); 40];
        let series = normalized_atr_series(&candles, 14, 20);
        assert_eq!(series.len(), 20);
        assert!(series.iter().all(|v| *v >= 0.0));
    }
}
