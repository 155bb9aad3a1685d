// Exponential Moving Average (EMA) indicator implementation

/// EMA series with multiplier `2 / (period + 1)`, seeded with the SMA of the
/// first `period` values. Empty with insufficient data.
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }
    let multiplier = 2.0 / (period as f64 + 1.0);
    let seed: f64 = values[..period].iter().sum::<f64>() / period as f64;

    let mut results = Vec::with_capacity(values.len() - period + 1);
    results.push(seed);
    let mut previous = seed;
    for &value in &values[period..] {
        let next = (value - previous) * multiplier + previous;
        results.push(next);
        previous = next;
    }
    results
}

/// Latest EMA value, or `None` with insufficient data.
pub fn ema(values: &[f64], period: usize) -> Option<f64> {
    ema_series(values, period).last().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ema_calculation() {
        let values = vec![10.0, 11.0, 12.0, 13.0, 14.0];
        let series = ema_series(&values, 3);
        // SMA seed: (10+11+12)/3 = 11.0
        // EMA for 13: (13 - 11.0) * 0.5 + 11.0 = 12.0
        // EMA for 14: (14 - 12.0) * 0.5 + 12.0 = 13.0
        assert_eq!(series, vec![11.0, 12.0, 13.0]);
        assert_eq!(ema(&values, 3), Some(13.0));
    }

    #[test]
    fn test_ema_insufficient_data() {
        assert!(ema_series(&[1.0, 2.0], 5).is_empty());
        assert_eq!(ema(&[1.0, 2.0], 5), None);
    }

    #[test]
    fn test_ema_period_zero() {
        assert!(ema_series(&[1.0, 2.0, 3.0], 0).is_empty());
    }
}
