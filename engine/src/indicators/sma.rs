// Simple Moving Average (SMA) indicator implementation

/// SMA of the trailing `period` values. `None` with insufficient data or a
/// zero period.
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Rolling SMA series. One output per input once `period` values are
/// available; empty with insufficient data.
pub fn sma_series(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }
    let mut results = Vec::with_capacity(values.len() - period + 1);
    let mut sum: f64 = values[..period].iter().sum();
    results.push(sum / period as f64);
    for i in period..values.len() {
        sum = sum - values[i - period] + values[i];
        results.push(sum / period as f64);
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_calculation() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(sma(&values, 3), Some(4.0)); // (3+4+5)/3
        assert_eq!(sma(&values, 5), Some(3.0));
    }

    #[test]
    fn test_sma_insufficient_data() {
        let values = vec![1.0, 2.0];
        assert_eq!(sma(&values, 3), None);
        assert_eq!(sma(&values, 0), None);
    }

    #[test]
    fn test_sma_series_sliding_window() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let series = sma_series(&values, 3);
        assert_eq!(series, vec![2.0, 3.0, 4.0]);
    }
}
