// Relative Strength Index (RSI) indicator implementation

/// RSI over `period` closes using Wilder's smoothing.
///
/// Average gain/loss are seeded with simple averages of the first `period`
/// changes, then smoothed with factor `1/period`. `avg_loss == 0` gives 100.
/// Returns the neutral 50 with insufficient data.
pub fn rsi(closes: &[f64], period: usize) -> f64 {
    if period == 0 || closes.len() < period + 1 {
        return 50.0;
    }

    let changes: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

    let mut avg_gain = changes[..period]
        .iter()
        .map(|&c| if c > 0.0 { c } else { 0.0 })
        .sum::<f64>()
        / period as f64;
    let mut avg_loss = changes[..period]
        .iter()
        .map(|&c| if c < 0.0 { -c } else { 0.0 })
        .sum::<f64>()
        / period as f64;

    for &change in &changes[period..] {
        let (gain, loss) = if change > 0.0 {
            (change, 0.0)
        } else {
            (0.0, -change)
        };
        avg_gain = (avg_gain * (period as f64 - 1.0) + gain) / period as f64;
        avg_loss = (avg_loss * (period as f64 - 1.0) + loss) / period as f64;
    }

    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rsi_known_dataset() {
        // StockCharts RSI reference series, period 14.
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            45.61, 46.28, 46.28, 46.00, 46.03, 46.41, 46.22, 45.64,
        ];
        let value = rsi(&closes, 14);
        assert!(value > 50.0 && value < 80.0, "RSI out of range: {}", value);
    }

    #[test]
    fn test_rsi_all_gains() {
        let closes: Vec<f64> = (1..=20).map(|i| i as f64).collect();
        assert_eq!(rsi(&closes, 14), 100.0);
    }

    #[test]
    fn test_rsi_all_losses() {
        let closes: Vec<f64> = (1..=20).rev().map(|i| i as f64).collect();
        assert_eq!(rsi(&closes, 14), 0.0);
    }

    #[test]
    fn test_rsi_insufficient_data() {
        let closes = vec![1.0; 10];
        assert_eq!(rsi(&closes, 14), 50.0);
    }

    #[test]
    fn test_rsi_bounded() {
        let closes: Vec<f64> = (0..60)
            .map(|i| 100.0 + ((i * 37) % 11) as f64 - 5.0)
            .collect();
        let value = rsi(&closes, 14);
        assert!((0.0..=100.0).contains(&value));
    }
}
