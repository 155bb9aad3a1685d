// Small numeric helpers shared between the engine components.

/// Clamp `value` into `[min, max]`.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Percentage change from `from` to `to`. Returns 0.0 when `from` is 0.
pub fn percent_change(from: f64, to: f64) -> f64 {
    if from == 0.0 {
        return 0.0;
    }
    (to - from) / from * 100.0
}

/// Arithmetic mean. Returns 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Least-squares slope of `values` against their indices.
/// Returns 0.0 with fewer than 2 points.
pub fn slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mean_x = (n as f64 - 1.0) / 2.0;
    let mean_y = mean(values);
    let mut num = 0.0;
    let mut den = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        num += dx * (y - mean_y);
        den += dx * dx;
    }
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(1.5, 0.0, 1.0), 1.0);
        assert_eq!(clamp(-0.5, 0.0, 1.0), 0.0);
        assert_eq!(clamp(0.3, 0.0, 1.0), 0.3);
    }

    #[test]
    fn test_percent_change() {
        assert_eq!(percent_change(100.0, 110.0), 10.0);
        assert_eq!(percent_change(0.0, 5.0), 0.0);
    }

    #[test]
    fn test_slope_rising_series() {
        let values = vec![1.0, 2.0, 3.0, 4.0];
        assert!((slope(&values) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_slope_flat_series() {
        let values = vec![2.0, 2.0, 2.0];
        assert_eq!(slope(&values), 0.0);
    }
}
