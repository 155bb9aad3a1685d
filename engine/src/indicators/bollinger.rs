// Bollinger Bands indicator implementation
use serde::Serialize;

/// Trailing bars used to rank the current band width for the squeeze flag.
const SQUEEZE_WINDOW: usize = 50;
/// Width below this percentile of its trailing distribution flags a squeeze.
const SQUEEZE_PERCENTILE: f64 = 0.25;

#[derive(Debug, Clone, Serialize)]
pub struct BollingerOutput {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    /// Price location inside the band, clamped to [0, 1]; 0.5 when the band
    /// has no width or there is insufficient data.
    pub position: f64,
    /// Band width relative to the middle band.
    pub width: f64,
    /// True when the width sits in the lowest quartile of its trailing range.
    pub squeeze: bool,
}

impl BollingerOutput {
    fn neutral(price: f64) -> Self {
        BollingerOutput {
            upper: price,
            middle: price,
            lower: price,
            position: 0.5,
            width: 0.0,
            squeeze: false,
        }
    }
}

/// Bollinger Bands: `period`-SMA ± `std_mult` standard deviations
/// (population). Falls back to a neutral output with insufficient data.
pub fn bollinger(closes: &[f64], period: usize, std_mult: f64) -> BollingerOutput {
    let price = closes.last().copied().unwrap_or(0.0);
    if period == 0 || closes.len() < period {
        return BollingerOutput::neutral(price);
    }

    let (upper, middle, lower) = bands_at(closes, period, std_mult);
    let span = upper - lower;
    let position = if span > 0.0 {
        ((price - lower) / span).clamp(0.0, 1.0)
    } else {
        0.5
    };
    let width = if middle != 0.0 { span / middle } else { 0.0 };

    BollingerOutput {
        upper,
        middle,
        lower,
        position,
        width,
        squeeze: is_squeeze(closes, period, std_mult, width),
    }
}

fn bands_at(closes: &[f64], period: usize, std_mult: f64) -> (f64, f64, f64) {
    let window = &closes[closes.len() - period..];
    let middle = window.iter().sum::<f64>() / period as f64;
    let variance = window.iter().map(|&p| (p - middle).powi(2)).sum::<f64>() / period as f64;
    let std_dev = variance.sqrt();
    (middle + std_mult * std_dev, middle, middle - std_mult * std_dev)
}

fn is_squeeze(closes: &[f64], period: usize, std_mult: f64, current_width: f64) -> bool {
    let n = closes.len();
    let points = SQUEEZE_WINDOW.min(n.saturating_sub(period));
    if points < 10 {
        return false;
    }
    let mut widths: Vec<f64> = (0..points)
        .map(|i| {
            let end = n - points + i;
            let (upper, middle, lower) = bands_at(&closes[..end], period, std_mult);
            if middle != 0.0 {
                (upper - lower) / middle
            } else {
                0.0
            }
        })
        .collect();
    widths.sort_by(|a, b| a.total_cmp(b));
    let threshold = widths[((widths.len() as f64 - 1.0) * SQUEEZE_PERCENTILE) as usize];
    current_width < threshold
}
