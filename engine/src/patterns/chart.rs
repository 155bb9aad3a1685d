// Multi-candle chart patterns over local maxima/minima found by simple
// 3-point peak/trough detection on highs and lows.
use shared::models::{Candle, Direction};
use shared::utils::mean;

use super::{PatternKind, PatternMatch};

/// Minimum candles before chart-pattern detection runs.
const MIN_CANDLES: usize = 15;
/// Chart scan examines at most this many trailing candles.
const SCAN_WINDOW: usize = 40;
/// Double top/bottom extremes must match within this fraction.
const DOUBLE_TOLERANCE: f64 = 0.02;
/// Valley/peak between the two extremes must retrace at least this fraction
/// of the window's full range.
const DOUBLE_MIN_DEPTH: f64 = 0.30;
/// Head-and-shoulders outer peaks must match within this fraction.
const SHOULDER_TOLERANCE: f64 = 0.03;
/// Normalized per-bar slope below this is treated as flat.
const FLAT_SLOPE: f64 = 0.0005;

#[derive(Debug, Clone, Copy)]
struct Extremum {
    index: usize,
    value: f64,
}

/// Scan the trailing window for chart patterns.
pub fn detect(candles: &[Candle]) -> Vec<PatternMatch> {
    if candles.len() < MIN_CANDLES {
        return Vec::new();
    }
    let window = &candles[candles.len().saturating_sub(SCAN_WINDOW)..];
    let highs: Vec<f64> = window.iter().map(|c| c.high).collect();
    let lows: Vec<f64> = window.iter().map(|c| c.low).collect();

    let peaks = find_extrema(&highs, true);
    let troughs = find_extrema(&lows, false);

    let mut matches = Vec::new();
    if let Some(m) = double_top(&peaks, &lows, &highs) {
        matches.push(m);
    }
    if let Some(m) = double_bottom(&troughs, &highs, &lows) {
        matches.push(m);
    }
    if let Some(m) = head_and_shoulders(&peaks, &lows) {
        matches.push(m);
    }
    if let Some(m) = inverse_head_and_shoulders(&troughs, &highs) {
        matches.push(m);
    }
    if let Some(m) = triangle(&peaks, &troughs, &highs) {
        matches.push(m);
    }
    matches
}

/// 3-point local extremum detection: a peak is strictly above both
/// neighbours (trough strictly below).
fn find_extrema(values: &[f64], peaks: bool) -> Vec<Extremum> {
    let mut result = Vec::new();
    for i in 1..values.len().saturating_sub(1) {
        let found = if peaks {
            values[i] > values[i - 1] && values[i] > values[i + 1]
        } else {
            values[i] < values[i - 1] && values[i] < values[i + 1]
        };
        if found {
            result.push(Extremum {
                index: i,
                value: values[i],
            });
        }
    }
    result
}

fn window_range(highs: &[f64], lows: &[f64]) -> f64 {
    let max = highs.iter().copied().fold(f64::MIN, f64::max);
    let min = lows.iter().copied().fold(f64::MAX, f64::min);
    max - min
}

fn double_top(peaks: &[Extremum], lows: &[f64], highs: &[f64]) -> Option<PatternMatch> {
    let (first, second) = last_matching_pair(peaks, DOUBLE_TOLERANCE)?;
    let valley = lows[first.index..=second.index]
        .iter()
        .copied()
        .fold(f64::MAX, f64::min);
    let peak = (first.value + second.value) / 2.0;

    let range = window_range(highs, lows);
    if range <= 0.0 || (peak - valley) < range * DOUBLE_MIN_DEPTH {
        return None;
    }

    // Neckline at the valley; target projects the peak-to-neckline move below it.
    let neckline = valley;
    let target = neckline - (peak - neckline);
    let stop = first.value.max(second.value);
    Some(PatternMatch::new(PatternKind::DoubleTop, Direction::Down).with_levels(target, stop))
}

fn double_bottom(troughs: &[Extremum], highs: &[f64], lows: &[f64]) -> Option<PatternMatch> {
    let (first, second) = last_matching_pair(troughs, DOUBLE_TOLERANCE)?;
    let crest = highs[first.index..=second.index]
        .iter()
        .copied()
        .fold(f64::MIN, f64::max);
    let trough = (first.value + second.value) / 2.0;

    let range = window_range(highs, lows);
    if range <= 0.0 || (crest - trough) < range * DOUBLE_MIN_DEPTH {
        return None;
    }

    let neckline = crest;
    let target = neckline + (neckline - trough);
    let stop = first.value.min(second.value);
    Some(PatternMatch::new(PatternKind::DoubleBottom, Direction::Up).with_levels(target, stop))
}

/// Last pair of consecutive extrema whose values match within `tolerance`
/// and that are separated by at least 5 bars.
fn last_matching_pair(extrema: &[Extremum], tolerance: f64) -> Option<(Extremum, Extremum)> {
    extrema
        .windows(2)
        .rev()
        .find(|pair| {
            let (a, b) = (pair[0], pair[1]);
            b.index - a.index >= 5 && a.value != 0.0 && ((a.value - b.value) / a.value).abs() <= tolerance
        })
        .map(|pair| (pair[0], pair[1]))
}

fn head_and_shoulders(peaks: &[Extremum], lows: &[f64]) -> Option<PatternMatch> {
    let n = peaks.len();
    if n < 3 {
        return None;
    }
    let (left, head, right) = (peaks[n - 3], peaks[n - 2], peaks[n - 1]);
    if head.value <= left.value || head.value <= right.value {
        return None;
    }
    if left.value == 0.0 || ((left.value - right.value) / left.value).abs() > SHOULDER_TOLERANCE {
        return None;
    }

    let neckline = lows[left.index..=right.index]
        .iter()
        .copied()
        .fold(f64::MAX, f64::min);
    let target = neckline - (head.value - neckline);
    Some(
        PatternMatch::new(PatternKind::HeadAndShoulders, Direction::Down)
            .with_levels(target, head.value),
    )
}

fn inverse_head_and_shoulders(troughs: &[Extremum], highs: &[f64]) -> Option<PatternMatch> {
    let n = troughs.len();
    if n < 3 {
        return None;
    }
    let (left, head, right) = (troughs[n - 3], troughs[n - 2], troughs[n - 1]);
    if head.value >= left.value || head.value >= right.value {
        return None;
    }
    if left.value == 0.0 || ((left.value - right.value) / left.value).abs() > SHOULDER_TOLERANCE {
        return None;
    }

    let neckline = highs[left.index..=right.index]
        .iter()
        .copied()
        .fold(f64::MIN, f64::max);
    let target = neckline + (neckline - head.value);
    Some(
        PatternMatch::new(PatternKind::InverseHeadAndShoulders, Direction::Up)
            .with_levels(target, head.value),
    )
}

fn triangle(peaks: &[Extremum], troughs: &[Extremum], highs: &[f64]) -> Option<PatternMatch> {
    if peaks.len() < 2 || troughs.len() < 2 {
        return None;
    }
    let price = mean(highs);
    if price == 0.0 {
        return None;
    }

    // Per-bar slope of the extrema values, normalized by price level.
    let high_slope = slope_of(peaks) / price;
    let low_slope = slope_of(troughs) / price;

    let highs_flat = high_slope.abs() < FLAT_SLOPE;
    let lows_flat = low_slope.abs() < FLAT_SLOPE;

    let kind = if highs_flat && low_slope > FLAT_SLOPE {
        (PatternKind::AscendingTriangle, Direction::Up)
    } else if lows_flat && high_slope < -FLAT_SLOPE {
        (PatternKind::DescendingTriangle, Direction::Down)
    } else if high_slope < -FLAT_SLOPE && low_slope > FLAT_SLOPE {
        (PatternKind::SymmetricalTriangle, Direction::Neutral)
    } else {
        return None;
    };

    Some(PatternMatch::new(kind.0, kind.1))
}

/// Slope of extremum values against their bar indices.
fn slope_of(extrema: &[Extremum]) -> f64 {
    // Index gaps between extrema are uneven; interpolate onto bar spacing by
    // fitting value against index directly.
    let n = extrema.len();
    if n < 2 {
        return 0.0;
    }
    let mean_x = mean(&extrema.iter().map(|e| e.index as f64).collect::<Vec<_>>());
    let mean_y = mean(&extrema.iter().map(|e| e.value).collect::<Vec<_>>());
    let mut num = 0.0;
    let mut den = 0.0;
    for e in extrema {
        let dx = e.index as f64 - mean_x;
        num += dx * (e.value - mean_y);
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
    use chrono::{Duration, Utc};

    fn candles_from_levels(levels: &[f64]) -> Vec<Candle> {
        let start = Utc::now();
        levels
            .iter()
            .enumerate()
            .map(|(i, &level)| Candle {
                symbol: "TEST".to_string(),
                timestamp: start + Duration::minutes(i as i64),
                open: level,
                high: level + 0.1,
                low: level - 0.1,
                close: level,
                volume: 100.0,
            })
            .collect()
    }

    /// Two peaks 19 candles apart within 1%, deep valley between them.
    fn double_top_series() -> Vec<f64> {
        let mut levels = vec![100.0; 3];
        // Rise to the first peak at 110.
        levels.extend([104.0, 108.0, 110.0, 108.0, 104.0]);
        // Valley down to 100.
        levels.extend([102.0, 100.0, 100.5, 101.0, 101.5]);
        // Second rise: peak 109.5, within 1% of 110, 19 bars after the first.
        levels.extend([103.0, 105.0, 107.0, 108.5, 109.0, 109.3, 109.4, 109.3, 109.5]);
        levels.extend([107.0, 105.0, 103.0]);
        levels
    }

    #[test]
    fn detects_double_top_with_projected_target() {
        let candles = candles_from_levels(&double_top_series());
        let matches = detect(&candles);
        let dt = matches
            .iter()
            .find(|m| m.kind == PatternKind::DoubleTop)
            .expect("double top should fire");

        assert_eq!(dt.signal, Direction::Down);
        assert_eq!(dt.reliability, 0.85);
        // Target projects the peak-to-neckline distance below the neckline.
        let target = dt.target.unwrap();
        assert!(target < 100.0, "target {} should sit below the valley", target);
    }

    #[test]
    fn detects_double_bottom() {
        let inverted: Vec<f64> = double_top_series().iter().map(|v| 210.0 - v).collect();
        let candles = candles_from_levels(&inverted);
        let matches = detect(&candles);
        let db = matches
            .iter()
            .find(|m| m.kind == PatternKind::DoubleBottom)
            .expect("double bottom should fire");
        assert_eq!(db.signal, Direction::Up);
        assert!(db.target.unwrap() > 110.0);
    }

    #[test]
    fn detects_head_and_shoulders() {
        let mut levels = vec![100.0; 3];
        levels.extend([103.0, 106.0, 103.0, 100.0]); // left shoulder 106
        levels.extend([104.0, 110.0, 104.0, 100.0]); // head 110
        levels.extend([103.0, 106.2, 103.0, 100.0]); // right shoulder 106.2
        levels.push(99.0);
        let candles = candles_from_levels(&levels);
        let matches = detect(&candles);
        let hs = matches
            .iter()
            .find(|m| m.kind == PatternKind::HeadAndShoulders)
            .expect("head and shoulders should fire");
        assert_eq!(hs.signal, Direction::Down);
        assert!(hs.target.unwrap() < 100.0);
    }

    #[test]
    fn no_chart_pattern_below_minimum_window() {
        let candles = candles_from_levels(&[100.0; 10]);
        assert!(detect(&candles).is_empty());
    }
}
