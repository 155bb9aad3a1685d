// Volume analysis: OBV, VWAP, volume-at-price profile, price/volume
// divergence and climax detection over the candle snapshot.
use serde::Serialize;
use shared::models::{Candle, Direction};
use shared::utils::{mean, slope};

/// Minimum candles before the full analysis runs.
const MIN_CANDLES: usize = 10;
/// Last candle's volume must reach this multiple of the trailing average to
/// count as a climax.
const CLIMAX_MULT: f64 = 2.0;
/// Trailing candles averaged for the climax comparison.
const CLIMAX_LOOKBACK: usize = 5;
/// Lookback for the price/OBV divergence slopes.
const DIVERGENCE_LOOKBACK: usize = 20;
/// Lookback for the raw volume trend slope.
const TREND_LOOKBACK: usize = 10;
/// The value area covers this fraction of total profiled volume.
const VALUE_AREA_FRACTION: f64 = 0.70;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VolumeTrend {
    Rising,
    Falling,
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DivergenceKind {
    /// Price falling while OBV rises.
    Bullish,
    /// Price rising while OBV falls.
    Bearish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClimaxKind {
    /// Volume spike on an up candle; exhaustion of buyers.
    BuyingClimax,
    /// Volume spike on a down candle; exhaustion of sellers.
    SellingClimax,
}

#[derive(Debug, Clone, Serialize)]
pub struct VolumeBin {
    pub price_low: f64,
    pub price_high: f64,
    pub volume: f64,
}

/// Volume-at-price histogram with point of control and value area.
#[derive(Debug, Clone, Serialize)]
pub struct VolumeProfile {
    pub bins: Vec<VolumeBin>,
    /// Midprice of the highest-volume bin.
    pub point_of_control: f64,
    pub value_area_low: f64,
    pub value_area_high: f64,
}

/// Full volume read for one snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct VolumeAnalysis {
    pub obv: f64,
    pub vwap: f64,
    pub trend: VolumeTrend,
    pub profile: Option<VolumeProfile>,
    pub divergence: Option<DivergenceKind>,
    pub climax: Option<ClimaxKind>,
    pub signal: Direction,
    pub strength: f64,
}

impl VolumeAnalysis {
    fn neutral(price: f64) -> Self {
        VolumeAnalysis {
            obv: 0.0,
            vwap: price,
            trend: VolumeTrend::Flat,
            profile: None,
            divergence: None,
            climax: None,
            signal: Direction::Neutral,
            strength: 0.0,
        }
    }
}

/// Analyze the snapshot. `bins` sizes the volume profile histogram.
pub fn analyze(candles: &[Candle], bins: usize) -> VolumeAnalysis {
    let price = candles.last().map(|c| c.close).unwrap_or(0.0);
    if candles.len() < MIN_CANDLES {
        return VolumeAnalysis::neutral(price);
    }

    let obv_series = obv_series(candles);
    let obv = obv_series[obv_series.len() - 1];
    let vwap = vwap(candles).unwrap_or(price);
    let trend = volume_trend(candles);
    let profile = build_profile(candles, bins);
    let divergence = divergence(candles, &obv_series);
    let climax = climax(candles);

    let (signal, strength) = interpret(price, vwap, trend, divergence, climax);

    VolumeAnalysis {
        obv,
        vwap,
        trend,
        profile,
        divergence,
        climax,
        signal,
        strength,
    }
}

/// On-balance volume: running sum adding volume on up closes and
/// subtracting it on down closes.
fn obv_series(candles: &[Candle]) -> Vec<f64> {
    let mut series = Vec::with_capacity(candles.len());
    let mut running = 0.0;
    series.push(running);
    for pair in candles.windows(2) {
        if pair[1].close > pair[0].close {
            running += pair[1].volume;
        } else if pair[1].close < pair[0].close {
            running -= pair[1].volume;
        }
        series.push(running);
    }
    series
}

/// Volume-weighted average of typical prices. None when total volume is zero.
fn vwap(candles: &[Candle]) -> Option<f64> {
    let total: f64 = candles.iter().map(|c| c.volume).sum();
    if total <= 0.0 {
        return None;
    }
    let weighted: f64 = candles.iter().map(|c| c.typical_price() * c.volume).sum();
    Some(weighted / total)
}

fn volume_trend(candles: &[Candle]) -> VolumeTrend {
    let recent: Vec<f64> = candles[candles.len() - TREND_LOOKBACK.min(candles.len())..]
        .iter()
        .map(|c| c.volume)
        .collect();
    let avg = mean(&recent);
    if avg <= 0.0 {
        return VolumeTrend::Flat;
    }
    // Per-bar slope as a fraction of the average volume.
    let normalized = slope(&recent) / avg;
    if normalized > 0.02 {
        VolumeTrend::Rising
    } else if normalized < -0.02 {
        VolumeTrend::Falling
    } else {
        VolumeTrend::Flat
    }
}

fn build_profile(candles: &[Candle], bin_count: usize) -> Option<VolumeProfile> {
    if bin_count == 0 {
        return None;
    }
    let low = candles.iter().map(|c| c.low).fold(f64::MAX, f64::min);
    let high = candles.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let span = high - low;
    if span <= 0.0 {
        return None;
    }

    let width = span / bin_count as f64;
    let mut volumes = vec![0.0; bin_count];
    for candle in candles {
        let idx = (((candle.typical_price() - low) / width) as usize).min(bin_count - 1);
        volumes[idx] += candle.volume;
    }

    let total: f64 = volumes.iter().sum();
    if total <= 0.0 {
        return None;
    }

    let mut poc_idx = 0;
    for (i, &v) in volumes.iter().enumerate() {
        if v > volumes[poc_idx] {
            poc_idx = i;
        }
    }

    // Expand from the point of control toward the richer neighbour until the
    // value area holds the target fraction of volume.
    let (mut lo, mut hi) = (poc_idx, poc_idx);
    let mut covered = volumes[poc_idx];
    while covered < total * VALUE_AREA_FRACTION && (lo > 0 || hi + 1 < bin_count) {
        let below = if lo > 0 { volumes[lo - 1] } else { f64::MIN };
        let above = if hi + 1 < bin_count {
            volumes[hi + 1]
        } else {
            f64::MIN
        };
        if above >= below && hi + 1 < bin_count {
            hi += 1;
            covered += volumes[hi];
        } else {
            lo -= 1;
            covered += volumes[lo];
        }
    }

    let bins = volumes
        .iter()
        .enumerate()
        .map(|(i, &volume)| VolumeBin {
            price_low: low + i as f64 * width,
            price_high: low + (i + 1) as f64 * width,
            volume,
        })
        .collect();

    Some(VolumeProfile {
        bins,
        point_of_control: low + (poc_idx as f64 + 0.5) * width,
        value_area_low: low + lo as f64 * width,
        value_area_high: low + (hi + 1) as f64 * width,
    })
}

fn divergence(candles: &[Candle], obv_series: &[f64]) -> Option<DivergenceKind> {
    if candles.len() < DIVERGENCE_LOOKBACK {
        return None;
    }
    let closes: Vec<f64> = candles[candles.len() - DIVERGENCE_LOOKBACK..]
        .iter()
        .map(|c| c.close)
        .collect();
    let obv_tail = &obv_series[obv_series.len() - DIVERGENCE_LOOKBACK..];

    let price_level = mean(&closes);
    if price_level == 0.0 {
        return None;
    }
    let price_slope = slope(&closes) / price_level;
    let obv_slope = slope(obv_tail);

    // Price must be moving meaningfully before a divergence counts.
    if price_slope > 1e-4 && obv_slope < 0.0 {
        Some(DivergenceKind::Bearish)
    } else if price_slope < -1e-4 && obv_slope > 0.0 {
        Some(DivergenceKind::Bullish)
    } else {
        None
    }
}

fn climax(candles: &[Candle]) -> Option<ClimaxKind> {
    if candles.len() < CLIMAX_LOOKBACK + 1 {
        return None;
    }
    let last = &candles[candles.len() - 1];
    let trailing = &candles[candles.len() - 1 - CLIMAX_LOOKBACK..candles.len() - 1];
    let avg = mean(&trailing.iter().map(|c| c.volume).collect::<Vec<_>>());
    if avg <= 0.0 || last.volume < avg * CLIMAX_MULT {
        return None;
    }

    if last.is_bearish() {
        Some(ClimaxKind::SellingClimax)
    } else if last.is_bullish() {
        Some(ClimaxKind::BuyingClimax)
    } else {
        None
    }
}

/// Priority: climax (contrarian) beats divergence beats the VWAP/trend read.
fn interpret(
    price: f64,
    vwap: f64,
    trend: VolumeTrend,
    divergence: Option<DivergenceKind>,
    climax: Option<ClimaxKind>,
) -> (Direction, f64) {
    if let Some(kind) = climax {
        return match kind {
            ClimaxKind::SellingClimax => (Direction::Up, 0.65),
            ClimaxKind::BuyingClimax => (Direction::Down, 0.65),
        };
    }
    if let Some(kind) = divergence {
        return match kind {
            DivergenceKind::Bullish => (Direction::Up, 0.6),
            DivergenceKind::Bearish => (Direction::Down, 0.6),
        };
    }
    if trend == VolumeTrend::Rising && vwap > 0.0 {
        if price > vwap {
            return (Direction::Up, 0.55);
        }
        if price < vwap {
            return (Direction::Down, 0.55);
        }
    }
    (Direction::Neutral, 0.0)
}
