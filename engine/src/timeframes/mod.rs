// Multi-timeframe analysis: resamples the candle series into coarser
// synthetic timeframes and scores trend alignment across them.
use chrono::DateTime;
use serde::Serialize;
use shared::models::{Candle, Direction, TimeFrame};
use shared::utils::{clamp, percent_change};

use crate::indicators::sma::sma;
use crate::regime::TrendState;

/// A timeframe with fewer resampled bars than this returns a neutral view.
const MIN_BARS: usize = 10;
const SHORT_SMA: usize = 5;
const LONG_SMA: usize = 10;
/// Net move (%) over the trend lookback that separates strong from weak.
const STRONG_MOVE_PCT: f64 = 1.0;

/// Resampled trend read at one synthetic timeframe.
#[derive(Debug, Clone, Serialize)]
pub struct TimeframeView {
    pub timeframe: TimeFrame,
    pub trend: TrendState,
    /// Trend strength in [0, 1].
    pub strength: f64,
    /// Net % change over the most recent bars.
    pub momentum: f64,
    pub support: f64,
    pub resistance: f64,
}

impl TimeframeView {
    fn neutral(timeframe: TimeFrame, price: f64) -> Self {
        TimeframeView {
            timeframe,
            trend: TrendState::Sideways,
            strength: 0.0,
            momentum: 0.0,
            support: price,
            resistance: price,
        }
    }
}

/// Trend alignment across all configured timeframes.
#[derive(Debug, Clone, Serialize)]
pub struct MultiTimeframeAnalysis {
    pub views: Vec<TimeframeView>,
    pub direction: Direction,
    /// Weighted agreement in [0, 1].
    pub confluence_score: f64,
}

/// Weight of each timeframe in the aggregate. Biased toward intermediate
/// timeframes; sums to 1 across `TimeFrame::all()`.
pub fn weight(timeframe: TimeFrame) -> f64 {
    match timeframe {
        TimeFrame::Minute1 => 0.05,
        TimeFrame::Minute5 => 0.10,
        TimeFrame::Minute15 => 0.20,
        TimeFrame::Hour1 => 0.35,
        TimeFrame::Hour4 => 0.20,
        TimeFrame::Day1 => 0.10,
    }
}

/// Group candles into fixed-duration buckets by timestamp integer division.
/// Open = first, close = last, high = max, low = min, volume = sum.
pub fn resample(candles: &[Candle], timeframe: TimeFrame) -> Vec<Candle> {
    let bucket_secs = timeframe.minutes() * 60;
    let mut out: Vec<Candle> = Vec::new();
    let mut current_bucket: Option<i64> = None;

    for candle in candles {
        let bucket = candle.timestamp.timestamp().div_euclid(bucket_secs);
        match (current_bucket, out.last_mut()) {
            (Some(b), Some(agg)) if b == bucket => {
                agg.high = agg.high.max(candle.high);
                agg.low = agg.low.min(candle.low);
                agg.close = candle.close;
                agg.volume += candle.volume;
            }
            _ => {
                let start = DateTime::from_timestamp(bucket * bucket_secs, 0)
                    .unwrap_or(candle.timestamp);
                out.push(Candle {
                    symbol: candle.symbol.clone(),
                    timestamp: start,
                    open: candle.open,
                    high: candle.high,
                    low: candle.low,
                    close: candle.close,
                    volume: candle.volume,
                });
                current_bucket = Some(bucket);
            }
        }
    }
    out
}

/// Analyze every configured timeframe and aggregate the confluence.
pub fn analyze(candles: &[Candle], timeframes: &[TimeFrame]) -> MultiTimeframeAnalysis {
    let price = candles.last().map(|c| c.close).unwrap_or(0.0);
    let views: Vec<TimeframeView> = timeframes
        .iter()
        .map(|&tf| view_for(candles, tf, price))
        .collect();

    let mut signed = 0.0;
    let mut total_weight = 0.0;
    for view in &views {
        let w = weight(view.timeframe);
        total_weight += w;
        match view.trend.direction() {
            Direction::Up => signed += w * view.strength,
            Direction::Down => signed -= w * view.strength,
            Direction::Neutral => {}
        }
    }
    let normalized = if total_weight > 0.0 {
        signed / total_weight
    } else {
        0.0
    };

    let direction = if normalized > 0.1 {
        Direction::Up
    } else if normalized < -0.1 {
        Direction::Down
    } else {
        Direction::Neutral
    };

    MultiTimeframeAnalysis {
        views,
        direction,
        confluence_score: clamp(normalized.abs(), 0.0, 1.0),
    }
}

fn view_for(candles: &[Candle], timeframe: TimeFrame, fallback_price: f64) -> TimeframeView {
    let bars = resample(candles, timeframe);
    if bars.len() < MIN_BARS {
        return TimeframeView::neutral(timeframe, fallback_price);
    }

    let closes: Vec<f64> = bars.iter().map(|c| c.close).collect();
    let close = closes[closes.len() - 1];
    let short = sma(&closes, SHORT_SMA).unwrap_or(close);
    let long = sma(&closes, LONG_SMA).unwrap_or(close);
    let net_pct = percent_change(closes[closes.len() - LONG_SMA], close);
    let momentum = percent_change(closes[closes.len() - SHORT_SMA], close);

    let trend = if close > short && short > long && net_pct > 0.0 {
        if net_pct >= STRONG_MOVE_PCT {
            TrendState::StrongUp
        } else {
            TrendState::WeakUp
        }
    } else if close < short && short < long && net_pct < 0.0 {
        if net_pct <= -STRONG_MOVE_PCT {
            TrendState::StrongDown
        } else {
            TrendState::WeakDown
        }
    } else {
        TrendState::Sideways
    };

    let strength = match trend {
        TrendState::Sideways => 0.1,
        _ => clamp(net_pct.abs() / (STRONG_MOVE_PCT * 2.0), 0.2, 1.0),
    };

    let lookback = bars.len().min(20);
    let recent = &bars[bars.len() - lookback..];
    let support = recent.iter().map(|c| c.low).fold(f64::MAX, f64::min);
    let resistance = recent.iter().map(|c| c.high).fold(f64::MIN, f64::max);

    TimeframeView {
        timeframe,
        trend,
        strength,
        momentum,
        support,
        resistance,
    }
}
