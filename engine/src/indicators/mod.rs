// Technical indicators module. Every computation here is a pure function of
// a candle snapshot; insufficient data yields documented neutral defaults
// instead of errors.
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stochastic;

use serde::Serialize;
use shared::models::Candle;

use crate::config::SymbolProfile;

/// ATR period shared by the engine's volatility reads.
pub const ATR_PERIOD: usize = 14;
/// Bollinger window and band width.
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_STD_MULT: f64 = 2.0;

/// Derived technical metrics at "now". Recomputed fresh from the buffer on
/// every request; never mutated in place.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorSet {
    pub price: f64,
    pub rsi: f64,
    pub macd_line: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,
    pub atr: f64,
    /// ATR as a percentage of price.
    pub atr_normalized: f64,
    pub bollinger_position: f64,
    pub bollinger_width: f64,
    pub bollinger_squeeze: bool,
    pub stochastic_k: f64,
    pub stochastic_d: f64,
    pub williams_r: f64,
}

impl IndicatorSet {
    /// Compute the full set from a candle snapshot, using the symbol's tuned
    /// periods.
    pub fn compute(candles: &[Candle], profile: &SymbolProfile) -> IndicatorSet {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let price = closes.last().copied().unwrap_or(0.0);

        let (macd_line, macd_signal, macd_histogram) = macd::macd(
            &closes,
            profile.macd_fast,
            profile.macd_slow,
            profile.macd_signal,
        );
        let bands = bollinger::bollinger(&closes, BOLLINGER_PERIOD, BOLLINGER_STD_MULT);
        let (stochastic_k, stochastic_d) =
            stochastic::stochastic(candles, profile.stochastic_lookback);

        IndicatorSet {
            price,
            rsi: rsi::rsi(&closes, profile.rsi_period),
            macd_line,
            macd_signal,
            macd_histogram,
            atr: atr::atr(candles, ATR_PERIOD),
            atr_normalized: atr::normalized_atr(candles, ATR_PERIOD),
            bollinger_position: bands.position,
            bollinger_width: bands.width,
            bollinger_squeeze: bands.squeeze,
            stochastic_k,
            stochastic_d,
            williams_r: stochastic::williams_r(candles, profile.stochastic_lookback),
        }
    }
}
