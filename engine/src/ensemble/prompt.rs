// Builds the text prompt sent to the external inference service. Purely a
// formatting concern; numbers come pre-computed from the analysis stages.
use std::fmt::Write;

use shared::models::TimeFrame;

use crate::indicators::IndicatorSet;
use crate::patterns::PatternScan;
use crate::regime::RegimeState;
use crate::timeframes::MultiTimeframeAnalysis;
use crate::volume::VolumeAnalysis;

pub struct PromptContext<'a> {
    pub symbol: &'a str,
    pub timeframe: TimeFrame,
    pub current_price: f64,
    pub indicators: &'a IndicatorSet,
    pub regime: &'a RegimeState,
    pub patterns: &'a PatternScan,
    pub timeframes: &'a MultiTimeframeAnalysis,
    pub volume: &'a VolumeAnalysis,
}

/// Render the full analysis summary and response instructions.
pub fn build_prompt(ctx: &PromptContext<'_>) -> String {
    let mut out = String::with_capacity(1024);
    // Writing into a String cannot fail; discard the fmt::Result.
    let _ = write!(
        out,
        "Analyze {} on the {} timeframe. Current price: {:.5}\n\n",
        ctx.symbol, ctx.timeframe, ctx.current_price
    );

    let ind = ctx.indicators;
    let _ = write!(
        out,
        "INDICATORS\n\
         RSI: {:.2}\n\
         MACD line/signal/histogram: {:.5} / {:.5} / {:.5}\n\
         ATR: {:.5} ({:.2}% of price)\n\
         Bollinger position: {:.2} (width {:.5}, squeeze: {})\n\
         Stochastic %K/%D: {:.2} / {:.2}\n\
         Williams %R: {:.2}\n\n",
        ind.rsi,
        ind.macd_line,
        ind.macd_signal,
        ind.macd_histogram,
        ind.atr,
        ind.atr_normalized,
        ind.bollinger_position,
        ind.bollinger_width,
        ind.bollinger_squeeze,
        ind.stochastic_k,
        ind.stochastic_d,
        ind.williams_r,
    );

    let _ = write!(
        out,
        "REGIME\n\
         Volatility: {:?}, Trend: {:?}, Momentum: {:?}, confluence {:.2}\n\n",
        ctx.regime.volatility_state,
        ctx.regime.trend_state,
        ctx.regime.momentum_state,
        ctx.regime.confluence_score,
    );

    out.push_str("PATTERNS\n");
    if ctx.patterns.matches.is_empty() {
        out.push_str("none detected\n");
    } else {
        for m in &ctx.patterns.matches {
            let _ = write!(
                out,
                "{} ({}, reliability {:.2})\n",
                m.kind.name(),
                m.signal,
                m.reliability
            );
        }
        let c = &ctx.patterns.confirmation;
        let _ = write!(
            out,
            "volume spike: {}, follow-through: {}\n",
            c.volume_spike, c.follow_through
        );
    }
    out.push('\n');

    out.push_str("TIMEFRAMES\n");
    for view in &ctx.timeframes.views {
        let _ = write!(
            out,
            "{}: {:?} (strength {:.2}, momentum {:.2}%)\n",
            view.timeframe, view.trend, view.strength, view.momentum
        );
    }
    let _ = write!(
        out,
        "aggregate: {} (confluence {:.2})\n\n",
        ctx.timeframes.direction, ctx.timeframes.confluence_score
    );

    let vol = ctx.volume;
    let _ = write!(
        out,
        "VOLUME\n\
         OBV: {:.1}, VWAP: {:.5}, trend: {:?}\n\
         divergence: {:?}, climax: {:?}\n\n",
        vol.obv, vol.vwap, vol.trend, vol.divergence, vol.climax,
    );

    out.push_str(
        "Respond with a single JSON object:\n\
         {\"direction\": \"UP|DOWN|NEUTRAL\", \"confidence\": 0.0-1.0, \
         \"reasoning\": \"...\", \"entry_price\": null, \"stop_loss\": null, \
         \"take_profit\": null}\n",
    );

    out
}
