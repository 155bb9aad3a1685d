// The prediction pipeline: snapshot the buffer, run every analysis stage,
// consult the external inference service under a timeout, combine, validate,
// and size the resulting directive.
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use shared::models::{Candle, Direction, TimeFrame, TradingDirective};

use crate::config::EngineSettings;
use crate::data::{BufferManager, BUFFER_CAPACITY};
use crate::ensemble::{self, CombineOutcome, InferenceProvider, PromptContext};
use crate::error::EngineError;
use crate::indicators::IndicatorSet;
use crate::risk::{self, RiskLevels};
use crate::{patterns, regime, timeframes, volume};

pub struct PredictionService {
    buffers: Arc<BufferManager>,
    provider: Option<Arc<dyn InferenceProvider>>,
    settings: EngineSettings,
}

impl PredictionService {
    pub fn new(
        buffers: Arc<BufferManager>,
        provider: Option<Arc<dyn InferenceProvider>>,
        settings: EngineSettings,
    ) -> Self {
        PredictionService {
            buffers,
            provider,
            settings,
        }
    }

    pub fn buffers(&self) -> &Arc<BufferManager> {
        &self.buffers
    }

    /// Run one full prediction. Degraded inputs (short buffer, missing or
    /// malformed external opinion, guard failures) produce a rejected
    /// directive; only an unusable buffer or unknown symbol is an error.
    pub async fn predict(
        &self,
        symbol: &str,
        timeframe: TimeFrame,
        current_price: f64,
    ) -> Result<TradingDirective, EngineError> {
        let candles = self
            .buffers
            .snapshot_candles(symbol, BUFFER_CAPACITY)
            .await
            .filter(|c| !c.is_empty())
            .ok_or_else(|| EngineError::NoMarketData(symbol.to_string()))?;
        check_candles(symbol, &candles)?;

        let symbol_profile = self.settings.symbols.get(symbol)?.clone();

        // Pure analysis stages over the immutable snapshot.
        let indicators = IndicatorSet::compute(&candles, &symbol_profile);
        let regime = regime::classify(&candles, &indicators);
        let patterns = patterns::detect_all(&candles);
        let tf_analysis = timeframes::analyze(&candles, &TimeFrame::all());
        let vol_analysis = volume::analyze(&candles, self.settings.volume_profile_bins);

        let statistical = ensemble::statistical::evaluate(&indicators);
        info!(
            symbol = %symbol,
            timeframe = %timeframe,
            rsi = indicators.rsi,
            statistical_direction = %statistical.direction,
            "analysis complete"
        );

        let external = self
            .external_opinion(&PromptContext {
                symbol,
                timeframe,
                current_price,
                indicators: &indicators,
                regime: &regime,
                patterns: &patterns,
                timeframes: &tf_analysis,
                volume: &vol_analysis,
            })
            .await;
        let external_signal = external.as_ref().map(|o| o.signal());

        let outcome = ensemble::combine(
            &statistical,
            external_signal.as_ref(),
            &indicators,
            &self.settings.risk_profile,
        );

        let directive = match outcome {
            CombineOutcome::Valid(signal) => {
                let levels = risk::compute_levels(
                    current_price,
                    signal.direction,
                    signal.confidence,
                    regime.confluence_score,
                    &symbol_profile,
                    timeframe,
                    regime.volatility_state,
                    &self.settings.risk_profile,
                );
                self.directive(symbol, timeframe, current_price, &candles, signal, levels, false)
            }
            CombineOutcome::Rejected { signal, reason } => {
                info!(symbol = %symbol, reason = %reason, "directive rejected, using conservative defaults");
                let levels = risk::conservative_levels(
                    current_price,
                    signal.direction,
                    &symbol_profile,
                    &self.settings.risk_profile,
                );
                self.directive(symbol, timeframe, current_price, &candles, signal, levels, true)
            }
        };

        info!(
            symbol = %symbol,
            direction = %directive.direction,
            confidence = directive.confidence,
            rejected = directive.rejected,
            "directive issued"
        );
        Ok(directive)
    }

    async fn external_opinion(
        &self,
        ctx: &PromptContext<'_>,
    ) -> Option<ensemble::ExternalOpinion> {
        let provider = self.provider.as_ref()?;
        let prompt = ensemble::build_prompt(ctx);

        match tokio::time::timeout(
            self.settings.inference_timeout(),
            provider.request_opinion(&prompt),
        )
        .await
        {
            Ok(Ok(text)) => {
                let parsed = ensemble::extract_opinion(&text);
                if parsed.is_none() {
                    warn!(symbol = %ctx.symbol, "external response carried no parsable opinion");
                }
                parsed
            }
            Ok(Err(err)) => {
                warn!(symbol = %ctx.symbol, error = %err, "inference request failed");
                None
            }
            Err(_) => {
                warn!(symbol = %ctx.symbol, "inference request timed out");
                None
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn directive(
        &self,
        symbol: &str,
        timeframe: TimeFrame,
        entry_price: f64,
        candles: &[Candle],
        signal: shared::models::PredictionSignal,
        levels: RiskLevels,
        rejected: bool,
    ) -> TradingDirective {
        TradingDirective {
            id: directive_id(symbol, timeframe, candles, signal.direction, signal.confidence),
            symbol: symbol.to_string(),
            timeframe,
            direction: signal.direction,
            confidence: signal.confidence,
            entry_price,
            stop_loss: levels.stop_loss,
            take_profit: levels.take_profit,
            risk_reward_ratio: levels.risk_reward_ratio,
            position_size_fraction: levels.position_size_fraction,
            stop_distance_pips: levels.stop_distance_pips,
            target_distance_pips: levels.target_distance_pips,
            rationale: signal.rationale,
            rejected,
        }
    }
}

/// Identifiers are a pure function of the decision inputs, so identical
/// snapshots yield identical directives.
fn directive_id(
    symbol: &str,
    timeframe: TimeFrame,
    candles: &[Candle],
    direction: Direction,
    confidence: f64,
) -> String {
    let last_ts = candles
        .last()
        .map(|c| c.timestamp.timestamp())
        .unwrap_or(0);
    let name = format!(
        "{}|{}|{}|{}|{:.6}",
        symbol, timeframe, last_ts, direction, confidence
    );
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()).to_string()
}

/// Reject obviously corrupt candles before analysis runs on them.
fn check_candles(symbol: &str, candles: &[Candle]) -> Result<(), EngineError> {
    for candle in candles {
        let finite = candle.open.is_finite()
            && candle.high.is_finite()
            && candle.low.is_finite()
            && candle.close.is_finite();
        if !finite || candle.high < candle.low {
            return Err(EngineError::MalformedBuffer(format!(
                "{}: invalid candle at {}",
                symbol, candle.timestamp
            )));
        }
    }
    Ok(())
}
