use thiserror::Error;

/// Failures that surface to the caller of `predict`.
///
/// Everything else (insufficient per-component data, malformed or missing
/// inference responses, validation rejections, timeouts) degrades to a
/// conservative `TradingDirective` and never raises.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("no market data buffered for symbol '{0}'")]
    NoMarketData(String),

    #[error("no volatility profile for symbol '{0}' and no default configured")]
    UnknownSymbol(String),

    #[error("malformed buffer data: {0}")]
    MalformedBuffer(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
