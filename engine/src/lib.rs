// Prediction engine: buffered market data in, trading directives out.
//
// Every analysis stage is a pure function over a buffer snapshot; the only
// suspension point is the bounded external inference call. Callers always
// get a structurally valid directive; "no good trade" is a rejected
// directive with minimal sizing, never an error.
pub mod config;
pub mod data;
pub mod ensemble;
pub mod error;
pub mod indicators;
pub mod patterns;
pub mod regime;
pub mod risk;
pub mod services;
pub mod timeframes;
pub mod volume;

pub use error::EngineError;
pub use services::PredictionService;
