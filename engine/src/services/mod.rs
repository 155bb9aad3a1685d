// Service layer tying the analysis stages together behind `predict`.
pub mod prediction_service;

pub use prediction_service::PredictionService;
