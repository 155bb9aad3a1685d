// Engine configuration: runtime settings, risk profiles, and per-symbol tuning.
pub mod risk_profile;
pub mod settings;
pub mod symbol_profile;

pub use risk_profile::RiskProfile;
pub use settings::EngineSettings;
pub use symbol_profile::{SymbolClass, SymbolProfile, SymbolProfiles};
