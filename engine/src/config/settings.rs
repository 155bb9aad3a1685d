// Engine settings, loadable from a config file or environment by the host.
use serde::Deserialize;
use std::time::Duration;

use super::risk_profile::RiskProfile;
use super::symbol_profile::SymbolProfiles;

#[derive(Debug, Deserialize, Clone)]
pub struct EngineSettings {
    /// Bound on the external inference call. Timeout degrades to the
    /// statistical-only path, it is not an error.
    pub inference_timeout_secs: u64,
    /// Number of price bins in the volume profile.
    pub volume_profile_bins: usize,
    pub risk_profile: RiskProfile,
    #[serde(default)]
    pub symbols: SymbolProfiles,
}

impl EngineSettings {
    pub fn inference_timeout(&self) -> Duration {
        Duration::from_secs(self.inference_timeout_secs)
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            inference_timeout_secs: 30,
            volume_profile_bins: 20,
            risk_profile: RiskProfile::strict(),
            symbols: SymbolProfiles::default(),
        }
    }
}
