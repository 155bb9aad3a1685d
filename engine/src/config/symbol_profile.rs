use serde::Deserialize;
use std::collections::HashMap;

use crate::error::EngineError;

/// Quoting-convention class of an instrument. Drives the pip conversion
/// factor and the spike-aware stop handling.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum SymbolClass {
    /// Continuous volatility indices (smooth, mean daily range bound).
    VolatilityIndex,
    /// Spike-style instruments that grind one way and spike the other.
    SpikeIndex,
}

impl SymbolClass {
    /// Smallest quoted increment for the class.
    pub fn pip_size(&self) -> f64 {
        match self {
            SymbolClass::VolatilityIndex => 0.001,
            SymbolClass::SpikeIndex => 0.01,
        }
    }
}

/// Per-symbol volatility characteristics and indicator tuning.
#[derive(Debug, Deserialize, Clone)]
pub struct SymbolProfile {
    pub class: SymbolClass,
    /// Wilder RSI period, tuned per instrument.
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub stochastic_lookback: usize,
    /// Typical full-day range as a fraction of price.
    pub daily_range_pct: f64,
    /// Typical one-hour range as a fraction of price.
    pub hourly_range_pct: f64,
    /// Base stop-loss distance on the 1h timeframe, fraction of price.
    pub base_stop_pct: f64,
    /// Cap on realistic take-profit distance on 1h, fraction of price.
    pub max_gain_pct: f64,
    /// True for instruments with periodic one-sided spikes.
    pub spike_prone: bool,
}

impl SymbolProfile {
    pub fn pip_size(&self) -> f64 {
        self.class.pip_size()
    }

    fn volatility_index(rsi_period: usize, hourly_range_pct: f64) -> Self {
        SymbolProfile {
            class: SymbolClass::VolatilityIndex,
            rsi_period,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            stochastic_lookback: 14,
            daily_range_pct: hourly_range_pct * 4.5,
            hourly_range_pct,
            base_stop_pct: hourly_range_pct * 0.6,
            max_gain_pct: hourly_range_pct * 1.5,
            spike_prone: false,
        }
    }

    fn spike_index(rsi_period: usize, hourly_range_pct: f64) -> Self {
        SymbolProfile {
            class: SymbolClass::SpikeIndex,
            spike_prone: true,
            ..SymbolProfile::volatility_index(rsi_period, hourly_range_pct)
        }
    }
}

/// Registry of symbol profiles with an optional default for symbols not
/// explicitly listed. `get` fails only when both lookups miss.
#[derive(Debug, Deserialize, Clone)]
pub struct SymbolProfiles {
    profiles: HashMap<String, SymbolProfile>,
    default_profile: Option<SymbolProfile>,
}

impl SymbolProfiles {
    pub fn new(
        profiles: HashMap<String, SymbolProfile>,
        default_profile: Option<SymbolProfile>,
    ) -> Self {
        SymbolProfiles {
            profiles,
            default_profile,
        }
    }

    pub fn get(&self, symbol: &str) -> Result<&SymbolProfile, EngineError> {
        self.profiles
            .get(symbol)
            .or(self.default_profile.as_ref())
            .ok_or_else(|| EngineError::UnknownSymbol(symbol.to_string()))
    }
}

impl Default for SymbolProfiles {
    fn default() -> Self {
        let mut profiles = HashMap::new();
        // Low-volatility index: short RSI reacts to its narrow range.
        profiles.insert(
            "VOL10".to_string(),
            SymbolProfile::volatility_index(9, 0.004),
        );
        profiles.insert(
            "VOL75".to_string(),
            SymbolProfile::volatility_index(14, 0.012),
        );
        profiles.insert(
            "VOL100".to_string(),
            SymbolProfile::volatility_index(14, 0.016),
        );
        // Slow-spike instruments: longer RSI rides out the grind between spikes.
        profiles.insert("BOOM500".to_string(), SymbolProfile::spike_index(21, 0.008));
        profiles.insert(
            "CRASH500".to_string(),
            SymbolProfile::spike_index(21, 0.008),
        );

        SymbolProfiles {
            profiles,
            default_profile: Some(SymbolProfile::volatility_index(14, 0.010)),
        }
    }
}
