use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One price observation pushed by the feed collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tick {
    pub symbol: String,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
    /// Smallest quoted increment for this symbol's quoting convention.
    pub pip_size: f64,
}

/// OHLC bar for one interval. Immutable once closed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Defaulted to 0.0 when the feed omits it, so consumers never probe an Option.
    #[serde(default)]
    pub volume: f64,
}

impl Candle {
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn upper_shadow(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    pub fn lower_shadow(&self) -> f64 {
        self.open.min(self.close) - self.low
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TimeFrame {
    Minute1,
    Minute5,
    Minute15,
    Hour1,
    Hour4,
    Day1,
}

impl TimeFrame {
    pub fn minutes(&self) -> i64 {
        match self {
            TimeFrame::Minute1 => 1,
            TimeFrame::Minute5 => 5,
            TimeFrame::Minute15 => 15,
            TimeFrame::Hour1 => 60,
            TimeFrame::Hour4 => 240,
            TimeFrame::Day1 => 1440,
        }
    }

    pub fn all() -> [TimeFrame; 6] {
        [
            TimeFrame::Minute1,
            TimeFrame::Minute5,
            TimeFrame::Minute15,
            TimeFrame::Hour1,
            TimeFrame::Hour4,
            TimeFrame::Day1,
        ]
    }
}

impl std::fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TimeFrame::Minute1 => "1m",
            TimeFrame::Minute5 => "5m",
            TimeFrame::Minute15 => "15m",
            TimeFrame::Hour1 => "1h",
            TimeFrame::Hour4 => "4h",
            TimeFrame::Day1 => "1d",
        };
        write!(f, "{}", label)
    }
}

/// Directional opinion. Serialized in the UP/DOWN/NEUTRAL convention the
/// external inference service uses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
    Neutral,
}

impl Direction {
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Neutral => Direction::Neutral,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
            Direction::Neutral => "NEUTRAL",
        };
        write!(f, "{}", label)
    }
}

/// One directional opinion with confidence. Produced by the statistical path
/// and by the external inference path; never mutated, only combined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionSignal {
    pub direction: Direction,
    /// Always in [0, 1].
    pub confidence: f64,
    pub rationale: String,
}

impl PredictionSignal {
    pub fn neutral(rationale: impl Into<String>) -> Self {
        PredictionSignal {
            direction: Direction::Neutral,
            confidence: 0.5,
            rationale: rationale.into(),
        }
    }
}

/// Terminal artifact returned to the caller.
///
/// For direction UP: `stop_loss < entry_price < take_profit`; for DOWN the
/// inequality reverses. `confidence` stays inside the configured band and
/// `risk_reward_ratio` never falls below the configured floor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingDirective {
    pub id: String,
    pub symbol: String,
    pub timeframe: TimeFrame,
    pub direction: Direction,
    pub confidence: f64,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub risk_reward_ratio: f64,
    /// Fraction of capital, e.g. 0.01 = 1%.
    pub position_size_fraction: f64,
    pub stop_distance_pips: f64,
    pub target_distance_pips: f64,
    pub rationale: String,
    /// True when the validation gate substituted the conservative default.
    pub rejected: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candle_geometry() {
        let c = Candle {
            symbol: "TEST".to_string(),
            timestamp: Utc::now(),
            open: 10.0,
            high: 15.0,
            low: 8.0,
            close: 12.0,
            volume: 100.0,
        };
        assert_eq!(c.body(), 2.0);
        assert_eq!(c.range(), 7.0);
        assert_eq!(c.upper_shadow(), 3.0);
        assert_eq!(c.lower_shadow(), 2.0);
        assert!(c.is_bullish());
        assert!(!c.is_bearish());
    }

    #[test]
    fn direction_round_trips_uppercase() {
        let json = serde_json::to_string(&Direction::Up).unwrap();
        assert_eq!(json, "\"UP\"");
        let parsed: Direction = serde_json::from_str("\"DOWN\"").unwrap();
        assert_eq!(parsed, Direction::Down);
    }

    #[test]
    fn candle_volume_defaults_to_zero() {
        let json = r#"{"symbol":"V10","timestamp":"2024-01-01T00:00:00Z","open":1.0,"high":2.0,"low":0.5,"close":1.5}"#;
        let c: Candle = serde_json::from_str(json).unwrap();
        assert_eq!(c.volume, 0.0);
    }

    #[test]
    fn timeframe_minutes() {
        assert_eq!(TimeFrame::Minute1.minutes(), 1);
        assert_eq!(TimeFrame::Hour4.minutes(), 240);
        assert_eq!(TimeFrame::Day1.minutes(), 1440);
    }
}
