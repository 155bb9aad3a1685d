// Candlestick and chart pattern recognition over the candle snapshot.
pub mod candlestick;
pub mod chart;

use serde::Serialize;
use shared::models::{Candle, Direction};
use shared::utils::mean;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PatternCategory {
    Reversal,
    Continuation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PatternKind {
    Doji,
    Hammer,
    ShootingStar,
    BullishEngulfing,
    BearishEngulfing,
    ThreeWhiteSoldiers,
    ThreeBlackCrows,
    DoubleTop,
    DoubleBottom,
    HeadAndShoulders,
    InverseHeadAndShoulders,
    AscendingTriangle,
    DescendingTriangle,
    SymmetricalTriangle,
}

impl PatternKind {
    pub fn name(&self) -> &'static str {
        match self {
            PatternKind::Doji => "DOJI",
            PatternKind::Hammer => "HAMMER",
            PatternKind::ShootingStar => "SHOOTING_STAR",
            PatternKind::BullishEngulfing => "BULLISH_ENGULFING",
            PatternKind::BearishEngulfing => "BEARISH_ENGULFING",
            PatternKind::ThreeWhiteSoldiers => "THREE_WHITE_SOLDIERS",
            PatternKind::ThreeBlackCrows => "THREE_BLACK_CROWS",
            PatternKind::DoubleTop => "DOUBLE_TOP",
            PatternKind::DoubleBottom => "DOUBLE_BOTTOM",
            PatternKind::HeadAndShoulders => "HEAD_AND_SHOULDERS",
            PatternKind::InverseHeadAndShoulders => "INVERSE_HEAD_AND_SHOULDERS",
            PatternKind::AscendingTriangle => "ASCENDING_TRIANGLE",
            PatternKind::DescendingTriangle => "DESCENDING_TRIANGLE",
            PatternKind::SymmetricalTriangle => "SYMMETRICAL_TRIANGLE",
        }
    }

    pub fn category(&self) -> PatternCategory {
        match self {
            PatternKind::AscendingTriangle
            | PatternKind::DescendingTriangle
            | PatternKind::SymmetricalTriangle
            | PatternKind::ThreeWhiteSoldiers
            | PatternKind::ThreeBlackCrows => PatternCategory::Continuation,
            _ => PatternCategory::Reversal,
        }
    }

    /// Fixed, empirically assigned reliability per pattern type.
    pub fn reliability(&self) -> f64 {
        match self {
            PatternKind::Doji | PatternKind::SymmetricalTriangle => 0.70,
            PatternKind::Hammer
            | PatternKind::ShootingStar
            | PatternKind::AscendingTriangle
            | PatternKind::DescendingTriangle => 0.75,
            PatternKind::BullishEngulfing | PatternKind::BearishEngulfing => 0.80,
            PatternKind::ThreeWhiteSoldiers
            | PatternKind::ThreeBlackCrows
            | PatternKind::DoubleTop
            | PatternKind::DoubleBottom => 0.85,
            PatternKind::HeadAndShoulders | PatternKind::InverseHeadAndShoulders => 0.90,
        }
    }
}

/// A detected pattern with its directional signal and optional projected
/// levels.
#[derive(Debug, Clone, Serialize)]
pub struct PatternMatch {
    pub kind: PatternKind,
    pub category: PatternCategory,
    pub signal: Direction,
    pub reliability: f64,
    pub target: Option<f64>,
    pub stop: Option<f64>,
}

impl PatternMatch {
    pub fn new(kind: PatternKind, signal: Direction) -> Self {
        PatternMatch {
            kind,
            category: kind.category(),
            signal,
            reliability: kind.reliability(),
            target: None,
            stop: None,
        }
    }

    pub fn with_levels(mut self, target: f64, stop: f64) -> Self {
        self.target = Some(target);
        self.stop = Some(stop);
        self
    }
}

/// Context recorded alongside a scan. Confirmations never change a pattern's
/// reliability, only downstream confidence weighting.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PatternConfirmation {
    pub volume_spike: bool,
    pub follow_through: bool,
}

/// Result of one pattern scan over a snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct PatternScan {
    pub matches: Vec<PatternMatch>,
    pub confirmation: PatternConfirmation,
}

impl PatternScan {
    /// Highest-reliability match; first found wins ties.
    pub fn primary(&self) -> Option<&PatternMatch> {
        let mut best: Option<&PatternMatch> = None;
        for m in &self.matches {
            if best.map_or(true, |b| m.reliability > b.reliability) {
                best = Some(m);
            }
        }
        best
    }
}

/// Run candlestick and chart detection over the snapshot.
pub fn detect_all(candles: &[Candle]) -> PatternScan {
    let mut matches = candlestick::detect(candles);
    matches.extend(chart::detect(candles));

    let confirmation = confirm(candles, &matches);
    PatternScan {
        matches,
        confirmation,
    }
}

fn confirm(candles: &[Candle], matches: &[PatternMatch]) -> PatternConfirmation {
    if candles.len() < 2 || matches.is_empty() {
        return PatternConfirmation::default();
    }
    let last = &candles[candles.len() - 1];
    let prev = &candles[candles.len() - 2];

    let trailing = &candles[..candles.len() - 1];
    let lookback = trailing.len().min(20);
    let avg_volume = mean(
        &trailing[trailing.len() - lookback..]
            .iter()
            .map(|c| c.volume)
            .collect::<Vec<_>>(),
    );
    let volume_spike = avg_volume > 0.0 && last.volume > avg_volume * 1.5;

    // Price continuing in the primary signal's direction.
    let mut primary: Option<&PatternMatch> = None;
    for m in matches {
        if primary.map_or(true, |b| m.reliability > b.reliability) {
            primary = Some(m);
        }
    }
    let signal = primary.map(|m| m.signal).unwrap_or(Direction::Neutral);
    let follow_through = match signal {
        Direction::Up => last.close > prev.close,
        Direction::Down => last.close < prev.close,
        Direction::Neutral => false,
    };

    PatternConfirmation {
        volume_spike,
        follow_through,
    }
}
