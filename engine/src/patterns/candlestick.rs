// Single- and multi-candle candlestick rules. All thresholds are
// deterministic geometric ratios on body/shadow sizes.
use shared::models::{Candle, Direction};

use super::{PatternKind, PatternMatch};

/// Body at most this fraction of the full range qualifies as a doji.
const DOJI_BODY_MAX: f64 = 0.10;
/// Hammer / shooting star shadow must exceed this multiple of the body.
const SHADOW_BODY_MULT: f64 = 2.0;
/// Soldiers/crows bodies must cover at least this fraction of their range.
const SOLDIER_BODY_MIN: f64 = 0.60;

/// Scan the most recent 1-3 candles for candlestick patterns.
pub fn detect(candles: &[Candle]) -> Vec<PatternMatch> {
    let mut matches = Vec::new();
    let n = candles.len();
    if n == 0 {
        return matches;
    }

    let last = &candles[n - 1];
    if is_doji(last) {
        matches.push(PatternMatch::new(PatternKind::Doji, Direction::Neutral));
    }
    if is_hammer(last) {
        matches.push(PatternMatch::new(PatternKind::Hammer, Direction::Up));
    }
    if is_shooting_star(last) {
        matches.push(PatternMatch::new(PatternKind::ShootingStar, Direction::Down));
    }

    if n >= 2 {
        let prev = &candles[n - 2];
        if is_bullish_engulfing(prev, last) {
            matches.push(PatternMatch::new(
                PatternKind::BullishEngulfing,
                Direction::Up,
            ));
        }
        if is_bearish_engulfing(prev, last) {
            matches.push(PatternMatch::new(
                PatternKind::BearishEngulfing,
                Direction::Down,
            ));
        }
    }

    if n >= 3 {
        let trio = &candles[n - 3..];
        if is_three_soldiers(trio) {
            matches.push(PatternMatch::new(
                PatternKind::ThreeWhiteSoldiers,
                Direction::Up,
            ));
        }
        if is_three_crows(trio) {
            matches.push(PatternMatch::new(
                PatternKind::ThreeBlackCrows,
                Direction::Down,
            ));
        }
    }

    matches
}

fn is_doji(c: &Candle) -> bool {
    let range = c.range();
    range > 0.0 && c.body() <= range * DOJI_BODY_MAX
}

fn is_hammer(c: &Candle) -> bool {
    let body = c.body();
    body > 0.0 && c.lower_shadow() > body * SHADOW_BODY_MULT && c.upper_shadow() < body
}

fn is_shooting_star(c: &Candle) -> bool {
    let body = c.body();
    body > 0.0 && c.upper_shadow() > body * SHADOW_BODY_MULT && c.lower_shadow() < body
}

/// Current body fully contains and reverses the prior candle's body.
fn is_bullish_engulfing(prev: &Candle, current: &Candle) -> bool {
    prev.is_bearish()
        && current.is_bullish()
        && current.open <= prev.close
        && current.close >= prev.open
        && current.body() > prev.body()
}

fn is_bearish_engulfing(prev: &Candle, current: &Candle) -> bool {
    prev.is_bullish()
        && current.is_bearish()
        && current.open >= prev.close
        && current.close <= prev.open
        && current.body() > prev.body()
}

fn is_three_soldiers(trio: &[Candle]) -> bool {
    trio.iter()
        .all(|c| c.is_bullish() && c.range() > 0.0 && c.body() >= c.range() * SOLDIER_BODY_MIN)
        && trio[1].close > trio[0].close
        && trio[2].close > trio[1].close
}

fn is_three_crows(trio: &[Candle]) -> bool {
    trio.iter()
        .all(|c| c.is_bearish() && c.range() > 0.0 && c.body() >= c.range() * SOLDIER_BODY_MIN)
        && trio[1].close < trio[0].close
        && trio[2].close < trio[1].close
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn candle(open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            symbol: "TEST".to_string(),
            timestamp: Utc::now(),
            open,
            high,
            low,
            close,
            volume: 100.0,
        }
    }

    fn kinds(candles: &[Candle]) -> Vec<PatternKind> {
        detect(candles).iter().map(|m| m.kind).collect()
    }

    #[test]
    fn detects_doji() {
        // Body 0.1 inside a range of 2.0.
        let c = candle(100.0, 101.0, 99.0, 100.1);
        assert!(kinds(&[c]).contains(&PatternKind::Doji));
    }

    #[test]
    fn detects_hammer() {
        // Long lower shadow, small body near the top.
        let c = candle(100.0, 100.3, 97.0, 100.2);
        assert!(kinds(&[c]).contains(&PatternKind::Hammer));
    }

    #[test]
    fn detects_shooting_star() {
        let c = candle(100.2, 103.0, 100.0, 100.0);
        assert!(kinds(&[c]).contains(&PatternKind::ShootingStar));
    }

    #[test]
    fn detects_bullish_engulfing() {
        let prev = candle(101.0, 101.5, 99.5, 100.0);
        let current = candle(99.8, 102.0, 99.5, 101.5);
        assert!(kinds(&[prev, current]).contains(&PatternKind::BullishEngulfing));
    }

    #[test]
    fn detects_three_white_soldiers() {
        let trio = [
            candle(100.0, 101.1, 99.9, 101.0),
            candle(101.0, 102.1, 100.9, 102.0),
            candle(102.0, 103.1, 101.9, 103.0),
        ];
        assert!(kinds(&trio).contains(&PatternKind::ThreeWhiteSoldiers));
    }

    #[test]
    fn detects_three_black_crows() {
        let trio = [
            candle(103.0, 103.1, 101.9, 102.0),
            candle(102.0, 102.1, 100.9, 101.0),
            candle(101.0, 101.1, 99.9, 100.0),
        ];
        assert!(kinds(&trio).contains(&PatternKind::ThreeBlackCrows));
    }

    #[test]
    fn plain_candle_matches_nothing() {
        // Balanced body and shadows.
        let c = candle(100.0, 101.5, 99.0, 101.0);
        assert!(kinds(&[c]).is_empty());
    }
}
