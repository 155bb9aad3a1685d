// Local statistical signal: weighted vote across oscillator extremes.
use shared::models::{Direction, PredictionSignal};

use crate::indicators::IndicatorSet;

const RSI_OVERSOLD: f64 = 30.0;
const RSI_OVERBOUGHT: f64 = 70.0;
const BOLLINGER_LOWER_EXTREME: f64 = 0.05;
const BOLLINGER_UPPER_EXTREME: f64 = 0.95;
const STOCH_OVERSOLD: f64 = 20.0;
const STOCH_OVERBOUGHT: f64 = 80.0;

struct Vote {
    source: &'static str,
    direction: Direction,
    confidence: f64,
}

/// Collect extreme-condition votes and aggregate them into one signal.
/// No triggered votes yields a neutral signal at the 0.5 baseline.
pub fn evaluate(indicators: &IndicatorSet) -> PredictionSignal {
    let votes = collect_votes(indicators);
    if votes.is_empty() {
        return PredictionSignal {
            direction: Direction::Neutral,
            confidence: 0.5,
            rationale: "no oscillator extremes triggered".to_string(),
        };
    }

    let up_weight: f64 = votes
        .iter()
        .filter(|v| v.direction == Direction::Up)
        .map(|v| v.confidence)
        .sum();
    let down_weight: f64 = votes
        .iter()
        .filter(|v| v.direction == Direction::Down)
        .map(|v| v.confidence)
        .sum();

    let direction = if up_weight > down_weight {
        Direction::Up
    } else if down_weight > up_weight {
        Direction::Down
    } else {
        Direction::Neutral
    };

    let (winning, losing) = if direction == Direction::Up {
        (up_weight, down_weight)
    } else {
        (down_weight, up_weight)
    };

    let winners: Vec<&Vote> = votes.iter().filter(|v| v.direction == direction).collect();
    let confidence = if direction == Direction::Neutral || winners.is_empty() {
        0.5
    } else {
        // Mean confidence of the agreeing votes, discounted by the weight of
        // the opposing side.
        let mean_winner = winning / winners.len() as f64;
        mean_winner * (winning / (winning + losing))
    };

    let rationale = votes
        .iter()
        .map(|v| format!("{}:{}", v.source, v.direction))
        .collect::<Vec<_>>()
        .join(", ");

    PredictionSignal {
        direction,
        confidence,
        rationale,
    }
}

fn collect_votes(ind: &IndicatorSet) -> Vec<Vote> {
    let mut votes = Vec::new();

    if ind.rsi < RSI_OVERSOLD {
        votes.push(Vote {
            source: "rsi",
            direction: Direction::Up,
            confidence: 0.7,
        });
    } else if ind.rsi > RSI_OVERBOUGHT {
        votes.push(Vote {
            source: "rsi",
            direction: Direction::Down,
            confidence: 0.7,
        });
    }

    if ind.macd_histogram > 0.0 {
        votes.push(Vote {
            source: "macd",
            direction: Direction::Up,
            confidence: 0.6,
        });
    } else if ind.macd_histogram < 0.0 {
        votes.push(Vote {
            source: "macd",
            direction: Direction::Down,
            confidence: 0.6,
        });
    }

    if ind.bollinger_width > 0.0 {
        if ind.bollinger_position < BOLLINGER_LOWER_EXTREME {
            votes.push(Vote {
                source: "bollinger",
                direction: Direction::Up,
                confidence: 0.65,
            });
        } else if ind.bollinger_position > BOLLINGER_UPPER_EXTREME {
            votes.push(Vote {
                source: "bollinger",
                direction: Direction::Down,
                confidence: 0.65,
            });
        }
    }

    if ind.stochastic_k < STOCH_OVERSOLD {
        votes.push(Vote {
            source: "stochastic",
            direction: Direction::Up,
            confidence: 0.6,
        });
    } else if ind.stochastic_k > STOCH_OVERBOUGHT {
        votes.push(Vote {
            source: "stochastic",
            direction: Direction::Down,
            confidence: 0.6,
        });
    }

    votes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indicators(rsi: f64, histogram: f64, position: f64, stoch_k: f64) -> IndicatorSet {
        IndicatorSet {
            price: 100.0,
            rsi,
            macd_line: 0.0,
            macd_signal: 0.0,
            macd_histogram: histogram,
            atr: 1.0,
            atr_normalized: 1.0,
            bollinger_position: position,
            bollinger_width: 2.0,
            bollinger_squeeze: false,
            stochastic_k: stoch_k,
            stochastic_d: stoch_k,
            williams_r: -50.0,
        }
    }

    #[test]
    fn oversold_extremes_vote_up() {
        let signal = evaluate(&indicators(25.0, 0.5, 0.5, 50.0));
        assert_eq!(signal.direction, Direction::Up);
        // RSI@0.7 and MACD@0.6 agree with nothing opposing.
        assert!((signal.confidence - 0.65).abs() < 1e-9);
        assert!(signal.rationale.contains("rsi"));
    }

    #[test]
    fn overbought_extremes_vote_down() {
        let signal = evaluate(&indicators(75.0, -0.5, 0.97, 85.0));
        assert_eq!(signal.direction, Direction::Down);
        assert!(signal.confidence > 0.6);
    }

    #[test]
    fn no_extremes_is_neutral_baseline() {
        let signal = evaluate(&indicators(50.0, 0.0, 0.5, 50.0));
        assert_eq!(signal.direction, Direction::Neutral);
        assert_eq!(signal.confidence, 0.5);
    }

    #[test]
    fn opposing_votes_discount_confidence() {
        // RSI oversold (up @0.7) against MACD falling (down @0.6).
        let mixed = evaluate(&indicators(25.0, -0.5, 0.5, 50.0));
        assert_eq!(mixed.direction, Direction::Up);
        let clean = evaluate(&indicators(25.0, 0.0, 0.5, 50.0));
        assert!(mixed.confidence < clean.confidence);
    }
}
