// External inference boundary: the provider trait plus staged extraction of
// the structured opinion block from free-text responses.
use async_trait::async_trait;
use serde::Deserialize;
use shared::models::{Direction, PredictionSignal};
use shared::utils::clamp;

/// Request/response contract with the external inference service. The
/// response is free text expected to embed a JSON opinion block.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    async fn request_opinion(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Parsed opinion block. Price levels are advisory and may be absent.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalOpinion {
    pub direction: Direction,
    pub confidence: f64,
    pub reasoning: String,
    pub entry_price: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
}

impl ExternalOpinion {
    pub fn signal(&self) -> PredictionSignal {
        PredictionSignal {
            direction: self.direction,
            confidence: self.confidence,
            rationale: self.reasoning.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawOpinion {
    direction: String,
    confidence: f64,
    #[serde(default, alias = "rationale")]
    reasoning: String,
    #[serde(default)]
    entry_price: Option<f64>,
    #[serde(default)]
    stop_loss: Option<f64>,
    #[serde(default)]
    take_profit: Option<f64>,
}

/// Staged extraction: strict parse, then fenced code blocks, then a scan for
/// balanced brace objects. First stage that parses wins; exhaustion means
/// "no external opinion", never an error.
pub fn extract_opinion(text: &str) -> Option<ExternalOpinion> {
    if let Some(opinion) = parse_object(text.trim()) {
        return Some(opinion);
    }
    for block in fenced_blocks(text) {
        if let Some(opinion) = parse_object(block.trim()) {
            return Some(opinion);
        }
    }
    for candidate in brace_candidates(text) {
        if let Some(opinion) = parse_object(candidate) {
            return Some(opinion);
        }
    }
    None
}

fn parse_object(candidate: &str) -> Option<ExternalOpinion> {
    let raw: RawOpinion = serde_json::from_str(candidate).ok()?;
    let direction = match raw.direction.trim().to_uppercase().as_str() {
        "UP" | "BULLISH" | "BUY" | "LONG" => Direction::Up,
        "DOWN" | "BEARISH" | "SELL" | "SHORT" => Direction::Down,
        "NEUTRAL" | "HOLD" | "NONE" => Direction::Neutral,
        _ => return None,
    };
    Some(ExternalOpinion {
        direction,
        confidence: clamp(raw.confidence, 0.0, 1.0),
        reasoning: raw.reasoning,
        entry_price: raw.entry_price,
        stop_loss: raw.stop_loss,
        take_profit: raw.take_profit,
    })
}

/// Contents of ``` fenced blocks, with an optional language tag stripped.
fn fenced_blocks(text: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find("```") {
        let after_open = &rest[open + 3..];
        let Some(close) = after_open.find("```") else {
            break;
        };
        let mut body = &after_open[..close];
        // Drop a leading language tag line such as "json".
        if let Some(newline) = body.find('\n') {
            if !body[..newline].contains('{') {
                body = &body[newline + 1..];
            }
        }
        blocks.push(body);
        rest = &after_open[close + 3..];
    }
    blocks
}

/// Balanced top-level `{...}` substrings, in order of appearance.
fn brace_candidates(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut candidates = Vec::new();
    let mut start: Option<usize> = None;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' if depth > 0 => in_string = true,
            b'{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            b'}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(s) = start.take() {
                        candidates.push(&text[s..=i]);
                    }
                }
            }
            _ => {}
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str =
        r#"{"direction": "UP", "confidence": 0.82, "reasoning": "momentum building"}"#;

    #[test]
    fn strict_parse_succeeds_on_bare_json() {
        let opinion = extract_opinion(WELL_FORMED).unwrap();
        assert_eq!(opinion.direction, Direction::Up);
        assert_eq!(opinion.confidence, 0.82);
        assert_eq!(opinion.reasoning, "momentum building");
    }

    #[test]
    fn fenced_block_parse_succeeds() {
        let text = format!("Here is my analysis:\n```json\n{}\n```\nGood luck.", WELL_FORMED);
        let opinion = extract_opinion(&text).unwrap();
        assert_eq!(opinion.direction, Direction::Up);
    }

    #[test]
    fn brace_scan_finds_embedded_object() {
        let text = format!(
            "The market looks bullish. My call: {} based on the chart.",
            WELL_FORMED
        );
        let opinion = extract_opinion(&text).unwrap();
        assert_eq!(opinion.confidence, 0.82);
    }

    #[test]
    fn staged_parse_matches_direct_parse() {
        // Same structured result whether the object arrives bare or buried
        // in prose.
        let direct = extract_opinion(WELL_FORMED).unwrap();
        let buried = extract_opinion(&format!("noise {{broken}} then {} trailing", WELL_FORMED))
            .unwrap();
        assert_eq!(direct, buried);
    }

    #[test]
    fn prose_without_object_yields_none() {
        assert!(extract_opinion("I think the market goes up, maybe 80% sure.").is_none());
    }

    #[test]
    fn unknown_direction_yields_none() {
        let text = r#"{"direction": "SIDEWAYS-ISH", "confidence": 0.5}"#;
        assert!(extract_opinion(text).is_none());
    }

    #[test]
    fn confidence_is_clamped_to_unit_interval() {
        let text = r#"{"direction": "DOWN", "confidence": 1.7, "reasoning": "sure"}"#;
        let opinion = extract_opinion(text).unwrap();
        assert_eq!(opinion.confidence, 1.0);
    }

    #[test]
    fn optional_levels_pass_through() {
        let text = r#"{"direction": "UP", "confidence": 0.7, "reasoning": "r",
                       "entry_price": 100.0, "stop_loss": 99.0, "take_profit": 102.0}"#;
        let opinion = extract_opinion(text).unwrap();
        assert_eq!(opinion.stop_loss, Some(99.0));
        assert_eq!(opinion.take_profit, Some(102.0));
    }

    #[test]
    fn string_braces_do_not_break_the_scan() {
        let text = r#"note: {"direction": "UP", "confidence": 0.6, "reasoning": "breakout {wedge}"}"#;
        let opinion = extract_opinion(text).unwrap();
        assert_eq!(opinion.reasoning, "breakout {wedge}");
    }
}
