// Demo runner: seeds a buffer with synthetic candles, runs one prediction
// against a canned inference provider, and prints the directive.
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use tracing::info;

use engine::config::EngineSettings;
use engine::data::BufferManager;
use engine::ensemble::InferenceProvider;
use engine::PredictionService;
use shared::models::{Candle, TimeFrame};

struct CannedProvider;

#[async_trait]
impl InferenceProvider for CannedProvider {
    async fn request_opinion(&self, _prompt: &str) -> anyhow::Result<String> {
        Ok(r#"Looking at the setup, momentum favors the upside.
```json
{"direction": "UP", "confidence": 0.78, "reasoning": "oversold bounce with rising volume"}
```"#
            .to_string())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let buffers = Arc::new(BufferManager::new());
    let start = Utc
        .with_ymd_and_hms(2024, 6, 1, 0, 0, 0)
        .single()
        .context("invalid seed timestamp")?;

    // Synthetic sell-off with a late bounce.
    let mut close = 250.0;
    for i in 0..200 {
        close += if i < 190 { -0.8 } else { 0.1 };
        buffers
            .append_candle(Candle {
                symbol: "VOL75".to_string(),
                timestamp: start + Duration::minutes(i),
                open: close + 0.2,
                high: close + 0.6,
                low: close - 0.6,
                close,
                volume: 40.0 + (i % 7) as f64 * 5.0,
            })
            .await;
    }
    info!(symbol = "VOL75", candles = 200, "buffer seeded");

    let service = PredictionService::new(
        buffers,
        Some(Arc::new(CannedProvider)),
        EngineSettings::default(),
    );
    let directive = service.predict("VOL75", TimeFrame::Minute5, close).await?;

    println!("{}", serde_json::to_string_pretty(&directive)?);
    Ok(())
}
