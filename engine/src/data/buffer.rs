// Bounded per-symbol history of ticks and candles.
//
// The buffer is the only mutable shared state in the engine: the feed
// collaborator appends while prediction requests read a cloned snapshot.
// Each symbol sits behind its own lock so requests for different symbols
// never contend.
use shared::models::{Candle, Tick};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Oldest entries drop once a stream exceeds this many elements.
pub const BUFFER_CAPACITY: usize = 1000;

/// Ordered tick and candle history for one symbol.
#[derive(Debug, Default)]
pub struct SymbolBuffer {
    ticks: Vec<Tick>,
    candles: Vec<Candle>,
}

impl SymbolBuffer {
    pub fn new() -> Self {
        SymbolBuffer {
            ticks: Vec::new(),
            candles: Vec::new(),
        }
    }

    pub fn append_tick(&mut self, tick: Tick) {
        insert_sorted(&mut self.ticks, tick, |t| t.timestamp);
        if self.ticks.len() > BUFFER_CAPACITY {
            self.ticks.remove(0);
        }
    }

    pub fn append_candle(&mut self, candle: Candle) {
        insert_sorted(&mut self.candles, candle, |c| c.timestamp);
        if self.candles.len() > BUFFER_CAPACITY {
            self.candles.remove(0);
        }
    }

    /// Last `n` candles in chronological order (fewer if the buffer is short).
    pub fn last_candles(&self, n: usize) -> Vec<Candle> {
        let start = self.candles.len().saturating_sub(n);
        self.candles[start..].to_vec()
    }

    pub fn last_ticks(&self, n: usize) -> Vec<Tick> {
        let start = self.ticks.len().saturating_sub(n);
        self.ticks[start..].to_vec()
    }

    pub fn candle_count(&self) -> usize {
        self.candles.len()
    }

    pub fn tick_count(&self) -> usize {
        self.ticks.len()
    }
}

/// Insert keeping timestamp order; an entry with a duplicate timestamp
/// replaces the existing one.
fn insert_sorted<T, K, F>(items: &mut Vec<T>, item: T, key: F)
where
    K: Ord + Copy,
    F: Fn(&T) -> K,
{
    let ts = key(&item);
    match items.binary_search_by_key(&ts, &key) {
        Ok(pos) => items[pos] = item,
        Err(pos) => items.insert(pos, item),
    }
}

/// Owner of all symbol buffers. Created empty; a symbol's buffer appears on
/// its first observation and lives for the process lifetime.
#[derive(Debug, Default)]
pub struct BufferManager {
    buffers: RwLock<HashMap<String, Arc<RwLock<SymbolBuffer>>>>,
}

impl BufferManager {
    pub fn new() -> Self {
        BufferManager {
            buffers: RwLock::new(HashMap::new()),
        }
    }

    async fn buffer_for(&self, symbol: &str) -> Arc<RwLock<SymbolBuffer>> {
        {
            let buffers = self.buffers.read().await;
            if let Some(buf) = buffers.get(symbol) {
                return buf.clone();
            }
        }
        let mut buffers = self.buffers.write().await;
        buffers
            .entry(symbol.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(SymbolBuffer::new())))
            .clone()
    }

    pub async fn append_tick(&self, tick: Tick) {
        let buf = self.buffer_for(&tick.symbol).await;
        buf.write().await.append_tick(tick);
    }

    pub async fn append_candle(&self, candle: Candle) {
        let buf = self.buffer_for(&candle.symbol).await;
        buf.write().await.append_candle(candle);
    }

    /// Consistent snapshot of the last `n` candles, or `None` for a symbol
    /// that has never been observed.
    pub async fn snapshot_candles(&self, symbol: &str, n: usize) -> Option<Vec<Candle>> {
        let buf = {
            let buffers = self.buffers.read().await;
            buffers.get(symbol)?.clone()
        };
        let guard = buf.read().await;
        Some(guard.last_candles(n))
    }

    pub async fn snapshot_ticks(&self, symbol: &str, n: usize) -> Option<Vec<Tick>> {
        let buf = {
            let buffers = self.buffers.read().await;
            buffers.get(symbol)?.clone()
        };
        let guard = buf.read().await;
        Some(guard.last_ticks(n))
    }
}
