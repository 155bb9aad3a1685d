// Per-symbol market data buffering.
pub mod buffer;

pub use buffer::{BufferManager, SymbolBuffer, BUFFER_CAPACITY};
