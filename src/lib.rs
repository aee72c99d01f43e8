/// ITCH VWAP - Market Data Feed Aggregator
///
/// Single-pass decoder and aggregation engine for length-prefixed ITCH 5.0
/// market data captures. Features include:
/// - Bounds-checked big-endian frame and message decoding
/// - Order reference table resolving later lifecycle events
/// - Per-instrument cumulative VWAP with hourly report emission
/// - Event-time session clock (no wall-clock dependency)
/// - Feed statistics and data-quality counters

pub mod clock;
pub mod decoder;
pub mod directory;
pub mod engine;
pub mod order_table;
pub mod protocol;
pub mod reader;
pub mod stats;
pub mod vwap;

pub use clock::{SessionClock, HOUR_NS};
pub use decoder::{DecodeError, DecodeResult, Decoder};
pub use directory::SymbolDirectory;
pub use engine::{Engine, EngineError, RunSummary};
pub use order_table::{OrderRecord, OrderTable, TableError};
pub use protocol::{
    price_to_f64, AddOrder, BrokenTrade, CrossTrade, Message, MessageType, OrderCancel,
    OrderDelete, OrderExecuted, OrderExecutedWithPrice, OrderReplace, Side, StockDirectory,
    SystemEvent, Trade, FRAME_PREFIX_SIZE, PRICE_SCALE,
};
pub use reader::FieldReader;
pub use stats::FeedStats;
pub use vwap::{VwapAccumulator, VwapBucket, VwapReport, VwapRow};
