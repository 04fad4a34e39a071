// Signal Scanner - streaming technical-condition analytics core
//
// The crate continuously evaluates candle windows for many trading symbols
// and raises typed signal conditions (moving-average crossovers, volume
// spikes, trend confluence), plus order book microstructure metrics with a
// directional interpretation. It performs no network I/O and holds no state
// across calls: the orchestrator feeds windows and snapshots in, typed
// results come out.

pub mod core;
pub mod engine;
pub mod indicators;
pub mod orderbook;

pub use crate::core::{
    setup_logging, Candle, Direction, FibonacciLevels, IndicatorConfig, IndicatorType,
    OrderBookData, PriceLevel, Signal, SignalKind, SignalLog, SwingPoint, SwingType, TrendAnalysis,
};
pub use engine::{analyze_trend, detect_conditions, ConditionEngine, ConditionResult};
pub use orderbook::{analyze_order_book, interpret_metrics, Interpretation, OrderBookMetrics};
