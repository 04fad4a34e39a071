// Order Book Module - depth snapshot metrics and interpretation

pub mod analyzer;
pub mod interpret;

pub use analyzer::{
    analyze_order_book, OrderBookMetrics, PriceImpact, SideDepth, SideLiquidity,
    DEFAULT_TARGET_VOLUME,
};
pub use interpret::{interpret_metrics, Interpretation};
