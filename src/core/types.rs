// Core Type Definitions for Signal Scanner
// Shared data model for the indicator engine and order book analyzer

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Enums
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Bullish,
    Bearish,
    Neutral,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    Buy,
    Sell,
    Neutral,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwingType {
    High,
    Low,
}

impl fmt::Display for SwingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Kind of signal the orchestrator may forward to notification collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalKind {
    VolumeSpike,
    EmaCrossOver,
    EmaCrossUnder,
    PriceCrossEma,
    StochRsiCross,
    MaCrossOver,
    MaCrossUnder,
    Long,
    Short,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// Candle
// ============================================================================

/// One OHLCV bar for a fixed time interval.
///
/// Windows are caller-held contiguous sequences with strictly increasing
/// timestamps; the engine never mutates or stores them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

// ============================================================================
// Order Book
// ============================================================================

/// Single price level in the order book.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: f64,
    pub quantity: f64,
}

impl PriceLevel {
    pub fn new(price: f64, quantity: f64) -> Self {
        Self { price, quantity }
    }
}

/// Depth snapshot handed in by the data-feed collaborator.
///
/// Precondition (not runtime-checked): `bids` and `asks` are non-empty, bids
/// sorted descending by price, asks ascending, best level at index 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBookData {
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
    pub timestamp: i64,
}

// ============================================================================
// Swing Points & Fibonacci
// ============================================================================

/// Local price extremum relative to a symmetric lookback neighborhood.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwingPoint {
    pub price: f64,
    pub timestamp: i64,
    pub swing_type: SwingType,
}

/// Price levels derived from one swing high/low pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FibonacciLevels {
    pub extension_1618: f64,
    pub retracement_618: f64,
}

// ============================================================================
// Trend Analysis
// ============================================================================

/// Point-in-time confluence snapshot produced by trend mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub is_valid: bool,
    pub direction: Direction,
    pub rsi: f64,
    pub ema21: f64,
    pub ema50: f64,
    pub bb_upper: f64,
    pub bb_lower: f64,
    pub bb_middle: f64,
    pub volume_ratio: f64,
    pub volume_spike: bool,
    pub daily_candle: Direction,
}

impl TrendAnalysis {
    /// Sentinel returned when the window is shorter than 50 candles.
    pub fn invalid() -> Self {
        Self {
            is_valid: false,
            direction: Direction::Neutral,
            rsi: 0.0,
            ema21: 0.0,
            ema50: 0.0,
            bb_upper: 0.0,
            bb_lower: 0.0,
            bb_middle: 0.0,
            volume_ratio: 0.0,
            volume_spike: false,
            daily_candle: Direction::Bearish,
        }
    }
}

// ============================================================================
// Signal Log
// ============================================================================

/// Record of one fired signal, as handed to the notification collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalLog {
    pub id: String,
    pub timestamp: i64,
    pub symbol: String,
    pub kind: SignalKind,
    pub timeframe: String,
    pub price: f64,
    pub details: String,
}

impl SignalLog {
    pub fn new(
        timestamp: i64,
        symbol: impl Into<String>,
        kind: SignalKind,
        timeframe: impl Into<String>,
        price: f64,
        details: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp,
            symbol: symbol.into(),
            kind,
            timeframe: timeframe.into(),
            price,
            details: details.into(),
        }
    }
}

impl fmt::Display for SignalLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SignalLog({} {} {} @ {:.4})",
            self.symbol, self.kind, self.timeframe, self.price
        )
    }
}
