// Swing Analyzer - local extrema, Fibonacci levels, daily candle bias

use crate::core::types::{Candle, Direction, FibonacciLevels, SwingPoint, SwingType};

/// Default symmetric lookback for swing detection.
pub const DEFAULT_LOOKBACK: usize = 10;

// Body must cover this share of the candle range to count as a long body.
const LONG_BODY_RATIO: f64 = 0.6;

/// Scan the window for swing highs and lows.
///
/// Index `i` is a High iff its high strictly exceeds every high in the
/// `lookback` candles on both sides; Low is the symmetric case on lows.
/// Points come back in scan order, a High before a Low at the same index.
/// The scan is O(n * lookback); windows are expected to stay bounded.
pub fn find_swing_points(candles: &[Candle], lookback: usize) -> Vec<SwingPoint> {
    let mut points = Vec::new();
    if lookback == 0 || candles.len() < 2 * lookback + 1 {
        return points;
    }

    for i in lookback..candles.len() - lookback {
        let left = &candles[i - lookback..i];
        let right = &candles[i + 1..i + lookback + 1];

        let current_high = candles[i].high;
        if left.iter().all(|c| current_high > c.high) && right.iter().all(|c| current_high > c.high)
        {
            points.push(SwingPoint {
                price: current_high,
                timestamp: candles[i].timestamp,
                swing_type: SwingType::High,
            });
        }

        let current_low = candles[i].low;
        if left.iter().all(|c| current_low < c.low) && right.iter().all(|c| current_low < c.low) {
            points.push(SwingPoint {
                price: current_low,
                timestamp: candles[i].timestamp,
                swing_type: SwingType::Low,
            });
        }
    }

    points
}

/// Fibonacci extension/retracement levels from one swing high/low pair.
pub fn fibonacci_levels(swing_high: f64, swing_low: f64) -> FibonacciLevels {
    let range = swing_high - swing_low;
    FibonacciLevels {
        extension_1618: swing_high + range * 1.618,
        retracement_618: swing_high - range * 0.618,
    }
}

/// Derive trade levels from the two most recent qualifying swing points.
///
/// Bullish picks the newest High, then the newest Low strictly older than
/// it; Bearish is the symmetric search from the newest Low. `None` when
/// fewer than two swing points exist or no qualifying pair is found.
pub fn trade_levels(candles: &[Candle], direction: Direction) -> Option<FibonacciLevels> {
    let mut points = find_swing_points(candles, DEFAULT_LOOKBACK);
    if points.len() < 2 {
        return None;
    }
    points.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let (swing_high, swing_low) = match direction {
        Direction::Bullish => {
            let high = points.iter().find(|p| p.swing_type == SwingType::High)?;
            let low = points
                .iter()
                .find(|p| p.swing_type == SwingType::Low && p.timestamp < high.timestamp)?;
            (high, low)
        }
        Direction::Bearish => {
            let low = points.iter().find(|p| p.swing_type == SwingType::Low)?;
            let high = points
                .iter()
                .find(|p| p.swing_type == SwingType::High && p.timestamp < low.timestamp)?;
            (high, low)
        }
        Direction::Neutral => return None,
    };

    Some(fibonacci_levels(swing_high.price, swing_low.price))
}

/// Long-bodied candle closing above its open.
pub fn is_daily_bullish(candle: &Candle) -> bool {
    candle.is_bullish() && candle.body() > candle.range() * LONG_BODY_RATIO
}

/// Long-bodied candle closing below its open.
pub fn is_daily_bearish(candle: &Candle) -> bool {
    candle.is_bearish() && candle.body() > candle.range() * LONG_BODY_RATIO
}

/// Classify the daily candle.
pub fn daily_bias(candle: &Candle) -> Direction {
    if is_daily_bullish(candle) {
        Direction::Bullish
    } else if is_daily_bearish(candle) {
        Direction::Bearish
    } else {
        Direction::Neutral
    }
}
