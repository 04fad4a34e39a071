// Trend Analysis - RSI / EMA / Bollinger / volume confluence

use crate::core::types::{Candle, Direction, TrendAnalysis};
use crate::indicators::series;
use crate::indicators::swing;
use tracing::debug;

// Fixed trend-mode parameters; these are not configurable by design.
const MIN_CANDLES: usize = 50;
const RSI_PERIOD: usize = 14;
const EMA_FAST: usize = 21;
const EMA_SLOW: usize = 50;
const BB_PERIOD: usize = 20;
const BB_STD_DEV: f64 = 2.0;
const VOLUME_PERIOD: usize = 20;
const VOLUME_SPIKE_RATIO: f64 = 2.0;

/// Analyze trend confluence over the window plus one daily candle.
///
/// Needs at least 50 candles; shorter windows return the invalid sentinel.
/// Validity requires RSI in [30, 70], the close inside the Bollinger band,
/// and a volume spike. Direction is Bullish only when EMA21 > EMA50, the
/// close sits between them, and the daily candle is long-bodied bullish
/// (Bearish fully mirrored); anything else is Neutral. Invalid snapshots
/// still carry the point-in-time indicator values.
pub fn analyze_trend(candles: &[Candle], daily_candle: &Candle) -> TrendAnalysis {
    if candles.len() < MIN_CANDLES {
        return TrendAnalysis::invalid();
    }

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let current_price = *closes.last().unwrap();

    let rsi = *series::rsi(candles, RSI_PERIOD).last().unwrap();
    let ema21 = *series::ema(&closes, EMA_FAST).last().unwrap();
    let ema50 = *series::ema(&closes, EMA_SLOW).last().unwrap();

    let bb = series::bollinger_bands(candles, BB_PERIOD, BB_STD_DEV);
    let bb_upper = *bb.upper.last().unwrap();
    let bb_lower = *bb.lower.last().unwrap();
    let bb_middle = *bb.middle.last().unwrap();

    let current_volume = candles.last().unwrap().volume;
    let volume_ma = *series::volume_sma(candles, VOLUME_PERIOD).last().unwrap();
    let volume_ratio = current_volume / volume_ma;
    let volume_spike = volume_ratio > VOLUME_SPIKE_RATIO;

    let daily = swing::daily_bias(daily_candle);

    let is_valid = (30.0..=70.0).contains(&rsi)
        && current_price >= bb_lower
        && current_price <= bb_upper
        && volume_spike;

    let mut direction = Direction::Neutral;
    if is_valid {
        if ema21 > ema50
            && current_price > ema50
            && current_price < ema21
            && daily == Direction::Bullish
        {
            direction = Direction::Bullish;
        } else if ema21 < ema50
            && current_price < ema50
            && current_price > ema21
            && daily == Direction::Bearish
        {
            direction = Direction::Bearish;
        }
    }

    debug!(
        rsi = rsi,
        ema21 = ema21,
        ema50 = ema50,
        volume_ratio = volume_ratio,
        is_valid = is_valid,
        direction = %direction,
        "Trend analyzed"
    );

    TrendAnalysis {
        is_valid,
        direction,
        rsi,
        ema21,
        ema50,
        bb_upper,
        bb_lower,
        bb_middle,
        volume_ratio,
        volume_spike,
        daily_candle: daily,
    }
}
