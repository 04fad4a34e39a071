// Indicators Module - pure series math and swing analysis

pub mod series;
pub mod swing;

pub use series::{
    adx, atr, bollinger_bands, ema, rsi, sma, stoch_rsi, volume_sma, BollingerBands, StochRsi,
};
pub use swing::{
    daily_bias, fibonacci_levels, find_swing_points, is_daily_bearish, is_daily_bullish,
    trade_levels, DEFAULT_LOOKBACK,
};
