// Condition Engine - turns the latest candle window into typed signal conditions
// One active indicator strategy per config; stateless across calls

pub mod trend;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::config::{IndicatorConfig, IndicatorType};
use crate::core::types::{Candle, Direction, FibonacciLevels, SignalKind, TrendAnalysis};
use crate::indicators::series;
use crate::indicators::swing;

pub use trend::analyze_trend;

// ============================================================================
// Condition Result
// ============================================================================

/// Outcome of one detection pass, one variant per indicator strategy.
///
/// `Empty` covers every degraded case: too little history, a config whose
/// parameter section does not match its declared type, or trend mode without
/// a daily candle. None of those are errors; the caller simply emits no
/// signal this cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "condition", rename_all = "snake_case")]
pub enum ConditionResult {
    Empty,
    Volume {
        spike: bool,
        current_volume: f64,
        volume_ma: f64,
    },
    EmaCross {
        cross_over: bool,
        cross_under: bool,
        fast: f64,
        slow: f64,
    },
    PriceEmaCross {
        cross_over: bool,
        cross_under: bool,
        price: f64,
        ema: f64,
    },
    MaCross {
        cross_over: bool,
        cross_under: bool,
        fast: f64,
        slow: f64,
    },
    StochRsiCross {
        cross_over: bool,
        cross_under: bool,
        k: f64,
        d: f64,
    },
    Atr {
        value: f64,
    },
    Adx {
        value: f64,
    },
    Trend {
        analysis: TrendAnalysis,
        trade_levels: Option<FibonacciLevels>,
    },
}

impl ConditionResult {
    pub fn is_empty(&self) -> bool {
        matches!(self, ConditionResult::Empty)
    }

    /// Map a fired condition to the signal kind the orchestrator logs.
    /// Point-in-time reporters (ATR, ADX) and non-firing results map to None.
    pub fn signal_kind(&self) -> Option<SignalKind> {
        match self {
            ConditionResult::Volume { spike: true, .. } => Some(SignalKind::VolumeSpike),
            ConditionResult::EmaCross {
                cross_over: true, ..
            } => Some(SignalKind::EmaCrossOver),
            ConditionResult::EmaCross {
                cross_under: true, ..
            } => Some(SignalKind::EmaCrossUnder),
            ConditionResult::PriceEmaCross {
                cross_over: true, ..
            }
            | ConditionResult::PriceEmaCross {
                cross_under: true, ..
            } => Some(SignalKind::PriceCrossEma),
            ConditionResult::MaCross {
                cross_over: true, ..
            } => Some(SignalKind::MaCrossOver),
            ConditionResult::MaCross {
                cross_under: true, ..
            } => Some(SignalKind::MaCrossUnder),
            ConditionResult::StochRsiCross {
                cross_over: true, ..
            }
            | ConditionResult::StochRsiCross {
                cross_under: true, ..
            } => Some(SignalKind::StochRsiCross),
            ConditionResult::Trend { analysis, .. } => match analysis.direction {
                Direction::Bullish => Some(SignalKind::Long),
                Direction::Bearish => Some(SignalKind::Short),
                Direction::Neutral => None,
            },
            _ => None,
        }
    }
}

// ============================================================================
// Detection
// ============================================================================

// Before the cross the relation is non-strict, after it strict. Flat series
// that stay equal therefore never fire.
fn cross_states(prev_fast: f64, prev_slow: f64, last_fast: f64, last_slow: f64) -> (bool, bool) {
    let cross_over = prev_fast <= prev_slow && last_fast > last_slow;
    let cross_under = prev_fast >= prev_slow && last_fast < last_slow;
    (cross_over, cross_under)
}

fn last_two(series: &[f64]) -> Option<(f64, f64)> {
    if series.len() < 2 {
        return None;
    }
    Some((series[series.len() - 2], series[series.len() - 1]))
}

/// Evaluate the configured condition against the supplied window.
///
/// All "previous value" comparisons come from the last two points of the
/// freshly computed series; nothing is cached across calls. `daily_candle`
/// is only consulted in trend mode.
pub fn detect_conditions(
    config: &IndicatorConfig,
    candles: &[Candle],
    daily_candle: Option<&Candle>,
) -> ConditionResult {
    if candles.len() < 2 {
        return ConditionResult::Empty;
    }
    let current = candles[candles.len() - 1];

    match config.indicator_type {
        IndicatorType::Volume => {
            let Some(params) = &config.volume else {
                return ConditionResult::Empty;
            };
            let volume_ma = series::volume_sma(candles, params.period as usize);
            let Some(&last_ma) = volume_ma.last() else {
                return ConditionResult::Empty;
            };
            ConditionResult::Volume {
                spike: current.volume > last_ma * params.spike_threshold,
                current_volume: current.volume,
                volume_ma: last_ma,
            }
        }
        IndicatorType::Ema => {
            let Some(params) = &config.ema else {
                return ConditionResult::Empty;
            };
            let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
            let fast = series::ema(&closes, params.fast_period as usize);
            let slow = series::ema(&closes, params.slow_period as usize);
            let (Some((prev_fast, last_fast)), Some((prev_slow, last_slow))) =
                (last_two(&fast), last_two(&slow))
            else {
                return ConditionResult::Empty;
            };
            let (cross_over, cross_under) =
                cross_states(prev_fast, prev_slow, last_fast, last_slow);
            ConditionResult::EmaCross {
                cross_over,
                cross_under,
                fast: last_fast,
                slow: last_slow,
            }
        }
        IndicatorType::PriceEma => {
            let Some(params) = &config.price_ema else {
                return ConditionResult::Empty;
            };
            let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
            let ema = series::ema(&closes, params.period as usize);
            let Some((prev_ema, last_ema)) = last_two(&ema) else {
                return ConditionResult::Empty;
            };
            let prev_price = candles[candles.len() - 2].close;
            let (cross_over, cross_under) =
                cross_states(prev_price, prev_ema, current.close, last_ema);
            ConditionResult::PriceEmaCross {
                cross_over,
                cross_under,
                price: current.close,
                ema: last_ema,
            }
        }
        IndicatorType::Ma => {
            let Some(params) = &config.ma else {
                return ConditionResult::Empty;
            };
            let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
            let fast = series::sma(&closes, params.fast_period as usize);
            let slow = series::sma(&closes, params.slow_period as usize);
            let (Some((prev_fast, last_fast)), Some((prev_slow, last_slow))) =
                (last_two(&fast), last_two(&slow))
            else {
                return ConditionResult::Empty;
            };
            let (cross_over, cross_under) =
                cross_states(prev_fast, prev_slow, last_fast, last_slow);
            ConditionResult::MaCross {
                cross_over,
                cross_under,
                fast: last_fast,
                slow: last_slow,
            }
        }
        IndicatorType::StochRsi => {
            let Some(params) = &config.stoch_rsi else {
                return ConditionResult::Empty;
            };
            let stoch = series::stoch_rsi(
                candles,
                params.period as usize,
                params.k_period as usize,
                params.d_period as usize,
            );
            let (Some((prev_k, last_k)), Some((prev_d, last_d))) =
                (last_two(&stoch.k), last_two(&stoch.d))
            else {
                return ConditionResult::Empty;
            };
            let (cross_over, cross_under) = cross_states(prev_k, prev_d, last_k, last_d);
            ConditionResult::StochRsiCross {
                cross_over,
                cross_under,
                k: last_k,
                d: last_d,
            }
        }
        IndicatorType::Atr => {
            let Some(params) = &config.atr else {
                return ConditionResult::Empty;
            };
            match series::atr(candles, params.period as usize).last() {
                Some(&value) => ConditionResult::Atr { value },
                None => ConditionResult::Empty,
            }
        }
        IndicatorType::Adx => {
            let Some(params) = &config.adx else {
                return ConditionResult::Empty;
            };
            match series::adx(candles, params.period as usize).last() {
                Some(&value) => ConditionResult::Adx { value },
                None => ConditionResult::Empty,
            }
        }
        IndicatorType::Trend => {
            let Some(daily) = daily_candle else {
                return ConditionResult::Empty;
            };
            let analysis = trend::analyze_trend(candles, daily);
            let trade_levels = if analysis.direction != Direction::Neutral {
                swing::trade_levels(candles, analysis.direction)
            } else {
                None
            };
            ConditionResult::Trend {
                analysis,
                trade_levels,
            }
        }
    }
}

// ============================================================================
// Condition Engine
// ============================================================================

/// Per-symbol detection front end holding the active strategy config.
pub struct ConditionEngine {
    symbol: String,
    config: IndicatorConfig,

    // Statistics
    windows_processed: u64,
    conditions_fired: u64,
}

impl ConditionEngine {
    pub fn new(symbol: String, config: IndicatorConfig) -> Self {
        Self {
            symbol,
            config,
            windows_processed: 0,
            conditions_fired: 0,
        }
    }

    /// Run detection over the latest window.
    pub fn detect(&mut self, candles: &[Candle], daily_candle: Option<&Candle>) -> ConditionResult {
        self.windows_processed += 1;
        let result = detect_conditions(&self.config, candles, daily_candle);

        if let Some(kind) = result.signal_kind() {
            self.conditions_fired += 1;
            debug!(
                symbol = %self.symbol,
                timeframe = %self.config.timeframe,
                kind = %kind,
                "Condition fired"
            );
        }
        result
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: IndicatorConfig) {
        self.config = config;
    }

    pub fn windows_processed(&self) -> u64 {
        self.windows_processed
    }

    pub fn conditions_fired(&self) -> u64 {
        self.conditions_fired
    }
}
