// Series Math - pure indicator calculations over candle windows
// SMA, EMA, RSI, ATR, ADX, Bollinger Bands, Stochastic RSI, volume MA

use crate::core::types::Candle;

// All functions here are total over well-formed input: a window shorter than
// the required warm-up yields an empty result, never a panic or error.
//
// Two implementation quirks are kept on purpose for output parity with the
// scanner's historical signal stream and must not be "corrected":
//   - RSI, DX and stochastic denominators substitute 1.0 when exactly zero
//     (not a conventional epsilon, not a clamp of sub-1 values);
//   - ATR is a plain rolling mean of true range, not Wilder-smoothed.

fn guard_zero(denominator: f64) -> f64 {
    if denominator == 0.0 {
        1.0
    } else {
        denominator
    }
}

/// Simple moving average. Output length = `values.len() - period + 1`.
pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }
    values
        .windows(period)
        .map(|window| window.iter().sum::<f64>() / period as f64)
        .collect()
}

/// Exponential moving average seeded with the SMA of the first `period`
/// values. Output length = `values.len() - period + 1`.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }
    let multiplier = 2.0 / (period as f64 + 1.0);
    let seed = values[..period].iter().sum::<f64>() / period as f64;

    let mut emas = Vec::with_capacity(values.len() - period + 1);
    emas.push(seed);
    for &value in &values[period..] {
        let prev = *emas.last().unwrap();
        emas.push((value - prev) * multiplier + prev);
    }
    emas
}

/// Simple moving average over candle volumes.
pub fn volume_sma(candles: &[Candle], period: usize) -> Vec<f64> {
    let volumes: Vec<f64> = candles.iter().map(|c| c.volume).collect();
    sma(&volumes, period)
}

/// Relative Strength Index with Wilder smoothing.
///
/// The first bar's change is 0. Output length = `candles.len() - period + 1`.
pub fn rsi(candles: &[Candle], period: usize) -> Vec<f64> {
    if period == 0 || candles.len() < period {
        return Vec::new();
    }

    let changes: Vec<f64> = candles
        .iter()
        .enumerate()
        .map(|(i, c)| if i == 0 { 0.0 } else { c.close - candles[i - 1].close })
        .collect();
    let gains: Vec<f64> = changes.iter().map(|&ch| ch.max(0.0)).collect();
    let losses: Vec<f64> = changes.iter().map(|&ch| (-ch).max(0.0)).collect();

    let mut avg_gains = Vec::with_capacity(candles.len() - period + 1);
    let mut avg_losses = Vec::with_capacity(candles.len() - period + 1);
    avg_gains.push(gains[..period].iter().sum::<f64>() / period as f64);
    avg_losses.push(losses[..period].iter().sum::<f64>() / period as f64);

    for i in period..changes.len() {
        let prev_gain = *avg_gains.last().unwrap();
        let prev_loss = *avg_losses.last().unwrap();
        avg_gains.push((prev_gain * (period as f64 - 1.0) + gains[i]) / period as f64);
        avg_losses.push((prev_loss * (period as f64 - 1.0) + losses[i]) / period as f64);
    }

    avg_gains
        .iter()
        .zip(avg_losses.iter())
        .map(|(&gain, &loss)| {
            let rs = gain / guard_zero(loss);
            100.0 - 100.0 / (1.0 + rs)
        })
        .collect()
}

/// Average True Range as a rolling mean of true range over `period`.
///
/// The first bar uses its own low as the previous close.
pub fn atr(candles: &[Candle], period: usize) -> Vec<f64> {
    if period == 0 || candles.len() < period {
        return Vec::new();
    }
    let trs: Vec<f64> = candles
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let prev_close = if i > 0 { candles[i - 1].close } else { c.low };
            (c.high - c.low)
                .max((c.high - prev_close).abs())
                .max((c.low - prev_close).abs())
        })
        .collect();
    sma(&trs, period)
}

/// Average Directional Index.
///
/// Directional movement and true range are taken bar-over-bar from index 1,
/// seeded with plain sums over the first `period` bars, then Wilder-smoothed
/// (`s - s/period + raw`). ADX itself is seeded with the mean of the first
/// `period` DX values. Requires at least `2 * period` candles.
pub fn adx(candles: &[Candle], period: usize) -> Vec<f64> {
    if period == 0 || candles.len() < period * 2 {
        return Vec::new();
    }

    let mut trs = Vec::with_capacity(candles.len() - 1);
    let mut plus_dms = Vec::with_capacity(candles.len() - 1);
    let mut minus_dms = Vec::with_capacity(candles.len() - 1);

    for i in 1..candles.len() {
        let high = candles[i].high;
        let low = candles[i].low;
        let prev_high = candles[i - 1].high;
        let prev_low = candles[i - 1].low;

        trs.push(
            (high - low)
                .max((high - prev_high).abs())
                .max((low - prev_low).abs()),
        );

        let plus_dm = high - prev_high;
        let minus_dm = prev_low - low;
        if plus_dm > minus_dm && plus_dm > 0.0 {
            plus_dms.push(plus_dm);
            minus_dms.push(0.0);
        } else if minus_dm > plus_dm && minus_dm > 0.0 {
            plus_dms.push(0.0);
            minus_dms.push(minus_dm);
        } else {
            plus_dms.push(0.0);
            minus_dms.push(0.0);
        }
    }

    let mut smooth_tr = trs[..period].iter().sum::<f64>();
    let mut smooth_plus = plus_dms[..period].iter().sum::<f64>();
    let mut smooth_minus = minus_dms[..period].iter().sum::<f64>();

    let mut dxs = Vec::with_capacity(trs.len() - period + 1);
    let dx_of = |plus: f64, minus: f64, tr: f64| {
        let plus_di = plus / tr * 100.0;
        let minus_di = minus / tr * 100.0;
        (plus_di - minus_di).abs() / guard_zero(plus_di + minus_di) * 100.0
    };
    dxs.push(dx_of(smooth_plus, smooth_minus, smooth_tr));

    for i in period..trs.len() {
        smooth_tr = smooth_tr - smooth_tr / period as f64 + trs[i];
        smooth_plus = smooth_plus - smooth_plus / period as f64 + plus_dms[i];
        smooth_minus = smooth_minus - smooth_minus / period as f64 + minus_dms[i];
        dxs.push(dx_of(smooth_plus, smooth_minus, smooth_tr));
    }

    let mut adxs = Vec::with_capacity(dxs.len() - period + 1);
    adxs.push(dxs[..period].iter().sum::<f64>() / period as f64);
    for &dx in &dxs[period..] {
        let prev = *adxs.last().unwrap();
        adxs.push((prev * (period as f64 - 1.0) + dx) / period as f64);
    }
    adxs
}

/// Bollinger band series, one value per complete trailing window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BollingerBands {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

/// Middle band = SMA of closes; outer bands offset by `std_dev` population
/// standard deviations of the trailing window.
pub fn bollinger_bands(candles: &[Candle], period: usize, std_dev: f64) -> BollingerBands {
    if period == 0 || candles.len() < period {
        return BollingerBands::default();
    }
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let middle = sma(&closes, period);

    let mut upper = Vec::with_capacity(middle.len());
    let mut lower = Vec::with_capacity(middle.len());
    for (window, &avg) in closes.windows(period).zip(middle.iter()) {
        let variance =
            window.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / period as f64;
        let deviation = variance.sqrt();
        upper.push(avg + deviation * std_dev);
        lower.push(avg - deviation * std_dev);
    }

    BollingerBands { upper, middle, lower }
}

/// Stochastic RSI %K/%D series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StochRsi {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
}

/// Raw stochastic of the RSI over a `period`-length RSI window, then
/// %K = SMA(raw, k_period) and %D = SMA(%K, d_period).
pub fn stoch_rsi(candles: &[Candle], period: usize, k_period: usize, d_period: usize) -> StochRsi {
    let rsi_values = rsi(candles, period);
    if period == 0 || rsi_values.len() < period {
        return StochRsi::default();
    }

    let raw: Vec<f64> = rsi_values
        .windows(period)
        .map(|window| {
            let current = window[window.len() - 1];
            let high = window.iter().cloned().fold(f64::MIN, f64::max);
            let low = window.iter().cloned().fold(f64::MAX, f64::min);
            (current - low) / guard_zero(high - low) * 100.0
        })
        .collect();

    let k = sma(&raw, k_period);
    let d = sma(&k, d_period);
    StochRsi { k, d }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_candles(close: f64, n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| Candle {
                timestamp: i as i64 * 60_000,
                open: close,
                high: close,
                low: close,
                close,
                volume: 100.0,
            })
            .collect()
    }

    fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                timestamp: i as i64 * 60_000,
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 100.0,
            })
            .collect()
    }

    #[test]
    fn test_sma_known_values() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(sma(&values, 2), vec![1.5, 2.5, 3.5]);
        assert_eq!(sma(&values, 4), vec![2.5]);
        assert!(sma(&values, 5).is_empty());
        assert!(sma(&values, 0).is_empty());
    }

    #[test]
    fn test_ema_known_values() {
        // Seed = mean(1,2,3) = 2, multiplier = 0.5
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(ema(&values, 3), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_sma_ema_constant_series() {
        let values = vec![42.0; 30];
        for period in [1, 5, 14, 30] {
            for v in sma(&values, period) {
                assert!((v - 42.0).abs() < 1e-12);
            }
            for v in ema(&values, period) {
                assert!((v - 42.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_ema_output_length() {
        let values: Vec<f64> = (0..50).map(|i| i as f64).collect();
        assert_eq!(ema(&values, 21).len(), 50 - 21 + 1);
        assert_eq!(sma(&values, 21).len(), 50 - 21 + 1);
    }

    #[test]
    fn test_rsi_bounds() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.7).sin() * 10.0).collect();
        for v in rsi(&candles_from_closes(&closes), 14) {
            assert!((0.0..=100.0).contains(&v), "RSI out of range: {v}");
        }
    }

    #[test]
    fn test_rsi_monotone_limits() {
        // Large per-bar gains keep the zero-loss substitution negligible
        let rising: Vec<f64> = (0..60).map(|i| 1000.0 + i as f64 * 100.0).collect();
        let rsi_up = rsi(&candles_from_closes(&rising), 14);
        assert!(*rsi_up.last().unwrap() > 95.0);

        let falling: Vec<f64> = (0..60).map(|i| 10000.0 - i as f64 * 100.0).collect();
        let rsi_down = rsi(&candles_from_closes(&falling), 14);
        // Zero gains make rs = 0 exactly
        assert!(*rsi_down.last().unwrap() < 1e-9);
    }

    #[test]
    fn test_rsi_flat_series_uses_zero_guard() {
        // No gains, no losses: rs = 0 / 1 = 0 -> RSI 0, not NaN
        let values = rsi(&flat_candles(100.0, 30), 14);
        assert_eq!(values.len(), 30 - 14 + 1);
        for v in values {
            assert!(v.abs() < 1e-12);
        }
    }

    #[test]
    fn test_atr_non_negative_and_known() {
        let candles = candles_from_closes(&[10.0, 11.0, 12.0, 11.0, 10.0, 12.0, 13.0]);
        let values = atr(&candles, 3);
        assert_eq!(values.len(), 7 - 3 + 1);
        for v in values {
            assert!(v >= 0.0);
        }

        // Flat series: every true range is 0
        for v in atr(&flat_candles(50.0, 10), 5) {
            assert!(v.abs() < 1e-12);
        }
    }

    #[test]
    fn test_adx_non_negative_and_warmup() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0).collect();
        let candles = candles_from_closes(&closes);
        let values = adx(&candles, 14);
        assert!(!values.is_empty());
        for v in values {
            assert!(v >= 0.0);
        }

        // Below the 2*period warm-up the result is empty, not a panic
        assert!(adx(&candles[..27], 14).is_empty());
        assert!(!adx(&candles[..28], 14).is_empty());
    }

    #[test]
    fn test_bollinger_constant_series_collapses() {
        let bb = bollinger_bands(&flat_candles(75.0, 30), 20, 2.0);
        assert_eq!(bb.middle.len(), 30 - 20 + 1);
        for i in 0..bb.middle.len() {
            assert!((bb.middle[i] - 75.0).abs() < 1e-12);
            assert!((bb.upper[i] - 75.0).abs() < 1e-12);
            assert!((bb.lower[i] - 75.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_bollinger_band_ordering() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.9).cos() * 4.0).collect();
        let bb = bollinger_bands(&candles_from_closes(&closes), 20, 2.0);
        for i in 0..bb.middle.len() {
            assert!(bb.upper[i] >= bb.middle[i]);
            assert!(bb.middle[i] >= bb.lower[i]);
        }
    }

    #[test]
    fn test_stoch_rsi_bounds() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 + (i as f64 * 0.5).sin() * 8.0).collect();
        let stoch = stoch_rsi(&candles_from_closes(&closes), 14, 3, 3);
        assert!(!stoch.k.is_empty());
        assert!(!stoch.d.is_empty());
        for v in stoch.k.iter().chain(stoch.d.iter()) {
            assert!((0.0..=100.0).contains(v));
        }
        // %D is an SMA of %K, so it is strictly shorter
        assert_eq!(stoch.d.len(), stoch.k.len() - 3 + 1);
    }

    #[test]
    fn test_stoch_rsi_short_window_is_empty() {
        let stoch = stoch_rsi(&flat_candles(100.0, 15), 14, 3, 3);
        assert!(stoch.k.is_empty());
        assert!(stoch.d.is_empty());
    }

    #[test]
    fn test_idempotence_bit_identical() {
        let closes: Vec<f64> = (0..70).map(|i| 100.0 + (i as f64 * 1.3).sin() * 6.0).collect();
        let candles = candles_from_closes(&closes);

        let a = rsi(&candles, 14);
        let b = rsi(&candles, 14);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.to_bits(), y.to_bits());
        }

        let a = adx(&candles, 14);
        let b = adx(&candles, 14);
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
    }
}
