// Order Book Interpretation - maps metrics to a directional signal

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::analyzer::OrderBookMetrics;
use crate::core::types::Signal;

// Thresholds are load-bearing for signal parity; do not retune casually.
const LEVEL_PROXIMITY: f64 = 0.001;
const IMBALANCE_THRESHOLD: f64 = 0.2;
const LIQUIDITY_RATIO_HIGH: f64 = 1.2;
const LIQUIDITY_RATIO_LOW: f64 = 0.8;
const ALERT_BULLISH_SCORE: f64 = 8.0;
const ALERT_BEARISH_SCORE: f64 = 2.0;
const BUY_SCORE: f64 = 6.0;
const SELL_SCORE: f64 = 4.0;

/// Qualitative read of one metrics snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpretation {
    pub signal: Signal,
    pub confidence: f64,
    pub reason: String,
    pub price_action: String,
    pub alert: Option<String>,
}

/// Map metrics to a directional interpretation.
///
/// Starts from the composite score, nudges it for proximity to support or
/// resistance, then adjusts for imbalance and liquidity while collecting
/// reason fragments. The adjusted score drives alert text, the final
/// signal, and confidence.
pub fn interpret_metrics(metrics: &OrderBookMetrics) -> Interpretation {
    let mut score = metrics.score;
    let mut reasons: Vec<&str> = Vec::new();
    let current_price = metrics.current_price;

    let mut price_action = "Between levels";
    let support_distance = (current_price - metrics.support).abs() / current_price;
    let resistance_distance = (current_price - metrics.resistance).abs() / current_price;

    if support_distance < LEVEL_PROXIMITY {
        price_action = "At support";
        score += 1.0;
    } else if resistance_distance < LEVEL_PROXIMITY {
        price_action = "At resistance";
        score -= 1.0;
    }

    if metrics.bid_ask_imbalance > IMBALANCE_THRESHOLD {
        reasons.push("Strong buying pressure");
        score += 2.0;
    } else if metrics.bid_ask_imbalance < -IMBALANCE_THRESHOLD {
        reasons.push("Strong selling pressure");
        score -= 2.0;
    }

    let liquidity_ratio = metrics.liquidity.bids / metrics.liquidity.asks;
    if liquidity_ratio > LIQUIDITY_RATIO_HIGH {
        reasons.push("Higher bid liquidity");
        score += 1.0;
    } else if liquidity_ratio < LIQUIDITY_RATIO_LOW {
        reasons.push("Higher ask liquidity");
        score -= 1.0;
    }

    let alert = if score >= ALERT_BULLISH_SCORE {
        Some("Strong bullish signal detected!".to_string())
    } else if score <= ALERT_BEARISH_SCORE {
        Some("Strong bearish signal detected!".to_string())
    } else {
        None
    };

    let signal = if score >= BUY_SCORE {
        Signal::Buy
    } else if score <= SELL_SCORE {
        Signal::Sell
    } else {
        Signal::Neutral
    };

    let confidence = (score.abs() / 10.0).min(1.0);

    debug!(
        signal = %signal,
        confidence = confidence,
        adjusted_score = score,
        price_action = price_action,
        "Order book interpreted"
    );

    Interpretation {
        signal,
        confidence,
        reason: reasons.join(", "),
        price_action: price_action.to_string(),
        alert,
    }
}
