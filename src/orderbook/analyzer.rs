// Order Book Analyzer - microstructure metrics from one depth snapshot

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::core::types::{OrderBookData, PriceLevel};

/// Default volume walked through the book for price impact.
pub const DEFAULT_TARGET_VOLUME: f64 = 10.0;

// ============================================================================
// Metrics
// ============================================================================

/// Notional value resting on each side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SideLiquidity {
    pub bids: f64,
    pub asks: f64,
}

/// Raw level counts per side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideDepth {
    pub bids: usize,
    pub asks: usize,
}

/// Fractional price move needed to fill the target volume from top of book.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceImpact {
    pub buy: f64,
    pub sell: f64,
}

/// All metrics derived from one snapshot. Stateless and immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBookMetrics {
    pub bid_ask_imbalance: f64,
    pub liquidity: SideLiquidity,
    pub depth: SideDepth,
    pub price_impact: PriceImpact,
    pub support: f64,
    pub resistance: f64,
    pub current_price: f64,
    pub score: f64,
}

// ============================================================================
// Analysis
// ============================================================================

// Inverse-distance weighting: quantity near the mid counts almost fully,
// quantity far away is discounted by qty / (delta + 1).
fn bid_ask_imbalance(bids: &[PriceLevel], asks: &[PriceLevel], current_price: f64) -> f64 {
    let weighted_bids: f64 = bids
        .iter()
        .map(|level| level.quantity / (current_price - level.price + 1.0))
        .sum();
    let weighted_asks: f64 = asks
        .iter()
        .map(|level| level.quantity / (level.price - current_price + 1.0))
        .sum();
    (weighted_bids - weighted_asks) / (weighted_bids + weighted_asks)
}

fn liquidity(bids: &[PriceLevel], asks: &[PriceLevel]) -> SideLiquidity {
    SideLiquidity {
        bids: bids.iter().map(|l| l.price * l.quantity).sum(),
        asks: asks.iter().map(|l| l.price * l.quantity).sum(),
    }
}

// Walk one side accumulating quantity; impact is the fractional distance of
// the level that crosses the target from the best price, 0 if never crossed.
fn walk_impact(levels: &[PriceLevel], target_volume: f64) -> f64 {
    let best = levels[0].price;
    let mut accumulated = 0.0;
    for level in levels {
        accumulated += level.quantity;
        if accumulated >= target_volume {
            return (level.price - best).abs() / best;
        }
    }
    0.0
}

fn price_impact(bids: &[PriceLevel], asks: &[PriceLevel], target_volume: f64) -> PriceImpact {
    PriceImpact {
        buy: walk_impact(asks, target_volume),
        sell: walk_impact(bids, target_volume),
    }
}

// Bucket all quantity by price floored to 2 decimals, then pick the
// highest-volume bucket at or below the best bid (support) and at or above
// the best ask (resistance). Ties resolve to the lower price.
fn find_support_resistance(bids: &[PriceLevel], asks: &[PriceLevel]) -> (f64, f64) {
    let mut volume_by_price: BTreeMap<i64, f64> = BTreeMap::new();
    for level in bids.iter().chain(asks.iter()) {
        let bucket = (level.price * 100.0).floor() as i64;
        *volume_by_price.entry(bucket).or_insert(0.0) += level.quantity;
    }

    let mut sorted: Vec<(f64, f64)> = volume_by_price
        .into_iter()
        .map(|(bucket, volume)| (bucket as f64 / 100.0, volume))
        .collect();
    sorted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let best_bid = bids[0].price;
    let best_ask = asks[0].price;
    let support = sorted
        .iter()
        .find(|(price, _)| *price <= best_bid)
        .map_or(best_bid, |(price, _)| *price);
    let resistance = sorted
        .iter()
        .find(|(price, _)| *price >= best_ask)
        .map_or(best_ask, |(price, _)| *price);

    (support, resistance)
}

// Composite 0-10 score: imbalance magnitude up to 3 points, liquidity ratio
// +/-2 beyond 1.2/0.8, price impact comparison +/-3.
fn composite_score(metrics: &OrderBookMetrics) -> f64 {
    let mut score = (metrics.bid_ask_imbalance * 3.0).abs();

    let liquidity_ratio = metrics.liquidity.bids / metrics.liquidity.asks;
    if liquidity_ratio > 1.2 {
        score += 2.0;
    } else if liquidity_ratio < 0.8 {
        score -= 2.0;
    }

    if metrics.price_impact.buy < metrics.price_impact.sell {
        score += 3.0;
    } else if metrics.price_impact.sell < metrics.price_impact.buy {
        score -= 3.0;
    }

    score.clamp(0.0, 10.0)
}

/// Compute all microstructure metrics from one snapshot.
///
/// Precondition: non-empty bids and asks with the best level at index 0
/// (see [`OrderBookData`]). An all-zero-quantity book yields NaN imbalance.
pub fn analyze_order_book(book: &OrderBookData, target_volume: f64) -> OrderBookMetrics {
    let current_price = (book.bids[0].price + book.asks[0].price) / 2.0;
    let (support, resistance) = find_support_resistance(&book.bids, &book.asks);

    let mut metrics = OrderBookMetrics {
        bid_ask_imbalance: bid_ask_imbalance(&book.bids, &book.asks, current_price),
        liquidity: liquidity(&book.bids, &book.asks),
        depth: SideDepth {
            bids: book.bids.len(),
            asks: book.asks.len(),
        },
        price_impact: price_impact(&book.bids, &book.asks, target_volume),
        support,
        resistance,
        current_price,
        score: 0.0,
    };
    metrics.score = composite_score(&metrics);

    debug!(
        imbalance = metrics.bid_ask_imbalance,
        score = metrics.score,
        support = metrics.support,
        resistance = metrics.resistance,
        "Order book analyzed"
    );
    metrics
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(price: f64, quantity: f64) -> PriceLevel {
        PriceLevel::new(price, quantity)
    }

    fn book(bids: Vec<PriceLevel>, asks: Vec<PriceLevel>) -> OrderBookData {
        OrderBookData {
            bids,
            asks,
            timestamp: 1_700_000_000_000,
        }
    }

    fn symmetric_book() -> OrderBookData {
        book(
            vec![level(99.0, 10.0), level(98.0, 5.0)],
            vec![level(101.0, 10.0), level(102.0, 5.0)],
        )
    }

    #[test]
    fn test_symmetric_book_has_zero_imbalance() {
        let metrics = analyze_order_book(&symmetric_book(), DEFAULT_TARGET_VOLUME);
        assert!(metrics.bid_ask_imbalance.abs() < 1e-12);
        assert!((metrics.current_price - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_liquidity_and_depth() {
        let metrics = analyze_order_book(&symmetric_book(), DEFAULT_TARGET_VOLUME);
        assert!((metrics.liquidity.bids - (99.0 * 10.0 + 98.0 * 5.0)).abs() < 1e-9);
        assert!((metrics.liquidity.asks - (101.0 * 10.0 + 102.0 * 5.0)).abs() < 1e-9);
        assert_eq!(metrics.depth.bids, 2);
        assert_eq!(metrics.depth.asks, 2);
    }

    #[test]
    fn test_price_impact_walks_levels() {
        let b = book(
            vec![level(100.0, 4.0), level(99.0, 4.0), level(98.0, 4.0)],
            vec![level(101.0, 4.0), level(102.0, 4.0), level(103.0, 4.0)],
        );
        // Target 10 crosses on the third level of each side
        let metrics = analyze_order_book(&b, 10.0);
        assert!((metrics.price_impact.buy - (103.0 - 101.0) / 101.0).abs() < 1e-12);
        assert!((metrics.price_impact.sell - (100.0 - 98.0) / 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_price_impact_zero_when_target_unreachable() {
        let metrics = analyze_order_book(&symmetric_book(), 1000.0);
        assert_eq!(metrics.price_impact.buy, 0.0);
        assert_eq!(metrics.price_impact.sell, 0.0);
    }

    #[test]
    fn test_support_resistance_pick_volume_clusters() {
        let b = book(
            vec![level(100.0, 5.0), level(99.5, 50.0), level(99.0, 10.0)],
            vec![level(100.5, 5.0), level(101.0, 40.0), level(101.5, 10.0)],
        );
        let metrics = analyze_order_book(&b, DEFAULT_TARGET_VOLUME);
        assert!((metrics.support - 99.5).abs() < 1e-9);
        assert!((metrics.resistance - 101.0).abs() < 1e-9);
    }

    #[test]
    fn test_support_falls_back_to_best_bid() {
        // The only high-volume bucket is above the best bid, so it cannot be
        // support; the scan still finds the best bid's own bucket.
        let b = book(vec![level(100.0, 1.0)], vec![level(100.5, 100.0)]);
        let metrics = analyze_order_book(&b, DEFAULT_TARGET_VOLUME);
        assert!((metrics.support - 100.0).abs() < 1e-9);
        assert!((metrics.resistance - 100.5).abs() < 1e-9);
    }

    #[test]
    fn test_heavy_bid_book_scores_high() {
        let b = book(
            vec![level(100.0, 50.0), level(99.9, 30.0), level(99.8, 20.0)],
            vec![level(100.1, 10.0), level(100.2, 5.0), level(100.3, 5.0)],
        );
        let metrics = analyze_order_book(&b, DEFAULT_TARGET_VOLUME);
        assert!(metrics.bid_ask_imbalance > 0.2);
        assert!(metrics.liquidity.bids > metrics.liquidity.asks * 2.0);
        // imbalance leg (~2.0) + liquidity leg (+2); impact ties contribute 0
        assert!(metrics.score >= 3.5);
        assert!(metrics.score <= 10.0);
    }

    #[test]
    fn test_score_clamped_to_range() {
        let bid_heavy = book(
            vec![level(100.0, 500.0)],
            vec![level(100.1, 1.0), level(110.0, 500.0)],
        );
        let metrics = analyze_order_book(&bid_heavy, DEFAULT_TARGET_VOLUME);
        assert!((0.0..=10.0).contains(&metrics.score));

        let ask_heavy = book(
            vec![level(100.0, 1.0), level(90.0, 500.0)],
            vec![level(100.1, 500.0)],
        );
        let metrics = analyze_order_book(&ask_heavy, DEFAULT_TARGET_VOLUME);
        assert!((0.0..=10.0).contains(&metrics.score));
    }

    #[test]
    fn test_analysis_is_idempotent() {
        let b = book(
            vec![level(100.0, 50.0), level(99.9, 30.0)],
            vec![level(100.1, 10.0), level(100.2, 5.0)],
        );
        let a = analyze_order_book(&b, DEFAULT_TARGET_VOLUME);
        let c = analyze_order_book(&b, DEFAULT_TARGET_VOLUME);
        assert_eq!(a.bid_ask_imbalance.to_bits(), c.bid_ask_imbalance.to_bits());
        assert_eq!(a.score.to_bits(), c.score.to_bits());
    }
}
