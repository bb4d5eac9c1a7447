//! Built-in priority rules.
//!
//! # Categories
//!
//! - **Work remaining**: FRO, MRO
//! - **Congestion**: DQP
//! - **Arrival**: FIFO
//!
//! # Score Convention
//! All rules return lower scores for higher-priority products.
//!
//! # References
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use super::{DispatchContext, DispatchRule, RuleScore, DEFAULT_LOOKAHEAD};
use crate::models::Product;

// ======================== Work-remaining rules ========================

/// Fewest Remaining Operations.
///
/// Prioritizes products closest to leaving the line. Minimizes total
/// remaining operations across in-progress products (WIP age and
/// line-exit latency).
#[derive(Debug, Clone, Copy)]
pub struct FewestRemaining;

impl DispatchRule for FewestRemaining {
    fn name(&self) -> &'static str {
        "FRO"
    }

    fn evaluate(&self, product: &Product, _context: &DispatchContext) -> RuleScore {
        product.remaining_operations() as f64
    }

    fn description(&self) -> &'static str {
        "Fewest Remaining Operations"
    }
}

/// Most Remaining Operations.
///
/// The opposite direction: prioritizes products with the longest route
/// ahead. Prevents starvation of long-route products.
#[derive(Debug, Clone, Copy)]
pub struct MostRemaining;

impl DispatchRule for MostRemaining {
    fn name(&self) -> &'static str {
        "MRO"
    }

    fn evaluate(&self, product: &Product, _context: &DispatchContext) -> RuleScore {
        -(product.remaining_operations() as f64)
    }

    fn description(&self) -> &'static str {
        "Most Remaining Operations"
    }
}

// ======================== Congestion rule ========================

/// Downstream Queue Pressure.
///
/// Scores a product by the mean congestion of the next stations on its
/// route. A product whose downstream path is near capacity is
/// deprioritized, so already-congested stations are not fed further.
#[derive(Debug, Clone, Copy)]
pub struct DownstreamPressure {
    /// Stations ahead to examine (default: 2).
    pub lookahead: usize,
}

impl Default for DownstreamPressure {
    fn default() -> Self {
        Self {
            lookahead: DEFAULT_LOOKAHEAD,
        }
    }
}

impl DownstreamPressure {
    /// Creates the rule with a custom lookahead.
    pub fn with_lookahead(lookahead: usize) -> Self {
        Self { lookahead }
    }
}

impl DispatchRule for DownstreamPressure {
    fn name(&self) -> &'static str {
        "DQP"
    }

    fn evaluate(&self, product: &Product, context: &DispatchContext) -> RuleScore {
        let next = product.next_stations(self.lookahead);
        if next.is_empty() {
            return 0.0;
        }
        let total: f64 = next.iter().map(|&id| context.pressure_at(id)).sum();
        total / next.len() as f64
    }

    fn description(&self) -> &'static str {
        "Downstream Queue Pressure"
    }
}

// ======================== Arrival rule ========================

/// First In First Out.
///
/// Prioritizes products by queue-arrival timestamp. Products without a
/// stamp rank last.
#[derive(Debug, Clone, Copy)]
pub struct ArrivalOrder;

impl DispatchRule for ArrivalOrder {
    fn name(&self) -> &'static str {
        "FIFO"
    }

    fn evaluate(&self, product: &Product, _context: &DispatchContext) -> RuleScore {
        product
            .queue_arrival_ms
            .map(|ms| ms as f64)
            .unwrap_or(f64::MAX)
    }

    fn description(&self) -> &'static str {
        "First In First Out"
    }
}
