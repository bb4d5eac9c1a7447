//! Dispatch priority rules and the rule engine.
//!
//! Provides priority rules over queued products (fewest remaining
//! operations, downstream pressure, arrival order) and a composable
//! engine combining them for pull decisions.
//!
//! # Usage
//!
//! ```
//! use flowline::dispatching::{PriorityEngine, rules};
//!
//! let engine = PriorityEngine::new()
//!     .with_rule(rules::FewestRemaining)
//!     .with_tie_breaker(rules::ArrivalOrder);
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

mod context;
mod engine;
pub mod rules;

pub use context::DispatchContext;
pub use engine::{EvaluationMode, PriorityEngine, TieBreaker};

use crate::models::Product;
use std::fmt::Debug;

/// Default number of downstream stations examined for pressure.
pub const DEFAULT_LOOKAHEAD: usize = 2;

/// Score returned by a priority rule.
///
/// Lower scores = higher priority (pulled first).
pub type RuleScore = f64;

/// A priority rule that scores queued products at a station.
///
/// # Score Convention
/// **Lower score = higher priority.** Rules return smaller values for
/// products that should be pulled first.
pub trait DispatchRule: Send + Sync + Debug {
    /// Rule name (e.g., "FRO", "DQP").
    fn name(&self) -> &'static str;

    /// Scores a queued product against the current line snapshot.
    ///
    /// Returns a score where lower = higher priority.
    fn evaluate(&self, product: &Product, context: &DispatchContext) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
