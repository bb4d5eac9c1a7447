//! Rule engine for multi-criteria pull decisions.
//!
//! Composes priority rules with configurable evaluation modes and
//! tie-breaking, producing a total, deterministic order over queued
//! products.
//!
//! # Reference
//! Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use std::sync::Arc;

use super::{DispatchContext, DispatchRule, RuleScore};
use crate::models::Product;

/// How multiple rules are combined.
#[derive(Debug, Clone, Default)]
pub enum EvaluationMode {
    /// Apply rules in sequence; use the next rule only on ties.
    #[default]
    Sequential,
    /// Compute the weighted sum of all positively-weighted rule scores;
    /// zero-weight rules still break ties.
    Weighted,
}

/// How ties are broken after all rules are exhausted.
#[derive(Debug, Clone, Default)]
pub enum TieBreaker {
    /// Leave tied products in input order.
    #[default]
    NextRule,
    /// Deterministic by serial number (lexicographic).
    BySerial,
}

#[derive(Clone)]
struct WeightedRule {
    rule: Arc<dyn DispatchRule>,
    weight: f64,
}

/// A composable rule engine for product prioritization.
///
/// Supports sequential multi-layer evaluation (primary rule →
/// tie-breaker) and weighted combination. In both modes, ties within
/// `epsilon` fall through to the zero-weight tie-breaker chain, then to
/// the final tie-breaker, so a fully configured engine yields one
/// deterministic order.
///
/// # Example
/// ```
/// use flowline::dispatching::{PriorityEngine, rules};
///
/// let engine = PriorityEngine::new()
///     .with_rule(rules::FewestRemaining)
///     .with_tie_breaker(rules::ArrivalOrder);
/// ```
#[derive(Clone)]
pub struct PriorityEngine {
    rules: Vec<WeightedRule>,
    mode: EvaluationMode,
    tie_breaker: TieBreaker,
    epsilon: f64,
}

impl PriorityEngine {
    /// Creates an empty engine.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            mode: EvaluationMode::Sequential,
            tie_breaker: TieBreaker::NextRule,
            epsilon: 1e-9,
        }
    }

    /// Adds a primary rule (weight 1.0).
    pub fn with_rule<R: DispatchRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight: 1.0,
        });
        self
    }

    /// Adds a weighted rule.
    pub fn with_weighted_rule<R: DispatchRule + 'static>(mut self, rule: R, weight: f64) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight,
        });
        self
    }

    /// Adds a tie-breaking rule (weight 0.0, consulted only on ties).
    pub fn with_tie_breaker<R: DispatchRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight: 0.0,
        });
        self
    }

    /// Sets the evaluation mode.
    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the final tie-breaking strategy.
    pub fn with_final_tie_breaker(mut self, tie_breaker: TieBreaker) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    /// Sorts products by priority (highest priority first).
    ///
    /// Returns indices into the input slice.
    pub fn sort_indices(
        &self,
        products: &[&Product],
        context: &DispatchContext,
    ) -> Vec<usize> {
        if products.is_empty() {
            return Vec::new();
        }

        let mut indices: Vec<usize> = (0..products.len()).collect();
        indices.sort_by(|&a, &b| self.compare(products[a], products[b], context));
        indices
    }

    /// Returns the index of the highest-priority product.
    pub fn select_best(
        &self,
        products: &[&Product],
        context: &DispatchContext,
    ) -> Option<usize> {
        self.sort_indices(products, context).first().copied()
    }

    /// Scores a single product under each configured rule, scaled by its
    /// weight.
    pub fn evaluate(&self, product: &Product, context: &DispatchContext) -> Vec<RuleScore> {
        self.rules
            .iter()
            .map(|wr| wr.rule.evaluate(product, context) * wr.weight)
            .collect()
    }

    /// Compares two products under this engine's configuration.
    ///
    /// `Less` means `a` has higher priority. Total and deterministic for
    /// a fixed context, which lets callers compare candidates across
    /// stations with the same policy used to rank one queue.
    pub fn compare(
        &self,
        a: &Product,
        b: &Product,
        context: &DispatchContext,
    ) -> std::cmp::Ordering {
        let primary = match self.mode {
            EvaluationMode::Sequential => std::cmp::Ordering::Equal,
            EvaluationMode::Weighted => {
                let score_a = self.weighted_score(a, context);
                let score_b = self.weighted_score(b, context);
                if (score_a - score_b).abs() > self.epsilon {
                    score_a
                        .partial_cmp(&score_b)
                        .unwrap_or(std::cmp::Ordering::Equal)
                } else {
                    std::cmp::Ordering::Equal
                }
            }
        };
        if primary != std::cmp::Ordering::Equal {
            return primary;
        }

        // Sequential chain; in Weighted mode only the zero-weight
        // tie-breaker rules remain decisive here.
        for wr in &self.rules {
            if matches!(self.mode, EvaluationMode::Weighted) && wr.weight != 0.0 {
                continue;
            }
            let score_a = wr.rule.evaluate(a, context);
            let score_b = wr.rule.evaluate(b, context);
            if (score_a - score_b).abs() > self.epsilon {
                return score_a
                    .partial_cmp(&score_b)
                    .unwrap_or(std::cmp::Ordering::Equal);
            }
        }

        match self.tie_breaker {
            TieBreaker::NextRule => std::cmp::Ordering::Equal,
            TieBreaker::BySerial => a.serial_number.cmp(&b.serial_number),
        }
    }

    fn weighted_score(&self, product: &Product, context: &DispatchContext) -> f64 {
        self.rules
            .iter()
            .map(|wr| wr.rule.evaluate(product, context) * wr.weight)
            .sum()
    }
}

impl Default for PriorityEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PriorityEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriorityEngine")
            .field(
                "rules",
                &self
                    .rules
                    .iter()
                    .map(|r| format!("{}(w={})", r.rule.name(), r.weight))
                    .collect::<Vec<_>>(),
            )
            .field("mode", &self.mode)
            .finish()
    }
}
