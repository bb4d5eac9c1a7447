//! Line control: the dispatcher pass and line KPIs.
//!
//! The [`Dispatcher`] is invoked once per step by the external driving
//! loop. It reads line state, ranks queued products with the configured
//! [`PriorityEngine`](crate::dispatching::PriorityEngine), and commits
//! (station, product, worker) assignments as atomic two-sided
//! transitions. [`LineKpi`] condenses line state into the metrics the
//! surrounding system exports.

mod kpi;
mod pass;

pub use kpi::LineKpi;
pub use pass::{CompletionOutcome, DispatchError, Dispatcher};
