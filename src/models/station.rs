//! Workstation model.
//!
//! A workstation admits products into a bounded FIFO queue and processes
//! at most one product at a time, staffed by at most one worker. Queue
//! state and occupancy state are independent: the queue may hold entries
//! while the station is busy.
//!
//! # Reference
//! Hopp & Spearman (2008), "Factory Physics", Ch. 8: Variability Basics

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::{Product, StationId};

/// A workstation with a bounded admission queue.
///
/// The queue holds serial numbers; the products themselves are owned by
/// the line registry. `current_product`/`current_worker` are written only
/// through [`begin_assignment`](Self::begin_assignment) and
/// [`clear_current_assignment`](Self::clear_current_assignment), both
/// driven by the dispatcher so the worker-side invariant moves in the
/// same step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workstation {
    /// Unique station identifier.
    pub station_id: StationId,
    /// Human-readable name.
    pub name: String,
    /// Queue capacity bound. Must be at least 1.
    pub max_queue_size: usize,
    /// Serial numbers awaiting this station, FIFO by admission.
    pub queue: VecDeque<String>,
    /// Serial number of the product being processed, if any.
    pub current_product: Option<String>,
    /// Employee ID of the staffing worker, if any.
    pub current_worker: Option<String>,
}

impl Workstation {
    /// Creates a new idle station with capacity 1.
    pub fn new(station_id: StationId) -> Self {
        Self {
            station_id,
            name: String::new(),
            max_queue_size: 1,
            queue: VecDeque::new(),
            current_product: None,
            current_worker: None,
        }
    }

    /// Sets the station name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the queue capacity.
    pub fn with_max_queue_size(mut self, max_queue_size: usize) -> Self {
        self.max_queue_size = max_queue_size;
        self
    }

    /// Number of products waiting in the queue.
    pub fn queue_length(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is at capacity.
    pub fn is_queue_full(&self) -> bool {
        self.queue.len() >= self.max_queue_size
    }

    /// Queue congestion in `0.0..=1.0` (length over capacity).
    pub fn queue_pressure(&self) -> f64 {
        if self.max_queue_size == 0 {
            return 1.0;
        }
        self.queue.len() as f64 / self.max_queue_size as f64
    }

    /// Idle iff no product and no worker occupy the station.
    pub fn is_idle(&self) -> bool {
        self.current_product.is_none() && self.current_worker.is_none()
    }

    /// Admits a product to the tail of the queue.
    ///
    /// On success stamps the product's queue-arrival timestamp and
    /// returns `true`. Returns `false` when the queue is full; the
    /// caller still holds the product and may retry, reroute, or block
    /// upstream. Nothing is lost.
    pub fn add_to_queue(&mut self, product: &mut Product, now_ms: i64) -> bool {
        if self.is_queue_full() {
            return false;
        }
        product.queue_arrival_ms = Some(now_ms);
        self.queue.push_back(product.serial_number.clone());
        true
    }

    /// Removes the first queue entry matching the product's serial.
    ///
    /// On success clears the product's queue-arrival timestamp and
    /// returns `true`. Returns `false` when no entry matches, a normal
    /// outcome when a concurrent dispatch already claimed the product.
    pub fn remove_from_queue(&mut self, product: &mut Product) -> bool {
        match self.queue.iter().position(|s| *s == product.serial_number) {
            Some(idx) => {
                self.queue.remove(idx);
                product.queue_arrival_ms = None;
                true
            }
            None => false,
        }
    }

    /// Serial number at the head of the queue, without removing it.
    pub fn front_lookup(&self) -> Option<&str> {
        self.queue.front().map(String::as_str)
    }

    /// Occupies the station with a product and a worker.
    ///
    /// The caller (dispatcher) must have already bound the worker's
    /// assignment fields in the same step.
    pub fn begin_assignment(
        &mut self,
        serial_number: impl Into<String>,
        employee_id: impl Into<String>,
    ) {
        self.current_product = Some(serial_number.into());
        self.current_worker = Some(employee_id.into());
    }

    /// Clears the occupant and staffing worker, leaving the station idle.
    ///
    /// The caller must release the worker's assignment fields in the same
    /// step to keep both invariants consistent.
    pub fn clear_current_assignment(&mut self) {
        self.current_product = None;
        self.current_worker = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_station(capacity: usize) -> Workstation {
        Workstation::new(1)
            .with_name("Drill")
            .with_max_queue_size(capacity)
    }

    fn make_product(serial: &str) -> Product {
        Product::new(serial).with_route(vec![1, 2]).with_position(0)
    }

    #[test]
    fn test_station_builder() {
        let s = make_station(3);
        assert_eq!(s.station_id, 1);
        assert_eq!(s.name, "Drill");
        assert_eq!(s.max_queue_size, 3);
        assert!(s.is_idle());
        assert_eq!(s.queue_length(), 0);
    }

    #[test]
    fn test_add_then_front_lookup() {
        let mut s = make_station(2);
        let mut p = make_product("SN-1");

        assert!(s.add_to_queue(&mut p, 700));
        assert_eq!(s.front_lookup(), Some("SN-1"));
        assert_eq!(p.queue_arrival_ms, Some(700));
    }

    #[test]
    fn test_queue_capacity_rejection() {
        let mut s = make_station(1);
        let mut p1 = make_product("SN-1");
        let mut p2 = make_product("SN-2");

        assert!(s.add_to_queue(&mut p1, 0));
        assert!(!s.add_to_queue(&mut p2, 10));
        assert_eq!(s.queue_length(), 1);
        assert!(s.is_queue_full());
        // Rejected product was never stamped
        assert_eq!(p2.queue_arrival_ms, None);
    }

    #[test]
    fn test_queue_never_exceeds_capacity() {
        let mut s = make_station(2);
        let mut products: Vec<Product> =
            (0..5).map(|i| make_product(&format!("SN-{i}"))).collect();

        for (i, p) in products.iter_mut().enumerate() {
            s.add_to_queue(p, i as i64);
            assert!(s.queue_length() <= s.max_queue_size);
        }
        s.remove_from_queue(&mut products[0]);
        assert_eq!(s.queue_length(), 1);
        assert!(s.add_to_queue(&mut products[3], 99));
        assert_eq!(s.queue_length(), 2);
    }

    #[test]
    fn test_remove_from_queue() {
        let mut s = make_station(3);
        let mut p1 = make_product("SN-1");
        let mut p2 = make_product("SN-2");
        s.add_to_queue(&mut p1, 0);
        s.add_to_queue(&mut p2, 5);

        assert!(s.remove_from_queue(&mut p1));
        assert_eq!(p1.queue_arrival_ms, None);
        assert_eq!(s.front_lookup(), Some("SN-2"));
    }

    #[test]
    fn test_remove_absent_is_benign() {
        let mut s = make_station(2);
        let mut queued = make_product("SN-1");
        let mut never_added = make_product("SN-9");
        s.add_to_queue(&mut queued, 0);

        assert!(!s.remove_from_queue(&mut never_added));
        // Queue unchanged: length and order
        assert_eq!(s.queue_length(), 1);
        assert_eq!(s.front_lookup(), Some("SN-1"));
    }

    #[test]
    fn test_queue_is_fifo() {
        let mut s = make_station(3);
        for (i, serial) in ["SN-a", "SN-b", "SN-c"].iter().enumerate() {
            let mut p = make_product(serial);
            s.add_to_queue(&mut p, i as i64);
        }
        assert_eq!(s.queue.iter().collect::<Vec<_>>(), ["SN-a", "SN-b", "SN-c"]);
    }

    #[test]
    fn test_queue_pressure() {
        let mut s = make_station(4);
        assert!((s.queue_pressure() - 0.0).abs() < 1e-10);
        let mut p1 = make_product("SN-1");
        let mut p2 = make_product("SN-2");
        s.add_to_queue(&mut p1, 0);
        s.add_to_queue(&mut p2, 0);
        assert!((s.queue_pressure() - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_occupancy_transitions() {
        let mut s = make_station(1);
        assert!(s.is_idle());

        s.begin_assignment("SN-1", "E-1");
        assert!(!s.is_idle());
        assert_eq!(s.current_product.as_deref(), Some("SN-1"));
        assert_eq!(s.current_worker.as_deref(), Some("E-1"));

        s.clear_current_assignment();
        assert!(s.is_idle());
        assert!(s.current_product.is_none());
        assert!(s.current_worker.is_none());
    }

    #[test]
    fn test_queue_independent_of_occupancy() {
        let mut s = make_station(2);
        s.begin_assignment("SN-0", "E-1");
        let mut p = make_product("SN-1");
        assert!(s.add_to_queue(&mut p, 3));
        assert!(!s.is_idle());
        assert_eq!(s.queue_length(), 1);
    }
}
