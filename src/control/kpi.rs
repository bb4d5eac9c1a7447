//! Line condition metrics (KPIs).
//!
//! Condenses line state into the indicators the surrounding system
//! exports: work-in-progress, queue load, and staffing shortfalls.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | WIP | Products queued or on a station |
//! | Total Remaining Ops | Sum of remaining operations |
//! | Queued | Products waiting across all queues |
//! | Avg Occupancy | Mean queue length over capacity |
//! | Idle w/ Backlog | Idle stations with a non-empty queue |
//! | Staffing Shortfalls | Backlogged stations with no eligible worker |
//!
//! # Reference
//! Hopp & Spearman (2008), "Factory Physics", Ch. 7: Basic Factory Dynamics

use std::collections::HashMap;

use crate::models::{Line, StationId};

/// Line condition indicators.
#[derive(Debug, Clone)]
pub struct LineKpi {
    /// Products currently queued or occupying a station.
    pub wip_count: usize,
    /// Sum of remaining operations across all registered products.
    pub total_remaining_operations: usize,
    /// Products waiting across all queues.
    pub queued_count: usize,
    /// Mean queue occupancy across stations (0.0..=1.0).
    pub avg_queue_occupancy: f64,
    /// Per-station queue occupancy.
    pub occupancy_by_station: HashMap<StationId, f64>,
    /// Stations currently processing a product.
    pub busy_stations: usize,
    /// Idle stations holding queued work.
    pub idle_with_backlog: usize,
    /// Idle, backlogged stations with no available competent worker.
    /// Non-zero values signal a staffing gap, not a fault.
    pub staffing_shortfalls: usize,
    /// Workers free to take an assignment.
    pub available_workers: usize,
}

impl LineKpi {
    /// Computes KPIs from the current line state.
    pub fn calculate(line: &Line) -> Self {
        let mut wip_count = 0;
        let mut total_remaining_operations = 0;
        for product in line.products.values() {
            if product.queue_arrival_ms.is_some() || product.current_station.is_some() {
                wip_count += 1;
            }
            total_remaining_operations += product.remaining_operations();
        }

        let mut queued_count = 0;
        let mut busy_stations = 0;
        let mut idle_with_backlog = 0;
        let mut staffing_shortfalls = 0;
        let mut occupancy_by_station = HashMap::new();

        for station in line.stations.values() {
            queued_count += station.queue_length();
            occupancy_by_station.insert(station.station_id, station.queue_pressure());
            if !station.is_idle() {
                busy_stations += 1;
            } else if !station.queue.is_empty() {
                idle_with_backlog += 1;
                if line.eligible_workers(station.station_id).is_empty() {
                    staffing_shortfalls += 1;
                }
            }
        }

        let avg_queue_occupancy = if occupancy_by_station.is_empty() {
            0.0
        } else {
            let sum: f64 = occupancy_by_station.values().sum();
            sum / occupancy_by_station.len() as f64
        };

        let available_workers = line.workers.values().filter(|w| w.is_available).count();

        Self {
            wip_count,
            total_remaining_operations,
            queued_count,
            avg_queue_occupancy,
            occupancy_by_station,
            busy_stations,
            idle_with_backlog,
            staffing_shortfalls,
            available_workers,
        }
    }

    /// Whether the line is within the given load thresholds.
    pub fn meets_thresholds(&self, max_avg_occupancy: f64, max_shortfalls: usize) -> bool {
        self.avg_queue_occupancy <= max_avg_occupancy
            && self.staffing_shortfalls <= max_shortfalls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::Dispatcher;
    use crate::models::{Product, Worker, Workstation};

    fn make_line() -> Line {
        let mut line = Line::new()
            .with_station(Workstation::new(1).with_max_queue_size(2))
            .with_station(Workstation::new(2).with_max_queue_size(4))
            .with_worker(Worker::new("E-1").with_competency(1))
            .with_worker(Worker::new("E-2").with_competency(1))
            .with_product(Product::new("SN-1").with_route(vec![1, 2]).with_position(0))
            .with_product(Product::new("SN-2").with_route(vec![1]).with_position(0))
            .with_product(Product::new("SN-3").with_route(vec![2]).with_position(0));
        line.admit("SN-1", 1, 0).unwrap();
        line.admit("SN-2", 1, 1).unwrap();
        line.admit("SN-3", 2, 2).unwrap();
        line
    }

    #[test]
    fn test_kpi_counts() {
        let line = make_line();
        let kpi = LineKpi::calculate(&line);

        assert_eq!(kpi.wip_count, 3);
        // 2 + 1 + 1 remaining operations
        assert_eq!(kpi.total_remaining_operations, 4);
        assert_eq!(kpi.queued_count, 3);
        assert_eq!(kpi.busy_stations, 0);
        assert_eq!(kpi.idle_with_backlog, 2);
        // Station 2 has queued work and no competent worker
        assert_eq!(kpi.staffing_shortfalls, 1);
        assert_eq!(kpi.available_workers, 2);
    }

    #[test]
    fn test_kpi_occupancy() {
        let line = make_line();
        let kpi = LineKpi::calculate(&line);

        // Station 1: 2/2 = 1.0, station 2: 1/4 = 0.25
        assert!((kpi.occupancy_by_station[&1] - 1.0).abs() < 1e-10);
        assert!((kpi.occupancy_by_station[&2] - 0.25).abs() < 1e-10);
        assert!((kpi.avg_queue_occupancy - 0.625).abs() < 1e-10);
    }

    #[test]
    fn test_kpi_after_dispatch() {
        let mut line = make_line();
        Dispatcher::new().run_pass(&mut line, 10);
        let kpi = LineKpi::calculate(&line);

        // One product pulled into station 1, one worker consumed
        assert_eq!(kpi.busy_stations, 1);
        assert_eq!(kpi.queued_count, 2);
        assert_eq!(kpi.wip_count, 3);
        assert_eq!(kpi.available_workers, 1);
    }

    #[test]
    fn test_kpi_empty_line() {
        let kpi = LineKpi::calculate(&Line::new());
        assert_eq!(kpi.wip_count, 0);
        assert_eq!(kpi.queued_count, 0);
        assert!((kpi.avg_queue_occupancy - 0.0).abs() < 1e-10);
        assert_eq!(kpi.staffing_shortfalls, 0);
    }

    #[test]
    fn test_meets_thresholds() {
        let line = make_line();
        let kpi = LineKpi::calculate(&line);
        assert!(kpi.meets_thresholds(0.7, 1));
        assert!(!kpi.meets_thresholds(0.5, 1));
        assert!(!kpi.meets_thresholds(0.7, 0));
    }
}
