//! Line snapshot for priority rule evaluation.

use std::collections::HashMap;

use crate::models::{Line, StationId};

/// Immutable line state passed to priority rules.
///
/// Carries the step clock and the congestion of every station queue, so
/// rules never touch the line directly and two evaluations over the same
/// snapshot always agree.
///
/// All times are in milliseconds relative to the driving loop's epoch.
#[derive(Debug, Clone, Default)]
pub struct DispatchContext {
    /// Current step time (ms).
    pub now_ms: i64,
    /// Queue congestion per station (length / capacity, 0.0..=1.0).
    pub station_pressure: HashMap<StationId, f64>,
}

impl DispatchContext {
    /// Creates a context at the given time with no congestion data.
    pub fn at_time(now_ms: i64) -> Self {
        Self {
            now_ms,
            ..Default::default()
        }
    }

    /// Sets the congestion of one station.
    pub fn with_pressure(mut self, station_id: StationId, pressure: f64) -> Self {
        self.station_pressure.insert(station_id, pressure);
        self
    }

    /// Captures the congestion of every station on the line.
    pub fn snapshot(line: &Line, now_ms: i64) -> Self {
        let station_pressure = line
            .stations
            .values()
            .map(|s| (s.station_id, s.queue_pressure()))
            .collect();
        Self {
            now_ms,
            station_pressure,
        }
    }

    /// Congestion of a station, 0.0 when unknown.
    pub fn pressure_at(&self, station_id: StationId) -> f64 {
        self.station_pressure.get(&station_id).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Product, Workstation};

    #[test]
    fn test_snapshot_captures_all_stations() {
        let mut line = Line::new()
            .with_station(Workstation::new(1).with_max_queue_size(2))
            .with_station(Workstation::new(2).with_max_queue_size(4))
            .with_product(Product::new("SN-1").with_route(vec![1]).with_position(0));
        line.admit("SN-1", 1, 0).unwrap();

        let ctx = DispatchContext::snapshot(&line, 500);
        assert_eq!(ctx.now_ms, 500);
        assert!((ctx.pressure_at(1) - 0.5).abs() < 1e-10);
        assert!((ctx.pressure_at(2) - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_unknown_station_has_zero_pressure() {
        let ctx = DispatchContext::at_time(0).with_pressure(1, 0.75);
        assert!((ctx.pressure_at(1) - 0.75).abs() < 1e-10);
        assert!((ctx.pressure_at(9) - 0.0).abs() < 1e-10);
    }
}
