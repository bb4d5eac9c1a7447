//! Dispatch pass report model.
//!
//! One dispatcher pass produces a report: the assignments committed this
//! step and the stations left waiting for staff. The report is the
//! dispatcher's answer to the driving loop; the line itself already
//! carries the mutated state.

use serde::{Deserialize, Serialize};

use super::StationId;

/// Outcome of one dispatcher pass over the line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PassReport {
    /// Step timestamp the pass ran at (ms).
    pub now_ms: i64,
    /// Assignments committed, in commit order.
    pub decisions: Vec<DispatchDecision>,
    /// Stations with queued work but no eligible worker this step.
    pub shortfalls: Vec<StaffingShortfall>,
}

/// A committed (station, product, worker) assignment.
///
/// Remaining operations and queue wait are denormalized at decision time
/// for reporting, since the product advances afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchDecision {
    /// Station that pulled the product.
    pub station_id: StationId,
    /// Product pulled from the queue.
    pub serial_number: String,
    /// Worker bound to the station.
    pub employee_id: String,
    /// Commit timestamp (ms).
    pub decided_ms: i64,
    /// Operations left on the product's route at decision time.
    pub remaining_operations: usize,
    /// Time the product spent in the queue (ms).
    pub queue_wait_ms: i64,
}

/// A station whose queued work found no available competent worker.
///
/// A steady-state, recoverable condition: the queue holds (bounded by
/// capacity) and a later pass retries. Persistent shortfalls signal a
/// staffing gap to the surrounding system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffingShortfall {
    /// Station left idle.
    pub station_id: StationId,
    /// Products waiting at that station.
    pub queued: usize,
}

impl PassReport {
    /// Creates an empty report for the given step.
    pub fn new(now_ms: i64) -> Self {
        Self {
            now_ms,
            decisions: Vec::new(),
            shortfalls: Vec::new(),
        }
    }

    /// Records a decision.
    pub fn add_decision(&mut self, decision: DispatchDecision) {
        self.decisions.push(decision);
    }

    /// Records a shortfall.
    pub fn add_shortfall(&mut self, shortfall: StaffingShortfall) {
        self.shortfalls.push(shortfall);
    }

    /// Number of assignments committed.
    pub fn decision_count(&self) -> usize {
        self.decisions.len()
    }

    /// The decision that occupied a station, if any.
    pub fn decision_for_station(&self, station_id: StationId) -> Option<&DispatchDecision> {
        self.decisions.iter().find(|d| d.station_id == station_id)
    }

    /// The decision that pulled a product, if any.
    pub fn decision_for_product(&self, serial_number: &str) -> Option<&DispatchDecision> {
        self.decisions.iter().find(|d| d.serial_number == serial_number)
    }

    /// Whether any station went unstaffed despite queued work.
    pub fn has_shortfalls(&self) -> bool {
        !self.shortfalls.is_empty()
    }
}

impl DispatchDecision {
    /// Creates a new decision record.
    pub fn new(
        station_id: StationId,
        serial_number: impl Into<String>,
        employee_id: impl Into<String>,
        decided_ms: i64,
    ) -> Self {
        Self {
            station_id,
            serial_number: serial_number.into(),
            employee_id: employee_id.into(),
            decided_ms,
            remaining_operations: 0,
            queue_wait_ms: 0,
        }
    }

    /// Sets the remaining-operations snapshot.
    pub fn with_remaining_operations(mut self, remaining: usize) -> Self {
        self.remaining_operations = remaining;
        self
    }

    /// Sets the queue wait.
    pub fn with_queue_wait(mut self, queue_wait_ms: i64) -> Self {
        self.queue_wait_ms = queue_wait_ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_lookups() {
        let mut report = PassReport::new(1000);
        report.add_decision(
            DispatchDecision::new(1, "SN-1", "E-1", 1000)
                .with_remaining_operations(3)
                .with_queue_wait(250),
        );
        report.add_decision(DispatchDecision::new(2, "SN-2", "E-2", 1000));

        assert_eq!(report.decision_count(), 2);
        assert_eq!(
            report.decision_for_station(1).unwrap().serial_number,
            "SN-1"
        );
        assert_eq!(report.decision_for_product("SN-2").unwrap().station_id, 2);
        assert!(report.decision_for_station(9).is_none());
        assert!(!report.has_shortfalls());
    }

    #[test]
    fn test_report_shortfalls() {
        let mut report = PassReport::new(0);
        report.add_shortfall(StaffingShortfall {
            station_id: 3,
            queued: 2,
        });
        assert!(report.has_shortfalls());
        assert_eq!(report.shortfalls[0].queued, 2);
    }

    #[test]
    fn test_decision_snapshot_fields() {
        let d = DispatchDecision::new(4, "SN-7", "E-9", 500)
            .with_remaining_operations(1)
            .with_queue_wait(80);
        assert_eq!(d.remaining_operations, 1);
        assert_eq!(d.queue_wait_ms, 80);
        assert_eq!(d.decided_ms, 500);
    }
}
