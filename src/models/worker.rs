//! Worker model.
//!
//! Workers staff stations. A competency set gates which stations a worker
//! may be assigned to; assignment itself is driven by the dispatcher,
//! which keeps the assignment/availability invariant.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::StationId;

/// A worker who can staff competent stations.
///
/// Invariant: `assigned_station` set ⇒ `is_available` false, and the
/// assigned station is a member of `competent_stations`. The dispatcher
/// is the only writer of the assignment fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worker {
    /// Unique employee identifier.
    pub employee_id: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Stations this worker is qualified to staff.
    pub competent_stations: BTreeSet<StationId>,
    /// Station currently staffed, if any.
    pub assigned_station: Option<StationId>,
    /// Whether the worker can take an assignment.
    pub is_available: bool,
}

impl Worker {
    /// Creates a new available worker with no competencies.
    pub fn new(employee_id: impl Into<String>) -> Self {
        Self {
            employee_id: employee_id.into(),
            first_name: String::new(),
            last_name: String::new(),
            competent_stations: BTreeSet::new(),
            assigned_station: None,
            is_available: true,
        }
    }

    /// Sets the worker's name.
    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = first.into();
        self.last_name = last.into();
        self
    }

    /// Adds a single station competency.
    pub fn with_competency(mut self, station_id: StationId) -> Self {
        self.competent_stations.insert(station_id);
        self
    }

    /// Adds several station competencies.
    pub fn with_competencies(mut self, stations: impl IntoIterator<Item = StationId>) -> Self {
        self.competent_stations.extend(stations);
        self
    }

    /// Full display name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Whether this worker may staff the given station.
    pub fn is_competent_for(&self, station_id: StationId) -> bool {
        self.competent_stations.contains(&station_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_builder() {
        let w = Worker::new("E-100")
            .with_name("Mina", "Park")
            .with_competency(1)
            .with_competencies([3, 2]);

        assert_eq!(w.employee_id, "E-100");
        assert_eq!(w.full_name(), "Mina Park");
        assert!(w.is_available);
        assert_eq!(w.assigned_station, None);
        assert_eq!(
            w.competent_stations.iter().copied().collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_competency_check() {
        let w = Worker::new("E-1").with_competencies([4, 7]);
        assert!(w.is_competent_for(4));
        assert!(w.is_competent_for(7));
        assert!(!w.is_competent_for(5));
    }

    #[test]
    fn test_new_worker_is_available() {
        let w = Worker::new("E-2");
        assert!(w.is_available);
        assert!(w.assigned_station.is_none());
        assert!(w.competent_stations.is_empty());
    }
}
