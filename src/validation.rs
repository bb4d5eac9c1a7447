//! Line configuration validation.
//!
//! Checks structural integrity of a line before driving it. Detects:
//! - Non-positive queue capacities
//! - Routes and competencies referencing unknown stations
//! - Route positions out of range
//! - Queues over capacity, with unknown or duplicated entries
//! - Assignment state that contradicts availability or occupancy
//!
//! The dispatcher assumes a valid line; these checks run once at load
//! time and after any external mutation the driver does not trust.

use crate::models::Line;
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A station has a zero queue capacity.
    InvalidCapacity,
    /// A product has an empty route.
    EmptyRoute,
    /// A route or competency references a station that doesn't exist.
    InvalidStationReference,
    /// A product's position lies beyond its route.
    PositionOutOfRange,
    /// A queue holds more entries than its capacity.
    QueueOverflow,
    /// A queue entry references a product that doesn't exist.
    UnknownQueueEntry,
    /// A product sits in more than one queue.
    DuplicateQueueEntry,
    /// A worker is assigned to a station outside their competencies.
    CompetencyViolation,
    /// Assignment and availability state disagree.
    AvailabilityConflict,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the structural integrity of a line.
///
/// Checks:
/// 1. Every station has capacity ≥ 1 and a queue within it
/// 2. Queue entries reference registered products, each in one queue
/// 3. Every route is non-empty and references registered stations
/// 4. Every position is within `[0, route length]`
/// 5. Competencies reference registered stations
/// 6. Assigned workers are competent, unavailable, and cross-referenced
///    by their station
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_line(line: &Line) -> ValidationResult {
    let mut errors = Vec::new();
    let mut seen_queued: HashSet<&str> = HashSet::new();

    for station in line.stations.values() {
        if station.max_queue_size == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidCapacity,
                format!("Station {} has zero queue capacity", station.station_id),
            ));
        }
        if station.queue_length() > station.max_queue_size {
            errors.push(ValidationError::new(
                ValidationErrorKind::QueueOverflow,
                format!(
                    "Station {} queue holds {} entries, capacity {}",
                    station.station_id,
                    station.queue_length(),
                    station.max_queue_size
                ),
            ));
        }
        for serial in &station.queue {
            if !line.products.contains_key(serial) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownQueueEntry,
                    format!(
                        "Station {} queue references unknown product '{serial}'",
                        station.station_id
                    ),
                ));
            }
            if !seen_queued.insert(serial.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateQueueEntry,
                    format!("Product '{serial}' sits in more than one queue"),
                ));
            }
        }
    }

    for product in line.products.values() {
        if product.model_sequence.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyRoute,
                format!("Product '{}' has an empty route", product.serial_number),
            ));
        }
        for station_id in &product.model_sequence {
            if !line.stations.contains_key(station_id) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidStationReference,
                    format!(
                        "Route of product '{}' references unknown station {station_id}",
                        product.serial_number
                    ),
                ));
            }
        }
        if let Some(pos) = product.station_seq_pos {
            if pos > product.model_sequence.len() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::PositionOutOfRange,
                    format!(
                        "Product '{}' position {pos} exceeds route length {}",
                        product.serial_number,
                        product.model_sequence.len()
                    ),
                ));
            }
        }
    }

    for worker in line.workers.values() {
        for station_id in &worker.competent_stations {
            if !line.stations.contains_key(station_id) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidStationReference,
                    format!(
                        "Worker '{}' is competent for unknown station {station_id}",
                        worker.employee_id
                    ),
                ));
            }
        }
        if let Some(station_id) = worker.assigned_station {
            if !worker.is_competent_for(station_id) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::CompetencyViolation,
                    format!(
                        "Worker '{}' is assigned to station {station_id} outside their competencies",
                        worker.employee_id
                    ),
                ));
            }
            if worker.is_available {
                errors.push(ValidationError::new(
                    ValidationErrorKind::AvailabilityConflict,
                    format!(
                        "Worker '{}' is assigned to station {station_id} yet marked available",
                        worker.employee_id
                    ),
                ));
            }
            let cross_referenced = line
                .station(station_id)
                .is_some_and(|s| s.current_worker.as_deref() == Some(&worker.employee_id));
            if !cross_referenced {
                errors.push(ValidationError::new(
                    ValidationErrorKind::AvailabilityConflict,
                    format!(
                        "Worker '{}' claims station {station_id}, which does not staff them",
                        worker.employee_id
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::Dispatcher;
    use crate::models::{Product, Worker, Workstation};

    fn valid_line() -> Line {
        Line::new()
            .with_station(Workstation::new(1).with_max_queue_size(2))
            .with_station(Workstation::new(2).with_max_queue_size(2))
            .with_worker(Worker::new("E-1").with_competencies([1, 2]))
            .with_product(Product::new("SN-1").with_route(vec![1, 2]).with_position(0))
    }

    fn kinds(result: ValidationResult) -> Vec<ValidationErrorKind> {
        match result {
            Ok(()) => Vec::new(),
            Err(errors) => errors.into_iter().map(|e| e.kind).collect(),
        }
    }

    #[test]
    fn test_valid_line_passes() {
        assert!(validate_line(&valid_line()).is_ok());
    }

    #[test]
    fn test_line_stays_valid_through_dispatch() {
        let mut line = valid_line();
        line.admit("SN-1", 1, 0).unwrap();
        assert!(validate_line(&line).is_ok());

        let dispatcher = Dispatcher::new();
        dispatcher.run_pass(&mut line, 10);
        assert!(validate_line(&line).is_ok());

        dispatcher.complete_station(&mut line, 1, 50).unwrap();
        assert!(validate_line(&line).is_ok());
    }

    #[test]
    fn test_zero_capacity() {
        let line = valid_line().with_station(Workstation::new(3).with_max_queue_size(0));
        assert!(kinds(validate_line(&line)).contains(&ValidationErrorKind::InvalidCapacity));
    }

    #[test]
    fn test_empty_route() {
        let line = valid_line().with_product(Product::new("SN-2"));
        assert!(kinds(validate_line(&line)).contains(&ValidationErrorKind::EmptyRoute));
    }

    #[test]
    fn test_route_references_unknown_station() {
        let line = valid_line().with_product(Product::new("SN-2").with_route(vec![1, 9]));
        assert!(
            kinds(validate_line(&line)).contains(&ValidationErrorKind::InvalidStationReference)
        );
    }

    #[test]
    fn test_competency_references_unknown_station() {
        let line = valid_line().with_worker(Worker::new("E-2").with_competency(42));
        assert!(
            kinds(validate_line(&line)).contains(&ValidationErrorKind::InvalidStationReference)
        );
    }

    #[test]
    fn test_position_out_of_range() {
        let line = valid_line().with_product(Product::new("SN-2").with_route(vec![1]).with_position(5));
        assert!(kinds(validate_line(&line)).contains(&ValidationErrorKind::PositionOutOfRange));
    }

    #[test]
    fn test_position_at_route_end_is_valid() {
        // pos == len marks a finished route, not an error
        let line = valid_line().with_product(Product::new("SN-2").with_route(vec![1]).with_position(1));
        assert!(validate_line(&line).is_ok());
    }

    #[test]
    fn test_unknown_queue_entry() {
        let mut line = valid_line();
        line.stations.get_mut(&1).unwrap().queue.push_back("ghost".into());
        assert!(kinds(validate_line(&line)).contains(&ValidationErrorKind::UnknownQueueEntry));
    }

    #[test]
    fn test_duplicate_queue_entry() {
        let mut line = valid_line();
        line.stations.get_mut(&1).unwrap().queue.push_back("SN-1".into());
        line.stations.get_mut(&2).unwrap().queue.push_back("SN-1".into());
        assert!(kinds(validate_line(&line)).contains(&ValidationErrorKind::DuplicateQueueEntry));
    }

    #[test]
    fn test_queue_overflow() {
        let mut line = valid_line().with_product(Product::new("SN-2").with_route(vec![1]));
        // Force two entries past the bound, bypassing add_to_queue
        let station = line.stations.get_mut(&1).unwrap();
        station.max_queue_size = 1;
        station.queue.push_back("SN-1".into());
        station.queue.push_back("SN-2".into());
        assert!(kinds(validate_line(&line)).contains(&ValidationErrorKind::QueueOverflow));
    }

    #[test]
    fn test_assignment_conflicts() {
        let mut line = valid_line();
        {
            let worker = line.workers.get_mut("E-1").unwrap();
            worker.assigned_station = Some(1);
            worker.is_available = true; // contradiction
        }
        let found = kinds(validate_line(&line));
        assert!(found.contains(&ValidationErrorKind::AvailabilityConflict));
    }

    #[test]
    fn test_assignment_outside_competencies() {
        let mut line = valid_line().with_worker(Worker::new("E-2").with_competency(2));
        {
            let station = line.stations.get_mut(&1).unwrap();
            station.begin_assignment("SN-1", "E-2");
            let worker = line.workers.get_mut("E-2").unwrap();
            worker.assigned_station = Some(1);
            worker.is_available = false;
        }
        assert!(kinds(validate_line(&line)).contains(&ValidationErrorKind::CompetencyViolation));
    }
}
