//! Product (unit of work) model.
//!
//! A product travels through the line along a fixed station sequence
//! (its route). Position state advances monotonically; timestamps record
//! queue admission and station occupancy.
//!
//! # Reference
//! Hopp & Spearman (2008), "Factory Physics", Ch. 10: Push and Pull

use serde::{Deserialize, Serialize};

use super::StationId;

/// A product advancing through the line.
///
/// Identity (`serial_number`) and route (`model_sequence`) are fixed at
/// creation; position and timestamps are mutated by admission, dispatch,
/// and completion.
///
/// # Time Representation
/// All times are in milliseconds relative to an epoch (t=0) supplied by
/// the driving loop. The core never reads a wall clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique serial number.
    pub serial_number: String,
    /// Ordered station route this product must visit.
    pub model_sequence: Vec<StationId>,
    /// Traveler (routing paperwork) reference, if any.
    pub traveler_id: Option<String>,
    /// Creation timestamp (ms). `None` = unknown.
    pub created_ms: Option<i64>,
    /// Index into `model_sequence` of the current/next station.
    /// `None` = routing not started; `== len` = route finished.
    pub station_seq_pos: Option<usize>,
    /// Station currently processing this product.
    pub current_station: Option<StationId>,
    /// Start of the current/last station occupancy (ms).
    pub begin_ms: Option<i64>,
    /// End of the last station occupancy (ms).
    pub end_ms: Option<i64>,
    /// Admission timestamp of the queue currently holding this product (ms).
    /// Set by queue admission, cleared by removal.
    pub queue_arrival_ms: Option<i64>,
}

impl Product {
    /// Creates a new product with the given serial number and no route.
    pub fn new(serial_number: impl Into<String>) -> Self {
        Self {
            serial_number: serial_number.into(),
            model_sequence: Vec::new(),
            traveler_id: None,
            created_ms: None,
            station_seq_pos: None,
            current_station: None,
            begin_ms: None,
            end_ms: None,
            queue_arrival_ms: None,
        }
    }

    /// Sets the station route.
    pub fn with_route(mut self, model_sequence: Vec<StationId>) -> Self {
        self.model_sequence = model_sequence;
        self
    }

    /// Sets the traveler reference.
    pub fn with_traveler(mut self, traveler_id: impl Into<String>) -> Self {
        self.traveler_id = Some(traveler_id.into());
        self
    }

    /// Sets the creation timestamp.
    pub fn with_created_at(mut self, created_ms: i64) -> Self {
        self.created_ms = Some(created_ms);
        self
    }

    /// Sets the route position.
    pub fn with_position(mut self, pos: usize) -> Self {
        self.station_seq_pos = Some(pos);
        self
    }

    /// Number of stations still to be visited, counting the current one.
    ///
    /// Zero when routing has not started, the route is empty, or the
    /// route is finished. Total: never fails.
    pub fn remaining_operations(&self) -> usize {
        match self.station_seq_pos {
            Some(pos) if pos < self.model_sequence.len() => self.model_sequence.len() - pos,
            _ => 0,
        }
    }

    /// Stations strictly after the current position, at most `lookahead`
    /// of them, truncated at the end of the route.
    ///
    /// Empty when routing has not started. Never includes the current
    /// station. Used for downstream pressure; does not mutate state.
    pub fn next_stations(&self, lookahead: usize) -> Vec<StationId> {
        let pos = match self.station_seq_pos {
            Some(pos) => pos,
            None => return Vec::new(),
        };
        let from = (pos + 1).min(self.model_sequence.len());
        let to = (pos + 1 + lookahead).min(self.model_sequence.len());
        self.model_sequence[from..to].to_vec()
    }

    /// Whether routing has started.
    pub fn has_started(&self) -> bool {
        self.station_seq_pos.is_some()
    }

    /// Whether every station of the route has been visited.
    pub fn is_route_finished(&self) -> bool {
        match self.station_seq_pos {
            Some(pos) => pos >= self.model_sequence.len(),
            None => self.model_sequence.is_empty(),
        }
    }

    /// The station the route currently points at, if routing is in
    /// progress.
    pub fn route_station(&self) -> Option<StationId> {
        self.station_seq_pos
            .and_then(|pos| self.model_sequence.get(pos).copied())
    }
}
