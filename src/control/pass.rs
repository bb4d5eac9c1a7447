//! Dispatcher: per-step pull decisions and atomic assignment.
//!
//! # Algorithm
//!
//! 1. Snapshot queue congestion for every station.
//! 2. Over all idle stations (ascending ID) with queued work and an
//!    eligible worker, rank queued products with the rule engine and
//!    keep the best candidate line-wide.
//! 3. Commit that candidate as one atomic transition (dequeue, bind
//!    worker, occupy station) and repeat from 1, since congestion and
//!    worker availability have changed.
//! 4. Stations still holding queued work without an eligible worker are
//!    reported as staffing shortfalls.
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 4: Priority Dispatching

use std::fmt;

use crate::dispatching::{
    rules, DispatchContext, EvaluationMode, PriorityEngine, TieBreaker, DEFAULT_LOOKAHEAD,
};
use crate::models::{
    DispatchDecision, Line, PassReport, Product, StaffingShortfall, StationId,
};

/// Why an assignment or completion was refused.
///
/// Every variant is recoverable: the line is left untouched and the
/// caller may retry on a later step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// No station with this ID is registered.
    UnknownStation(StationId),
    /// No worker with this employee ID is registered.
    UnknownWorker(String),
    /// No product with this serial is registered.
    UnknownProduct(String),
    /// The station already holds a product/worker.
    StationOccupied(StationId),
    /// The station holds nothing to complete.
    StationIdle(StationId),
    /// The worker is already bound to a station.
    WorkerUnavailable(String),
    /// The worker is not qualified for the station.
    NotCompetent {
        /// Worker in question.
        employee_id: String,
        /// Station they are not qualified for.
        station_id: StationId,
    },
    /// The product is not in the station's queue.
    NotQueued {
        /// Product in question.
        serial_number: String,
        /// Station whose queue was checked.
        station_id: StationId,
    },
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::UnknownStation(id) => write!(f, "unknown station {id}"),
            DispatchError::UnknownWorker(id) => write!(f, "unknown worker '{id}'"),
            DispatchError::UnknownProduct(serial) => write!(f, "unknown product '{serial}'"),
            DispatchError::StationOccupied(id) => write!(f, "station {id} is occupied"),
            DispatchError::StationIdle(id) => write!(f, "station {id} has nothing to complete"),
            DispatchError::WorkerUnavailable(id) => write!(f, "worker '{id}' is unavailable"),
            DispatchError::NotCompetent {
                employee_id,
                station_id,
            } => write!(
                f,
                "worker '{employee_id}' is not competent for station {station_id}"
            ),
            DispatchError::NotQueued {
                serial_number,
                station_id,
            } => write!(
                f,
                "product '{serial_number}' is not queued at station {station_id}"
            ),
        }
    }
}

impl std::error::Error for DispatchError {}

/// Result of completing the work at a station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOutcome {
    /// Product released from the station.
    pub serial_number: String,
    /// Worker freed.
    pub employee_id: String,
    /// Whether the product's route is now exhausted.
    pub finished: bool,
    /// Station the product should be admitted to next, if any.
    pub next_station: Option<StationId>,
}

/// Priority dispatcher for one production line.
///
/// Holds the pull policy (a [`PriorityEngine`]) and performs every
/// cross-entity mutation: queued product → occupied station with a bound
/// worker, and the matching release on completion. All transitions are
/// check-then-commit: no observable state where only one side is updated.
///
/// # Example
///
/// ```
/// use flowline::control::Dispatcher;
/// use flowline::models::{Line, Product, Worker, Workstation};
///
/// let mut line = Line::new()
///     .with_station(Workstation::new(1).with_max_queue_size(2))
///     .with_worker(Worker::new("E-1").with_competency(1))
///     .with_product(Product::new("SN-1").with_route(vec![1]).with_position(0));
/// line.admit("SN-1", 1, 0).unwrap();
///
/// let report = Dispatcher::new().run_pass(&mut line, 10);
/// assert_eq!(report.decision_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Dispatcher {
    engine: PriorityEngine,
    remaining_weight: f64,
    pressure_weight: f64,
    lookahead: usize,
}

impl Dispatcher {
    /// Creates a dispatcher with the default policy: weighted sum of
    /// fewest-remaining-operations (1.0) and downstream pressure (1.0),
    /// ties broken by queue arrival, then by serial number.
    pub fn new() -> Self {
        let mut dispatcher = Self {
            engine: PriorityEngine::new(),
            remaining_weight: 1.0,
            pressure_weight: 1.0,
            lookahead: DEFAULT_LOOKAHEAD,
        };
        dispatcher.rebuild_engine();
        dispatcher
    }

    /// Sets the weights of the two score terms and rebuilds the policy.
    ///
    /// Both weights must be non-negative to keep priority monotonic:
    /// decreasing in remaining operations and in downstream congestion.
    pub fn with_weights(mut self, remaining_weight: f64, pressure_weight: f64) -> Self {
        self.remaining_weight = remaining_weight;
        self.pressure_weight = pressure_weight;
        self.rebuild_engine();
        self
    }

    /// Sets the downstream lookahead and rebuilds the policy.
    pub fn with_lookahead(mut self, lookahead: usize) -> Self {
        self.lookahead = lookahead;
        self.rebuild_engine();
        self
    }

    /// Replaces the pull policy with a custom engine.
    pub fn with_engine(mut self, engine: PriorityEngine) -> Self {
        self.engine = engine;
        self
    }

    fn rebuild_engine(&mut self) {
        self.engine = PriorityEngine::new()
            .with_mode(EvaluationMode::Weighted)
            .with_weighted_rule(rules::FewestRemaining, self.remaining_weight)
            .with_weighted_rule(
                rules::DownstreamPressure::with_lookahead(self.lookahead),
                self.pressure_weight,
            )
            .with_tie_breaker(rules::ArrivalOrder)
            .with_final_tie_breaker(TieBreaker::BySerial);
    }

    /// Runs one dispatch pass over the line.
    ///
    /// Greedy best-first: each round commits the single highest-priority
    /// eligible (station, product, worker) candidate line-wide, then
    /// re-evaluates, since the commit changed congestion and worker
    /// availability. Deterministic for a given line state: stations and
    /// workers iterate ascending, product ranking is total.
    pub fn run_pass(&self, line: &mut Line, now_ms: i64) -> PassReport {
        let mut report = PassReport::new(now_ms);

        loop {
            let candidate = self.best_candidate(line, now_ms);
            let (station_id, serial, employee) = match candidate {
                Some(c) => c,
                None => break,
            };
            match self.assign(line, station_id, &serial, &employee, now_ms) {
                Ok(decision) => report.add_decision(decision),
                // best_candidate only yields verified triples; stop the
                // pass rather than spin if state disagrees.
                Err(_) => break,
            }
        }

        for station in line.stations.values() {
            if station.is_idle()
                && !station.queue.is_empty()
                && line.eligible_workers(station.station_id).is_empty()
            {
                report.add_shortfall(StaffingShortfall {
                    station_id: station.station_id,
                    queued: station.queue_length(),
                });
            }
        }

        report
    }

    /// Highest-priority eligible (station, product, worker) triple, or
    /// `None` when no assignment is possible.
    fn best_candidate(&self, line: &Line, now_ms: i64) -> Option<(StationId, String, String)> {
        let ctx = DispatchContext::snapshot(line, now_ms);
        let mut best: Option<(StationId, String, String)> = None;
        let mut best_product: Option<&Product> = None;

        for station in line.stations.values() {
            if !station.is_idle() || station.queue.is_empty() {
                continue;
            }
            let eligible = line.eligible_workers(station.station_id);
            let worker = match eligible.first() {
                Some(w) => *w,
                None => continue,
            };
            let queued = line.products_in_queue(station.station_id);
            let idx = match self.engine.select_best(&queued, &ctx) {
                Some(idx) => idx,
                None => continue,
            };
            let candidate = queued[idx];

            let is_better = match best_product {
                None => true,
                // Strict: on cross-station ties the lower station ID
                // (seen first) keeps the slot.
                Some(current) => {
                    self.engine.compare(candidate, current, &ctx) == std::cmp::Ordering::Less
                }
            };
            if is_better {
                best = Some((
                    station.station_id,
                    candidate.serial_number.clone(),
                    worker.employee_id.clone(),
                ));
                best_product = Some(candidate);
            }
        }
        best
    }

    /// Atomically pulls a queued product into a station and binds a
    /// worker to it.
    ///
    /// Verifies the whole transition first (station idle, worker
    /// available and competent, product queued here) and only then
    /// mutates. On any error the line is unchanged. Queue membership is
    /// authoritative for routing: pulling a product whose position is
    /// unset starts its route at position 0.
    pub fn assign(
        &self,
        line: &mut Line,
        station_id: StationId,
        serial_number: &str,
        employee_id: &str,
        now_ms: i64,
    ) -> Result<DispatchDecision, DispatchError> {
        // Verify phase: no writes.
        let station = line
            .station(station_id)
            .ok_or(DispatchError::UnknownStation(station_id))?;
        if !station.is_idle() {
            return Err(DispatchError::StationOccupied(station_id));
        }
        let worker = line
            .worker(employee_id)
            .ok_or_else(|| DispatchError::UnknownWorker(employee_id.to_string()))?;
        if !worker.is_available {
            return Err(DispatchError::WorkerUnavailable(employee_id.to_string()));
        }
        if !worker.is_competent_for(station_id) {
            return Err(DispatchError::NotCompetent {
                employee_id: employee_id.to_string(),
                station_id,
            });
        }
        let product = line
            .product(serial_number)
            .ok_or_else(|| DispatchError::UnknownProduct(serial_number.to_string()))?;
        if !station.queue.iter().any(|s| s == serial_number) {
            return Err(DispatchError::NotQueued {
                serial_number: serial_number.to_string(),
                station_id,
            });
        }

        let remaining = product.remaining_operations();
        let queue_wait_ms = product
            .queue_arrival_ms
            .map(|arrived| now_ms - arrived)
            .unwrap_or(0);

        // Commit phase: all checks passed, no failure paths below.
        if let (Some(station), Some(product), Some(worker)) = (
            line.stations.get_mut(&station_id),
            line.products.get_mut(serial_number),
            line.workers.get_mut(employee_id),
        ) {
            station.remove_from_queue(product);
            product.station_seq_pos = Some(product.station_seq_pos.unwrap_or(0));
            product.current_station = Some(station_id);
            product.begin_ms = Some(now_ms);
            product.end_ms = None;
            worker.assigned_station = Some(station_id);
            worker.is_available = false;
            station.begin_assignment(serial_number, employee_id);
        }

        Ok(
            DispatchDecision::new(station_id, serial_number, employee_id, now_ms)
                .with_remaining_operations(remaining)
                .with_queue_wait(queue_wait_ms),
        )
    }

    /// Atomically completes the work at a station: stamps the product,
    /// advances its route, frees the worker, and clears the station.
    pub fn complete_station(
        &self,
        line: &mut Line,
        station_id: StationId,
        now_ms: i64,
    ) -> Result<CompletionOutcome, DispatchError> {
        let station = line
            .station(station_id)
            .ok_or(DispatchError::UnknownStation(station_id))?;
        let serial = station
            .current_product
            .clone()
            .ok_or(DispatchError::StationIdle(station_id))?;
        let employee = station
            .current_worker
            .clone()
            .ok_or(DispatchError::StationIdle(station_id))?;
        if !line.products.contains_key(&serial) {
            return Err(DispatchError::UnknownProduct(serial));
        }
        if !line.workers.contains_key(&employee) {
            return Err(DispatchError::UnknownWorker(employee));
        }

        let mut outcome = CompletionOutcome {
            serial_number: serial.clone(),
            employee_id: employee.clone(),
            finished: false,
            next_station: None,
        };

        if let (Some(station), Some(product), Some(worker)) = (
            line.stations.get_mut(&station_id),
            line.products.get_mut(&serial),
            line.workers.get_mut(&employee),
        ) {
            let next_pos = product.station_seq_pos.map(|p| p + 1).unwrap_or(1);
            product.end_ms = Some(now_ms);
            product.station_seq_pos = Some(next_pos);
            product.current_station = None;
            worker.assigned_station = None;
            worker.is_available = true;
            station.clear_current_assignment();

            outcome.finished = next_pos >= product.model_sequence.len();
            outcome.next_station = product.model_sequence.get(next_pos).copied();
        }

        Ok(outcome)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
