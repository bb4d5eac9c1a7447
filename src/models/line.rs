//! Line registry (arena) model.
//!
//! The line owns every station, worker, and product. Station queues hold
//! serial numbers referencing the product registry, so a product lives in
//! exactly one place and can be moved between queues without copies.
//!
//! Stations and workers are kept in ordered maps; every iteration over
//! them is ascending by identifier, which keeps dispatch outcomes
//! reproducible.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::{Product, StationId, Worker, Workstation};

/// Why an admission was refused.
///
/// None of these are fatal: the caller holds the product and may retry on
/// a later step or route elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmitError {
    /// No station with this ID is registered.
    UnknownStation(StationId),
    /// No product with this serial is registered.
    UnknownProduct(String),
    /// The product already sits in a station queue.
    AlreadyQueued(String),
    /// The target queue is at capacity. Backpressure, not a fault.
    QueueFull(StationId),
}

impl fmt::Display for AdmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdmitError::UnknownStation(id) => write!(f, "unknown station {id}"),
            AdmitError::UnknownProduct(serial) => write!(f, "unknown product '{serial}'"),
            AdmitError::AlreadyQueued(serial) => {
                write!(f, "product '{serial}' is already queued")
            }
            AdmitError::QueueFull(id) => write!(f, "queue of station {id} is full"),
        }
    }
}

impl std::error::Error for AdmitError {}

/// All state of one production line.
///
/// Construction is external: the driving loop registers stations, workers,
/// and products, then calls [`admit`](Self::admit) as products arrive and
/// hands the line to the dispatcher once per step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Line {
    /// Stations by ID, ascending.
    pub stations: BTreeMap<StationId, Workstation>,
    /// Workers by employee ID, ascending.
    pub workers: BTreeMap<String, Worker>,
    /// Products by serial number.
    pub products: HashMap<String, Product>,
}

impl Line {
    /// Creates an empty line.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a station.
    pub fn with_station(mut self, station: Workstation) -> Self {
        self.stations.insert(station.station_id, station);
        self
    }

    /// Registers a worker.
    pub fn with_worker(mut self, worker: Worker) -> Self {
        self.workers.insert(worker.employee_id.clone(), worker);
        self
    }

    /// Registers a product.
    pub fn with_product(mut self, product: Product) -> Self {
        self.products.insert(product.serial_number.clone(), product);
        self
    }

    /// Looks up a station.
    pub fn station(&self, station_id: StationId) -> Option<&Workstation> {
        self.stations.get(&station_id)
    }

    /// Looks up a worker.
    pub fn worker(&self, employee_id: &str) -> Option<&Worker> {
        self.workers.get(employee_id)
    }

    /// Looks up a product.
    pub fn product(&self, serial_number: &str) -> Option<&Product> {
        self.products.get(serial_number)
    }

    /// The station whose queue currently holds this serial, if any.
    pub fn queue_station_of(&self, serial_number: &str) -> Option<StationId> {
        self.stations
            .values()
            .find(|s| s.queue.iter().any(|q| q == serial_number))
            .map(|s| s.station_id)
    }

    /// Queued products of a station, in FIFO order.
    ///
    /// Serials missing from the registry are skipped; `validate_line`
    /// reports them.
    pub fn products_in_queue(&self, station_id: StationId) -> Vec<&Product> {
        match self.stations.get(&station_id) {
            Some(station) => station
                .queue
                .iter()
                .filter_map(|serial| self.products.get(serial))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Available workers competent for a station, ascending by employee ID.
    pub fn eligible_workers(&self, station_id: StationId) -> Vec<&Worker> {
        self.workers
            .values()
            .filter(|w| w.is_available && w.is_competent_for(station_id))
            .collect()
    }

    /// Admits a registered product into a station queue.
    ///
    /// Enforces single-queue membership on top of the station's capacity
    /// bound: a product sits in at most one queue at a time.
    pub fn admit(
        &mut self,
        serial_number: &str,
        station_id: StationId,
        now_ms: i64,
    ) -> Result<(), AdmitError> {
        if !self.stations.contains_key(&station_id) {
            return Err(AdmitError::UnknownStation(station_id));
        }
        if self.queue_station_of(serial_number).is_some() {
            return Err(AdmitError::AlreadyQueued(serial_number.to_string()));
        }

        let product = match self.products.get_mut(serial_number) {
            Some(p) => p,
            None => return Err(AdmitError::UnknownProduct(serial_number.to_string())),
        };
        let station = match self.stations.get_mut(&station_id) {
            Some(s) => s,
            None => return Err(AdmitError::UnknownStation(station_id)),
        };
        if station.add_to_queue(product, now_ms) {
            Ok(())
        } else {
            Err(AdmitError::QueueFull(station_id))
        }
    }
}
