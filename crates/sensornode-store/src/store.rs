//! One store contract over both backends.

use serde::Serialize;
use tracing::{error, info};

use sensornode_types::Measurement;

use crate::clock::SystemClock;
use crate::config::{Backend, StorageConfig};
use crate::error::{Error, Result};
use crate::medium::FileMedium;
use crate::relational::RelationalBackend;
use crate::ring::RingBackend;

/// Operations every backend provides.
///
/// Callers hold a `Store` (or any implementor) and never learn which
/// strategy is behind it.
pub trait MeasurementStore {
    /// Which strategy this store uses.
    fn backend(&self) -> Backend;

    /// Create the storage area if it does not exist yet.
    fn create_if_absent(&mut self) -> Result<()>;

    /// Record one reading in tenths of a unit, stamped with the current time.
    fn write(&mut self, value: i32) -> Result<()>;

    /// Record the numeric payload of an insert statement or numeric string.
    fn write_text(&mut self, text: &str) -> Result<()>;

    /// Run a statement written against the relational API.
    fn execute(&mut self, sql: &str) -> Result<()>;

    /// Up to `limit` most recent measurements, newest first.
    fn read_recent(&self, limit: u16) -> Result<Vec<Measurement>>;

    /// [`write`](Self::write), reporting failure as `false`.
    fn write_measurement(&mut self, value: i32) -> bool {
        match self.write(value) {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to store measurement {}: {}", value, e);
                false
            }
        }
    }

    /// [`read_recent`](Self::read_recent), reporting failure as an empty list.
    fn read_recent_measurements(&self, limit: u16) -> Vec<Measurement> {
        self.read_recent(limit).unwrap_or_else(|e| {
            error!("Failed to read recent measurements: {}", e);
            Vec::new()
        })
    }
}

impl<const CAPACITY: usize> MeasurementStore for RingBackend<CAPACITY> {
    fn backend(&self) -> Backend {
        Backend::Ring
    }

    fn create_if_absent(&mut self) -> Result<()> {
        RingBackend::create_if_absent(self)
    }

    fn write(&mut self, value: i32) -> Result<()> {
        RingBackend::write(self, value)
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        RingBackend::write_text(self, text)
    }

    fn execute(&mut self, sql: &str) -> Result<()> {
        RingBackend::execute(self, sql)
    }

    fn read_recent(&self, limit: u16) -> Result<Vec<Measurement>> {
        RingBackend::read_recent(self, limit)
    }
}

impl MeasurementStore for RelationalBackend {
    fn backend(&self) -> Backend {
        Backend::Relational
    }

    fn create_if_absent(&mut self) -> Result<()> {
        RelationalBackend::create_if_absent(self)
    }

    fn write(&mut self, value: i32) -> Result<()> {
        RelationalBackend::write(self, value)
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        RelationalBackend::write_text(self, text)
    }

    fn execute(&mut self, sql: &str) -> Result<()> {
        RelationalBackend::execute(self, sql)
    }

    fn read_recent(&self, limit: u16) -> Result<Vec<Measurement>> {
        RelationalBackend::read_recent(self, limit)
    }
}

/// Snapshot of what a store holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStatus {
    pub backend: Backend,
    /// Measurements currently retrievable.
    pub stored: u64,
    /// Ring slots; `None` for the relational backend.
    pub capacity: Option<usize>,
    /// Next ring slot to write; `None` for the relational backend.
    pub write_index: Option<usize>,
}

/// The store selected for this process.
#[derive(Debug)]
pub enum Store {
    Ring(RingBackend),
    Relational(RelationalBackend),
}

impl Store {
    /// Open the backend named by `config`.
    ///
    /// The configuration is validated first; nothing is created on the
    /// medium for a rejected one.
    pub fn open(config: &StorageConfig) -> Result<Self> {
        let problems = config.validate();
        if !problems.is_empty() {
            return Err(Error::InvalidConfig(problems));
        }
        let store = match config.backend {
            Backend::Ring => Store::Ring(RingBackend::open_in(
                FileMedium::new(&config.path),
                SystemClock,
                &config.namespace,
            )?),
            Backend::Relational => {
                Store::Relational(RelationalBackend::open(config.database_path())?)
            }
        };
        info!("Using {} backend at {}", config.backend, config.path.display());
        Ok(store)
    }

    /// Current contents summary.
    pub fn status(&self) -> Result<StoreStatus> {
        match self {
            Store::Ring(ring) => {
                let state = ring.state()?;
                Ok(StoreStatus {
                    backend: Backend::Ring,
                    stored: state.count as u64,
                    capacity: Some(ring.capacity()),
                    write_index: Some(state.write_index),
                })
            }
            Store::Relational(db) => Ok(StoreStatus {
                backend: Backend::Relational,
                stored: db.count()?,
                capacity: None,
                write_index: None,
            }),
        }
    }

    fn inner(&self) -> &dyn MeasurementStore {
        match self {
            Store::Ring(ring) => ring,
            Store::Relational(db) => db,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn MeasurementStore {
        match self {
            Store::Ring(ring) => ring,
            Store::Relational(db) => db,
        }
    }
}

impl From<RingBackend> for Store {
    fn from(ring: RingBackend) -> Self {
        Store::Ring(ring)
    }
}

impl From<RelationalBackend> for Store {
    fn from(db: RelationalBackend) -> Self {
        Store::Relational(db)
    }
}

impl MeasurementStore for Store {
    fn backend(&self) -> Backend {
        self.inner().backend()
    }

    fn create_if_absent(&mut self) -> Result<()> {
        self.inner_mut().create_if_absent()
    }

    fn write(&mut self, value: i32) -> Result<()> {
        self.inner_mut().write(value)
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        self.inner_mut().write_text(text)
    }

    fn execute(&mut self, sql: &str) -> Result<()> {
        self.inner_mut().execute(sql)
    }

    fn read_recent(&self, limit: u16) -> Result<Vec<Measurement>> {
        self.inner().read_recent(limit)
    }
}
