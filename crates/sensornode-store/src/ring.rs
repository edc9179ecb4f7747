//! Circular buffer backend over a key/value medium.
//!
//! The medium has no tables, no ordering and no row ids, so the backend keeps
//! a fixed number of slots and two counters in one namespace:
//!
//! | Key | Meaning |
//! |-----|---------|
//! | `write_index` | next slot to write, in `[0, CAPACITY)` |
//! | `count` | populated slots, saturating at `CAPACITY` |
//! | `value{i}` | raw reading in slot `i` |
//! | `timestamp{i}` | seconds since the epoch for slot `i` |
//!
//! Once `count` reaches `CAPACITY` every write overwrites the oldest slot.
//! The four fields of a write are committed together by the medium session;
//! the backend itself makes no atomicity promise beyond that.

use tracing::{debug, info, warn};

use sensornode_types::Measurement;

use crate::clock::Clock;
use crate::error::Result;
use crate::interceptor::{Statement, extract_value};
use crate::medium::{AccessMode, Medium, NamespaceSession};

/// Slots kept by default: one hour at a 30 second cadence.
pub const DEFAULT_CAPACITY: usize = 120;

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "sensornode";

const KEY_WRITE_INDEX: &str = "write_index";
const KEY_COUNT: &str = "count";

/// Persisted ring counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct RingState {
    /// Next slot to write.
    pub write_index: usize,
    /// Number of populated slots.
    pub count: usize,
}

/// A slot index, always below `CAPACITY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot<const CAPACITY: usize>(usize);

impl<const CAPACITY: usize> Slot<CAPACITY> {
    /// `Some` if `index` is in range.
    pub fn new(index: usize) -> Option<Self> {
        (index < CAPACITY).then_some(Self(index))
    }

    /// Reduce any index modulo `CAPACITY`.
    pub fn wrapping(index: usize) -> Self {
        Self(index % CAPACITY)
    }

    /// The raw index.
    pub fn index(self) -> usize {
        self.0
    }

    /// The slot after this one.
    pub fn next(self) -> Self {
        Self::wrapping(self.0 + 1)
    }

    /// The slot `steps` positions before this one.
    pub fn back(self, steps: usize) -> Self {
        Self::wrapping(self.0 + CAPACITY - steps % CAPACITY)
    }

    fn value_key(self) -> String {
        format!("value{}", self.0)
    }

    fn timestamp_key(self) -> String {
        format!("timestamp{}", self.0)
    }
}

/// Ring buffer store with a compile-time capacity.
pub struct RingBackend<const CAPACITY: usize = DEFAULT_CAPACITY> {
    medium: Box<dyn Medium>,
    clock: Box<dyn Clock>,
    namespace: String,
}

impl<const CAPACITY: usize> std::fmt::Debug for RingBackend<CAPACITY> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingBackend")
            .field("capacity", &CAPACITY)
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl<const CAPACITY: usize> RingBackend<CAPACITY> {
    const NON_EMPTY: () = assert!(CAPACITY > 0, "ring capacity must be at least 1");

    /// Open the ring in the default namespace.
    pub fn open(medium: impl Medium + 'static, clock: impl Clock + 'static) -> Result<Self> {
        Self::open_in(medium, clock, DEFAULT_NAMESPACE)
    }

    /// Open the ring in `namespace`, creating it if absent.
    ///
    /// Fails only if the medium cannot be mounted; callers may retry.
    pub fn open_in(
        medium: impl Medium + 'static,
        clock: impl Clock + 'static,
        namespace: &str,
    ) -> Result<Self> {
        let () = Self::NON_EMPTY;

        let backend = Self {
            medium: Box::new(medium),
            clock: Box::new(clock),
            namespace: namespace.to_string(),
        };

        let session = backend.session(AccessMode::ReadWrite)?;
        let state = read_state::<CAPACITY>(&session);
        session.end()?;

        info!(
            "Opened ring namespace '{}' (capacity {}, {} stored)",
            namespace, CAPACITY, state.count
        );
        Ok(backend)
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        CAPACITY
    }

    /// Namespace holding the ring.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Current counters, read without modification.
    pub fn state(&self) -> Result<RingState> {
        let session = self.session(AccessMode::ReadOnly)?;
        let state = read_state::<CAPACITY>(&session);
        session.end()?;
        Ok(state)
    }

    /// Nothing to create: the namespace materialises on first use.
    pub fn create_if_absent(&mut self) -> Result<()> {
        debug!("Ring namespace '{}' needs no table", self.namespace);
        Ok(())
    }

    /// Store one reading stamped with the clock's current time.
    pub fn write(&mut self, value: i32) -> Result<()> {
        let now = self.clock.now_unix();
        let mut session = self.session(AccessMode::ReadWrite)?;
        let state = read_state::<CAPACITY>(&session);
        let slot = Slot::<CAPACITY>::wrapping(state.write_index);

        session.put_i32(&slot.value_key(), value)?;
        session.put_i64(&slot.timestamp_key(), now)?;
        session.put_i64(KEY_WRITE_INDEX, slot.next().index() as i64)?;
        session.put_i64(KEY_COUNT, (state.count + 1).min(CAPACITY) as i64)?;
        session.end()?;

        debug!("Stored {} in slot {} at {}", value, slot.index(), now);
        Ok(())
    }

    /// Store the numeric payload of an insert statement or numeric string.
    pub fn write_text(&mut self, text: &str) -> Result<()> {
        self.write(extract_value(text))
    }

    /// Accept a quasi-SQL statement.
    ///
    /// Inserts into the measurements table are written; anything else is
    /// acknowledged and ignored.
    pub fn execute(&mut self, sql: &str) -> Result<()> {
        match Statement::classify(sql) {
            Statement::InsertMeasurement(value) => self.write(value),
            Statement::InsertElsewhere => {
                warn!("Ignoring insert outside the measurements table: {}", sql);
                Ok(())
            }
            Statement::Other => {
                debug!("Ignoring statement on ring backend: {}", sql);
                Ok(())
            }
        }
    }

    /// Up to `limit` most recent measurements, newest first.
    ///
    /// Never returns more than the populated slot count and never touches a
    /// slot outside it. `id` is the slot index.
    pub fn read_recent(&self, limit: u16) -> Result<Vec<Measurement>> {
        let session = self.session(AccessMode::ReadOnly)?;
        let state = read_state::<CAPACITY>(&session);
        let to_read = usize::from(limit).min(state.count);
        let head = Slot::<CAPACITY>::wrapping(state.write_index);

        let measurements = (0..to_read)
            .map(|i| {
                let slot = head.back(i + 1);
                let value = session.get_i32(&slot.value_key(), 0);
                let timestamp = session.get_i64(&slot.timestamp_key(), 0);
                Measurement::from_unix(slot.index() as u64, timestamp, value)
            })
            .collect();
        session.end()?;

        debug!("Read {} of {} requested measurements", to_read, limit);
        Ok(measurements)
    }

    fn session(&self, mode: AccessMode) -> Result<NamespaceSession<'_>> {
        NamespaceSession::begin(self.medium.as_ref(), &self.namespace, mode)
    }
}

/// Load counters, pulling out-of-range values back into the ring.
fn read_state<const CAPACITY: usize>(session: &NamespaceSession<'_>) -> RingState {
    let raw_index = session.get_i64(KEY_WRITE_INDEX, 0);
    let raw_count = session.get_i64(KEY_COUNT, 0);

    let write_index = raw_index.rem_euclid(CAPACITY as i64) as usize;
    let count = raw_count.clamp(0, CAPACITY as i64) as usize;

    if write_index as i64 != raw_index || count as i64 != raw_count {
        warn!(
            "Ring state out of range (write_index={}, count={}), using write_index={}, count={}",
            raw_index, raw_count, write_index, count
        );
    }

    RingState { write_index, count }
}
