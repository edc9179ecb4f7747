//! Measurement persistence for sensor nodes.
//!
//! Two backends honour one contract (create the storage area, record a
//! timestamped reading, read back the newest N):
//!
//! - [`RingBackend`]: a fixed-capacity ring over a key/value [`Medium`],
//!   for flash that has no tables, ordering or row ids.
//! - [`RelationalBackend`]: SQLite, which provides all of that itself.
//!
//! [`Store`] picks one of them once, from a [`StorageConfig`], and hides the
//! choice behind [`MeasurementStore`].
//!
//! # Example
//!
//! ```no_run
//! use sensornode_store::{MeasurementStore, StorageConfig, Store};
//!
//! let mut store = Store::open(&StorageConfig::default())?;
//! store.write(215)?;
//! store.write_text("INSERT INTO measurements (value) VALUES (220);")?;
//!
//! for m in store.read_recent(10)? {
//!     println!("{} {:.1}", m.created_at_display(), m.value_in_units());
//! }
//! # Ok::<(), sensornode_store::Error>(())
//! ```

mod clock;
mod config;
mod error;
mod interceptor;
mod medium;
mod relational;
mod ring;
mod schema;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    Backend, DATABASE_FILE, MAX_NAMESPACE_LEN, StorageConfig, ValidationError, default_data_dir,
};
pub use error::{Error, ErrorKind, Result};
pub use interceptor::{LEGACY_MEASUREMENTS_TABLE, MEASUREMENTS_TABLE, Statement, extract_value};
pub use medium::{AccessMode, Entries, FileMedium, Medium, MemoryMedium, NamespaceSession};
pub use relational::RelationalBackend;
pub use ring::{DEFAULT_CAPACITY, DEFAULT_NAMESPACE, RingBackend, RingState, Slot};
pub use store::{MeasurementStore, Store, StoreStatus};

pub use sensornode_types::Measurement;
