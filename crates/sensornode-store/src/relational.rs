//! SQLite-backed measurement store.

use std::path::Path;

use rusqlite::Connection;
use tracing::{debug, info};

use sensornode_types::Measurement;

use crate::error::{Error, Result};
use crate::interceptor::extract_value;
use crate::schema;

/// Measurement store that leaves ordering and identity to SQLite.
pub struct RelationalBackend {
    conn: Connection,
}

impl std::fmt::Debug for RelationalBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationalBackend")
            .field("path", &self.conn.path())
            .finish()
    }
}

impl RelationalBackend {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        info!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        schema::initialize(&conn)?;

        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    /// Create the measurements table if it does not exist.
    pub fn create_if_absent(&mut self) -> Result<()> {
        schema::initialize(&self.conn)
    }

    /// Insert one reading; the engine assigns id and timestamp.
    pub fn write(&mut self, value: i32) -> Result<()> {
        self.conn
            .execute("INSERT INTO measurements (value) VALUES (?1)", [value])?;
        debug!(
            "Inserted measurement {} as row {}",
            value,
            self.conn.last_insert_rowid()
        );
        Ok(())
    }

    /// Insert the numeric payload of an insert statement or numeric string.
    ///
    /// The text goes through the same extraction as on the ring backend, so
    /// both backends store the same value for the same input.
    pub fn write_text(&mut self, text: &str) -> Result<()> {
        self.write(extract_value(text))
    }

    /// Run raw SQL against the engine.
    pub fn execute(&mut self, sql: &str) -> Result<()> {
        debug!("Executing: {}", sql);
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    /// Up to `limit` most recent measurements, newest first.
    pub fn read_recent(&self, limit: u16) -> Result<Vec<Measurement>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, created_at, value FROM measurements
             ORDER BY created_at DESC, id DESC LIMIT ?1",
        )?;

        let measurements = stmt
            .query_map([limit], |row| {
                let id: i64 = row.get(0)?;
                Ok(Measurement::from_unix(
                    u64::try_from(id).unwrap_or_default(),
                    row.get(1)?,
                    row.get(2)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!("Read {} of {} requested measurements", measurements.len(), limit);
        Ok(measurements)
    }

    /// Number of stored measurements.
    pub fn count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM measurements", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
