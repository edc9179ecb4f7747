//! Table layout of the relational backend.
//!
//! The layout revision lives in SQLite's `user_version` header field. The
//! table DDL is idempotent and runs on every call, so a dropped
//! `measurements` table comes back whatever the header says.

use rusqlite::Connection;
use tracing::{info, warn};

use crate::error::Result;

/// Layout revision written to `user_version`.
pub const LAYOUT_VERSION: i32 = 1;

/// `created_at` is filled in by the engine, in seconds since the epoch.
const MEASUREMENTS_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS measurements (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        created_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER)),
        value INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_measurements_created_at
        ON measurements(created_at);
"#;

/// Ensure the measurements table and its index exist.
pub fn initialize(conn: &Connection) -> Result<()> {
    conn.execute_batch(MEASUREMENTS_DDL)?;

    match layout_version(conn)? {
        0 => {
            conn.pragma_update(None, "user_version", LAYOUT_VERSION)?;
            info!("Created measurements table (layout {})", LAYOUT_VERSION);
        }
        LAYOUT_VERSION => {}
        other => warn!(
            "Database reports layout {}, this build knows {}",
            other, LAYOUT_VERSION
        ),
    }
    Ok(())
}

fn layout_version(conn: &Connection) -> Result<i32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_table(conn: &Connection, name: &str) -> bool {
        conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn test_initialize_fresh_database() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(layout_version(&conn).unwrap(), 0);

        initialize(&conn).unwrap();
        assert!(has_table(&conn, "measurements"));
        assert_eq!(layout_version(&conn).unwrap(), LAYOUT_VERSION);

        initialize(&conn).unwrap();
        assert_eq!(layout_version(&conn).unwrap(), LAYOUT_VERSION);
    }

    #[test]
    fn test_initialize_restores_table_when_version_is_set() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn.execute_batch("DROP TABLE measurements;").unwrap();
        assert!(!has_table(&conn, "measurements"));

        initialize(&conn).unwrap();
        assert!(has_table(&conn, "measurements"));
    }

    #[test]
    fn test_newer_layout_is_left_alone() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "user_version", LAYOUT_VERSION + 1)
            .unwrap();
        initialize(&conn).unwrap();
        assert!(has_table(&conn, "measurements"));
        assert_eq!(layout_version(&conn).unwrap(), LAYOUT_VERSION + 1);
    }

    #[test]
    fn test_engine_fills_created_at() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn.execute("INSERT INTO measurements (value) VALUES (215)", [])
            .unwrap();

        let (created_at, value): (i64, i32) = conn
            .query_row("SELECT created_at, value FROM measurements", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert!(created_at > 1_577_836_800);
        assert_eq!(value, 215);
    }
}
