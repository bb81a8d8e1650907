//! Persistent school storage.
//!
//! The [`SchoolStore`] trait is the only capability the HTTP layer needs:
//! insert a validated school and read every stored school back. The
//! SQLite-backed [`SqliteSchoolStore`] is the production implementation.
//!
//! # Invariants
//! - Every statement is a single atomic operation; no multi-statement
//!   transactions are used.
//! - Returned stores have the `schools` table created.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use rusqlite::{params, Connection};

use crate::error::{GeoError, Result};
use crate::school::{NewSchool, School};

const CREATE_SCHOOLS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS schools (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    address TEXT NOT NULL,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL
);";

/// Storage capability for school records.
pub trait SchoolStore: Send + Sync {
    /// Persist a school and return its generated identifier.
    fn insert(&self, school: &NewSchool) -> Result<i64>;

    /// Return every stored school in insertion order.
    fn list_all(&self) -> Result<Vec<School>>;
}

/// SQLite-backed [`SchoolStore`].
///
/// The connection is opened once and shared behind a mutex; SQLite
/// serializes writers anyway.
pub struct SqliteSchoolStore {
    conn: Mutex<Connection>,
}

impl SqliteSchoolStore {
    /// Open (or create) a database file and ensure the schema exists.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Store`] if the file cannot be opened or the
    /// schema cannot be created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        Self::bootstrap("file", || Connection::open(path))
    }

    /// Open an ephemeral in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::bootstrap("memory", Connection::open_in_memory)
    }

    fn bootstrap<F>(mode: &'static str, open: F) -> Result<Self>
    where
        F: FnOnce() -> rusqlite::Result<Connection>,
    {
        let started_at = Instant::now();
        tracing::info!(mode, "Opening school store");

        let result = open().and_then(|conn| {
            conn.busy_timeout(Duration::from_secs(5))?;
            conn.execute_batch(CREATE_SCHOOLS_TABLE)?;
            Ok(conn)
        });

        match result {
            Ok(conn) => {
                tracing::info!(
                    mode,
                    duration_ms = started_at.elapsed().as_millis() as u64,
                    "School store ready"
                );
                Ok(Self {
                    conn: Mutex::new(conn),
                })
            }
            Err(e) => {
                tracing::error!(
                    mode,
                    duration_ms = started_at.elapsed().as_millis() as u64,
                    error = %e,
                    "Failed to open school store"
                );
                Err(e.into())
            }
        }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| GeoError::StorePoisoned)
    }
}

impl SchoolStore for SqliteSchoolStore {
    fn insert(&self, school: &NewSchool) -> Result<i64> {
        let conn = self.conn()?;
        let location = school.location();
        conn.execute(
            "INSERT INTO schools (name, address, latitude, longitude) VALUES (?1, ?2, ?3, ?4)",
            params![
                school.name(),
                school.address(),
                location.latitude,
                location.longitude
            ],
        )?;
        let id = conn.last_insert_rowid();
        tracing::debug!(id, "School inserted");
        Ok(id)
    }

    fn list_all(&self) -> Result<Vec<School>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT id, name, address, latitude, longitude FROM schools ORDER BY id")?;
        let schools = stmt
            .query_map([], |row| {
                Ok(School {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    address: row.get(2)?,
                    latitude: row.get(3)?,
                    longitude: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(schools)
    }
}
