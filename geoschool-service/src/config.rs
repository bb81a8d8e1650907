//! Service configuration loaded from environment variables.

use geoschool::SqliteSchoolStore;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default SQLite database path.
pub const DEFAULT_DB_PATH: &str = "schools.db";

/// Database path that selects an ephemeral in-memory store.
pub const IN_MEMORY_DB_PATH: &str = ":memory:";

/// Runtime configuration for the school service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// HTTP server port (`PORT`).
    pub port: u16,
    /// SQLite database path (`SCHOOLS_DB_PATH`).
    pub database_path: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_path: DEFAULT_DB_PATH.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from the process environment.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `PORT` | HTTP server port | 3000 |
    /// | `SCHOOLS_DB_PATH` | SQLite file, or `:memory:` | `schools.db` |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(value) => value.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %value, fallback = DEFAULT_PORT, "Invalid PORT, using default");
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        let database_path = lookup("SCHOOLS_DB_PATH")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());

        Self {
            port,
            database_path,
        }
    }

    /// Open the school store described by this configuration.
    pub fn open_store(&self) -> geoschool::Result<SqliteSchoolStore> {
        if self.database_path == IN_MEMORY_DB_PATH {
            SqliteSchoolStore::open_in_memory()
        } else {
            SqliteSchoolStore::open(&self.database_path)
        }
    }
}
