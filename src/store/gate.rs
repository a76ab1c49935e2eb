//! Connection Gate
//!
//! Owns the single physical connection and the readiness signal.
//!
//! ## Startup
//! 1. Open the connection (failure is fatal: readiness never resolves)
//! 2. Check the engine version (failure is only logged)
//! 3. Ensure the table exists (failure is fatal)
//!
//! Startup runs once, on the first `ready()` call. Callers arriving while it
//! runs wait on the same cell.

use std::future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use rusqlite::Connection;
use tokio::sync::OnceCell;

use crate::config::{Config, StoreLocation};
use crate::error::{BrainError, Result};

/// First SQLite release with built-in JSON and the `->` operator
pub const MIN_SQLITE_VERSION: (u32, u32, u32) = (3, 38, 0);

/// Gate around the one connection shared by every operation
pub struct ConnectionGate {
    location: StoreLocation,
    table: String,
    busy_timeout: Duration,

    /// `None` before startup and after close
    conn: Mutex<Option<Connection>>,

    /// Resolved once startup succeeds
    ready: OnceCell<()>,

    /// Set when startup failed; later callers park without reconnecting
    failed: AtomicBool,

    /// Set by `close`; startup after this never connects
    closed: AtomicBool,
}

impl ConnectionGate {
    /// Prepare a gate; nothing is opened until [`ConnectionGate::ready`]
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            location: config.location()?,
            table: config.table_name.clone(),
            busy_timeout: Duration::from_millis(config.busy_timeout_ms),
            conn: Mutex::new(None),
            ready: OnceCell::new(),
            failed: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        })
    }

    /// Resolves once the connection is open and the schema exists
    ///
    /// Never resolves if the connection could not be established.
    pub async fn ready(&self) {
        self.ready.get_or_init(|| self.startup()).await;
    }

    async fn startup(&self) {
        if self.failed.load(Ordering::Acquire) {
            return future::pending().await;
        }
        if self.closed.load(Ordering::Acquire) {
            tracing::debug!("Gate closed before startup; not connecting");
            return;
        }

        match self.connect() {
            Ok(conn) => {
                *self.conn.lock() = Some(conn);
                tracing::info!("Successfully connected to {:?}", self.location);
                return;
            }
            Err(e) => {
                self.failed.store(true, Ordering::Release);
                tracing::error!("Failed to connect to {:?}: {}", self.location, e);
            }
        }

        future::pending::<()>().await
    }

    fn connect(&self) -> Result<Connection> {
        let conn = match &self.location {
            StoreLocation::Memory => Connection::open_in_memory()?,
            StoreLocation::File(path) => Connection::open(path)?,
        };
        conn.busy_timeout(self.busy_timeout)?;

        Self::check_version(&conn);

        conn.execute(&schema_sql(&self.table), [])?;
        Ok(conn)
    }

    fn check_version(conn: &Connection) {
        let version = conn.query_row("SELECT sqlite_version()", [], |row| row.get::<_, String>(0));
        match version {
            Ok(v) if meets_minimum_version(&v) => {
                tracing::debug!("SQLite version {}", v);
            }
            Ok(v) => {
                let (major, minor, patch) = MIN_SQLITE_VERSION;
                tracing::error!(
                    "SQLite version must be at least {}.{}.{} (found {})",
                    major,
                    minor,
                    patch,
                    v
                );
            }
            Err(e) => tracing::error!("Could not read SQLite version: {}", e),
        }
    }

    /// Run `f` against the open connection
    ///
    /// Returns `None` when the connection is not open.
    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Option<rusqlite::Result<T>> {
        let guard = self.conn.lock();
        guard.as_ref().map(f)
    }

    pub fn is_open(&self) -> bool {
        self.conn.lock().is_some()
    }

    /// Release the connection
    ///
    /// Closing twice is a no-op.
    pub fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        let conn = self.conn.lock().take();
        match conn {
            Some(conn) => conn.close().map_err(|(_, e)| BrainError::from(e)),
            None => Ok(()),
        }
    }
}

fn schema_sql(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\
            key varchar(255) NOT NULL, \
            subkey varchar(255), \
            isset boolean NOT NULL DEFAULT false, \
            value text CHECK (value IS NULL OR json_valid(value)), \
            UNIQUE (key, subkey))",
        table
    )
}

/// Whether a `major.minor.patch` version string is new enough
///
/// Unparsable versions are treated as too old.
pub fn meets_minimum_version(version: &str) -> bool {
    let mut parts = version.trim().split('.').map(|p| p.parse::<u32>());
    let major = match parts.next() {
        Some(Ok(n)) => n,
        _ => return false,
    };
    let minor = match parts.next() {
        Some(Ok(n)) => n,
        None => 0,
        Some(Err(_)) => return false,
    };
    let patch = match parts.next() {
        Some(Ok(n)) => n,
        None => 0,
        Some(Err(_)) => return false,
    };
    (major, minor, patch) >= MIN_SQLITE_VERSION
}
