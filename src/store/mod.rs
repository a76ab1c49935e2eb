//! Store Module
//!
//! Everything that touches the physical connection.
//!
//! ## Layering
//! ```text
//!   TransactionSequencer   (one FIFO slot: BEGIN → unit → COMMIT)
//!            │
//!            ▼
//!     QueryExecutor        (awaits readiness, swallows driver errors)
//!            │
//!            ▼
//!    ConnectionGate        (one connection, version gate, schema)
//! ```

mod executor;
mod gate;
mod sequencer;

pub use executor::QueryExecutor;
pub use gate::{meets_minimum_version, ConnectionGate, MIN_SQLITE_VERSION};
pub use sequencer::TransactionSequencer;

/// Owned SQL parameter
///
/// Parameters are owned so that query futures stay `Send`.
pub type SqlParam = rusqlite::types::Value;

/// Owned text parameter
pub fn text(s: &str) -> SqlParam {
    SqlParam::Text(s.to_owned())
}
