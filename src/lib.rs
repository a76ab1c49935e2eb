//! # TableBrain
//!
//! Redis-style data structures persisted in one relational table:
//! - Scalars, ordered lists, deduplicated sets and field hashes
//! - A JSON-valued column holding each value (lists as whole arrays)
//! - One FIFO transaction queue serializing every read-modify-write
//! - A record directory for identity records with name lookups
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │            RecordDirectory        Command (CLI)              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  Brain (engine)                              │
//! │        scalar / list / set / hash / introspection            │
//! └──────────┬──────────────────────────────────┬───────────────┘
//!            │ read-modify-write                │ plain reads/writes
//!            ▼                                  │
//!   ┌──────────────────────┐                    │
//!   │ TransactionSequencer │                    │
//!   │  BEGIN → unit → COMMIT                    │
//!   └──────────┬───────────┘                    │
//!              ▼                                ▼
//!   ┌─────────────────────────────────────────────────┐
//!   │   QueryExecutor  →  ConnectionGate (SQLite)      │
//!   └─────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! # async fn demo() -> tablebrain::Result<()> {
//! use serde_json::json;
//! use tablebrain::{Brain, Config};
//!
//! let brain = Brain::open(Config::builder().in_memory().build())?;
//! brain.rpush("queue", json!("job-1")).await?;
//! assert_eq!(brain.lindex("queue", 0).await?, Some(json!("job-1")));
//! brain.close().await?;
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod codec;
pub mod store;
pub mod engine;
pub mod directory;
pub mod command;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{BrainError, Result};
pub use config::{AddressSource, Config, TransactionMode};
pub use engine::{Brain, KeyKind, Placement, MAX_LSET_PADDING, SADD_NOOP};
pub use directory::{Record, RecordDirectory};
pub use command::Command;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of TableBrain
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
