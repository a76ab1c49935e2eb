//! Engine Module
//!
//! Redis-style data structures on top of one JSON-valued table.
//!
//! ## Row Shapes
//! - Scalar: one row, `subkey` NULL, any JSON value
//! - List: one row, `subkey` NULL, JSON array value
//! - Set: a list row with `isset` true; uniqueness is enforced here
//! - Hash: one row per field, `subkey` = field name
//!
//! ## Concurrency Model
//! - Read-modify-write operations (pushes, pops, inserts, removals,
//!   increments) run as units of work on the [`TransactionSequencer`], so
//!   they never interleave with each other.
//! - Plain reads and single-statement writes go straight to the executor and
//!   may observe a queued unit either before or after it ran.
//! - In rollback mode, plain writes wait for the slot instead, so a unit's
//!   ROLLBACK never takes an acknowledged write with it.

mod hash;
mod kind;
mod list;
mod set;

use std::future::Future;

use serde_json::Value;

use crate::codec::{JsonColumn, KeyCodec, ValueCodec};
use crate::config::Config;
use crate::directory::RecordDirectory;
use crate::error::{BrainError, Result};
use crate::store::{text, ConnectionGate, QueryExecutor, SqlParam, TransactionSequencer};

pub use kind::{KeyKind, Placement};
pub use list::MAX_LSET_PADDING;
pub use set::SADD_NOOP;

/// The data structure engine
///
/// `Brain` is `Send + Sync`; share it with `Arc` across tasks. Opening is
/// cheap and does not touch the store: the connection is established on the
/// first operation (or an explicit [`Brain::ready`]).
pub struct Brain {
    /// Engine configuration
    config: Config,

    /// Namespacing for logical keys
    keys: KeyCodec,

    /// Statement execution over the gated connection
    executor: QueryExecutor,

    /// FIFO chain of transactional units
    sequencer: TransactionSequencer,
}

impl Brain {
    /// Create an engine for the given config
    ///
    /// Only validates the config; connecting happens on first use.
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;

        let gate = ConnectionGate::new(&config)?;

        Ok(Self {
            keys: KeyCodec::new(&config.key_prefix),
            executor: QueryExecutor::new(gate),
            sequencer: TransactionSequencer::new(config.transaction_mode),
            config,
        })
    }

    /// Resolves once connected, version-checked, and the schema exists
    pub async fn ready(&self) {
        self.executor.gate().ready().await
    }

    /// Run `work` as one serialized transactional unit
    ///
    /// `work` may use any non-transactional operation (`get`, `set`, `hset`,
    /// queries...) but must not call another transactional one, which would
    /// wait behind itself forever.
    pub async fn transaction<T, Fut>(&self, work: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        self.sequencer.enqueue(&self.executor, work).await
    }

    /// Release the connection once every queued unit has finished
    pub async fn close(&self) -> Result<()> {
        let _slot = self.sequencer.drain().await;
        tracing::info!("Closing connection");
        self.executor.gate().close()
    }

    /// Identity records stored under a well-known hash
    pub fn records(&self) -> RecordDirectory<'_> {
        RecordDirectory::new(self)
    }

    // =========================================================================
    // Scalar Operations
    // =========================================================================

    pub async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.get_value(&self.keys.namespace(key)).await)
    }

    /// Store a scalar (exists-check, then UPDATE or INSERT)
    pub async fn set(&self, key: &str, value: Value) -> Result<()> {
        let nkey = self.keys.namespace(key);
        self.sequencer
            .isolate(self.update_value(&nkey, &value, false))
            .await
    }

    /// Delete every row under the key
    pub async fn remove(&self, key: &str) -> Result<()> {
        let sql = format!("DELETE FROM {} WHERE key = ?1", self.table());
        self.sequencer
            .isolate(self.executor.execute(&sql, vec![self.keys.namespace(key).into()]))
            .await;
        Ok(())
    }

    /// Add `delta` to an integer scalar, creating it at `delta`
    ///
    /// Returns the new total.
    pub async fn incr_by(&self, key: &str, delta: i64) -> Result<i64> {
        let nkey = self.keys.namespace(key);
        self.transaction(async {
            let current = self.get_value(&nkey).await;
            let total = add_integer(key, current.as_ref(), delta)?;
            self.update_value(&nkey, &Value::from(total), false).await?;
            Ok::<_, BrainError>(total)
        })
        .await
    }

    pub async fn decr_by(&self, key: &str, delta: i64) -> Result<i64> {
        let delta = delta.checked_neg().ok_or_else(|| BrainError::Overflow {
            key: key.to_string(),
        })?;
        self.incr_by(key, delta).await
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    pub async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.row_exists(&self.keys.namespace(key)).await)
    }

    /// Classify the shape stored under `key`; `None` when absent
    pub async fn key_type(&self, key: &str) -> Result<Option<KeyKind>> {
        let sql = format!(
            "SELECT MAX(subkey IS NOT NULL), MAX(isset), MAX(json_type(value) = 'array') \
             FROM {} WHERE key = ?1",
            self.table()
        );
        let rows = self
            .executor
            .query(&sql, vec![self.keys.namespace(key).into()], |row| {
                Ok((
                    row.get::<_, Option<i64>>(0)?,
                    row.get::<_, Option<i64>>(1)?,
                    row.get::<_, Option<i64>>(2)?,
                ))
            })
            .await;

        // MAX over zero rows yields a single row of NULLs
        Ok(rows.into_iter().next().and_then(|(subkey, isset, array)| {
            let has_subkey = subkey?;
            Some(KeyKind::classify(
                has_subkey != 0,
                isset.unwrap_or(0) != 0,
                array.unwrap_or(0) != 0,
            ))
        }))
    }

    pub async fn key_types(&self, keys: &[&str]) -> Result<Vec<Option<KeyKind>>> {
        let mut kinds = Vec::with_capacity(keys.len());
        for key in keys {
            kinds.push(self.key_type(key).await?);
        }
        Ok(kinds)
    }

    /// Logical keys whose namespaced form starts with `prefix`
    /// (case-insensitive); an empty prefix lists every key.
    pub async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let sql = format!(
            "SELECT DISTINCT key FROM {} WHERE key LIKE ?1 ESCAPE '\\' ORDER BY key",
            self.table()
        );
        let rows = self
            .executor
            .query(&sql, vec![self.keys.like_pattern(prefix).into()], |row| {
                row.get::<_, String>(0)
            })
            .await;

        Ok(rows
            .iter()
            .map(|key| self.keys.denamespace(key).to_string())
            .collect())
    }

    /// Delete all rows (only this namespace when the table is shared)
    pub async fn reset(&self) -> Result<()> {
        let (sql, params) = if self.config.shared_table {
            (
                format!("DELETE FROM {} WHERE key LIKE ?1 ESCAPE '\\'", self.table()),
                vec![text(&self.keys.like_pattern(""))],
            )
        } else {
            (format!("DELETE FROM {}", self.table()), Vec::new())
        };
        self.sequencer
            .isolate(self.executor.execute(&sql, params))
            .await;
        Ok(())
    }

    // =========================================================================
    // Row Helpers (namespaced keys)
    // =========================================================================

    fn table(&self) -> &str {
        &self.config.table_name
    }

    async fn row_exists(&self, nkey: &str) -> bool {
        let sql = format!("SELECT 1 FROM {} WHERE key = ?1 LIMIT 1", self.table());
        let rows = self
            .executor
            .query(&sql, vec![text(nkey)], |row| row.get::<_, i64>(0))
            .await;
        !rows.is_empty()
    }

    async fn value_exists(&self, nkey: &str) -> bool {
        let sql = format!(
            "SELECT 1 FROM {} WHERE key = ?1 AND subkey IS NULL LIMIT 1",
            self.table()
        );
        let rows = self
            .executor
            .query(&sql, vec![text(nkey)], |row| row.get::<_, i64>(0))
            .await;
        !rows.is_empty()
    }

    async fn subkey_exists(&self, nkey: &str, subkey: &str) -> bool {
        let sql = format!(
            "SELECT 1 FROM {} WHERE key = ?1 AND subkey = ?2 LIMIT 1",
            self.table()
        );
        let rows = self
            .executor
            .query(&sql, vec![text(nkey), text(subkey)], |row| {
                row.get::<_, i64>(0)
            })
            .await;
        !rows.is_empty()
    }

    async fn get_value(&self, nkey: &str) -> Option<Value> {
        let sql = format!(
            "SELECT value FROM {} WHERE key = ?1 AND subkey IS NULL LIMIT 1",
            self.table()
        );
        self.first_json(&sql, vec![text(nkey)]).await
    }

    async fn get_sub_value(&self, nkey: &str, subkey: &str) -> Option<Value> {
        let sql = format!(
            "SELECT value FROM {} WHERE key = ?1 AND subkey = ?2 LIMIT 1",
            self.table()
        );
        self.first_json(&sql, vec![text(nkey), text(subkey)]).await
    }

    async fn first_json(&self, sql: &str, params: Vec<SqlParam>) -> Option<Value> {
        self.executor
            .query(sql, params, |row| row.get::<_, JsonColumn>(0))
            .await
            .into_iter()
            .next()
            .and_then(JsonColumn::into_inner)
    }

    /// Write the value row of `nkey` (not a native upsert)
    ///
    /// `is_set` only applies when the row is created.
    async fn update_value(&self, nkey: &str, value: &Value, is_set: bool) -> Result<()> {
        let serialized = ValueCodec::serialize(value)?;

        if self.value_exists(nkey).await {
            let sql = format!(
                "UPDATE {} SET value = ?1 WHERE key = ?2 AND subkey IS NULL",
                self.table()
            );
            self.executor
                .execute(&sql, vec![serialized.into(), text(nkey)])
                .await;
        } else {
            let sql = format!(
                "INSERT INTO {} (key, value, isset) VALUES (?1, ?2, ?3)",
                self.table()
            );
            self.executor
                .execute(
                    &sql,
                    vec![text(nkey), serialized.into(), SqlParam::Integer(is_set as i64)],
                )
                .await;
        }
        Ok(())
    }

    async fn update_sub_value(&self, nkey: &str, subkey: &str, value: &Value) -> Result<()> {
        let serialized = ValueCodec::serialize(value)?;

        if self.subkey_exists(nkey, subkey).await {
            let sql = format!(
                "UPDATE {} SET value = ?1 WHERE key = ?2 AND subkey = ?3",
                self.table()
            );
            self.executor
                .execute(&sql, vec![serialized.into(), text(nkey), text(subkey)])
                .await;
        } else {
            let sql = format!(
                "INSERT INTO {} (key, subkey, value) VALUES (?1, ?2, ?3)",
                self.table()
            );
            self.executor
                .execute(&sql, vec![text(nkey), text(subkey), serialized.into()])
                .await;
        }
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the key codec
    pub fn key_codec(&self) -> &KeyCodec {
        &self.keys
    }

    /// Whether the connection is currently open
    pub fn is_connected(&self) -> bool {
        self.executor.gate().is_open()
    }
}

/// `current + delta`, treating a missing or JSON-null value as zero
fn add_integer(key: &str, current: Option<&Value>, delta: i64) -> Result<i64> {
    let base = match current {
        None | Some(Value::Null) => 0,
        Some(value) => value.as_i64().ok_or_else(|| BrainError::NotAnInteger {
            key: key.to_string(),
        })?,
    };
    base.checked_add(delta).ok_or_else(|| BrainError::Overflow {
        key: key.to_string(),
    })
}
