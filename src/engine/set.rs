//! Set operations
//!
//! A set is a list row flagged `isset`. Uniqueness is checked here before
//! appending; the storage layer knows nothing about it.

use serde_json::Value;

use crate::codec::JsonColumn;
use crate::error::{BrainError, Result};

use super::list::{find_index, End};
use super::Brain;

/// Returned by [`Brain::sadd`] when the value was already a member
pub const SADD_NOOP: i64 = -1;

impl Brain {
    /// Add `value` unless already present
    ///
    /// Returns the new cardinality, or [`SADD_NOOP`] when nothing changed.
    pub async fn sadd(&self, key: &str, value: Value) -> Result<i64> {
        let nkey = self.keys.namespace(key);
        self.transaction(async {
            if self.is_member(&nkey, &value).await? {
                return Ok(SADD_NOOP);
            }

            let mut values = self.load_list(key, &nkey).await?.unwrap_or_default();
            values.push(value);
            let card = values.len() as i64;

            self.store_list(&nkey, values, true).await?;
            Ok::<_, BrainError>(card)
        })
        .await
    }

    pub async fn sismember(&self, key: &str, value: &Value) -> Result<bool> {
        self.is_member(&self.keys.namespace(key), value).await
    }

    pub async fn srem(&self, key: &str, value: Value) -> Result<usize> {
        self.lrem(key, value).await
    }

    pub async fn scard(&self, key: &str) -> Result<usize> {
        self.llen(key).await
    }

    /// Remove and return a member
    ///
    /// Always takes the most recently added member, not a random one.
    pub async fn spop(&self, key: &str) -> Result<Option<Value>> {
        self.pop(key, End::Tail).await
    }

    /// A uniformly chosen member, without removing it
    ///
    /// A plain read: it does not wait for queued transactional units.
    pub async fn srandmember(&self, key: &str) -> Result<Option<Value>> {
        let sql = format!(
            "SELECT value -> ('$[' || abs(random() % json_array_length(value)) || ']') FROM {} \
             WHERE key = ?1 AND subkey IS NULL AND json_type(value) = 'array' \
             AND json_array_length(value) > 0 LIMIT 1",
            self.table()
        );
        let rows = self
            .executor
            .query(&sql, vec![self.keys.namespace(key).into()], |row| {
                row.get::<_, JsonColumn>(0)
            })
            .await;
        Ok(rows.into_iter().next().and_then(JsonColumn::into_inner))
    }

    pub async fn smembers(&self, key: &str) -> Result<Vec<Value>> {
        Ok(self.lgetall(key).await?.unwrap_or_default())
    }

    async fn is_member(&self, nkey: &str, value: &Value) -> Result<bool> {
        match self.load_set(nkey).await {
            Some(values) => Ok(find_index(&values, value)?.is_some()),
            None => Ok(false),
        }
    }
}
