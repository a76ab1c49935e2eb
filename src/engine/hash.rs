//! Hash operations
//!
//! A hash is a family of rows sharing `key`, one per field, with the field
//! name in `subkey`. Fields are written independently.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::codec::JsonColumn;
use crate::error::{BrainError, Result};
use crate::store::text;

use super::{add_integer, Brain};

impl Brain {
    pub async fn hset(&self, table: &str, field: &str, value: Value) -> Result<()> {
        let nkey = self.keys.namespace(table);
        self.sequencer
            .isolate(self.update_sub_value(&nkey, field, &value))
            .await
    }

    pub async fn hget(&self, table: &str, field: &str) -> Result<Option<Value>> {
        Ok(self
            .get_sub_value(&self.keys.namespace(table), field)
            .await)
    }

    /// Delete one field; returns whether it existed
    pub async fn hdel(&self, table: &str, field: &str) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE key = ?1 AND subkey = ?2", self.table());
        let removed = self
            .sequencer
            .isolate(
                self.executor
                    .execute(&sql, vec![self.keys.namespace(table).into(), text(field)]),
            )
            .await;
        Ok(removed > 0)
    }

    pub async fn hexists(&self, table: &str, field: &str) -> Result<bool> {
        Ok(self.subkey_exists(&self.keys.namespace(table), field).await)
    }

    /// Field names, in insertion order
    pub async fn hkeys(&self, table: &str) -> Result<Vec<String>> {
        let sql = format!(
            "SELECT subkey FROM {} WHERE key = ?1 AND subkey IS NOT NULL ORDER BY rowid",
            self.table()
        );
        Ok(self
            .executor
            .query(&sql, vec![self.keys.namespace(table).into()], |row| {
                row.get::<_, String>(0)
            })
            .await)
    }

    /// Field values, in insertion order
    pub async fn hvals(&self, table: &str) -> Result<Vec<Value>> {
        let sql = format!(
            "SELECT value FROM {} WHERE key = ?1 AND subkey IS NOT NULL ORDER BY rowid",
            self.table()
        );
        let rows = self
            .executor
            .query(&sql, vec![self.keys.namespace(table).into()], |row| {
                row.get::<_, JsonColumn>(0)
            })
            .await;
        Ok(rows.into_iter().filter_map(JsonColumn::into_inner).collect())
    }

    pub async fn hlen(&self, table: &str) -> Result<usize> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE key = ?1 AND subkey IS NOT NULL",
            self.table()
        );
        let rows = self
            .executor
            .query(&sql, vec![self.keys.namespace(table).into()], |row| {
                row.get::<_, i64>(0)
            })
            .await;
        Ok(rows.first().map(|&n| n.max(0) as usize).unwrap_or(0))
    }

    pub async fn hgetall(&self, table: &str) -> Result<BTreeMap<String, Value>> {
        let sql = format!(
            "SELECT subkey, value FROM {} WHERE key = ?1 AND subkey IS NOT NULL",
            self.table()
        );
        let rows = self
            .executor
            .query(&sql, vec![self.keys.namespace(table).into()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, JsonColumn>(1)?))
            })
            .await;

        Ok(rows
            .into_iter()
            .map(|(field, value)| (field, value.into_inner().unwrap_or(Value::Null)))
            .collect())
    }

    /// Add `delta` to an integer field, creating it at `delta`
    pub async fn hincrby(&self, table: &str, field: &str, delta: i64) -> Result<i64> {
        let nkey = self.keys.namespace(table);
        self.transaction(async {
            let current = self.get_sub_value(&nkey, field).await;
            let total = add_integer(&format!("{}.{}", table, field), current.as_ref(), delta)?;
            self.update_sub_value(&nkey, field, &Value::from(total)).await?;
            Ok::<_, BrainError>(total)
        })
        .await
    }
}
