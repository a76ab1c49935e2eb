//! List operations
//!
//! A list is one JSON array. Every mutation reads the whole array inside a
//! sequenced unit, edits it in memory and writes the whole array back.
//! Element equality is equality of serialized JSON.

use serde_json::Value;

use crate::codec::{JsonColumn, ValueCodec};
use crate::error::{BrainError, Result};
use crate::store::text;

use super::{Brain, Placement};

/// Largest number of `null`s `lset` will pad a list with
pub const MAX_LSET_PADDING: usize = 1024;

/// Which end of the list an operation works on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum End {
    Head,
    Tail,
}

impl Brain {
    pub async fn llen(&self, key: &str) -> Result<usize> {
        let sql = format!(
            "SELECT json_array_length(value) FROM {} \
             WHERE key = ?1 AND subkey IS NULL AND json_type(value) = 'array' LIMIT 1",
            self.table()
        );
        let rows = self
            .executor
            .query(&sql, vec![self.keys.namespace(key).into()], |row| {
                row.get::<_, i64>(0)
            })
            .await;
        Ok(rows.first().map(|&n| n.max(0) as usize).unwrap_or(0))
    }

    /// Element at `index`; negative indices count from the tail
    pub async fn lindex(&self, key: &str, index: i64) -> Result<Option<Value>> {
        let sql = format!(
            "SELECT value -> ?2 FROM {} \
             WHERE key = ?1 AND subkey IS NULL AND json_type(value) = 'array' LIMIT 1",
            self.table()
        );
        let rows = self
            .executor
            .query(
                &sql,
                vec![self.keys.namespace(key).into(), element_path(index).into()],
                |row| row.get::<_, JsonColumn>(0),
            )
            .await;
        Ok(rows.into_iter().next().and_then(JsonColumn::into_inner))
    }

    /// The whole list, or `None` when the key holds no array
    pub async fn lgetall(&self, key: &str) -> Result<Option<Vec<Value>>> {
        match self.get_value(&self.keys.namespace(key)).await {
            Some(Value::Array(values)) => Ok(Some(values)),
            _ => Ok(None),
        }
    }

    /// Elements `start..=end`; negative indices count from the tail
    pub async fn lrange(&self, key: &str, start: i64, end: i64) -> Result<Vec<Value>> {
        let values = self.lgetall(key).await?.unwrap_or_default();
        Ok(match inclusive_range(values.len(), start, end) {
            Some((from, to)) => values[from..to].to_vec(),
            None => Vec::new(),
        })
    }

    /// Overwrite the element at `index`
    ///
    /// An index past the tail pads the list with `null`s, at most
    /// [`MAX_LSET_PADDING`] of them.
    pub async fn lset(&self, key: &str, index: i64, value: Value) -> Result<()> {
        let nkey = self.keys.namespace(key);
        self.transaction(async {
            let mut values = self.load_list(key, &nkey).await?.unwrap_or_default();

            let slot = set_slot(values.len(), index).ok_or_else(|| {
                BrainError::IndexOutOfRange {
                    key: key.to_string(),
                    index,
                }
            })?;
            if slot >= values.len() {
                values.resize(slot + 1, Value::Null);
            }
            values[slot] = value;

            self.store_list(&nkey, values, false).await
        })
        .await
    }

    /// Prepend; returns the new length
    pub async fn lpush(&self, key: &str, value: Value) -> Result<usize> {
        self.push(key, value, End::Head).await
    }

    /// Append; returns the new length
    pub async fn rpush(&self, key: &str, value: Value) -> Result<usize> {
        self.push(key, value, End::Tail).await
    }

    pub async fn lpop(&self, key: &str) -> Result<Option<Value>> {
        self.pop(key, End::Head).await
    }

    pub async fn rpop(&self, key: &str) -> Result<Option<Value>> {
        self.pop(key, End::Tail).await
    }

    /// Insert `value` next to the first element equal to `pivot`
    ///
    /// Returns the new length, or `-1` (list untouched) when `pivot` is not
    /// in the list.
    pub async fn linsert(
        &self,
        key: &str,
        placement: Placement,
        pivot: Value,
        value: Value,
    ) -> Result<i64> {
        let nkey = self.keys.namespace(key);
        self.transaction(async {
            let mut values = match self.load_list(key, &nkey).await? {
                Some(values) => values,
                None => return Ok(-1),
            };
            let idx = match find_index(&values, &pivot)? {
                Some(idx) => idx,
                None => return Ok(-1),
            };

            let at = match placement {
                Placement::Before => idx,
                Placement::After => idx + 1,
            };
            values.insert(at, value);
            let len = values.len() as i64;

            self.store_list(&nkey, values, false).await?;
            Ok::<_, BrainError>(len)
        })
        .await
    }

    /// Remove every element equal to `value`; returns how many went
    pub async fn lrem(&self, key: &str, value: Value) -> Result<usize> {
        let nkey = self.keys.namespace(key);
        self.transaction(async {
            let values = match self.load_list(key, &nkey).await? {
                Some(values) => values,
                None => return Ok(0),
            };

            let target = ValueCodec::serialize(&value)?;
            let serialized = values
                .iter()
                .map(ValueCodec::serialize)
                .collect::<Result<Vec<_>>>()?;
            let kept = serialized
                .iter()
                .filter(|s| **s != target)
                .map(|s| ValueCodec::deserialize_forced(s))
                .collect::<Result<Vec<_>>>()?;

            let removed = values.len() - kept.len();
            if removed > 0 {
                self.store_list(&nkey, kept, false).await?;
            }
            Ok::<_, BrainError>(removed)
        })
        .await
    }

    // =========================================================================
    // Shared Helpers
    // =========================================================================

    async fn push(&self, key: &str, value: Value, end: End) -> Result<usize> {
        let nkey = self.keys.namespace(key);
        self.transaction(async {
            let mut values = self.load_list(key, &nkey).await?.unwrap_or_default();
            match end {
                End::Head => values.insert(0, value),
                End::Tail => values.push(value),
            }
            let len = values.len();

            self.store_list(&nkey, values, false).await?;
            Ok::<_, BrainError>(len)
        })
        .await
    }

    pub(super) async fn pop(&self, key: &str, end: End) -> Result<Option<Value>> {
        let nkey = self.keys.namespace(key);
        self.transaction(async {
            let mut values = match self.load_list(key, &nkey).await? {
                Some(values) => values,
                None => return Ok(None),
            };

            let popped = match end {
                End::Head if !values.is_empty() => Some(values.remove(0)),
                End::Head => None,
                End::Tail => values.pop(),
            };
            if popped.is_some() {
                self.store_list(&nkey, values, false).await?;
            }
            Ok::<_, BrainError>(popped)
        })
        .await
    }

    /// Read the array under `nkey`
    ///
    /// A missing row or a JSON `null` is an absent list; any other non-array
    /// value is [`BrainError::WrongType`].
    pub(super) async fn load_list(&self, key: &str, nkey: &str) -> Result<Option<Vec<Value>>> {
        match self.get_value(nkey).await {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(values)) => Ok(Some(values)),
            Some(_) => Err(BrainError::WrongType {
                key: key.to_string(),
            }),
        }
    }

    /// Rewrite the whole array under `nkey`
    pub(super) async fn store_list(
        &self,
        nkey: &str,
        values: Vec<Value>,
        is_set: bool,
    ) -> Result<()> {
        self.update_value(nkey, &Value::Array(values), is_set).await
    }

    /// Fetch the array only if the row carries the set flag
    pub(super) async fn load_set(&self, nkey: &str) -> Option<Vec<Value>> {
        let sql = format!(
            "SELECT value FROM {} \
             WHERE key = ?1 AND subkey IS NULL AND isset AND json_type(value) = 'array' LIMIT 1",
            self.table()
        );
        match self.first_json(&sql, vec![text(nkey)]).await {
            Some(Value::Array(values)) => Some(values),
            _ => None,
        }
    }
}

/// Position of the first element whose serialized form equals `target`'s
pub(super) fn find_index(values: &[Value], target: &Value) -> Result<Option<usize>> {
    let target = ValueCodec::serialize(target)?;
    for (idx, value) in values.iter().enumerate() {
        if ValueCodec::serialize(value)? == target {
            return Ok(Some(idx));
        }
    }
    Ok(None)
}

/// Position `lset` writes to, if `index` is usable for a list of `len`
fn set_slot(len: usize, index: i64) -> Option<usize> {
    let slot = if index < 0 {
        i64::try_from(len).ok()?.checked_add(index)?
    } else {
        index
    };
    let slot = usize::try_from(slot).ok()?;

    let limit = len.checked_add(MAX_LSET_PADDING)?;
    (slot <= limit).then_some(slot)
}

/// JSON path for one array element (`$[2]`, `$[#-1]`)
fn element_path(index: i64) -> String {
    if index >= 0 {
        format!("$[{}]", index)
    } else {
        format!("$[#{}]", index)
    }
}

/// Half-open bounds for the inclusive range `start..=end` over `len` items
fn inclusive_range(len: usize, start: i64, end: i64) -> Option<(usize, usize)> {
    let len = len as i64;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let end = if end < 0 { len + end } else { end.min(len - 1) };

    if len == 0 || start > end || start >= len {
        return None;
    }
    Some((start as usize, end as usize + 1))
}
