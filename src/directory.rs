//! Record Directory
//!
//! Identity records (user profiles and the like) kept as one hash: every
//! record is a field of [`RECORDS_KEY`] named by the record id, holding the
//! whole serialized record.
//!
//! [`RECORDS_KEY`] is namespaced like any other key, so each prefix has its
//! own directory. It shows up in `keys` and is cleared by a scoped `reset`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::codec::ValueCodec;
use crate::engine::Brain;
use crate::error::{BrainError, Result};

/// Hash holding every record
pub const RECORDS_KEY: &str = "users";

/// An identity record
///
/// Attributes beyond `name` and `location` are kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Distinguishing attribute: a lookup asking for a different location
    /// replaces the stored record
    #[serde(default, alias = "room", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            location: None,
            attributes: Map::new(),
        }
    }

    /// Build a record from loose attributes; `id` wins over any `"id"` entry
    pub fn from_attributes(id: &str, mut attrs: Map<String, Value>) -> Result<Self> {
        attrs.insert("id".to_string(), Value::String(id.to_string()));
        ValueCodec::from_value(Value::Object(attrs))
            .map_err(|e| BrainError::InvalidRecord(format!("record '{}': {}", id, e)))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    fn name_lowercase(&self) -> Option<String> {
        self.name.as_deref().map(str::to_lowercase)
    }
}

/// Record lookups over the engine's hash primitives
pub struct RecordDirectory<'a> {
    brain: &'a Brain,
}

impl<'a> RecordDirectory<'a> {
    pub fn new(brain: &'a Brain) -> Self {
        Self { brain }
    }

    /// Get-or-create
    ///
    /// A missing record is created from `attrs`. An existing record is
    /// replaced when `attrs` names a `location` different from the stored
    /// one; otherwise it is returned unchanged.
    pub async fn record_for_id(&self, id: &str, attrs: Map<String, Value>) -> Result<Record> {
        self.brain
            .transaction(async {
                let wanted = ["location", "room"]
                    .iter()
                    .find_map(|name| attrs.get(*name).and_then(Value::as_str));

                if let Some(existing) = self.get(id).await? {
                    let moved = matches!(wanted, Some(loc) if existing.location.as_deref() != Some(loc));
                    if !moved {
                        return Ok(existing);
                    }
                    tracing::debug!("Record '{}' moved to {:?}; replacing", id, wanted);
                }

                let record = Record::from_attributes(id, attrs.clone())?;
                self.add(&record).await?;
                Ok::<_, BrainError>(record)
            })
            .await
    }

    /// Exact, case-insensitive name match
    pub async fn record_for_name(&self, name: &str) -> Result<Option<Record>> {
        let wanted = name.to_lowercase();
        Ok(self
            .all()
            .await?
            .into_iter()
            .find(|record| record.name_lowercase().as_deref() == Some(wanted.as_str())))
    }

    /// Every record whose name starts with `prefix` (case-insensitive)
    pub async fn records_for_raw_fuzzy_name(&self, prefix: &str) -> Result<Vec<Record>> {
        let prefix = prefix.to_lowercase();
        Ok(self
            .all()
            .await?
            .into_iter()
            .filter(|record| {
                record
                    .name_lowercase()
                    .map(|name| name.starts_with(&prefix))
                    .unwrap_or(false)
            })
            .collect())
    }

    /// Prefix matches, narrowed to the exact match when there is one
    pub async fn records_for_fuzzy_name(&self, prefix: &str) -> Result<Vec<Record>> {
        let wanted = prefix.to_lowercase();
        let matches = self.records_for_raw_fuzzy_name(prefix).await?;

        let exact = matches
            .iter()
            .find(|record| record.name_lowercase().as_deref() == Some(wanted.as_str()))
            .cloned();

        Ok(match exact {
            Some(record) => vec![record],
            None => matches,
        })
    }

    /// Write (or overwrite) a record
    pub async fn add(&self, record: &Record) -> Result<()> {
        let value = ValueCodec::to_value(record)?;
        self.brain.hset(RECORDS_KEY, &record.id, value).await
    }

    pub async fn get(&self, id: &str) -> Result<Option<Record>> {
        Ok(self
            .brain
            .hget(RECORDS_KEY, id)
            .await?
            .and_then(|value| decode_record(id, value)))
    }

    pub async fn remove(&self, id: &str) -> Result<bool> {
        self.brain.hdel(RECORDS_KEY, id).await
    }

    /// Every stored record; undecodable entries are skipped
    pub async fn all(&self) -> Result<Vec<Record>> {
        let fields = self.brain.hgetall(RECORDS_KEY).await?;
        Ok(fields
            .into_iter()
            .filter_map(|(id, value)| decode_record(&id, value))
            .collect())
    }
}

fn decode_record(id: &str, value: Value) -> Option<Record> {
    match ValueCodec::from_value::<Record>(ValueCodec::deserialize(value)) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!("Skipping undecodable record '{}': {}", id, e);
            None
        }
    }
}
