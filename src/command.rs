//! Command definitions
//!
//! A single-enum view of the engine surface, used by the CLI. Every reply is
//! rendered as JSON.

use serde_json::{json, Map, Value};

use crate::engine::{Brain, Placement};
use crate::error::Result;

/// A parsed command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Health check; also forces the connection up
    Ping,

    // Scalars
    Get { key: String },
    Set { key: String, value: Value },
    Del { key: String },
    IncrBy { key: String, delta: i64 },
    DecrBy { key: String, delta: i64 },

    // Lists
    LPush { key: String, value: Value },
    RPush { key: String, value: Value },
    LPop { key: String },
    RPop { key: String },
    LLen { key: String },
    LIndex { key: String, index: i64 },
    LRange { key: String, start: i64, end: i64 },
    LSet { key: String, index: i64, value: Value },
    LInsert { key: String, placement: Placement, pivot: Value, value: Value },
    LRem { key: String, value: Value },

    // Sets
    SAdd { key: String, value: Value },
    SRem { key: String, value: Value },
    SIsMember { key: String, value: Value },
    SCard { key: String },
    SMembers { key: String },
    SRandMember { key: String },
    SPop { key: String },

    // Hashes
    HSet { table: String, field: String, value: Value },
    HGet { table: String, field: String },
    HDel { table: String, field: String },
    HGetAll { table: String },
    HKeys { table: String },
    HVals { table: String },
    HLen { table: String },
    HExists { table: String, field: String },
    HIncrBy { table: String, field: String, delta: i64 },

    // Keyspace
    Exists { key: String },
    Type { key: String },
    Keys { prefix: String },
}

impl Command {
    /// Command name, for logging
    pub fn name(&self) -> &'static str {
        match self {
            Command::Ping => "PING",
            Command::Get { .. } => "GET",
            Command::Set { .. } => "SET",
            Command::Del { .. } => "DEL",
            Command::IncrBy { .. } => "INCRBY",
            Command::DecrBy { .. } => "DECRBY",
            Command::LPush { .. } => "LPUSH",
            Command::RPush { .. } => "RPUSH",
            Command::LPop { .. } => "LPOP",
            Command::RPop { .. } => "RPOP",
            Command::LLen { .. } => "LLEN",
            Command::LIndex { .. } => "LINDEX",
            Command::LRange { .. } => "LRANGE",
            Command::LSet { .. } => "LSET",
            Command::LInsert { .. } => "LINSERT",
            Command::LRem { .. } => "LREM",
            Command::SAdd { .. } => "SADD",
            Command::SRem { .. } => "SREM",
            Command::SIsMember { .. } => "SISMEMBER",
            Command::SCard { .. } => "SCARD",
            Command::SMembers { .. } => "SMEMBERS",
            Command::SRandMember { .. } => "SRANDMEMBER",
            Command::SPop { .. } => "SPOP",
            Command::HSet { .. } => "HSET",
            Command::HGet { .. } => "HGET",
            Command::HDel { .. } => "HDEL",
            Command::HGetAll { .. } => "HGETALL",
            Command::HKeys { .. } => "HKEYS",
            Command::HVals { .. } => "HVALS",
            Command::HLen { .. } => "HLEN",
            Command::HExists { .. } => "HEXISTS",
            Command::HIncrBy { .. } => "HINCRBY",
            Command::Exists { .. } => "EXISTS",
            Command::Type { .. } => "TYPE",
            Command::Keys { .. } => "KEYS",
        }
    }
}

impl Brain {
    /// Execute a command
    ///
    /// Routes commands to the matching engine operation; absent values come
    /// back as JSON `null`.
    pub async fn execute(&self, command: Command) -> Result<Value> {
        tracing::trace!("Executing {}", command.name());

        let reply = match command {
            Command::Ping => {
                self.ready().await;
                json!("PONG")
            }

            Command::Get { key } => self.get(&key).await?.unwrap_or(Value::Null),
            Command::Set { key, value } => {
                self.set(&key, value).await?;
                json!("OK")
            }
            Command::Del { key } => {
                self.remove(&key).await?;
                json!("OK")
            }
            Command::IncrBy { key, delta } => json!(self.incr_by(&key, delta).await?),
            Command::DecrBy { key, delta } => json!(self.decr_by(&key, delta).await?),

            Command::LPush { key, value } => json!(self.lpush(&key, value).await?),
            Command::RPush { key, value } => json!(self.rpush(&key, value).await?),
            Command::LPop { key } => self.lpop(&key).await?.unwrap_or(Value::Null),
            Command::RPop { key } => self.rpop(&key).await?.unwrap_or(Value::Null),
            Command::LLen { key } => json!(self.llen(&key).await?),
            Command::LIndex { key, index } => {
                self.lindex(&key, index).await?.unwrap_or(Value::Null)
            }
            Command::LRange { key, start, end } => {
                Value::Array(self.lrange(&key, start, end).await?)
            }
            Command::LSet { key, index, value } => {
                self.lset(&key, index, value).await?;
                json!("OK")
            }
            Command::LInsert {
                key,
                placement,
                pivot,
                value,
            } => json!(self.linsert(&key, placement, pivot, value).await?),
            Command::LRem { key, value } => json!(self.lrem(&key, value).await?),

            Command::SAdd { key, value } => json!(self.sadd(&key, value).await?),
            Command::SRem { key, value } => json!(self.srem(&key, value).await?),
            Command::SIsMember { key, value } => json!(self.sismember(&key, &value).await?),
            Command::SCard { key } => json!(self.scard(&key).await?),
            Command::SMembers { key } => Value::Array(self.smembers(&key).await?),
            Command::SRandMember { key } => {
                self.srandmember(&key).await?.unwrap_or(Value::Null)
            }
            Command::SPop { key } => self.spop(&key).await?.unwrap_or(Value::Null),

            Command::HSet {
                table,
                field,
                value,
            } => {
                self.hset(&table, &field, value).await?;
                json!("OK")
            }
            Command::HGet { table, field } => {
                self.hget(&table, &field).await?.unwrap_or(Value::Null)
            }
            Command::HDel { table, field } => json!(self.hdel(&table, &field).await?),
            Command::HGetAll { table } => {
                let fields: Map<String, Value> = self.hgetall(&table).await?.into_iter().collect();
                Value::Object(fields)
            }
            Command::HKeys { table } => json!(self.hkeys(&table).await?),
            Command::HVals { table } => Value::Array(self.hvals(&table).await?),
            Command::HLen { table } => json!(self.hlen(&table).await?),
            Command::HExists { table, field } => json!(self.hexists(&table, &field).await?),
            Command::HIncrBy {
                table,
                field,
                delta,
            } => json!(self.hincrby(&table, &field, delta).await?),

            Command::Exists { key } => json!(self.exists(&key).await?),
            Command::Type { key } => match self.key_type(&key).await? {
                Some(kind) => json!(kind.as_str()),
                None => Value::Null,
            },
            Command::Keys { prefix } => json!(self.keys(&prefix).await?),
        };

        Ok(reply)
    }
}
