//! Query Executor
//!
//! Every statement goes through here. Driver failures are logged and turned
//! into an empty result, so callers see "no rows" whether the query found
//! nothing or failed.

use rusqlite::{params_from_iter, Row};

use super::{ConnectionGate, SqlParam};

pub struct QueryExecutor {
    gate: ConnectionGate,
}

impl QueryExecutor {
    pub fn new(gate: ConnectionGate) -> Self {
        Self { gate }
    }

    pub fn gate(&self) -> &ConnectionGate {
        &self.gate
    }

    /// Run a row-returning statement
    pub async fn query<T, F>(&self, sql: &str, params: Vec<SqlParam>, map: F) -> Vec<T>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.gate.ready().await;

        let outcome = self.gate.with_connection(|conn| {
            let mut stmt = conn.prepare_cached(sql)?;
            let rows = stmt.query_map(params_from_iter(params.iter()), map)?;
            rows.collect::<rusqlite::Result<Vec<T>>>()
        });

        match outcome {
            Some(Ok(rows)) => rows,
            Some(Err(e)) => {
                tracing::error!("SQL error: {} (query: {})", e, sql);
                Vec::new()
            }
            None => {
                tracing::error!("SQL error: connection closed (query: {})", sql);
                Vec::new()
            }
        }
    }

    /// Run a statement that returns no rows; yields the affected row count
    pub async fn execute(&self, sql: &str, params: Vec<SqlParam>) -> usize {
        self.gate.ready().await;

        let outcome = self.gate.with_connection(|conn| {
            let mut stmt = conn.prepare_cached(sql)?;
            stmt.execute(params_from_iter(params.iter()))
        });

        match outcome {
            Some(Ok(changed)) => changed,
            Some(Err(e)) => {
                tracing::error!("SQL error: {} (statement: {})", e, sql);
                0
            }
            None => {
                tracing::error!("SQL error: connection closed (statement: {})", sql);
                0
            }
        }
    }
}
