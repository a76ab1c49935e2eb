//! Transaction Sequencer
//!
//! Serializes units of work into one FIFO chain on the shared connection.
//!
//! Admission goes through a fair async mutex: waiters are granted the slot
//! in the order they asked for it, and only the holder may have a
//! transaction open.
//!
//! ## Cancellation
//! A unit whose future is dropped after `BEGIN` is finished by a guard on
//! drop, with the statement a failed unit would get. The connection is never
//! left inside a transaction for the next unit.

use std::future::Future;

use tokio::sync::{Mutex, MutexGuard};

use crate::config::TransactionMode;
use crate::error::Result;

use super::QueryExecutor;

tokio::task_local! {
    /// Set while a unit of work is being polled
    static IN_UNIT: bool;
}

pub struct TransactionSequencer {
    /// The chain's tail; holding the guard means owning the open transaction
    slot: Mutex<()>,
    mode: TransactionMode,
}

impl TransactionSequencer {
    pub fn new(mode: TransactionMode) -> Self {
        Self {
            slot: Mutex::new(()),
            mode,
        }
    }

    /// Run `work` between BEGIN and COMMIT once every earlier unit finished
    ///
    /// In [`TransactionMode::CommitOnFailure`] a failed unit is still
    /// committed before its error is returned, so writes it made before
    /// failing stay durable. `work` must not enqueue another unit.
    pub async fn enqueue<T, Fut>(&self, executor: &QueryExecutor, work: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        let _turn = self.slot.lock().await;

        executor.execute("BEGIN", Vec::new()).await;
        let mut open = OpenTransaction {
            executor,
            mode: self.mode,
            finished: false,
        };

        let result = IN_UNIT.scope(true, work).await;

        let finish = match (&result, self.mode) {
            (Err(e), TransactionMode::RollbackOnFailure) => {
                tracing::debug!("Unit of work failed, rolling back: {}", e);
                "ROLLBACK"
            }
            (Err(e), TransactionMode::CommitOnFailure) => {
                tracing::debug!("Unit of work failed, committing anyway: {}", e);
                "COMMIT"
            }
            (Ok(_), _) => "COMMIT",
        };
        executor.execute(finish, Vec::new()).await;
        open.finished = true;

        result
    }

    /// Run a plain write so it cannot land inside another unit's transaction
    ///
    /// Only [`TransactionMode::RollbackOnFailure`] needs this: there a
    /// failing unit's ROLLBACK would also discard writes that were already
    /// acknowledged. Inside a unit (or in commit mode) `work` runs directly.
    pub async fn isolate<T, Fut>(&self, work: Fut) -> T
    where
        Fut: Future<Output = T>,
    {
        if self.mode == TransactionMode::CommitOnFailure || in_unit() {
            return work.await;
        }

        let _turn = self.slot.lock().await;
        work.await
    }

    /// Wait for every queued unit and hold the slot
    pub async fn drain(&self) -> MutexGuard<'_, ()> {
        self.slot.lock().await
    }
}

/// Whether the current task is polling a unit of work
fn in_unit() -> bool {
    IN_UNIT.try_with(|inside| *inside).unwrap_or(false)
}

/// Finishes a transaction whose unit was dropped mid-flight
struct OpenTransaction<'a> {
    executor: &'a QueryExecutor,
    mode: TransactionMode,
    finished: bool,
}

impl Drop for OpenTransaction<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        let finish = match self.mode {
            TransactionMode::RollbackOnFailure => "ROLLBACK",
            TransactionMode::CommitOnFailure => "COMMIT",
        };
        tracing::debug!("Unit of work cancelled, issuing {}", finish);

        match self.executor.gate().with_connection(|conn| conn.execute_batch(finish)) {
            Some(Err(e)) => tracing::error!("SQL error: {} (statement: {})", e, finish),
            Some(Ok(())) | None => {}
        }
    }
}
