//! # SQLite Counter Store
//!
//! [`SqliteCounterStore`] adapts a `sqlx::Transaction<'_, Sqlite>` to the
//! core's [`CounterStore`] trait: the caller's open transaction IS the
//! store, exactly as the allocator's contract requires. Commit publishes
//! the advanced value; dropping the transaction rolls it back and the
//! counter reverts.
//!
//! ## Locking
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SQLite has no SELECT ... FOR UPDATE. Instead, acquire() issues        │
//! │                                                                         │
//! │     UPDATE system_counters SET current_value = current_value           │
//! │     WHERE counter_name = ?  RETURNING current_value                    │
//! │                                                                         │
//! │  The self-assignment write promotes the transaction to the database    │
//! │  write lock atomically with the read. A second allocator's acquire()   │
//! │  blocks (up to the busy timeout) until the first commits, then reads   │
//! │  the committed value - the same serialization a row lock gives, with   │
//! │  database-wide scope.                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let mut tx = db.begin().await?;
//! let allocation = allocator
//!     .allocate(&mut SqliteCounterStore::new(&mut tx), SSCC_COUNTER, 1)
//!     .await?;
//! // ... more work on `tx` ...
//! tx.commit().await?;
//! ```

use async_trait::async_trait;
use sqlx::{Sqlite, Transaction};

use markflow_core::counter::CounterStore;
use markflow_core::error::CounterError;

/// Counter store view over a borrowed SQLite transaction.
///
/// Borrowing (rather than owning) keeps the transaction with the
/// caller, who still has inserts to run and the commit to issue after
/// the allocator returns.
#[derive(Debug)]
pub struct SqliteCounterStore<'a, 'c> {
    tx: &'a mut Transaction<'c, Sqlite>,
}

impl<'a, 'c> SqliteCounterStore<'a, 'c> {
    /// Wraps an open transaction.
    pub fn new(tx: &'a mut Transaction<'c, Sqlite>) -> Self {
        SqliteCounterStore { tx }
    }
}

/// Maps any sqlx failure on the counter path to the trait's error type.
fn backend(err: sqlx::Error) -> CounterError {
    CounterError::Backend {
        message: err.to_string(),
    }
}

#[async_trait]
impl<'a, 'c> CounterStore for SqliteCounterStore<'a, 'c> {
    async fn acquire(&mut self, name: &str) -> Result<i64, CounterError> {
        // Self-assignment UPDATE: takes the write lock and reads in one
        // statement. Zero rows means the counter was never provisioned.
        let value: Option<i64> = sqlx::query_scalar(
            "UPDATE system_counters \
             SET current_value = current_value \
             WHERE counter_name = ?1 \
             RETURNING current_value",
        )
        .bind(name)
        .fetch_optional(&mut **self.tx)
        .await
        .map_err(backend)?;

        value.ok_or_else(|| CounterError::Unknown {
            name: name.to_string(),
        })
    }

    async fn advance(&mut self, name: &str, new_value: i64) -> Result<(), CounterError> {
        let result = sqlx::query(
            "UPDATE system_counters \
             SET current_value = ?2 \
             WHERE counter_name = ?1",
        )
        .bind(name)
        .bind(new_value)
        .execute(&mut **self.tx)
        .await
        .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(CounterError::Unknown {
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use markflow_core::counter::CounterStore;
    use markflow_core::error::CounterError;
    use markflow_core::SSCC_COUNTER;

    use super::SqliteCounterStore;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_acquire_reads_seeded_counter() {
        let db = test_db().await;

        let mut tx = db.begin().await.unwrap();
        let mut store = SqliteCounterStore::new(&mut tx);
        assert_eq!(store.acquire(SSCC_COUNTER).await.unwrap(), 0);
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_advance_visible_after_commit() {
        let db = test_db().await;

        let mut tx = db.begin().await.unwrap();
        let mut store = SqliteCounterStore::new(&mut tx);
        let value = store.acquire(SSCC_COUNTER).await.unwrap();
        store.advance(SSCC_COUNTER, value + 5).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = db.begin().await.unwrap();
        let mut store = SqliteCounterStore::new(&mut tx);
        assert_eq!(store.acquire(SSCC_COUNTER).await.unwrap(), 5);
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_rollback_restores_previous_value() {
        let db = test_db().await;

        let mut tx = db.begin().await.unwrap();
        let mut store = SqliteCounterStore::new(&mut tx);
        store.advance(SSCC_COUNTER, 99).await.unwrap();
        // Dropping without commit rolls back
        drop(tx);

        let mut tx = db.begin().await.unwrap();
        let mut store = SqliteCounterStore::new(&mut tx);
        assert_eq!(store.acquire(SSCC_COUNTER).await.unwrap(), 0);
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_counter() {
        let db = test_db().await;

        let mut tx = db.begin().await.unwrap();
        let mut store = SqliteCounterStore::new(&mut tx);
        assert!(matches!(
            store.acquire("no_such_counter").await,
            Err(CounterError::Unknown { .. })
        ));
        assert!(matches!(
            store.advance("no_such_counter", 1).await,
            Err(CounterError::Unknown { .. })
        ));
    }
}
