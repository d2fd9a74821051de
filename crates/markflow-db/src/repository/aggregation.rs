//! # Aggregation Task Repository
//!
//! Stores the tasks loaded from customer CSV files.
//!
//! ## Ingest Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  uploaded file text                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  markflow_core::taskfile::parse_task_file   (pure, no I/O)             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   SINGLE TRANSACTION                            │   │
//! │  │  for each row:                                                  │   │
//! │  │    INSERT ... ON CONFLICT (sscc) DO UPDATE                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  IngestReport { loaded, skipped, delimiter }                           │
//! │                                                                         │
//! │  Upsert keyed by SSCC: re-uploading a corrected file replaces rows     │
//! │  in place instead of duplicating them.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;
use markflow_core::taskfile::{parse_task_file, TaskFileRow};
use markflow_core::types::{AggregationTask, TaskStatus};

/// Outcome of one file ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    /// Rows inserted or updated.
    pub loaded: usize,

    /// Rows the parser filtered out (bad SSCC/GTIN, empty fields).
    pub skipped: usize,

    /// Delimiter the parser detected.
    pub delimiter: u8,
}

/// Repository for aggregation task operations.
#[derive(Debug, Clone)]
pub struct AggregationTaskRepository {
    pool: SqlitePool,
}

impl AggregationTaskRepository {
    /// Creates a new AggregationTaskRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AggregationTaskRepository { pool }
    }

    /// Parses an uploaded task file and upserts its rows for `order_id`.
    ///
    /// Parsing is delegated to the pure core parser; everything that
    /// survives it lands in one transaction. A parse error leaves the
    /// database untouched.
    pub async fn ingest_file(
        &self,
        order_id: i64,
        owner: &str,
        content: &str,
    ) -> DbResult<IngestReport> {
        let report = parse_task_file(content)?;
        info!(
            order_id,
            rows = report.rows.len(),
            skipped = report.skipped,
            "Ingesting aggregation task file"
        );

        let loaded = self.upsert_tasks(order_id, owner, &report.rows).await?;

        Ok(IngestReport {
            loaded,
            skipped: report.skipped,
            delimiter: report.delimiter,
        })
    }

    /// Upserts parsed rows in a single transaction, keyed by `sscc`.
    ///
    /// New rows start as `pending`; re-uploaded rows are reset to
    /// `pending` as well, since a corrected file supersedes whatever
    /// state the old task was in.
    pub async fn upsert_tasks(
        &self,
        order_id: i64,
        owner: &str,
        rows: &[TaskFileRow],
    ) -> DbResult<usize> {
        let mut tx = self.pool.begin().await?;

        for row in rows {
            debug!(sscc = %row.sscc, order_id, "Upserting aggregation task");

            sqlx::query(
                "INSERT INTO aggregation_tasks \
                     (sscc, gtin, container_id, order_id, owner, status) \
                 VALUES (?1, ?2, ?3, ?4, ?5, 'pending') \
                 ON CONFLICT (sscc) DO UPDATE SET \
                     gtin = excluded.gtin, \
                     container_id = excluded.container_id, \
                     order_id = excluded.order_id, \
                     owner = excluded.owner, \
                     status = excluded.status",
            )
            .bind(&row.sscc)
            .bind(&row.gtin)
            .bind(&row.container_id)
            .bind(order_id)
            .bind(owner)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(rows.len())
    }

    /// Lists all tasks for an order, in SSCC order.
    pub async fn list_for_order(&self, order_id: i64) -> DbResult<Vec<AggregationTask>> {
        let tasks = sqlx::query_as::<_, AggregationTask>(
            "SELECT sscc, gtin, container_id, order_id, owner, status \
             FROM aggregation_tasks \
             WHERE order_id = ?1 \
             ORDER BY sscc",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    /// Counts tasks for an order still waiting to be worked.
    pub async fn pending_count(&self, order_id: i64) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM aggregation_tasks \
             WHERE order_id = ?1 AND status = 'pending'",
        )
        .bind(order_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Marks one task completed.
    pub async fn mark_completed(&self, sscc: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE aggregation_tasks SET status = ?2 WHERE sscc = ?1",
        )
        .bind(sscc)
        .bind(TaskStatus::Completed)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(crate::error::DbError::not_found("Aggregation task", sscc));
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
