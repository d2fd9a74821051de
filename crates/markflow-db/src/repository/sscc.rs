//! # SSCC Batch Repository
//!
//! Batch generation on behalf of a named owner, and the record of what
//! was handed out.
//!
//! ## Batch Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │            generate_batch(allocator, "Acme", 3)                        │
//! │                                                                         │
//! │  validate owner + quantity (1..=1000)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   SINGLE TRANSACTION                            │   │
//! │  │                                                                 │   │
//! │  │  loop n times:                                                  │   │
//! │  │    allocator.allocate(SqliteCounterStore(tx), "sscc_id", 1)    │   │
//! │  │    INSERT INTO sscc_allocations (id, batch_id, owner, ...)     │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT ← counter advance and recorded codes land together;            │
//! │           any failure (capacity!) rolls ALL of it back                 │
//! │                                                                         │
//! │  Exhaustion mid-batch therefore never burns identifiers: the           │
//! │  counter reverts with the rows.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::counter_store::SqliteCounterStore;
use crate::error::DbResult;
use markflow_core::allocator::{Allocation, SsccAllocator};
use markflow_core::validation::{validate_batch_quantity, validate_owner};
use markflow_core::SSCC_COUNTER;

/// One generated batch: the codes plus the most severe capacity notice.
#[derive(Debug, Clone)]
pub struct SsccBatch {
    /// UUID grouping this request's rows in `sscc_allocations`.
    pub batch_id: String,

    /// Owner the codes were generated for.
    pub owner: String,

    /// The allocations, in id order.
    pub codes: Vec<Allocation>,

    /// Warning from the highest allocated id, if the batch crossed the
    /// warning threshold.
    pub warning: Option<String>,
}

/// A recorded allocation, as stored.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SsccRecord {
    pub id: i64,
    pub batch_id: String,
    pub owner: String,
    pub prefix: String,
    pub base_sscc: String,
    pub full_sscc: String,
    pub created_at: DateTime<Utc>,
}

/// Repository for SSCC batch generation and history.
#[derive(Debug, Clone)]
pub struct SsccRepository {
    pool: SqlitePool,
}

impl SsccRepository {
    /// Creates a new SsccRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SsccRepository { pool }
    }

    /// Generates `quantity` codes for `owner` in one transaction.
    ///
    /// The shared `sscc_id` counter is advanced once per code; each
    /// identifier is validated individually, so exhaustion surfaces at
    /// the first offending id and nothing is committed.
    ///
    /// ## Errors
    /// - [`crate::error::DbError::Validation`] - bad owner or quantity,
    ///   checked before any counter is touched
    /// - [`crate::error::DbError::Allocation`] - capacity exhausted or
    ///   counter missing; the transaction is rolled back
    pub async fn generate_batch(
        &self,
        allocator: &SsccAllocator,
        owner: &str,
        quantity: i64,
    ) -> DbResult<SsccBatch> {
        validate_owner(owner)?;
        validate_batch_quantity(quantity)?;

        let owner = owner.trim();
        let batch_id = Uuid::new_v4().to_string();
        let created_at = Utc::now();

        info!(batch_id = %batch_id, owner, quantity, "Generating SSCC batch");

        let mut tx = self.pool.begin().await?;
        let mut codes = Vec::with_capacity(quantity as usize);
        let mut warning = None;

        for _ in 0..quantity {
            let allocation = allocator
                .allocate(&mut SqliteCounterStore::new(&mut tx), SSCC_COUNTER, 1)
                .await?;
            debug!(id = allocation.id, sscc = %allocation.full_sscc, "Recorded SSCC");

            sqlx::query(
                "INSERT INTO sscc_allocations \
                     (id, batch_id, owner, prefix, base_sscc, full_sscc, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .bind(allocation.id)
            .bind(&batch_id)
            .bind(owner)
            .bind(&allocation.prefix)
            .bind(&allocation.base_sscc)
            .bind(&allocation.full_sscc)
            .bind(created_at)
            .execute(&mut *tx)
            .await?;

            // Ids only grow, so the last warning seen is the most severe
            if allocation.warning.is_some() {
                warning = allocation.warning.clone();
            }
            codes.push(allocation);
        }

        tx.commit().await?;

        Ok(SsccBatch {
            batch_id,
            owner: owner.to_string(),
            codes,
            warning,
        })
    }

    /// Lists the most recently allocated codes, newest first.
    pub async fn recent(&self, limit: i64) -> DbResult<Vec<SsccRecord>> {
        let records = sqlx::query_as::<_, SsccRecord>(
            "SELECT id, batch_id, owner, prefix, base_sscc, full_sscc, created_at \
             FROM sscc_allocations \
             ORDER BY id DESC \
             LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Lists every code generated for one owner, in allocation order.
    pub async fn history_for_owner(&self, owner: &str) -> DbResult<Vec<SsccRecord>> {
        let records = sqlx::query_as::<_, SsccRecord>(
            "SELECT id, batch_id, owner, prefix, base_sscc, full_sscc, created_at \
             FROM sscc_allocations \
             WHERE owner = ?1 \
             ORDER BY id",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
