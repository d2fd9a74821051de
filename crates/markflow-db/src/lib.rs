//! # markflow-db: Database Layer for markflow
//!
//! This crate provides database access for the marking workflow.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        markflow Data Flow                               │
//! │                                                                         │
//! │  Host request (generate batch, upload task file)                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    markflow-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌────────────────┐   ┌──────────────┐   │   │
//! │  │   │   Database    │   │  Repositories  │   │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │   │ settings/sscc/ │   │  (embedded)  │   │   │
//! │  │   │               │◄──│  aggregation   │   │ 001_init.sql │   │   │
//! │  │   └───────┬───────┘   └────────────────┘   └──────────────┘   │   │
//! │  │           │                                                    │   │
//! │  │   ┌───────▼──────────────────────────────────────────────┐    │   │
//! │  │   │ counter_store: CounterStore on sqlx transactions,    │    │   │
//! │  │   │ consumed by the markflow-core allocator              │    │   │
//! │  │   └──────────────────────────────────────────────────────┘    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (WAL)                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`counter_store`] - the allocator's counter store on transactions
//! - [`error`] - Database error types
//! - [`repository`] - settings, aggregation tasks, SSCC batches
//!
//! ## Usage
//!
//! ```rust,ignore
//! use markflow_core::allocator::SsccAllocator;
//! use markflow_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/markflow.db")).await?;
//!
//! let config = db.settings().load_sscc_config().await?;
//! let allocator = SsccAllocator::new(config);
//!
//! let batch = db.sscc().generate_batch(&allocator, "Acme", 10).await?;
//! if let Some(warning) = &batch.warning {
//!     eprintln!("{warning}");
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod counter_store;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use counter_store::SqliteCounterStore;
pub use error::DbError;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::aggregation::{AggregationTaskRepository, IngestReport};
pub use repository::settings::SettingsRepository;
pub use repository::sscc::{SsccBatch, SsccRecord, SsccRepository};
