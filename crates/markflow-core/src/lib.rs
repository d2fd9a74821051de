//! # markflow-core: Pure Domain Logic for the Marking Workflow
//!
//! This crate is the **heart** of markflow. It contains the SSCC
//! allocation core and the marking-workflow parsers as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       markflow Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │        Hosts (web form, desktop shell, batch jobs)              │   │
//! │  │        own the transaction and present the warnings             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ markflow-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌────────────┐  │   │
//! │  │   │   sscc    │  │  policy   │  │ allocator │  │  counter   │  │   │
//! │  │   │check digit│  │ prefixes  │  │orchestrate│  │   trait    │  │   │
//! │  │   │ composer  │  │ capacity  │  │  + result │  │  + memory  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └────────────┘  │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                  │   │
//! │  │   │datamatrix │  │ taskfile  │  │validation │                  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                  │   │
//! │  │                                                                 │   │
//! │  │   NO DATABASE • NO NETWORK • NO FILE SYSTEM                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ CounterStore trait                     │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 markflow-db (Database Layer)                    │   │
//! │  │        SQLite counter store, settings, repositories             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`sscc`] - GS1 check digit and SSCC composition
//! - [`policy`] - prefix selection, capacity, warning thresholds
//! - [`counter`] - the counter-store trait and its in-memory test double
//! - [`allocator`] - the allocation orchestration
//! - [`datamatrix`] - tobacco DataMatrix parsing
//! - [`taskfile`] - aggregation task CSV parsing
//! - [`validation`] - field validators
//! - [`types`] - shared domain records
//! - [`error`] - typed errors for all of the above
//!
//! ## Design Principles
//!
//! 1. **Pure/impure split**: composition and check-digit math never
//!    block; all transactional interaction is confined to the allocator
//!    and happens through the [`counter::CounterStore`] trait
//! 2. **Explicit configuration**: [`policy::SsccConfig`] is injected at
//!    construction, validated once, immutable after
//! 3. **Warnings as data**: capacity warnings ride the success path;
//!    the core never logs
//! 4. **Explicit errors**: all errors are typed, never strings or panics
//!
//! ## Example
//!
//! ```rust
//! use markflow_core::allocator::SsccAllocator;
//! use markflow_core::counter::MemoryCounterStore;
//! use markflow_core::policy::SsccConfig;
//! use markflow_core::SSCC_COUNTER;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let config = SsccConfig::new("461234567", "469999999", 9_900_000, 80).unwrap();
//! let allocator = SsccAllocator::new(config);
//!
//! let mut store = MemoryCounterStore::new().with_counter(SSCC_COUNTER, 0);
//! let allocation = allocator.allocate(&mut store, SSCC_COUNTER, 1).await.unwrap();
//! assert_eq!(allocation.id, 1);
//! assert_eq!(allocation.full_sscc.len(), 18);
//! # });
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod allocator;
pub mod counter;
pub mod datamatrix;
pub mod error;
pub mod policy;
pub mod sscc;
pub mod taskfile;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use markflow_core::SsccAllocator` instead of
// `use markflow_core::allocator::SsccAllocator`

pub use allocator::{Allocation, SsccAllocator};
pub use counter::{CounterStore, MemoryCounterStore};
pub use error::{
    AllocError, ComposeError, ConfigError, CounterError, DataMatrixError, TaskFileError,
    ValidationError,
};
pub use policy::{CapacityStatus, PrefixPolicy, SsccConfig};
pub use sscc::Sscc;
pub use types::{AggregationTask, TaskStatus};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Name of the shared SSCC counter row.
///
/// The allocator takes the counter name per call, so deployments that
/// want one counter per prefix can pass e.g. `sscc_id_461234567`
/// instead; this constant is the conventional single-counter default.
pub const SSCC_COUNTER: &str = "sscc_id";

/// Length of the 17-digit base (extension + prefix + serial).
pub const BASE_LENGTH: usize = 17;

/// Length of a full SSCC including the check digit.
pub const SSCC_LENGTH: usize = 18;

/// GS1 company prefixes run from 1 to 16 digits.
pub const MAX_PREFIX_LENGTH: usize = 16;

/// Length of a GTIN as it appears in task files and tobacco codes.
pub const GTIN_LENGTH: usize = 14;

/// Fixed length of a cleaned tobacco DataMatrix.
pub const TOBACCO_DM_LENGTH: usize = 29;

/// Maximum codes per generation request.
///
/// Keeps a single web-form submission from consuming an unbounded run
/// of the identifier space; larger jobs go through repeated requests.
pub const MAX_BATCH_QUANTITY: i64 = 1000;

/// Maximum owner attribution length stored with a batch.
pub const MAX_OWNER_LENGTH: usize = 100;
