//! # Counter Store Interface
//!
//! The narrow seam between the pure allocator and whatever holds the
//! counters: two operations, both inside a caller-owned transaction.
//!
//! ## Isolation Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              Two allocators, one counter                                │
//! │                                                                         │
//! │  Caller A: BEGIN ── acquire("sscc_id") ──► 41 (holds write lock)       │
//! │  Caller B: BEGIN ── acquire("sscc_id") ──► ...blocked...               │
//! │  Caller A: advance("sscc_id", 42) ── COMMIT (lock released)            │
//! │  Caller B:                        ──► 42 (reads A's committed value)   │
//! │  Caller B: advance("sscc_id", 43) ── COMMIT                            │
//! │                                                                         │
//! │  At most one holder at a time; duplicates are impossible.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Implementations: `markflow-db` provides the SQLite transaction store;
//! [`MemoryCounterStore`] below serializes trivially and backs unit tests
//! and dry runs.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::CounterError;

// =============================================================================
// Trait
// =============================================================================

/// Transactional access to named, monotonically increasing counters.
///
/// Both methods run inside the caller's open transaction. A value read
/// by [`acquire`](CounterStore::acquire) stays locked until that
/// transaction commits or rolls back, so concurrent allocators on the
/// same name serialize.
#[async_trait]
pub trait CounterStore: Send {
    /// Reads `current_value` for `name` and takes a write lock that
    /// persists until commit/rollback.
    ///
    /// ## Errors
    /// [`CounterError::Unknown`] when the counter row does not exist.
    async fn acquire(&mut self, name: &str) -> Result<i64, CounterError>;

    /// Writes `new_value` for `name` without releasing the lock.
    ///
    /// Callers only ever pass values greater than the one they acquired;
    /// the counter never decreases.
    async fn advance(&mut self, name: &str, new_value: i64) -> Result<(), CounterError>;
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// In-memory counter store for tests and dry runs.
///
/// Serialization is trivial here: the store requires `&mut self`, so one
/// caller at a time by construction. "Rollback" is the caller dropping
/// the store (or simply not committing anything - there is nothing to
/// commit).
///
/// ## Example
/// ```rust
/// use markflow_core::counter::MemoryCounterStore;
///
/// let store = MemoryCounterStore::new().with_counter("sscc_id", 0);
/// assert_eq!(store.get("sscc_id"), Some(0));
/// ```
#[derive(Debug, Default, Clone)]
pub struct MemoryCounterStore {
    counters: HashMap<String, i64>,
}

impl MemoryCounterStore {
    /// Creates an empty store (every acquire fails until counters exist).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a counter row, builder-style.
    pub fn with_counter(mut self, name: impl Into<String>, value: i64) -> Self {
        self.counters.insert(name.into(), value);
        self
    }

    /// Reads a counter without locking (test assertions).
    pub fn get(&self, name: &str) -> Option<i64> {
        self.counters.get(name).copied()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn acquire(&mut self, name: &str) -> Result<i64, CounterError> {
        self.counters
            .get(name)
            .copied()
            .ok_or_else(|| CounterError::Unknown {
                name: name.to_string(),
            })
    }

    async fn advance(&mut self, name: &str, new_value: i64) -> Result<(), CounterError> {
        match self.counters.get_mut(name) {
            Some(value) => {
                *value = new_value;
                Ok(())
            }
            None => Err(CounterError::Unknown {
                name: name.to_string(),
            }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
