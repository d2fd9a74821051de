//! # SSCC Allocator
//!
//! Orchestrates one allocation: lock, read, select prefix, validate
//! capacity, compose, advance, return.
//!
//! ## Allocation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      allocate(store, "sscc_id", 1)                      │
//! │                                                                         │
//! │  1. acquire("sscc_id")          ──► current_value (write-locked)       │
//! │  2. new_value = current + inc                                           │
//! │  3. policy.select(new_value)    ──► prefix                              │
//! │  4. policy.classify(new_value)                                          │
//! │        ├── Exhausted ──► Err(CapacityExhausted)   [no advance,          │
//! │        │                                           caller rolls back]   │
//! │        ├── Warning   ──► warning string on the result                   │
//! │        └── Ok        ──► no warning                                     │
//! │  5. compose(new_value, prefix)  ──► base / full SSCC                    │
//! │  6. advance("sscc_id", new_value)                                       │
//! │  7. return Allocation                                                   │
//! │                                                                         │
//! │  The allocator holds NO transaction of its own: the caller opens one,  │
//! │  passes the store bound to it, and commits after the call returns.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Blocks of `n` codes are `n` calls inside one transaction; each
//! identifier is validated individually, so exhaustion surfaces at the
//! first offending id and the whole transaction rolls back together.

use serde::{Deserialize, Serialize};

use crate::counter::CounterStore;
use crate::error::{AllocError, AllocResult, ComposeError};
use crate::policy::{CapacityStatus, PrefixPolicy, SsccConfig};
use crate::sscc::{compose, Sscc};

// =============================================================================
// Allocation Result
// =============================================================================

/// The outcome of one successful allocation. Ephemeral: the core never
/// persists these; a separate store may record them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    /// The newly assigned counter value.
    pub id: i64,

    /// The company prefix that encodes this id.
    pub prefix: String,

    /// 17-digit base (extension + prefix + padded serial).
    pub base_sscc: String,

    /// 18-digit code (base + check digit).
    pub full_sscc: String,

    /// Capacity notice once consumption crosses the warning threshold.
    /// Data, not logging: presentation is the caller's concern.
    pub warning: Option<String>,
}

// =============================================================================
// Allocator
// =============================================================================

/// Monotonic, transactionally safe SSCC allocator.
///
/// Holds only the validated policy; all state lives behind the
/// [`CounterStore`] the caller passes per call, so one allocator can
/// serve any number of concurrent transactions.
///
/// ## Example
/// ```rust
/// use markflow_core::allocator::SsccAllocator;
/// use markflow_core::counter::MemoryCounterStore;
/// use markflow_core::policy::SsccConfig;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let config = SsccConfig::new("461234567", "469999999", 9_900_000, 80).unwrap();
/// let allocator = SsccAllocator::new(config);
///
/// let mut store = MemoryCounterStore::new().with_counter("sscc_id", 41);
/// let allocation = allocator.allocate(&mut store, "sscc_id", 1).await.unwrap();
///
/// assert_eq!(allocation.id, 42);
/// assert_eq!(allocation.full_sscc, "046123456700000426");
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct SsccAllocator {
    policy: PrefixPolicy,
}

impl SsccAllocator {
    /// Builds an allocator from a validated configuration.
    pub fn new(config: SsccConfig) -> Self {
        SsccAllocator {
            policy: PrefixPolicy::new(config),
        }
    }

    /// The policy this allocator consults.
    pub fn policy(&self) -> &PrefixPolicy {
        &self.policy
    }

    /// Allocates the next identifier from `counter_name` and returns the
    /// composed SSCC.
    ///
    /// ## Required Context
    /// The store must be bound to an open transaction owned by the
    /// caller. On `Ok` the caller commits; on any `Err` the counter was
    /// not advanced and the caller MUST roll back.
    ///
    /// ## Errors
    /// - [`AllocError::InvalidIncrement`] - `increment < 1`
    /// - [`AllocError::Counter`] - unknown counter or backend fault
    /// - [`AllocError::CapacityExhausted`] - the prefix space is used up;
    ///   fatal, never retried
    pub async fn allocate<S>(
        &self,
        store: &mut S,
        counter_name: &str,
        increment: i64,
    ) -> AllocResult<Allocation>
    where
        S: CounterStore + ?Sized,
    {
        if increment < 1 {
            return Err(AllocError::InvalidIncrement(increment));
        }

        let current_value = store.acquire(counter_name).await?;

        // An i64 overflow can only mean a corrupt counter (every real
        // capacity is <= 10^16): report it as exhaustion, never advance.
        let new_value = match current_value.checked_add(increment) {
            Some(value) => value,
            None => {
                let prefix = self.policy.select(i64::MAX);
                return Err(AllocError::CapacityExhausted {
                    prefix: prefix.to_string(),
                    id: i64::MAX,
                    total: crate::policy::capacity(prefix),
                });
            }
        };

        let prefix = self.policy.select(new_value).to_string();

        let warning = match self.policy.classify(new_value, &prefix) {
            CapacityStatus::Exhausted { total } => {
                return Err(AllocError::CapacityExhausted {
                    prefix,
                    id: new_value,
                    total,
                });
            }
            CapacityStatus::Warning {
                used,
                total,
                remaining,
                percent,
            } => Some(format!(
                "WARNING: SSCC counter capacity for prefix '{prefix}' is above {percent}%: \
                 {used} of {total} identifiers used, {remaining} remaining. \
                 Plan a prefix change."
            )),
            CapacityStatus::Ok => None,
        };

        let sscc = compose(new_value, &prefix)?;

        store.advance(counter_name, new_value).await?;

        Ok(Allocation {
            id: new_value,
            prefix,
            base_sscc: sscc.base,
            full_sscc: sscc.full,
            warning,
        })
    }

    /// Composes the SSCC a given `(id, prefix)` pair would produce,
    /// without touching any counter. For tests and dry runs.
    pub fn preview(&self, id: i64, prefix: &str) -> Result<Sscc, ComposeError> {
        compose(id, prefix)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::MemoryCounterStore;
    use crate::error::CounterError;

    const COUNTER: &str = "sscc_id";

    fn allocator(primary: &str, secondary: &str, limit: i64, percent: u8) -> SsccAllocator {
        SsccAllocator::new(SsccConfig::new(primary, secondary, limit, percent).unwrap())
    }

    #[tokio::test]
    async fn test_allocate_advances_and_composes() {
        let allocator = allocator("461234567", "469999999", 9_900_000, 80);
        let mut store = MemoryCounterStore::new().with_counter(COUNTER, 41);

        let allocation = allocator.allocate(&mut store, COUNTER, 1).await.unwrap();

        assert_eq!(allocation.id, 42);
        assert_eq!(allocation.prefix, "461234567");
        assert_eq!(allocation.base_sscc, "04612345670000042");
        assert_eq!(allocation.full_sscc, "046123456700000426");
        assert!(allocation.warning.is_none());
        assert_eq!(store.get(COUNTER), Some(42));
    }

    #[tokio::test]
    async fn test_allocate_is_strictly_monotonic() {
        let allocator = allocator("461234567", "469999999", 9_900_000, 80);
        let mut store = MemoryCounterStore::new().with_counter(COUNTER, 0);

        let mut previous = 0;
        for _ in 0..50 {
            let allocation = allocator.allocate(&mut store, COUNTER, 1).await.unwrap();
            assert!(allocation.id > previous);
            previous = allocation.id;
        }
        assert_eq!(store.get(COUNTER), Some(50));
    }

    #[tokio::test]
    async fn test_allocate_non_unit_increment() {
        let allocator = allocator("461234567", "469999999", 9_900_000, 80);
        let mut store = MemoryCounterStore::new().with_counter(COUNTER, 10);

        let allocation = allocator.allocate(&mut store, COUNTER, 5).await.unwrap();
        assert_eq!(allocation.id, 15);

        let allocation = allocator.allocate(&mut store, COUNTER, 1).await.unwrap();
        assert_eq!(allocation.id, 16);
    }

    #[tokio::test]
    async fn test_allocate_rejects_bad_increment() {
        let allocator = allocator("461234567", "469999999", 9_900_000, 80);
        let mut store = MemoryCounterStore::new().with_counter(COUNTER, 10);

        assert!(matches!(
            allocator.allocate(&mut store, COUNTER, 0).await,
            Err(AllocError::InvalidIncrement(0))
        ));
        assert!(matches!(
            allocator.allocate(&mut store, COUNTER, -3).await,
            Err(AllocError::InvalidIncrement(-3))
        ));
        // The counter was never touched
        assert_eq!(store.get(COUNTER), Some(10));
    }

    #[tokio::test]
    async fn test_exhaustion_does_not_advance() {
        // 14-digit prefixes: capacity 1000. Counter at 999 is the last id.
        let allocator = allocator("12345678901234", "12345678901234", 0, 80);
        let mut store = MemoryCounterStore::new().with_counter(COUNTER, 999);

        let err = allocator.allocate(&mut store, COUNTER, 1).await.unwrap_err();
        match err {
            AllocError::CapacityExhausted { prefix, id, total } => {
                assert_eq!(prefix, "12345678901234");
                assert_eq!(id, 1000);
                assert_eq!(total, 1000);
            }
            other => panic!("expected CapacityExhausted, got {other:?}"),
        }
        assert_eq!(store.get(COUNTER), Some(999));
    }

    #[tokio::test]
    async fn test_warning_band() {
        let allocator = allocator("12345678901234", "12345678901234", 0, 80);
        let mut store = MemoryCounterStore::new().with_counter(COUNTER, 799);

        let allocation = allocator.allocate(&mut store, COUNTER, 1).await.unwrap();
        assert_eq!(allocation.id, 800);

        let warning = allocation.warning.expect("800/1000 must warn");
        assert!(warning.contains("'12345678901234'"));
        assert!(warning.contains("80%"));
        assert!(warning.contains("800 of 1000"));
        assert!(warning.contains("200 remaining"));
    }

    #[tokio::test]
    async fn test_no_warning_below_threshold() {
        let allocator = allocator("12345678901234", "12345678901234", 0, 80);
        let mut store = MemoryCounterStore::new().with_counter(COUNTER, 798);

        let allocation = allocator.allocate(&mut store, COUNTER, 1).await.unwrap();
        assert_eq!(allocation.id, 799);
        assert!(allocation.warning.is_none());
    }

    #[tokio::test]
    async fn test_prefix_switchover() {
        let allocator = allocator("461234567", "469999999", 100, 80);
        let mut store = MemoryCounterStore::new().with_counter(COUNTER, 98);

        let allocation = allocator.allocate(&mut store, COUNTER, 1).await.unwrap();
        assert_eq!(allocation.id, 99);
        assert_eq!(allocation.prefix, "461234567");

        // id 100 == primary_limit: the tie goes to the secondary
        let allocation = allocator.allocate(&mut store, COUNTER, 1).await.unwrap();
        assert_eq!(allocation.id, 100);
        assert_eq!(allocation.prefix, "469999999");
        assert!(allocation.base_sscc.contains("469999999"));
    }

    #[tokio::test]
    async fn test_unknown_counter_propagates() {
        let allocator = allocator("461234567", "469999999", 100, 80);
        let mut store = MemoryCounterStore::new();

        assert!(matches!(
            allocator.allocate(&mut store, "missing", 1).await,
            Err(AllocError::Counter(CounterError::Unknown { .. }))
        ));
    }

    #[tokio::test]
    async fn test_overflow_reports_exhaustion() {
        let allocator = allocator("461234567", "469999999", 100, 80);
        let mut store = MemoryCounterStore::new().with_counter(COUNTER, i64::MAX - 1);

        assert!(matches!(
            allocator.allocate(&mut store, COUNTER, 2).await,
            Err(AllocError::CapacityExhausted { .. })
        ));
        assert_eq!(store.get(COUNTER), Some(i64::MAX - 1));
    }

    #[test]
    fn test_preview_matches_compose() {
        let allocator = allocator("461234567", "469999999", 100, 80);
        let sscc = allocator.preview(42, "461234567").unwrap();
        assert_eq!(sscc.full, "046123456700000426");
    }
}
