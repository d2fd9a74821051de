//! # Error Types
//!
//! Domain-specific error types for markflow-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  markflow-core errors (this file)                                      │
//! │  ├── ConfigError      - Invalid allocator configuration (construction) │
//! │  ├── ComposeError     - Check-digit / composition failures (pure)      │
//! │  ├── CounterError     - Counter store failures (trait boundary)        │
//! │  ├── AllocError       - Allocation failures (orchestration)            │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  ├── DataMatrixError  - Tobacco code parsing                           │
//! │  └── TaskFileError    - Aggregation task CSV parsing                   │
//! │                                                                         │
//! │  markflow-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (prefix, counter name, id)
//! 3. Errors are enum variants, never String
//! 4. Warnings are NOT errors: capacity warnings travel on the success path

use thiserror::Error;

// =============================================================================
// Config Error
// =============================================================================

/// Allocator configuration errors.
///
/// Raised by [`crate::policy::SsccConfig::new`] at construction time.
/// A config that fails here never reaches the allocator.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A company prefix is empty or longer than 16 digits.
    #[error("{which} prefix '{prefix}' has invalid length {length}, expected 1..=16 digits")]
    PrefixLength {
        which: &'static str,
        prefix: String,
        length: usize,
    },

    /// A company prefix contains a non-digit character.
    #[error("{which} prefix '{prefix}' must contain only decimal digits")]
    PrefixNotDigits { which: &'static str, prefix: String },

    /// The switchover point does not fit the primary prefix's capacity.
    ///
    /// ## When This Occurs
    /// - `primary_limit` is negative
    /// - `primary_limit` exceeds `10^(17 - len(primary_prefix))`, so the
    ///   primary prefix could never reach the switchover
    #[error("primary limit {limit} is outside 0..={capacity} for the primary prefix")]
    PrimaryLimitOutOfRange { limit: i64, capacity: i64 },

    /// Warning percentage must sit strictly between 0 and 100.
    #[error("warning percent {got} is outside 1..=99")]
    WarningPercentOutOfRange { got: u8 },
}

// =============================================================================
// Compose Error
// =============================================================================

/// Pure-function failures from SSCC composition and check-digit math.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComposeError {
    /// The check-digit base is not exactly 17 decimal digits.
    #[error("SSCC base must be exactly 17 decimal digits (got {length} characters)")]
    InvalidBase { length: usize },

    /// Prefix exceeds the 16-digit GS1 maximum.
    #[error("prefix '{prefix}' is {length} digits long, the maximum is 16")]
    PrefixTooLong { prefix: String, length: usize },

    /// Prefix is empty or contains a non-digit character.
    #[error("prefix '{prefix}' must be 1..=16 decimal digits")]
    PrefixInvalid { prefix: String },

    /// Identifier does not fit the prefix's serial space.
    ///
    /// Capacity is `10 * 10^(16 - len(prefix))`: the full 17-digit base
    /// including all ten extension digits.
    #[error("id {id} is out of range for prefix '{prefix}' (capacity {capacity})")]
    IdOutOfRange {
        id: i64,
        prefix: String,
        capacity: i64,
    },
}

// =============================================================================
// Counter Error
// =============================================================================

/// Failures surfaced by a [`crate::counter::CounterStore`] implementation.
#[derive(Debug, Error)]
pub enum CounterError {
    /// The named counter row does not exist in the store.
    ///
    /// Counter rows are created once at deployment; this is a setup
    /// problem, not a transient condition.
    #[error("counter '{name}' does not exist")]
    Unknown { name: String },

    /// The underlying store failed (connection, lock timeout, ...).
    #[error("counter store failure: {message}")]
    Backend { message: String },
}

// =============================================================================
// Allocation Error
// =============================================================================

/// Failures from a single allocation attempt.
///
/// Any of these aborts the enclosing transaction: the counter is never
/// advanced on the error path, so the caller's rollback restores the
/// previous state exactly.
#[derive(Debug, Error)]
pub enum AllocError {
    /// Counter store failure (unknown counter, backend fault).
    #[error(transparent)]
    Counter(#[from] CounterError),

    /// Composition failure. Should not occur for a validated config and
    /// an in-capacity id, but the allocator propagates rather than hides.
    #[error(transparent)]
    Compose(#[from] ComposeError),

    /// The next identifier would exceed the selected prefix's capacity.
    ///
    /// ## Caller Contract
    /// This error is fatal and never retried. The caller MUST roll back
    /// the enclosing transaction; further generation against this prefix
    /// would emit duplicate codes.
    #[error(
        "SSCC capacity for prefix '{prefix}' is exhausted (would-be id {id}, capacity {total}); \
         further generation would emit duplicate codes"
    )]
    CapacityExhausted { prefix: String, id: i64, total: i64 },

    /// Increment must advance the counter (>= 1).
    #[error("increment must be at least 1 (got {0})")]
    InvalidIncrement(i64),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before any counter is touched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., non-digit SSCC, wrong length GTIN).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Parser Errors
// =============================================================================

/// Tobacco DataMatrix parsing errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataMatrixError {
    /// After cleanup the code is not the fixed 29-character tobacco format.
    #[error("tobacco DataMatrix must be 29 characters after cleanup (got {length})")]
    InvalidLength { length: usize },
}

/// Aggregation task file parsing errors.
#[derive(Debug, Error)]
pub enum TaskFileError {
    /// The header row lacks one of `container_id`, `gtin`, `sscc`.
    #[error("task file is missing required columns (found: {found:?})")]
    MissingColumns { found: Vec<String> },

    /// Every data row was empty or failed SSCC/GTIN validation.
    #[error("task file contains no valid rows ({skipped} rows were filtered)")]
    NoValidRows { skipped: usize },

    /// Malformed CSV (unbalanced quotes, broken records).
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience alias for allocation results.
pub type AllocResult<T> = Result<T, AllocError>;

/// Convenience alias for validation results.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AllocError::CapacityExhausted {
            prefix: "12345678901234".to_string(),
            id: 1000,
            total: 1000,
        };
        assert_eq!(
            err.to_string(),
            "SSCC capacity for prefix '12345678901234' is exhausted (would-be id 1000, \
             capacity 1000); further generation would emit duplicate codes"
        );

        let err = CounterError::Unknown {
            name: "sscc_id".to_string(),
        };
        assert_eq!(err.to_string(), "counter 'sscc_id' does not exist");
    }

    #[test]
    fn test_counter_error_converts_to_alloc_error() {
        let counter_err = CounterError::Unknown {
            name: "sscc_id".to_string(),
        };
        let alloc_err: AllocError = counter_err.into();
        assert!(matches!(alloc_err, AllocError::Counter(_)));
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "owner".to_string(),
        };
        assert_eq!(err.to_string(), "owner is required");

        let err = ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: 1000,
        };
        assert_eq!(err.to_string(), "quantity must be between 1 and 1000");
    }
}
