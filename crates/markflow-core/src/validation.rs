//! # Validation Module
//!
//! Field validators shared by the parsers and repositories.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (web form, desktop shell)                             │
//! │  └── Immediate user feedback, not trusted here                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - format and range rules                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database constraints (PK on sscc, UNIQUE on full_sscc)       │
//! │                                                                         │
//! │  Defense in depth: each layer catches different mistakes               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::{GTIN_LENGTH, MAX_BATCH_QUANTITY, MAX_OWNER_LENGTH, SSCC_LENGTH};

// =============================================================================
// Code Validators
// =============================================================================

/// Validates a full SSCC: exactly 18 decimal digits.
///
/// Format only; the check digit is not recomputed here (scanned codes
/// are trusted to be GS1-valid, generated codes are valid by
/// construction).
///
/// ## Example
/// ```rust
/// use markflow_core::validation::validate_sscc;
///
/// assert!(validate_sscc("046123456700000426").is_ok());
/// assert!(validate_sscc("12345").is_err());
/// ```
pub fn validate_sscc(sscc: &str) -> ValidationResult<()> {
    if sscc.len() != SSCC_LENGTH || !sscc.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "sscc".to_string(),
            reason: format!("must be exactly {SSCC_LENGTH} decimal digits"),
        });
    }
    Ok(())
}

/// Validates a GTIN: exactly 14 decimal digits.
pub fn validate_gtin(gtin: &str) -> ValidationResult<()> {
    if gtin.len() != GTIN_LENGTH || !gtin.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "gtin".to_string(),
            reason: format!("must be exactly {GTIN_LENGTH} decimal digits"),
        });
    }
    Ok(())
}

// =============================================================================
// Request Validators
// =============================================================================

/// Validates the owner attribution on a generation request.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most 100 characters
pub fn validate_owner(owner: &str) -> ValidationResult<()> {
    let owner = owner.trim();

    if owner.is_empty() {
        return Err(ValidationError::Required {
            field: "owner".to_string(),
        });
    }
    if owner.chars().count() > MAX_OWNER_LENGTH {
        return Err(ValidationError::TooLong {
            field: "owner".to_string(),
            max: MAX_OWNER_LENGTH,
        });
    }
    Ok(())
}

/// Validates a batch generation quantity: 1..=1000.
///
/// The cap keeps one web request from burning a visible slice of the
/// identifier space in a single transaction.
pub fn validate_batch_quantity(quantity: i64) -> ValidationResult<()> {
    if !(1..=MAX_BATCH_QUANTITY).contains(&quantity) {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_BATCH_QUANTITY,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_sscc() {
        assert!(validate_sscc("046123456700000426").is_ok());

        assert!(validate_sscc("").is_err());
        assert!(validate_sscc("04612345670000042").is_err()); // 17
        assert!(validate_sscc("0461234567000004260").is_err()); // 19
        assert!(validate_sscc("04612345670000042X").is_err());
    }

    #[test]
    fn test_validate_gtin() {
        assert!(validate_gtin("04600266011725").is_ok());

        assert!(validate_gtin("0460026601172").is_err()); // 13
        assert!(validate_gtin("046002660117250").is_err()); // 15
        assert!(validate_gtin("0460026601172X").is_err());
    }

    #[test]
    fn test_validate_owner() {
        assert!(validate_owner("Acme Logistics").is_ok());

        assert!(validate_owner("").is_err());
        assert!(validate_owner("   ").is_err());
        assert!(validate_owner(&"x".repeat(101)).is_err());
        assert!(validate_owner(&"x".repeat(100)).is_ok());
    }

    #[test]
    fn test_validate_batch_quantity() {
        assert!(validate_batch_quantity(1).is_ok());
        assert!(validate_batch_quantity(1000).is_ok());

        assert!(validate_batch_quantity(0).is_err());
        assert!(validate_batch_quantity(-5).is_err());
        assert!(validate_batch_quantity(1001).is_err());
    }
}
