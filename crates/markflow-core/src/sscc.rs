//! # SSCC Module
//!
//! GS1 check-digit calculation and SSCC composition.
//!
//! ## Anatomy of an SSCC
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SSCC (Serial Shipping Container Code) - 18 digits                      │
//! │                                                                         │
//! │    0   4 6 1 2 3 4 5 6 7   0 0 0 0 0 4 2   6                           │
//! │    ─   ─────────────────   ─────────────   ─                           │
//! │    │           │                 │         │                            │
//! │    │           │                 │         └── check digit (GS1 mod-10) │
//! │    │           │                 └──────────── serial, zero-padded to   │
//! │    │           │                               16 - len(prefix) digits  │
//! │    │           └────────────────────────────── company prefix (1..16)   │
//! │    └────────────────────────────────────────── extension digit (0..9)   │
//! │                                                                         │
//! │  base  = extension ∥ prefix ∥ serial        (17 digits)                 │
//! │  full  = base ∥ check_digit(base)           (18 digits)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identifier Mapping
//! A single integer id addresses the whole per-prefix space: the serial
//! part rolls over into the extension digit, so capacity is
//! `10 * 10^(16 - len(prefix))` and the mapping `id -> base` is a
//! bijection on `[0, capacity)`.
//!
//! ## Usage
//! ```rust
//! use markflow_core::sscc::{check_digit, compose};
//!
//! let sscc = compose(42, "461234567").unwrap();
//! assert_eq!(sscc.base, "04612345670000042");
//! assert_eq!(sscc.full, "046123456700000426");
//!
//! // check_digit is the pure function behind the final digit
//! assert_eq!(check_digit("04612345670000042").unwrap(), 6);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ComposeError;
use crate::{BASE_LENGTH, MAX_PREFIX_LENGTH};

// =============================================================================
// Sscc Type
// =============================================================================

/// A composed SSCC: the 17-digit base and the 18-digit full code.
///
/// Produced by [`compose`]; a pure value with no identity of its own.
/// The allocator wraps it together with the id and prefix into an
/// [`crate::allocator::Allocation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sscc {
    /// 17-digit base: extension digit, company prefix, padded serial.
    pub base: String,

    /// 18-digit code: base plus the GS1 check digit.
    pub full: String,
}

// =============================================================================
// Check Digit
// =============================================================================

/// Calculates the GS1 mod-10 check digit for a 17-digit SSCC base.
///
/// ## Algorithm
/// Walk the base right-to-left; digits at even reversed positions weigh 3,
/// odd positions weigh 1. The check digit is `(10 - (sum mod 10)) mod 10`,
/// so a sum divisible by 10 yields 0, never 10.
///
/// ## Example
/// ```rust
/// use markflow_core::sscc::check_digit;
///
/// // GS1 General Specifications reference vector
/// assert_eq!(check_digit("10614141234567890").unwrap(), 8);
/// ```
///
/// ## Errors
/// [`ComposeError::InvalidBase`] if the base is not exactly 17 decimal
/// digits.
pub fn check_digit(base: &str) -> Result<u8, ComposeError> {
    let length = base.chars().count();
    if length != BASE_LENGTH || !base.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ComposeError::InvalidBase { length });
    }

    let sum: u32 = base
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            if i % 2 == 0 {
                digit * 3
            } else {
                digit
            }
        })
        .sum();

    Ok(((10 - (sum % 10)) % 10) as u8)
}

// =============================================================================
// Composition
// =============================================================================

/// Composes the SSCC for `(id, prefix)`.
///
/// ## Construction
/// - `serial_length = 16 - len(prefix)`
/// - `capacity_per_extension = 10^serial_length`
/// - `extension = (id / capacity_per_extension) % 10`
/// - `serial = id % capacity_per_extension`, zero-padded
///
/// For a 16-digit prefix the serial part is empty and the extension digit
/// alone distinguishes the ten possible codes.
///
/// ## Errors
/// - [`ComposeError::PrefixInvalid`] - empty or non-digit prefix
/// - [`ComposeError::PrefixTooLong`] - more than 16 digits
/// - [`ComposeError::IdOutOfRange`] - negative, or beyond the prefix's
///   `10 * 10^(16 - len)` capacity
pub fn compose(id: i64, prefix: &str) -> Result<Sscc, ComposeError> {
    validate_prefix(prefix)?;

    let serial_length = MAX_PREFIX_LENGTH - prefix.len();
    let capacity_per_extension = 10i64.pow(serial_length as u32);
    let capacity = 10 * capacity_per_extension;

    if id < 0 || id >= capacity {
        return Err(ComposeError::IdOutOfRange {
            id,
            prefix: prefix.to_string(),
            capacity,
        });
    }

    let extension = (id / capacity_per_extension) % 10;
    let serial = id % capacity_per_extension;

    // A 16-digit prefix leaves no serial part; {:00$} would still print "0"
    let serial_part = if serial_length == 0 {
        String::new()
    } else {
        format!("{serial:0serial_length$}")
    };

    let base = format!("{extension}{prefix}{serial_part}");
    debug_assert_eq!(base.len(), BASE_LENGTH);

    let check = check_digit(&base)?;
    let full = format!("{base}{check}");

    Ok(Sscc { base, full })
}

/// Validates a company prefix: 1..=16 decimal digits.
pub(crate) fn validate_prefix(prefix: &str) -> Result<(), ComposeError> {
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ComposeError::PrefixInvalid {
            prefix: prefix.to_string(),
        });
    }
    if prefix.len() > MAX_PREFIX_LENGTH {
        return Err(ComposeError::PrefixTooLong {
            prefix: prefix.to_string(),
            length: prefix.len(),
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
    fn test_check_digit_reference_vectors() {
        // GS1 General Specifications example: SSCC 106141412345678908
        assert_eq!(check_digit("10614141234567890").unwrap(), 8);
        // Hand-computed vector for prefix 461234567, id 42
        assert_eq!(check_digit("04612345670000042").unwrap(), 6);
        // All zeros: sum 0 -> check digit 0, not 10
        assert_eq!(check_digit("00000000000000000").unwrap(), 0);
    }

    #[test]
    fn test_check_digit_rejects_bad_bases() {
        assert_eq!(
            check_digit("123"),
            Err(ComposeError::InvalidBase { length: 3 })
        );
        assert_eq!(
            check_digit("123456789012345678"),
            Err(ComposeError::InvalidBase { length: 18 })
        );
        assert_eq!(
            check_digit("1234567890123456X"),
            Err(ComposeError::InvalidBase { length: 17 })
        );
    }

    #[test]
    fn test_check_digit_closure() {
        // The check digit is always a single decimal digit
        for base in [
            "10614141234567890",
            "04612345670000042",
            "99999999999999999",
            "01234567890123456",
        ] {
            assert!(check_digit(base).unwrap() <= 9);
        }
    }

    #[test]
    fn test_compose_nine_digit_prefix() {
        // 9-digit prefix: serial_length 7, id 42 stays in extension 0
        let sscc = compose(42, "461234567").unwrap();
        assert_eq!(sscc.base, "04612345670000042");
        assert_eq!(sscc.full, "046123456700000426");
        assert_eq!(sscc.full.len(), 18);
    }

    #[test]
    fn test_compose_extension_rollover() {
        // id == capacity_per_extension rolls into extension digit 1
        let sscc = compose(10_000_000, "461234567").unwrap();
        assert_eq!(sscc.base, "14612345670000000");

        // Last id of the space uses extension 9 and the top serial
        let sscc = compose(99_999_999, "461234567").unwrap();
        assert_eq!(sscc.base, "94612345679999999");
    }

    #[test]
    fn test_compose_sixteen_digit_prefix() {
        // Serial part is empty; only the extension digit varies
        let sscc = compose(7, "1234567890123456").unwrap();
        assert_eq!(sscc.base, "71234567890123456");

        // Capacity is exactly 10
        assert!(matches!(
            compose(10, "1234567890123456"),
            Err(ComposeError::IdOutOfRange { capacity: 10, .. })
        ));
    }

    #[test]
    fn test_compose_id_out_of_range() {
        // 14-digit prefix: capacity 10 * 10^2 = 1000
        assert!(compose(999, "12345678901234").is_ok());
        assert!(matches!(
            compose(1000, "12345678901234"),
            Err(ComposeError::IdOutOfRange {
                id: 1000,
                capacity: 1000,
                ..
            })
        ));
        assert!(matches!(
            compose(-1, "461234567"),
            Err(ComposeError::IdOutOfRange { id: -1, .. })
        ));
    }

    #[test]
    fn test_compose_prefix_errors() {
        assert!(matches!(
            compose(1, ""),
            Err(ComposeError::PrefixInvalid { .. })
        ));
        assert!(matches!(
            compose(1, "46123456A"),
            Err(ComposeError::PrefixInvalid { .. })
        ));
        assert!(matches!(
            compose(1, "12345678901234567"),
            Err(ComposeError::PrefixTooLong { length: 17, .. })
        ));
    }

    #[test]
    fn test_compose_injective_on_sample() {
        // Bijection law, sampled: distinct ids -> distinct bases
        let mut seen = std::collections::HashSet::new();
        for id in 0..1000 {
            let sscc = compose(id, "12345678901234").unwrap();
            assert_eq!(sscc.base.len(), 17);
            assert!(seen.insert(sscc.base), "duplicate base for id {id}");
        }
    }

    #[test]
    fn test_compose_round_trip() {
        // Stripping the check digit yields the base; reapplying reproduces it
        let sscc = compose(123456, "461234567").unwrap();
        let (base, check) = sscc.full.split_at(17);
        assert_eq!(base, sscc.base);
        assert_eq!(
            check.parse::<u8>().unwrap(),
            check_digit(&sscc.base).unwrap()
        );
    }
}
