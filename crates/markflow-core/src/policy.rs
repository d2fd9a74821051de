//! # Prefix Policy Module
//!
//! Company-prefix selection and capacity accounting for the allocator.
//!
//! ## Two-Prefix Rollover
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Identifier Space                                     │
//! │                                                                         │
//! │   0                    primary_limit                capacity(secondary) │
//! │   │                          │                              │           │
//! │   ▼                          ▼                              ▼           │
//! │   ┌──────────────────────────┬──────────────────────────────┐           │
//! │   │      primary_prefix      │       secondary_prefix       │           │
//! │   └──────────────────────────┴──────────────────────────────┘           │
//! │                              ▲                                          │
//! │              id < limit → primary, id >= limit → secondary              │
//! │              (the tie at exactly `limit` goes to the secondary)         │
//! │                                                                         │
//! │   Within each prefix:  [warning_threshold, total) → Warning             │
//! │                        [total, ∞)                 → Exhausted           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! One counter feeds both prefixes, so the secondary prefix reuses the
//! identifier space from wherever the counter stands at switchover. This
//! is only safe when the secondary prefix has never emitted codes before;
//! deployments that cannot guarantee that should encode the prefix into
//! the counter name and run one counter per prefix.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::MAX_PREFIX_LENGTH;

// =============================================================================
// Configuration
// =============================================================================

/// Validated allocator configuration. Immutable per run.
///
/// Construct with [`SsccConfig::new`]; the fields are private so an
/// invalid combination can never reach the allocator. Injected
/// explicitly at construction time, never read from ambient state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SsccConfig {
    primary_prefix: String,
    secondary_prefix: String,
    primary_limit: i64,
    warning_percent: u8,
}

impl SsccConfig {
    /// Validates and builds an allocator configuration.
    ///
    /// ## Rules
    /// - Both prefixes: 1..=16 decimal digits
    /// - `primary_limit`: within `0..=capacity(primary_prefix)`
    /// - `warning_percent`: 1..=99
    ///
    /// ## Example
    /// ```rust
    /// use markflow_core::policy::SsccConfig;
    ///
    /// let config = SsccConfig::new("461234567", "469999999", 9_900_000, 80).unwrap();
    /// assert_eq!(config.primary_prefix(), "461234567");
    /// ```
    pub fn new(
        primary_prefix: impl Into<String>,
        secondary_prefix: impl Into<String>,
        primary_limit: i64,
        warning_percent: u8,
    ) -> Result<Self, ConfigError> {
        let primary_prefix = primary_prefix.into();
        let secondary_prefix = secondary_prefix.into();

        validate_config_prefix("primary", &primary_prefix)?;
        validate_config_prefix("secondary", &secondary_prefix)?;

        let primary_capacity = capacity(&primary_prefix);
        if primary_limit < 0 || primary_limit > primary_capacity {
            return Err(ConfigError::PrimaryLimitOutOfRange {
                limit: primary_limit,
                capacity: primary_capacity,
            });
        }

        if !(1..=99).contains(&warning_percent) {
            return Err(ConfigError::WarningPercentOutOfRange {
                got: warning_percent,
            });
        }

        Ok(SsccConfig {
            primary_prefix,
            secondary_prefix,
            primary_limit,
            warning_percent,
        })
    }

    /// Prefix used while `id < primary_limit`.
    pub fn primary_prefix(&self) -> &str {
        &self.primary_prefix
    }

    /// Prefix used once `id >= primary_limit`.
    pub fn secondary_prefix(&self) -> &str {
        &self.secondary_prefix
    }

    /// Switchover point between the two prefixes.
    pub fn primary_limit(&self) -> i64 {
        self.primary_limit
    }

    /// Percentage of per-prefix capacity at which warnings begin.
    pub fn warning_percent(&self) -> u8 {
        self.warning_percent
    }
}

fn validate_config_prefix(which: &'static str, prefix: &str) -> Result<(), ConfigError> {
    if prefix.is_empty() || prefix.len() > MAX_PREFIX_LENGTH {
        return Err(ConfigError::PrefixLength {
            which,
            prefix: prefix.to_string(),
            length: prefix.len(),
        });
    }
    if !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConfigError::PrefixNotDigits {
            which,
            prefix: prefix.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Capacity Math
// =============================================================================

/// Total identifier capacity for a prefix: `10^(17 - len)`.
///
/// Covers the full 17-digit base: one extension digit (0..9) times
/// `10^(16 - len)` serials. Assumes a validated 1..=16 digit prefix.
pub fn capacity(prefix: &str) -> i64 {
    10i64.pow((17 - prefix.len()) as u32)
}

/// Capacity classification of a proposed identifier for a prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapacityStatus {
    /// Below the warning threshold; nothing to report.
    Ok,

    /// At or above the warning threshold but still allocatable.
    Warning {
        used: i64,
        total: i64,
        remaining: i64,
        percent: u8,
    },

    /// At or beyond total capacity: allocation must fail.
    Exhausted { total: i64 },
}

// =============================================================================
// Prefix Policy
// =============================================================================

/// Maps proposed identifiers to prefixes and classifies consumption.
///
/// Pure and cheap; the allocator holds one and consults it per call.
#[derive(Debug, Clone)]
pub struct PrefixPolicy {
    config: SsccConfig,
}

impl PrefixPolicy {
    /// Wraps a validated configuration.
    pub fn new(config: SsccConfig) -> Self {
        PrefixPolicy { config }
    }

    /// Returns the configuration this policy was built from.
    pub fn config(&self) -> &SsccConfig {
        &self.config
    }

    /// Selects the prefix that encodes `id`.
    ///
    /// Strict less-than: the tie at exactly `primary_limit` goes to the
    /// secondary prefix.
    pub fn select(&self, id: i64) -> &str {
        if id < self.config.primary_limit {
            &self.config.primary_prefix
        } else {
            &self.config.secondary_prefix
        }
    }

    /// Warning threshold for a prefix: `floor(total * warning_percent / 100)`.
    pub fn warning_threshold(&self, prefix: &str) -> i64 {
        let total = capacity(prefix);
        // Max total is 10^16, times 99 still fits i64; widen anyway
        (total as i128 * self.config.warning_percent as i128 / 100) as i64
    }

    /// Classifies `id` against the capacity of the selected `prefix`.
    pub fn classify(&self, id: i64, prefix: &str) -> CapacityStatus {
        let total = capacity(prefix);
        if id >= total {
            return CapacityStatus::Exhausted { total };
        }
        if id >= self.warning_threshold(prefix) {
            return CapacityStatus::Warning {
                used: id,
                total,
                remaining: total - id,
                percent: self.config.warning_percent,
            };
        }
        CapacityStatus::Ok
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sscc;

    fn test_config() -> SsccConfig {
        SsccConfig::new("461234567", "469999999", 100, 80).unwrap()
    }

    #[test]
    fn test_config_rejects_bad_prefixes() {
        assert!(matches!(
            SsccConfig::new("", "469999999", 100, 80),
            Err(ConfigError::PrefixLength { which: "primary", .. })
        ));
        assert!(matches!(
            SsccConfig::new("461234567", "12345678901234567", 100, 80),
            Err(ConfigError::PrefixLength {
                which: "secondary",
                length: 17,
                ..
            })
        ));
        assert!(matches!(
            SsccConfig::new("46123456X", "469999999", 100, 80),
            Err(ConfigError::PrefixNotDigits { .. })
        ));
    }

    #[test]
    fn test_config_rejects_unreachable_limit() {
        // 14-digit primary: capacity 1000, limit 1001 can never be reached
        assert!(matches!(
            SsccConfig::new("12345678901234", "469999999", 1001, 80),
            Err(ConfigError::PrimaryLimitOutOfRange {
                limit: 1001,
                capacity: 1000,
            })
        ));
        assert!(SsccConfig::new("12345678901234", "469999999", 1000, 80).is_ok());
        assert!(matches!(
            SsccConfig::new("461234567", "469999999", -1, 80),
            Err(ConfigError::PrimaryLimitOutOfRange { limit: -1, .. })
        ));
    }

    #[test]
    fn test_config_rejects_bad_warning_percent() {
        for bad in [0u8, 100, 255] {
            assert!(matches!(
                SsccConfig::new("461234567", "469999999", 100, bad),
                Err(ConfigError::WarningPercentOutOfRange { .. })
            ));
        }
        assert!(SsccConfig::new("461234567", "469999999", 100, 1).is_ok());
        assert!(SsccConfig::new("461234567", "469999999", 100, 99).is_ok());
    }

    #[test]
    fn test_capacity() {
        assert_eq!(capacity("461234567"), 100_000_000); // 9 digits -> 10^8
        assert_eq!(capacity("12345678901234"), 1000); // 14 digits -> 10^3
        assert_eq!(capacity("1234567890123456"), 10); // 16 digits -> 10^1
        assert_eq!(capacity("4"), 10_000_000_000_000_000); // 1 digit -> 10^16
    }

    #[test]
    fn test_select_switchover_is_exact() {
        let policy = PrefixPolicy::new(test_config());
        assert_eq!(policy.select(0), "461234567");
        assert_eq!(policy.select(99), "461234567");
        // The tie goes to the secondary prefix
        assert_eq!(policy.select(100), "469999999");
        assert_eq!(policy.select(101), "469999999");
    }

    #[test]
    fn test_warning_threshold_floors() {
        let config = SsccConfig::new("12345678901234", "469999999", 1000, 33).unwrap();
        let policy = PrefixPolicy::new(config);
        // floor(1000 * 33 / 100) = 330
        assert_eq!(policy.warning_threshold("12345678901234"), 330);
    }

    #[test]
    fn test_classify_bands() {
        let config = SsccConfig::new("12345678901234", "469999999", 1000, 80).unwrap();
        let policy = PrefixPolicy::new(config);
        let prefix = "12345678901234"; // total 1000, threshold 800

        assert_eq!(policy.classify(799, prefix), CapacityStatus::Ok);
        assert_eq!(
            policy.classify(800, prefix),
            CapacityStatus::Warning {
                used: 800,
                total: 1000,
                remaining: 200,
                percent: 80,
            }
        );
        assert_eq!(
            policy.classify(999, prefix),
            CapacityStatus::Warning {
                used: 999,
                total: 1000,
                remaining: 1,
                percent: 80,
            }
        );
        assert_eq!(
            policy.classify(1000, prefix),
            CapacityStatus::Exhausted { total: 1000 }
        );
    }

    #[test]
    fn test_capacity_matches_composer_range() {
        // The policy's notion of capacity and the composer's must agree
        let prefix = "12345678901234";
        let total = capacity(prefix);
        assert!(sscc::compose(total - 1, prefix).is_ok());
        assert!(sscc::compose(total, prefix).is_err());
    }
}
