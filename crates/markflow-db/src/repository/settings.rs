//! # Settings Repository
//!
//! Key/value application settings, and the loader that turns the four
//! allocator keys into a validated [`SsccConfig`].
//!
//! ## Allocator Settings
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  setting_key              meaning                     missing?          │
//! │  ──────────────────────   ────────────────────────    ───────────       │
//! │  SSCC_GCP_1               primary company prefix      error             │
//! │  SSCC_GCP_2               secondary company prefix    error             │
//! │  SSCC_PRIMARY_GCP_LIMIT   switchover point            default 9900000   │
//! │  SSCC_WARNING_PERCENT     warning threshold (1..99)   default 80        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Malformed numeric values fall back to the defaults (an operator typo
//! must not brick generation); a missing prefix is a hard error because
//! there is nothing safe to fall back to.

use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::DbResult;
use markflow_core::policy::SsccConfig;

/// Settings key for the primary company prefix.
pub const KEY_PRIMARY_PREFIX: &str = "SSCC_GCP_1";
/// Settings key for the secondary company prefix.
pub const KEY_SECONDARY_PREFIX: &str = "SSCC_GCP_2";
/// Settings key for the prefix switchover point.
pub const KEY_PRIMARY_LIMIT: &str = "SSCC_PRIMARY_GCP_LIMIT";
/// Settings key for the warning percentage.
pub const KEY_WARNING_PERCENT: &str = "SSCC_WARNING_PERCENT";

/// Switchover default when the setting is absent or malformed.
pub const DEFAULT_PRIMARY_LIMIT: i64 = 9_900_000;
/// Warning-percent default when the setting is absent or malformed.
pub const DEFAULT_WARNING_PERCENT: u8 = 80;

/// Repository for application settings.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Reads one setting value.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT setting_value FROM app_settings WHERE setting_key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(value)
    }

    /// Writes one setting value (insert or replace).
    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        debug!(key, value, "Writing setting");

        sqlx::query(
            "INSERT INTO app_settings (setting_key, setting_value) VALUES (?1, ?2) \
             ON CONFLICT (setting_key) DO UPDATE SET setting_value = excluded.setting_value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Loads and validates the allocator configuration.
    ///
    /// ## Errors
    /// - [`crate::error::DbError::NotFound`] when a prefix key is absent
    /// - [`crate::error::DbError::Config`] when the stored values fail
    ///   [`SsccConfig::new`] validation
    pub async fn load_sscc_config(&self) -> DbResult<SsccConfig> {
        let primary = self
            .get(KEY_PRIMARY_PREFIX)
            .await?
            .ok_or_else(|| crate::error::DbError::not_found("Setting", KEY_PRIMARY_PREFIX))?;
        let secondary = self
            .get(KEY_SECONDARY_PREFIX)
            .await?
            .ok_or_else(|| crate::error::DbError::not_found("Setting", KEY_SECONDARY_PREFIX))?;

        let primary_limit = self
            .parse_numeric(KEY_PRIMARY_LIMIT, DEFAULT_PRIMARY_LIMIT)
            .await?;
        let warning_percent = self
            .parse_numeric(KEY_WARNING_PERCENT, DEFAULT_WARNING_PERCENT)
            .await?;

        let config = SsccConfig::new(primary, secondary, primary_limit, warning_percent)?;
        debug!(?config, "Loaded allocator configuration");
        Ok(config)
    }

    /// Reads a numeric setting, falling back to `default` when the key
    /// is absent or its value doesn't parse.
    async fn parse_numeric<T>(&self, key: &str, default: T) -> DbResult<T>
    where
        T: std::str::FromStr + Copy,
    {
        Ok(match self.get(key).await? {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(key, raw = %raw, "Malformed numeric setting, using default");
                default
            }),
            None => default,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
