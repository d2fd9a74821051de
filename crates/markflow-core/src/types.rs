//! # Domain Types
//!
//! Shared records that cross the core/db boundary. Kept free of I/O;
//! the optional `sqlx` feature adds the database derives the same way
//! the rest of the workspace consumes them.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Aggregation Task
// =============================================================================

/// Processing state of one aggregation task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
pub enum TaskStatus {
    /// Loaded from a task file, not yet worked.
    Pending,
    /// Scanned and confirmed on the floor.
    Completed,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Completed => write!(f, "completed"),
        }
    }
}

/// One aggregation task: "this SSCC on this container holds this GTIN".
///
/// Keyed by `sscc` so re-uploading a corrected file upserts in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AggregationTask {
    /// Full 18-digit SSCC; primary key.
    pub sscc: String,

    /// 14-digit GTIN of the aggregated goods.
    pub gtin: String,

    /// Container label from the customer's file; free text.
    pub container_id: String,

    /// Order this task belongs to.
    pub order_id: i64,

    /// Who uploaded the task.
    pub owner: String,

    /// Current processing state.
    pub status: TaskStatus,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_display() {
        assert_eq!(TaskStatus::Pending.to_string(), "pending");
        assert_eq!(TaskStatus::Completed.to_string(), "completed");
    }

    #[test]
    fn test_task_status_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::Pending).unwrap(),
            "\"pending\""
        );
        let status: TaskStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(status, TaskStatus::Completed);
    }
}
