//! Stage records: the append-only history of stage attempts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Stage;
use crate::utils::{now_utc, whole_seconds_between};

/// Actor recorded on a stage record when no assignee is given.
pub const DEFAULT_ASSIGNEE: &str = "System";

/// Lifecycle status of a single stage record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    /// The stage has started and not yet finished.
    InProgress,
    /// The stage finished; the record is immutable from here on.
    Completed,
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InProgress => write!(f, "IN_PROGRESS"),
            Self::Completed => write!(f, "COMPLETED"),
        }
    }
}

/// Identity of a stage record: `(tenant, order, stage, started_at)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordKey {
    /// Tenant scope.
    pub tenant_id: String,
    /// Order the record belongs to.
    pub order_id: String,
    /// The stage attempted.
    pub stage: Stage,
    /// When the attempt started; disambiguates repeated attempts.
    pub started_at: DateTime<Utc>,
}

/// One stage attempt for an order.
///
/// Records are append-only: created IN_PROGRESS by a stage start, mutated
/// exactly once to COMPLETED by a stage completion, immutable afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageRecord {
    /// Tenant scope.
    pub tenant_id: String,
    /// Order the record belongs to.
    pub order_id: String,
    /// The stage attempted.
    pub stage: Stage,
    /// Whether the attempt is still open.
    pub status: RecordStatus,
    /// When the attempt started.
    pub started_at: DateTime<Utc>,
    /// When the attempt finished; absent until completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    /// Free-text actor identifier.
    pub assigned_to: String,
}

impl StageRecord {
    /// Opens a new IN_PROGRESS record timestamped now.
    #[must_use]
    pub fn begin(
        tenant_id: impl Into<String>,
        order_id: impl Into<String>,
        stage: Stage,
        assigned_to: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            order_id: order_id.into(),
            stage,
            status: RecordStatus::InProgress,
            started_at: now_utc(),
            finished_at: None,
            assigned_to: assigned_to.into(),
        }
    }

    /// Returns the record's identity.
    #[must_use]
    pub fn key(&self) -> RecordKey {
        RecordKey {
            tenant_id: self.tenant_id.clone(),
            order_id: self.order_id.clone(),
            stage: self.stage,
            started_at: self.started_at,
        }
    }

    /// Returns true while the attempt is open.
    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.status == RecordStatus::InProgress
    }

    /// Duration in whole seconds, truncated; `None` until completed.
    #[must_use]
    pub fn duration_secs(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| whole_seconds_between(self.started_at, finished))
    }
}
