//! Lifecycle events emitted on stage transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Order, Stage, StageRecord};
use crate::utils::now_utc;

/// The kind of lifecycle event.
///
/// Serialized PascalCase, matching the notification bus detail types
/// consumed by external subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageEventKind {
    /// A stage record was opened.
    StageStarted,
    /// A stage record was completed.
    StageCompleted,
    /// A workflow instance began driving an order.
    WorkflowStarted,
}

impl fmt::Display for StageEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StageStarted => write!(f, "StageStarted"),
            Self::StageCompleted => write!(f, "StageCompleted"),
            Self::WorkflowStarted => write!(f, "WorkflowStarted"),
        }
    }
}

/// An ephemeral lifecycle event.
///
/// Events are not persisted by this subsystem; they are handed to the
/// publisher best-effort and consumed by external collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageEvent {
    /// What happened.
    pub kind: StageEventKind,
    /// Tenant scope.
    pub tenant_id: String,
    /// Order the event concerns.
    pub order_id: String,
    /// The stage involved.
    pub stage: Stage,
    /// When the event was built.
    pub timestamp: DateTime<Utc>,
    /// Actor on the underlying record, when relevant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    /// Stage duration in whole seconds, on completion events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<i64>,
    /// Execution handle, on workflow-start events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_ref: Option<String>,
    /// Customer, on workflow-start events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
}

impl StageEvent {
    fn new(kind: StageEventKind, tenant_id: &str, order_id: &str, stage: Stage) -> Self {
        Self {
            kind,
            tenant_id: tenant_id.to_string(),
            order_id: order_id.to_string(),
            stage,
            timestamp: now_utc(),
            assigned_to: None,
            duration_secs: None,
            execution_ref: None,
            customer_id: None,
        }
    }

    /// Builds a `StageStarted` event from a freshly opened record.
    #[must_use]
    pub fn started(record: &StageRecord) -> Self {
        let mut event = Self::new(
            StageEventKind::StageStarted,
            &record.tenant_id,
            &record.order_id,
            record.stage,
        );
        event.assigned_to = Some(record.assigned_to.clone());
        event
    }

    /// Builds a `StageCompleted` event carrying the computed duration.
    #[must_use]
    pub fn completed(record: &StageRecord, duration_secs: i64) -> Self {
        let mut event = Self::new(
            StageEventKind::StageCompleted,
            &record.tenant_id,
            &record.order_id,
            record.stage,
        );
        event.duration_secs = Some(duration_secs);
        event
    }

    /// Builds a `WorkflowStarted` event for an order entering its workflow.
    #[must_use]
    pub fn workflow_started(order: &Order) -> Self {
        let mut event = Self::new(
            StageEventKind::WorkflowStarted,
            &order.tenant_id,
            &order.order_id,
            Stage::initial(),
        );
        event.execution_ref = order.execution_ref.clone();
        event.customer_id = order.customer_id.clone();
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DEFAULT_ASSIGNEE;

    #[test]
    fn test_started_event_carries_assignee() {
        let record = StageRecord::begin("pardos", "O1", Stage::Cooking, "Ana");
        let event = StageEvent::started(&record);

        assert_eq!(event.kind, StageEventKind::StageStarted);
        assert_eq!(event.stage, Stage::Cooking);
        assert_eq!(event.assigned_to.as_deref(), Some("Ana"));
        assert!(event.duration_secs.is_none());
    }

    #[test]
    fn test_completed_event_carries_duration() {
        let record = StageRecord::begin("pardos", "O1", Stage::Delivery, DEFAULT_ASSIGNEE);
        let event = StageEvent::completed(&record, 42);

        assert_eq!(event.kind, StageEventKind::StageCompleted);
        assert_eq!(event.duration_secs, Some(42));
    }

    #[test]
    fn test_workflow_started_event() {
        let order = Order::new("pardos", "O1").with_customer("C9");
        let event = StageEvent::workflow_started(&order);

        assert_eq!(event.kind, StageEventKind::WorkflowStarted);
        assert_eq!(event.stage, Stage::Cooking);
        assert_eq!(event.customer_id.as_deref(), Some("C9"));
    }

    #[test]
    fn test_event_kind_serialization() {
        let json = serde_json::to_string(&StageEventKind::StageCompleted).unwrap();
        assert_eq!(json, r#""StageCompleted""#);
    }

    #[test]
    fn test_event_serialization_is_camel_case() {
        let record = StageRecord::begin("pardos", "O1", Stage::Packaging, DEFAULT_ASSIGNEE);
        let json = serde_json::to_value(StageEvent::completed(&record, 7)).unwrap();

        assert_eq!(json["kind"], "StageCompleted");
        assert_eq!(json["tenantId"], "pardos");
        assert_eq!(json["durationSecs"], 7);
        assert!(json.get("executionRef").is_none());
    }
}
