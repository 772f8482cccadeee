//! Order rows and patch updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Stage, WorkflowStatus};
use crate::utils::now_utc;

/// One line item on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Product name.
    pub product: String,
    /// Units ordered.
    pub quantity: u32,
}

impl OrderItem {
    /// Creates a new line item.
    #[must_use]
    pub fn new(product: impl Into<String>, quantity: u32) -> Self {
        Self {
            product: product.into(),
            quantity,
        }
    }
}

/// An order row, keyed by `(tenant_id, order_id)`.
///
/// Mutated only by the orchestrator and the workflow runner; never deleted
/// by this subsystem. Wire serialization is camelCase per the HTTP and
/// event-bus contracts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Isolation boundary for the restaurant/brand.
    pub tenant_id: String,
    /// Identifier of the order within the tenant.
    pub order_id: String,
    /// The customer who placed the order, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    /// The most recently started stage; `None` until a workflow starts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_stage: Option<Stage>,
    /// Where the order sits in its workflow lifecycle.
    #[serde(default)]
    pub workflow_status: WorkflowStatus,
    /// Opaque handle to the running workflow instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_ref: Option<String>,
    /// Line items, used by the dashboard's product ranking.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<OrderItem>,
    /// When the order was created.
    pub created_at: DateTime<Utc>,
    /// When the order was last touched by this subsystem.
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Creates a fresh order row with no workflow state.
    #[must_use]
    pub fn new(tenant_id: impl Into<String>, order_id: impl Into<String>) -> Self {
        let now = now_utc();
        Self {
            tenant_id: tenant_id.into(),
            order_id: order_id.into(),
            customer_id: None,
            current_stage: None,
            workflow_status: WorkflowStatus::default(),
            execution_ref: None,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the customer.
    #[must_use]
    pub fn with_customer(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    /// Sets the line items.
    #[must_use]
    pub fn with_items(mut self, items: Vec<OrderItem>) -> Self {
        self.items = items;
        self
    }

    /// Applies a patch in place.
    pub fn apply(&mut self, patch: &OrderPatch) {
        if let Some(stage) = patch.current_stage {
            self.current_stage = Some(stage);
        }
        if let Some(status) = patch.workflow_status {
            self.workflow_status = status;
        }
        if let Some(ref execution_ref) = patch.execution_ref {
            self.execution_ref = Some(execution_ref.clone());
        }
        if let Some(updated_at) = patch.updated_at {
            self.updated_at = updated_at;
        }
    }
}

/// A partial update to an order row.
///
/// Only the fields the orchestrator owns are patchable; identity, items,
/// and creation time are immutable here.
#[derive(Debug, Clone, Default)]
pub struct OrderPatch {
    /// New current stage, if changing.
    pub current_stage: Option<Stage>,
    /// New workflow status, if changing.
    pub workflow_status: Option<WorkflowStatus>,
    /// New execution reference, if changing.
    pub execution_ref: Option<String>,
    /// New updated-at timestamp, if changing.
    pub updated_at: Option<DateTime<Utc>>,
}

impl OrderPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the current stage.
    #[must_use]
    pub fn with_current_stage(mut self, stage: Stage) -> Self {
        self.current_stage = Some(stage);
        self
    }

    /// Sets the workflow status.
    #[must_use]
    pub fn with_workflow_status(mut self, status: WorkflowStatus) -> Self {
        self.workflow_status = Some(status);
        self
    }

    /// Sets the execution reference.
    #[must_use]
    pub fn with_execution_ref(mut self, execution_ref: impl Into<String>) -> Self {
        self.execution_ref = Some(execution_ref.into());
        self
    }

    /// Sets the updated-at timestamp.
    #[must_use]
    pub fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = Some(updated_at);
        self
    }
}
