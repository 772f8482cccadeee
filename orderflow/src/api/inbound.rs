//! Inbound event entry points.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::{OrderItem, StageEvent, StageEventKind};
use crate::errors::OrderflowError;
use crate::workflow::{StartWorkflow, StartWorkflowOutcome, WorkflowRunner};

/// Event published by the order-intake system when an order is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreated {
    /// Tenant scope.
    pub tenant_id: String,
    /// The new order's id; intake occasionally omits it.
    #[serde(default)]
    pub order_id: Option<String>,
    /// The customer who placed the order.
    #[serde(default)]
    pub customer_id: Option<String>,
    /// Line items.
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl From<OrderCreated> for StartWorkflow {
    fn from(event: OrderCreated) -> Self {
        Self {
            tenant_id: event.tenant_id,
            order_id: event.order_id,
            customer_id: event.customer_id,
            items: event.items,
        }
    }
}

/// Starts a workflow in response to an `OrderCreated` event.
pub async fn handle_order_created(
    runner: &WorkflowRunner,
    event: OrderCreated,
) -> Result<StartWorkflowOutcome, OrderflowError> {
    runner.start_workflow(event.into()).await
}

/// Consumes a stage lifecycle event for logging.
///
/// Side-effect free; subscribers needing this stream for correctness
/// should consume the bus directly.
pub fn log_stage_event(event: &StageEvent) {
    match event.kind {
        StageEventKind::StageStarted => info!(
            tenant_id = %event.tenant_id,
            order_id = %event.order_id,
            stage = %event.stage,
            "stage started event received"
        ),
        StageEventKind::StageCompleted => info!(
            tenant_id = %event.tenant_id,
            order_id = %event.order_id,
            stage = %event.stage,
            duration_secs = event.duration_secs,
            "stage completed event received"
        ),
        StageEventKind::WorkflowStarted => info!(
            tenant_id = %event.tenant_id,
            order_id = %event.order_id,
            execution_ref = event.execution_ref.as_deref(),
            "workflow started event received"
        ),
    }
}
