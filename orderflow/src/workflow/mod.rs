//! The workflow runner: end-to-end progression of an order's stages.
//!
//! The runner is the ordering authority. The orchestrator will start any
//! stage a caller asks for (operators can intervene out of band); the
//! runner is what walks the fixed sequence, whether stepped by the
//! external execution engine or driven synchronously to completion.

#[cfg(test)]
mod integration_tests;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::{Order, OrderItem, OrderPatch, Stage, StageEvent, WorkflowStatus};
use crate::errors::OrderflowError;
use crate::events::{EventPublisher, WORKFLOW_EVENT_SOURCE};
use crate::orchestrator::StageOrchestrator;
use crate::store::StageStore;
use crate::utils::{new_execution_ref, now_utc, require_field};

/// Command to begin a workflow, typically built from an intake event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartWorkflow {
    /// Tenant scope; always required.
    pub tenant_id: String,
    /// The order to drive. Intake events may arrive without one.
    #[serde(default)]
    pub order_id: Option<String>,
    /// The customer who placed the order, when known.
    #[serde(default)]
    pub customer_id: Option<String>,
    /// Line items from intake.
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

/// Result of a workflow start.
///
/// A missing order id rejects the command without raising: the intake bus
/// delivers malformed events and the subscription must not crash on them.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all_fields = "camelCase")]
pub enum StartWorkflowOutcome {
    /// The workflow began; the order now carries the execution handle.
    Started {
        /// Opaque handle correlating the order to its workflow instance.
        execution_ref: String,
        /// The order row as written.
        order: Order,
    },
    /// The command was unusable and nothing was written.
    Rejected {
        /// Why the command was dropped.
        reason: String,
    },
}

/// Result of one `run_stage` step, returned to the execution engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all_fields = "camelCase")]
pub enum RunStageOutcome {
    /// The stage was started; the engine should schedule `next_stage`.
    InProgress {
        /// The stage to run after this one completes.
        next_stage: Stage,
    },
    /// The sequence is finished; nothing left to schedule.
    Completed,
    /// The step failed; the engine owns retry and backoff.
    Failed {
        /// Description of the failure.
        error: String,
    },
}

/// Owns the end-to-end progression of an order's stages.
pub struct WorkflowRunner {
    store: Arc<dyn StageStore>,
    publisher: Arc<dyn EventPublisher>,
    orchestrator: StageOrchestrator,
}

impl WorkflowRunner {
    /// Creates a runner with explicit collaborators.
    #[must_use]
    pub fn new(store: Arc<dyn StageStore>, publisher: Arc<dyn EventPublisher>) -> Self {
        let orchestrator = StageOrchestrator::new(store.clone(), publisher.clone());
        Self {
            store,
            publisher,
            orchestrator,
        }
    }

    /// The orchestrator driving individual transitions.
    #[must_use]
    pub fn orchestrator(&self) -> &StageOrchestrator {
        &self.orchestrator
    }

    /// Begins the workflow for a newly created order.
    ///
    /// Allocates an execution handle, marks the order WORKFLOW_STARTED,
    /// opens the COOKING stage, and emits `WorkflowStarted`.
    pub async fn start_workflow(
        &self,
        command: StartWorkflow,
    ) -> Result<StartWorkflowOutcome, OrderflowError> {
        require_field(&command.tenant_id, "tenantId")?;

        let Some(order_id) = command
            .order_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
        else {
            warn!(tenant_id = %command.tenant_id, "order intake event without orderId; dropping");
            return Ok(StartWorkflowOutcome::Rejected {
                reason: "orderId missing from intake event".to_string(),
            });
        };

        let tenant_id = command.tenant_id.as_str();
        let execution_ref = new_execution_ref(tenant_id, order_id);

        let mut order = match self.store.get_order(tenant_id, order_id).await? {
            Some(existing) => existing,
            None => Order::new(tenant_id, order_id).with_items(command.items.clone()),
        };
        if command.customer_id.is_some() {
            order.customer_id = command.customer_id.clone();
        }
        order.workflow_status = WorkflowStatus::WorkflowStarted;
        order.execution_ref = Some(execution_ref.clone());
        order.updated_at = now_utc();
        self.store.put_order(order.clone()).await?;

        match self
            .orchestrator
            .start_stage(tenant_id, order_id, Stage::initial(), None)
            .await
        {
            Ok(_) => {}
            // A retried invocation finds COOKING already open; that is fine.
            Err(OrderflowError::DuplicateStage(_)) => {
                debug!(tenant_id = %tenant_id, order_id = %order_id, "initial stage already open");
            }
            Err(err) => return Err(err),
        }
        order.current_stage = Some(Stage::initial());

        let event = StageEvent::workflow_started(&order);
        if let Err(err) = self.publisher.publish(WORKFLOW_EVENT_SOURCE, &event).await {
            warn!(
                tenant_id = %tenant_id,
                order_id = %order_id,
                error = %err,
                "event publish failed"
            );
        }

        info!(
            tenant_id = %tenant_id,
            order_id = %order_id,
            execution_ref = %execution_ref,
            "workflow started"
        );
        Ok(StartWorkflowOutcome::Started {
            execution_ref,
            order,
        })
    }

    /// Runs one step of the workflow on behalf of the execution engine.
    ///
    /// Safe under at-least-once delivery: redelivery of a stage that is
    /// already open still reports IN_PROGRESS. Failures are folded into
    /// the outcome; the engine owns retry and backoff.
    pub async fn run_stage(
        &self,
        tenant_id: &str,
        order_id: &str,
        current_stage: Stage,
    ) -> RunStageOutcome {
        if current_stage.is_terminal() {
            let patch = OrderPatch::new()
                .with_workflow_status(WorkflowStatus::Completed)
                .with_updated_at(now_utc());
            if let Err(err) = self.store.update_order(tenant_id, order_id, patch).await {
                return RunStageOutcome::Failed {
                    error: err.to_string(),
                };
            }
            info!(tenant_id = %tenant_id, order_id = %order_id, "workflow completed");
            return RunStageOutcome::Completed;
        }

        match self
            .orchestrator
            .start_stage(tenant_id, order_id, current_stage, None)
            .await
        {
            Ok(_) | Err(OrderflowError::DuplicateStage(_)) => RunStageOutcome::InProgress {
                next_stage: current_stage.next(),
            },
            Err(err) => RunStageOutcome::Failed {
                error: err.to_string(),
            },
        }
    }

    /// Drives the full stage sequence synchronously.
    ///
    /// Simulation/backfill path: starts and completes every work stage in
    /// order, then marks the workflow COMPLETED. Returns the per-stage
    /// durations in sequence order.
    pub async fn run_to_completion(
        &self,
        tenant_id: &str,
        order_id: &str,
    ) -> Result<Vec<i64>, OrderflowError> {
        let mut durations = Vec::with_capacity(Stage::sequence().len());
        for stage in Stage::sequence() {
            match self
                .orchestrator
                .start_stage(tenant_id, order_id, stage, None)
                .await
            {
                Ok(_) => {}
                Err(OrderflowError::DuplicateStage(_)) => {
                    debug!(tenant_id = %tenant_id, order_id = %order_id, stage = %stage, "stage already open");
                }
                Err(err) => return Err(err),
            }
            durations.push(
                self.orchestrator
                    .complete_stage(tenant_id, order_id, stage)
                    .await?,
            );
        }

        let patch = OrderPatch::new()
            .with_workflow_status(WorkflowStatus::Completed)
            .with_updated_at(now_utc());
        self.store.update_order(tenant_id, order_id, patch).await?;

        info!(tenant_id = %tenant_id, order_id = %order_id, "workflow completed");
        Ok(durations)
    }
}
