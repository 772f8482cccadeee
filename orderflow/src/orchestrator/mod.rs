//! The stage orchestrator: legal transitions, durable records, events.
//!
//! The orchestrator owns the write path for stage transitions. The stage
//! record is written before the order's stage pointer: the record history
//! is the source of truth, and a failed pointer update is recoverable via
//! [`StageOrchestrator::recompute_current_stage`].

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::core::{OrderPatch, Stage, StageEvent, StageRecord, DEFAULT_ASSIGNEE};
use crate::errors::{DuplicateStageError, OrderflowError, StageNotFoundError, ValidationError};
use crate::events::{EventPublisher, STAGE_EVENT_SOURCE};
use crate::store::{CompletionOutcome, StageStore};
use crate::utils::{now_utc, require_field};

/// Drives individual stage transitions for orders.
///
/// Stateless apart from its injected collaborators; safe to share across
/// concurrent requests.
pub struct StageOrchestrator {
    store: Arc<dyn StageStore>,
    publisher: Arc<dyn EventPublisher>,
}

impl StageOrchestrator {
    /// Creates an orchestrator with explicit collaborators.
    #[must_use]
    pub fn new(store: Arc<dyn StageStore>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self { store, publisher }
    }

    /// Opens a stage for an order.
    ///
    /// Creates an IN_PROGRESS record, moves the order's stage pointer, and
    /// emits `StageStarted`. Rejects a start while a record for the same
    /// stage is still open, and rejects the terminal marker as a startable
    /// stage.
    pub async fn start_stage(
        &self,
        tenant_id: &str,
        order_id: &str,
        stage: Stage,
        assigned_to: Option<&str>,
    ) -> Result<StageRecord, OrderflowError> {
        require_field(tenant_id, "tenantId")?;
        require_field(order_id, "orderId")?;
        if stage.is_terminal() {
            return Err(ValidationError::InvalidValue {
                field: "stage",
                value: stage.to_string(),
            }
            .into());
        }

        let existing = self
            .store
            .query_records(tenant_id, order_id, Some(stage))
            .await?;
        if existing.iter().any(StageRecord::is_in_progress) {
            return Err(DuplicateStageError {
                tenant_id: tenant_id.to_string(),
                order_id: order_id.to_string(),
                stage,
            }
            .into());
        }

        let record = StageRecord::begin(
            tenant_id,
            order_id,
            stage,
            assigned_to.unwrap_or(DEFAULT_ASSIGNEE),
        );
        self.store.put_record(record.clone()).await?;

        let patch = OrderPatch::new()
            .with_current_stage(stage)
            .with_updated_at(record.started_at);
        if let Err(err) = self.store.update_order(tenant_id, order_id, patch).await {
            // The record is durable; the pointer can be rebuilt from it.
            warn!(
                tenant_id = %tenant_id,
                order_id = %order_id,
                stage = %stage,
                error = %err,
                "order stage pointer update failed after record write"
            );
        }

        self.publish_best_effort(StageEvent::started(&record)).await;

        info!(
            tenant_id = %tenant_id,
            order_id = %order_id,
            stage = %stage,
            assigned_to = %record.assigned_to,
            "stage started"
        );
        Ok(record)
    }

    /// Completes the most recently started record for a stage.
    ///
    /// Returns the stage duration in whole seconds. Retries and concurrent
    /// duplicates are safe: the conditional store write elects a single
    /// winner, and only the winner emits `StageCompleted`.
    pub async fn complete_stage(
        &self,
        tenant_id: &str,
        order_id: &str,
        stage: Stage,
    ) -> Result<i64, OrderflowError> {
        require_field(tenant_id, "tenantId")?;
        require_field(order_id, "orderId")?;

        let records = self
            .store
            .query_records(tenant_id, order_id, Some(stage))
            .await?;
        let Some(latest) = records.last() else {
            return Err(StageNotFoundError {
                tenant_id: tenant_id.to_string(),
                order_id: order_id.to_string(),
                stage,
            }
            .into());
        };

        let outcome = self
            .store
            .complete_record(&latest.key(), now_utc())
            .await?;
        match outcome {
            CompletionOutcome::Completed(record) => {
                let duration_secs = record.duration_secs().unwrap_or_default();
                self.publish_best_effort(StageEvent::completed(&record, duration_secs))
                    .await;
                info!(
                    tenant_id = %tenant_id,
                    order_id = %order_id,
                    stage = %stage,
                    duration_secs,
                    "stage completed"
                );
                Ok(duration_secs)
            }
            CompletionOutcome::AlreadyCompleted(record) => {
                let duration_secs = record.duration_secs().unwrap_or_default();
                debug!(
                    tenant_id = %tenant_id,
                    order_id = %order_id,
                    stage = %stage,
                    "stage already completed; skipping event"
                );
                Ok(duration_secs)
            }
            CompletionOutcome::Missing => Err(StageNotFoundError {
                tenant_id: tenant_id.to_string(),
                order_id: order_id.to_string(),
                stage,
            }
            .into()),
        }
    }

    /// Maps a stage to its successor in the fixed sequence.
    ///
    /// Pure and total; `COMPLETED` is terminal and maps to itself.
    #[must_use]
    pub fn advance_order(stage: Stage) -> Stage {
        stage.next()
    }

    /// Rebuilds the order's stage pointer from record history.
    ///
    /// Recovery path for a pointer update that failed after the record
    /// write succeeded. Returns the recomputed stage, or `None` when the
    /// order has no records.
    pub async fn recompute_current_stage(
        &self,
        tenant_id: &str,
        order_id: &str,
    ) -> Result<Option<Stage>, OrderflowError> {
        let records = self.store.query_records(tenant_id, order_id, None).await?;
        let Some(latest) = records.iter().max_by_key(|record| record.started_at) else {
            return Ok(None);
        };

        let patch = OrderPatch::new()
            .with_current_stage(latest.stage)
            .with_updated_at(now_utc());
        self.store.update_order(tenant_id, order_id, patch).await?;
        Ok(Some(latest.stage))
    }

    /// Publishes an event, logging failures instead of propagating them.
    async fn publish_best_effort(&self, event: StageEvent) {
        if let Err(err) = self.publisher.publish(STAGE_EVENT_SOURCE, &event).await {
            warn!(
                kind = %event.kind,
                tenant_id = %event.tenant_id,
                order_id = %event.order_id,
                error = %err,
                "event publish failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{RecordStatus, StageEventKind};
    use crate::events::CollectingEventPublisher;
    use crate::store::InMemoryStageStore;
    use crate::testing::FailingEventPublisher;

    fn orchestrator() -> (
        StageOrchestrator,
        Arc<InMemoryStageStore>,
        Arc<CollectingEventPublisher>,
    ) {
        let store = Arc::new(InMemoryStageStore::new());
        let publisher = Arc::new(CollectingEventPublisher::new());
        let orchestrator = StageOrchestrator::new(store.clone(), publisher.clone());
        (orchestrator, store, publisher)
    }

    #[tokio::test]
    async fn test_start_stage_writes_record_pointer_and_event() {
        let (orchestrator, store, publisher) = orchestrator();

        let record = orchestrator
            .start_stage("pardos", "O1", Stage::Cooking, Some("Ana"))
            .await
            .unwrap();

        assert_eq!(record.status, RecordStatus::InProgress);
        assert_eq!(record.assigned_to, "Ana");

        let order = store.get_order("pardos", "O1").await.unwrap().unwrap();
        assert_eq!(order.current_stage, Some(Stage::Cooking));

        let started = publisher.of_kind(StageEventKind::StageStarted);
        assert_eq!(started.len(), 1);
        assert_eq!(started[0].assigned_to.as_deref(), Some("Ana"));
    }

    #[tokio::test]
    async fn test_start_stage_requires_identifiers() {
        let (orchestrator, store, _) = orchestrator();

        let err = orchestrator
            .start_stage("", "O1", Stage::Cooking, None)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);

        let err = orchestrator
            .start_stage("pardos", "", Stage::Cooking, None)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);

        assert_eq!(store.record_count(), 0);
    }

    #[tokio::test]
    async fn test_start_stage_rejects_terminal_marker() {
        let (orchestrator, _, _) = orchestrator();

        let err = orchestrator
            .start_stage("pardos", "O1", Stage::Completed, None)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderflowError::Validation(_)));
    }

    #[tokio::test]
    async fn test_start_stage_rejects_duplicate_open_record() {
        let (orchestrator, store, publisher) = orchestrator();

        orchestrator
            .start_stage("pardos", "O1", Stage::Cooking, None)
            .await
            .unwrap();
        let err = orchestrator
            .start_stage("pardos", "O1", Stage::Cooking, None)
            .await
            .unwrap_err();

        assert!(matches!(err, OrderflowError::DuplicateStage(_)));
        assert_eq!(store.record_count(), 1);
        assert_eq!(publisher.len(), 1);
    }

    #[tokio::test]
    async fn test_start_allowed_again_after_completion() {
        let (orchestrator, store, _) = orchestrator();

        orchestrator
            .start_stage("pardos", "O1", Stage::Cooking, None)
            .await
            .unwrap();
        orchestrator
            .complete_stage("pardos", "O1", Stage::Cooking)
            .await
            .unwrap();
        orchestrator
            .start_stage("pardos", "O1", Stage::Cooking, None)
            .await
            .unwrap();

        assert_eq!(store.record_count(), 2);
    }

    #[tokio::test]
    async fn test_complete_stage_computes_duration_and_emits() {
        let (orchestrator, _, publisher) = orchestrator();

        orchestrator
            .start_stage("pardos", "O1", Stage::Cooking, None)
            .await
            .unwrap();
        let duration = orchestrator
            .complete_stage("pardos", "O1", Stage::Cooking)
            .await
            .unwrap();

        assert!(duration >= 0);

        let completed = publisher.of_kind(StageEventKind::StageCompleted);
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].duration_secs, Some(duration));
    }

    #[tokio::test]
    async fn test_complete_missing_stage_is_not_found_and_writes_nothing() {
        let (orchestrator, store, publisher) = orchestrator();

        let err = orchestrator
            .complete_stage("pardos", "O1", Stage::Packaging)
            .await
            .unwrap_err();

        assert!(matches!(err, OrderflowError::NotFound(_)));
        assert_eq!(err.status_code(), 404);
        assert_eq!(store.record_count(), 0);
        assert!(publisher.is_empty());
    }

    #[tokio::test]
    async fn test_complete_picks_latest_started_record() {
        let (orchestrator, store, _) = orchestrator();

        // Seed two open records directly, as imported history may contain.
        let mut early = StageRecord::begin("pardos", "O1", Stage::Cooking, DEFAULT_ASSIGNEE);
        early.started_at -= chrono::Duration::seconds(300);
        let mut late = StageRecord::begin("pardos", "O1", Stage::Cooking, DEFAULT_ASSIGNEE);
        late.started_at -= chrono::Duration::seconds(30);
        let late_key = late.key();
        store.put_record(early).await.unwrap();
        store.put_record(late).await.unwrap();

        orchestrator
            .complete_stage("pardos", "O1", Stage::Cooking)
            .await
            .unwrap();

        let records = store
            .query_records("pardos", "O1", Some(Stage::Cooking))
            .await
            .unwrap();
        let completed: Vec<_> = records
            .iter()
            .filter(|r| r.status == RecordStatus::Completed)
            .collect();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].key(), late_key);
    }

    #[tokio::test]
    async fn test_complete_retry_returns_duration_without_second_event() {
        let (orchestrator, _, publisher) = orchestrator();

        orchestrator
            .start_stage("pardos", "O1", Stage::Cooking, None)
            .await
            .unwrap();
        let first = orchestrator
            .complete_stage("pardos", "O1", Stage::Cooking)
            .await
            .unwrap();
        let second = orchestrator
            .complete_stage("pardos", "O1", Stage::Cooking)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(publisher.of_kind(StageEventKind::StageCompleted).len(), 1);
    }

    #[tokio::test]
    async fn test_publish_failure_does_not_fail_transitions() {
        let store = Arc::new(InMemoryStageStore::new());
        let orchestrator =
            StageOrchestrator::new(store.clone(), Arc::new(FailingEventPublisher));

        orchestrator
            .start_stage("pardos", "O1", Stage::Cooking, None)
            .await
            .unwrap();
        let duration = orchestrator
            .complete_stage("pardos", "O1", Stage::Cooking)
            .await
            .unwrap();

        assert!(duration >= 0);
        assert_eq!(store.record_count(), 1);
    }

    #[tokio::test]
    async fn test_advance_order_sequence() {
        assert_eq!(
            StageOrchestrator::advance_order(Stage::Cooking),
            Stage::Packaging
        );
        assert_eq!(
            StageOrchestrator::advance_order(Stage::Delivery),
            Stage::Completed
        );
        assert_eq!(
            StageOrchestrator::advance_order(Stage::Completed),
            Stage::Completed
        );
    }

    #[tokio::test]
    async fn test_recompute_current_stage_from_history() {
        let (orchestrator, store, _) = orchestrator();

        orchestrator
            .start_stage("pardos", "O1", Stage::Cooking, None)
            .await
            .unwrap();
        orchestrator
            .complete_stage("pardos", "O1", Stage::Cooking)
            .await
            .unwrap();
        let mut packaging = StageRecord::begin("pardos", "O1", Stage::Packaging, DEFAULT_ASSIGNEE);
        packaging.started_at += chrono::Duration::seconds(5);
        store.put_record(packaging).await.unwrap();

        let stage = orchestrator
            .recompute_current_stage("pardos", "O1")
            .await
            .unwrap();

        assert_eq!(stage, Some(Stage::Packaging));
        let order = store.get_order("pardos", "O1").await.unwrap().unwrap();
        assert_eq!(order.current_stage, Some(Stage::Packaging));
    }

    #[tokio::test]
    async fn test_recompute_with_no_history() {
        let (orchestrator, _, _) = orchestrator();
        let stage = orchestrator
            .recompute_current_stage("pardos", "O1")
            .await
            .unwrap();
        assert_eq!(stage, None);
    }
}
