//! End-to-end workflow scenarios against the in-memory store.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use crate::core::{RecordStatus, Stage, StageEventKind, WorkflowStatus};
use crate::events::CollectingEventPublisher;
use crate::store::{InMemoryStageStore, StageStore};
use crate::workflow::{RunStageOutcome, StartWorkflow, StartWorkflowOutcome, WorkflowRunner};

fn runner() -> (
    WorkflowRunner,
    Arc<InMemoryStageStore>,
    Arc<CollectingEventPublisher>,
) {
    let store = Arc::new(InMemoryStageStore::new());
    let publisher = Arc::new(CollectingEventPublisher::new());
    let runner = WorkflowRunner::new(store.clone(), publisher.clone());
    (runner, store, publisher)
}

fn intake(tenant_id: &str, order_id: &str) -> StartWorkflow {
    StartWorkflow {
        tenant_id: tenant_id.to_string(),
        order_id: Some(order_id.to_string()),
        customer_id: None,
        items: Vec::new(),
    }
}

#[tokio::test]
async fn test_self_driving_workflow_end_to_end() {
    let (runner, store, publisher) = runner();
    runner
        .start_workflow(intake("pardos", "O1"))
        .await
        .unwrap();

    let durations = runner.run_to_completion("pardos", "O1").await.unwrap();
    assert_eq!(durations.len(), 3);
    assert!(durations.iter().all(|d| *d >= 0));

    let order = store.get_order("pardos", "O1").await.unwrap().unwrap();
    assert_eq!(order.workflow_status, WorkflowStatus::Completed);
    assert_eq!(order.current_stage, Some(Stage::Delivery));

    let records = store.query_records("pardos", "O1", None).await.unwrap();
    assert_eq!(records.len(), 3);
    assert!(records
        .iter()
        .all(|record| record.status == RecordStatus::Completed));

    assert_eq!(publisher.of_kind(StageEventKind::WorkflowStarted).len(), 1);
    assert_eq!(publisher.of_kind(StageEventKind::StageStarted).len(), 3);
    assert_eq!(publisher.of_kind(StageEventKind::StageCompleted).len(), 3);
}

#[tokio::test]
async fn test_engine_stepped_workflow_walks_the_sequence() {
    let (runner, store, _) = runner();
    runner
        .start_workflow(intake("pardos", "O2"))
        .await
        .unwrap();

    // The engine re-invokes run_stage once per stage, completing each
    // stage out of band before the next step.
    let mut stage = Stage::Cooking;
    let mut steps = Vec::new();
    loop {
        let outcome = runner.run_stage("pardos", "O2", stage).await;
        match outcome {
            RunStageOutcome::InProgress { next_stage } => {
                runner
                    .orchestrator()
                    .complete_stage("pardos", "O2", stage)
                    .await
                    .unwrap();
                steps.push(stage);
                stage = next_stage;
            }
            RunStageOutcome::Completed => break,
            RunStageOutcome::Failed { error } => panic!("unexpected failure: {error}"),
        }
    }

    assert_eq!(
        steps,
        vec![Stage::Cooking, Stage::Packaging, Stage::Delivery]
    );

    let order = store.get_order("pardos", "O2").await.unwrap().unwrap();
    assert_eq!(order.workflow_status, WorkflowStatus::Completed);
}

#[tokio::test]
async fn test_tenants_do_not_observe_each_other() {
    let (runner, store, _) = runner();

    runner
        .start_workflow(intake("pardos", "O1"))
        .await
        .unwrap();
    runner
        .start_workflow(intake("bembos", "O1"))
        .await
        .unwrap();
    runner.run_to_completion("pardos", "O1").await.unwrap();

    let pardos = store.get_order("pardos", "O1").await.unwrap().unwrap();
    let bembos = store.get_order("bembos", "O1").await.unwrap().unwrap();
    assert_eq!(pardos.workflow_status, WorkflowStatus::Completed);
    assert_eq!(bembos.workflow_status, WorkflowStatus::WorkflowStarted);

    let bembos_records = store.query_records("bembos", "O1", None).await.unwrap();
    assert_eq!(bembos_records.len(), 1);
    assert!(bembos_records[0].is_in_progress());
}

#[tokio::test]
async fn test_started_outcome_serialization() {
    let (runner, _, _) = runner();
    let outcome = runner
        .start_workflow(intake("pardos", "O1"))
        .await
        .unwrap();

    assert!(matches!(outcome, StartWorkflowOutcome::Started { .. }));
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["status"], "STARTED");
    assert_eq!(json["order"]["currentStage"], "COOKING");
    assert!(json["executionRef"].as_str().unwrap().starts_with("pardos-O1-"));
}
