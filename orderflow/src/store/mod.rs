//! The durable stage store contract.
//!
//! The store holds two collections per tenant/order: the order row and the
//! append-only list of stage records. The orchestrator writes records
//! first; the order row's stage pointer is derived state and can always be
//! rebuilt from record history.

mod memory;

pub use memory::InMemoryStageStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::core::{Order, OrderPatch, RecordKey, Stage, StageRecord};
use crate::errors::StoreError;

/// Result of a conditional record completion.
///
/// The condition (status must still be IN_PROGRESS) elects a single winner
/// among concurrent completion attempts; the loser observes
/// `AlreadyCompleted` and must not emit a second completion event.
#[derive(Debug, Clone)]
pub enum CompletionOutcome {
    /// This call transitioned the record to COMPLETED.
    Completed(StageRecord),
    /// The record was already COMPLETED; returned as stored.
    AlreadyCompleted(StageRecord),
    /// No record matched the key.
    Missing,
}

/// Contract for the durable stage store.
///
/// Implementations must provide atomic conditional writes per record key
/// and must not block operations on one order behind another.
#[async_trait]
pub trait StageStore: Send + Sync {
    /// Appends a stage record.
    async fn put_record(&self, record: StageRecord) -> Result<(), StoreError>;

    /// Returns the records for an order ordered by `started_at`,
    /// optionally filtered to a single stage.
    async fn query_records(
        &self,
        tenant_id: &str,
        order_id: &str,
        stage: Option<Stage>,
    ) -> Result<Vec<StageRecord>, StoreError>;

    /// Conditionally completes the record identified by `key`.
    async fn complete_record(
        &self,
        key: &RecordKey,
        finished_at: DateTime<Utc>,
    ) -> Result<CompletionOutcome, StoreError>;

    /// Inserts or replaces an order row.
    async fn put_order(&self, order: Order) -> Result<(), StoreError>;

    /// Fetches an order row.
    async fn get_order(&self, tenant_id: &str, order_id: &str) -> Result<Option<Order>, StoreError>;

    /// Applies a partial update to an order row.
    async fn update_order(
        &self,
        tenant_id: &str,
        order_id: &str,
        patch: OrderPatch,
    ) -> Result<(), StoreError>;

    /// Returns every order row for a tenant.
    async fn list_orders(&self, tenant_id: &str) -> Result<Vec<Order>, StoreError>;
}
