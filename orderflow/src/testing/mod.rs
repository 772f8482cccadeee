//! Testing utilities: failure-injecting doubles and fixtures.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::core::{Order, OrderItem, OrderPatch, RecordKey, Stage, StageEvent, StageRecord};
use crate::errors::{PublishError, StoreError};
use crate::events::EventPublisher;
use crate::store::{CompletionOutcome, StageStore};

/// A publisher whose every publish fails.
///
/// Used to verify that event emission is best-effort and never fails a
/// stage transition.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingEventPublisher;

#[async_trait]
impl EventPublisher for FailingEventPublisher {
    async fn publish(&self, _source: &str, _event: &StageEvent) -> Result<(), PublishError> {
        Err(PublishError::new("injected publish failure"))
    }
}

/// A store whose every operation reports a transient failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableStageStore;

impl UnavailableStageStore {
    fn unavailable() -> StoreError {
        StoreError::Unavailable("injected store failure".to_string())
    }
}

#[async_trait]
impl StageStore for UnavailableStageStore {
    async fn put_record(&self, _record: StageRecord) -> Result<(), StoreError> {
        Err(Self::unavailable())
    }

    async fn query_records(
        &self,
        _tenant_id: &str,
        _order_id: &str,
        _stage: Option<Stage>,
    ) -> Result<Vec<StageRecord>, StoreError> {
        Err(Self::unavailable())
    }

    async fn complete_record(
        &self,
        _key: &RecordKey,
        _finished_at: DateTime<Utc>,
    ) -> Result<CompletionOutcome, StoreError> {
        Err(Self::unavailable())
    }

    async fn put_order(&self, _order: Order) -> Result<(), StoreError> {
        Err(Self::unavailable())
    }

    async fn get_order(
        &self,
        _tenant_id: &str,
        _order_id: &str,
    ) -> Result<Option<Order>, StoreError> {
        Err(Self::unavailable())
    }

    async fn update_order(
        &self,
        _tenant_id: &str,
        _order_id: &str,
        _patch: OrderPatch,
    ) -> Result<(), StoreError> {
        Err(Self::unavailable())
    }

    async fn list_orders(&self, _tenant_id: &str) -> Result<Vec<Order>, StoreError> {
        Err(Self::unavailable())
    }
}

/// A plausible order with a customer and a couple of line items.
#[must_use]
pub fn sample_order(tenant_id: &str, order_id: &str) -> Order {
    Order::new(tenant_id, order_id)
        .with_customer("C-100")
        .with_items(sample_items())
}

/// A plausible set of line items.
#[must_use]
pub fn sample_items() -> Vec<OrderItem> {
    vec![
        OrderItem::new("Pollo a la Brasa", 2),
        OrderItem::new("Chicha Morada", 1),
    ]
}
