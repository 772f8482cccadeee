//! In-memory stage store backed by concurrent hashmaps.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use super::{CompletionOutcome, StageStore};
use crate::core::{Order, OrderPatch, RecordKey, RecordStatus, Stage, StageRecord};
use crate::errors::StoreError;

type OrderKey = (String, String);

fn order_key(tenant_id: &str, order_id: &str) -> OrderKey {
    (tenant_id.to_string(), order_id.to_string())
}

/// In-memory `StageStore` implementation.
///
/// Both maps are keyed by `(tenant, order)`, so dashmap's per-entry
/// locking gives atomic conditional writes within one order without
/// blocking operations on other orders.
#[derive(Debug, Default)]
pub struct InMemoryStageStore {
    orders: DashMap<OrderKey, Order>,
    records: DashMap<OrderKey, Vec<StageRecord>>,
}

impl InMemoryStageStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stage records across all orders.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.records.iter().map(|entry| entry.value().len()).sum()
    }

    /// Total number of order rows across all tenants.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }
}

#[async_trait]
impl StageStore for InMemoryStageStore {
    async fn put_record(&self, record: StageRecord) -> Result<(), StoreError> {
        let key = order_key(&record.tenant_id, &record.order_id);
        self.records.entry(key).or_default().push(record);
        Ok(())
    }

    async fn query_records(
        &self,
        tenant_id: &str,
        order_id: &str,
        stage: Option<Stage>,
    ) -> Result<Vec<StageRecord>, StoreError> {
        let key = order_key(tenant_id, order_id);
        let mut matched: Vec<StageRecord> = self
            .records
            .get(&key)
            .map(|entry| {
                entry
                    .value()
                    .iter()
                    .filter(|record| stage.map_or(true, |s| record.stage == s))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        matched.sort_by_key(|record| record.started_at);
        Ok(matched)
    }

    async fn complete_record(
        &self,
        key: &RecordKey,
        finished_at: DateTime<Utc>,
    ) -> Result<CompletionOutcome, StoreError> {
        let entry_key = order_key(&key.tenant_id, &key.order_id);
        let Some(mut entry) = self.records.get_mut(&entry_key) else {
            return Ok(CompletionOutcome::Missing);
        };

        let Some(record) = entry
            .value_mut()
            .iter_mut()
            .find(|record| record.stage == key.stage && record.started_at == key.started_at)
        else {
            return Ok(CompletionOutcome::Missing);
        };

        if record.status == RecordStatus::Completed {
            return Ok(CompletionOutcome::AlreadyCompleted(record.clone()));
        }

        record.status = RecordStatus::Completed;
        record.finished_at = Some(finished_at);
        Ok(CompletionOutcome::Completed(record.clone()))
    }

    async fn put_order(&self, order: Order) -> Result<(), StoreError> {
        let key = order_key(&order.tenant_id, &order.order_id);
        self.orders.insert(key, order);
        Ok(())
    }

    async fn get_order(&self, tenant_id: &str, order_id: &str) -> Result<Option<Order>, StoreError> {
        let key = order_key(tenant_id, order_id);
        Ok(self.orders.get(&key).map(|entry| entry.value().clone()))
    }

    async fn update_order(
        &self,
        tenant_id: &str,
        order_id: &str,
        patch: OrderPatch,
    ) -> Result<(), StoreError> {
        let key = order_key(tenant_id, order_id);
        match self.orders.get_mut(&key) {
            Some(mut entry) => entry.value_mut().apply(&patch),
            None => {
                // Sparse upsert: an operator can start a stage before the
                // intake system has written the order row.
                let mut order = Order::new(tenant_id, order_id);
                order.apply(&patch);
                self.orders.insert(key, order);
            }
        }
        Ok(())
    }

    async fn list_orders(&self, tenant_id: &str) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|entry| entry.key().0 == tenant_id)
            .map(|entry| entry.value().clone())
            .collect();

        orders.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.order_id.cmp(&b.order_id))
        });
        Ok(orders)
    }
}
