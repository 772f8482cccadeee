//! Read-only dashboard aggregates over the stage store.
//!
//! Every value is a point-in-time snapshot with no caching; consistency is
//! whatever the underlying store provides. No orchestration logic lives
//! here.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};

use crate::core::{Order, RecordStatus, Stage, StageRecord};
use crate::errors::OrderflowError;
use crate::store::StageStore;
use crate::utils::{now_utc, require_field};

/// How many days the daily order series covers, including today.
pub const DAILY_SERIES_DAYS: i64 = 7;

/// Headline counts for the dashboard landing view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// All orders known for the tenant.
    pub total_orders: usize,
    /// Orders created on today's UTC date.
    pub orders_today: usize,
    /// Orders whose workflow is neither COMPLETED nor FAILED.
    pub active_orders: usize,
    /// Mean duration of completed DELIVERY stages, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_delivery_secs: Option<f64>,
    /// When this snapshot was taken.
    pub last_updated: DateTime<Utc>,
}

/// Chart-oriented aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    /// Distribution of orders over their current stage.
    pub orders_by_stage: BTreeMap<Stage, usize>,
    /// Mean completed duration per work stage, in seconds.
    pub mean_stage_secs: BTreeMap<Stage, f64>,
    /// Daily order counts for the trailing week, oldest first.
    pub daily_orders: Vec<DailyCount>,
    /// Most-ordered products, descending by quantity.
    pub top_products: Vec<ProductCount>,
}

/// Orders created on one UTC date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCount {
    /// The UTC date.
    pub date: NaiveDate,
    /// Orders created on that date.
    pub count: usize,
}

/// Cumulative quantity ordered of one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCount {
    /// Product name.
    pub product: String,
    /// Total units across all orders.
    pub quantity: u64,
}

/// An order enriched with its stage history, for the order list view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithHistory {
    /// The order row.
    #[serde(flatten)]
    pub order: Order,
    /// Stage records ordered by start time.
    pub stages: Vec<StageRecord>,
}

/// Computes read-only aggregates for one tenant.
pub struct DashboardAggregator {
    store: Arc<dyn StageStore>,
}

impl DashboardAggregator {
    /// Creates an aggregator over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn StageStore>) -> Self {
        Self { store }
    }

    /// Headline counts for the tenant.
    pub async fn summary(&self, tenant_id: &str) -> Result<DashboardSummary, OrderflowError> {
        require_field(tenant_id, "tenantId")?;

        let now = now_utc();
        let today = now.date_naive();
        let orders = self.store.list_orders(tenant_id).await?;

        let orders_today = orders
            .iter()
            .filter(|order| order.created_at.date_naive() == today)
            .count();
        let active_orders = orders
            .iter()
            .filter(|order| order.workflow_status.is_open())
            .count();

        let delivery_durations = self
            .completed_durations(tenant_id, &orders)
            .await?
            .remove(&Stage::Delivery)
            .unwrap_or_default();

        Ok(DashboardSummary {
            total_orders: orders.len(),
            orders_today,
            active_orders,
            mean_delivery_secs: mean(&delivery_durations),
            last_updated: now,
        })
    }

    /// Chart aggregates for the tenant.
    ///
    /// `top_limit` bounds the product ranking.
    pub async fn metrics(
        &self,
        tenant_id: &str,
        top_limit: usize,
    ) -> Result<DashboardMetrics, OrderflowError> {
        require_field(tenant_id, "tenantId")?;

        let orders = self.store.list_orders(tenant_id).await?;

        let mut orders_by_stage: BTreeMap<Stage, usize> = BTreeMap::new();
        for order in &orders {
            if let Some(stage) = order.current_stage {
                *orders_by_stage.entry(stage).or_default() += 1;
            }
        }

        let mean_stage_secs = self
            .completed_durations(tenant_id, &orders)
            .await?
            .into_iter()
            .filter_map(|(stage, durations)| mean(&durations).map(|m| (stage, m)))
            .collect();

        Ok(DashboardMetrics {
            orders_by_stage,
            mean_stage_secs,
            daily_orders: daily_series(&orders, now_utc()),
            top_products: top_products(&orders, top_limit),
        })
    }

    /// The most recent orders with their stage histories, newest first.
    pub async fn recent_orders(
        &self,
        tenant_id: &str,
        limit: usize,
    ) -> Result<Vec<OrderWithHistory>, OrderflowError> {
        require_field(tenant_id, "tenantId")?;

        let mut orders = self.store.list_orders(tenant_id).await?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders.truncate(limit);

        let histories = try_join_all(
            orders
                .iter()
                .map(|order| self.store.query_records(tenant_id, &order.order_id, None)),
        )
        .await?;

        Ok(orders
            .into_iter()
            .zip(histories)
            .map(|(order, stages)| OrderWithHistory { order, stages })
            .collect())
    }

    /// Completed stage durations for a tenant, grouped by stage.
    async fn completed_durations(
        &self,
        tenant_id: &str,
        orders: &[Order],
    ) -> Result<BTreeMap<Stage, Vec<i64>>, OrderflowError> {
        let record_lists = try_join_all(
            orders
                .iter()
                .map(|order| self.store.query_records(tenant_id, &order.order_id, None)),
        )
        .await?;

        let mut by_stage: BTreeMap<Stage, Vec<i64>> = BTreeMap::new();
        for record in record_lists.into_iter().flatten() {
            if record.status != RecordStatus::Completed {
                continue;
            }
            if let Some(duration) = record.duration_secs() {
                by_stage.entry(record.stage).or_default().push(duration);
            }
        }
        Ok(by_stage)
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[i64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<i64>() as f64 / values.len() as f64)
}

fn daily_series(orders: &[Order], now: DateTime<Utc>) -> Vec<DailyCount> {
    let today = now.date_naive();
    (0..DAILY_SERIES_DAYS)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            let count = orders
                .iter()
                .filter(|order| order.created_at.date_naive() == date)
                .count();
            DailyCount { date, count }
        })
        .collect()
}

fn top_products(orders: &[Order], limit: usize) -> Vec<ProductCount> {
    let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
    for item in orders.iter().flat_map(|order| order.items.iter()) {
        *totals.entry(item.product.as_str()).or_default() += u64::from(item.quantity);
    }

    let mut ranked: Vec<ProductCount> = totals
        .into_iter()
        .map(|(product, quantity)| ProductCount {
            product: product.to_string(),
            quantity,
        })
        .collect();
    ranked.sort_by(|a, b| b.quantity.cmp(&a.quantity).then_with(|| a.product.cmp(&b.product)));
    ranked.truncate(limit);
    ranked
}
