//! JSON request handlers and the response envelope.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::Stage;
use crate::dashboard::DashboardAggregator;
use crate::errors::OrderflowError;
use crate::orchestrator::StageOrchestrator;

/// Default page size for the order list view.
pub const DEFAULT_ORDER_LIMIT: usize = 50;

/// Default length of the product ranking.
pub const DEFAULT_TOP_PRODUCTS: usize = 5;

/// Request body for starting a stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartStageRequest {
    /// Tenant scope.
    pub tenant_id: String,
    /// The order to transition.
    pub order_id: String,
    /// Stage name, e.g. "COOKING".
    pub stage: String,
    /// Optional actor; defaults to "System".
    #[serde(default)]
    pub assigned_to: Option<String>,
}

/// Request body for completing a stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteStageRequest {
    /// Tenant scope.
    pub tenant_id: String,
    /// The order to transition.
    pub order_id: String,
    /// Stage name, e.g. "COOKING".
    pub stage: String,
}

/// HTTP-style response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    /// HTTP-style status code.
    pub status_code: u16,
    /// JSON body; `{"error": ...}` on failure.
    pub body: serde_json::Value,
}

impl ApiResponse {
    /// A 200 response with the given body.
    #[must_use]
    pub fn ok(body: serde_json::Value) -> Self {
        Self {
            status_code: 200,
            body,
        }
    }

    /// An error response with an `{"error": ...}` body.
    #[must_use]
    pub fn error(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            body: json!({ "error": message.into() }),
        }
    }

    /// Maps an operation error onto the response contract.
    #[must_use]
    pub fn from_error(err: &OrderflowError) -> Self {
        Self::error(err.status_code(), err.to_string())
    }
}

fn parse_body<T: for<'de> Deserialize<'de>>(body: &str) -> Result<T, ApiResponse> {
    serde_json::from_str(body)
        .map_err(|err| ApiResponse::error(400, format!("Malformed request body: {err}")))
}

fn parse_stage(raw: &str) -> Result<Stage, ApiResponse> {
    raw.parse::<Stage>()
        .map_err(|err| ApiResponse::error(400, err.to_string()))
}

fn json_body<T: Serialize>(value: &T) -> Result<serde_json::Value, ApiResponse> {
    serde_json::to_value(value)
        .map_err(|err| ApiResponse::error(500, format!("Response encoding failed: {err}")))
}

fn required_tenant(tenant_id: Option<&str>) -> Result<&str, ApiResponse> {
    match tenant_id.map(str::trim).filter(|t| !t.is_empty()) {
        Some(tenant) => Ok(tenant),
        None => Err(ApiResponse::error(400, "Missing required field: tenantId")),
    }
}

/// Handles a stage-start request.
pub async fn handle_start_stage(orchestrator: &StageOrchestrator, body: &str) -> ApiResponse {
    let request: StartStageRequest = match parse_body(body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let stage = match parse_stage(&request.stage) {
        Ok(stage) => stage,
        Err(response) => return response,
    };

    match orchestrator
        .start_stage(
            &request.tenant_id,
            &request.order_id,
            stage,
            request.assigned_to.as_deref(),
        )
        .await
    {
        Ok(record) => match json_body(&record) {
            Ok(record_json) => ApiResponse::ok(json!({
                "message": format!("Stage {stage} started"),
                "record": record_json,
            })),
            Err(response) => response,
        },
        Err(err) => ApiResponse::from_error(&err),
    }
}

/// Handles a stage-completion request.
pub async fn handle_complete_stage(orchestrator: &StageOrchestrator, body: &str) -> ApiResponse {
    let request: CompleteStageRequest = match parse_body(body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let stage = match parse_stage(&request.stage) {
        Ok(stage) => stage,
        Err(response) => return response,
    };

    match orchestrator
        .complete_stage(&request.tenant_id, &request.order_id, stage)
        .await
    {
        Ok(duration_secs) => ApiResponse::ok(json!({
            "message": format!("Stage {stage} completed"),
            "durationSecs": duration_secs,
        })),
        Err(err) => ApiResponse::from_error(&err),
    }
}

/// Handles the dashboard summary query.
pub async fn handle_dashboard_summary(
    aggregator: &DashboardAggregator,
    tenant_id: Option<&str>,
) -> ApiResponse {
    let tenant = match required_tenant(tenant_id) {
        Ok(tenant) => tenant,
        Err(response) => return response,
    };

    match aggregator.summary(tenant).await {
        Ok(summary) => match json_body(&summary) {
            Ok(body) => ApiResponse::ok(body),
            Err(response) => response,
        },
        Err(err) => ApiResponse::from_error(&err),
    }
}

/// Handles the dashboard metrics query.
pub async fn handle_dashboard_metrics(
    aggregator: &DashboardAggregator,
    tenant_id: Option<&str>,
    top_limit: Option<usize>,
) -> ApiResponse {
    let tenant = match required_tenant(tenant_id) {
        Ok(tenant) => tenant,
        Err(response) => return response,
    };

    match aggregator
        .metrics(tenant, top_limit.unwrap_or(DEFAULT_TOP_PRODUCTS))
        .await
    {
        Ok(metrics) => match json_body(&metrics) {
            Ok(body) => ApiResponse::ok(body),
            Err(response) => response,
        },
        Err(err) => ApiResponse::from_error(&err),
    }
}

/// Handles the order list query.
pub async fn handle_recent_orders(
    aggregator: &DashboardAggregator,
    tenant_id: Option<&str>,
    limit: Option<usize>,
) -> ApiResponse {
    let tenant = match required_tenant(tenant_id) {
        Ok(tenant) => tenant,
        Err(response) => return response,
    };

    match aggregator
        .recent_orders(tenant, limit.unwrap_or(DEFAULT_ORDER_LIMIT))
        .await
    {
        Ok(orders) => match json_body(&orders) {
            Ok(body) => ApiResponse::ok(json!({
                "orders": body,
                "total": orders.len(),
            })),
            Err(response) => response,
        },
        Err(err) => ApiResponse::from_error(&err),
    }
}
