//! Thin request/response glue around the core operations.
//!
//! The transport itself (HTTP server, event-bus subscription) lives
//! outside this crate; these handlers fix the JSON contract: camelCase
//! bodies in, an HTTP-style status envelope out, and `{"error": ...}`
//! payloads on failure.

mod http;
mod inbound;

pub use http::{
    handle_complete_stage, handle_dashboard_metrics, handle_dashboard_summary,
    handle_recent_orders, handle_start_stage, ApiResponse, CompleteStageRequest,
    StartStageRequest, DEFAULT_ORDER_LIMIT, DEFAULT_TOP_PRODUCTS,
};
pub use inbound::{handle_order_created, log_stage_event, OrderCreated};
