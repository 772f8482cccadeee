//! Lifecycle event publication.
//!
//! Publishers are injected into the orchestrator and runner explicitly;
//! there is no process-global publisher. Publication is best-effort: a
//! failed publish is logged by the caller and never fails the operation
//! that triggered it.

mod publisher;

pub use publisher::{
    CollectingEventPublisher, EventPublisher, LoggingEventPublisher, NoOpEventPublisher,
};

/// Event source identifying stage transitions.
pub const STAGE_EVENT_SOURCE: &str = "orderflow.stages";

/// Event source identifying workflow lifecycle changes.
pub const WORKFLOW_EVENT_SOURCE: &str = "orderflow.workflow";
