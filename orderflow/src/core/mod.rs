//! Core domain model types for orderflow.
//!
//! This module contains the fundamental types used throughout the crate:
//! - Stage and workflow status enums
//! - Order rows and patch updates
//! - Stage records (the append-only transition history)
//! - Lifecycle events

mod event;
mod order;
mod record;
mod stage;

pub use event::{StageEvent, StageEventKind};
pub use order::{Order, OrderItem, OrderPatch};
pub use record::{RecordKey, RecordStatus, StageRecord, DEFAULT_ASSIGNEE};
pub use stage::{Stage, WorkflowStatus};
