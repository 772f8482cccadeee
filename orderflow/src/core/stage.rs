//! Stage and workflow status enums.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ValidationError;

/// One phase of order fulfillment.
///
/// The sequence is strictly linear: COOKING → PACKAGING → DELIVERY →
/// COMPLETED. `Completed` is a terminal marker, not a startable work
/// stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    /// The kitchen is preparing the order.
    Cooking,
    /// The order is being packed for handoff.
    Packaging,
    /// The order is out for delivery.
    Delivery,
    /// Terminal marker: every stage has finished.
    Completed,
}

impl Stage {
    /// The stage every workflow starts in.
    #[must_use]
    pub const fn initial() -> Self {
        Self::Cooking
    }

    /// The work stages in execution order, excluding the terminal marker.
    #[must_use]
    pub const fn sequence() -> [Self; 3] {
        [Self::Cooking, Self::Packaging, Self::Delivery]
    }

    /// Returns the next stage in the sequence.
    ///
    /// Total: `Completed` maps to itself and is never advanced past.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Cooking => Self::Packaging,
            Self::Packaging => Self::Delivery,
            Self::Delivery | Self::Completed => Self::Completed,
        }
    }

    /// Returns true if this is the terminal marker.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cooking => write!(f, "COOKING"),
            Self::Packaging => write!(f, "PACKAGING"),
            Self::Delivery => write!(f, "DELIVERY"),
            Self::Completed => write!(f, "COMPLETED"),
        }
    }
}

impl FromStr for Stage {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COOKING" => Ok(Self::Cooking),
            "PACKAGING" => Ok(Self::Packaging),
            "DELIVERY" => Ok(Self::Delivery),
            "COMPLETED" => Ok(Self::Completed),
            other => Err(ValidationError::InvalidValue {
                field: "stage",
                value: other.to_string(),
            }),
        }
    }
}

/// Where an order sits in its workflow lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStatus {
    /// The order exists but no workflow has been started for it.
    NotStarted,
    /// A workflow instance is driving the order through its stages.
    WorkflowStarted,
    /// Every stage finished.
    Completed,
    /// The workflow gave up on the order.
    Failed,
}

impl Default for WorkflowStatus {
    fn default() -> Self {
        Self::NotStarted
    }
}

impl WorkflowStatus {
    /// Returns true while the order still counts as active.
    #[must_use]
    pub const fn is_open(self) -> bool {
        !matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "NOT_STARTED"),
            Self::WorkflowStarted => write!(f, "WORKFLOW_STARTED"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}
