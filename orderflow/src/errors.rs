//! Error types for orderflow operations.
//!
//! Every operation boundary returns an explicit `Result`; the only errors
//! that are swallowed are event-publish failures, which are logged by the
//! caller and never propagated.

use thiserror::Error;

use crate::core::Stage;

/// The main error type for orderflow operations.
#[derive(Debug, Error)]
pub enum OrderflowError {
    /// A required input was missing or malformed.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// No stage record matched the request.
    #[error("{0}")]
    NotFound(#[from] StageNotFoundError),

    /// A stage was started while a start for the same stage was still open.
    #[error("{0}")]
    DuplicateStage(#[from] DuplicateStageError),

    /// The stage store failed; the caller should retry.
    #[error("{0}")]
    Store(#[from] StoreError),

    /// A generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl OrderflowError {
    /// Maps the error onto the HTTP-style status code of the response
    /// contract.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::DuplicateStage(_) => 409,
            Self::Store(_) | Self::Internal(_) => 500,
        }
    }
}

/// Error raised when a request is missing a required field or carries an
/// unusable value.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    /// A required field was absent or blank.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A field carried a value outside its domain.
    #[error("Invalid value for {field}: '{value}'")]
    InvalidValue {
        /// The offending field.
        field: &'static str,
        /// The rejected value.
        value: String,
    },
}

/// Error raised when no stage record exists for the requested stage.
#[derive(Debug, Clone, Error)]
#[error("No stage record found for order '{order_id}' (tenant '{tenant_id}') at stage {stage}")]
pub struct StageNotFoundError {
    /// The tenant scope of the lookup.
    pub tenant_id: String,
    /// The order that was queried.
    pub order_id: String,
    /// The stage with no matching record.
    pub stage: Stage,
}

/// Error raised when a stage already has an open (IN_PROGRESS) record.
#[derive(Debug, Clone, Error)]
#[error("Stage {stage} is already in progress for order '{order_id}' (tenant '{tenant_id}')")]
pub struct DuplicateStageError {
    /// The tenant scope of the request.
    pub tenant_id: String,
    /// The order being transitioned.
    pub order_id: String,
    /// The stage that was already open.
    pub stage: Stage,
}

/// Transient failure from the stage store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The store could not be reached or refused the write.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A stored value could not be encoded or decoded.
    #[error("Store serialization error: {0}")]
    Serialization(String),
}

/// Failure to publish a lifecycle event.
///
/// Publish failures are logged at the call site and never propagated; a
/// transition is durable once the store write succeeds.
#[derive(Debug, Clone, Error)]
#[error("Event publish failed: {reason}")]
pub struct PublishError {
    /// Description of the failure.
    pub reason: String,
}

impl PublishError {
    /// Creates a new publish error.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
