//! Event publisher trait and implementations.

use async_trait::async_trait;
use tracing::{debug, info, Level};

use crate::core::{StageEvent, StageEventKind};
use crate::errors::PublishError;

/// Trait for publishing lifecycle events to external subscribers.
///
/// `source` identifies the emitting component (see the constants in the
/// parent module); tenant isolation lives in the event payload, never in
/// the source.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes one event.
    async fn publish(&self, source: &str, event: &StageEvent) -> Result<(), PublishError>;
}

/// A publisher that discards all events.
///
/// Used as the default when no bus is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventPublisher;

#[async_trait]
impl EventPublisher for NoOpEventPublisher {
    async fn publish(&self, _source: &str, _event: &StageEvent) -> Result<(), PublishError> {
        Ok(())
    }
}

/// A publisher that logs events through the tracing framework.
#[derive(Debug, Clone)]
pub struct LoggingEventPublisher {
    /// The log level to use.
    level: Level,
}

impl Default for LoggingEventPublisher {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl LoggingEventPublisher {
    /// Creates a new logging publisher with the specified level.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a debug-level logging publisher.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }

    fn log_event(&self, source: &str, event: &StageEvent) {
        match self.level {
            Level::DEBUG => {
                debug!(
                    source = %source,
                    kind = %event.kind,
                    tenant_id = %event.tenant_id,
                    order_id = %event.order_id,
                    stage = %event.stage,
                    "Event: {}", event.kind
                );
            }
            _ => {
                info!(
                    source = %source,
                    kind = %event.kind,
                    tenant_id = %event.tenant_id,
                    order_id = %event.order_id,
                    stage = %event.stage,
                    "Event: {}", event.kind
                );
            }
        }
    }
}

#[async_trait]
impl EventPublisher for LoggingEventPublisher {
    async fn publish(&self, source: &str, event: &StageEvent) -> Result<(), PublishError> {
        self.log_event(source, event);
        Ok(())
    }
}

/// A collecting publisher for testing purposes.
#[derive(Debug, Default)]
pub struct CollectingEventPublisher {
    events: parking_lot::RwLock<Vec<(String, StageEvent)>>,
}

impl CollectingEventPublisher {
    /// Creates a new collecting publisher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all published events with their sources.
    #[must_use]
    pub fn events(&self) -> Vec<(String, StageEvent)> {
        self.events.read().clone()
    }

    /// Returns the number of published events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if nothing has been published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Clears all collected events.
    pub fn clear(&self) {
        self.events.write().clear();
    }

    /// Returns published events of a given kind.
    #[must_use]
    pub fn of_kind(&self, kind: StageEventKind) -> Vec<StageEvent> {
        self.events
            .read()
            .iter()
            .filter(|(_, event)| event.kind == kind)
            .map(|(_, event)| event.clone())
            .collect()
    }
}

#[async_trait]
impl EventPublisher for CollectingEventPublisher {
    async fn publish(&self, source: &str, event: &StageEvent) -> Result<(), PublishError> {
        self.events
            .write()
            .push((source.to_string(), event.clone()));
        Ok(())
    }
}
