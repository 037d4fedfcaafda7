//! Explicit fan-out of resource events to registered listeners.

use crate::resource::{domain::ResourceEvent, ports::ResourceEventListener};
use std::sync::Arc;
use tracing::{debug, warn};

/// Ordered set of listeners notified after each persisted transition.
///
/// A failing listener is logged and skipped; the transition it observed
/// stays in place.
#[derive(Clone, Default)]
pub struct ResourceEvents {
    listeners: Vec<Arc<dyn ResourceEventListener>>,
}

impl ResourceEvents {
    /// Creates a hub without listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener`.
    #[must_use]
    pub fn with_listener(mut self, listener: Arc<dyn ResourceEventListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Delivers `event` to every listener in registration order.
    pub async fn publish(&self, event: &ResourceEvent) {
        debug!(
            resource_id = %event.resource_id(),
            event = event.label(),
            listeners = self.listeners.len(),
            "publishing resource event"
        );
        for listener in &self.listeners {
            if let Err(err) = listener.on_event(event).await {
                warn!(
                    resource_id = %event.resource_id(),
                    event = event.label(),
                    error = %err,
                    "resource event listener failed"
                );
            }
        }
    }
}
