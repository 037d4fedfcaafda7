//! Listener port for resource lifecycle events.

use crate::resource::domain::ResourceEvent;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Receives resource events after the transition has been persisted.
#[async_trait]
pub trait ResourceEventListener: Send + Sync {
    /// Handles one event.
    async fn on_event(&self, event: &ResourceEvent) -> Result<(), ListenerError>;
}

/// Error reported by a listener.
#[derive(Debug, Clone, Error)]
#[error("resource event listener failed: {0}")]
pub struct ListenerError(pub Arc<dyn std::error::Error + Send + Sync>);

impl ListenerError {
    /// Wraps a listener failure.
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Arc::new(err))
    }
}
