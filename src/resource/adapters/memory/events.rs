//! Event listener that keeps every delivered event.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::resource::{
    domain::ResourceEvent,
    ports::{ListenerError, ResourceEventListener},
};

/// Thread-safe listener recording events in delivery order.
#[derive(Debug, Clone, Default)]
pub struct RecordingEventListener {
    events: Arc<RwLock<Vec<ResourceEvent>>>,
}

impl RecordingEventListener {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the recorded events.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError`] when the event log lock is poisoned.
    pub fn events(&self) -> Result<Vec<ResourceEvent>, ListenerError> {
        let events = self
            .events
            .read()
            .map_err(|err| ListenerError::new(std::io::Error::other(err.to_string())))?;
        Ok(events.clone())
    }
}

#[async_trait]
impl ResourceEventListener for RecordingEventListener {
    async fn on_event(&self, event: &ResourceEvent) -> Result<(), ListenerError> {
        let mut events = self
            .events
            .write()
            .map_err(|err| ListenerError::new(std::io::Error::other(err.to_string())))?;
        events.push(event.clone());
        Ok(())
    }
}
