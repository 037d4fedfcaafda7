//! Failed generation attempt records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One failed generation attempt, appended to the owning resource's log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationAttempt {
    attempt_number: u32,
    error_message: String,
    occurred_at: DateTime<Utc>,
}

impl GenerationAttempt {
    /// Creates an attempt record.
    #[must_use]
    pub fn new(
        attempt_number: u32,
        error_message: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            attempt_number,
            error_message: error_message.into(),
            occurred_at,
        }
    }

    /// Returns the 1-based attempt number.
    #[must_use]
    pub const fn attempt_number(&self) -> u32 {
        self.attempt_number
    }

    /// Returns the failure description.
    #[must_use]
    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    /// Returns when the attempt failed.
    #[must_use]
    pub const fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}
