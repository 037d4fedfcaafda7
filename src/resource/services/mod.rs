//! Application services for resource generation and review.

mod approval;
mod cache;
mod events;
mod executor;
mod submission;

pub use approval::{ApprovalError, ApprovalGate, ApprovalResult};
pub use cache::ApprovedResourceCache;
pub use events::ResourceEvents;
pub use executor::{
    ExecutionError, ExecutionOutcome, ExecutionResult, GenerationExecutor, TerminalDisposition,
};
pub use submission::{
    ResourceSubmissionService, SubmissionError, SubmissionResult, SubmitResourceRequest,
};
