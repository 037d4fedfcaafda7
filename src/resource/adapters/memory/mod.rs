//! In-memory adapters for resource persistence and event capture.

mod events;
mod resource;

pub use events::RecordingEventListener;
pub use resource::InMemoryResourceRepository;
