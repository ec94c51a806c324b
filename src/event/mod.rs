//! Trigger context and push event loading.

pub mod context;
pub mod push;

pub use context::TriggerContext;
pub use push::{CommitRecord, Identity, PushEvent, RepoCoordinates, load_push_event};
