//! recommit - rewrites non-conventional commit messages on a pushed branch.
//!
//! # Overview
//!
//! recommit runs on a push event. It picks out commits whose header is not a
//! conventional commit header, fetches each commit's diff from GitHub, asks an
//! OpenAI-compatible completion service for a replacement message, and
//! rewrites the pushed branch with the new messages before force-pushing it.

pub mod commit;
pub mod config;
pub mod error;
pub mod event;
pub mod git;
pub mod github;
pub mod llm;
pub mod pipeline;
pub mod retry;
pub mod rewrite;

// Re-export commonly used types
pub use commit::{DiffTask, RewritePlan};
pub use config::{Config, PushMode};
pub use error::{CompletionError, ConfigError, EventError, GitError, GitHubError, PipelineError};
pub use event::{CommitRecord, Identity, PushEvent, TriggerContext};
pub use pipeline::{Ports, run};
pub use rewrite::{RewriteOutcome, RunReport};
