//! GitHub API operations using octocrab.

pub mod diff;

pub use diff::{DIFF_MEDIA_TYPE, DiffPort, DiffResult, GitHubDiffClient};
