//! Git operations for rewriting pushed history.

pub mod cli;
pub mod port;

pub use cli::{GitCli, check_git_installed};
pub use port::{RewriteEnv, VersionControlPort};
