//! Version-control port used by the history rewriter.

use async_trait::async_trait;

use crate::config::PushMode;
use crate::error::GitError;
use crate::event::Identity;

/// Environment overlay applied to every command of a rewrite.
///
/// Editors are replaced by `true` so nothing ever waits on a terminal, and
/// the committer is set to the original author so attribution survives.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RewriteEnv {
    vars: Vec<(String, String)>,
}

impl RewriteEnv {
    pub fn for_author(author: &Identity) -> Self {
        Self {
            vars: vec![
                ("GIT_EDITOR".to_string(), "true".to_string()),
                ("GIT_SEQUENCE_EDITOR".to_string(), "true".to_string()),
                ("GIT_COMMITTER_NAME".to_string(), author.name.clone()),
                ("GIT_COMMITTER_EMAIL".to_string(), author.email_or_noreply()),
            ],
        }
    }

    pub fn vars(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

/// Operations the rewriter needs from version control.
///
/// Each call either succeeds or reports a typed failure; nothing here
/// retries or repairs state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VersionControlPort: Send + Sync {
    /// Set `user.name` and, when present, `user.email`.
    async fn configure_identity(&self, identity: &Identity) -> Result<(), GitError>;

    /// `git status` output, for the run log.
    async fn status(&self) -> Result<String, GitError>;

    /// `git log --oneline` output, for the run log.
    async fn log_oneline(&self) -> Result<String, GitError>;

    /// Whether `sha` is reachable from the local `branch`.
    async fn is_ancestor(&self, sha: &str, branch: &str) -> Result<bool, GitError>;

    /// Check out `sha` with a detached HEAD.
    async fn checkout_detached(&self, sha: &str, env: &RewriteEnv) -> Result<(), GitError>;

    /// Replace the message of HEAD, keeping its tree. Returns the new sha.
    async fn amend_message(&self, message: &str, env: &RewriteEnv) -> Result<String, GitError>;

    /// Replay `upstream..branch` onto `new_base`, leaving `branch` checked out.
    async fn rebase_onto(
        &self,
        new_base: &str,
        upstream: &str,
        branch: &str,
        env: &RewriteEnv,
    ) -> Result<(), GitError>;

    /// Abandon an in-progress rebase.
    async fn abort_rebase(&self) -> Result<(), GitError>;

    /// Overwrite `remote/branch` with the local branch.
    async fn push_branch(
        &self,
        remote: &str,
        branch: &str,
        mode: PushMode,
        env: &RewriteEnv,
    ) -> Result<(), GitError>;

    /// Resolve a revision to a full sha.
    async fn rev_parse(&self, rev: &str) -> Result<String, GitError>;
}
