//! `VersionControlPort` backed by the system `git` binary.
//!
//! All operations shell out to `git`, inheriting the runner's existing git
//! config and credential store.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::config::PushMode;
use crate::error::GitError;
use crate::event::Identity;
use crate::git::port::{RewriteEnv, VersionControlPort};

/// Check that a `git` executable is on PATH.
pub fn check_git_installed() -> Result<(), GitError> {
    which::which("git").map(|_| ()).map_err(|_| GitError::NotInstalled)
}

/// Runs git commands inside one working tree.
pub struct GitCli {
    workdir: PathBuf,
    timeout: Duration,
}

impl GitCli {
    pub fn new(workdir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            workdir: workdir.into(),
            timeout,
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    async fn output(
        &self,
        args: &[&str],
        operation: &str,
        env: Option<&RewriteEnv>,
    ) -> Result<Output, GitError> {
        debug!("git {}", args.join(" "));

        let mut command = Command::new("git");
        command
            .args(args)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(env) = env {
            command.envs(env.vars());
        }

        timeout(self.timeout, command.output())
            .await
            .map_err(|_| GitError::Timeout {
                operation: operation.to_string(),
                secs: self.timeout.as_secs(),
            })?
            .map_err(|source| GitError::SpawnFailed {
                operation: operation.to_string(),
                source,
            })
    }

    /// Run a git command and return its stdout, or a descriptive error.
    async fn run(
        &self,
        args: &[&str],
        operation: &str,
        env: Option<&RewriteEnv>,
    ) -> Result<String, GitError> {
        let output = self.output(args, operation, env).await?;

        if !output.status.success() {
            return Err(GitError::NonZeroExit {
                operation: operation.to_string(),
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[async_trait]
impl VersionControlPort for GitCli {
    async fn configure_identity(&self, identity: &Identity) -> Result<(), GitError> {
        if let Some(email) = identity.email.as_deref().filter(|e| !e.is_empty()) {
            self.run(&["config", "user.email", email], "config user.email", None)
                .await?;
        }
        self.run(&["config", "user.name", &identity.name], "config user.name", None)
            .await?;
        Ok(())
    }

    async fn status(&self) -> Result<String, GitError> {
        self.run(&["status"], "status", None).await
    }

    async fn log_oneline(&self) -> Result<String, GitError> {
        self.run(&["log", "--oneline"], "log", None).await
    }

    async fn is_ancestor(&self, sha: &str, branch: &str) -> Result<bool, GitError> {
        let branch_ref = format!("refs/heads/{branch}");
        let output = self
            .output(
                &["merge-base", "--is-ancestor", sha, &branch_ref],
                "merge-base",
                None,
            )
            .await?;

        // Exit code 1 means "not an ancestor"; anything else is a real failure.
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            code => Err(GitError::NonZeroExit {
                operation: "merge-base".to_string(),
                code: code.unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
        }
    }

    async fn checkout_detached(&self, sha: &str, env: &RewriteEnv) -> Result<(), GitError> {
        self.run(&["checkout", "--detach", sha], "checkout", Some(env))
            .await?;
        Ok(())
    }

    async fn amend_message(&self, message: &str, env: &RewriteEnv) -> Result<String, GitError> {
        // Message goes through a file so no argument quoting is involved.
        let mut file = NamedTempFile::new().map_err(GitError::MessageFile)?;
        file.write_all(message.as_bytes())
            .and_then(|_| file.flush())
            .map_err(GitError::MessageFile)?;

        let path = file.path().to_string_lossy().to_string();
        self.run(
            &[
                "commit",
                "--amend",
                "--allow-empty",
                "--no-verify",
                "--cleanup=verbatim",
                "--file",
                &path,
            ],
            "commit --amend",
            Some(env),
        )
        .await?;

        self.rev_parse("HEAD").await
    }

    async fn rebase_onto(
        &self,
        new_base: &str,
        upstream: &str,
        branch: &str,
        env: &RewriteEnv,
    ) -> Result<(), GitError> {
        self.run(
            &["rebase", "--onto", new_base, upstream, branch],
            "rebase --onto",
            Some(env),
        )
        .await?;
        Ok(())
    }

    async fn abort_rebase(&self) -> Result<(), GitError> {
        self.run(&["rebase", "--abort"], "rebase --abort", None)
            .await?;
        Ok(())
    }

    async fn push_branch(
        &self,
        remote: &str,
        branch: &str,
        mode: PushMode,
        env: &RewriteEnv,
    ) -> Result<(), GitError> {
        let flag = match mode {
            PushMode::Force => "--force",
            PushMode::ForceWithLease => "--force-with-lease",
        };
        let refspec = format!("refs/heads/{branch}:refs/heads/{branch}");
        self.run(&["push", flag, remote, &refspec], "push", Some(env))
            .await?;
        Ok(())
    }

    async fn rev_parse(&self, rev: &str) -> Result<String, GitError> {
        let out = self
            .run(&["rev-parse", "--verify", rev], "rev-parse", None)
            .await?;
        Ok(out.trim().to_string())
    }
}
