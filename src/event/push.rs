//! Push event extraction and validation.

use serde::{Deserialize, Serialize};

use crate::error::EventError;
use crate::event::context::TriggerContext;

/// A person as reported by the push payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl Identity {
    /// Email to attribute git actions to, falling back to the GitHub noreply
    /// address when the payload carried none.
    pub fn email_or_noreply(&self) -> String {
        match self.email.as_deref() {
            Some(email) if !email.is_empty() => email.to_string(),
            _ => format!("{}@users.noreply.github.com", self.name),
        }
    }
}

/// Repository owner and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoCoordinates {
    pub owner: String,
    pub name: String,
}

impl RepoCoordinates {
    /// Parse `owner/name`.
    pub fn parse(full_name: &str) -> Result<Self, EventError> {
        match full_name.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(EventError::InvalidRepository(full_name.to_string())),
        }
    }
}

/// One commit of the push, read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub sha: String,
    /// First line of `message`.
    pub header: String,
    pub message: String,
    pub author: Identity,
}

impl CommitRecord {
    pub fn new(sha: impl Into<String>, message: impl Into<String>, author: Identity) -> Self {
        let message = message.into();
        let header = message.lines().next().unwrap_or("").to_string();
        Self {
            sha: sha.into(),
            header,
            message,
            author,
        }
    }
}

/// The validated push that triggered this run.
#[derive(Debug, Clone)]
pub struct PushEvent {
    pub repository: RepoCoordinates,
    pub git_ref: String,
    /// Target branch, `git_ref` without `refs/heads/`.
    pub branch: String,
    pub pusher: Identity,
    /// In the order the payload reports them (oldest first).
    pub commits: Vec<CommitRecord>,
}

#[derive(Deserialize)]
struct PushPayload {
    #[serde(rename = "ref")]
    git_ref: Option<String>,
    pusher: Identity,
    #[serde(default)]
    commits: Vec<PayloadCommit>,
    repository: Option<PayloadRepository>,
}

#[derive(Deserialize)]
struct PayloadCommit {
    id: String,
    message: String,
    author: Identity,
}

#[derive(Deserialize)]
struct PayloadRepository {
    name: String,
    owner: PayloadOwner,
}

#[derive(Deserialize)]
struct PayloadOwner {
    login: Option<String>,
    name: Option<String>,
}

/// Validate the trigger and extract the push event.
///
/// Checks run before anything touches the network: the event must be a
/// push, must carry at least one commit, and must target a branch.
pub fn load_push_event(ctx: &TriggerContext) -> Result<PushEvent, EventError> {
    if ctx.event_name != "push" {
        return Err(EventError::UnsupportedEventKind(ctx.event_name.clone()));
    }

    let payload: PushPayload =
        serde_json::from_value(ctx.payload.clone()).map_err(EventError::ParseFailed)?;

    if payload.commits.is_empty() {
        return Err(EventError::EmptyPush);
    }

    let repository = match ctx.repository.as_deref() {
        Some(full_name) => RepoCoordinates::parse(full_name)?,
        None => {
            let repo = payload
                .repository
                .as_ref()
                .ok_or(EventError::MissingContext("GITHUB_REPOSITORY"))?;
            let owner = repo
                .owner
                .login
                .clone()
                .or_else(|| repo.owner.name.clone())
                .ok_or(EventError::MissingContext("GITHUB_REPOSITORY"))?;
            RepoCoordinates {
                owner,
                name: repo.name.clone(),
            }
        }
    };

    let git_ref = ctx
        .git_ref
        .clone()
        .or(payload.git_ref)
        .ok_or(EventError::MissingContext("GITHUB_REF"))?;

    let branch = git_ref
        .strip_prefix("refs/heads/")
        .filter(|b| !b.is_empty())
        .ok_or_else(|| EventError::NotABranch(git_ref.clone()))?
        .to_string();

    let commits = payload
        .commits
        .into_iter()
        .map(|c| CommitRecord::new(c.id, c.message, c.author))
        .collect();

    Ok(PushEvent {
        repository,
        git_ref,
        branch,
        pusher: payload.pusher,
        commits,
    })
}
