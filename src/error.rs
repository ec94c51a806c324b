//! Error types for recommit modules using thiserror.

use thiserror::Error;

/// Errors from reading the run configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Required input '{0}' is not set (expected INPUT_{0} or {0} in the environment)")]
    MissingInput(&'static str),

    #[error("Input '{name}' has an invalid value '{value}': {reason}")]
    InvalidInput {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Errors from loading the trigger event.
#[derive(Error, Debug)]
pub enum EventError {
    #[error("This action only works with push events (got '{0}')")]
    UnsupportedEventKind(String),

    #[error("No commits found in push event")]
    EmptyPush,

    #[error("Missing trigger context variable {0}")]
    MissingContext(&'static str),

    #[error("Failed to read event payload {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse push payload: {0}")]
    ParseFailed(#[source] serde_json::Error),

    #[error("Invalid repository '{0}', expected owner/name")]
    InvalidRepository(String),

    #[error("Ref '{0}' is not a branch; only branch pushes can be rewritten")]
    NotABranch(String),
}

/// Errors from GitHub API operations.
#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("Failed to build GitHub client: {0}")]
    ClientBuild(#[source] Box<octocrab::Error>),

    #[error("Failed to fetch diff for {sha}: {source}")]
    FetchDiff {
        sha: String,
        #[source]
        source: Box<octocrab::Error>,
    },

    #[error("Commit {sha} not found in {owner}/{repo}")]
    CommitNotFound {
        owner: String,
        repo: String,
        sha: String,
    },

    #[error("Rate limited by GitHub API while fetching {sha}")]
    RateLimited { sha: String },

    #[error("GitHub API returned HTTP {status} for {sha}: {message}")]
    Rejected {
        sha: String,
        status: u16,
        message: String,
    },

    #[error("Diff request for {sha} timed out after {secs} seconds")]
    Timeout { sha: String, secs: u64 },

    #[error("All retry attempts failed: {0}")]
    RetriesExhausted(#[source] Box<GitHubError>),
}

/// Errors from the chat-completion service.
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Invalid completion endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("Completion request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Completion request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Completion service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Completion service returned invalid JSON: {reason}")]
    InvalidJson { reason: String, body: String },

    #[error("Completion response has no content")]
    EmptyContent { body: String },

    #[error("All retry attempts failed: {0}")]
    RetriesExhausted(#[source] Box<CompletionError>),
}

impl CompletionError {
    /// Raw response body attached to the error, if the service answered at all.
    pub fn raw_body(&self) -> Option<&str> {
        match self {
            CompletionError::Status { body, .. }
            | CompletionError::InvalidJson { body, .. }
            | CompletionError::EmptyContent { body } => Some(body),
            CompletionError::RetriesExhausted(inner) => inner.raw_body(),
            _ => None,
        }
    }

    /// Whether another attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            CompletionError::Transport(_) | CompletionError::Timeout(_) => true,
            CompletionError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Errors from running the git executable.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("git executable not found in PATH")]
    NotInstalled,

    #[error("Failed to spawn git {operation}: {source}")]
    SpawnFailed {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git {operation} exited with code {code}: {stderr}")]
    NonZeroExit {
        operation: String,
        code: i32,
        stderr: String,
    },

    #[error("git {operation} timed out after {secs} seconds")]
    Timeout { operation: String, secs: u64 },

    #[error("Failed to write commit message file: {0}")]
    MessageFile(#[source] std::io::Error),
}

/// Fatal errors that abort a whole run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Event(#[from] EventError),

    #[error("Failed to configure git identity: {0}")]
    Identity(#[source] GitError),
}
