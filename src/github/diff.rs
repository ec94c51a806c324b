//! Commit diff retrieval via octocrab.

use std::time::Duration;

use async_trait::async_trait;
use http::header::{ACCEPT, HeaderMap, HeaderValue};
use http_body_util::BodyExt as _;
use octocrab::Octocrab;
use tracing::debug;

use crate::commit::DiffTask;
use crate::error::GitHubError;
use crate::event::{Identity, RepoCoordinates};
use crate::retry::retry_with_backoff;

/// Media type that makes the commits endpoint answer with a unified diff.
pub const DIFF_MEDIA_TYPE: &str = "application/vnd.github.v3.diff";

/// The unified diff of a single commit.
///
/// `diff` may be empty (merge or binary-only commits).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffResult {
    pub sha: String,
    pub diff: String,
    pub author: Identity,
}

/// Port to the hosting service's diff endpoint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DiffPort: Send + Sync {
    async fn fetch_diff(
        &self,
        repository: &RepoCoordinates,
        task: &DiffTask,
    ) -> Result<DiffResult, GitHubError>;
}

/// Diff fetcher backed by the GitHub REST API.
pub struct GitHubDiffClient {
    octocrab: Octocrab,
    timeout: Duration,
}

impl GitHubDiffClient {
    /// Build an authenticated client against `api_url`.
    pub fn new(token: &str, api_url: &str, timeout: Duration) -> Result<Self, GitHubError> {
        let octocrab = Octocrab::builder()
            .base_uri(api_url)
            .map_err(|e| GitHubError::ClientBuild(Box::new(e)))?
            .personal_token(token.to_string())
            .build()
            .map_err(|e| GitHubError::ClientBuild(Box::new(e)))?;

        Ok(Self::with_client(octocrab, timeout))
    }

    /// Use a pre-configured octocrab client.
    ///
    /// This allows dependency injection for testing with mock servers.
    pub fn with_client(octocrab: Octocrab, timeout: Duration) -> Self {
        Self { octocrab, timeout }
    }

    async fn fetch_once(
        &self,
        repository: &RepoCoordinates,
        sha: &str,
    ) -> Result<String, GitHubError> {
        let route = format!(
            "/repos/{}/{}/commits/{}",
            repository.owner, repository.name, sha
        );
        debug!("GET {} ({})", route, DIFF_MEDIA_TYPE);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(DIFF_MEDIA_TYPE));

        let request = async {
            let response = self.octocrab._get_with_headers(route, Some(headers)).await?;
            let response = octocrab::map_github_error(response).await?;
            response.into_body().collect().await
        };

        match tokio::time::timeout(self.timeout, request).await {
            Err(_) => Err(GitHubError::Timeout {
                sha: sha.to_string(),
                secs: self.timeout.as_secs(),
            }),
            // Diffs of Latin-1 and binary files are not valid UTF-8.
            Ok(Ok(body)) => Ok(String::from_utf8_lossy(&body.to_bytes()).into_owned()),
            Ok(Err(e)) => Err(classify(repository, sha, e)),
        }
    }
}

fn classify(repository: &RepoCoordinates, sha: &str, e: octocrab::Error) -> GitHubError {
    let (status, message) = match &e {
        octocrab::Error::GitHub { source, .. } => {
            (source.status_code.as_u16(), source.message.clone())
        }
        _ => {
            return GitHubError::FetchDiff {
                sha: sha.to_string(),
                source: Box::new(e),
            };
        }
    };

    match status {
        404 => GitHubError::CommitNotFound {
            owner: repository.owner.clone(),
            repo: repository.name.clone(),
            sha: sha.to_string(),
        },
        429 => GitHubError::RateLimited {
            sha: sha.to_string(),
        },
        403 if message.to_lowercase().contains("rate limit") => GitHubError::RateLimited {
            sha: sha.to_string(),
        },
        status => GitHubError::Rejected {
            sha: sha.to_string(),
            status,
            message,
        },
    }
}

#[async_trait]
impl DiffPort for GitHubDiffClient {
    async fn fetch_diff(
        &self,
        repository: &RepoCoordinates,
        task: &DiffTask,
    ) -> Result<DiffResult, GitHubError> {
        let diff = retry_with_backoff(
            || self.fetch_once(repository, &task.sha),
            is_transient,
            |e| GitHubError::RetriesExhausted(Box::new(e)),
        )
        .await?;

        Ok(DiffResult {
            sha: task.sha.clone(),
            diff,
            author: task.author.clone(),
        })
    }
}

/// Timeouts, transport failures and server-side errors may succeed on retry.
fn is_transient(err: &GitHubError) -> bool {
    match err {
        GitHubError::Timeout { .. } | GitHubError::FetchDiff { .. } => true,
        GitHubError::Rejected { status, .. } => *status >= 500,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_and_rate_limit_are_not_retried() {
        assert!(!is_transient(&GitHubError::CommitNotFound {
            owner: "o".to_string(),
            repo: "r".to_string(),
            sha: "s".to_string(),
        }));
        assert!(!is_transient(&GitHubError::RateLimited {
            sha: "s".to_string()
        }));
        assert!(is_transient(&GitHubError::Timeout {
            sha: "s".to_string(),
            secs: 1
        }));
    }

    #[test]
    fn test_only_server_side_rejections_are_retried() {
        let rejected = |status| GitHubError::Rejected {
            sha: "s".to_string(),
            status,
            message: "m".to_string(),
        };
        assert!(!is_transient(&rejected(401)));
        assert!(!is_transient(&rejected(422)));
        assert!(is_transient(&rejected(502)));
    }

    #[tokio::test]
    async fn test_new_rejects_invalid_api_url() {
        let result = GitHubDiffClient::new("t", "not a uri with spaces", Duration::from_secs(1));
        assert!(matches!(result, Err(GitHubError::ClientBuild(_))));
    }
}
