//! Commit message generation via the completion service.

use tracing::{debug, error};

use crate::commit::prompt::SYSTEM_PROMPT;
use crate::error::CompletionError;
use crate::event::Identity;
use crate::github::DiffResult;
use crate::llm::{ChatMessage, ChatRequest, CompletionPort, strip_think_blocks};
use crate::retry::retry_with_backoff;

/// A commit together with the message it should be rewritten to.
///
/// `message: None` means the commit is left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewritePlan {
    pub sha: String,
    pub message: Option<String>,
    pub author: Identity,
}

/// Build the two-message conversation for one diff.
pub fn build_request(model: &str, diff: &str) -> ChatRequest {
    ChatRequest::deterministic(
        model,
        vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(diff)],
    )
}

/// Ask the completion service for a commit message describing `diff`.
///
/// Returns `None` on any failure (transport, HTTP status, malformed body,
/// empty content). Failures are logged with the prompt and the raw response
/// and never propagated. An empty diff is still sent.
pub async fn generate_message(
    diff: &str,
    model: &str,
    completion: &dyn CompletionPort,
) -> Option<String> {
    let request = build_request(model, diff);

    let result = retry_with_backoff(
        || completion.complete(&request),
        CompletionError::is_transient,
        |e| CompletionError::RetriesExhausted(Box::new(e)),
    )
    .await;

    match result {
        Ok(content) => {
            let message = strip_think_blocks(&content);
            if message.is_empty() {
                error!(
                    prompt = %diff,
                    response = %content,
                    "Completion contained only hidden reasoning"
                );
                return None;
            }
            debug!("Generated message: {}", message);
            Some(message)
        }
        Err(e) => {
            error!(
                prompt = %diff,
                response = e.raw_body().unwrap_or("<no response>"),
                "Failed to generate commit message: {}",
                e
            );
            None
        }
    }
}

/// Turn a fetched diff into a rewrite plan.
pub async fn plan_rewrite(
    diff: DiffResult,
    model: &str,
    completion: &dyn CompletionPort,
) -> RewritePlan {
    let message = generate_message(&diff.diff, model, completion).await;
    RewritePlan {
        sha: diff.sha,
        message,
        author: diff.author,
    }
}
