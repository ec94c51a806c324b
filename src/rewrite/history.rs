//! Sequential rewrite of commit messages on the pushed branch.

use tracing::{info, warn};

use crate::commit::RewritePlan;
use crate::config::PushMode;
use crate::git::{RewriteEnv, VersionControlPort};
use crate::rewrite::report::{RewriteOutcome, RunReport};

/// Where the rewritten branch is published.
#[derive(Debug, Clone, Copy)]
pub struct RewriteTarget<'a> {
    pub branch: &'a str,
    pub remote: &'a str,
    pub push_mode: PushMode,
}

/// Apply every plan to `target.branch` and push after each rewrite.
///
/// Plans arrive in push order (oldest first) and are applied newest first:
/// rewriting a commit only replaces it and its descendants, so the original
/// shas of the older commits still resolve. A failing plan is recorded and
/// the loop moves on. The returned report lists outcomes in push order.
pub async fn rewrite_history(
    plans: &[RewritePlan],
    vcs: &dyn VersionControlPort,
    target: RewriteTarget<'_>,
) -> RunReport {
    let mut entries = Vec::with_capacity(plans.len());

    for plan in plans.iter().rev() {
        let outcome = rewrite_one(plan, vcs, target).await;
        match &outcome {
            RewriteOutcome::Rewritten { new_tip } => {
                info!("Rewrote {} ({} is now at {})", plan.sha, target.branch, new_tip)
            }
            RewriteOutcome::Skipped { reason } => warn!("Skipping {}: {}", plan.sha, reason),
            RewriteOutcome::Failed { error } => warn!("Failed to rewrite {}: {}", plan.sha, error),
        }
        entries.push((plan.sha.clone(), outcome));
    }

    let mut report = RunReport::default();
    for (sha, outcome) in entries.into_iter().rev() {
        report.record(sha, outcome);
    }
    report
}

async fn rewrite_one(
    plan: &RewritePlan,
    vcs: &dyn VersionControlPort,
    target: RewriteTarget<'_>,
) -> RewriteOutcome {
    let Some(message) = plan.message.as_deref() else {
        return RewriteOutcome::Skipped {
            reason: "no message generated".to_string(),
        };
    };

    match vcs.is_ancestor(&plan.sha, target.branch).await {
        Ok(true) => {}
        Ok(false) => {
            return RewriteOutcome::Skipped {
                reason: format!("not reachable from {}", target.branch),
            };
        }
        Err(e) => return failed(e),
    }

    let env = RewriteEnv::for_author(&plan.author);

    if let Err(e) = vcs.checkout_detached(&plan.sha, &env).await {
        return failed(e);
    }

    let amended = match vcs.amend_message(message, &env).await {
        Ok(sha) => sha,
        Err(e) => return failed(e),
    };

    if let Err(e) = vcs
        .rebase_onto(&amended, &plan.sha, target.branch, &env)
        .await
    {
        // Leave the repository usable for the next plan.
        if let Err(abort) = vcs.abort_rebase().await {
            warn!("Failed to abort rebase: {}", abort);
        }
        return failed(e);
    }

    let new_tip = match vcs.rev_parse(&format!("refs/heads/{}", target.branch)).await {
        Ok(sha) => sha,
        Err(e) => return failed(e),
    };

    if let Err(e) = vcs
        .push_branch(target.remote, target.branch, target.push_mode, &env)
        .await
    {
        return failed(e);
    }

    RewriteOutcome::Rewritten { new_tip }
}

fn failed(e: impl std::fmt::Display) -> RewriteOutcome {
    RewriteOutcome::Failed {
        error: e.to_string(),
    }
}
