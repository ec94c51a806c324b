//! End-to-end run: validate the push, describe the offending commits and
//! rewrite them on the pushed branch.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::commit::{DiffTask, RewritePlan, plan_rewrite, select_nonconforming};
use crate::config::Config;
use crate::error::PipelineError;
use crate::event::{RepoCoordinates, TriggerContext, load_push_event};
use crate::git::VersionControlPort;
use crate::github::DiffPort;
use crate::llm::CompletionPort;
use crate::rewrite::{RewriteOutcome, RewriteTarget, RunReport, rewrite_history};

/// The external services a run talks to.
#[derive(Clone)]
pub struct Ports {
    pub vcs: Arc<dyn VersionControlPort>,
    pub diffs: Arc<dyn DiffPort>,
    pub completion: Arc<dyn CompletionPort>,
}

/// Run the whole pipeline for one trigger.
///
/// Only trigger validation and identity setup are fatal. Everything that
/// goes wrong for an individual commit ends up in the returned report.
pub async fn run(
    config: &Config,
    ctx: &TriggerContext,
    ports: &Ports,
) -> Result<RunReport, PipelineError> {
    // ── Stage 1: Validate trigger ──
    let event = load_push_event(ctx)?;
    info!(
        "Push of {} commit(s) to {}/{} on {}",
        event.commits.len(),
        event.repository.owner,
        event.repository.name,
        event.branch
    );

    // ── Stage 2: Prepare working tree ──
    ports
        .vcs
        .configure_identity(&event.pusher)
        .await
        .map_err(PipelineError::Identity)?;

    match ports.vcs.status().await {
        Ok(status) => info!("git status:\n{}", status.trim_end()),
        Err(e) => warn!("Could not read git status: {}", e),
    }
    match ports.vcs.log_oneline().await {
        Ok(log) => info!("git log:\n{}", log.trim_end()),
        Err(e) => warn!("Could not read git log: {}", e),
    }

    // ── Stage 3: Select commits ──
    let tasks = select_nonconforming(&event.commits);
    if tasks.is_empty() {
        info!("All commit headers already follow the conventional format");
        return Ok(RunReport::default());
    }
    info!("{} commit(s) need a new message", tasks.len());

    // ── Stage 4: Fetch diffs and generate messages ──
    let (plans, mut report) = describe_commits(config, &event.repository, tasks, ports).await;

    if config.dry_run {
        for plan in &plans {
            match &plan.message {
                Some(message) => info!("[dry-run] {} would become:\n{}", plan.sha, message),
                None => info!("[dry-run] {} has no generated message", plan.sha),
            }
            report.record(
                plan.sha.clone(),
                RewriteOutcome::Skipped {
                    reason: "dry run".to_string(),
                },
            );
        }
        report.log_summary();
        return Ok(report);
    }

    // ── Stage 5: Rewrite history ──
    let target = RewriteTarget {
        branch: &event.branch,
        remote: &config.remote,
        push_mode: config.push_mode,
    };
    report.merge(rewrite_history(&plans, ports.vcs.as_ref(), target).await);

    report.log_summary();
    Ok(report)
}

/// Fetch each diff and ask for a message, at most `max_concurrency` at a time.
///
/// Plans come back in push order. A commit whose diff could not be fetched
/// gets no plan and is recorded as skipped instead.
async fn describe_commits(
    config: &Config,
    repository: &RepoCoordinates,
    tasks: Vec<DiffTask>,
    ports: &Ports,
) -> (Vec<RewritePlan>, RunReport) {
    let semaphore = Arc::new(Semaphore::new(config.max_concurrency.max(1)));
    let shas: Vec<String> = tasks.iter().map(|t| t.sha.clone()).collect();
    let mut join_set = JoinSet::new();

    for (idx, task) in tasks.into_iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let diffs = Arc::clone(&ports.diffs);
        let completion = Arc::clone(&ports.completion);
        let repository = repository.clone();
        let model = config.openai_api_model.clone();

        join_set.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();

            let outcome = match diffs.fetch_diff(&repository, &task).await {
                Ok(diff) => {
                    debug!("Fetched diff for {} ({} bytes)", task.sha, diff.diff.len());
                    Ok(plan_rewrite(diff, &model, completion.as_ref()).await)
                }
                Err(e) => Err(e.to_string()),
            };
            (idx, outcome)
        });
    }

    let mut slots: Vec<Option<Result<RewritePlan, String>>> = vec![None; shas.len()];
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((idx, outcome)) => slots[idx] = Some(outcome),
            Err(e) => error!("Commit task join error: {}", e),
        }
    }

    let mut plans = Vec::with_capacity(slots.len());
    let mut report = RunReport::default();
    for (sha, slot) in shas.into_iter().zip(slots) {
        match slot {
            Some(Ok(plan)) => plans.push(plan),
            Some(Err(reason)) => {
                warn!("Could not fetch diff for {}: {}", sha, reason);
                report.record(
                    sha,
                    RewriteOutcome::Skipped {
                        reason: format!("diff unavailable: {reason}"),
                    },
                );
            }
            None => report.record(
                sha,
                RewriteOutcome::Skipped {
                    reason: "task did not complete".to_string(),
                },
            ),
        }
    }

    (plans, report)
}
