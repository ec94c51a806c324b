//! Integration tests for history rewriting against a real git binary.

mod common;

use std::time::Duration;

use common::{BRANCH, TestRepo, test_author};
use recommit::commit::RewritePlan;
use recommit::config::PushMode;
use recommit::git::{GitCli, VersionControlPort};
use recommit::rewrite::{RewriteOutcome, RewriteTarget, rewrite_history};

const TARGET: RewriteTarget<'static> = RewriteTarget {
    branch: BRANCH,
    remote: "origin",
    push_mode: PushMode::Force,
};

fn plan(oid: git2::Oid, message: Option<&str>) -> RewritePlan {
    RewritePlan {
        sha: oid.to_string(),
        message: message.map(str::to_string),
        author: test_author(),
    }
}

fn trimmed(messages: Vec<String>) -> Vec<String> {
    messages.into_iter().map(|m| m.trim_end().to_string()).collect()
}

#[tokio::test]
async fn test_rewrites_messages_and_keeps_trees() {
    let repo = TestRepo::new();
    repo.commit("initial");
    let wip = repo.commit("wip");
    let more = repo.commit("more stuff");
    repo.commit("feat(x): ok");
    let remote = repo.with_bare_remote();

    let trees_before = repo.trees();
    let tip_before = repo.tip();

    let git = GitCli::new(repo.path(), Duration::from_secs(60));
    let plans = vec![
        plan(wip, Some("fix(core): handle empty input\n\n- guard against empty lists")),
        plan(more, Some("docs: describe setup\n\n- add install steps")),
    ];

    let report = rewrite_history(&plans, &git, TARGET).await;

    assert_eq!(report.rewritten(), 2, "report: {:?}", report);
    assert_eq!(
        trimmed(repo.messages()),
        vec![
            "feat(x): ok",
            "docs: describe setup\n\n- add install steps",
            "fix(core): handle empty input\n\n- guard against empty lists",
            "initial",
        ]
    );
    assert_eq!(repo.trees(), trees_before);
    assert_ne!(repo.tip(), tip_before);
    assert_eq!(remote.tip(), repo.tip());
}

#[tokio::test]
async fn test_report_tip_matches_branch() {
    let repo = TestRepo::new();
    repo.commit("initial");
    let only = repo.commit("stuff");
    let _remote = repo.with_bare_remote();

    let git = GitCli::new(repo.path(), Duration::from_secs(60));
    let report = rewrite_history(&[plan(only, Some("chore: tidy up"))], &git, TARGET).await;

    assert_eq!(
        report.outcome(&only.to_string()),
        Some(&RewriteOutcome::Rewritten {
            new_tip: repo.tip().to_string()
        })
    );
    assert_eq!(trimmed(repo.messages())[0], "chore: tidy up");
}

#[tokio::test]
async fn test_plan_without_message_leaves_history_alone() {
    let repo = TestRepo::new();
    repo.commit("initial");
    let wip = repo.commit("wip");
    let _remote = repo.with_bare_remote();
    let tip_before = repo.tip();

    let git = GitCli::new(repo.path(), Duration::from_secs(60));
    let report = rewrite_history(&[plan(wip, None)], &git, TARGET).await;

    assert_eq!(report.skipped(), 1);
    assert_eq!(repo.tip(), tip_before);
}

#[tokio::test]
async fn test_commit_off_the_branch_is_skipped() {
    let repo = TestRepo::new();
    let base = repo.commit("initial");
    repo.commit("wip");
    let _remote = repo.with_bare_remote();

    // A commit nothing on main points to.
    let base_commit = repo.repo.find_commit(base).unwrap();
    let sig = git2::Signature::now("Test User", "test@example.com").unwrap();
    let dangling = repo
        .repo
        .commit(None, &sig, &sig, "side", &base_commit.tree().unwrap(), &[&base_commit])
        .unwrap();

    let git = GitCli::new(repo.path(), Duration::from_secs(60));
    assert!(!git.is_ancestor(&dangling.to_string(), BRANCH).await.unwrap());

    let report = rewrite_history(&[plan(dangling, Some("feat: side"))], &git, TARGET).await;
    assert!(matches!(
        report.outcome(&dangling.to_string()),
        Some(RewriteOutcome::Skipped { .. })
    ));
}

#[tokio::test]
async fn test_push_to_missing_remote_fails_but_keeps_local_rewrite() {
    let repo = TestRepo::new();
    repo.commit("initial");
    let wip = repo.commit("wip");

    let git = GitCli::new(repo.path(), Duration::from_secs(60));
    let report = rewrite_history(&[plan(wip, Some("fix: real message"))], &git, TARGET).await;

    assert_eq!(report.failed(), 1);
    assert!(matches!(
        report.outcome(&wip.to_string()),
        Some(RewriteOutcome::Failed { error }) if error.contains("push")
    ));
    assert_eq!(trimmed(repo.messages())[0], "fix: real message");
}

#[tokio::test]
async fn test_amend_keeps_author_and_sets_committer() {
    let repo = TestRepo::new();
    repo.commit("initial");
    let wip = repo.commit("wip");
    let _remote = repo.with_bare_remote();

    let git = GitCli::new(repo.path(), Duration::from_secs(60));
    let mut rewritten = plan(wip, Some("feat: attribute properly"));
    rewritten.author = recommit::event::Identity {
        name: "octocat".to_string(),
        email: None,
    };
    let report = rewrite_history(&[rewritten], &git, TARGET).await;
    tokio_test::assert_ok!(git.rev_parse(BRANCH).await);
    assert_eq!(report.rewritten(), 1);

    let tip = repo.repo.find_commit(repo.tip()).unwrap();
    assert_eq!(tip.committer().name(), Some("octocat"));
    assert_eq!(
        tip.committer().email(),
        Some("octocat@users.noreply.github.com")
    );
    assert_eq!(tip.author().name(), Some("Test User"));
}
