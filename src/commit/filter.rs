//! Selection of commits whose header is not a conventional commit header.

use std::sync::LazyLock;

use regex_lite::Regex;

use crate::event::{CommitRecord, Identity};

/// Pattern: type(scope): description, scope optional, description required.
const HEADER_PATTERN: &str = r"^\w+(\(\w+\))?:\s+.+$";

static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(HEADER_PATTERN).expect("header pattern is valid"));

/// A commit awaiting diff retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffTask {
    pub sha: String,
    pub author: Identity,
}

/// Whether a header line already has the `type(scope): description` shape.
///
/// Only the text before the first line break is considered.
pub fn is_conventional_header(header: &str) -> bool {
    let first_line = header.lines().next().unwrap_or("");
    HEADER_RE.is_match(first_line)
}

/// Keep only the commits that need a new message, in push order.
pub fn select_nonconforming(commits: &[CommitRecord]) -> Vec<DiffTask> {
    commits
        .iter()
        .filter(|c| !is_conventional_header(&c.header))
        .map(|c| DiffTask {
            sha: c.sha.clone(),
            author: c.author.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(sha: &str, message: &str) -> CommitRecord {
        CommitRecord::new(
            sha,
            message,
            Identity {
                name: "Test User".to_string(),
                email: None,
            },
        )
    }

    #[test]
    fn test_conforming_headers() {
        assert!(is_conventional_header("feat(auth): add 2FA"));
        assert!(is_conventional_header("fix: resolve login bug"));
        assert!(is_conventional_header("chore(deps2):  bump"));
    }

    #[test]
    fn test_non_conforming_headers() {
        assert!(!is_conventional_header("fix bug"));
        assert!(!is_conventional_header("fix: "));
        assert!(!is_conventional_header("fix:"));
        assert!(!is_conventional_header("fix:no space"));
        assert!(!is_conventional_header("fix(): empty scope"));
        assert!(!is_conventional_header("feat(api)!: breaking"));
        assert!(!is_conventional_header(""));
        assert!(!is_conventional_header("wip"));
    }

    #[test]
    fn test_only_first_line_is_checked() {
        assert!(is_conventional_header("feat: ok\nnot a header"));
        assert!(!is_conventional_header("update stuff\nfeat: hidden below"));
    }

    #[test]
    fn test_select_nonconforming_preserves_order() {
        let commits = vec![
            record("a", "wip"),
            record("b", "feat(x): ok"),
            record("c", "Fix typo"),
            record("d", "docs: readme"),
        ];
        let tasks = select_nonconforming(&commits);
        let shas: Vec<&str> = tasks.iter().map(|t| t.sha.as_str()).collect();
        assert_eq!(shas, ["a", "c"]);
    }

    #[test]
    fn test_select_nonconforming_all_conforming() {
        let commits = vec![record("a", "feat: one"), record("b", "fix(core): two")];
        assert!(select_nonconforming(&commits).is_empty());
    }
}
