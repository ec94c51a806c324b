//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::Path;
use std::process::Command;

use git2::{Oid, Repository, RepositoryInitOptions, Signature};
use recommit::event::Identity;

/// Branch every test repository starts on.
pub const BRANCH: &str = "main";

/// The author used for every test commit.
pub fn test_author() -> Identity {
    Identity {
        name: "Test User".to_string(),
        email: Some("test@example.com".to_string()),
    }
}

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository on `main` in a temp directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head(BRANCH);
        let repo = Repository::init_opts(dir.path(), &opts).expect("Failed to init git repo");

        let mut config = repo.config().expect("Failed to open repo config");
        config.set_str("user.name", "Test User").expect("Failed to set user.name");
        config
            .set_str("user.email", "test@example.com")
            .expect("Failed to set user.email");

        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Get the test signature for commits.
    fn signature(&self) -> Signature<'_> {
        Signature::now("Test User", "test@example.com").expect("Failed to create signature")
    }

    /// Create a commit that adds `file` with `content`. Returns the commit OID.
    pub fn commit_file(&self, file: &str, content: &str, message: &str) -> Oid {
        let sig = self.signature();

        std::fs::write(self.dir.path().join(file), content).expect("Failed to write test file");

        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(file)).expect("Failed to add file");
        index.write().expect("Failed to write index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Create a commit touching a file named after its position.
    pub fn commit(&self, message: &str) -> Oid {
        let n = self.commit_count();
        self.commit_file(&format!("file{n}.txt"), message, message)
    }

    fn commit_count(&self) -> usize {
        match self.repo.head() {
            Ok(_) => {
                let mut walk = self.repo.revwalk().expect("Failed to create revwalk");
                walk.push_head().expect("Failed to push head");
                walk.count()
            }
            Err(_) => 0,
        }
    }

    /// Messages from the tip of `main` back to the root.
    pub fn messages(&self) -> Vec<String> {
        self.walk_main()
            .into_iter()
            .map(|oid| {
                let commit = self.repo.find_commit(oid).expect("Failed to find commit");
                commit.message().unwrap_or("").to_string()
            })
            .collect()
    }

    /// Tree ids from the tip of `main` back to the root.
    pub fn trees(&self) -> Vec<Oid> {
        self.walk_main()
            .into_iter()
            .map(|oid| {
                let commit = self.repo.find_commit(oid).expect("Failed to find commit");
                commit.tree_id()
            })
            .collect()
    }

    pub fn tip(&self) -> Oid {
        self.repo
            .refname_to_id(&format!("refs/heads/{BRANCH}"))
            .expect("Failed to resolve main")
    }

    fn walk_main(&self) -> Vec<Oid> {
        let mut walk = self.repo.revwalk().expect("Failed to create revwalk");
        walk.push_ref(&format!("refs/heads/{BRANCH}"))
            .expect("Failed to push main");
        walk.collect::<Result<Vec<_>, _>>()
            .expect("Failed to walk history")
    }

    /// Attach a fresh bare repository as `origin` and push `main` to it.
    ///
    /// The remote is deleted when the returned value is dropped.
    #[must_use]
    pub fn with_bare_remote(&self) -> BareRemote {
        let remote = BareRemote::new();
        self.repo
            .remote("origin", &remote.path().to_string_lossy())
            .expect("Failed to add remote");
        git(self.path(), &["push", "origin", BRANCH]);
        remote
    }
}

/// A bare repository acting as the push target.
pub struct BareRemote {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl BareRemote {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init_bare(dir.path()).expect("Failed to init bare repo");
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn tip(&self) -> Oid {
        self.repo
            .refname_to_id(&format!("refs/heads/{BRANCH}"))
            .expect("Remote has no main branch")
    }
}

/// Run a git command in `dir`, panicking on failure.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}
