//! Scratch git repositories for end-to-end describe tests.
//!
//! Every command runs with an isolated identity and no system config, so the
//! developer's own git settings (signing, hooks, default branch) never leak
//! into a test.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// A throwaway repository in a temp directory, deleted on drop.
pub struct GitRepo {
    dir: TempDir,
}

impl GitRepo {
    /// Whether a usable `git` binary is on `PATH`.
    pub fn git_available() -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .is_ok_and(|o| o.status.success())
    }

    /// Initialise an empty repository, or `None` when git is not installed.
    pub fn init() -> Option<Self> {
        if !Self::git_available() {
            eprintln!("git not found on PATH, skipping repository test");
            return None;
        }
        let dir = TempDir::new().expect("failed to create temp dir");
        let repo = Self { dir };
        repo.git(&["init", "-q"]);
        Some(repo)
    }

    /// Initialise a repository with one commit.
    pub fn with_commit() -> Option<Self> {
        let repo = Self::init()?;
        repo.commit("initial");
        Some(repo)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Run git in the repository and return trimmed stdout. Panics on failure.
    pub fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .args([
                "-c",
                "user.name=fwstamp",
                "-c",
                "user.email=fwstamp@example.com",
                "-c",
                "commit.gpgsign=false",
                "-c",
                "tag.gpgsign=false",
                "-c",
                "init.defaultBranch=main",
            ])
            .args(args)
            .current_dir(self.dir.path())
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .env("GIT_CONFIG_GLOBAL", "/dev/null")
            .output()
            .expect("failed to run git");
        assert!(
            output.status.success(),
            "git {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Create an empty commit.
    pub fn commit(&self, message: &str) {
        self.git(&["commit", "-q", "--allow-empty", "-m", message]);
    }

    /// Create a lightweight tag at `HEAD`.
    pub fn tag(&self, name: &str) {
        self.git(&["tag", name]);
    }

    /// Write an untracked-then-added file so the worktree is dirty.
    pub fn make_dirty(&self) {
        std::fs::write(self.dir.path().join("dirty.txt"), "x").expect("failed to write file");
        self.git(&["add", "dirty.txt"]);
    }

    /// Abbreviated hash of `HEAD`, as `git describe` prints it.
    pub fn short_hash(&self) -> String {
        self.git(&["rev-parse", "--short", "HEAD"])
    }
}
