//! Version-control collaborator for the machine-config repository.
//!
//! Sync pulls before resolution; mutating commands push after a successful
//! document write. Environments without a backing repository get the
//! no-op implementation.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};

use crate::config::DOCUMENT_NAME;
use crate::exec::Runner;

/// Narrow pull/push interface over the config repository.
pub trait Vcs {
    /// Bring the local checkout up to date.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying fetch/merge fails.
    fn pull(&self) -> Result<()>;

    /// Record and publish a document change.
    ///
    /// # Errors
    ///
    /// Returns an error when the working tree has unrelated changes or the
    /// underlying commands fail.
    fn push(&self, message: &str) -> Result<()>;
}

/// Git-backed [`Vcs`] driving the `git` binary through a [`Runner`].
pub struct GitVcs<'a> {
    root: PathBuf,
    runner: &'a dyn Runner,
}

impl<'a> GitVcs<'a> {
    /// Create a git collaborator for the repository at `root`.
    #[must_use]
    pub fn new(root: &Path, runner: &'a dyn Runner) -> Self {
        Self {
            root: root.to_path_buf(),
            runner,
        }
    }

    /// Whether `root` looks like a git checkout.
    #[must_use]
    pub fn is_repository(root: &Path) -> bool {
        root.join(".git").exists()
    }
}

impl Vcs for GitVcs<'_> {
    fn pull(&self) -> Result<()> {
        let result = self
            .runner
            .run_in(&self.root, "git", &["pull", "--ff-only"])
            .context("git pull")?;
        let message = result.stdout.trim();
        if message.contains("Already up to date") {
            tracing::debug!("repository already up to date");
        } else {
            tracing::info!("repository updated");
        }
        Ok(())
    }

    fn push(&self, message: &str) -> Result<()> {
        // Only the document may be dirty; anything else means the user has
        // work in flight we must not sweep into a commit.
        let status = self
            .runner
            .run_in(&self.root, "git", &["status", "--porcelain"])
            .context("git status")?;
        let unrelated: Vec<&str> = status
            .stdout
            .lines()
            .filter(|line| !line.ends_with(DOCUMENT_NAME))
            .collect();
        if !unrelated.is_empty() {
            bail!(
                "working tree is not clean ({} unrelated change{})",
                unrelated.len(),
                if unrelated.len() == 1 { "" } else { "s" }
            );
        }

        self.runner
            .run_in(&self.root, "git", &["add", DOCUMENT_NAME])
            .context("git add")?;
        self.runner
            .run_in(&self.root, "git", &["commit", "-m", message])
            .context("git commit")?;
        self.runner
            .run_in(&self.root, "git", &["push"])
            .context("git push")?;
        Ok(())
    }
}

/// [`Vcs`] for checkouts with no backing repository.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopVcs;

impl Vcs for NoopVcs {
    fn pull(&self) -> Result<()> {
        Ok(())
    }

    fn push(&self, _message: &str) -> Result<()> {
        Ok(())
    }
}
