//! Git-repository executor: clone once, fast-forward thereafter.
use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};

use crate::fsutil;
use crate::sync::SyncContext;

/// Parameters for a git-repo executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepoSpec {
    /// Clone URL.
    pub url: String,
    /// Checkout path; `~` expands to the home directory.
    pub path: String,
    /// Branch to clone; the remote default when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// Ensure a repository exists at the declared path.
#[derive(Debug, Clone)]
pub struct GitRepo {
    pub name: String,
    pub spec: RepoSpec,
}

impl GitRepo {
    pub(super) fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.spec.url.trim().is_empty() {
            issues.push("url must not be empty".to_string());
        }
        if self.spec.path.trim().is_empty() {
            issues.push("path must not be empty".to_string());
        }
        issues
    }

    pub(super) fn execute(&self, ctx: &SyncContext<'_>) -> Result<()> {
        let path = fsutil::expand_tilde(&self.spec.path, &ctx.home);

        if path.join(".git").exists() {
            tracing::debug!("updating {}", path.display());
            ctx.runner
                .run_in(&path, "git", &["pull", "--ff-only"])
                .with_context(|| format!("pull {}", self.name))?;
            return Ok(());
        }

        fsutil::ensure_parent_dir(&path)?;
        let path_arg = path.to_string_lossy().into_owned();
        let mut args: Vec<&str> = vec!["clone"];
        if let Some(branch) = &self.spec.branch {
            args.extend(["--branch", branch.as_str()]);
        }
        args.push(&self.spec.url);
        args.push(&path_arg);

        tracing::info!("cloning {} into {}", self.spec.url, path.display());
        ctx.runner
            .run("git", &args)
            .with_context(|| format!("clone {}", self.name))?;
        Ok(())
    }
}
