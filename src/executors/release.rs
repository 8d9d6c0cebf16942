//! GitHub-release executor: pick the right asset for this machine and
//! install the binary it carries.
use std::collections::BTreeMap;

use anyhow::{Context as _, Result, bail};
use serde::{Deserialize, Serialize};

use crate::{archive, detect, fsutil};
use crate::sync::SyncContext;

/// Parameters for a github-release executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReleaseSpec {
    /// Repository as `owner/name`.
    pub repo: String,
    /// Release tag; the latest release when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Where the binary is installed; `~` expands to the home directory.
    pub destination: String,
    /// Per-OS override patterns (keys `linux`, `darwin`, `windows`); when
    /// present for the current OS the pattern replaces auto-detection and
    /// must match exactly one asset.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub patterns: BTreeMap<String, String>,
    /// Path of the executable inside an extracted archive; auto-detected
    /// when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract_path: Option<String>,
}

/// Install one binary from a hosted release.
#[derive(Debug, Clone)]
pub struct GithubRelease {
    pub name: String,
    pub spec: ReleaseSpec,
}

impl GithubRelease {
    pub(super) fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !self.spec.repo.contains('/') || self.spec.repo.trim().is_empty() {
            issues.push("repo must be of the form owner/name".to_string());
        }
        if self.spec.destination.trim().is_empty() {
            issues.push("destination must not be empty".to_string());
        }
        for (os, pattern) in &self.spec.patterns {
            if let Err(e) = regex::Regex::new(pattern) {
                issues.push(format!("pattern for {os} does not compile: {e}"));
            }
        }
        issues
    }

    pub(super) fn execute(&self, ctx: &SyncContext<'_>) -> Result<()> {
        let destination = fsutil::expand_tilde(&self.spec.destination, &ctx.home);
        if destination.exists() && !ctx.force {
            tracing::debug!("{} already installed at {}", self.name, destination.display());
            return Ok(());
        }

        let release = ctx
            .http
            .release(&self.spec.repo, self.spec.tag.as_deref())
            .with_context(|| format!("fetch release metadata for {}", self.spec.repo))?;

        let os_key = ctx.platform.os.to_string();
        let pattern = self.spec.patterns.get(&os_key).map(String::as_str);
        let asset = detect::auto_detect(&release.assets, ctx.platform, pattern)?;
        tracing::info!("{}: {} {} -> {}", self.name, release.tag, asset.name, destination.display());

        let staging = tempfile::tempdir().context("create staging directory")?;
        let downloaded = staging.path().join(&asset.name);
        ctx.http
            .download(&asset.download_url, &downloaded)
            .with_context(|| format!("download {}", asset.name))?;

        let binary = if archive::is_archive(&asset.name) {
            let tree = staging.path().join("extracted");
            archive::extract(&downloaded, &asset.name, &tree)?;
            match &self.spec.extract_path {
                Some(inner) => {
                    let explicit = tree.join(inner);
                    if !explicit.is_file() {
                        bail!("archive has no file at '{inner}'");
                    }
                    explicit
                }
                None => archive::find_single_executable(&tree)?,
            }
        } else {
            downloaded
        };

        fsutil::ensure_parent_dir(&destination)?;
        if destination.symlink_metadata().is_ok() {
            std::fs::remove_file(&destination)
                .with_context(|| format!("remove existing: {}", destination.display()))?;
        }
        std::fs::copy(&binary, &destination)
            .with_context(|| format!("install {}", destination.display()))?;
        fsutil::set_executable(&destination)?;
        Ok(())
    }
}
