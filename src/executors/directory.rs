//! Config-directory executor: render a template tree and symlink the
//! directory into place.
use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::sync::SyncContext;

/// Parameters for a config-directory executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DirectorySpec {
    /// Directory path relative to the `templates/` directory.
    pub source: String,
    /// Destination path; `~` expands to the home directory.
    pub destination: String,
}

/// Render every file under a template directory into the build directory
/// and link the destination to the rendered tree.
#[derive(Debug, Clone)]
pub struct ConfigDirectory {
    pub name: String,
    pub spec: DirectorySpec,
}

impl ConfigDirectory {
    pub(super) fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.spec.source.trim().is_empty() {
            issues.push("source directory must not be empty".to_string());
        }
        if self.spec.destination.trim().is_empty() {
            issues.push("destination must not be empty".to_string());
        }
        issues
    }

    pub(super) fn execute(&self, ctx: &SyncContext<'_>) -> Result<()> {
        ctx.engine.install_dir(&self.spec.source, &self.spec.destination)
    }
}
