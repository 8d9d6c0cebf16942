//! Config-file executor: render one template and symlink it into place.
use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::sync::SyncContext;

/// Parameters for a config-file executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSpec {
    /// Template path relative to the `templates/` directory.
    pub source: String,
    /// Destination path; `~` expands to the home directory.
    pub destination: String,
}

/// Render a template into the build directory and link the destination to it.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub name: String,
    pub spec: FileSpec,
}

impl ConfigFile {
    pub(super) fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.spec.source.trim().is_empty() {
            issues.push("source must not be empty".to_string());
        }
        if self.spec.destination.trim().is_empty() {
            issues.push("destination must not be empty".to_string());
        }
        issues
    }

    pub(super) fn execute(&self, ctx: &SyncContext<'_>) -> Result<()> {
        ctx.engine.install_file(&self.spec.source, &self.spec.destination)
    }
}
