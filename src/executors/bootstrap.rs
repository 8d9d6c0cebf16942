//! Bootstrap executor: fetch a file once, e.g. an editor plugin manager.
use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};

use crate::fsutil;
use crate::sync::SyncContext;

/// Parameters for a bootstrap executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BootstrapSpec {
    /// URL of the bootstrap file.
    pub url: String,
    /// Destination path; `~` expands to the home directory.
    pub destination: String,
}

/// Download a bootstrap file only when the destination is absent. The file
/// is expected to manage itself afterwards (plugin managers self-update),
/// so an existing destination is left alone.
#[derive(Debug, Clone)]
pub struct Bootstrap {
    pub name: String,
    pub spec: BootstrapSpec,
}

impl Bootstrap {
    pub(super) fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !self.spec.url.starts_with("http://") && !self.spec.url.starts_with("https://") {
            issues.push("url must start with http:// or https://".to_string());
        }
        if self.spec.destination.trim().is_empty() {
            issues.push("destination must not be empty".to_string());
        }
        issues
    }

    pub(super) fn execute(&self, ctx: &SyncContext<'_>) -> Result<()> {
        let destination = fsutil::expand_tilde(&self.spec.destination, &ctx.home);
        if destination.exists() {
            tracing::debug!("{} already bootstrapped", self.name);
            return Ok(());
        }

        fsutil::ensure_parent_dir(&destination)?;
        tracing::info!("bootstrapping {} -> {}", self.spec.url, destination.display());
        ctx.http
            .download(&self.spec.url, &destination)
            .with_context(|| format!("download {}", self.spec.url))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_non_http_url() {
        let ex = Bootstrap {
            name: "vim-plug".to_string(),
            spec: BootstrapSpec {
                url: "file:///plug.vim".to_string(),
                destination: "~/.vim/autoload/plug.vim".to_string(),
            },
        };
        assert_eq!(ex.validate().len(), 1);
    }
}
