//! System-package executor.
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::sync::SyncContext;

/// Parameters for a system-package executor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageSpec {
    /// Package name as the manager knows it; the executor name when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
}

/// Ensure a package is installed through the platform's package manager.
#[derive(Debug, Clone)]
pub struct SystemPackage {
    pub name: String,
    pub spec: PackageSpec,
}

impl SystemPackage {
    /// The name handed to the package manager.
    #[must_use]
    pub fn package_name(&self) -> &str {
        self.spec.package.as_deref().unwrap_or(&self.name)
    }

    pub(super) fn validate(&self) -> Vec<String> {
        if self.package_name().trim().is_empty() {
            vec!["package name must not be empty".to_string()]
        } else {
            vec![]
        }
    }

    pub(super) fn execute(&self, ctx: &SyncContext<'_>) -> Result<()> {
        let package = self.package_name();
        let Some(manager) = ctx.manager else {
            bail!("no supported package manager found for this platform");
        };

        if ctx.installed.contains(manager, ctx.runner, package)? {
            tracing::debug!("{package} already installed");
            return Ok(());
        }

        tracing::info!("installing {package} via {manager}");
        manager.install(ctx.runner, package)?;
        ctx.installed.note_installed(package);
        Ok(())
    }
}
