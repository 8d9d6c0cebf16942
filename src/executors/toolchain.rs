//! Language-toolchain executor: install a runtime version through its
//! version manager.
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::sync::SyncContext;

/// Parameters for a toolchain executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolchainSpec {
    /// Version manager program (e.g. `rustup`).
    pub manager: String,
    /// Version or channel to install.
    pub version: String,
}

/// Drive a version manager's `install` subcommand. Managers treat an
/// already-installed version as a no-op, which keeps this idempotent.
#[derive(Debug, Clone)]
pub struct Toolchain {
    pub name: String,
    pub spec: ToolchainSpec,
}

impl Toolchain {
    pub(super) fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.spec.manager.trim().is_empty() {
            issues.push("manager must not be empty".to_string());
        }
        if self.spec.version.trim().is_empty() {
            issues.push("version must not be empty".to_string());
        }
        issues
    }

    pub(super) fn execute(&self, ctx: &SyncContext<'_>) -> Result<()> {
        if !ctx.runner.which(&self.spec.manager) {
            bail!("{} is not installed", self.spec.manager);
        }
        tracing::info!("{}: {} install {}", self.name, self.spec.manager, self.spec.version);
        ctx.runner
            .run(&self.spec.manager, &["install", &self.spec.version])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_requires_manager_and_version() {
        let ex = Toolchain {
            name: "rust".to_string(),
            spec: ToolchainSpec {
                manager: String::new(),
                version: String::new(),
            },
        };
        assert_eq!(ex.validate().len(), 2);
    }

    #[test]
    fn validate_accepts_complete_spec() {
        let ex = Toolchain {
            name: "rust".to_string(),
            spec: ToolchainSpec {
                manager: "rustup".to_string(),
                version: "1.84.0".to_string(),
            },
        };
        assert!(ex.validate().is_empty());
    }
}
