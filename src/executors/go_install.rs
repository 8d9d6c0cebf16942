//! Go-install executor: `go install <package>@<version>`.
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::sync::SyncContext;

/// Parameters for a go-install executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GoInstallSpec {
    /// Import path of the package.
    pub package: String,
    /// Version suffix; `latest` when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Install a Go binary into `GOBIN` via the Go toolchain.
#[derive(Debug, Clone)]
pub struct GoInstall {
    pub name: String,
    pub spec: GoInstallSpec,
}

impl GoInstall {
    pub(super) fn validate(&self) -> Vec<String> {
        if self.spec.package.trim().is_empty() {
            vec!["package import path must not be empty".to_string()]
        } else {
            vec![]
        }
    }

    pub(super) fn execute(&self, ctx: &SyncContext<'_>) -> Result<()> {
        if !ctx.runner.which("go") {
            bail!("the go toolchain is not installed");
        }
        let spec = format!(
            "{}@{}",
            self.spec.package,
            self.spec.version.as_deref().unwrap_or("latest")
        );
        tracing::info!("go install {spec}");
        ctx.runner.run("go", &["install", &spec])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_requires_package() {
        let ex = GoInstall {
            name: "gopls".to_string(),
            spec: GoInstallSpec {
                package: String::new(),
                version: None,
            },
        };
        assert_eq!(ex.validate().len(), 1);
    }
}
