//! URL-download executor.
use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};

use crate::fsutil;
use crate::sync::SyncContext;

/// Parameters for a url-download executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DownloadSpec {
    /// URL to fetch.
    pub url: String,
    /// Destination path; `~` expands to the home directory.
    pub destination: String,
    /// Mark the downloaded file executable.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub executable: bool,
}

/// Keep a file at the destination matching the remote content.
///
/// Unlike [`bootstrap`](crate::executors::bootstrap), this executor fetches
/// on every sync so the destination tracks the URL.
#[derive(Debug, Clone)]
pub struct UrlDownload {
    pub name: String,
    pub spec: DownloadSpec,
}

impl UrlDownload {
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
        fsutil::ensure_parent_dir(&destination)?;

        tracing::debug!("fetching {} -> {}", self.spec.url, destination.display());
        ctx.http
            .download(&self.spec.url, &destination)
            .with_context(|| format!("download {}", self.spec.url))?;

        if self.spec.executable {
            fsutil::set_executable(&destination)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_non_http_url() {
        let ex = UrlDownload {
            name: "theme".to_string(),
            spec: DownloadSpec {
                url: "ftp://example.com/theme".to_string(),
                destination: "~/.theme".to_string(),
                executable: false,
            },
        };
        let issues = ex.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("http"));
    }

    #[test]
    fn validate_accepts_https() {
        let ex = UrlDownload {
            name: "theme".to_string(),
            spec: DownloadSpec {
                url: "https://example.com/theme".to_string(),
                destination: "~/.theme".to_string(),
                executable: true,
            },
        };
        assert!(ex.validate().is_empty());
    }
}
