//! HTTP collaborator: release metadata and file downloads.
//!
//! The engine only ever needs two operations, captured by [`Fetcher`] so
//! tests can stub the network entirely. The real implementation speaks the
//! GitHub releases API over blocking `ureq` with an optional bearer token
//! from `RIGUP_GITHUB_TOKEN`.

use std::path::Path;

use anyhow::{Context as _, Result};
use serde::Deserialize;

use crate::fsutil;

/// Maximum accepted download size.
const MAX_BODY_SIZE: u64 = 512 * 1024 * 1024;

/// Environment variable holding an optional API token.
pub const TOKEN_ENV: &str = "RIGUP_GITHUB_TOKEN";

/// One downloadable file attached to a hosted release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Asset filename.
    pub name: String,
    /// Direct download URL.
    pub download_url: String,
}

/// Release metadata: the resolved tag and its asset listing.
#[derive(Debug, Clone)]
pub struct Release {
    /// Tag the release was published under.
    pub tag: String,
    /// Every downloadable asset.
    pub assets: Vec<Asset>,
}

/// Narrow interface over HTTP for executors.
pub trait Fetcher {
    /// Fetch release metadata for `owner/name`, by tag or latest.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an unexpected response.
    fn release(&self, repo: &str, tag: Option<&str>) -> Result<Release>;

    /// Download `url` to `dest`, replacing any existing file atomically.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or if the file cannot be
    /// written.
    fn download(&self, url: &str, dest: &Path) -> Result<()>;
}

/// [`Fetcher`] backed by blocking `ureq`.
#[derive(Debug)]
pub struct HttpFetcher {
    agent: ureq::Agent,
    api_base: String,
    token: Option<String>,
}

impl HttpFetcher {
    /// Create a fetcher against the public GitHub API, picking up a token
    /// from the environment when present.
    #[must_use]
    pub fn new() -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
            api_base: "https://api.github.com".to_string(),
            token: std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty()),
        }
    }

    /// Create a fetcher with a custom API base (for testing).
    #[must_use]
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
            api_base: api_base.into(),
            token: None,
        }
    }

    fn release_url(&self, repo: &str, tag: Option<&str>) -> String {
        match tag {
            Some(tag) => format!("{}/repos/{repo}/releases/tags/{tag}", self.api_base),
            None => format!("{}/repos/{repo}/releases/latest", self.api_base),
        }
    }

    fn bearer(&self) -> Option<String> {
        self.token.as_ref().map(|token| format!("Bearer {token}"))
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher for HttpFetcher {
    fn release(&self, repo: &str, tag: Option<&str>) -> Result<Release> {
        let url = self.release_url(repo, tag);
        let mut request = self
            .agent
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "rigup");
        if let Some(bearer) = self.bearer() {
            request = request.header("Authorization", bearer.as_str());
        }

        let response: GitHubRelease = request
            .call()
            .with_context(|| format!("GET {url}"))?
            .body_mut()
            .read_json()
            .with_context(|| format!("decode release metadata from {url}"))?;
        Ok(response.into())
    }

    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        let mut request = self
            .agent
            .get(url)
            .header("Accept", "application/octet-stream")
            .header("User-Agent", "rigup");
        if let Some(bearer) = self.bearer() {
            request = request.header("Authorization", bearer.as_str());
        }

        let mut response = request.call().with_context(|| format!("GET {url}"))?;

        let bytes = response
            .body_mut()
            .with_config()
            .limit(MAX_BODY_SIZE)
            .read_to_vec()
            .with_context(|| format!("read body of {url}"))?;

        fsutil::write_atomic(dest, &bytes)
    }
}

// =============================================================================
// GitHub API response types
// =============================================================================

#[derive(Debug, Deserialize)]
struct GitHubRelease {
    tag_name: String,
    assets: Vec<GitHubAsset>,
}

#[derive(Debug, Deserialize)]
struct GitHubAsset {
    name: String,
    browser_download_url: String,
}

impl From<GitHubRelease> for Release {
    fn from(release: GitHubRelease) -> Self {
        Self {
            tag: release.tag_name,
            assets: release.assets.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<GitHubAsset> for Asset {
    fn from(asset: GitHubAsset) -> Self {
        Self {
            name: asset.name,
            download_url: asset.browser_download_url,
        }
    }
}

#[cfg(test)]
pub mod test_helpers {
    use super::{Asset, Fetcher, Release};
    use anyhow::{Result, bail};
    use std::collections::BTreeMap;
    use std::path::Path;
    use std::sync::Mutex;

    /// [`Fetcher`] serving canned releases and URL bodies from memory.
    #[derive(Debug, Default)]
    pub struct StubFetcher {
        releases: BTreeMap<String, Release>,
        bodies: BTreeMap<String, Vec<u8>>,
        downloads: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        /// Register a release for `owner/name`.
        #[must_use]
        pub fn with_release(mut self, repo: &str, tag: &str, assets: Vec<Asset>) -> Self {
            self.releases.insert(
                repo.to_string(),
                Release {
                    tag: tag.to_string(),
                    assets,
                },
            );
            self
        }

        /// Register a body served for `url`.
        #[must_use]
        pub fn with_body(mut self, url: &str, body: &[u8]) -> Self {
            self.bodies.insert(url.to_string(), body.to_vec());
            self
        }

        /// URLs downloaded so far, oldest first.
        #[must_use]
        pub fn downloaded(&self) -> Vec<String> {
            self.downloads.lock().map_or_else(|_| vec![], |g| g.clone())
        }
    }

    impl Fetcher for StubFetcher {
        fn release(&self, repo: &str, _tag: Option<&str>) -> Result<Release> {
            match self.releases.get(repo) {
                Some(release) => Ok(release.clone()),
                None => bail!("no stubbed release for {repo}"),
            }
        }

        fn download(&self, url: &str, dest: &Path) -> Result<()> {
            if let Ok(mut guard) = self.downloads.lock() {
                guard.push(url.to_string());
            }
            match self.bodies.get(url) {
                Some(body) => crate::fsutil::write_atomic(dest, body),
                None => bail!("no stubbed body for {url}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_url_by_tag_and_latest() {
        let fetcher = HttpFetcher::with_api_base("https://api.example.com");
        assert_eq!(
            fetcher.release_url("BurntSushi/ripgrep", Some("14.1.0")),
            "https://api.example.com/repos/BurntSushi/ripgrep/releases/tags/14.1.0"
        );
        assert_eq!(
            fetcher.release_url("BurntSushi/ripgrep", None),
            "https://api.example.com/repos/BurntSushi/ripgrep/releases/latest"
        );
    }

    #[test]
    fn github_release_deserialises_and_converts() {
        let json = r#"
        {
            "tag_name": "14.1.0",
            "assets": [
                {
                    "name": "rg-x86_64-unknown-linux-musl.tar.gz",
                    "browser_download_url": "https://example.com/rg.tar.gz",
                    "size": 123456
                }
            ]
        }
        "#;
        let parsed: GitHubRelease = serde_json::from_str(json).unwrap();
        let release: Release = parsed.into();
        assert_eq!(release.tag, "14.1.0");
        assert_eq!(release.assets.len(), 1);
        assert_eq!(release.assets[0].download_url, "https://example.com/rg.tar.gz");
    }

    #[test]
    fn stub_fetcher_serves_bodies() {
        use test_helpers::StubFetcher;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("file");
        let stub = StubFetcher::default().with_body("https://x/y", b"abc");
        stub.download("https://x/y", &dest).unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"abc");
        assert_eq!(stub.downloaded(), vec!["https://x/y"]);
        assert!(stub.download("https://x/z", &dest).is_err());
    }
}
