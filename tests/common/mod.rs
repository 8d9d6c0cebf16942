//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Result, bail};

use rigup_cli::config::Document;
use rigup_cli::exec::{ExecResult, Runner};
use rigup_cli::net::{Asset, Fetcher, Release};
use rigup_cli::platform::{Arch, Os, Platform};
use rigup_cli::sync::{Collaborators, SyncOptions, sync};
use rigup_cli::vcs::NoopVcs;

pub const PLATFORM: Platform = Platform::new(Os::Linux, Arch::X86_64);

/// A machine-config repository plus a home directory, both temporary.
pub struct Fixture {
    pub root: tempfile::TempDir,
    pub home: tempfile::TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let fixture = Self {
            root: tempfile::tempdir().expect("create config root"),
            home: tempfile::tempdir().expect("create home"),
        };
        std::fs::create_dir_all(fixture.root.path().join("templates"))
            .expect("create templates dir");
        fixture
    }

    pub fn write_template(&self, relative: &str, text: &str) {
        let path = self.root.path().join("templates").join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create template parent");
        }
        std::fs::write(path, text).expect("write template");
    }

    pub fn home_path(&self, relative: &str) -> PathBuf {
        self.home.path().join(relative)
    }

    pub fn sync(
        &self,
        doc: &Document,
        target: &str,
        runner: &dyn Runner,
        http: &dyn Fetcher,
        options: &SyncOptions,
    ) -> Result<(), rigup_cli::error::ErrorList> {
        let collaborators = Collaborators {
            runner,
            http,
            vcs: &NoopVcs,
        };
        sync(
            doc,
            self.root.path(),
            self.home.path(),
            target,
            PLATFORM,
            &collaborators,
            options,
        )
    }
}

/// [`Fetcher`] serving canned releases and bodies from memory.
#[derive(Debug, Default)]
pub struct StubHttp {
    releases: BTreeMap<String, Release>,
    bodies: BTreeMap<String, Vec<u8>>,
    downloads: Mutex<Vec<String>>,
}

impl StubHttp {
    pub fn with_release(mut self, repo: &str, tag: &str, assets: Vec<(&str, &str)>) -> Self {
        self.releases.insert(
            repo.to_string(),
            Release {
                tag: tag.to_string(),
                assets: assets
                    .into_iter()
                    .map(|(name, url)| Asset {
                        name: name.to_string(),
                        download_url: url.to_string(),
                    })
                    .collect(),
            },
        );
        self
    }

    pub fn with_body(mut self, url: &str, body: &[u8]) -> Self {
        self.bodies.insert(url.to_string(), body.to_vec());
        self
    }

    pub fn downloaded(&self) -> Vec<String> {
        self.downloads.lock().map_or_else(|_| vec![], |g| g.clone())
    }
}

impl Fetcher for StubHttp {
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
        let Some(body) = self.bodies.get(url) else {
            bail!("no stubbed body for {url}");
        };
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(dest, body)?;
        Ok(())
    }
}

/// [`Runner`] answering every invocation with success and recording it.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<String>>,
    which_result: bool,
}

impl RecordingRunner {
    pub fn with_which(mut self, result: bool) -> Self {
        self.which_result = result;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    fn record(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        if let Ok(mut guard) = self.calls.lock() {
            guard.push(format!("{program} {}", args.join(" ")).trim().to_string());
        }
        Ok(ExecResult {
            stdout: String::new(),
            stderr: String::new(),
            success: true,
            code: Some(0),
        })
    }
}

impl Runner for RecordingRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        self.record(program, args)
    }

    fn run_in(&self, _dir: &Path, program: &str, args: &[&str]) -> Result<ExecResult> {
        self.record(program, args)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        self.record(program, args)
    }

    fn which(&self, _program: &str) -> bool {
        self.which_result
    }
}
