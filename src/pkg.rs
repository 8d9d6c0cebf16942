//! Package-manager collaborator.
//!
//! One manager is chosen per sync from an ordered per-OS preference list.
//! Installed-state queries go through an explicit snapshot cache owned by
//! the orchestrator: one bulk listing per sync instead of a subprocess per
//! package, with an explicit refresh instead of hidden global state.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;

use anyhow::{Context as _, Result, bail};

use crate::exec::Runner;
use crate::platform::{Os, Platform};

/// Supported package managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Manager {
    /// Arch Linux (pacman).
    Pacman,
    /// Debian-family (apt/dpkg).
    Apt,
    /// macOS (Homebrew).
    Brew,
    /// Windows (winget).
    Winget,
}

impl fmt::Display for Manager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pacman => write!(f, "pacman"),
            Self::Apt => write!(f, "apt"),
            Self::Brew => write!(f, "brew"),
            Self::Winget => write!(f, "winget"),
        }
    }
}

impl Manager {
    /// Preference order per OS.
    #[must_use]
    pub const fn preference(os: Os) -> &'static [Self] {
        match os {
            Os::Linux => &[Self::Pacman, Self::Apt],
            Os::Macos => &[Self::Brew],
            Os::Windows => &[Self::Winget],
        }
    }

    /// The program probed on PATH to decide availability.
    #[must_use]
    pub const fn program(self) -> &'static str {
        match self {
            Self::Pacman => "pacman",
            Self::Apt => "apt-get",
            Self::Brew => "brew",
            Self::Winget => "winget",
        }
    }

    /// Pick the first available manager for this platform.
    #[must_use]
    pub fn detect(platform: Platform, runner: &dyn Runner) -> Option<Self> {
        Self::preference(platform.os)
            .iter()
            .copied()
            .find(|manager| runner.which(manager.program()))
    }

    /// Query the full set of installed package names.
    ///
    /// Runs a **single** command regardless of how many packages need to
    /// be checked.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing command cannot be executed.
    pub fn list_installed(self, runner: &dyn Runner) -> Result<HashSet<String>> {
        let result = match self {
            // One package per line: "name version"
            Self::Pacman => runner.run_unchecked("pacman", &["-Q"])?,
            Self::Apt => runner.run_unchecked("dpkg-query", &["-W", "-f=${Package}\n"])?,
            Self::Brew => runner.run_unchecked("brew", &["list", "-1"])?,
            Self::Winget => runner.run_unchecked(
                "winget",
                &[
                    "list",
                    "--accept-source-agreements",
                    "--disable-interactivity",
                ],
            )?,
        };

        let mut installed = HashSet::new();
        if result.success {
            match self {
                Self::Pacman | Self::Apt | Self::Brew => {
                    for line in result.stdout.lines() {
                        if let Some(name) = line.split_whitespace().next() {
                            installed.insert(name.to_string());
                        }
                    }
                }
                // `winget list` prints a formatted table; IDs are
                // reverse-domain names, so exact-match lookups against every
                // whitespace-delimited token are collision-free in practice.
                Self::Winget => {
                    for line in result.stdout.lines() {
                        for token in line.split_whitespace() {
                            installed.insert(token.to_string());
                        }
                    }
                }
            }
        }
        Ok(installed)
    }

    /// Install one package.
    ///
    /// # Errors
    ///
    /// Returns an error when the install command fails.
    pub fn install(self, runner: &dyn Runner, package: &str) -> Result<()> {
        match self {
            Self::Pacman => runner.run("sudo", &["pacman", "-S", "--noconfirm", "--needed", package]),
            Self::Apt => runner.run("sudo", &["apt-get", "install", "-y", package]),
            Self::Brew => runner.run("brew", &["install", package]),
            Self::Winget => runner.run(
                "winget",
                &[
                    "install",
                    "--exact",
                    "--id",
                    package,
                    "--accept-source-agreements",
                    "--accept-package-agreements",
                ],
            ),
        }
        .with_context(|| format!("install {package} via {self}"))?;
        Ok(())
    }
}

/// Lazily-filled snapshot of installed package names.
///
/// Owned by the orchestrator and passed by reference; never global.
#[derive(Debug, Default)]
pub struct InstalledCache {
    snapshot: RefCell<Option<HashSet<String>>>,
}

impl InstalledCache {
    /// Create an empty (unfilled) cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `package` is installed, filling the snapshot on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial bulk listing fails.
    pub fn contains(
        &self,
        manager: Manager,
        runner: &dyn Runner,
        package: &str,
    ) -> Result<bool> {
        let mut snapshot = match self.snapshot.try_borrow_mut() {
            Ok(guard) => guard,
            Err(_) => bail!("installed-package cache is already in use"),
        };
        if snapshot.is_none() {
            tracing::debug!("listing installed packages via {manager}");
            *snapshot = Some(manager.list_installed(runner)?);
        }
        Ok(snapshot
            .as_ref()
            .is_some_and(|installed| installed.contains(package)))
    }

    /// Record a package just installed so later checks see it without a
    /// fresh listing.
    pub fn note_installed(&self, package: &str) {
        if let Ok(mut snapshot) = self.snapshot.try_borrow_mut()
            && let Some(installed) = snapshot.as_mut()
        {
            installed.insert(package.to_string());
        }
    }

    /// Drop the snapshot; the next query lists packages again.
    pub fn refresh(&self) {
        if let Ok(mut snapshot) = self.snapshot.try_borrow_mut() {
            *snapshot = None;
        }
    }
}
