//! The closed set of typed executors.
//!
//! An executor is one declarative unit of desired state: render-and-link a
//! file, clone a repository, install a package, fetch a release binary.
//! Raw named specs from the document are decoded here into the [`Executor`]
//! sum type; keeping the set closed and exhaustively matched makes adding a
//! kind a compile-checked change rather than a silent fallthrough.
pub mod bootstrap;
pub mod bundle;
pub mod directory;
pub mod download;
pub mod file;
pub mod git_repo;
pub mod go_install;
pub mod package;
pub mod release;
pub mod toolchain;

use std::fmt;

use anyhow::Result;
use serde::de::DeserializeOwned;

use crate::error::DecodeError;
use crate::sync::SyncContext;

pub use bootstrap::Bootstrap;
pub use bundle::Bundle;
pub use directory::ConfigDirectory;
pub use download::UrlDownload;
pub use file::ConfigFile;
pub use git_repo::GitRepo;
pub use go_install::GoInstall;
pub use package::SystemPackage;
pub use release::GithubRelease;
pub use toolchain::Toolchain;

/// Discriminator for the closed executor set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    ConfigFile,
    ConfigDirectory,
    GitRepo,
    GithubRelease,
    SystemPackage,
    UrlDownload,
    Bundle,
    Toolchain,
    GoInstall,
    Bootstrap,
}

impl Kind {
    /// Every kind, in the order collections are scanned for name lookup.
    pub const ALL: [Self; 10] = [
        Self::ConfigFile,
        Self::ConfigDirectory,
        Self::GitRepo,
        Self::GithubRelease,
        Self::SystemPackage,
        Self::UrlDownload,
        Self::Bundle,
        Self::Toolchain,
        Self::GoInstall,
        Self::Bootstrap,
    ];

    /// The kind tag as written in documents and CLI arguments.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::ConfigFile => "config-file",
            Self::ConfigDirectory => "config-directory",
            Self::GitRepo => "git-repo",
            Self::GithubRelease => "github-release",
            Self::SystemPackage => "system-package",
            Self::UrlDownload => "url-download",
            Self::Bundle => "bundle",
            Self::Toolchain => "toolchain",
            Self::GoInstall => "go-install",
            Self::Bootstrap => "bootstrap",
        }
    }

    /// Parse a kind tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A decoded, typed executor carrying its own name.
///
/// The name travels with the executor so logs, deduplication and error
/// reports can identify it without consulting the document again.
#[derive(Debug, Clone)]
pub enum Executor {
    ConfigFile(ConfigFile),
    ConfigDirectory(ConfigDirectory),
    GitRepo(GitRepo),
    GithubRelease(GithubRelease),
    SystemPackage(SystemPackage),
    UrlDownload(UrlDownload),
    Bundle(Bundle),
    Toolchain(Toolchain),
    GoInstall(GoInstall),
    Bootstrap(Bootstrap),
}

impl Executor {
    /// The executor's declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::ConfigFile(e) => &e.name,
            Self::ConfigDirectory(e) => &e.name,
            Self::GitRepo(e) => &e.name,
            Self::GithubRelease(e) => &e.name,
            Self::SystemPackage(e) => &e.name,
            Self::UrlDownload(e) => &e.name,
            Self::Bundle(e) => &e.name,
            Self::Toolchain(e) => &e.name,
            Self::GoInstall(e) => &e.name,
            Self::Bootstrap(e) => &e.name,
        }
    }

    /// The executor's kind.
    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Self::ConfigFile(_) => Kind::ConfigFile,
            Self::ConfigDirectory(_) => Kind::ConfigDirectory,
            Self::GitRepo(_) => Kind::GitRepo,
            Self::GithubRelease(_) => Kind::GithubRelease,
            Self::SystemPackage(_) => Kind::SystemPackage,
            Self::UrlDownload(_) => Kind::UrlDownload,
            Self::Bundle(_) => Kind::Bundle,
            Self::Toolchain(_) => Kind::Toolchain,
            Self::GoInstall(_) => Kind::GoInstall,
            Self::Bootstrap(_) => Kind::Bootstrap,
        }
    }

    /// Structural self-checks, as messages. Empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        match self {
            Self::ConfigFile(e) => e.validate(),
            Self::ConfigDirectory(e) => e.validate(),
            Self::GitRepo(e) => e.validate(),
            Self::GithubRelease(e) => e.validate(),
            Self::SystemPackage(e) => e.validate(),
            Self::UrlDownload(e) => e.validate(),
            Self::Bundle(e) => e.validate(),
            Self::Toolchain(e) => e.validate(),
            Self::GoInstall(e) => e.validate(),
            Self::Bootstrap(e) => e.validate(),
        }
    }

    /// Drive the machine toward this executor's declared state.
    ///
    /// # Errors
    ///
    /// Returns the executor's failure; the orchestrator records it and moves
    /// on to the next executor.
    pub fn execute(&self, ctx: &SyncContext<'_>) -> Result<()> {
        match self {
            Self::ConfigFile(e) => e.execute(ctx),
            Self::ConfigDirectory(e) => e.execute(ctx),
            Self::GitRepo(e) => e.execute(ctx),
            Self::GithubRelease(e) => e.execute(ctx),
            Self::SystemPackage(e) => e.execute(ctx),
            Self::UrlDownload(e) => e.execute(ctx),
            // A bundle's only effect is the union of what it names; expansion
            // happens during resolution, so there is nothing left to do here.
            Self::Bundle(_) => Ok(()),
            Self::Toolchain(e) => e.execute(ctx),
            Self::GoInstall(e) => e.execute(ctx),
            Self::Bootstrap(e) => e.execute(ctx),
        }
    }
}

/// Decode a raw named spec into a typed executor.
///
/// # Errors
///
/// Returns [`DecodeError::UnsupportedType`] for a tag outside the closed
/// set, or [`DecodeError::InvalidParams`] when the parameter table does not
/// match the kind's shape.
pub fn decode(name: &str, kind_tag: &str, params: &toml::Table) -> Result<Executor, DecodeError> {
    let kind = Kind::from_tag(kind_tag)
        .ok_or_else(|| DecodeError::UnsupportedType(kind_tag.to_string()))?;
    decode_kind(name, kind, params)
}

/// Decode a raw spec whose kind is already known.
///
/// # Errors
///
/// Returns [`DecodeError::InvalidParams`] when the parameter table does not
/// match the kind's shape.
pub fn decode_kind(name: &str, kind: Kind, params: &toml::Table) -> Result<Executor, DecodeError> {
    let name = name.to_string();
    Ok(match kind {
        Kind::ConfigFile => Executor::ConfigFile(ConfigFile {
            spec: typed(&name, kind, params)?,
            name,
        }),
        Kind::ConfigDirectory => Executor::ConfigDirectory(ConfigDirectory {
            spec: typed(&name, kind, params)?,
            name,
        }),
        Kind::GitRepo => Executor::GitRepo(GitRepo {
            spec: typed(&name, kind, params)?,
            name,
        }),
        Kind::GithubRelease => Executor::GithubRelease(GithubRelease {
            spec: typed(&name, kind, params)?,
            name,
        }),
        Kind::SystemPackage => Executor::SystemPackage(SystemPackage {
            spec: typed(&name, kind, params)?,
            name,
        }),
        Kind::UrlDownload => Executor::UrlDownload(UrlDownload {
            spec: typed(&name, kind, params)?,
            name,
        }),
        Kind::Bundle => Executor::Bundle(Bundle {
            spec: typed(&name, kind, params)?,
            name,
        }),
        Kind::Toolchain => Executor::Toolchain(Toolchain {
            spec: typed(&name, kind, params)?,
            name,
        }),
        Kind::GoInstall => Executor::GoInstall(GoInstall {
            spec: typed(&name, kind, params)?,
            name,
        }),
        Kind::Bootstrap => Executor::Bootstrap(Bootstrap {
            spec: typed(&name, kind, params)?,
            name,
        }),
    })
}

fn typed<T: DeserializeOwned>(name: &str, kind: Kind, params: &toml::Table) -> Result<T, DecodeError> {
    params
        .clone()
        .try_into()
        .map_err(|source| DecodeError::InvalidParams {
            name: name.to_string(),
            kind: kind.tag(),
            source,
        })
}
