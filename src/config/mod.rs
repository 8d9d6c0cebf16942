//! The declarative document: named executor specs grouped by kind, plus
//! target selections.
//!
//! The document is read once at process start and written back atomically
//! after mutating operations. Executor parameters are kept as raw TOML
//! tables here; decoding into typed executors happens in
//! [`crate::executors`] so malformed specs surface through the same
//! [`DecodeError`](crate::error::DecodeError) path everywhere.
pub mod validation;

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context as _, Result, bail};
use serde::{Deserialize, Serialize};
use toml::Table;

use crate::error::ResolveError;
use crate::executors::Kind;
use crate::fsutil;

/// Name of the document file inside a machine-config repository.
pub const DOCUMENT_NAME: &str = "rigup.toml";

/// Parsed declarative document.
///
/// One table per executor kind maps names to raw parameter tables; names
/// must be unique across the union of all tables (checked by
/// [`validation::validate`], not by construction).
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Document {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub files: BTreeMap<String, Table>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub directories: BTreeMap<String, Table>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub repos: BTreeMap<String, Table>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub releases: BTreeMap<String, Table>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub packages: BTreeMap<String, Table>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub downloads: BTreeMap<String, Table>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub bundles: BTreeMap<String, Table>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub toolchains: BTreeMap<String, Table>,
    #[serde(rename = "go-installs", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub go_installs: BTreeMap<String, Table>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub bootstraps: BTreeMap<String, Table>,

    /// Target name → ordered executor selection.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub targets: BTreeMap<String, Vec<String>>,
}

impl Document {
    /// Parse a document from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error when the text is not valid TOML or contains unknown
    /// top-level tables.
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("parse document")
    }

    /// Load the document from disk.
    ///
    /// A missing or unreadable document is a process-level fatal condition;
    /// no partial work is meaningful without it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read document {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Write the document back atomically (temp file + rename).
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = toml::to_string_pretty(self).context("serialise document")?;
        fsutil::write_atomic(path, text.as_bytes())
            .with_context(|| format!("write document {}", path.display()))
    }

    /// The per-kind tables, in lookup order.
    #[must_use]
    pub fn kind_tables(&self) -> [(Kind, &BTreeMap<String, Table>); 10] {
        [
            (Kind::ConfigFile, &self.files),
            (Kind::ConfigDirectory, &self.directories),
            (Kind::GitRepo, &self.repos),
            (Kind::GithubRelease, &self.releases),
            (Kind::SystemPackage, &self.packages),
            (Kind::UrlDownload, &self.downloads),
            (Kind::Bundle, &self.bundles),
            (Kind::Toolchain, &self.toolchains),
            (Kind::GoInstall, &self.go_installs),
            (Kind::Bootstrap, &self.bootstraps),
        ]
    }

    fn table_mut(&mut self, kind: Kind) -> &mut BTreeMap<String, Table> {
        match kind {
            Kind::ConfigFile => &mut self.files,
            Kind::ConfigDirectory => &mut self.directories,
            Kind::GitRepo => &mut self.repos,
            Kind::GithubRelease => &mut self.releases,
            Kind::SystemPackage => &mut self.packages,
            Kind::UrlDownload => &mut self.downloads,
            Kind::Bundle => &mut self.bundles,
            Kind::Toolchain => &mut self.toolchains,
            Kind::GoInstall => &mut self.go_installs,
            Kind::Bootstrap => &mut self.bootstraps,
        }
    }

    /// Find a declared executor by name, scanning kinds in a fixed order.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<(Kind, &Table)> {
        self.kind_tables()
            .into_iter()
            .find_map(|(kind, table)| table.get(name).map(|params| (kind, params)))
    }

    /// Every kind that declares `name`. More than one entry means the
    /// uniqueness invariant is violated.
    #[must_use]
    pub fn declared_kinds(&self, name: &str) -> Vec<Kind> {
        self.kind_tables()
            .into_iter()
            .filter(|(_, table)| table.contains_key(name))
            .map(|(kind, _)| kind)
            .collect()
    }

    /// Declare a new executor.
    ///
    /// # Errors
    ///
    /// Returns an error if any kind already declares `name`.
    pub fn insert(&mut self, kind: Kind, name: &str, params: Table) -> Result<()> {
        if let Some((existing, _)) = self.lookup(name) {
            bail!("'{name}' is already declared as {existing}");
        }
        self.table_mut(kind).insert(name.to_string(), params);
        Ok(())
    }

    /// Append `name` to a target's selection, creating the target on first
    /// use. Selecting a name the target already lists is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is not declared by any kind.
    pub fn select(&mut self, target: &str, name: &str) -> Result<()> {
        if self.lookup(name).is_none() {
            return Err(ResolveError::Referential(name.to_string()).into());
        }
        let selection = self.targets.entry(target.to_string()).or_default();
        if !selection.iter().any(|existing| existing == name) {
            selection.push(name.to_string());
        }
        Ok(())
    }

    /// Remove `name` from a target's selection.
    ///
    /// # Errors
    ///
    /// Returns an error if the target does not exist or does not select
    /// `name`.
    pub fn deselect(&mut self, target: &str, name: &str) -> Result<()> {
        let Some(selection) = self.targets.get_mut(target) else {
            return Err(ResolveError::UnknownTarget(target.to_string()).into());
        };
        let before = selection.len();
        selection.retain(|existing| existing != name);
        if selection.len() == before {
            bail!("target '{target}' does not select '{name}'");
        }
        Ok(())
    }
}
