//! Sync orchestration: resolve a target, then execute every resolved
//! executor in order, aggregating failures instead of stopping.
//!
//! Execution is strictly sequential. One broken download must not prevent
//! unrelated renders or installs from completing, so each executor's
//! failure is recorded with its name and phase and the loop moves on; the
//! aggregate is returned at the end.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::build::BuildEngine;
use crate::config::Document;
use crate::error::{ErrorList, Phase};
use crate::exec::Runner;
use crate::executors::{Executor, Kind};
use crate::net::Fetcher;
use crate::pkg::{InstalledCache, Manager};
use crate::platform::Platform;
use crate::resolve;
use crate::vcs::Vcs;

/// Execution modifiers for one sync run.
#[derive(Debug, Default)]
pub struct SyncOptions {
    /// Replace unmanaged files at symlink destinations.
    pub force: bool,
    /// When set, only these kinds run (a "quick" mode).
    pub only: Option<HashSet<Kind>>,
    /// Kinds to skip.
    pub skip: HashSet<Kind>,
}

impl SyncOptions {
    fn allows(&self, kind: Kind) -> bool {
        if self.skip.contains(&kind) {
            return false;
        }
        self.only.as_ref().is_none_or(|only| only.contains(&kind))
    }
}

/// External collaborators threaded through a sync run.
pub struct Collaborators<'a> {
    pub runner: &'a dyn Runner,
    pub http: &'a dyn Fetcher,
    pub vcs: &'a dyn Vcs,
}

/// Everything an executor may touch while executing.
pub struct SyncContext<'a> {
    /// Target being applied.
    pub target: String,
    /// Home directory for `~` expansion.
    pub home: PathBuf,
    /// Config repository root.
    pub root: PathBuf,
    /// Force flag, propagated to the engine's conflict policy.
    pub force: bool,
    /// Current platform.
    pub platform: Platform,
    /// Subprocess runner.
    pub runner: &'a dyn Runner,
    /// HTTP collaborator.
    pub http: &'a dyn Fetcher,
    /// Render & symlink engine for this pass.
    pub engine: BuildEngine,
    /// Package manager chosen for this platform, if any is available.
    pub manager: Option<Manager>,
    /// Installed-package snapshot, filled on first use.
    pub installed: InstalledCache,
}

impl<'a> SyncContext<'a> {
    /// Build the execution context for one sync pass.
    #[must_use]
    pub fn new(
        root: &Path,
        home: &Path,
        target: &str,
        platform: Platform,
        force: bool,
        runner: &'a dyn Runner,
        http: &'a dyn Fetcher,
    ) -> Self {
        Self {
            target: target.to_string(),
            home: home.to_path_buf(),
            root: root.to_path_buf(),
            force,
            platform,
            runner,
            http,
            engine: BuildEngine::new(root, target, home, platform, force),
            manager: Manager::detect(platform, runner),
            installed: InstalledCache::new(),
        }
    }
}

/// Apply `target` to this machine.
///
/// Pulls the config repository, resolves the target, then executes each
/// resolved executor in resolved order. Returns `Ok(())` only when zero
/// errors occurred across resolution and execution.
///
/// # Errors
///
/// Returns an [`ErrorList`] enumerating every failure with its executor
/// name and phase.
pub fn sync(
    doc: &Document,
    root: &Path,
    home: &Path,
    target: &str,
    platform: Platform,
    collaborators: &Collaborators<'_>,
    options: &SyncOptions,
) -> Result<(), ErrorList> {
    // A failed pull leaves a usable (if stale) checkout; keep going.
    if let Err(e) = collaborators.vcs.pull() {
        tracing::warn!("pull failed, continuing with local state: {e:#}");
    }

    tracing::info!("resolving target '{target}'");
    let resolved = resolve::resolve(doc, target)?;

    let (selected, skipped): (Vec<Executor>, Vec<Executor>) = resolved
        .into_iter()
        .partition(|executor| options.allows(executor.kind()));
    if !skipped.is_empty() {
        tracing::info!("skipping {} executor(s) by kind filter", skipped.len());
    }

    let ctx = SyncContext::new(
        root,
        home,
        target,
        platform,
        options.force,
        collaborators.runner,
        collaborators.http,
    );

    let mut errors = ErrorList::new();

    let renders_anything = selected
        .iter()
        .any(|e| matches!(e.kind(), Kind::ConfigFile | Kind::ConfigDirectory));
    if renders_anything
        && let Err(e) = ctx.engine.begin_pass()
    {
        errors.push(target, Phase::Execute, e);
        return Err(errors);
    }

    tracing::info!("executing {} executor(s)", selected.len());
    for executor in &selected {
        tracing::debug!("{} ({})", executor.name(), executor.kind());
        if let Err(e) = executor.execute(&ctx) {
            tracing::error!("{}: {e:#}", executor.name());
            errors.push(executor.name(), Phase::Execute, e);
        }
    }

    errors.into_result()
}
