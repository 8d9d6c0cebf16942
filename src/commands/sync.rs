use std::collections::HashSet;

use anyhow::{Result, bail};

use crate::cli::{GlobalOpts, SyncOpts};
use crate::config::{DOCUMENT_NAME, Document};
use crate::exec::SystemRunner;
use crate::executors::Kind;
use crate::net::HttpFetcher;
use crate::platform::Platform;
use crate::sync::{Collaborators, SyncOptions, sync};
use crate::vcs::{GitVcs, NoopVcs, Vcs};

/// Run the sync command.
///
/// # Errors
///
/// Returns an error when the document cannot be loaded or any resolution
/// or execution step failed.
pub fn run(global: &GlobalOpts, opts: &SyncOpts) -> Result<()> {
    let root = super::resolve_root(global)?;
    let home = super::home_dir()?;
    let platform = Platform::detect();
    let doc = Document::load(&root.join(DOCUMENT_NAME))?;

    let options = SyncOptions {
        force: opts.force,
        only: if opts.only.is_empty() {
            None
        } else {
            Some(parse_kinds(&opts.only)?)
        },
        skip: parse_kinds(&opts.skip)?,
    };

    let runner = SystemRunner;
    let http = HttpFetcher::new();
    let git_vcs;
    let vcs: &dyn Vcs = if GitVcs::is_repository(&root) {
        git_vcs = GitVcs::new(&root, &runner);
        &git_vcs
    } else {
        &NoopVcs
    };
    let collaborators = Collaborators {
        runner: &runner,
        http: &http,
        vcs,
    };

    match sync(&doc, &root, &home, &opts.target, platform, &collaborators, &options) {
        Ok(()) => {
            tracing::info!("target '{}' applied", opts.target);
            Ok(())
        }
        Err(errors) => Err(errors.into()),
    }
}

/// Parse kind tags from the CLI, rejecting unknown tags by name.
fn parse_kinds(tags: &[String]) -> Result<HashSet<Kind>> {
    let mut kinds = HashSet::new();
    for tag in tags {
        match Kind::from_tag(tag) {
            Some(kind) => {
                kinds.insert(kind);
            }
            None => bail!("unknown executor kind '{tag}'"),
        }
    }
    Ok(kinds)
}
